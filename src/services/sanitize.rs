/// Trims and HTML-escapes free-text profile fields before they are stored
/// or echoed back to clients.
pub fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.trim().chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

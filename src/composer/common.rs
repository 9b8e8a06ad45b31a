//! Shared helpers for Typst source assembly.

/// Escape characters that are live Typst markup syntax. Payload values are
/// interpolated into content blocks and body text, so anything that could
/// start markup (`#`, `*`, `_`, brackets, math, references, list or heading
/// markers) must be neutralized. Newlines become explicit line breaks.
pub fn escape_typst_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' | '#' | '*' | '_' | '[' | ']' | '$' | '@' | '"' | '\'' | '`' | '<' | '>'
            | '=' | '-' | '+' | '/' | '~' => {
                out.push('\\');
                out.push(ch);
            }
            '\n' => out.push_str("\\\n"),
            _ => out.push(ch),
        }
    }
    out
}

/// Display-only currency formatting. Stored payload values stay unrounded.
pub fn format_currency(amount: f64) -> String {
    format!("₹{amount:.2}")
}

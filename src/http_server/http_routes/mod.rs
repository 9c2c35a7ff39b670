pub mod cart;
pub mod home;

/// Escape text for inclusion in HTML element content or attribute values.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn page(title: &str, cart_count: i64, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{title} - Music Store</title></head>
<body>
<header><a href="/">Music Store</a> | <a href="/cart">Cart ({cart_count})</a></header>
<main>
{body}
</main>
</body>
</html>
"#,
        title = escape_html(title),
    )
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `child[name]` -> `name`; bare names pass through.
pub fn field_param_name(raw: &str) -> &str {
    raw.strip_prefix("child[")
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn unwraps_rails_style_names() {
        assert_eq!(field_param_name("child[last_known_location]"), "last_known_location");
        assert_eq!(field_param_name("age"), "age");
        assert_eq!(field_param_name("child[broken"), "child[broken");
    }
}

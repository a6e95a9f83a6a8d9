//! Escaping of identifiers and attribute values into selector tokens

/// Serialize a string as a selector identifier (the `CSS.escape` rules).
///
/// NUL maps to U+FFFD, control characters and digit-leading sequences get
/// `\XX ` hex escapes (the trailing space separates them from following
/// hex digits), and anything outside the identifier alphabet gets a
/// backslash.
pub fn escape_identifier(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    for (i, &ch) in chars.iter().enumerate() {
        if ch == '\u{0}' {
            out.push('\u{FFFD}');
        } else if is_control(ch) {
            push_hex(&mut out, ch);
        } else if i == 0 && ch.is_ascii_digit() {
            push_hex(&mut out, ch);
        } else if i == 1 && ch.is_ascii_digit() && chars[0] == '-' {
            push_hex(&mut out, ch);
        } else if i == 0 && chars.len() == 1 && ch == '-' {
            out.push('\\');
            out.push('-');
        } else if ch >= '\u{80}' || ch == '-' || ch == '_' || ch.is_ascii_alphanumeric() {
            out.push(ch);
        } else {
            out.push('\\');
            out.push(ch);
        }
    }
    out
}

/// Escape a string for embedding inside a double-quoted attribute value.
pub fn escape_attribute_value(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch == '\u{0}' {
            out.push('\u{FFFD}');
        } else if is_control(ch) {
            push_hex(&mut out, ch);
        } else if ch == '"' || ch == '\\' {
            out.push('\\');
            out.push(ch);
        } else {
            out.push(ch);
        }
    }
    out
}

fn is_control(ch: char) -> bool {
    ('\u{1}'..='\u{1f}').contains(&ch) || ch == '\u{7f}'
}

fn push_hex(out: &mut String, ch: char) {
    out.push_str(&format!("\\{:x} ", ch as u32));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_identifiers_pass_through() {
        assert_eq!(escape_identifier("card"), "card");
        assert_eq!(escape_identifier("my-widget_2"), "my-widget_2");
    }

    #[test]
    fn leading_digit_is_hex_escaped() {
        assert_eq!(escape_identifier("1st"), "\\31 st");
        assert_eq!(escape_identifier("-2nd"), "-\\32 nd");
    }

    #[test]
    fn lone_hyphen_is_escaped() {
        assert_eq!(escape_identifier("-"), "\\-");
    }

    #[test]
    fn punctuation_gets_a_backslash() {
        assert_eq!(escape_identifier("a.b"), "a\\.b");
        assert_eq!(escape_identifier("x:y"), "x\\:y");
    }

    #[test]
    fn nul_becomes_replacement_char() {
        assert_eq!(escape_identifier("a\u{0}b"), "a\u{FFFD}b");
    }

    #[test]
    fn control_chars_are_hex_escaped() {
        assert_eq!(escape_identifier("a\u{9}b"), "a\\9 b");
    }

    #[test]
    fn non_ascii_passes_through() {
        assert_eq!(escape_identifier("héllo"), "héllo");
    }

    #[test]
    fn attribute_value_quotes_and_backslashes() {
        assert_eq!(escape_attribute_value(r#"say "hi""#), r#"say \"hi\""#);
        assert_eq!(escape_attribute_value(r"a\b"), r"a\\b");
        assert_eq!(escape_attribute_value("tab\u{9}!"), "tab\\9 !");
    }
}

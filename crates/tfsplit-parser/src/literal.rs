//! Static string values.

/// The value of `expression` if it is a quoted string without template
/// sequences, with escapes resolved.
///
/// # Examples
///
/// ```
/// # use tfsplit_parser::static_string;
/// assert_eq!(static_string(r#""west""#).as_deref(), Some("west"));
/// assert_eq!(static_string(r#""a \"b\"""#).as_deref(), Some(r#"a "b""#));
/// assert_eq!(static_string(r#""${var.alias}""#), None);
/// assert_eq!(static_string("var.alias"), None);
/// ```
pub fn static_string(expression: &str) -> Option<String> {
    let inner = expression
        .trim()
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))?;

    let mut value = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next()? {
                'n' => value.push('\n'),
                'r' => value.push('\r'),
                't' => value.push('\t'),
                '"' => value.push('"'),
                '\\' => value.push('\\'),
                other => {
                    value.push('\\');
                    value.push(other);
                }
            },
            '"' => return None,
            '$' | '%' => match chars.peek() {
                Some(&'{') => return None,
                Some(&next) if next == c => {
                    chars.next();
                    value.push(c);
                    if chars.peek() != Some(&'{') {
                        value.push(c);
                    }
                }
                _ => value.push(c),
            },
            _ => value.push(c),
        }
    }
    Some(value)
}

/// Unquote a block label, resolving escapes when it is static.
pub(crate) fn label_value(raw: &str) -> String {
    static_string(raw).unwrap_or_else(|| raw.trim_matches('"').to_string())
}

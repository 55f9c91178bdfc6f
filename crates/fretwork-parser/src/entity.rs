//! Character references.
//!
//! [`decode`] resolves the references found in song sheets (`&nbsp;`, the
//! XML five, a handful of typographic names, and numeric references).
//! Unknown references are left as written. [`escape`] is the inverse used
//! when writing attribute values and text back into markup.

use std::borrow::Cow;

/// Named references that are resolved; everything else is kept verbatim.
const NAMED: &[(&str, char)] = &[
    ("nbsp", '\u{a0}'),
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("ndash", '\u{2013}'),
    ("mdash", '\u{2014}'),
    ("lsquo", '\u{2018}'),
    ("rsquo", '\u{2019}'),
    ("ldquo", '\u{201c}'),
    ("rdquo", '\u{201d}'),
    ("hellip", '\u{2026}'),
    ("sharp", '\u{266f}'),
    ("flat", '\u{266d}'),
];

/// Decodes one reference at the start of `input` (just after the `&`).
///
/// Returns the character and the number of bytes consumed, including the
/// optional trailing `;`.
fn decode_reference(input: &str) -> Option<(char, usize)> {
    let (ch, len) = if let Some(numeric) = input.strip_prefix('#') {
        let (digits, radix, prefix) = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => (hex, 16, 2),
            None => (numeric, 10, 1),
        };
        let len = digits
            .find(|c: char| !c.is_digit(radix))
            .unwrap_or(digits.len());
        if len == 0 {
            return None;
        }
        let ch = u32::from_str_radix(&digits[..len], radix)
            .ok()
            .and_then(char::from_u32)
            .filter(|&c| c != '\0')
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        (ch, prefix + len)
    } else {
        let len = input
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(input.len());
        let name = &input[..len];
        let &(_, ch) = NAMED.iter().find(|(known, _)| *known == name)?;
        (ch, len)
    };

    let terminated = input[len..].starts_with(';');
    Some((ch, len + usize::from(terminated)))
}

/// Replaces character references with the characters they stand for.
///
/// Borrows the input when it contains no `&`.
///
/// ```
/// # use fretwork_parser::entity::decode;
/// assert_eq!(decode("G&nbsp;"), "G\u{a0}");
/// assert_eq!(decode("A&#x266D;"), "A\u{266d}");
/// assert_eq!(decode("R&B &unknown;"), "R&B &unknown;");
/// ```
pub fn decode(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut decoded = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        decoded.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        match decode_reference(after) {
            Some((ch, consumed)) => {
                decoded.push(ch);
                rest = &after[consumed..];
            }
            None => {
                decoded.push('&');
                rest = after;
            }
        }
    }
    decoded.push_str(rest);
    Cow::Owned(decoded)
}

/// Escapes text for use inside a double-quoted attribute value or element
/// content.
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_named() {
        assert_eq!(decode("G&nbsp;"), "G\u{a0}");
        assert_eq!(decode("&lt;b&gt; &amp; &quot;x&quot; &apos;y&apos;"), "<b> & \"x\" 'y'");
    }

    #[test]
    fn test_decode_numeric() {
        assert_eq!(decode("&#39;"), "'");
        assert_eq!(decode("&#160;"), "\u{a0}");
        assert_eq!(decode("&#xA0;&#XA0;"), "\u{a0}\u{a0}");
        assert_eq!(decode("&#0;"), "\u{fffd}");
        assert_eq!(decode("&#x110000;"), "\u{fffd}");
    }

    #[test]
    fn test_decode_without_semicolon() {
        assert_eq!(decode("G&nbsp"), "G\u{a0}");
        assert_eq!(decode("&#65B"), "AB");
    }

    #[test]
    fn test_decode_leaves_unknown() {
        assert_eq!(decode("a & b"), "a & b");
        assert_eq!(decode("&bogus;"), "&bogus;");
        assert_eq!(decode("&#;"), "&#;");
        assert_eq!(decode("trailing &"), "trailing &");
    }

    #[test]
    fn test_decode_borrows_plain_text() {
        assert!(matches!(decode("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("C/G"), "C/G");
        assert_eq!(escape(r#"<"Am" & 'G'>"#), "&lt;&quot;Am&quot; &amp; &#39;G&#39;&gt;");
    }

    #[test]
    fn test_escape_then_decode() {
        let text = r#"Bb7(#5) "tight" <voicing> & more"#;
        assert_eq!(decode(&escape(text)), text);
    }
}

//! Byte-level decoding of stylesheets.
//!
//! A byte order mark wins; otherwise a leading `@charset "<label>";` picks the
//! encoding; otherwise the sheet is UTF-8. Unlike browsers, malformed input is
//! rejected instead of being replaced with U+FFFD.

use crate::error::CssError;
use encoding_rs::{Encoding, UTF_8};

/// Decodes raw stylesheet bytes to text, stripping any BOM.
pub fn decode_stylesheet(bytes: &[u8]) -> Result<String, CssError> {
    let (encoding, body) = match Encoding::for_bom(bytes) {
        Some((enc, bom_len)) => (enc, &bytes[bom_len..]),
        None => (sniff_charset_rule(bytes).unwrap_or(UTF_8), bytes),
    };

    let (text, had_errors) = encoding.decode_without_bom_handling(body);
    if had_errors {
        return Err(CssError::Encoding {
            encoding: encoding.name(),
        });
    }
    if encoding != UTF_8 {
        log::debug!("Decoded stylesheet as {}", encoding.name());
    }
    Ok(text.into_owned())
}

/// Reads the label of an `@charset "...";` rule at the very start of the sheet.
///
/// Labels that name a UTF-16 variant are treated as UTF-8, since a sheet that
/// is readable as ASCII cannot be UTF-16.
fn sniff_charset_rule(bytes: &[u8]) -> Option<&'static Encoding> {
    let rest = bytes.strip_prefix(b"@charset \"")?;
    let end = rest.iter().position(|&b| b == b'"')?;
    if rest.get(end + 1) != Some(&b';') {
        return None;
    }
    let encoding = Encoding::for_label(&rest[..end])?;
    if encoding.output_encoding() != encoding {
        return Some(UTF_8);
    }
    Some(encoding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1252;

    #[test]
    fn test_utf8_bom_is_stripped() {
        let data = [0xef, 0xbb, 0xbf, b'p', b'{', b'}'];
        assert_eq!(decode_stylesheet(&data).unwrap(), "p{}");
    }

    #[test]
    fn test_charset_rule_selects_encoding() {
        let (encoded, _, _) =
            WINDOWS_1252.encode("@charset \"windows-1252\"; p { content: \"\u{00a3}\" }");
        let text = decode_stylesheet(&encoded).unwrap();
        assert!(text.contains('\u{00a3}'));
    }

    #[test]
    fn test_unknown_charset_falls_back_to_utf8() {
        let text = decode_stylesheet(b"@charset \"no-such\"; p{}").unwrap();
        assert!(text.ends_with("p{}"));
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let err = decode_stylesheet(&[b'p', 0xff, b'{', b'}']).unwrap_err();
        assert_eq!(err, CssError::Encoding { encoding: "UTF-8" });
    }
}

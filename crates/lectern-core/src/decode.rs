//! Byte-to-text decoding as an ordered chain of attempts.
//!
//! The chain is: strict UTF-8, then GBK, then lossy UTF-8. The final step
//! accepts any byte sequence, so decoding as a whole cannot fail; a document
//! always opens, at worst with replacement characters.

use encoding_rs::GBK;

/// Text produced by the first successful attempt.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecodedText {
    pub text: String,
    /// Label of the attempt that produced the text.
    pub encoding: &'static str,
}

struct DecodeAttempt {
    label: &'static str,
    run: fn(&[u8]) -> Option<String>,
}

/// Attempts tried in order before the infallible lossy fallback.
const FALLIBLE_ATTEMPTS: &[DecodeAttempt] = &[
    DecodeAttempt {
        label: "utf-8",
        run: decode_utf8_strict,
    },
    DecodeAttempt {
        label: "gbk",
        run: decode_gbk,
    },
];

const LOSSY_LABEL: &str = "utf-8-lossy";

fn decode_utf8_strict(bytes: &[u8]) -> Option<String> {
    std::str::from_utf8(bytes).ok().map(str::to_owned)
}

fn decode_gbk(bytes: &[u8]) -> Option<String> {
    let (text, _, had_errors) = GBK.decode(bytes);
    if had_errors {
        None
    } else {
        Some(text.into_owned())
    }
}

/// Decodes document bytes. Never fails.
pub fn decode_document(bytes: &[u8]) -> DecodedText {
    for attempt in FALLIBLE_ATTEMPTS {
        if let Some(text) = (attempt.run)(bytes) {
            return DecodedText {
                text,
                encoding: attempt.label,
            };
        }
    }

    DecodedText {
        text: String::from_utf8_lossy(bytes).into_owned(),
        encoding: LOSSY_LABEL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_utf8_decodes_strictly() {
        let decoded = decode_document("第一章 标题\n正文".as_bytes());
        assert_eq!(decoded.encoding, "utf-8");
        assert_eq!(decoded.text, "第一章 标题\n正文");
    }

    #[test]
    fn gbk_bytes_fall_through_to_the_second_attempt() {
        let original = "第一章 标题";
        let (bytes, _, had_errors) = GBK.encode(original);
        assert!(!had_errors);
        // GBK-encoded CJK text is not valid UTF-8.
        assert!(std::str::from_utf8(&bytes).is_err());

        let decoded = decode_document(&bytes);
        assert_eq!(decoded.encoding, "gbk");
        assert_eq!(decoded.text, original);
    }

    #[test]
    fn bytes_invalid_in_both_encodings_still_decode() {
        // 0xFF is never a valid lead byte in UTF-8 or GBK.
        let decoded = decode_document(b"abc\xff\xffdef");
        assert_eq!(decoded.encoding, "utf-8-lossy");
        assert!(decoded.text.starts_with("abc"));
        assert!(decoded.text.ends_with("def"));
        assert!(decoded.text.contains('\u{FFFD}'));
    }

    #[test]
    fn empty_input_decodes_to_an_empty_string() {
        let decoded = decode_document(b"");
        assert_eq!(decoded.encoding, "utf-8");
        assert_eq!(decoded.text, "");
    }
}

use chardetng::EncodingDetector;
use encoding_rs::Encoding;

/// Transcript bytes decoded into UTF-8, with the encoding that was used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to decode bytes with {encoding}")]
pub struct DecodeError {
    pub encoding: String,
}

/// Decode raw transcript bytes into UTF-8.
///
/// Resolution order: BOM, then the Content-Type charset parameter, then a
/// chardetng guess over the full payload.
pub fn decode_transcript(
    bytes: &[u8],
    content_type: Option<&str>,
) -> Result<DecodedText, DecodeError> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(encoding) = content_type
        .and_then(charset_param)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return decode_with(bytes, encoding);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    decode_with(bytes, detector.guess(None, true))
}

fn charset_param(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|part| {
        let part = part.trim();
        let (prefix, label) = part.split_at_checked(8)?;
        if prefix.eq_ignore_ascii_case("charset=") {
            Some(label.trim_matches([' ', '"', '\''].as_ref()).to_string())
        } else {
            None
        }
    })
}

fn decode_with(bytes: &[u8], encoding: &'static Encoding) -> Result<DecodedText, DecodeError> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(DecodeError {
            encoding: encoding.name().to_string(),
        });
    }
    Ok(DecodedText {
        text: text.into_owned(),
        encoding_label: encoding.name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charset_header_wins_without_bom() {
        let decoded = decode_transcript(b"caf\xe9", Some("text/plain; charset=ISO-8859-1")).unwrap();
        assert_eq!(decoded.text, "café");
    }

    #[test]
    fn bom_wins_over_header() {
        let decoded =
            decode_transcript(b"\xEF\xBB\xBFhello", Some("text/plain; charset=ISO-8859-1"))
                .unwrap();
        assert_eq!(decoded.text, "hello");
        assert_eq!(decoded.encoding_label, "UTF-8");
    }

    #[test]
    fn plain_utf8_is_detected() {
        let decoded = decode_transcript("grüß dich".as_bytes(), Some("text/plain")).unwrap();
        assert_eq!(decoded.text, "grüß dich");
    }

    #[test]
    fn charset_param_is_case_insensitive_and_quoted() {
        assert_eq!(
            charset_param("text/plain; Charset=\"utf-8\""),
            Some("utf-8".to_string())
        );
        assert_eq!(charset_param("text/plain"), None);
    }
}

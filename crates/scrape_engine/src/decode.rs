use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use scrape_logging::scrape_warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding_label: String,
    /// Malformed sequences were replaced with U+FFFD.
    pub had_errors: bool,
}

/// Decode a response body to UTF-8 using: BOM -> Content-Type charset -> chardetng guess.
///
/// Never fails; malformed input is decoded lossily.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> DecodedText {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(label) = content_type.and_then(extract_charset) {
        if let Some(enc) = Encoding::for_label(label.as_bytes()) {
            return decode_with(bytes, enc);
        }
        scrape_warn!("unknown charset label {:?}, falling back to detection", label);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let enc = detector.guess(None, true);
    decode_with(bytes, enc)
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .filter_map(|part| {
            let (key, value) = part.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("charset")
                .then(|| value.trim().trim_matches(['"', '\'']).to_string())
        })
        .find(|value| !value.is_empty())
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> DecodedText {
    // `decode` sniffs a BOM itself and may switch encodings.
    let (text, actual, had_errors) = enc.decode(bytes);
    if had_errors {
        scrape_warn!(
            "body contained malformed {} sequences; replaced with U+FFFD",
            actual.name()
        );
    }
    DecodedText {
        text: text.into_owned(),
        encoding_label: actual.name().to_string(),
        had_errors,
    }
}

//! Compression codec for cached XML
//!
//! Tokens are gzip streams of the UTF-8 text. The codec only exists to shrink
//! the persistent cache footprint; a token that fails to decode is reported as
//! [`FreebotsError::Decode`] so the caller can treat it as a miss.

use crate::error::{FreebotsError, FreebotsResult};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::io::{Read, Write};

/// Compress XML text into a storage token
pub fn compress(text: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(text.len() / 4), Compression::default());
    // Writing into a Vec<u8> cannot fail.
    let _ = encoder.write_all(text.as_bytes());
    encoder.finish().unwrap_or_default()
}

/// Decompress a storage token back into XML text
///
/// `None` in gives `None` out.
pub fn decompress(token: Option<&[u8]>) -> FreebotsResult<Option<String>> {
    let Some(token) = token else {
        return Ok(None);
    };

    let mut decoder = GzDecoder::new(token);
    let mut bytes = Vec::with_capacity(token.len() * 4);
    decoder
        .read_to_end(&mut bytes)
        .map_err(|e| FreebotsError::decode(format!("invalid compressed token: {}", e)))?;

    String::from_utf8(bytes)
        .map(Some)
        .map_err(|e| FreebotsError::decode(format!("token is not UTF-8 text: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let samples = [
            "",
            "<xml/>",
            r#"<xml xmlns="https://developers.google.com/blockly/xml"><block type="trade_definition" id="a"/></xml>"#,
            "émoji 🚀 and CJK 交易机器人",
            "\u{0}\u{ffff}",
        ];

        for text in samples {
            let token = compress(text);
            assert_eq!(decompress(Some(&token)).unwrap().as_deref(), Some(text));
        }
    }

    #[test]
    fn test_large_repetitive_xml_shrinks() {
        let xml = "<block type=\"purchase\"><field name=\"PURCHASE_LIST\">CALL</field></block>"
            .repeat(500);
        let token = compress(&xml);
        assert!(token.len() < xml.len() / 10);
        assert_eq!(decompress(Some(&token)).unwrap().unwrap(), xml);
    }

    #[test]
    fn test_compress_is_deterministic() {
        assert_eq!(compress("<xml>same</xml>"), compress("<xml>same</xml>"));
    }

    #[test]
    fn test_absent_token() {
        assert_eq!(decompress(None).unwrap(), None);
    }

    #[test]
    fn test_corrupt_token_is_decode_error() {
        let err = decompress(Some(b"definitely not gzip")).unwrap_err();
        assert!(matches!(err, FreebotsError::Decode { .. }));

        let mut token = compress("<xml>truncated</xml>");
        token.truncate(token.len() / 2);
        assert!(decompress(Some(&token)).is_err());
    }
}

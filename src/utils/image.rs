//! Images travel as base64 text in JSON and are stored as raw bytes.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serializer;

/// Decodes base64 image text, tolerating a `data:<mime>;base64,` prefix.
pub fn decode_image(value: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let payload = match value.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => value,
    };
    STANDARD.decode(payload.trim())
}

pub fn encode_image(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// `serialize_with` helper for BLOB columns
pub fn serialize_base64<T, S>(bytes: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: AsRef<[u8]>,
    S: Serializer,
{
    serializer.serialize_str(&encode_image(bytes.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_plain_and_data_url_forms() {
        let encoded = encode_image(b"png-bytes");
        assert_eq!(decode_image(&encoded).unwrap(), b"png-bytes");

        let data_url = format!("data:image/png;base64,{}", encoded);
        assert_eq!(decode_image(&data_url).unwrap(), b"png-bytes");
    }

    #[test]
    fn rejects_garbage() {
        assert!(decode_image("not base64 !!").is_err());
    }
}

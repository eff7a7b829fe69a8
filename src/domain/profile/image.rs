//! Uploaded photo, kept as a base64 data URI.

use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Largest accepted decoded image.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// A photo as `data:<mime>;base64,<payload>`.
///
/// # Invariants
///
/// - the MIME type is `image/*`
/// - the payload is valid standard base64 of at most [`MAX_IMAGE_BYTES`]
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageDatum {
    data_uri: String,
    mime_type: String,
    payload_start: usize,
    byte_len: usize,
}

impl ImageDatum {
    /// Parses and validates a data URI.
    ///
    /// # Errors
    ///
    /// - `EmptyField` for an empty string
    /// - `InvalidFormat` when the URI is not a base64 `image/*` data URI
    /// - `OutOfRange` when the decoded image exceeds [`MAX_IMAGE_BYTES`]
    pub fn from_data_uri(data_uri: impl Into<String>) -> Result<Self, ValidationError> {
        let data_uri = data_uri.into();
        if data_uri.trim().is_empty() {
            return Err(ValidationError::empty_field("image"));
        }

        let rest = data_uri
            .strip_prefix("data:")
            .ok_or_else(|| ValidationError::invalid_format("image", "expected a data: URI"))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| ValidationError::invalid_format("image", "missing ',' separator"))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| ValidationError::invalid_format("image", "payload must be base64"))?;
        if !mime_type.starts_with("image/") || mime_type.len() <= "image/".len() {
            return Err(ValidationError::invalid_format(
                "image",
                format!("unsupported media type '{}'", mime_type),
            ));
        }

        let decoded = general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| ValidationError::invalid_format("image", format!("bad base64: {}", e)))?;
        if decoded.len() > MAX_IMAGE_BYTES {
            return Err(ValidationError::out_of_range(
                "image",
                0,
                MAX_IMAGE_BYTES as i64,
                decoded.len() as i64,
            ));
        }

        let mime_type = mime_type.to_string();
        let payload_start = data_uri.len() - payload.len();
        Ok(Self {
            data_uri,
            mime_type,
            payload_start,
            byte_len: decoded.len(),
        })
    }

    /// Builds a data URI from raw bytes.
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Result<Self, ValidationError> {
        Self::from_data_uri(format!(
            "data:{};base64,{}",
            mime_type,
            general_purpose::STANDARD.encode(bytes)
        ))
    }

    /// The full data URI.
    pub fn data_uri(&self) -> &str {
        &self.data_uri
    }

    /// e.g. `image/jpeg`.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// The base64 payload without the `data:` header.
    pub fn base64_payload(&self) -> &str {
        &self.data_uri[self.payload_start..]
    }

    /// Decoded size in bytes.
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// Short SHA-256 fingerprint of the payload, for logs.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.base64_payload().as_bytes());
        digest.iter().take(6).map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Debug for ImageDatum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageDatum")
            .field("mime_type", &self.mime_type)
            .field("byte_len", &self.byte_len)
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

impl TryFrom<String> for ImageDatum {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_data_uri(value)
    }
}

impl From<ImageDatum> for String {
    fn from(image: ImageDatum) -> Self {
        image.data_uri
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    #[test]
    fn parses_valid_data_uri() {
        let image = ImageDatum::from_bytes("image/png", PNG_HEADER).unwrap();
        assert_eq!(image.mime_type(), "image/png");
        assert_eq!(image.byte_len(), PNG_HEADER.len());
        assert!(image.data_uri().starts_with("data:image/png;base64,"));
        assert_eq!(
            general_purpose::STANDARD.decode(image.base64_payload()).unwrap(),
            PNG_HEADER
        );
    }

    #[test]
    fn rejects_non_data_uri() {
        assert!(matches!(
            ImageDatum::from_data_uri("https://example.com/a.png"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            ImageDatum::from_data_uri(""),
            Err(ValidationError::EmptyField { .. })
        ));
    }

    #[test]
    fn rejects_non_image_media_type() {
        let result = ImageDatum::from_data_uri("data:text/plain;base64,aGVsbG8=");
        assert!(matches!(result, Err(ValidationError::InvalidFormat { .. })));
    }

    #[test]
    fn rejects_non_base64_payloads() {
        assert!(ImageDatum::from_data_uri("data:image/png,rawbytes").is_err());
        assert!(ImageDatum::from_data_uri("data:image/png;base64,@@@").is_err());
    }

    #[test]
    fn rejects_oversized_images() {
        let bytes = vec![0u8; MAX_IMAGE_BYTES + 1];
        assert!(matches!(
            ImageDatum::from_bytes("image/jpeg", &bytes),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn fingerprint_is_stable_and_short() {
        let a = ImageDatum::from_bytes("image/png", PNG_HEADER).unwrap();
        let b = ImageDatum::from_bytes("image/png", PNG_HEADER).unwrap();
        let c = ImageDatum::from_bytes("image/png", b"other").unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_eq!(a.fingerprint().len(), 12);
    }

    #[test]
    fn debug_does_not_dump_payload() {
        let image = ImageDatum::from_bytes("image/png", PNG_HEADER).unwrap();
        let debug = format!("{:?}", image);
        assert!(!debug.contains(image.base64_payload()));
    }

    #[test]
    fn serde_round_trips_as_string() {
        let image = ImageDatum::from_bytes("image/png", PNG_HEADER).unwrap();
        let json = serde_json::to_string(&image).unwrap();
        let back: ImageDatum = serde_json::from_str(&json).unwrap();
        assert_eq!(image, back);
        assert!(serde_json::from_str::<ImageDatum>("\"nope\"").is_err());
    }
}

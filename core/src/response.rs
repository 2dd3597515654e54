//! Response shapes and the decoders that produce them.
//!
//! # Design
//! `NetworkResponse` is a marker: a type opts in to being the result of a
//! request. Sequences and plain text are response shapes in their own right,
//! so `Vec<T>` and `String` implement it out of the box, as does `()` for
//! calls whose body is ignored (a JSON `null`). Consumer types opt in
//! with an empty impl:
//!
//! ```ignore
//! #[derive(Deserialize)]
//! struct User { id: u64, name: String }
//! impl NetworkResponse for User {}
//! ```
//!
//! Decoders are pluggable per request. `JsonDecoder` handles any JSON shape;
//! `TextDecoder` passes raw bytes through as a `String` for non-JSON bodies.

use serde::de::DeserializeOwned;

use crate::error::DecodeError;

/// Marker for types a request may resolve to.
pub trait NetworkResponse: Send + 'static {}

impl<T: DeserializeOwned + Send + 'static> NetworkResponse for Vec<T> {}
impl NetworkResponse for String {}
impl NetworkResponse for serde_json::Value {}
impl NetworkResponse for () {}

/// Turns response bytes into a typed value.
pub trait Decoder<T>: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<T, DecodeError>;
}

/// Decodes JSON bodies with `serde_json`. The default decoder.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonDecoder;

impl<T: NetworkResponse + DeserializeOwned> Decoder<T> for JsonDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<T, DecodeError> {
        serde_json::from_slice(bytes).map_err(|e| DecodeError::Json(e.to_string()))
    }
}

/// Treats the body as UTF-8 text.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextDecoder;

impl Decoder<String> for TextDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<String, DecodeError> {
        String::from_utf8(bytes.to_vec()).map_err(|e| DecodeError::Utf8(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        id: u64,
        name: String,
    }

    impl NetworkResponse for User {}

    #[test]
    fn json_decoder_reads_objects() {
        let user: User = JsonDecoder.decode(br#"{"id":1,"name":"Ann"}"#).unwrap();
        assert_eq!(
            user,
            User {
                id: 1,
                name: "Ann".to_string()
            }
        );
    }

    #[test]
    fn json_decoder_reads_top_level_arrays() {
        let users: Vec<User> = JsonDecoder
            .decode(br#"[{"id":1,"name":"Ann"},{"id":2,"name":"Bo"}]"#)
            .unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[1].name, "Bo");
    }

    #[test]
    fn json_decoder_reads_bare_strings() {
        let s: String = JsonDecoder.decode(br#""hello""#).unwrap();
        assert_eq!(s, "hello");
    }

    #[test]
    fn json_decoder_rejects_mismatched_shape() {
        let result: Result<User, _> = JsonDecoder.decode(b"[1,2,3]");
        assert!(matches!(result, Err(DecodeError::Json(_))));
    }

    #[test]
    fn json_decoder_reads_null_as_unit() {
        let unit: Result<(), _> = JsonDecoder.decode(b"null");
        assert!(unit.is_ok());
        let empty: Result<(), _> = JsonDecoder.decode(b"");
        assert!(matches!(empty, Err(DecodeError::Json(_))));
    }

    #[test]
    fn text_decoder_passes_bytes_through() {
        assert_eq!(TextDecoder.decode(b"plain body").unwrap(), "plain body");
    }

    #[test]
    fn text_decoder_rejects_invalid_utf8() {
        assert!(matches!(
            TextDecoder.decode(&[0xff, 0xfe]),
            Err(DecodeError::Utf8(_))
        ));
    }
}

//! Envelope Codec
//!
//! Conduit wraps every resource under a key named after its type:
//! `{"article": {...}}` on the way in and out, and
//! `{"articles": [...], "articlesCount": n}` for collections.
//!
//! [`Envelope`] is both an extractor (decode) and a response (encode).
//! [`Collection`] is a response only.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::response::{IntoResponse, Response};
use kernel::error::fields::FieldErrors;
use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{ConduitError, ConduitResult};

/// A type that travels under a single envelope key
pub trait Resource {
    /// Singular key, e.g. `"article"`
    const KEY: &'static str;
}

/// A resource that can also be listed
pub trait CollectionResource: Resource {
    /// Plural key, e.g. `"articles"`
    const COLLECTION_KEY: &'static str;
    /// Count key, e.g. `"articlesCount"`
    const COUNT_KEY: &'static str;
}

/// Single resource wrapped under `T::KEY`
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<T>(pub T);

/// Sequence wrapped under `T::COLLECTION_KEY` with its length under `T::COUNT_KEY`
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T>(pub Vec<T>);

/// Unwrap exactly one envelope level and deserialize the inner object
///
/// Fails with a validation error when the body is not JSON, the key is
/// absent, or a field is missing or mistyped. Unknown fields are ignored.
pub fn decode<T>(bytes: &[u8]) -> ConduitResult<T>
where
    T: Resource + DeserializeOwned,
{
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|_| ConduitError::invalid("body", "is not valid JSON"))?;

    let Value::Object(mut outer) = value else {
        return Err(ConduitError::invalid(T::KEY, "is missing"));
    };

    let inner = match outer.remove(T::KEY) {
        Some(inner @ Value::Object(_)) => inner,
        Some(_) => return Err(ConduitError::invalid(T::KEY, "must be an object")),
        None => return Err(ConduitError::invalid(T::KEY, "is missing")),
    };

    serde_json::from_value(inner).map_err(|e| field_error::<T>(&e))
}

/// Wrap `value` under `T::KEY`
pub fn encode<T>(value: &T) -> ConduitResult<Value>
where
    T: Resource + Serialize,
{
    let inner =
        serde_json::to_value(value).map_err(|e| ConduitError::Internal(e.to_string()))?;

    let mut outer = Map::with_capacity(1);
    outer.insert(T::KEY.to_owned(), inner);
    Ok(Value::Object(outer))
}

/// Point a serde error at the offending field when it names one
fn field_error<T: Resource>(err: &serde_json::Error) -> ConduitError {
    let message = err.to_string();

    if let Some(field) = message
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split_once('`'))
        .map(|(field, _)| field.to_owned())
    {
        return ConduitError::Validation(FieldErrors::single(field, "can't be blank"));
    }

    ConduitError::Validation(FieldErrors::single(T::KEY, message))
}

impl<T, S> FromRequest<S> for Envelope<T>
where
    T: Resource + DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ConduitError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ConduitError::invalid("body", e.body_text()))?;

        decode(&bytes).map(Envelope)
    }
}

impl<T> IntoResponse for Envelope<T>
where
    T: Resource + Serialize,
{
    fn into_response(self) -> Response {
        match encode(&self.0) {
            Ok(value) => Json(value).into_response(),
            Err(e) => e.into_response(),
        }
    }
}

impl<T> Serialize for Collection<T>
where
    T: CollectionResource + Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(T::COLLECTION_KEY, &self.0)?;
        map.serialize_entry(T::COUNT_KEY, &self.0.len())?;
        map.end()
    }
}

impl<T> IntoResponse for Collection<T>
where
    T: CollectionResource + Serialize,
{
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Note {
        text: String,
        #[serde(default)]
        tags: Vec<String>,
    }

    impl Resource for Note {
        const KEY: &'static str = "note";
    }

    impl CollectionResource for Note {
        const COLLECTION_KEY: &'static str = "notes";
        const COUNT_KEY: &'static str = "notesCount";
    }

    fn note(text: &str) -> Note {
        Note {
            text: text.into(),
            tags: vec![],
        }
    }

    fn field_errors(err: ConduitError) -> FieldErrors {
        match err {
            ConduitError::Validation(fields) => fields,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_unwraps_one_level() {
        let body = br#"{"note": {"text": "hi", "tags": ["a", "b"], "extra": 1}}"#;
        let decoded: Note = decode(body).unwrap();
        assert_eq!(decoded.text, "hi");
        assert_eq!(decoded.tags, vec!["a", "b"]);
    }

    #[test]
    fn test_decode_missing_envelope_key() {
        let err = decode::<Note>(br#"{"text": "hi"}"#).unwrap_err();
        assert_eq!(field_errors(err), FieldErrors::single("note", "is missing"));
    }

    #[test]
    fn test_decode_missing_field() {
        let err = decode::<Note>(br#"{"note": {}}"#).unwrap_err();
        assert_eq!(field_errors(err), FieldErrors::single("text", "can't be blank"));
    }

    #[test]
    fn test_decode_mistyped_field() {
        let err = decode::<Note>(br#"{"note": {"text": 5}}"#).unwrap_err();
        assert!(field_errors(err).get("note").is_some());
    }

    #[test]
    fn test_decode_rejects_non_json_and_non_object() {
        assert!(matches!(decode::<Note>(b"not json"), Err(ConduitError::Validation(_))));
        assert!(matches!(decode::<Note>(b"[1, 2]"), Err(ConduitError::Validation(_))));
        assert!(matches!(decode::<Note>(br#"{"note": "x"}"#), Err(ConduitError::Validation(_))));
    }

    #[test]
    fn test_encode_wraps_under_key() {
        let value = encode(&note("hi")).unwrap();
        assert_eq!(value, json!({ "note": { "text": "hi", "tags": [] } }));
    }

    #[test]
    fn test_collection_count_matches_length() {
        for n in [0usize, 1, 3] {
            let notes: Vec<Note> = (0..n).map(|i| note(&i.to_string())).collect();
            let value = serde_json::to_value(Collection(notes)).unwrap();
            assert_eq!(value["notes"].as_array().map(Vec::len), Some(n));
            assert_eq!(value["notesCount"], json!(n));
        }
    }

    #[test]
    fn test_collection_preserves_order() {
        let value = serde_json::to_value(Collection(vec![note("b"), note("a")])).unwrap();
        assert_eq!(value["notes"][0]["text"], "b");
        assert_eq!(value["notes"][1]["text"], "a");
    }
}

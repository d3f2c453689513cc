use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::error::HttpError;

/// Decodes a JSON request body. An empty body counts as `{}` so that field
/// validation, not the decoder, reports what is missing.
pub fn parse_json_body<T>(body: &Bytes) -> Result<T, HttpError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|err| HttpError::BadRequest(format!("invalid json body: {}", err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_domain::ThreatDraft;

    #[test]
    fn empty_body_yields_default() {
        let draft: ThreatDraft = parse_json_body(&Bytes::from_static(b"  ")).expect("default");
        assert!(draft.title.is_none());
    }

    #[test]
    fn malformed_body_is_bad_request() {
        let result: Result<ThreatDraft, _> = parse_json_body(&Bytes::from_static(b"{title:"));
        assert!(matches!(result, Err(HttpError::BadRequest(_))));
    }

    #[test]
    fn camel_case_fields_are_read() {
        let draft: ThreatDraft = parse_json_body(&Bytes::from_static(
            br#"{"title":"Phish","affectedUsers":3}"#,
        ))
        .expect("draft");
        assert_eq!(draft.title.as_deref(), Some("Phish"));
        assert_eq!(draft.affected_users, Some(3));
    }
}

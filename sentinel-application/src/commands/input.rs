// Shared input normalisation for mutation payloads

use std::str::FromStr;

use sentinel_domain::DomainError;

use crate::AppError;

/// Trimmed text; blank counts as absent.
pub fn normalize_text(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

pub fn required_text(field: &str, value: Option<String>) -> Result<String, AppError> {
    normalize_text(value).ok_or_else(|| AppError::BadRequest(format!("{field} is required")))
}

/// For partial updates: absent stays absent, present-but-blank is rejected.
pub fn patch_text(field: &str, value: Option<String>) -> Result<Option<String>, AppError> {
    match value {
        None => Ok(None),
        Some(raw) => required_text(field, Some(raw)).map(Some),
    }
}

pub fn parse_enum<T>(value: Option<String>) -> Result<Option<T>, AppError>
where
    T: FromStr<Err = DomainError>,
{
    match normalize_text(value) {
        Some(raw) => Ok(Some(raw.parse::<T>()?)),
        None => Ok(None),
    }
}

pub fn bounded_int(field: &str, value: i64, min: i64, max: i64) -> Result<i32, AppError> {
    if value < min || value > max {
        return Err(AppError::BadRequest(format!(
            "{field} must be between {min} and {max}"
        )));
    }
    i32::try_from(value).map_err(|_| AppError::BadRequest(format!("{field} is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_domain::Severity;

    #[test]
    fn blank_text_is_absent() {
        assert_eq!(normalize_text(Some("   ".to_string())), None);
        assert_eq!(normalize_text(Some(" ddos ".to_string())), Some("ddos".to_string()));
    }

    #[test]
    fn patch_text_rejects_blank_but_allows_missing() {
        assert!(patch_text("title", None).expect("absent").is_none());
        assert!(matches!(
            patch_text("title", Some(" ".to_string())),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn parse_enum_maps_domain_errors_to_bad_request() {
        let parsed: Option<Severity> = parse_enum(Some("HIGH".to_string())).expect("valid");
        assert_eq!(parsed, Some(Severity::High));
        let err = parse_enum::<Severity>(Some("severe".to_string())).expect_err("invalid");
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn bounded_int_checks_range() {
        assert_eq!(bounded_int("aiConfidence", 100, 0, 100).expect("edge"), 100);
        assert!(bounded_int("aiConfidence", 101, 0, 100).is_err());
        assert!(bounded_int("affectedUsers", -1, 0, i64::from(i32::MAX)).is_err());
    }
}

//! Validation utilities for Web API DTOs.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::web::error::ApiError;

/// A JSON extractor that validates the request body.
///
/// Malformed JSON is a 400. A body that parses but does not fit the target
/// type (an unknown status, a string where an id belongs) is a 422, as is a
/// body that fails `validator` rules, which come back with per-field details.
///
/// # Example
///
/// ```ignore
/// use asset_manager::web::dto::ValidatedJson;
///
/// async fn create_folder(
///     ValidatedJson(payload): ValidatedJson<CreateFolderRequest>,
/// ) -> Result<Json<ApiResponse<FolderResponse>>, ApiError> {
///     // payload is already validated
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| match rejection {
                JsonRejection::JsonDataError(e) => ApiError::unprocessable(e.body_text()),
                other => ApiError::bad_request(format!("Invalid JSON: {}", other.body_text())),
            })?;

        value.validate().map_err(ApiError::from_validation_errors)?;

        Ok(ValidatedJson(value))
    }
}

// ============================================================================
// Custom Validators
// ============================================================================

/// Validate that a string does not contain control characters or NULL bytes.
pub fn no_control_chars(value: &str) -> Result<(), validator::ValidationError> {
    if value
        .chars()
        .any(|c| c.is_control() && c != '\n' && c != '\r' && c != '\t')
    {
        return Err(validator::ValidationError::new("no_control_chars")
            .with_message("Must not contain control characters".into()));
    }
    Ok(())
}

/// Validate that a string is not empty after trimming whitespace.
pub fn not_empty_trimmed(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("not_empty_trimmed")
            .with_message("Must not be empty".into()));
    }
    Ok(())
}

/// Sanitize a string by removing control characters except newlines, carriage returns, and tabs.
pub fn sanitize_string(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\r' || *c == '\t')
        .collect()
}

// ============================================================================
// Form Field Parsing
// ============================================================================

/// Parse a list of ids from a form field such as `"1, 2,3"`.
pub fn parse_id_list(field: &str, value: &str) -> Result<Vec<i64>, ApiError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>().map_err(|_| {
                ApiError::unprocessable(format!("{field}: \"{part}\" is not a valid id."))
            })
        })
        .collect()
}

/// Parse a boolean form field.
pub fn parse_bool(field: &str, value: &str) -> Result<bool, ApiError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" => Ok(false),
        other => Err(ApiError::unprocessable(format!(
            "{field}: \"{other}\" is not a valid boolean."
        ))),
    }
}

/// Parse a whole number form field.
pub fn parse_int(field: &str, value: &str) -> Result<i64, ApiError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| ApiError::unprocessable(format!("{field}: A valid integer is required.")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::error::ErrorCode;

    #[test]
    fn test_no_control_chars() {
        assert!(no_control_chars("Shot on location").is_ok());
        assert!(no_control_chars("Line 1\nLine 2").is_ok());
        assert!(no_control_chars("Hello\x00World").is_err());
        assert!(no_control_chars("Hello\x1bWorld").is_err());
    }

    #[test]
    fn test_not_empty_trimmed() {
        assert!(not_empty_trimmed("  Intro  ").is_ok());
        assert!(not_empty_trimmed("").is_err());
        assert!(not_empty_trimmed("\t\n").is_err());
    }

    #[test]
    fn test_sanitize_string() {
        assert_eq!(sanitize_string("Hello\nWorld"), "Hello\nWorld");
        assert_eq!(sanitize_string("Hello\x07World"), "HelloWorld");
    }

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list("tags", "1, 2,3").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_id_list("tags", "").unwrap(), Vec::<i64>::new());

        let err = parse_id_list("tags", "1,x").unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnprocessableEntity);
        assert_eq!(err.message(), "tags: \"x\" is not a valid id.");
    }

    #[test]
    fn test_parse_bool_and_int() {
        assert!(parse_bool("enabled", "True").unwrap());
        assert!(!parse_bool("enabled", "0").unwrap());
        assert!(parse_bool("enabled", "maybe").is_err());

        assert_eq!(parse_int("duration", " 90 ").unwrap(), 90);
        assert!(parse_int("duration", "1.5").is_err());
    }
}

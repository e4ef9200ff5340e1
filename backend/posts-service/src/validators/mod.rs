/// Input validation for post and comment bodies
use std::borrow::Cow;
use std::collections::BTreeMap;
use validator::{ValidationError, ValidationErrors};

/// Field name to message, the shape returned to clients on a 400.
pub type FieldErrors = BTreeMap<String, String>;

pub const TEXT_REQUIRED: &str = "Text field is required";

/// Rejects empty and whitespace-only text.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some(Cow::Borrowed(TEXT_REQUIRED));
        return Err(err);
    }
    Ok(())
}

/// Flattens validator output to one message per field.
pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let message = errs
                .first()
                .and_then(|e| e.message.as_ref())
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("{} is invalid", field));
            (field.to_string(), message)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PostInput;
    use validator::Validate;

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("hello world").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("   \n\t").is_err());
    }

    #[test]
    fn test_missing_text_reports_text_field() {
        let input: PostInput = serde_json::from_str(r#"{"name": "Jane"}"#).unwrap();
        let errors = input.validate().unwrap_err();
        let fields = field_errors(&errors);

        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get("text").map(String::as_str), Some(TEXT_REQUIRED));
    }

    #[test]
    fn test_name_and_avatar_are_optional() {
        let input: PostInput = serde_json::from_str(r#"{"text": "first!"}"#).unwrap();
        assert!(input.validate().is_ok());
        assert!(input.name.is_none());
        assert!(input.avatar.is_none());
    }
}

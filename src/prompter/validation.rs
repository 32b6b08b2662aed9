use super::types::{TargetLanguage, ValidationError};

use serde::Deserialize;
use std::borrow::Cow;
use validator::Validate;

pub const MAX_WORDS: usize = 500;

pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Raw form input as it arrives from the UI.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IdeaInput {
    #[validate(custom(function = "validate_idea"))]
    pub idea: String,
    #[validate(custom(function = "validate_language_code"))]
    pub target_language: String,
}

fn validate_idea(idea: &str) -> Result<(), validator::ValidationError> {
    check_idea(idea).map_err(to_field_error)
}

fn validate_language_code(code: &str) -> Result<(), validator::ValidationError> {
    TargetLanguage::from_code(code).map(|_| ()).map_err(to_field_error)
}

fn check_idea(idea: &str) -> Result<(), ValidationError> {
    let count = count_words(idea);
    if count == 0 {
        return Err(ValidationError::EmptyIdea);
    }
    if count > MAX_WORDS {
        return Err(ValidationError::TooManyWords { count, max: MAX_WORDS });
    }
    Ok(())
}

fn to_field_error(err: ValidationError) -> validator::ValidationError {
    let mut field_err = match &err {
        ValidationError::EmptyIdea => validator::ValidationError::new("empty_idea"),
        ValidationError::TooManyWords { count, max } => {
            let mut e = validator::ValidationError::new("too_many_words");
            e.add_param(Cow::from("count"), count);
            e.add_param(Cow::from("max"), max);
            e
        }
        ValidationError::UnsupportedLanguage(code) => {
            let mut e = validator::ValidationError::new("unsupported_language");
            e.add_param(Cow::from("code"), code);
            e
        }
    };
    field_err.message = Some(Cow::Owned(err.to_string()));
    field_err
}

/// Inverse of `to_field_error`. The code and params carry everything needed.
fn from_field_error(err: &validator::ValidationError) -> ValidationError {
    let usize_param = |name: &str| {
        err.params
            .get(name)
            .and_then(|v| v.as_u64())
            .map(|n| n as usize)
            .unwrap_or_default()
    };

    match err.code.as_ref() {
        "empty_idea" => ValidationError::EmptyIdea,
        "too_many_words" => ValidationError::TooManyWords {
            count: usize_param("count"),
            max: usize_param("max"),
        },
        _ => ValidationError::UnsupportedLanguage(
            err.params
                .get("code")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
        ),
    }
}

/// Validates the form and resolves the target language.
/// The idea is checked before the language so its message wins when both fail.
pub fn validate_idea_input(input: &IdeaInput) -> Result<TargetLanguage, ValidationError> {
    if let Err(errors) = input.validate() {
        let fields = errors.field_errors();
        for field in ["idea", "target_language"] {
            if let Some(err) = fields.get(field).and_then(|errs| errs.first()) {
                return Err(from_field_error(err));
            }
        }
    }
    TargetLanguage::from_code(&input.target_language)
}

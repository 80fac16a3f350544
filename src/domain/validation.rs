//! Pure validation of candidate post payloads.
//!
//! Runs before any authorization check or persistence attempt. The single
//! schema lives here; HTTP handlers only reflect the resulting field-level
//! error set back to the caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Raw candidate fields as submitted by a caller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub subtitle: Option<String>,
    pub content: String,
    pub image_url: Option<String>,
}

/// A draft that passed validation, with optional fields normalized.
///
/// `subtitle` and `image_url` carry `None` for both falsy input states
/// (absent and empty string); a present `image_url` is the verbatim input,
/// already known to satisfy URL syntax.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidPost {
    pub title: String,
    pub subtitle: Option<String>,
    pub content: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
#[error("validation failed: {}", self.describe())]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    fn describe(&self) -> String {
        self.fields
            .iter()
            .map(|f| format!("{}: {}", f.field, f.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

pub fn validate_post(draft: PostDraft) -> Result<ValidPost, ValidationError> {
    let mut fields = Vec::new();

    if draft.title.trim().is_empty() {
        fields.push(FieldError {
            field: "title",
            message: "Title is required".to_string(),
        });
    }

    if draft.content.trim().is_empty() {
        fields.push(FieldError {
            field: "content",
            message: "Content is required".to_string(),
        });
    }

    let subtitle = draft.subtitle.filter(|value| !value.is_empty());

    let image_url = match draft.image_url.filter(|value| !value.is_empty()) {
        Some(value) => {
            if Url::parse(&value).is_err() {
                fields.push(FieldError {
                    field: "image_url",
                    message: "Invalid URL".to_string(),
                });
                None
            } else {
                Some(value)
            }
        }
        None => None,
    };

    if !fields.is_empty() {
        return Err(ValidationError { fields });
    }

    Ok(ValidPost {
        title: draft.title,
        subtitle,
        content: draft.content,
        image_url,
    })
}

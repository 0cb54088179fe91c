use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;
use uuid::Uuid;

use crate::store::StoreError;

/// Field name → messages, in the `errors.json` part of an error body.
/// Nested fields use dotted keys (`instructions.0.step_number`).
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation failed")]
    Validation(FieldErrors),
    #[error("Invalid recipe id")]
    InvalidId,
    #[error("Recipe not found")]
    NotFound,
    #[error("There is already a recipe with name: {0}.")]
    DuplicateName(String),
    #[error("Recipes not found")]
    InvalidReference(Vec<Uuid>),
    #[error("Failed to create all ingredients, review and try again.")]
    IngredientsFailed(Vec<String>),
    #[error("An error occurred writing to the db")]
    Storage(#[source] StoreError),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Storage(e)
    }
}

#[derive(Debug, Serialize)]
struct ErrorLocations {
    json: FieldErrors,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: u16,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<ErrorLocations>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::DuplicateName(_)
            | AppError::IngredientsFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidId => StatusCode::BAD_REQUEST,
            AppError::NotFound | AppError::InvalidReference(_) => StatusCode::NOT_FOUND,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn field_errors(&self) -> Option<FieldErrors> {
        match self {
            AppError::Validation(errors) => Some(errors.clone()),
            AppError::DuplicateName(_) => Some(FieldErrors::single("recipe_name", self.to_string())),
            AppError::InvalidReference(missing) => {
                let mut errors = FieldErrors::new();
                for id in missing {
                    errors.add("pin", format!("Recipe not found: {id}"));
                }
                Some(errors)
            }
            AppError::IngredientsFailed(names) => {
                let mut errors = FieldErrors::new();
                for name in names {
                    errors.add("ingredients", format!("Failed to save ingredient: {name}"));
                }
                Some(errors)
            }
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Storage(source) = &self {
            // detail stays in the logs
            error!(error = ?source, "storage failure");
        }

        let status = self.status();
        let message = match &self {
            AppError::Validation(_) | AppError::DuplicateName(_) => None,
            other => Some(other.to_string()),
        };
        let body = ErrorBody {
            code: status.as_u16(),
            status: status.canonical_reason().unwrap_or("Error"),
            message,
            errors: self.field_errors().map(|json| ErrorLocations { json }),
        };
        (status, Json(body)).into_response()
    }
}

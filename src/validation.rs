use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};

use crate::error::{AppError, FieldErrors};

pub const RECIPE_NAME_MAX: usize = 64;
pub const NOTES_MAX: usize = 1024;
pub const INGREDIENT_NAME_MAX: usize = 32;

/// Turns a deserialized request into normalized input, or says what is wrong with it.
pub trait Validate {
    type Output;

    fn validate(self) -> Result<Self::Output, FieldErrors>;
}

/// `Json<T>` whose rejections become `AppError::Validation`.
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ValidJson(value)),
            Err(rejection) => Err(AppError::Validation(FieldErrors::single(
                "_schema",
                rejection.body_text(),
            ))),
        }
    }
}

/// `Query<T>` whose rejections become `AppError::Validation`.
pub struct ValidQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(ValidQuery(value)),
            Err(rejection) => Err(AppError::Validation(FieldErrors::single(
                "_query",
                rejection.body_text(),
            ))),
        }
    }
}

/// Body that may be absent entirely; an empty body yields `T::default()`.
pub fn optional_json<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(FieldErrors::single("_schema", e.to_string())))
}

/// Accepts `3` as well as `"3"`.
pub fn int_or_numeric_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(n) => Ok(n),
        Raw::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom("Not a valid integer.")),
    }
}

/// Trims `value` and checks it is non-empty and at most `max` characters.
/// Problems are recorded under `field`.
pub fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: &str,
    max: usize,
) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, format!("{field} must not be empty."));
        return None;
    }
    if trimmed.chars().count() > max {
        errors.add(field, format!("{field} must not exceed {max} characters."));
        return None;
    }
    Some(trimmed.to_string())
}

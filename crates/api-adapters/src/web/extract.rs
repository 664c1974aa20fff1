//! Request extractors: bearer authentication, JSON/form payloads and typed
//! path and query parameters whose rejections use the API envelope.

use std::convert::Infallible;

use axum::extract::{FromRequest, FromRequestParts, Multipart, Path, Query, Request};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::request::Parts;
use axum::Json;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use domains::{Actor, DomainError, Upload, User, UserId};

use super::error::ApiError;
use super::AppState;

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// The authenticated, active caller. Rejects with 401 otherwise.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn actor(&self) -> Actor {
        Actor::new(self.0.id, self.0.role)
    }

    pub fn id(&self) -> UserId {
        self.0.id
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let token = bearer_token(parts)
            .ok_or_else(|| DomainError::unauthorized("not authorized, no token"))?;
        let user = state.services.auth.authenticate(token).await?;
        Ok(Self(user))
    }
}

/// The caller when a valid token is presented. Bad tokens read as anonymous.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl MaybeUser {
    pub fn actor(&self) -> Option<Actor> {
        self.0.as_ref().map(|user| Actor::new(user.id, user.role))
    }

    pub fn id(&self) -> Option<UserId> {
        self.0.as_ref().map(|user| user.id)
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Infallible> {
        let Some(token) = bearer_token(parts) else {
            return Ok(Self(None));
        };
        match state.services.auth.authenticate(token).await {
            Ok(user) => Ok(Self(Some(user))),
            Err(err) => {
                tracing::debug!(error = %err, "ignoring invalid optional credential");
                Ok(Self(None))
            }
        }
    }
}

/// JSON body with rejections rendered as validation errors.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, ApiError> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(|rejection| DomainError::validation(rejection.body_text()).into())
    }
}

#[derive(Debug)]
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, ApiError> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(value)| Self(value))
            .map_err(|rejection| DomainError::validation(rejection.body_text()).into())
    }
}

#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, ApiError> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| Self(value))
            .map_err(|rejection| DomainError::validation(rejection.body_text()).into())
    }
}

/// A command sent either as JSON or as `multipart/form-data`.
///
/// Multipart text fields become JSON fields; values that parse as a JSON
/// object or array are kept structured, repeated names become arrays.
/// File parts are collected in `files`, up to the configured count.
#[derive(Debug)]
pub struct Payload<T> {
    pub data: T,
    pub files: Vec<Upload>,
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<mime::Mime>().ok())
        .is_some_and(|m| m.type_() == mime::MULTIPART && m.subtype() == mime::FORM_DATA)
}

pub(crate) fn form_value(text: String) -> Value {
    let trimmed = text.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        if let Ok(value @ (Value::Object(_) | Value::Array(_))) = serde_json::from_str::<Value>(&text) {
            return value;
        }
    }
    Value::String(text)
}

pub(crate) fn insert_field(fields: &mut Map<String, Value>, name: String, value: Value) {
    match fields.get_mut(&name) {
        Some(Value::Array(items)) if !value.is_array() => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            fields.insert(name, value);
        }
    }
}

fn bad_form(err: impl std::fmt::Display) -> ApiError {
    DomainError::validation(format!("invalid form data: {err}")).into()
}

impl<T> FromRequest<AppState> for Payload<T>
where
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, ApiError> {
        let mut fields = Map::new();
        let mut files = Vec::new();

        if is_multipart(&req) {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|rejection| bad_form(rejection.body_text()))?;
            while let Some(field) = multipart.next_field().await.map_err(|e| bad_form(e.body_text()))? {
                let name = field.name().unwrap_or_default().to_owned();
                if let Some(file_name) = field.file_name().map(str::to_owned) {
                    if files.len() == state.uploads.max_files {
                        return Err(DomainError::validation(format!(
                            "at most {} files can be uploaded at once",
                            state.uploads.max_files
                        ))
                        .into());
                    }
                    let content_type = field.content_type().map(str::to_owned);
                    let bytes = field.bytes().await.map_err(|e| bad_form(e.body_text()))?;
                    files.push(Upload {
                        field_name: name,
                        file_name: Some(file_name),
                        content_type,
                        bytes,
                    });
                } else {
                    let text = field.text().await.map_err(|e| bad_form(e.body_text()))?;
                    insert_field(&mut fields, name, form_value(text));
                }
            }
        } else {
            let body = Bytes::from_request(req, state)
                .await
                .map_err(|rejection| bad_form(rejection.body_text()))?;
            if !body.iter().all(u8::is_ascii_whitespace) {
                match serde_json::from_slice(&body) {
                    Ok(Value::Object(map)) => fields = map,
                    Ok(_) => return Err(DomainError::validation("request body must be a JSON object").into()),
                    Err(err) => return Err(DomainError::validation(format!("invalid JSON body: {err}")).into()),
                }
            }
        }

        let data = serde_json::from_value(Value::Object(fields))
            .map_err(|err| ApiError::from(DomainError::validation(err.to_string())))?;
        Ok(Self { data, files })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn structured_form_values_are_parsed() {
        assert_eq!(
            form_value(r#"{"value": 2, "unit": "years"}"#.into()),
            json!({"value": 2, "unit": "years"})
        );
        assert_eq!(form_value("[1, 2]".into()), json!([1, 2]));
        assert_eq!(form_value("{not json".into()), json!("{not json"));
        assert_eq!(form_value("42".into()), json!("42"));
    }

    #[test]
    fn repeated_fields_collect_into_arrays() {
        let mut fields = Map::new();
        insert_field(&mut fields, "tags".into(), json!("a"));
        insert_field(&mut fields, "tags".into(), json!("b"));
        insert_field(&mut fields, "tags".into(), json!("c"));
        insert_field(&mut fields, "name".into(), json!("Luna"));
        assert_eq!(Value::Object(fields), json!({"tags": ["a", "b", "c"], "name": "Luna"}));
    }
}

//! Replayable request descriptions.
//!
//! DESIGN
//! ======
//! A `reqwest::RequestBuilder` is consumed on send and multipart forms are not
//! `Clone`, so the pipeline works from this owned description instead and
//! materializes a fresh builder per attempt. That is what makes the
//! refresh-then-replay path possible without mutating shared client config.

#[cfg(test)]
#[path = "request_test.rs"]
mod request_test;

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use super::error::ApiError;

/// One field of a multipart body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormField {
    Text { name: String, value: String },
    File { name: String, file_name: String, mime: String, bytes: Vec<u8> },
}

/// Multipart form that can be rebuilt for each attempt.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MultipartBody {
    fields: Vec<FormField>,
}

impl MultipartBody {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.push(FormField::Text { name: name.to_owned(), value: value.into() });
        self
    }

    /// Append a text field only when a value is present.
    #[must_use]
    pub fn text_opt(self, name: &str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.text(name, value),
            None => self,
        }
    }

    #[must_use]
    pub fn file(mut self, name: &str, file_name: &str, mime: &str, bytes: Vec<u8>) -> Self {
        self.fields.push(FormField::File {
            name: name.to_owned(),
            file_name: file_name.to_owned(),
            mime: mime.to_owned(),
            bytes,
        });
        self
    }

    #[must_use]
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Look up the first text value for `name`.
    #[must_use]
    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.fields.iter().find_map(|field| match field {
            FormField::Text { name: n, value } if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    pub(crate) fn to_form(&self) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for field in &self.fields {
            form = match field {
                FormField::Text { name, value } => form.text(name.clone(), value.clone()),
                FormField::File { name, file_name, mime, bytes } => {
                    let part = Part::bytes(bytes.clone())
                        .file_name(file_name.clone())
                        .mime_str(mime)?;
                    form.part(name.clone(), part)
                }
            };
        }
        Ok(form)
    }
}

/// Request payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(MultipartBody),
}

/// An owned, replayable description of one logical backend call.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base, e.g. `"/room-bookings/12/"`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    /// Credential to use instead of the stored one.
    pub bearer_override: Option<String>,
    /// Whether a 401 may trigger the refresh-and-retry path.
    pub allow_refresh: bool,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            bearer_override: None,
            allow_refresh: true,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_owned(), value.to_string()));
        self
    }

    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    #[must_use]
    pub fn multipart(mut self, body: MultipartBody) -> Self {
        self.body = RequestBody::Multipart(body);
        self
    }

    #[must_use]
    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer_override = Some(token.into());
        self
    }

    /// Opt out of the 401 refresh path (used for calls that must not loop
    /// back into auth, such as logout).
    #[must_use]
    pub fn without_refresh(mut self) -> Self {
        self.allow_refresh = false;
        self
    }
}

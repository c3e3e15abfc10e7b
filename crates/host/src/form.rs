//! Form bodies posted by the control panel
//!
//! Browsers send `FormData` as `multipart/form-data`; plain HTML forms and
//! curl send `application/x-www-form-urlencoded`. Both end up as a flat map
//! of text fields.

use std::collections::HashMap;

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::header,
    response::{IntoResponse, Response},
    Form,
};
use tracing::debug;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormFields(pub HashMap<String, String>);

impl FormFields {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Field parsed with `parse_leading_int`
    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).map(parse_leading_int)
    }
}

/// `toInt`-style parse: optional sign, then digits up to the first non-digit
pub fn parse_leading_int(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, d| acc.saturating_mul(10).saturating_add(i64::from(d - b'0')));
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"))
}

#[async_trait]
impl<S> FromRequest<S> for FormFields
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_multipart(&req) {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            return Ok(Self(fields));
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let mut fields = HashMap::new();
        while let Some(field) = multipart.next_field().await.map_err(IntoResponse::into_response)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            // File parts are not used by any control
            if field.file_name().is_some() {
                debug!(%name, "skipping file part");
                continue;
            }
            let value = field.text().await.map_err(IntoResponse::into_response)?;
            fields.insert(name, value);
        }
        Ok(Self(fields))
    }
}

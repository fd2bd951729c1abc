use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use std::sync::Arc;

use crate::error::AppError;

pub const ANTIFORGERY_COOKIE: &str = "eventease.antiforgery";
pub const ANTIFORGERY_HEADER: &str = "x-csrf-token";

/// Proof that a mutating request carried the anti-forgery token.
///
/// Double-submit check: the token issued by `GET /antiforgery` lives in a
/// cookie, and the client has to echo it in the `X-CSRF-Token` header.
#[derive(Debug, Clone)]
pub struct Antiforgery;

impl FromRequestParts<Arc<crate::AppState>> for Antiforgery {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<crate::AppState>,
    ) -> Result<Self, Self::Rejection> {
        if !state.config.features.enable_antiforgery {
            return Ok(Antiforgery);
        }

        let header_token = parts
            .headers
            .get(ANTIFORGERY_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AppError::Antiforgery)?;

        let cookie_token = cookie_value(&parts.headers, ANTIFORGERY_COOKIE)
            .ok_or(AppError::Antiforgery)?;

        if !constant_time_eq(header_token.as_bytes(), cookie_token.as_bytes()) {
            tracing::warn!("Rejected {} {}: anti-forgery token mismatch", parts.method, parts.uri);
            return Err(AppError::Antiforgery);
        }

        Ok(Antiforgery)
    }
}

/// Fresh token plus the `Set-Cookie` value that stores it.
pub fn issue_token() -> (String, String) {
    let token = uuid::Uuid::new_v4().simple().to_string();
    let cookie = format!("{ANTIFORGERY_COOKIE}={token}; Path=/; HttpOnly; SameSite=Strict");
    (token, cookie)
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

//! Request extractors that reject with the JSON error envelope instead of
//! axum's plain-text defaults, plus [`RequestOrigin`] for the audit trail.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequest, FromRequestParts};
use axum::http::request::Parts;
use axum::http::header::USER_AGENT;

use crate::error::AppError;

/// `axum::Json` with [`AppError`] as the rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Query` with [`AppError`] as the rejection.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// `axum::extract::Path` with [`AppError`] as the rejection.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// Where a request came from, as recorded in audit entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOrigin {
    /// First `X-Forwarded-For` entry, else the socket peer address.
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestOrigin {
    fn from_parts(parts: &Parts) -> Self {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from);

        let peer = || {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        };

        let user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        Self {
            ip_address: forwarded.or_else(peer),
            user_agent,
        }
    }
}

impl<S> FromRequestParts<S> for RequestOrigin
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts(builder: axum::http::request::Builder) -> Parts {
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn first_forwarded_address_wins() {
        let mut parts = parts(
            Request::builder()
                .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
                .header(USER_AGENT, "curl/8.0"),
        );
        parts
            .extensions
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 5000))));

        let origin = RequestOrigin::from_parts(&parts);
        assert_eq!(origin.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(origin.user_agent.as_deref(), Some("curl/8.0"));
    }

    #[test]
    fn peer_address_is_the_fallback() {
        let mut parts = parts(Request::builder());
        parts
            .extensions
            .insert(ConnectInfo(SocketAddr::from(([192, 168, 1, 20], 5000))));

        let origin = RequestOrigin::from_parts(&parts);
        assert_eq!(origin.ip_address.as_deref(), Some("192.168.1.20"));
        assert_eq!(origin.user_agent, None);
    }

    #[test]
    fn nothing_known_yields_empty_origin() {
        assert_eq!(
            RequestOrigin::from_parts(&parts(Request::builder())),
            RequestOrigin::default()
        );
    }
}

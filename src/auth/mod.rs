//! Login module.
//!
//! Checks submitted credentials against the configured account, guarded by the
//! failed-attempt lockout. Passwords are compared in constant time.

mod lockout;

pub use lockout::*;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::db::KeyValueStore;

/// The account accepted by the login endpoint.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    /// `None` rejects every attempt
    pub password: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Credentials {
    /// Whether `email`/`password` match this account.
    pub fn verify(&self, email: &str, password: &str) -> bool {
        let Some(expected) = &self.password else {
            return false;
        };
        let email_ok = email.trim().eq_ignore_ascii_case(self.email.trim());
        let password_ok = constant_time_compare(password, expected);
        email_ok & password_ok
    }
}

/// Request body for `POST /api/auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Result of a login attempt. Lockout is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum LoginOutcome {
    Success {
        email: String,
    },
    #[serde(rename_all = "camelCase")]
    InvalidCredentials {
        attempts_remaining: u32,
    },
    #[serde(rename_all = "camelCase")]
    Locked {
        seconds_remaining: u64,
    },
}

impl LoginOutcome {
    pub fn status_code(&self) -> StatusCode {
        match self {
            LoginOutcome::Success { .. } => StatusCode::OK,
            LoginOutcome::InvalidCredentials { .. } => StatusCode::UNAUTHORIZED,
            LoginOutcome::Locked { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

#[derive(Serialize)]
struct LoginResponse<'a> {
    success: bool,
    data: &'a LoginOutcome,
}

impl IntoResponse for LoginOutcome {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = LoginResponse {
            success: matches!(self, LoginOutcome::Success { .. }),
            data: &self,
        };
        (status, Json(body)).into_response()
    }
}

/// Credential check wrapped in the lockout guard.
pub struct Authenticator<S> {
    credentials: Arc<Credentials>,
    guard: LockoutGuard<S>,
}

impl<S> Clone for Authenticator<S> {
    fn clone(&self) -> Self {
        Self {
            credentials: Arc::clone(&self.credentials),
            guard: self.guard.clone(),
        }
    }
}

impl<S: KeyValueStore> Authenticator<S> {
    pub fn new(credentials: Credentials, guard: LockoutGuard<S>) -> Self {
        Self {
            credentials: Arc::new(credentials),
            guard,
        }
    }

    pub fn guard(&self) -> &LockoutGuard<S> {
        &self.guard
    }

    /// Attempt a login. While locked the credentials are not even looked at.
    pub async fn login(&self, email: &str, password: &str) -> LoginOutcome {
        let status = self.guard.check_lockout().await;
        if status.locked {
            return LoginOutcome::Locked {
                seconds_remaining: status.seconds_remaining,
            };
        }

        if self.credentials.verify(email, password) {
            self.guard.record_success().await;
            tracing::info!("Login succeeded for {}", email);
            return LoginOutcome::Success {
                email: self.credentials.email.clone(),
            };
        }

        let outcome = self.guard.record_failure().await;
        tracing::warn!("Login failed for {}", email);
        if outcome.locked {
            LoginOutcome::Locked {
                seconds_remaining: self.guard.policy().duration.as_secs(),
            }
        } else {
            LoginOutcome::InvalidCredentials {
                attempts_remaining: outcome.attempts_remaining,
            }
        }
    }
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    a_bytes.ct_eq(b_bytes).into()
}

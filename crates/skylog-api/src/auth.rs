//! `auth.*` procedures.
//!
//! | Procedure | Auth | Notes |
//! |-----------|------|-------|
//! | `auth.me` | public | Current identity or `null`; never an error |
//! | `auth.logout` | public | Clears the session cookie unconditionally |

use axum::{Json, http::header, response::IntoResponse};
use serde_json::json;
use skylog_core::user::User;

use crate::session::{MaybeUser, clear_session_cookie};

/// `GET /api/auth.me`
pub async fn me<S>(MaybeUser(user): MaybeUser) -> Json<Option<User>> {
  Json(user)
}

/// `POST /api/auth.logout` — succeeds whether or not a session existed.
pub async fn logout() -> impl IntoResponse {
  (
    [(header::SET_COOKIE, clear_session_cookie())],
    Json(json!({ "success": true })),
  )
}

//! Session cookie verification and the identity extractors.
//!
//! Identity rides in the `skylog_session` cookie: the base64url-encoded open
//! id joined with a keyed SHA-256 digest over it. This layer only resolves an
//! already-issued artifact into a [`User`]; minting the cookie on sign-in is
//! the upstream login flow's job (it calls [`SessionKey::issue`]).

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use sha2::{Digest as _, Sha256};
use skylog_core::{store::TelemetryStore, user::User};

use crate::{AppState, error::ApiError};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "skylog_session";

// ─── Signing key ─────────────────────────────────────────────────────────────

/// The secret used to sign and verify session cookie values.
pub struct SessionKey {
  secret: String,
}

impl SessionKey {
  pub fn new(secret: impl Into<String>) -> Self {
    Self { secret: secret.into() }
  }

  fn digest(&self, open_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(self.secret.as_bytes());
    hasher.update([0u8]);
    hasher.update(open_id.as_bytes());
    hex::encode(hasher.finalize())
  }

  /// Produce a cookie value binding `open_id` to this key.
  pub fn issue(&self, open_id: &str) -> String {
    format!("{}.{}", B64.encode(open_id), self.digest(open_id))
  }

  /// Recover the open id from a cookie value, if the signature holds.
  pub fn verify(&self, token: &str) -> Option<String> {
    let (encoded, digest) = token.split_once('.')?;
    let open_id = String::from_utf8(B64.decode(encoded).ok()?).ok()?;
    // Digests are fixed-length hex; plain comparison over equal-length
    // strings.
    (self.digest(&open_id) == digest).then_some(open_id)
  }
}

// ─── Cookie plumbing ─────────────────────────────────────────────────────────

/// `Set-Cookie` value carrying a freshly issued session token.
pub fn session_cookie(token: &str) -> String {
  format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

/// `Set-Cookie` value that expires the session cookie immediately.
pub fn clear_session_cookie() -> String {
  format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Pull the session token out of the request's `Cookie` headers.
fn session_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .find_map(|pair| pair.trim().strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
}

// ─── Extractors ──────────────────────────────────────────────────────────────

/// The resolved identity, or `None` — for public procedures.
///
/// An absent cookie, a bad signature, and a signature over an unknown user
/// all resolve to `None`; only a store failure is an error.
pub struct MaybeUser(pub Option<User>);

/// A resolved identity — protected procedures reject with
/// [`ApiError::Unauthenticated`] when none resolves.
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<AppState<S>> for MaybeUser
where
  S: TelemetryStore + Clone + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let Some(token) = session_token(&parts.headers) else {
      return Ok(Self(None));
    };
    let Some(open_id) = state.sessions.verify(token) else {
      tracing::debug!("session cookie failed signature verification");
      return Ok(Self(None));
    };
    let user = state
      .store
      .user_by_open_id(&open_id)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?;
    Ok(Self(user))
  }
}

impl<S> FromRequestParts<AppState<S>> for CurrentUser
where
  S: TelemetryStore + Clone + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let MaybeUser(user) = MaybeUser::from_request_parts(parts, state).await?;
    user.map(Self).ok_or(ApiError::Unauthenticated)
  }
}

//! Authentication extractors.
//!
//! Sign-in happens at the identity provider, which writes a [`CurrentUser`]
//! into the shared session store. Handlers state what they need by taking
//! one of these guards as an argument:
//!
//! - [`RequireAuth`] - any signed-in user, otherwise 401
//! - [`RequireAdmin`] - an admin, otherwise 401 (signed out) or 403
//!
//! A session store that cannot be read is a 500, not a 401.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::{AppError, set_sentry_user};
use crate::models::{CurrentUser, session_keys};

/// Extractor that requires a signed-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn my_wishlist(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, user {}!", user.id)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Extractor that requires a signed-in admin.
pub struct RequireAdmin(pub CurrentUser);

/// Read the current user out of the request's session.
async fn current_user(parts: &Parts) -> Result<CurrentUser, AppError> {
    // Set by SessionManagerLayer
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_string()))?;

    let user: CurrentUser = session
        .get(session_keys::CURRENT_USER)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to load session");
            AppError::Internal(format!("session store: {e}"))
        })?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_string()))?;

    set_sentry_user(&user.id);
    Ok(user)
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_user(parts).await.map(Self)
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(parts).await?;
        if !user.role.is_admin() {
            tracing::warn!(user_id = %user.id, path = %parts.uri.path(), "Non-admin hit admin route");
            return Err(AppError::Forbidden("admin access required".to_string()));
        }
        Ok(Self(user))
    }
}

/// Helper to set the current user in the session.
///
/// Used by fixtures and by deployments that sign users in on this host.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the current user from the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}

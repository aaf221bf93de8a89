//! Role-based access control.
//!
//! Every route group names its allowed roles once, here, as a [`RoleSet`]
//! marker type. Handlers take `RequireRole<Group>` and never see a caller
//! outside the group. The role is read from the live user record, not from
//! the token.

use std::marker::PhantomData;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use staywatch_core::error::CoreError;
use staywatch_core::roles::Role;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// A named set of roles allowed on a route group.
pub trait RoleSet: Send + Sync + 'static {
    const ALLOWED: &'static [Role];
}

/// `/guests`
pub struct HotelOnly;
/// `/police`, `/notifications`
pub struct PoliceOnly;
/// `/admin`
pub struct AdminOnly;
/// `/auth/logout`, `/users/me`
pub struct AnyRole;

impl RoleSet for HotelOnly {
    const ALLOWED: &'static [Role] = &[Role::Hotel];
}

impl RoleSet for PoliceOnly {
    const ALLOWED: &'static [Role] = &[Role::Police];
}

impl RoleSet for AdminOnly {
    const ALLOWED: &'static [Role] = &[Role::RegionalAdmin];
}

impl RoleSet for AnyRole {
    const ALLOWED: &'static [Role] = Role::ALL;
}

/// An [`AuthUser`] whose role is in `R::ALLOWED`. Rejects with 403 otherwise.
///
/// ```ignore
/// async fn admin_only(RequireRole(auth, ..): RequireRole<AdminOnly>) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireRole<R: RoleSet>(pub AuthUser, pub PhantomData<R>);

impl<R: RoleSet> RequireRole<R> {
    pub fn into_inner(self) -> AuthUser {
        self.0
    }
}

pub(crate) fn check_role(role: Role, allowed: &[Role]) -> Result<(), AppError> {
    if allowed.contains(&role) {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(format!(
            "user role '{role}' is not authorized for this resource"
        ))))
    }
}

impl<R: RoleSet> FromRequestParts<AppState> for RequireRole<R> {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        check_role(auth.user.role, R::ALLOWED)?;
        Ok(RequireRole(auth, PhantomData))
    }
}

//! Per-route authorization decisions over the identity attached by
//! [`crate::middleware::identify`]. Purely claim-based: the admin flag and
//! username are taken from the token as-is.

use crate::error::ApiError;

use super::token::Identity;

pub fn require_authenticated(identity: Option<&Identity>) -> Result<&Identity, ApiError> {
    identity.ok_or_else(unauthorized)
}

pub fn require_admin(identity: Option<&Identity>) -> Result<&Identity, ApiError> {
    match identity {
        Some(id) if id.is_admin => Ok(id),
        _ => Err(unauthorized()),
    }
}

/// Admins pass for any username; everyone else only for their own.
pub fn require_self_or_admin<'a>(
    identity: Option<&'a Identity>,
    route_username: &str,
) -> Result<&'a Identity, ApiError> {
    match identity {
        Some(id) if id.is_admin || id.username == route_username => Ok(id),
        _ => Err(unauthorized()),
    }
}

fn unauthorized() -> ApiError {
    ApiError::unauthorized("Unauthorized")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> Identity {
        Identity { username: name.into(), is_admin: false }
    }

    fn admin() -> Identity {
        Identity { username: "admin".into(), is_admin: true }
    }

    #[test]
    fn anonymous_is_never_authorized() {
        assert!(require_authenticated(None).is_err());
        assert!(require_admin(None).is_err());
        assert_eq!(require_self_or_admin(None, "u1").unwrap_err().status_code(), 401);
    }

    #[test]
    fn any_identity_is_authenticated() {
        assert!(require_authenticated(Some(&user("u1"))).is_ok());
    }

    #[test]
    fn admin_routes_need_the_admin_flag() {
        assert!(require_admin(Some(&admin())).is_ok());
        assert!(require_admin(Some(&user("admin"))).is_err());
    }

    #[test]
    fn self_or_admin() {
        assert!(require_self_or_admin(Some(&user("u1")), "u1").is_ok());
        assert!(require_self_or_admin(Some(&admin()), "u1").is_ok());
        assert!(require_self_or_admin(Some(&user("u2")), "u1").is_err());
    }

    #[test]
    fn username_match_is_exact() {
        assert!(require_self_or_admin(Some(&user("U1")), "u1").is_err());
        assert!(require_self_or_admin(Some(&user("u1 ")), "u1").is_err());
    }
}

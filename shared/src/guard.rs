use lambda_http::{http::StatusCode, Body, Error, Response};

use crate::types::SessionPayload;

const DASHBOARD_ROOT: &str = "/dashboard";
const AUTH_ROUTES: [&str; 2] = ["/login", "/signup"];

#[derive(Debug, PartialEq, Eq)]
pub enum GuardDecision {
    PassThrough,
    RedirectToLogin,
    RedirectToDashboard,
}

/// Route guard policy, evaluated before any routing. Pure function of the
/// request path and the verified session; no state, no caching.
pub fn check(path: &str, session: Option<&SessionPayload>) -> GuardDecision {
    match session {
        Some(_) => {
            if AUTH_ROUTES.iter().any(|route| path.starts_with(route)) || path == "/" {
                GuardDecision::RedirectToDashboard
            } else {
                GuardDecision::PassThrough
            }
        }
        None => {
            if path.starts_with(DASHBOARD_ROOT) {
                GuardDecision::RedirectToLogin
            } else {
                GuardDecision::PassThrough
            }
        }
    }
}

pub fn redirect(location: &str) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::SEE_OTHER)
        .header("Location", location)
        .body(Body::Empty)
        .map_err(Box::new)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SessionPayload {
        SessionPayload {
            username: "alice".to_string(),
            expires_at: chrono::Utc::now().timestamp() + 3600,
        }
    }

    #[test]
    fn test_unauthenticated_dashboard_redirects_to_login() {
        assert_eq!(check("/dashboard", None), GuardDecision::RedirectToLogin);
        assert_eq!(
            check("/dashboard/settings", None),
            GuardDecision::RedirectToLogin
        );
    }

    #[test]
    fn test_unauthenticated_public_paths_pass() {
        assert_eq!(check("/", None), GuardDecision::PassThrough);
        assert_eq!(check("/login", None), GuardDecision::PassThrough);
        assert_eq!(check("/signup", None), GuardDecision::PassThrough);
        assert_eq!(check("/about", None), GuardDecision::PassThrough);
    }

    #[test]
    fn test_authenticated_auth_pages_redirect_to_dashboard() {
        let s = session();
        assert_eq!(
            check("/login", Some(&s)),
            GuardDecision::RedirectToDashboard
        );
        assert_eq!(
            check("/signup", Some(&s)),
            GuardDecision::RedirectToDashboard
        );
    }

    #[test]
    fn test_authenticated_root_redirects_to_dashboard() {
        let s = session();
        assert_eq!(check("/", Some(&s)), GuardDecision::RedirectToDashboard);
    }

    #[test]
    fn test_authenticated_other_paths_pass() {
        let s = session();
        assert_eq!(check("/dashboard", Some(&s)), GuardDecision::PassThrough);
        assert_eq!(check("/files", Some(&s)), GuardDecision::PassThrough);
    }
}

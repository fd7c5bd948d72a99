use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::config;
use crate::identity::CurrentIdentity;

/// Outcome of evaluating the route policy for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Redirect(String),
}

/// Pure route policy: paths under the protected prefix require a session;
/// anonymous requests there are redirected to the login page. Everything
/// else passes regardless of identity.
pub fn evaluate(path: &str, authenticated: bool, prefix: &str, login_path: &str) -> RouteDecision {
    if path.starts_with(prefix) && !authenticated {
        RouteDecision::Redirect(login_path.to_string())
    } else {
        RouteDecision::Allow
    }
}

/// Applies the route policy once per request, after the session resolver has
/// populated the identity extension.
pub async fn route_guard_middleware(request: Request, next: Next) -> Response {
    let auth = &config::config().auth;
    let authenticated = request
        .extensions()
        .get::<CurrentIdentity>()
        .map(CurrentIdentity::is_authenticated)
        .unwrap_or(false);

    match evaluate(
        request.uri().path(),
        authenticated,
        &auth.protected_prefix,
        &auth.login_path,
    ) {
        RouteDecision::Allow => next.run(request).await,
        RouteDecision::Redirect(target) => Redirect::to(&target).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protected_prefix_requires_identity() {
        assert_eq!(
            evaluate("/dashboard", false, "/dashboard", "/login"),
            RouteDecision::Redirect("/login".to_string())
        );
        assert_eq!(
            evaluate("/dashboard/recipes/new", false, "/dashboard", "/login"),
            RouteDecision::Redirect("/login".to_string())
        );
    }

    #[test]
    fn authenticated_requests_pass_protected_paths() {
        assert_eq!(
            evaluate("/dashboard", true, "/dashboard", "/login"),
            RouteDecision::Allow
        );
    }

    #[test]
    fn public_paths_allow_anonymous() {
        assert_eq!(evaluate("/", false, "/dashboard", "/login"), RouteDecision::Allow);
        assert_eq!(
            evaluate("/recipes/tomato-soup-a1b2c3", false, "/dashboard", "/login"),
            RouteDecision::Allow
        );
        assert_eq!(
            evaluate("/login", false, "/dashboard", "/login"),
            RouteDecision::Allow
        );
    }
}

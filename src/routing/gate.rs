//! Route authorization gate.
//!
//! Stateless: the decision is recomputed from the current session on every
//! navigation, so a logout or role change takes effect at the next one.

use super::route::Route;
use crate::domain::Session;

/// Outcome of checking a route against the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationDecision {
    Allow,
    /// No identity is known.
    RedirectLogin,
    /// The identity holds none of the required roles.
    RedirectUnauthorized,
}

/// Decides whether `route` may be rendered for `session`.
///
/// Public routes always allow. Otherwise an identity is required (a token
/// alone is not enough), and when the route names required roles the
/// identity must hold at least one of them.
#[must_use]
pub fn authorize(session: &Session, route: &Route) -> AuthorizationDecision {
    if route.is_public() {
        return AuthorizationDecision::Allow;
    }
    let Some(identity) = session.identity() else {
        return AuthorizationDecision::RedirectLogin;
    };
    if identity.has_any_role(&route.required_roles()) {
        AuthorizationDecision::Allow
    } else {
        AuthorizationDecision::RedirectUnauthorized
    }
}

/// Result of resolving a requested path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Render this route.
    Render(Route),
    /// Render `to` instead of the requested route.
    Redirect { requested: Route, to: Route },
    /// The path names no known route.
    NotFound(String),
}

impl Navigation {
    /// The route that ends up on screen, if any.
    #[must_use]
    pub const fn route(&self) -> Option<&Route> {
        match self {
            Self::Render(route) | Self::Redirect { to: route, .. } => Some(route),
            Self::NotFound(_) => None,
        }
    }
}

/// Resolves `path` into what should be shown.
///
/// Applies [`authorize`], and additionally sends a signed-in user away from
/// the guest-only sign-up and login pages to `/home`.
#[must_use]
pub fn navigate(session: &Session, path: &str) -> Navigation {
    let Some(requested) = Route::parse(path) else {
        tracing::debug!(path, "unknown route");
        return Navigation::NotFound(path.to_string());
    };

    if requested.is_guest_only() && session.identity().is_some() {
        return Navigation::Redirect {
            requested,
            to: Route::Home,
        };
    }

    let decision = authorize(session, &requested);
    tracing::debug!(route = %requested, ?decision, "route authorization");

    match decision {
        AuthorizationDecision::Allow => Navigation::Render(requested),
        AuthorizationDecision::RedirectLogin => Navigation::Redirect {
            requested,
            to: Route::Login,
        },
        AuthorizationDecision::RedirectUnauthorized => Navigation::Redirect {
            requested,
            to: Route::Unauthorized,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Identity, Role};
    use rstest::rstest;

    fn session_with(roles: &[&str]) -> Session {
        let identity = Identity {
            id: "u1".into(),
            display_name: "Ada".into(),
            email: "ada@example.edu".into(),
            erp: None,
            roles: roles.iter().map(|r| Role::from(*r)).collect(),
        };
        Session::restored("tok".into(), Some(identity))
    }

    #[rstest]
    #[case(Route::Home)]
    #[case(Route::Profile)]
    #[case(Route::Teachers)]
    #[case(Route::Course { id: "c1".into() })]
    #[case(Route::Post { id: "p1".into() })]
    #[case(Route::NewTeacher)]
    fn no_identity_redirects_to_login(#[case] route: Route) {
        assert_eq!(
            authorize(&Session::new(), &route),
            AuthorizationDecision::RedirectLogin
        );
    }

    #[test]
    fn token_without_identity_is_not_enough() {
        let session = Session::restored("tok".into(), None);
        assert_eq!(
            authorize(&session, &Route::Courses),
            AuthorizationDecision::RedirectLogin
        );
    }

    #[test]
    fn user_is_kept_out_of_admin_routes() {
        let session = session_with(&["User"]);
        assert_eq!(
            authorize(&session, &Route::NewTeacher),
            AuthorizationDecision::RedirectUnauthorized
        );
        assert_eq!(
            authorize(&session, &Route::Teachers),
            AuthorizationDecision::Allow
        );
    }

    #[test]
    fn admin_is_allowed_everywhere() {
        let session = session_with(&["Admin"]);
        for route in [Route::NewTeacher, Route::EditTeacher { id: "t1".into() }, Route::Home] {
            assert_eq!(authorize(&session, &route), AuthorizationDecision::Allow);
        }
    }

    #[test]
    fn public_routes_always_allow() {
        for route in [Route::Login, Route::Register, Route::Unauthorized] {
            assert_eq!(authorize(&Session::new(), &route), AuthorizationDecision::Allow);
        }
    }

    #[test]
    fn signed_in_user_skips_login_page() {
        let nav = navigate(&session_with(&["User"]), "/login");
        assert_eq!(
            nav,
            Navigation::Redirect {
                requested: Route::Login,
                to: Route::Home
            }
        );
    }

    #[rstest]
    #[case("/login", Route::Login)]
    #[case("/register", Route::Register)]
    fn token_without_identity_stays_on_guest_pages(#[case] path: &str, #[case] route: Route) {
        let session = Session::restored("tok".into(), None);
        assert_eq!(navigate(&session, path), Navigation::Render(route));
        assert_eq!(navigate(&session, "/home").route(), Some(&Route::Login));
    }

    #[test]
    fn navigation_resolves_redirect_targets() {
        assert_eq!(
            navigate(&Session::new(), "/courses").route(),
            Some(&Route::Login)
        );
        assert_eq!(
            navigate(&session_with(&["User"]), "/teachers/new").route(),
            Some(&Route::Unauthorized)
        );
        assert_eq!(
            navigate(&Session::new(), "/nowhere"),
            Navigation::NotFound("/nowhere".into())
        );
    }
}

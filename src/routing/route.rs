//! Navigable routes and their access requirements.

use crate::domain::Role;
use std::fmt;

/// A page of the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/` (also `/register`): sign-up form.
    Register,
    Login,
    Home,
    Profile,
    Teachers,
    Teacher { id: String },
    /// Admin-only create form.
    NewTeacher,
    /// Admin-only edit form.
    EditTeacher { id: String },
    Courses,
    Course { id: String },
    Posts,
    Post { id: String },
    Unauthorized,
}

impl Route {
    /// Parses a path such as `/course/64f0c2`.
    ///
    /// Query strings, fragments and a trailing slash are ignored. Returns
    /// `None` for paths the client does not know.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let route = match segments.as_slice() {
            [] | ["register"] => Self::Register,
            ["login"] => Self::Login,
            ["home"] => Self::Home,
            ["profile"] => Self::Profile,
            ["teachers"] => Self::Teachers,
            ["teachers", "new"] => Self::NewTeacher,
            ["teachers", "edit", id] => Self::EditTeacher { id: (*id).to_string() },
            ["teachers", id] => Self::Teacher { id: (*id).to_string() },
            ["courses"] => Self::Courses,
            ["course", id] => Self::Course { id: (*id).to_string() },
            ["posts"] => Self::Posts,
            ["posts", id] => Self::Post { id: (*id).to_string() },
            ["unauthorized"] => Self::Unauthorized,
            _ => return None,
        };
        Some(route)
    }

    /// Canonical path.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Register => "/".to_string(),
            Self::Login => "/login".to_string(),
            Self::Home => "/home".to_string(),
            Self::Profile => "/profile".to_string(),
            Self::Teachers => "/teachers".to_string(),
            Self::Teacher { id } => format!("/teachers/{id}"),
            Self::NewTeacher => "/teachers/new".to_string(),
            Self::EditTeacher { id } => format!("/teachers/edit/{id}"),
            Self::Courses => "/courses".to_string(),
            Self::Course { id } => format!("/course/{id}"),
            Self::Posts => "/posts".to_string(),
            Self::Post { id } => format!("/posts/{id}"),
            Self::Unauthorized => "/unauthorized".to_string(),
        }
    }

    /// Routes reachable without an identity.
    #[must_use]
    pub const fn is_public(&self) -> bool {
        matches!(self, Self::Register | Self::Login | Self::Unauthorized)
    }

    /// Routes an authenticated user is sent away from.
    #[must_use]
    pub const fn is_guest_only(&self) -> bool {
        matches!(self, Self::Register | Self::Login)
    }

    /// Roles of which the identity must hold at least one. Empty means any
    /// authenticated user.
    #[must_use]
    pub fn required_roles(&self) -> Vec<Role> {
        match self {
            Self::NewTeacher | Self::EditTeacher { .. } => vec![Role::Admin],
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

//! User accounts: login credentials, registration, and profile data.

use super::error::{PortalError, Result};
use super::session::{Identity, Role};
use super::validation::{require, require_email};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Minimum password length accepted at registration.
const MIN_PASSWORD_LEN: usize = 8;

/// Login form.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// E-mail or ERP, whichever the user typed.
    pub login_username: String,
    pub password: String,
    /// Role the user is logging in as.
    pub role: Role,
}

impl Credentials {
    /// # Errors
    ///
    /// Returns a validation error when the username or password is blank.
    pub fn validate(&self) -> Result<()> {
        require("loginUsername", &self.login_username, "Required")?;
        require("password", &self.password, "Required")?;
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login_username", &self.login_username)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

/// Profile as returned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub erp: Option<i64>,
    pub roles: BTreeSet<Role>,
    /// Base64 image or URL, as the backend stores it.
    pub profile_picture: Option<String>,
}

impl UserProfile {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Derives the session identity from this profile.
    #[must_use]
    pub fn to_identity(&self) -> Identity {
        let display_name = self.full_name();
        Identity {
            id: self.id.clone(),
            display_name: if display_name.is_empty() {
                self.email.clone()
            } else {
                display_name
            },
            email: self.email.clone(),
            erp: self.erp,
            roles: self.roles.clone(),
        }
    }
}

/// Successful login reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginGrant {
    pub token: String,
    pub user: UserProfile,
}

/// Sign-up form.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    /// Entered as text; must parse as an integer.
    pub erp: String,
    pub role: String,
}

impl Registration {
    /// Checks every field and returns the parsed ERP number.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first offending field.
    pub fn validate(&self) -> Result<i64> {
        require_email("email", &self.email, "Invalid email")?;
        validate_password(&self.password)?;
        require("firstname", &self.first_name, "Required")?;
        require("lastname", &self.last_name, "Required")?;
        require("erp", &self.erp, "Required")?;
        let erp = self
            .erp
            .trim()
            .parse::<i64>()
            .map_err(|_| PortalError::validation("erp", "ERP must be an integer"))?;
        match self.role.as_str() {
            "Admin" | "User" => Ok(erp),
            "" => Err(PortalError::validation("role", "Required")),
            _ => Err(PortalError::validation("role", "Invalid role")),
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("erp", &self.erp)
            .field("role", &self.role)
            .finish()
    }
}

fn validate_password(password: &str) -> Result<()> {
    require("password", password, "Required")?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(PortalError::validation(
            "password",
            "Password must be at least 8 characters long",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(PortalError::validation(
            "password",
            "Password must contain at least one uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(PortalError::validation(
            "password",
            "Password must contain at least one number",
        ));
    }
    Ok(())
}

/// Picture attached to a profile update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilePicture {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Profile edit form, sent as multipart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub picture: Option<ProfilePicture>,
}

impl ProfileUpdate {
    /// # Errors
    ///
    /// Returns a validation error when either name is blank.
    pub fn validate(&self) -> Result<()> {
        require("firstName", &self.first_name, "First Name is required")?;
        require("lastName", &self.last_name, "Last Name is required")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn registration() -> Registration {
        Registration {
            email: "ada@example.edu".into(),
            password: "Analytical1".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            erp: " 18151 ".into(),
            role: "User".into(),
        }
    }

    #[test]
    fn valid_registration_yields_erp() {
        assert_eq!(registration().validate().unwrap(), 18151);
    }

    #[rstest]
    #[case("short1A", "Password must be at least 8 characters long")]
    #[case("lowercase1", "Password must contain at least one uppercase letter")]
    #[case("NoDigitsHere", "Password must contain at least one number")]
    fn password_rules(#[case] password: &str, #[case] message: &str) {
        let mut r = registration();
        r.password = password.into();
        assert_eq!(r.validate().unwrap_err().user_message(), message);
    }

    #[rstest]
    #[case("12a", "ERP must be an integer")]
    #[case("", "Required")]
    fn erp_rules(#[case] erp: &str, #[case] message: &str) {
        let mut r = registration();
        r.erp = erp.into();
        assert_eq!(r.validate().unwrap_err().user_message(), message);
    }

    #[test]
    fn unknown_role_is_rejected() {
        let mut r = registration();
        r.role = "Dean".into();
        assert_eq!(r.validate().unwrap_err().to_string(), "role: Invalid role");
    }

    #[test]
    fn identity_falls_back_to_email() {
        let profile = UserProfile {
            id: "u1".into(),
            email: "ada@example.edu".into(),
            ..UserProfile::default()
        };
        assert_eq!(profile.to_identity().display_name, "ada@example.edu");
    }

    #[test]
    fn profile_update_requires_names() {
        let update = ProfileUpdate {
            first_name: "Ada".into(),
            ..ProfileUpdate::default()
        };
        assert_eq!(
            update.validate().unwrap_err().user_message(),
            "Last Name is required"
        );
    }

    #[test]
    fn debug_output_hides_passwords() {
        let credentials = Credentials {
            login_username: "ada".into(),
            password: "Analytical1".into(),
            role: Role::User,
        };
        assert!(!format!("{credentials:?}").contains("Analytical1"));
        assert!(!format!("{:?}", registration()).contains("Analytical1"));
    }
}

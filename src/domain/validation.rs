//! Shared form-field checks used by the draft types.

use super::error::{PortalError, Result};

/// Fails with `message` when `value` is empty after trimming.
pub(crate) fn require(field: &str, value: &str, message: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PortalError::validation(field, message));
    }
    Ok(())
}

/// Loose e-mail shape check: one `@`, non-empty local part, dotted domain.
#[must_use]
pub fn looks_like_email(value: &str) -> bool {
    let value = value.trim();
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || value.contains(char::is_whitespace) {
        return false;
    }
    let mut labels = domain.split('.');
    let first = labels.next().unwrap_or_default();
    let rest: Vec<&str> = labels.collect();
    !first.is_empty() && !rest.is_empty() && rest.iter().all(|label| !label.is_empty())
}

pub(crate) fn require_email(field: &str, value: &str, invalid: &str) -> Result<()> {
    require(field, value, "Required")?;
    if !looks_like_email(value) {
        return Err(PortalError::validation(field, invalid));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ada@example.edu", true)]
    #[case("a.b@c.d.e", true)]
    #[case("ada@", false)]
    #[case("@example.edu", false)]
    #[case("ada@example", false)]
    #[case("ada@example..edu", false)]
    #[case("ada lovelace@example.edu", false)]
    #[case("a@b@c.d", false)]
    fn email_shapes(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(looks_like_email(input), expected, "{input}");
    }

    #[test]
    fn blank_is_rejected() {
        let err = require("title", "   ", "Title is required").unwrap_err();
        assert_eq!(err.user_message(), "Title is required");
    }
}

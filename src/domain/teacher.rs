//! Teacher directory types and the teacher form.

use super::error::Result;
use super::validation::{require, require_email};
use serde::{Deserialize, Serialize};

/// Compact teacher card used in lists and on course pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherSummary {
    pub id: String,
    pub name: String,
    pub title: String,
    /// Base64-encoded JPEG avatar, if the backend sent one.
    pub image_base64: Option<String>,
}

/// Full teacher profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: String,
    pub name: String,
    pub title: String,
    pub email: String,
    pub overview: String,
    pub department: String,
    pub specialization: String,
    pub onboard_status: String,
    pub image_base64: Option<String>,
    pub courses_taught: Vec<String>,
    pub course_ids: Vec<String>,
}

impl Teacher {
    /// Pairs of (course name, course id) for linking; names without a known id
    /// are skipped.
    #[must_use]
    pub fn course_links(&self) -> Vec<(&str, &str)> {
        self.courses_taught
            .iter()
            .zip(self.course_ids.iter())
            .map(|(name, id)| (name.as_str(), id.as_str()))
            .collect()
    }

    /// Pre-fills the edit form from an existing profile.
    #[must_use]
    pub fn to_draft(&self) -> TeacherDraft {
        TeacherDraft {
            name: self.name.clone(),
            title: self.title.clone(),
            email: self.email.clone(),
            overview: self.overview.clone(),
            department: self.department.clone(),
            specialization: self.specialization.clone(),
            courses_taught: self.courses_taught.join(", "),
        }
    }
}

impl From<&Teacher> for TeacherSummary {
    fn from(teacher: &Teacher) -> Self {
        Self {
            id: teacher.id.clone(),
            name: teacher.name.clone(),
            title: teacher.title.clone(),
            image_base64: teacher.image_base64.clone(),
        }
    }
}

/// One page of the teacher directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeacherPage {
    pub teachers: Vec<TeacherSummary>,
    pub current_page: u32,
    pub total_pages: u32,
}

/// Create/edit form for a teacher.
///
/// `courses_taught` is the comma-separated text the user typed; it is split
/// into a list only when the draft is submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeacherDraft {
    pub name: String,
    pub title: String,
    pub email: String,
    pub overview: String,
    pub department: String,
    pub specialization: String,
    pub courses_taught: String,
}

impl TeacherDraft {
    /// Checks required fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        require("Name", &self.name, "Required")?;
        require_email("Email", &self.email, "Invalid email address")?;
        require("CoursesTaught", &self.courses_taught, "Required")?;
        Ok(())
    }

    /// Course names from the comma-separated input, trimmed, blanks dropped.
    #[must_use]
    pub fn course_list(&self) -> Vec<String> {
        self.courses_taught
            .split(',')
            .map(str::trim)
            .filter(|course| !course.is_empty())
            .map(String::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> TeacherDraft {
        TeacherDraft {
            name: "Grace Hopper".into(),
            email: "grace@example.edu".into(),
            courses_taught: "Compilers, , Systems ".into(),
            ..TeacherDraft::default()
        }
    }

    #[test]
    fn course_list_is_trimmed() {
        assert_eq!(draft().course_list(), vec!["Compilers", "Systems"]);
    }

    #[test]
    fn email_must_be_valid() {
        let mut d = draft();
        d.email = "grace".into();
        let err = d.validate().unwrap_err();
        assert_eq!(err.to_string(), "Email: Invalid email address");
    }

    #[test]
    fn courses_are_required() {
        let mut d = draft();
        d.courses_taught = String::new();
        assert!(d.validate().is_err());
        assert!(draft().validate().is_ok());
    }
}

//! Course catalogue types.

use super::teacher::TeacherSummary;
use serde::{Deserialize, Serialize};

/// One entry of the paged course list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub name: String,
}

/// Full course record shown on the course page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseDetails {
    pub id: String,
    pub name: String,
    pub description: String,
    pub teachers: Vec<TeacherSummary>,
}

/// One page of the course catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoursePage {
    pub courses: Vec<Course>,
    pub total_courses: u64,
    pub total_pages: u32,
}

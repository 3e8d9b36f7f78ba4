//! Domain layer for the campus portal client.
//!
//! This module contains the core domain types, independent of HTTP, storage or
//! rendering concerns. Wire formats are normalized into these types at the
//! `remote` boundary and never leak past it.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`session`]: Bearer token, identity and roles
//! - [`user`]: Credentials, registration and profile forms
//! - [`course`], [`teacher`], [`post`]: Catalogue and discussion records
//!
//! # Examples
//!
//! ```
//! use campus_portal::domain::{PostDraft, Result};
//!
//! fn draft() -> Result<PostDraft> {
//!     let draft = PostDraft {
//!         title: "Study group".to_string(),
//!         content: "Anyone for Thursday?".to_string(),
//!         anonymous: false,
//!     };
//!     draft.validate()?;
//!     Ok(draft)
//! }
//! # assert!(draft().is_ok());
//! ```

pub mod course;
pub mod error;
pub mod post;
pub mod session;
pub mod teacher;
pub mod user;
pub mod validation;

pub use course::{Course, CourseDetails, CoursePage};
pub use error::{PortalError, Result};
pub use post::{Comment, CommentDraft, Post, PostDraft, Vote};
pub use session::{Identity, Role, Session};
pub use teacher::{Teacher, TeacherDraft, TeacherPage, TeacherSummary};
pub use user::{Credentials, LoginGrant, ProfilePicture, ProfileUpdate, Registration, UserProfile};

//! Port for the REST backend.
//!
//! One method per endpoint. Implementations own transport concerns only:
//! authorization headers, status mapping and decoding into domain types.

use crate::app::slot::ListQuery;
use crate::domain::{
    Comment, CommentDraft, CourseDetails, CoursePage, Credentials, LoginGrant, Post, PostDraft,
    ProfileUpdate, Registration, Result, Teacher, TeacherDraft, TeacherPage, UserProfile, Vote,
};
use async_trait::async_trait;

/// Async access to the campus backend.
///
/// Authenticated methods take the bearer token explicitly; implementations
/// hold no session state. A 401 on an authenticated call is reported as
/// [`PortalError::Unauthorized`](crate::domain::PortalError::Unauthorized), a
/// 404 as [`PortalError::NotFound`](crate::domain::PortalError::NotFound).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Backend: Send + Sync {
    /// `POST /users/login`. Refusals are reported as `Auth` errors.
    async fn login(&self, credentials: &Credentials) -> Result<LoginGrant>;

    /// `GET /users/getuserprofile`.
    async fn fetch_identity(&self, token: &str) -> Result<UserProfile>;

    /// `POST /users/register`; returns the backend's acknowledgement text.
    async fn register(&self, registration: &Registration, erp: i64) -> Result<Option<String>>;

    /// `PATCH /users/updateProfile` as multipart form data.
    async fn update_profile(
        &self,
        token: &str,
        update: &ProfileUpdate,
    ) -> Result<(UserProfile, Option<String>)>;

    /// `GET /courses/getallcourses`.
    async fn list_courses(&self, token: &str, query: &ListQuery) -> Result<CoursePage>;

    /// `GET /courses/getcourse/:id`.
    async fn course_details(&self, token: &str, id: &str) -> Result<CourseDetails>;

    /// `GET /teachers/getallteachers`.
    async fn list_teachers(&self, token: &str, query: &ListQuery) -> Result<TeacherPage>;

    /// `GET /teachers/:id`.
    async fn teacher(&self, token: &str, id: &str) -> Result<Teacher>;

    /// `POST /teachers/createTeacher`.
    async fn create_teacher(&self, token: &str, draft: &TeacherDraft) -> Result<()>;

    /// `PATCH /teachers/updateTeacher`.
    async fn update_teacher(&self, token: &str, id: &str, draft: &TeacherDraft) -> Result<()>;

    /// `DELETE /teachers/deleteteacher`.
    async fn delete_teacher(&self, token: &str, id: &str) -> Result<()>;

    /// `GET /posts/getposts`.
    async fn list_posts(&self, token: &str) -> Result<Vec<Post>>;

    /// `POST /posts/getpostbyid`.
    async fn post(&self, token: &str, id: &str) -> Result<Post>;

    /// `POST /posts/createpost`; the created post when the backend echoes one.
    async fn create_post(&self, token: &str, draft: &PostDraft) -> Result<Option<Post>>;

    /// `POST /posts/upvotepost` or `/posts/downvotepost`.
    async fn vote(&self, token: &str, post_id: &str, vote: Vote) -> Result<()>;

    /// `DELETE /posts/deletepost`.
    async fn delete_post(&self, token: &str, post_id: &str) -> Result<()>;

    /// `POST /comments/postCommentOnPost`.
    async fn post_comment(&self, token: &str, draft: &CommentDraft) -> Result<()>;

    /// `POST /comments/getcommentsofpost`.
    async fn comments(&self, token: &str, post_id: &str) -> Result<Vec<Comment>>;
}

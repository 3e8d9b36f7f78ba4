//! Reqwest-backed [`Backend`].
//!
//! This adapter owns transport details only: URL building, bearer and
//! `traceparent` headers, timeout, HTTP status mapping, and JSON decoding via
//! [`dto`](super::dto).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use super::backend::Backend;
use super::dto::{
    self, CommentPostIdDto, CommentRequestDto, CourseDetailsDto, CourseListDto,
    CreatePostRequestDto, CreatePostResponseDto, LoginRequestDto, LoginResponseDto, MessageDto,
    ObjectIdDto, PostDto, PostIdDto, ProfileUpdateResponseDto, RegisterRequestDto,
    TeacherDto, TeacherListDto, TeacherPayloadDto, UserDto,
};
use super::messages::TraceContext;
use crate::app::slot::ListQuery;
use crate::domain::{
    Comment, CommentDraft, CourseDetails, CoursePage, Credentials, LoginGrant, PortalError, Post,
    PostDraft, ProfileUpdate, Registration, Result, Teacher, TeacherDraft, TeacherPage,
    UserProfile, Vote,
};

/// Backend adapter that talks HTTP to one base URL.
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// Builds an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `base_url` does not parse or the
    /// client cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortalError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, base_url })
    }

    /// Base URL every endpoint is resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| PortalError::Config(format!("invalid endpoint {path}: {e}")))
    }

    /// `path` followed by `id` as one percent-encoded segment.
    fn resource_endpoint(&self, path: &str, id: &str) -> Result<Url> {
        let mut url = self.endpoint(path)?;
        url.path_segments_mut()
            .map_err(|()| PortalError::Config("base URL cannot hold a path".to_string()))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, token: Option<&str>) -> Result<RequestBuilder> {
        let mut builder = self
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(trace_context) = TraceContext::from_current() {
            builder = builder.header("traceparent", trace_context.traceparent());
        }
        Ok(builder)
    }

    /// Sends `builder` and returns the body of a successful response.
    async fn send(&self, builder: RequestBuilder, authenticated: bool) -> Result<Vec<u8>> {
        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "backend returned error status");
            return Err(map_status_error(status, body.as_ref(), authenticated));
        }
        Ok(body.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        token: &str,
        query: Option<&ListQuery>,
    ) -> Result<T> {
        let mut builder = self.request(Method::GET, url, Some(token))?;
        if let Some(query) = query {
            builder = builder.query(&query_params(query));
        }
        decode(&self.send(builder, true).await?)
    }

    async fn send_json<B: Serialize + Sync>(
        &self,
        method: Method,
        url: Url,
        token: &str,
        body: &B,
    ) -> Result<Vec<u8>> {
        let builder = self.request(method, url, Some(token))?.json(body);
        self.send(builder, true).await
    }
}

/// Ensures the base URL ends with `/` so relative joins append to its path.
fn normalize_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Url::parse(&with_slash).map_err(|e| PortalError::Config(format!("invalid base URL {raw}: {e}")))
}

/// `page`, `limit` and, when non-empty, `search`.
fn query_params(query: &ListQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("page", query.page.to_string()),
        ("limit", query.limit.to_string()),
    ];
    let search = query.search.trim();
    if !search.is_empty() {
        params.push(("search", search.to_string()));
    }
    params
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body)
        .map_err(|e| PortalError::Decode(format!("unexpected response body: {e}")))
}

/// Acknowledgement text of a `{msg}`/`{message}` body, if any.
fn acknowledgement(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<MessageDto>(body)
        .ok()
        .and_then(MessageDto::into_message)
}

fn map_transport_error(error: reqwest::Error) -> PortalError {
    if error.is_timeout() {
        PortalError::Network(format!("request timed out: {error}"))
    } else {
        PortalError::Network(error.to_string())
    }
}

/// Maps a non-success status to a domain error.
///
/// The backend's own `message`/`msg` text is preferred so that users see, for
/// example, "Invalid credentials" rather than a status code. On
/// unauthenticated calls (login, register) a 401 or 403 is a refusal, not an
/// expired session.
fn map_status_error(status: StatusCode, body: &[u8], authenticated: bool) -> PortalError {
    let message = acknowledgement(body).unwrap_or_else(|| {
        let preview = body_preview(body);
        if preview.is_empty() {
            format!("status {}", status.as_u16())
        } else {
            format!("status {}: {}", status.as_u16(), preview)
        }
    });

    match status {
        StatusCode::UNAUTHORIZED if authenticated => PortalError::Unauthorized(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN if !authenticated => {
            PortalError::Auth(message)
        }
        StatusCode::NOT_FOUND => PortalError::NotFound(message),
        StatusCode::BAD_REQUEST if !authenticated => PortalError::Auth(message),
        _ => PortalError::Network(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

fn profile_form(update: &ProfileUpdate) -> Result<multipart::Form> {
    let mut form = multipart::Form::new()
        .text("updated_firstname", update.first_name.trim().to_string())
        .text("updated_lastname", update.last_name.trim().to_string());
    if let Some(picture) = &update.picture {
        let part = multipart::Part::bytes(picture.bytes.clone())
            .file_name(picture.file_name.clone())
            .mime_str(&picture.mime_type)
            .map_err(|e| PortalError::validation("profile_picture", format!("bad type: {e}")))?;
        form = form.part("profile_picture", part);
    }
    Ok(form)
}

#[async_trait]
impl Backend for HttpBackend {
    async fn login(&self, credentials: &Credentials) -> Result<LoginGrant> {
        let body = LoginRequestDto {
            login_username: credentials.login_username.trim(),
            password: &credentials.password,
            role: credentials.role.as_str(),
        };
        let builder = self
            .request(Method::POST, self.endpoint("users/login")?, None)?
            .json(&body);
        let reply: LoginResponseDto = decode(&self.send(builder, false).await?)?;
        reply
            .into_grant()
            .ok_or_else(|| PortalError::Auth("Login failed. Please try again.".to_string()))
    }

    async fn fetch_identity(&self, token: &str) -> Result<UserProfile> {
        let user: UserDto = self
            .get_json(self.endpoint("users/getuserprofile")?, token, None)
            .await?;
        Ok(user.into())
    }

    async fn register(&self, registration: &Registration, erp: i64) -> Result<Option<String>> {
        let body = RegisterRequestDto {
            email: registration.email.trim(),
            password: &registration.password,
            firstname: registration.first_name.trim(),
            lastname: registration.last_name.trim(),
            erp,
            role: &registration.role,
        };
        let builder = self
            .request(Method::POST, self.endpoint("users/register")?, None)?
            .json(&body);
        Ok(acknowledgement(&self.send(builder, false).await?))
    }

    async fn update_profile(
        &self,
        token: &str,
        update: &ProfileUpdate,
    ) -> Result<(UserProfile, Option<String>)> {
        let builder = self
            .request(Method::PATCH, self.endpoint("users/updateProfile")?, Some(token))?
            .multipart(profile_form(update)?);
        let reply: ProfileUpdateResponseDto = decode(&self.send(builder, true).await?)?;
        Ok(reply.into_parts())
    }

    async fn list_courses(&self, token: &str, query: &ListQuery) -> Result<CoursePage> {
        let page: CourseListDto = self
            .get_json(self.endpoint("courses/getallcourses")?, token, Some(query))
            .await?;
        Ok(page.into())
    }

    async fn course_details(&self, token: &str, id: &str) -> Result<CourseDetails> {
        let details: CourseDetailsDto = self
            .get_json(self.resource_endpoint("courses/getcourse", id)?, token, None)
            .await?;
        Ok(details.into())
    }

    async fn list_teachers(&self, token: &str, query: &ListQuery) -> Result<TeacherPage> {
        let page: TeacherListDto = self
            .get_json(self.endpoint("teachers/getallteachers")?, token, Some(query))
            .await?;
        Ok(page.into())
    }

    async fn teacher(&self, token: &str, id: &str) -> Result<Teacher> {
        let teacher: TeacherDto = self
            .get_json(self.resource_endpoint("teachers", id)?, token, None)
            .await?;
        Ok(teacher.into())
    }

    async fn create_teacher(&self, token: &str, draft: &TeacherDraft) -> Result<()> {
        let body = TeacherPayloadDto::new(None, draft);
        self.send_json(Method::POST, self.endpoint("teachers/createTeacher")?, token, &body)
            .await
            .map(drop)
    }

    async fn update_teacher(&self, token: &str, id: &str, draft: &TeacherDraft) -> Result<()> {
        let body = TeacherPayloadDto::new(Some(id), draft);
        self.send_json(Method::PATCH, self.endpoint("teachers/updateTeacher")?, token, &body)
            .await
            .map(drop)
    }

    async fn delete_teacher(&self, token: &str, id: &str) -> Result<()> {
        let body = ObjectIdDto { object_id: id };
        self.send_json(Method::DELETE, self.endpoint("teachers/deleteteacher")?, token, &body)
            .await
            .map(drop)
    }

    async fn list_posts(&self, token: &str) -> Result<Vec<Post>> {
        let items: Option<Vec<serde_json::Value>> =
            self.get_json(self.endpoint("posts/getposts")?, token, None).await?;
        Ok(dto::posts_from(items))
    }

    async fn post(&self, token: &str, id: &str) -> Result<Post> {
        let body = PostIdDto { post_id: id };
        let reply = self
            .send_json(Method::POST, self.endpoint("posts/getpostbyid")?, token, &body)
            .await?;
        let post: PostDto = decode(&reply)?;
        Ok(post.into())
    }

    async fn create_post(&self, token: &str, draft: &PostDraft) -> Result<Option<Post>> {
        let body = CreatePostRequestDto::from(draft);
        let reply = self
            .send_json(Method::POST, self.endpoint("posts/createpost")?, token, &body)
            .await?;
        Ok(decode::<CreatePostResponseDto>(&reply)
            .ok()
            .and_then(CreatePostResponseDto::into_post))
    }

    async fn vote(&self, token: &str, post_id: &str, vote: Vote) -> Result<()> {
        let path = match vote {
            Vote::Up => "posts/upvotepost",
            Vote::Down => "posts/downvotepost",
        };
        let body = PostIdDto { post_id };
        self.send_json(Method::POST, self.endpoint(path)?, token, &body).await.map(drop)
    }

    async fn delete_post(&self, token: &str, post_id: &str) -> Result<()> {
        let body = PostIdDto { post_id };
        self.send_json(Method::DELETE, self.endpoint("posts/deletepost")?, token, &body)
            .await
            .map(drop)
    }

    async fn post_comment(&self, token: &str, draft: &CommentDraft) -> Result<()> {
        let body = CommentRequestDto::from(draft);
        self.send_json(Method::POST, self.endpoint("comments/postCommentOnPost")?, token, &body)
            .await
            .map(drop)
    }

    async fn comments(&self, token: &str, post_id: &str) -> Result<Vec<Comment>> {
        let body = CommentPostIdDto { post_id };
        let reply = self
            .send_json(Method::POST, self.endpoint("comments/getcommentsofpost")?, token, &body)
            .await?;
        let items: Option<Vec<serde_json::Value>> = decode(&reply)?;
        Ok(dto::comments_from(items.unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for the non-network helpers.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::no_slash("http://localhost:3001/api")]
    #[case::slash("http://localhost:3001/api/")]
    #[case::padded("  http://localhost:3001/api ")]
    fn endpoints_append_to_base_path(#[case] base: &str) {
        let backend = HttpBackend::new(base, Duration::from_secs(5)).unwrap();
        assert_eq!(
            backend.endpoint("courses/getallcourses").unwrap().as_str(),
            "http://localhost:3001/api/courses/getallcourses"
        );
    }

    #[test]
    fn ids_are_encoded_as_one_segment() {
        let backend = HttpBackend::new("http://localhost:3001/api", Duration::from_secs(5)).unwrap();
        assert_eq!(
            backend.resource_endpoint("teachers", "t1").unwrap().as_str(),
            "http://localhost:3001/api/teachers/t1"
        );
        assert_eq!(
            backend
                .resource_endpoint("courses/getcourse", "a/b?c%")
                .unwrap()
                .as_str(),
            "http://localhost:3001/api/courses/getcourse/a%2Fb%3Fc%25"
        );
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        assert!(matches!(
            HttpBackend::new("not a url", Duration::from_secs(5)),
            Err(PortalError::Config(_))
        ));
    }

    #[test]
    fn empty_search_is_not_sent() {
        let mut query = ListQuery::new(9);
        query.page = 3;
        assert_eq!(
            query_params(&query),
            vec![("page", "3".to_string()), ("limit", "9".to_string())]
        );

        query.search = " graphs ".into();
        assert_eq!(query_params(&query)[2], ("search", "graphs".to_string()));
    }

    #[rstest]
    #[case::expired(StatusCode::UNAUTHORIZED, true, "Unauthorized")]
    #[case::bad_password(StatusCode::UNAUTHORIZED, false, "Auth")]
    #[case::bad_login_body(StatusCode::BAD_REQUEST, false, "Auth")]
    #[case::missing(StatusCode::NOT_FOUND, true, "NotFound")]
    #[case::server(StatusCode::INTERNAL_SERVER_ERROR, true, "Network")]
    #[case::forbidden(StatusCode::FORBIDDEN, true, "Network")]
    fn maps_statuses_to_domain_errors(
        #[case] status: StatusCode,
        #[case] authenticated: bool,
        #[case] expected: &str,
    ) {
        let error = map_status_error(status, b"{\"msg\":\"nope\"}", authenticated);
        let actual = match error {
            PortalError::Unauthorized(_) => "Unauthorized",
            PortalError::Auth(_) => "Auth",
            PortalError::NotFound(_) => "NotFound",
            PortalError::Network(_) => "Network",
            _ => "other",
        };
        assert_eq!(actual, expected);
    }

    #[test]
    fn backend_message_wins_over_status_text() {
        let error = map_status_error(
            StatusCode::UNAUTHORIZED,
            br#"{"message":"Invalid credentials"}"#,
            false,
        );
        assert_eq!(error.user_message(), "Invalid credentials");
    }

    #[test]
    fn non_json_error_body_is_previewed() {
        let error = map_status_error(StatusCode::BAD_GATEWAY, b"<html>\n  bad\n</html>", true);
        assert_eq!(error.user_message(), "status 502: <html> bad </html>");
    }

    #[test]
    fn profile_form_rejects_bad_mime_type() {
        let update = ProfileUpdate {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            picture: Some(crate::domain::ProfilePicture {
                file_name: "me.png".into(),
                mime_type: "not a mime".into(),
                bytes: vec![1, 2, 3],
            }),
        };
        assert!(matches!(
            profile_form(&update),
            Err(PortalError::Validation { .. })
        ));
    }
}

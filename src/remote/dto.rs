//! Wire shapes of the REST backend.
//!
//! The backend mixes casing conventions (`Course_name`, `"Course Description"`,
//! `firstname` vs `firstName`, `createdat` vs `createdAt`) and is loose about
//! nulls and number encodings. Everything is decoded leniently here and turned
//! into domain types; nothing outside this module sees a wire name.

use crate::domain::{
    Comment, CommentDraft, Course, CourseDetails, CoursePage, LoginGrant, Post, PostDraft, Role,
    Teacher, TeacherDraft, TeacherPage, TeacherSummary, UserProfile,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = nullable_string(deserializer)?;
    Ok((!value.is_empty()).then_some(value))
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Counts arrive as numbers, numeric strings, or arrays of voter ids.
fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        Some(Value::Array(items)) => items.len() as u64,
        _ => 0,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    })
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|at| at.with_timezone(&Utc)),
        Some(Value::Number(n)) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    })
}

fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items.into_iter().filter_map(id_of).collect(),
        Some(Value::String(s)) => vec![s],
        _ => Vec::new(),
    })
}

/// Accepts a bare id string or an embedded document with an `_id`.
fn id_of(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Object(map) => map.get("_id").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// `{ "message": ... }` or `{ "msg": ... }` error and acknowledgement bodies.
#[derive(Debug, Default, Deserialize)]
pub struct MessageDto {
    #[serde(default, deserialize_with = "optional_string")]
    message: Option<String>,
    #[serde(default, deserialize_with = "optional_string")]
    msg: Option<String>,
    #[serde(default, deserialize_with = "optional_string")]
    error: Option<String>,
}

impl MessageDto {
    pub fn into_message(self) -> Option<String> {
        self.message.or(self.msg).or(self.error)
    }
}

#[derive(Debug, Deserialize)]
pub struct UserDto {
    #[serde(rename = "_id", alias = "id", default, deserialize_with = "nullable_string")]
    id: String,
    #[serde(
        rename = "firstname",
        alias = "firstName",
        default,
        deserialize_with = "nullable_string"
    )]
    first_name: String,
    #[serde(
        rename = "lastname",
        alias = "lastName",
        default,
        deserialize_with = "nullable_string"
    )]
    last_name: String,
    #[serde(default, deserialize_with = "nullable_string")]
    email: String,
    #[serde(alias = "erpId", default, deserialize_with = "lenient_i64")]
    erp: Option<i64>,
    #[serde(default, deserialize_with = "string_list")]
    roles: Vec<String>,
    #[serde(default, deserialize_with = "optional_string")]
    profile_picture: Option<String>,
}

impl From<UserDto> for UserProfile {
    fn from(dto: UserDto) -> Self {
        Self {
            id: dto.id,
            first_name: dto.first_name,
            last_name: dto.last_name,
            email: dto.email,
            erp: dto.erp,
            roles: dto.roles.into_iter().map(Role::from).collect(),
            profile_picture: dto.profile_picture,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequestDto<'a> {
    pub login_username: &'a str,
    pub password: &'a str,
    pub role: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponseDto {
    #[serde(default, deserialize_with = "nullable_string")]
    token: String,
    user: UserDto,
}

impl LoginResponseDto {
    /// `None` when the backend answered without a token.
    pub fn into_grant(self) -> Option<LoginGrant> {
        if self.token.is_empty() {
            return None;
        }
        Some(LoginGrant {
            token: self.token,
            user: self.user.into(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterRequestDto<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub firstname: &'a str,
    pub lastname: &'a str,
    pub erp: i64,
    pub role: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdateResponseDto {
    user: UserDto,
    #[serde(default, deserialize_with = "optional_string")]
    msg: Option<String>,
}

impl ProfileUpdateResponseDto {
    pub fn into_parts(self) -> (UserProfile, Option<String>) {
        (self.user.into(), self.msg)
    }
}

#[derive(Debug, Deserialize)]
struct CourseDto {
    #[serde(rename = "_id", default, deserialize_with = "nullable_string")]
    id: String,
    #[serde(rename = "Course_name", default, deserialize_with = "nullable_string")]
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseListDto {
    #[serde(default, deserialize_with = "lenient_list")]
    courses: Vec<CourseDto>,
    #[serde(default)]
    total_courses: u64,
    #[serde(default)]
    total_pages: u32,
}

impl From<CourseListDto> for CoursePage {
    fn from(dto: CourseListDto) -> Self {
        Self {
            courses: dto
                .courses
                .into_iter()
                .map(|c| Course {
                    id: c.id,
                    name: c.name,
                })
                .collect(),
            total_courses: dto.total_courses,
            total_pages: dto.total_pages.max(1),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TeacherSummaryDto {
    #[serde(rename = "_id", default, deserialize_with = "nullable_string")]
    id: String,
    #[serde(rename = "Name", default, deserialize_with = "nullable_string")]
    name: String,
    #[serde(rename = "Title", default, deserialize_with = "nullable_string")]
    title: String,
    #[serde(rename = "ImageFile", default, deserialize_with = "optional_string")]
    image: Option<String>,
}

impl From<TeacherSummaryDto> for TeacherSummary {
    fn from(dto: TeacherSummaryDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            title: dto.title,
            image_base64: dto.image,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CourseDetailsDto {
    #[serde(rename = "_id", default, deserialize_with = "nullable_string")]
    id: String,
    #[serde(rename = "Course_name", default, deserialize_with = "nullable_string")]
    name: String,
    #[serde(
        rename = "Course Description",
        default,
        deserialize_with = "nullable_string"
    )]
    description: String,
    #[serde(rename = "Teachers", default, deserialize_with = "lenient_list")]
    teachers: Vec<TeacherSummaryDto>,
}

impl From<CourseDetailsDto> for CourseDetails {
    fn from(dto: CourseDetailsDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            description: dto.description,
            teachers: dto.teachers.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherListDto {
    #[serde(default, deserialize_with = "lenient_list")]
    teachers: Vec<TeacherSummaryDto>,
    #[serde(default)]
    current_page: u32,
    #[serde(default)]
    total_pages: u32,
}

impl From<TeacherListDto> for TeacherPage {
    fn from(dto: TeacherListDto) -> Self {
        Self {
            teachers: dto.teachers.into_iter().map(Into::into).collect(),
            current_page: dto.current_page.max(1),
            total_pages: dto.total_pages.max(1),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TeacherDto {
    #[serde(rename = "_id", default, deserialize_with = "nullable_string")]
    id: String,
    #[serde(rename = "Name", default, deserialize_with = "nullable_string")]
    name: String,
    #[serde(rename = "Title", default, deserialize_with = "nullable_string")]
    title: String,
    #[serde(rename = "Email", default, deserialize_with = "nullable_string")]
    email: String,
    #[serde(rename = "Overview", default, deserialize_with = "nullable_string")]
    overview: String,
    #[serde(rename = "Department", default, deserialize_with = "nullable_string")]
    department: String,
    #[serde(rename = "Specialization", default, deserialize_with = "nullable_string")]
    specialization: String,
    #[serde(rename = "OnboardStatus", default, deserialize_with = "nullable_string")]
    onboard_status: String,
    #[serde(rename = "ImageFile", default, deserialize_with = "optional_string")]
    image: Option<String>,
    #[serde(
        rename = "Courses Taught",
        alias = "CoursesTaught",
        default,
        deserialize_with = "string_list"
    )]
    courses_taught: Vec<String>,
    #[serde(rename = "CoursesTaughtIDs", default, deserialize_with = "string_list")]
    course_ids: Vec<String>,
}

impl From<TeacherDto> for Teacher {
    fn from(dto: TeacherDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            title: dto.title,
            email: dto.email,
            overview: dto.overview,
            department: dto.department,
            specialization: dto.specialization,
            onboard_status: dto.onboard_status,
            image_base64: dto.image,
            courses_taught: dto.courses_taught,
            course_ids: dto.course_ids,
        }
    }
}

/// Body of `createTeacher` and, with `id`, of `updateTeacher`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TeacherPayloadDto<'a> {
    #[serde(rename = "id", skip_serializing_if = "Option::is_none")]
    pub id: Option<&'a str>,
    pub name: &'a str,
    pub title: &'a str,
    pub email: &'a str,
    pub overview: &'a str,
    pub department: &'a str,
    pub specialization: &'a str,
    pub courses_taught: Vec<String>,
}

impl<'a> TeacherPayloadDto<'a> {
    pub fn new(id: Option<&'a str>, draft: &'a TeacherDraft) -> Self {
        Self {
            id,
            name: draft.name.trim(),
            title: draft.title.trim(),
            email: draft.email.trim(),
            overview: &draft.overview,
            department: draft.department.trim(),
            specialization: draft.specialization.trim(),
            courses_taught: draft.course_list(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CommentDto {
    #[serde(rename = "_id", default, deserialize_with = "nullable_string")]
    id: String,
    #[serde(rename = "comment", alias = "commentText", default, deserialize_with = "nullable_string")]
    text: String,
    #[serde(default, deserialize_with = "nullable_string")]
    name: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    erp: Option<i64>,
    #[serde(default, deserialize_with = "lenient_bool")]
    anonymous: bool,
    #[serde(
        rename = "createdat",
        alias = "createdAt",
        default,
        deserialize_with = "lenient_timestamp"
    )]
    created_at: Option<DateTime<Utc>>,
}

impl From<CommentDto> for Comment {
    fn from(dto: CommentDto) -> Self {
        Self {
            id: dto.id,
            text: dto.text,
            author_name: dto.name,
            author_erp: dto.erp,
            anonymous: dto.anonymous,
            created_at: dto.created_at,
        }
    }
}

/// Decodes a comment array, skipping entries that are not comment objects.
pub fn comments_from(items: Vec<Value>) -> Vec<Comment> {
    items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value::<CommentDto>(item).ok())
        .map(Into::into)
        .collect()
}

/// `createdBy` is either a display string or an embedded user document.
fn author_of(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Object(map) => {
            let part = |key: &str| {
                map.get(key)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            format!("{} {}", part("firstname"), part("lastname"))
                .trim()
                .to_string()
        }
        _ => String::new(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDto {
    #[serde(rename = "_id", default, deserialize_with = "nullable_string")]
    id: String,
    #[serde(default, deserialize_with = "nullable_string")]
    title: String,
    #[serde(default, deserialize_with = "nullable_string")]
    content: String,
    #[serde(default)]
    created_by: Value,
    #[serde(default, deserialize_with = "lenient_bool")]
    anonymous: bool,
    #[serde(default, deserialize_with = "nullable_string")]
    visibility: String,
    #[serde(alias = "createdat", default, deserialize_with = "lenient_timestamp")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_count")]
    upvotes: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    downvotes: u64,
    #[serde(default)]
    comments: Value,
}

impl From<PostDto> for Post {
    fn from(dto: PostDto) -> Self {
        Self {
            id: dto.id,
            title: dto.title,
            content: dto.content,
            author: author_of(dto.created_by),
            anonymous: dto.anonymous,
            visibility: dto.visibility,
            created_at: dto.created_at,
            upvotes: dto.upvotes,
            downvotes: dto.downvotes,
            comments: match dto.comments {
                Value::Array(items) => comments_from(items),
                _ => Vec::new(),
            },
        }
    }
}

/// Decodes the post list, tolerating a `null` body.
pub fn posts_from(items: Option<Vec<Value>>) -> Vec<Post> {
    items
        .unwrap_or_default()
        .into_iter()
        .filter_map(|item| serde_json::from_value::<PostDto>(item).ok())
        .map(Into::into)
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct CreatePostResponseDto {
    #[serde(default)]
    post: Option<PostDto>,
}

impl CreatePostResponseDto {
    /// The created post, when the backend echoed a complete one.
    pub fn into_post(self) -> Option<Post> {
        self.post
            .map(Post::from)
            .filter(|p| !p.title.is_empty() && !p.content.is_empty())
    }
}

#[derive(Debug, Serialize)]
pub struct CreatePostRequestDto<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub visibility: &'a str,
    pub anonymous: bool,
}

impl<'a> From<&'a PostDraft> for CreatePostRequestDto<'a> {
    fn from(draft: &'a PostDraft) -> Self {
        Self {
            title: draft.title.trim(),
            content: draft.content.trim(),
            visibility: "Public",
            anonymous: draft.anonymous,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostIdDto<'a> {
    pub post_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct CommentPostIdDto<'a> {
    pub post_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequestDto<'a> {
    #[serde(rename = "post_id")]
    pub post_id: &'a str,
    pub comment_text: &'a str,
    pub anonymous: bool,
}

impl<'a> From<&'a CommentDraft> for CommentRequestDto<'a> {
    fn from(draft: &'a CommentDraft) -> Self {
        Self {
            post_id: &draft.post_id,
            comment_text: draft.text.trim(),
            anonymous: draft.anonymous,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectIdDto<'a> {
    pub object_id: &'a str,
}

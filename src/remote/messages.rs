//! Request and reply types exchanged between the reducer and the remote tasks.
//!
//! The reducer emits [`RemoteCall`]s as actions; the runtime executes each one
//! on a spawned task and feeds the [`RemoteReply`] back as an event. Both carry
//! the slot [`Ticket`] so the reducer can drop superseded replies, and calls
//! capture the current trace context so the HTTP span joins the reducer's trace.

use crate::app::slot::{ListQuery, Ticket};
use crate::domain::{
    Comment, CommentDraft, CourseDetails, CoursePage, Credentials, LoginGrant, Post, PostDraft,
    PortalError, ProfileUpdate, Registration, Teacher, TeacherDraft, TeacherPage, UserProfile,
    Vote,
};
use serde::{Deserialize, Serialize};

/// Distributed tracing context captured at the point a request is issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceContext {
    /// OpenTelemetry trace ID as a hex string.
    pub trace_id: String,

    /// Span ID of the issuing span.
    pub parent_span_id: String,
}

impl TraceContext {
    /// Captures the trace and span IDs of the current tracing span.
    ///
    /// Returns `None` if the current span context is invalid, which is the case
    /// whenever no OpenTelemetry layer is installed.
    pub fn from_current() -> Option<Self> {
        use opentelemetry::trace::TraceContextExt;
        use tracing_opentelemetry::OpenTelemetrySpanExt;

        let span = tracing::Span::current();

        let otel_context = span.context();
        let span_ref = otel_context.span();
        let span_context = span_ref.span_context();

        if span_context.is_valid() {
            Some(Self {
                trace_id: format!("{:032x}", span_context.trace_id()),
                parent_span_id: format!("{:016x}", span_context.span_id()),
            })
        } else {
            None
        }
    }

    /// W3C `traceparent` header value, always flagged as sampled.
    #[must_use]
    pub fn traceparent(&self) -> String {
        format!("00-{}-{}-01", self.trace_id, self.parent_span_id)
    }
}

/// One backend operation.
#[derive(Clone, PartialEq, Eq)]
pub enum RemoteRequest {
    Login(Credentials),
    FetchIdentity,
    Register(Registration),
    FetchProfile,
    UpdateProfile(ProfileUpdate),
    ListCourses(ListQuery),
    CourseDetails { id: String },
    ListTeachers(ListQuery),
    TeacherDetails { id: String },
    CreateTeacher(TeacherDraft),
    UpdateTeacher { id: String, draft: TeacherDraft },
    DeleteTeacher { id: String },
    ListPosts,
    PostDetails { id: String },
    CreatePost(PostDraft),
    VotePost { post_id: String, vote: Vote },
    DeletePost { post_id: String },
    PostComment(CommentDraft),
    ListComments { post_id: String },
}

impl RemoteRequest {
    /// Short operation name for spans and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Login(_) => "login",
            Self::FetchIdentity => "fetch_identity",
            Self::Register(_) => "register",
            Self::FetchProfile => "fetch_profile",
            Self::UpdateProfile(_) => "update_profile",
            Self::ListCourses(_) => "list_courses",
            Self::CourseDetails { .. } => "course_details",
            Self::ListTeachers(_) => "list_teachers",
            Self::TeacherDetails { .. } => "teacher_details",
            Self::CreateTeacher(_) => "create_teacher",
            Self::UpdateTeacher { .. } => "update_teacher",
            Self::DeleteTeacher { .. } => "delete_teacher",
            Self::ListPosts => "list_posts",
            Self::PostDetails { .. } => "post_details",
            Self::CreatePost(_) => "create_post",
            Self::VotePost { .. } => "vote_post",
            Self::DeletePost { .. } => "delete_post",
            Self::PostComment(_) => "post_comment",
            Self::ListComments { .. } => "list_comments",
        }
    }

    /// Whether the call needs a bearer token.
    #[must_use]
    pub const fn requires_token(&self) -> bool {
        !matches!(self, Self::Login(_) | Self::Register(_))
    }
}

// Hand-written so passwords never reach logs.
impl std::fmt::Debug for RemoteRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Login(credentials) => f
                .debug_struct("Login")
                .field("login_username", &credentials.login_username)
                .field("role", &credentials.role)
                .finish_non_exhaustive(),
            Self::Register(registration) => f
                .debug_struct("Register")
                .field("email", &registration.email)
                .field("role", &registration.role)
                .finish_non_exhaustive(),
            Self::UpdateProfile(update) => f
                .debug_struct("UpdateProfile")
                .field("first_name", &update.first_name)
                .field("last_name", &update.last_name)
                .field("has_picture", &update.picture.is_some())
                .finish(),
            Self::ListCourses(query) => f.debug_tuple("ListCourses").field(query).finish(),
            Self::ListTeachers(query) => f.debug_tuple("ListTeachers").field(query).finish(),
            Self::CourseDetails { id } => f.debug_struct("CourseDetails").field("id", id).finish(),
            Self::TeacherDetails { id } => {
                f.debug_struct("TeacherDetails").field("id", id).finish()
            }
            Self::UpdateTeacher { id, .. } => {
                f.debug_struct("UpdateTeacher").field("id", id).finish_non_exhaustive()
            }
            Self::DeleteTeacher { id } => f.debug_struct("DeleteTeacher").field("id", id).finish(),
            Self::PostDetails { id } => f.debug_struct("PostDetails").field("id", id).finish(),
            Self::VotePost { post_id, vote } => f
                .debug_struct("VotePost")
                .field("post_id", post_id)
                .field("vote", vote)
                .finish(),
            Self::DeletePost { post_id } => {
                f.debug_struct("DeletePost").field("post_id", post_id).finish()
            }
            Self::ListComments { post_id } => {
                f.debug_struct("ListComments").field("post_id", post_id).finish()
            }
            other => f.write_str(other.name()),
        }
    }
}

/// A request tagged for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCall {
    pub ticket: Ticket,
    pub request: RemoteRequest,
    pub trace_context: Option<TraceContext>,
}

/// Generates `RemoteCall` constructors that attach the current trace context.
macro_rules! remote_call_builders {
    (
        $(
            $builder_name:ident($($field:ident: $ty:ty),*) => $variant:expr
        ),* $(,)?
    ) => {
        impl RemoteCall {
            $(
                #[doc = concat!("Builds a `", stringify!($builder_name), "` call with the current trace context.")]
                #[must_use]
                pub fn $builder_name(ticket: Ticket, $($field: $ty),*) -> Self {
                    Self::new(ticket, $variant)
                }
            )*
        }
    };
}

remote_call_builders! {
    login(credentials: Credentials) => RemoteRequest::Login(credentials),
    fetch_identity() => RemoteRequest::FetchIdentity,
    list_courses(query: ListQuery) => RemoteRequest::ListCourses(query),
    list_teachers(query: ListQuery) => RemoteRequest::ListTeachers(query),
    list_posts() => RemoteRequest::ListPosts,
    list_comments(post_id: String) => RemoteRequest::ListComments { post_id },
}

impl RemoteCall {
    #[must_use]
    pub fn new(ticket: Ticket, request: RemoteRequest) -> Self {
        Self {
            ticket,
            request,
            trace_context: TraceContext::from_current(),
        }
    }
}

/// Successful result of a [`RemoteRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteData {
    LoggedIn(LoginGrant),
    Identity(UserProfile),
    Registered { message: Option<String> },
    Profile(UserProfile),
    ProfileUpdated {
        profile: UserProfile,
        message: Option<String>,
    },
    Courses(CoursePage),
    CourseDetails(CourseDetails),
    Teachers(TeacherPage),
    Teacher(Teacher),
    /// Create, update or delete of a teacher went through.
    TeacherSaved,
    Posts(Vec<Post>),
    Post(Post),
    /// The backend may or may not echo the created post.
    PostCreated(Option<Post>),
    Voted,
    PostDeleted,
    CommentPosted,
    Comments(Vec<Comment>),
}

/// Category of a failed request, as far as the reducer cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Validation,
    Auth,
    Unauthorized,
    NotFound,
    Network,
    Decode,
    Other,
}

/// Cloneable summary of a [`PortalError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<PortalError> for Failure {
    fn from(error: PortalError) -> Self {
        let kind = match &error {
            PortalError::Validation { .. } => FailureKind::Validation,
            PortalError::Auth(_) => FailureKind::Auth,
            PortalError::Unauthorized(_) => FailureKind::Unauthorized,
            PortalError::NotFound(_) => FailureKind::NotFound,
            PortalError::Network(_) => FailureKind::Network,
            PortalError::Decode(_) => FailureKind::Decode,
            PortalError::Storage(_) | PortalError::Io(_) | PortalError::Config(_) => {
                FailureKind::Other
            }
        };
        Self {
            kind,
            message: error.user_message(),
        }
    }
}

/// Outcome of a [`RemoteCall`], echoing its ticket and request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteReply {
    pub ticket: Ticket,
    pub request: RemoteRequest,
    pub outcome: Result<RemoteData, Failure>,
}

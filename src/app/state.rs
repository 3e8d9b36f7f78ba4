//! Application state management and view model computation.
//!
//! This module defines [`AppState`], the central state container of the client.
//! It holds the session, one slot per remote collection or record, the search
//! debouncers and the current route. It is the single source of truth for
//! everything a front-end renders.
//!
//! # State Components
//!
//! - **Session**: token, identity and the epoch that tags every request
//! - **Lists**: paged courses and teachers with their queries
//! - **Records**: course, teacher and post details, profile, comments
//! - **Mutations**: teacher form and post actions, reported via notifications
//! - **Search**: one debouncer per list holding the uncommitted text
//!
//! # Example
//!
//! ```rust
//! use campus_portal::app::{AppState, ListKind};
//! use campus_portal::Config;
//!
//! let state = AppState::new(&Config::default());
//! let viewmodel = state.compute_list_viewmodel(ListKind::Courses);
//! assert!(viewmodel.display_items.is_empty());
//! ```

use super::actions::ListKind;
use super::debounce::Debouncer;
use super::notification::Notification;
use super::slot::{ListQuery, ListResult, RequestStatus, Resource};
use crate::domain::{
    Comment, Course, CourseDetails, Identity, Post, PortalError, Session, Teacher, TeacherSummary,
    UserProfile,
};
use crate::routing::Route;
use crate::ui::pagination::PaginationView;
use crate::ui::viewmodel::{
    display_items, EmptyState, HeaderInfo, ListViewModel, Listable, SearchBarInfo,
};
use crate::Config;

/// Message attached to the form that failed local validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormError {
    /// Offending field, when the failure is about a single input.
    pub field: Option<String>,
    pub message: String,
}

impl From<&PortalError> for FormError {
    fn from(error: &PortalError) -> Self {
        let field = match error {
            PortalError::Validation { field, .. } => Some(field.clone()),
            _ => None,
        };
        Self {
            field,
            message: error.user_message(),
        }
    }
}

/// Central application state container.
///
/// Mutated only by the event handler. Every remote slot records its own status
/// and the sequence number of its latest request, so replies can be matched
/// against the request that is still wanted.
#[derive(Debug, Clone)]
pub struct AppState {
    pub session: Session,

    /// Login and identity refresh. Its error is the session error shown on the
    /// login form or next to the user menu.
    pub auth: Resource<()>,

    /// Sign-up; holds the backend's acknowledgement text.
    pub registration: Resource<Option<String>>,

    pub profile: Resource<UserProfile>,

    pub courses: ListResult<Course>,
    pub course_search: Debouncer,
    pub course_details: Resource<CourseDetails>,

    pub teachers: ListResult<TeacherSummary>,
    pub teacher_search: Debouncer,
    pub teacher_details: Resource<Teacher>,
    /// Create, update and delete of teachers.
    pub teacher_form: Resource<()>,

    pub posts: Resource<Vec<Post>>,
    pub post_details: Resource<Post>,
    /// Comments of the post in `post_details`.
    pub comments: Resource<Vec<Comment>>,
    /// Create, vote, delete and comment on posts.
    pub post_mutation: Resource<()>,

    /// Last local validation failure; cleared by the next valid submission.
    pub form_error: Option<FormError>,

    /// Route currently on screen, after the authorization gate.
    pub route: Option<Route>,

    notifications: Vec<Notification>,
}

impl AppState {
    /// Creates an empty state with page sizes and quiet period from `config`.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            session: Session::new(),
            auth: Resource::default(),
            registration: Resource::default(),
            profile: Resource::default(),
            courses: ListResult::new(ListQuery::new(config.page_limit_courses)),
            course_search: Debouncer::new(config.search_debounce()),
            course_details: Resource::default(),
            teachers: ListResult::new(ListQuery::new(config.page_limit_teachers)),
            teacher_search: Debouncer::new(config.search_debounce()),
            teacher_details: Resource::default(),
            teacher_form: Resource::default(),
            posts: Resource::default(),
            post_details: Resource::default(),
            comments: Resource::default(),
            post_mutation: Resource::default(),
            form_error: None,
            route: None,
            notifications: Vec::new(),
        }
    }

    /// Creates a state whose session is seeded from the durable store.
    #[must_use]
    pub fn with_session(config: &Config, session: Session) -> Self {
        Self {
            session,
            ..Self::new(config)
        }
    }

    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.session.identity()
    }

    /// Error of the last login or identity refresh.
    #[must_use]
    pub fn session_error(&self) -> Option<&str> {
        self.auth.error.as_deref()
    }

    #[must_use]
    pub const fn debouncer(&self, list: ListKind) -> &Debouncer {
        match list {
            ListKind::Courses => &self.course_search,
            ListKind::Teachers => &self.teacher_search,
        }
    }

    pub fn debouncer_mut(&mut self, list: ListKind) -> &mut Debouncer {
        match list {
            ListKind::Courses => &mut self.course_search,
            ListKind::Teachers => &mut self.teacher_search,
        }
    }

    /// Query of the given list.
    #[must_use]
    pub const fn list_query(&self, list: ListKind) -> &ListQuery {
        match list {
            ListKind::Courses => &self.courses.query,
            ListKind::Teachers => &self.teachers.query,
        }
    }

    pub fn list_query_mut(&mut self, list: ListKind) -> &mut ListQuery {
        match list {
            ListKind::Courses => &mut self.courses.query,
            ListKind::Teachers => &mut self.teachers.query,
        }
    }

    /// Total page count last reported for the given list.
    #[must_use]
    pub const fn total_pages(&self, list: ListKind) -> u32 {
        match list {
            ListKind::Courses => self.courses.total_pages,
            ListKind::Teachers => self.teachers.total_pages,
        }
    }

    /// Queues a message for the front-end.
    pub fn notify(&mut self, notification: Notification) {
        tracing::debug!(level = ?notification.level, message = %notification.message, "notification queued");
        self.notifications.push(notification);
    }

    /// Takes all queued messages, oldest first.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Forgets every loaded record and cancels pending searches.
    ///
    /// In-flight replies for any slot become stale.
    pub fn reset_remote_state(&mut self) {
        self.auth.reset();
        self.registration.reset();
        self.profile.reset();
        self.courses.reset();
        self.course_search.reset();
        self.course_details.reset();
        self.teachers.reset();
        self.teacher_search.reset();
        self.teacher_details.reset();
        self.teacher_form.reset();
        self.posts.reset();
        self.post_details.reset();
        self.comments.reset();
        self.post_mutation.reset();
        self.form_error = None;
    }

    /// Counts an accepted vote on every loaded copy of the post.
    pub fn apply_vote(&mut self, post_id: &str, vote: crate::domain::Vote) {
        if let Some(posts) = self.posts.value.as_mut() {
            for post in posts.iter_mut().filter(|p| p.id == post_id) {
                post.apply_vote(vote);
            }
        }
        if let Some(post) = self.post_details.value.as_mut().filter(|p| p.id == post_id) {
            post.apply_vote(vote);
        }
    }

    /// Computes the renderable view of a paged list.
    #[must_use]
    pub fn compute_list_viewmodel(&self, list: ListKind) -> ListViewModel {
        match list {
            ListKind::Courses => {
                self.list_viewmodel(&self.courses, &self.course_search, "Courses", "No courses found")
            }
            ListKind::Teachers => self.list_viewmodel(
                &self.teachers,
                &self.teacher_search,
                "Teachers",
                "No teachers found",
            ),
        }
    }

    #[allow(clippy::unused_self)]
    fn list_viewmodel<T: Listable>(
        &self,
        slot: &ListResult<T>,
        search: &Debouncer,
        title: &str,
        empty_message: &str,
    ) -> ListViewModel {
        let term = slot.query.search.as_str();
        let header = HeaderInfo {
            title: if slot.loaded {
                format!(" {title} (page {} of {}) ", slot.query.page, slot.total_pages.max(1))
            } else {
                format!(" {title} ")
            },
        };

        let empty_state = (slot.loaded && slot.items.is_empty()).then(|| EmptyState {
            message: empty_message.to_string(),
            subtitle: if term.trim().is_empty() {
                String::new()
            } else {
                format!("Nothing matches \"{}\"", term.trim())
            },
        });

        ListViewModel {
            header,
            search_bar: SearchBarInfo {
                input: search.input().to_string(),
                committed: term.to_string(),
            },
            display_items: display_items(&slot.items, term),
            pagination: slot
                .loaded
                .then(|| PaginationView::new(slot.query.page, slot.total_pages)),
            loading: slot.status == RequestStatus::Pending,
            error: if slot.loaded { None } else { slot.error.clone() },
            empty_state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::slot::SlotId;

    fn state() -> AppState {
        AppState::new(&Config::default())
    }

    fn course(id: &str, name: &str) -> Course {
        Course {
            id: id.into(),
            name: name.into(),
        }
    }

    #[test]
    fn page_sizes_come_from_config() {
        let state = state();
        assert_eq!(state.courses.query.limit, 9);
        assert_eq!(state.teachers.query.limit, 10);
        assert_eq!(state.courses.query.page, 1);
    }

    #[test]
    fn unloaded_list_shows_error_banner() {
        let mut state = state();
        state.courses.issue(SlotId::Courses, 0);
        state.courses.reject("Network error");

        let vm = state.compute_list_viewmodel(ListKind::Courses);
        assert_eq!(vm.error.as_deref(), Some("Network error"));
        assert!(vm.pagination.is_none());
        assert!(!vm.loading);
    }

    #[test]
    fn later_failure_keeps_previous_page() {
        let mut state = state();
        state.courses.issue(SlotId::Courses, 0);
        state.courses.fulfill(vec![course("c1", "Algorithms")], 3);
        state.courses.issue(SlotId::Courses, 0);
        state.courses.reject("timeout");

        let vm = state.compute_list_viewmodel(ListKind::Courses);
        assert_eq!(vm.error, None);
        assert_eq!(vm.display_items.len(), 1);
        assert_eq!(vm.pagination.map(|p| p.total), Some(3));
    }

    #[test]
    fn empty_page_names_the_search_term() {
        let mut state = state();
        state.teachers.query.search = "zzz".into();
        state.teachers.issue(SlotId::Teachers, 0);
        state.teachers.fulfill(vec![], 0);

        let vm = state.compute_list_viewmodel(ListKind::Teachers);
        let empty = vm.empty_state.expect("empty state");
        assert_eq!(empty.message, "No teachers found");
        assert_eq!(empty.subtitle, "Nothing matches \"zzz\"");
    }

    #[test]
    fn pending_list_reports_loading() {
        let mut state = state();
        state.courses.issue(SlotId::Courses, 0);
        assert!(state.compute_list_viewmodel(ListKind::Courses).loading);
    }

    #[test]
    fn notifications_drain_in_order() {
        let mut state = state();
        state.notify(Notification::success("one"));
        state.notify(Notification::error("two"));
        let drained = state.drain_notifications();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].message, "one");
        assert!(drained[1].is_error());
        assert!(state.drain_notifications().is_empty());
    }

    #[test]
    fn reset_forgets_records() {
        let mut state = state();
        state.profile.fulfill(UserProfile::default());
        state.form_error = Some(FormError {
            field: None,
            message: "x".into(),
        });
        state.reset_remote_state();
        assert!(state.profile.value.is_none());
        assert!(state.form_error.is_none());
    }
}

//! Event handling and state transition logic.
//!
//! This module implements the core event handler that processes user intents,
//! timer deadlines and remote replies, translating them into state changes and
//! action sequences. It is the only place `AppState` is mutated.
//!
//! # Architecture
//!
//! The handler follows a unidirectional data flow pattern:
//! 1. Events arrive from the front-end, a debounce timer or a remote task
//! 2. [`handle_event`] pattern-matches the event type
//! 3. State mutations occur on the matching slot
//! 4. Actions are collected and returned for execution
//!
//! # Event Types
//!
//! - **Navigation**: `Navigate`
//! - **Session**: `Login`, `Logout`, `RefreshIdentity`, `Register`
//! - **Lists**: `SearchInput`, `SearchDeadline`, `ChangePage`, `NextPage`,
//!   `PreviousPage`, `Reload`
//! - **Records and mutations**: posts, comments, teachers, profile
//! - **Remote**: `Remote` with the reply of an earlier `Action::Remote`
//!
//! # Stale replies
//!
//! A reply is applied only when its ticket carries the latest sequence number
//! of its slot and the current session epoch. Anything else is dropped without
//! touching state. Mutation slots check the epoch alone, since concurrent
//! mutations do not supersede each other.
//!
//! # Example
//!
//! ```rust
//! use campus_portal::app::{handle_event, Action, AppState, Event};
//! use campus_portal::Config;
//!
//! let mut state = AppState::new(&Config::default());
//! let (changed, actions) = handle_event(&mut state, &Event::Navigate("/courses".into()))?;
//! assert!(changed);
//! assert!(matches!(actions.last(), Some(Action::Redirect(_))));
//! # Ok::<(), campus_portal::domain::PortalError>(())
//! ```

use super::actions::{Action, ListKind};
use super::notification::Notification;
use super::slot::{SlotId, Ticket};
use super::state::{AppState, FormError};
use crate::domain::{
    CommentDraft, Credentials, LoginGrant, PortalError, PostDraft, ProfileUpdate, Registration,
    Result, Role, TeacherDraft, UserProfile, Vote,
};
use crate::remote::{Failure, FailureKind, RemoteCall, RemoteData, RemoteReply, RemoteRequest};
use crate::routing::{navigate, Navigation, Route};
use crate::storage::StoredSession;
use tokio::time::Instant;

const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";
const ADMIN_REQUIRED: &str = "You do not have Admin privileges.";

/// Events triggered by user intents, timers, or remote replies.
///
/// Each event represents a discrete occurrence that may cause state changes
/// and action emissions. The handler processes these sequentially, ensuring
/// deterministic state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Requests a path; the authorization gate decides what is shown.
    Navigate(String),

    /// Submits the login form.
    Login(Credentials),
    /// Signs out. Idempotent.
    Logout,
    /// Re-reads the identity behind the current token.
    RefreshIdentity,
    /// Submits the sign-up form.
    Register(Registration),

    LoadProfile,
    UpdateProfile(ProfileUpdate),

    /// A keystroke in a list's search box.
    SearchInput {
        list: ListKind,
        /// Full text of the search box after the keystroke.
        text: String,
        at: Instant,
    },
    /// A debounce timer armed by `Action::ScheduleSearch` fired.
    SearchDeadline { list: ListKind, at: Instant },
    /// Jumps to a page; ignored when out of range.
    ChangePage { list: ListKind, page: u32 },
    NextPage(ListKind),
    PreviousPage(ListKind),
    /// Refetches the current page.
    Reload(ListKind),

    LoadPosts,
    SubmitPost(PostDraft),
    VotePost { post_id: String, vote: Vote },
    DeletePost { post_id: String },
    SubmitComment(CommentDraft),

    /// Creates a teacher when `id` is `None`, updates it otherwise.
    SaveTeacher {
        id: Option<String>,
        draft: TeacherDraft,
    },
    DeleteTeacher { id: String },

    /// Reply to an earlier `Action::Remote`.
    Remote(RemoteReply),
}

impl Event {
    /// Short name for logs. Never includes form contents.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Navigate(_) => "navigate",
            Self::Login(_) => "login",
            Self::Logout => "logout",
            Self::RefreshIdentity => "refresh_identity",
            Self::Register(_) => "register",
            Self::LoadProfile => "load_profile",
            Self::UpdateProfile(_) => "update_profile",
            Self::SearchInput { .. } => "search_input",
            Self::SearchDeadline { .. } => "search_deadline",
            Self::ChangePage { .. } => "change_page",
            Self::NextPage(_) => "next_page",
            Self::PreviousPage(_) => "previous_page",
            Self::Reload(_) => "reload",
            Self::LoadPosts => "load_posts",
            Self::SubmitPost(_) => "submit_post",
            Self::VotePost { .. } => "vote_post",
            Self::DeletePost { .. } => "delete_post",
            Self::SubmitComment(_) => "submit_comment",
            Self::SaveTeacher { .. } => "save_teacher",
            Self::DeleteTeacher { .. } => "delete_teacher",
            Self::Remote(_) => "remote_reply",
        }
    }
}

/// Processes an event, mutates application state, and returns actions to execute.
///
/// The boolean reports whether anything visible changed, so a front-end can
/// skip re-rendering. Local validation failures are recorded in
/// `state.form_error` and produce no actions.
///
/// # Errors
///
/// Currently infallible; the `Result` keeps the signature stable for handlers
/// that need to fail.
///
/// # Tracing
///
/// Each call creates a debug-level span with the event name.
#[allow(clippy::too_many_lines)]
pub fn handle_event(state: &mut AppState, event: &Event) -> Result<(bool, Vec<Action>)> {
    let _span = tracing::debug_span!("handle_event", event_type = event.name()).entered();

    let outcome = match event {
        Event::Navigate(path) => handle_navigate(state, path),

        Event::Login(credentials) => match credentials.validate() {
            Err(error) => reject_form(state, &error),
            Ok(()) => {
                state.form_error = None;
                let ticket = state.auth.issue(SlotId::Session, state.session.epoch(), false);
                (true, vec![Action::Remote(RemoteCall::login(ticket, credentials.clone()))])
            }
        },

        Event::Logout => {
            tracing::info!(was_authenticated = state.session.is_authenticated(), "logging out");
            state.session.clear();
            state.reset_remote_state();
            let mut actions = vec![Action::ClearStoredSession];
            actions.extend(redirect_to(state, &Route::Login));
            (true, actions)
        }

        Event::RefreshIdentity => {
            if !state.session.is_authenticated() {
                tracing::debug!("no token to refresh");
                return Ok((false, vec![]));
            }
            let ticket = state.auth.issue(SlotId::Session, state.session.epoch(), false);
            (true, vec![Action::Remote(RemoteCall::fetch_identity(ticket))])
        }

        Event::Register(registration) => match registration.validate() {
            Err(error) => reject_form(state, &error),
            Ok(_) => {
                state.form_error = None;
                let ticket = state
                    .registration
                    .issue(SlotId::Registration, state.session.epoch(), true);
                let request = RemoteRequest::Register(registration.clone());
                (true, vec![Action::Remote(RemoteCall::new(ticket, request))])
            }
        },

        Event::LoadProfile => (true, vec![fetch_profile(state)]),

        Event::UpdateProfile(update) => match update.validate() {
            Err(error) => reject_form(state, &error),
            Ok(()) => {
                state.form_error = None;
                let ticket = state.profile.issue(SlotId::Profile, state.session.epoch(), false);
                let request = RemoteRequest::UpdateProfile(update.clone());
                (true, vec![Action::Remote(RemoteCall::new(ticket, request))])
            }
        },

        Event::SearchInput { list, text, at } => {
            let deadline = state.debouncer_mut(*list).on_input(text.clone(), *at);
            (
                true,
                vec![Action::ScheduleSearch {
                    list: *list,
                    deadline,
                }],
            )
        }

        Event::SearchDeadline { list, at } => match state.debouncer_mut(*list).poll(*at) {
            Some(term) => commit_search(state, *list, &term),
            None => (false, vec![]),
        },

        Event::ChangePage { list, page } => change_page(state, *list, *page),
        Event::NextPage(list) => {
            let page = state.list_query(*list).page.saturating_add(1);
            change_page(state, *list, page)
        }
        Event::PreviousPage(list) => {
            let page = state.list_query(*list).page.saturating_sub(1);
            change_page(state, *list, page)
        }
        Event::Reload(list) => (true, vec![fetch_list(state, *list)]),

        Event::LoadPosts => (true, vec![fetch_posts(state)]),

        Event::SubmitPost(draft) => match draft.validate() {
            Err(error) => reject_form(state, &error),
            Ok(()) => {
                state.form_error = None;
                (true, vec![mutate_post(state, RemoteRequest::CreatePost(draft.clone()))])
            }
        },

        Event::VotePost { post_id, vote } => {
            let request = RemoteRequest::VotePost {
                post_id: post_id.clone(),
                vote: *vote,
            };
            (true, vec![mutate_post(state, request)])
        }

        Event::DeletePost { post_id } => {
            let request = RemoteRequest::DeletePost {
                post_id: post_id.clone(),
            };
            (true, vec![mutate_post(state, request)])
        }

        Event::SubmitComment(draft) => match draft.validate() {
            Err(error) => reject_form(state, &error),
            Ok(()) => {
                state.form_error = None;
                (true, vec![mutate_post(state, RemoteRequest::PostComment(draft.clone()))])
            }
        },

        Event::SaveTeacher { id, draft } => match draft.validate() {
            Err(error) => reject_form(state, &error),
            Ok(()) => {
                state.form_error = None;
                let request = id.as_ref().map_or_else(
                    || RemoteRequest::CreateTeacher(draft.clone()),
                    |id| RemoteRequest::UpdateTeacher {
                        id: id.clone(),
                        draft: draft.clone(),
                    },
                );
                (true, vec![mutate_teacher(state, request)])
            }
        },

        Event::DeleteTeacher { id } => {
            let request = RemoteRequest::DeleteTeacher { id: id.clone() };
            (true, vec![mutate_teacher(state, request)])
        }

        Event::Remote(reply) => handle_reply(state, reply),
    };

    Ok(outcome)
}

fn reject_form(state: &mut AppState, error: &PortalError) -> (bool, Vec<Action>) {
    tracing::debug!(%error, "form rejected locally");
    state.form_error = Some(FormError::from(error));
    (true, vec![])
}

fn handle_navigate(state: &mut AppState, path: &str) -> (bool, Vec<Action>) {
    let navigation = navigate(&state.session, path);
    match navigation {
        Navigation::NotFound(path) => {
            state.notify(Notification::error(format!("Page not found: {path}")));
            (true, vec![])
        }
        Navigation::Render(route) => (true, enter_route(state, route)),
        Navigation::Redirect { requested, to } => {
            tracing::debug!(%requested, %to, "navigation redirected");
            let mut actions = enter_route(state, to.clone());
            actions.push(Action::Redirect(to));
            (true, actions)
        }
    }
}

/// Moves to `target` through the authorization gate and reports the move.
fn redirect_to(state: &mut AppState, target: &Route) -> Vec<Action> {
    let route = navigate(&state.session, &target.path())
        .route()
        .cloned()
        .unwrap_or(Route::Login);
    let mut actions = enter_route(state, route.clone());
    actions.push(Action::Redirect(route));
    actions
}

/// Shows `route` and issues the loads its page needs.
fn enter_route(state: &mut AppState, route: Route) -> Vec<Action> {
    let epoch = state.session.epoch();
    let actions = match &route {
        Route::Home | Route::Posts => vec![fetch_posts(state)],
        Route::Courses => vec![fetch_list(state, ListKind::Courses)],
        Route::Teachers => vec![fetch_list(state, ListKind::Teachers)],
        Route::Profile => vec![fetch_profile(state)],
        Route::Course { id } => {
            let clear = state.course_details.value.as_ref().is_some_and(|c| &c.id != id);
            let ticket = state.course_details.issue(SlotId::CourseDetails, epoch, clear);
            let request = RemoteRequest::CourseDetails { id: id.clone() };
            vec![Action::Remote(RemoteCall::new(ticket, request))]
        }
        Route::Teacher { id } | Route::EditTeacher { id } => {
            let clear = state.teacher_details.value.as_ref().is_some_and(|t| &t.id != id);
            let ticket = state.teacher_details.issue(SlotId::TeacherDetails, epoch, clear);
            let request = RemoteRequest::TeacherDetails { id: id.clone() };
            vec![Action::Remote(RemoteCall::new(ticket, request))]
        }
        Route::Post { id } => {
            let clear = state.post_details.value.as_ref().is_some_and(|p| &p.id != id);
            let ticket = state.post_details.issue(SlotId::PostDetails, epoch, clear);
            let request = RemoteRequest::PostDetails { id: id.clone() };
            vec![
                Action::Remote(RemoteCall::new(ticket, request)),
                fetch_comments(state, id, clear),
            ]
        }
        Route::NewTeacher | Route::Register | Route::Login | Route::Unauthorized => vec![],
    };
    tracing::debug!(%route, loads = actions.len(), "route entered");
    state.route = Some(route);
    actions
}

fn fetch_list(state: &mut AppState, list: ListKind) -> Action {
    let epoch = state.session.epoch();
    let call = match list {
        ListKind::Courses => {
            let ticket = state.courses.issue(SlotId::Courses, epoch);
            RemoteCall::list_courses(ticket, state.courses.query.clone())
        }
        ListKind::Teachers => {
            let ticket = state.teachers.issue(SlotId::Teachers, epoch);
            RemoteCall::list_teachers(ticket, state.teachers.query.clone())
        }
    };
    tracing::debug!(%list, seq = call.ticket.seq, "list fetch issued");
    Action::Remote(call)
}

fn fetch_posts(state: &mut AppState) -> Action {
    let ticket = state.posts.issue(SlotId::Posts, state.session.epoch(), false);
    Action::Remote(RemoteCall::list_posts(ticket))
}

fn fetch_comments(state: &mut AppState, post_id: &str, clear: bool) -> Action {
    let ticket = state.comments.issue(SlotId::Comments, state.session.epoch(), clear);
    Action::Remote(RemoteCall::list_comments(ticket, post_id.to_string()))
}

fn fetch_profile(state: &mut AppState) -> Action {
    let ticket = state.profile.issue(SlotId::Profile, state.session.epoch(), false);
    Action::Remote(RemoteCall::new(ticket, RemoteRequest::FetchProfile))
}

fn mutate_post(state: &mut AppState, request: RemoteRequest) -> Action {
    let ticket = state
        .post_mutation
        .issue(SlotId::PostMutation, state.session.epoch(), false);
    Action::Remote(RemoteCall::new(ticket, request))
}

fn mutate_teacher(state: &mut AppState, request: RemoteRequest) -> Action {
    let ticket = state
        .teacher_form
        .issue(SlotId::TeacherForm, state.session.epoch(), false);
    Action::Remote(RemoteCall::new(ticket, request))
}

/// Commits a debounced search term: back to page 1 and refetch, unless the
/// list already shows page 1 of that term.
fn commit_search(state: &mut AppState, list: ListKind, term: &str) -> (bool, Vec<Action>) {
    let term = term.trim();
    let query = state.list_query_mut(list);
    if query.search == term && query.page == 1 {
        tracing::debug!(%list, "search term unchanged");
        return (false, vec![]);
    }
    query.search = term.to_string();
    query.page = 1;
    (true, vec![fetch_list(state, list)])
}

fn change_page(state: &mut AppState, list: ListKind, page: u32) -> (bool, Vec<Action>) {
    let total = state.total_pages(list);
    if page < 1 || page > total {
        tracing::debug!(%list, page, total, "page out of range");
        return (false, vec![]);
    }
    state.list_query_mut(list).page = page;
    (true, vec![fetch_list(state, list)])
}

/// The reply's page ran past the new last page; load the page the query now names.
fn refetch_clamped(state: &mut AppState, list: ListKind) -> Action {
    tracing::debug!(%list, page = state.list_query(list).page, "page clamped, refetching");
    fetch_list(state, list)
}

/// Whether `ticket` still names the wanted request of its slot.
fn is_current(state: &AppState, ticket: &Ticket) -> bool {
    let epoch = state.session.epoch();
    match ticket.slot {
        SlotId::Session => state.auth.accepts(ticket, epoch),
        SlotId::Registration => state.registration.accepts(ticket, epoch),
        SlotId::Profile => state.profile.accepts(ticket, epoch),
        SlotId::Courses => state.courses.accepts(ticket, epoch),
        SlotId::CourseDetails => state.course_details.accepts(ticket, epoch),
        SlotId::Teachers => state.teachers.accepts(ticket, epoch),
        SlotId::TeacherDetails => state.teacher_details.accepts(ticket, epoch),
        SlotId::Posts => state.posts.accepts(ticket, epoch),
        SlotId::PostDetails => state.post_details.accepts(ticket, epoch),
        SlotId::Comments => state.comments.accepts(ticket, epoch),
        SlotId::TeacherForm | SlotId::PostMutation => ticket.epoch == epoch,
    }
}

fn handle_reply(state: &mut AppState, reply: &RemoteReply) -> (bool, Vec<Action>) {
    let ticket = &reply.ticket;
    if !is_current(state, ticket) {
        tracing::debug!(
            slot = ?ticket.slot,
            seq = ticket.seq,
            epoch = ticket.epoch,
            current_epoch = state.session.epoch(),
            "discarding stale reply"
        );
        return (false, vec![]);
    }

    if let Err(failure) = &reply.outcome {
        tracing::debug!(slot = ?ticket.slot, kind = ?failure.kind, message = %failure.message, "request failed");
        if failure.kind == FailureKind::Unauthorized && ticket.slot != SlotId::Session {
            return (true, expire_session(state));
        }
    }

    let outcome = &reply.outcome;
    match ticket.slot {
        SlotId::Session => apply_session_reply(state, &reply.request, outcome),
        SlotId::Registration => apply_registration_reply(state, outcome),
        SlotId::Profile => apply_profile_reply(state, &reply.request, outcome),
        SlotId::Courses => match outcome {
            Ok(RemoteData::Courses(page)) => {
                if state.courses.fulfill(page.courses.clone(), page.total_pages) {
                    (true, vec![refetch_clamped(state, ListKind::Courses)])
                } else {
                    (true, vec![])
                }
            }
            Err(failure) => {
                state.courses.reject(&failure.message);
                (true, vec![])
            }
            Ok(_) => mismatched(ticket.slot),
        },
        SlotId::Teachers => match outcome {
            Ok(RemoteData::Teachers(page)) => {
                if state.teachers.fulfill(page.teachers.clone(), page.total_pages) {
                    (true, vec![refetch_clamped(state, ListKind::Teachers)])
                } else {
                    (true, vec![])
                }
            }
            Err(failure) => {
                state.teachers.reject(&failure.message);
                (true, vec![])
            }
            Ok(_) => mismatched(ticket.slot),
        },
        SlotId::CourseDetails => {
            match outcome {
                Ok(RemoteData::CourseDetails(course)) => state.course_details.fulfill(course.clone()),
                Err(failure) => state.course_details.reject(&failure.message),
                Ok(_) => return mismatched(ticket.slot),
            }
            (true, vec![])
        }
        SlotId::TeacherDetails => {
            match outcome {
                Ok(RemoteData::Teacher(teacher)) => state.teacher_details.fulfill(teacher.clone()),
                Err(failure) => state.teacher_details.reject(&failure.message),
                Ok(_) => return mismatched(ticket.slot),
            }
            (true, vec![])
        }
        SlotId::Posts => {
            match outcome {
                Ok(RemoteData::Posts(posts)) => state.posts.fulfill(posts.clone()),
                Err(failure) => state.posts.reject(&failure.message),
                Ok(_) => return mismatched(ticket.slot),
            }
            (true, vec![])
        }
        SlotId::PostDetails => {
            match outcome {
                Ok(RemoteData::Post(post)) => state.post_details.fulfill(post.clone()),
                Err(failure) => state.post_details.reject(&failure.message),
                Ok(_) => return mismatched(ticket.slot),
            }
            (true, vec![])
        }
        SlotId::Comments => {
            match outcome {
                Ok(RemoteData::Comments(comments)) => state.comments.fulfill(comments.clone()),
                Err(failure) if failure.kind == FailureKind::NotFound => {
                    state.comments.fulfill(Vec::new());
                }
                Err(failure) => state.comments.reject(&failure.message),
                Ok(_) => return mismatched(ticket.slot),
            }
            (true, vec![])
        }
        SlotId::TeacherForm => apply_teacher_mutation(state, &reply.request, outcome),
        SlotId::PostMutation => apply_post_mutation(state, &reply.request, outcome),
    }
}

fn mismatched(slot: SlotId) -> (bool, Vec<Action>) {
    tracing::warn!(?slot, "reply payload does not belong to its slot");
    (false, vec![])
}

/// Drops the session after the backend refused the token.
fn expire_session(state: &mut AppState) -> Vec<Action> {
    tracing::warn!("token rejected, clearing session");
    state.session.clear();
    state.reset_remote_state();
    state.auth.reject(SESSION_EXPIRED);
    state.notify(Notification::error(SESSION_EXPIRED));
    let mut actions = vec![Action::ClearStoredSession];
    actions.extend(redirect_to(state, &Route::Login));
    actions
}

/// Stores `profile` as the session identity, keeping known roles when the
/// backend omitted them.
fn adopt_identity(state: &mut AppState, profile: &UserProfile) -> Option<Action> {
    let mut identity = profile.to_identity();
    if identity.roles.is_empty() {
        if let Some(current) = state.session.identity() {
            identity.roles = current.roles.clone();
        }
    }
    if !state.session.set_identity(identity) {
        return None;
    }
    state
        .session
        .token()
        .map(|token| Action::PersistSession(StoredSession::new(token, Some(profile.clone()))))
}

fn apply_session_reply(
    state: &mut AppState,
    request: &RemoteRequest,
    outcome: &std::result::Result<RemoteData, Failure>,
) -> (bool, Vec<Action>) {
    match (request, outcome) {
        (RemoteRequest::Login(credentials), Ok(RemoteData::LoggedIn(grant))) => {
            (true, complete_login(state, credentials, grant))
        }
        (RemoteRequest::Login(_), Err(failure)) => {
            state.auth.reject(&failure.message);
            state.notify(Notification::error(failure.message.clone()));
            (true, vec![])
        }
        (_, Ok(RemoteData::Identity(profile))) => {
            let persist = adopt_identity(state, profile);
            state.auth.fulfill(());
            (true, persist.into_iter().collect())
        }
        (_, Err(failure)) => {
            // The token is kept; only the next authenticated call decides.
            tracing::warn!(kind = ?failure.kind, message = %failure.message, "identity refresh failed");
            state.auth.reject(&failure.message);
            (true, vec![])
        }
        (_, Ok(_)) => mismatched(SlotId::Session),
    }
}

fn complete_login(state: &mut AppState, credentials: &Credentials, grant: &LoginGrant) -> Vec<Action> {
    if credentials.role == Role::Admin && !grant.user.roles.contains(&Role::Admin) {
        tracing::info!(user = %grant.user.id, "admin login refused for non-admin user");
        state.auth.reject(ADMIN_REQUIRED);
        state.notify(Notification::error(ADMIN_REQUIRED));
        return vec![];
    }

    tracing::info!(user = %grant.user.id, "logged in");
    state
        .session
        .sign_in(grant.token.clone(), Some(grant.user.to_identity()));
    state.auth.fulfill(());
    state.notify(Notification::success("Login successful!"));

    let mut actions = vec![Action::PersistSession(StoredSession::new(
        grant.token.clone(),
        Some(grant.user.clone()),
    ))];
    let ticket = state.auth.issue(SlotId::Session, state.session.epoch(), false);
    actions.push(Action::Remote(RemoteCall::fetch_identity(ticket)));
    actions.extend(redirect_to(state, &Route::Home));
    actions
}

fn apply_registration_reply(
    state: &mut AppState,
    outcome: &std::result::Result<RemoteData, Failure>,
) -> (bool, Vec<Action>) {
    match outcome {
        Ok(RemoteData::Registered { message }) => {
            state.registration.fulfill(message.clone());
            let text = message
                .clone()
                .unwrap_or_else(|| "Registration successful".to_string());
            state.notify(Notification::success(text));
            (true, redirect_to(state, &Route::Login))
        }
        Err(failure) => {
            state.registration.reject(&failure.message);
            state.notify(Notification::error(failure.message.clone()));
            (true, vec![])
        }
        Ok(_) => mismatched(SlotId::Registration),
    }
}

fn apply_profile_reply(
    state: &mut AppState,
    request: &RemoteRequest,
    outcome: &std::result::Result<RemoteData, Failure>,
) -> (bool, Vec<Action>) {
    match outcome {
        Ok(RemoteData::Profile(profile)) => {
            state.profile.fulfill(profile.clone());
            (true, vec![])
        }
        Ok(RemoteData::ProfileUpdated { profile, message }) => {
            state.profile.fulfill(profile.clone());
            let persist = adopt_identity(state, profile);
            let text = message
                .clone()
                .unwrap_or_else(|| "Profile updated successfully".to_string());
            state.notify(Notification::success(text));
            (true, persist.into_iter().collect())
        }
        Err(failure) => {
            state.profile.reject(&failure.message);
            if matches!(request, RemoteRequest::UpdateProfile(_)) {
                state.notify(Notification::error(failure.message.clone()));
            }
            (true, vec![])
        }
        Ok(_) => mismatched(SlotId::Profile),
    }
}

fn apply_teacher_mutation(
    state: &mut AppState,
    request: &RemoteRequest,
    outcome: &std::result::Result<RemoteData, Failure>,
) -> (bool, Vec<Action>) {
    match outcome {
        Ok(RemoteData::TeacherSaved) => {
            state.teacher_form.settle();
            if let RemoteRequest::DeleteTeacher { id } = request {
                if state.teacher_details.value.as_ref().is_some_and(|t| &t.id == id) {
                    state.teacher_details.reset();
                }
            }
            (true, redirect_to(state, &Route::Teachers))
        }
        Err(failure) => {
            state.teacher_form.reject(&failure.message);
            let prefix = if matches!(request, RemoteRequest::DeleteTeacher { .. }) {
                "Error deleting teacher"
            } else {
                "Error saving teacher"
            };
            state.notify(Notification::error(format!("{prefix}: {}", failure.message)));
            (true, vec![])
        }
        Ok(_) => mismatched(SlotId::TeacherForm),
    }
}

fn apply_post_mutation(
    state: &mut AppState,
    request: &RemoteRequest,
    outcome: &std::result::Result<RemoteData, Failure>,
) -> (bool, Vec<Action>) {
    if let Err(failure) = outcome {
        state.post_mutation.reject(&failure.message);
        let message = match request {
            RemoteRequest::CreatePost(_) => "Failed to create post".to_string(),
            RemoteRequest::DeletePost { .. } => "Failed to delete post".to_string(),
            RemoteRequest::VotePost { vote, .. } => format!("Failed to {} post", vote.verb()),
            _ => "Failed to post comment".to_string(),
        };
        state.notify(Notification::error(message));
        return (true, vec![]);
    }

    state.post_mutation.settle();
    match (request, outcome) {
        (RemoteRequest::CreatePost(_), Ok(RemoteData::PostCreated(_))) => {
            state.notify(Notification::success("Post created successfully!"));
            (true, vec![fetch_posts(state)])
        }
        (RemoteRequest::DeletePost { post_id }, Ok(RemoteData::PostDeleted)) => {
            if state.post_details.value.as_ref().is_some_and(|p| &p.id == post_id) {
                state.post_details.reset();
                state.comments.reset();
            }
            state.notify(Notification::success("Post deleted successfully!"));
            (true, vec![fetch_posts(state)])
        }
        (RemoteRequest::VotePost { post_id, vote }, Ok(RemoteData::Voted)) => {
            state.apply_vote(post_id, *vote);
            let message = match vote {
                Vote::Up => "Post upvoted",
                Vote::Down => "Post downvoted",
            };
            state.notify(Notification::success(message));
            (true, vec![])
        }
        (RemoteRequest::PostComment(draft), Ok(RemoteData::CommentPosted)) => {
            state.notify(Notification::success("Comment posted successfully"));
            (true, vec![fetch_comments(state, &draft.post_id, false)])
        }
        _ => mismatched(SlotId::PostMutation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::slot::{ListQuery, RequestStatus};
    use crate::app::NotificationLevel;
    use crate::domain::{Comment, Course, CoursePage, Identity, Post, Session};
    use crate::Config;
    use std::collections::BTreeSet;
    use tokio::time::Duration;

    fn profile(roles: &[Role]) -> UserProfile {
        UserProfile {
            id: "u1".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.edu".into(),
            erp: Some(18151),
            roles: roles.iter().cloned().collect::<BTreeSet<_>>(),
            profile_picture: None,
        }
    }

    fn signed_in(roles: &[Role]) -> AppState {
        let identity: Identity = profile(roles).to_identity();
        AppState::with_session(&Config::default(), Session::restored("tok".into(), Some(identity)))
    }

    fn remote_calls(actions: &[Action]) -> Vec<RemoteCall> {
        actions
            .iter()
            .filter_map(|a| match a {
                Action::Remote(call) => Some(call.clone()),
                _ => None,
            })
            .collect()
    }

    fn only_call(actions: &[Action]) -> RemoteCall {
        let calls = remote_calls(actions);
        assert_eq!(calls.len(), 1, "expected one remote call in {actions:?}");
        calls[0].clone()
    }

    fn reply(call: &RemoteCall, outcome: std::result::Result<RemoteData, Failure>) -> Event {
        Event::Remote(RemoteReply {
            ticket: call.ticket,
            request: call.request.clone(),
            outcome,
        })
    }

    fn course_page(names: &[&str], total_pages: u32) -> RemoteData {
        RemoteData::Courses(CoursePage {
            courses: names
                .iter()
                .enumerate()
                .map(|(i, name)| Course {
                    id: format!("c{i}"),
                    name: (*name).to_string(),
                })
                .collect(),
            total_courses: names.len() as u64,
            total_pages,
        })
    }

    fn post(id: &str) -> Post {
        Post {
            id: id.into(),
            title: "Study group".into(),
            content: "Thursday?".into(),
            author: "Ada".into(),
            anonymous: false,
            visibility: "Public".into(),
            created_at: None,
            upvotes: 0,
            downvotes: 0,
            comments: vec![],
        }
    }

    fn credentials(role: Role) -> Credentials {
        Credentials {
            login_username: "ada@example.edu".into(),
            password: "Analytical1".into(),
            role,
        }
    }

    #[test]
    fn superseded_list_reply_is_discarded() {
        let mut state = signed_in(&[Role::User]);
        let (_, first) = handle_event(&mut state, &Event::Navigate("/courses".into())).unwrap();
        let x = only_call(&first);

        state.courses.query.search = "y".into();
        let (_, second) = handle_event(&mut state, &Event::Reload(ListKind::Courses)).unwrap();
        let y = only_call(&second);

        handle_event(&mut state, &reply(&y, Ok(course_page(&["Yacht design"], 1)))).unwrap();
        let (changed, actions) =
            handle_event(&mut state, &reply(&x, Ok(course_page(&["Xylophone"], 1)))).unwrap();

        assert!(!changed);
        assert!(actions.is_empty());
        assert_eq!(state.courses.items[0].name, "Yacht design");
        assert_eq!(state.courses.status, RequestStatus::Fulfilled);
    }

    #[test]
    fn reply_after_logout_is_discarded() {
        let mut state = signed_in(&[Role::User]);
        let (_, actions) = handle_event(&mut state, &Event::LoadPosts).unwrap();
        let call = only_call(&actions);

        let (_, logout) = handle_event(&mut state, &Event::Logout).unwrap();
        assert!(logout.contains(&Action::ClearStoredSession));
        assert_eq!(state.route, Some(Route::Login));

        let (changed, _) =
            handle_event(&mut state, &reply(&call, Ok(RemoteData::Posts(vec![post("p1")])))).unwrap();
        assert!(!changed);
        assert!(state.posts.value.is_none());
    }

    #[test]
    fn logout_twice_ends_in_same_state() {
        let mut state = signed_in(&[Role::User]);
        handle_event(&mut state, &Event::Logout).unwrap();
        let epoch = state.session.epoch();
        let (_, actions) = handle_event(&mut state, &Event::Logout).unwrap();

        assert_eq!(state.session.epoch(), epoch);
        assert!(!state.session.is_authenticated());
        assert_eq!(
            actions,
            vec![Action::ClearStoredSession, Action::Redirect(Route::Login)]
        );
    }

    #[test]
    fn login_persists_session_and_goes_home() {
        let mut state = AppState::new(&Config::default());
        let (_, actions) = handle_event(&mut state, &Event::Login(credentials(Role::User))).unwrap();
        let call = only_call(&actions);

        let grant = LoginGrant {
            token: "fresh".into(),
            user: profile(&[Role::User]),
        };
        let (_, actions) =
            handle_event(&mut state, &reply(&call, Ok(RemoteData::LoggedIn(grant)))).unwrap();

        assert_eq!(state.session.token(), Some("fresh"));
        assert!(matches!(actions[0], Action::PersistSession(ref s) if s.token == "fresh"));
        assert_eq!(actions.last(), Some(&Action::Redirect(Route::Home)));
        let requests: Vec<_> = remote_calls(&actions).into_iter().map(|c| c.request).collect();
        assert_eq!(requests, vec![RemoteRequest::FetchIdentity, RemoteRequest::ListPosts]);

        let notes = state.drain_notifications();
        assert_eq!(notes[0].message, "Login successful!");
    }

    #[test]
    fn admin_login_without_admin_role_is_refused() {
        let mut state = AppState::new(&Config::default());
        let (_, actions) = handle_event(&mut state, &Event::Login(credentials(Role::Admin))).unwrap();
        let call = only_call(&actions);

        let grant = LoginGrant {
            token: "tok".into(),
            user: profile(&[Role::User]),
        };
        let (_, actions) =
            handle_event(&mut state, &reply(&call, Ok(RemoteData::LoggedIn(grant)))).unwrap();

        assert!(actions.is_empty());
        assert!(!state.session.is_authenticated());
        assert_eq!(state.session_error(), Some(ADMIN_REQUIRED));
        assert_eq!(state.drain_notifications()[0].level, NotificationLevel::Error);
    }

    #[test]
    fn blank_login_is_rejected_locally() {
        let mut state = AppState::new(&Config::default());
        let mut creds = credentials(Role::User);
        creds.password.clear();

        let (changed, actions) = handle_event(&mut state, &Event::Login(creds)).unwrap();
        assert!(changed);
        assert!(actions.is_empty());
        assert_eq!(
            state.form_error.as_ref().and_then(|e| e.field.as_deref()),
            Some("password")
        );
    }

    #[test]
    fn unauthorized_reply_expires_session() {
        let mut state = signed_in(&[Role::User]);
        let (_, actions) = handle_event(&mut state, &Event::LoadPosts).unwrap();
        let call = only_call(&actions);

        let failure = Failure::new(FailureKind::Unauthorized, "jwt expired");
        let (_, actions) = handle_event(&mut state, &reply(&call, Err(failure))).unwrap();

        assert!(!state.session.is_authenticated());
        assert!(actions.contains(&Action::ClearStoredSession));
        assert_eq!(actions.last(), Some(&Action::Redirect(Route::Login)));
        assert_eq!(state.drain_notifications()[0].message, SESSION_EXPIRED);
    }

    #[test]
    fn unauthorized_identity_refresh_keeps_token() {
        let mut state = signed_in(&[Role::User]);
        let (_, actions) = handle_event(&mut state, &Event::RefreshIdentity).unwrap();
        let call = only_call(&actions);

        let failure = Failure::new(FailureKind::Unauthorized, "bad token");
        handle_event(&mut state, &reply(&call, Err(failure))).unwrap();

        assert!(state.session.is_authenticated());
        assert_eq!(state.session_error(), Some("bad token"));
    }

    #[test]
    fn refresh_without_token_does_nothing() {
        let mut state = AppState::new(&Config::default());
        let (changed, actions) = handle_event(&mut state, &Event::RefreshIdentity).unwrap();
        assert!(!changed);
        assert!(actions.is_empty());
    }

    #[test]
    fn missing_comments_become_empty_list() {
        let mut state = signed_in(&[Role::User]);
        let (_, actions) = handle_event(&mut state, &Event::Navigate("/posts/p1".into())).unwrap();
        let calls = remote_calls(&actions);
        assert_eq!(calls.len(), 2);
        let comments_call = calls
            .iter()
            .find(|c| c.ticket.slot == SlotId::Comments)
            .unwrap();

        let failure = Failure::new(FailureKind::NotFound, "no comments");
        handle_event(&mut state, &reply(comments_call, Err(failure))).unwrap();

        assert_eq!(state.comments.value, Some(Vec::<Comment>::new()));
        assert_eq!(state.comments.error, None);
    }

    #[test]
    fn debounced_search_commits_once_and_resets_page() {
        let mut state = signed_in(&[Role::User]);
        state.courses.query.page = 3;
        state.courses.total_pages = 5;
        let start = Instant::now();

        let mut deadline = start;
        for (offset, text) in [(0, "a"), (100, "ab"), (200, "abc"), (600, "abcd")] {
            let at = start + Duration::from_millis(offset);
            let event = Event::SearchInput {
                list: ListKind::Courses,
                text: text.into(),
                at,
            };
            let (_, actions) = handle_event(&mut state, &event).unwrap();
            match actions.as_slice() {
                [Action::ScheduleSearch { deadline: d, .. }] => deadline = *d,
                other => panic!("unexpected actions {other:?}"),
            }
        }
        assert_eq!(deadline, start + Duration::from_millis(1100));

        let early = Event::SearchDeadline {
            list: ListKind::Courses,
            at: start + Duration::from_millis(700),
        };
        assert_eq!(handle_event(&mut state, &early).unwrap(), (false, vec![]));

        let due = Event::SearchDeadline {
            list: ListKind::Courses,
            at: deadline,
        };
        let (_, actions) = handle_event(&mut state, &due).unwrap();
        let call = only_call(&actions);
        assert_eq!(
            call.request,
            RemoteRequest::ListCourses(ListQuery {
                page: 1,
                limit: 9,
                search: "abcd".into()
            })
        );

        let again = Event::SearchDeadline {
            list: ListKind::Courses,
            at: deadline + Duration::from_millis(10),
        };
        assert_eq!(handle_event(&mut state, &again).unwrap(), (false, vec![]));
    }

    #[test]
    fn shrunken_page_range_refetches_last_page() {
        let mut state = signed_in(&[Role::User]);
        state.courses.query.page = 5;
        let (_, actions) = handle_event(&mut state, &Event::Reload(ListKind::Courses)).unwrap();
        let call = only_call(&actions);

        let (_, actions) = handle_event(&mut state, &reply(&call, Ok(course_page(&[], 3)))).unwrap();

        assert_eq!(state.courses.query.page, 3);
        assert!(state.courses.is_pending());
        assert_eq!(
            only_call(&actions).request,
            RemoteRequest::ListCourses(ListQuery {
                page: 3,
                limit: 9,
                search: String::new()
            })
        );
    }

    #[test]
    fn trailing_space_does_not_refetch_same_term() {
        let mut state = signed_in(&[Role::User]);
        let start = Instant::now();
        let commit = |state: &mut AppState, text: &str, offset: u64| {
            let input = Event::SearchInput {
                list: ListKind::Courses,
                text: text.into(),
                at: start + Duration::from_millis(offset),
            };
            handle_event(state, &input).unwrap();
            let due = Event::SearchDeadline {
                list: ListKind::Courses,
                at: start + Duration::from_millis(offset + 500),
            };
            handle_event(state, &due).unwrap()
        };

        let (_, actions) = commit(&mut state, "alg", 0);
        assert_eq!(remote_calls(&actions).len(), 1);
        assert_eq!(state.courses.query.search, "alg");

        assert_eq!(commit(&mut state, "alg ", 1000), (false, vec![]));
    }

    #[test]
    fn token_without_identity_stays_on_login() {
        let mut state =
            AppState::with_session(&Config::default(), Session::restored("tok".into(), None));

        let (_, actions) = handle_event(&mut state, &Event::Navigate("/login".into())).unwrap();
        assert_eq!(state.route, Some(Route::Login));
        assert!(actions.is_empty());

        let (_, actions) = handle_event(&mut state, &Event::Navigate("/home".into())).unwrap();
        assert_eq!(state.route, Some(Route::Login));
        assert_eq!(actions, vec![Action::Redirect(Route::Login)]);
    }

    #[test]
    fn page_changes_stay_in_range() {
        let mut state = signed_in(&[Role::User]);
        let (_, actions) = handle_event(&mut state, &Event::Reload(ListKind::Courses)).unwrap();
        let call = only_call(&actions);
        handle_event(&mut state, &reply(&call, Ok(course_page(&["A"], 2)))).unwrap();

        let (changed, actions) =
            handle_event(&mut state, &Event::PreviousPage(ListKind::Courses)).unwrap();
        assert!(!changed);
        assert!(actions.is_empty());

        let (_, actions) = handle_event(&mut state, &Event::NextPage(ListKind::Courses)).unwrap();
        assert_eq!(only_call(&actions).ticket.slot, SlotId::Courses);
        assert_eq!(state.courses.query.page, 2);

        let beyond = Event::ChangePage {
            list: ListKind::Courses,
            page: 3,
        };
        assert_eq!(handle_event(&mut state, &beyond).unwrap(), (false, vec![]));
    }

    #[test]
    fn concurrent_votes_both_count() {
        let mut state = signed_in(&[Role::User]);
        state.posts.fulfill(vec![post("p1"), post("p2")]);

        let up = |id: &str| Event::VotePost {
            post_id: id.into(),
            vote: Vote::Up,
        };
        let (_, a) = handle_event(&mut state, &up("p1")).unwrap();
        let (_, b) = handle_event(&mut state, &up("p2")).unwrap();
        handle_event(&mut state, &reply(&only_call(&a), Ok(RemoteData::Voted))).unwrap();
        handle_event(&mut state, &reply(&only_call(&b), Ok(RemoteData::Voted))).unwrap();

        let posts = state.posts.value.as_ref().unwrap();
        assert_eq!(posts[0].upvotes, 1);
        assert_eq!(posts[1].upvotes, 1);
    }

    #[test]
    fn failed_downvote_names_the_vote() {
        let mut state = signed_in(&[Role::User]);
        let event = Event::VotePost {
            post_id: "p1".into(),
            vote: Vote::Down,
        };
        let (_, actions) = handle_event(&mut state, &event).unwrap();
        let failure = Failure::new(FailureKind::Network, "status 500");
        handle_event(&mut state, &reply(&only_call(&actions), Err(failure))).unwrap();

        assert_eq!(state.drain_notifications()[0].message, "Failed to downvote post");
    }

    #[test]
    fn created_post_refetches_list() {
        let mut state = signed_in(&[Role::User]);
        let draft = PostDraft {
            title: "Hello".into(),
            content: "World".into(),
            anonymous: true,
        };
        let (_, actions) = handle_event(&mut state, &Event::SubmitPost(draft)).unwrap();
        let (_, actions) = handle_event(
            &mut state,
            &reply(&only_call(&actions), Ok(RemoteData::PostCreated(Some(post("p9"))))),
        )
        .unwrap();

        assert_eq!(only_call(&actions).request, RemoteRequest::ListPosts);
        assert_eq!(state.drain_notifications()[0].message, "Post created successfully!");
    }

    #[test]
    fn posted_comment_refetches_comments() {
        let mut state = signed_in(&[Role::User]);
        let draft = CommentDraft {
            post_id: "p1".into(),
            text: "Count me in".into(),
            anonymous: false,
        };
        let (_, actions) = handle_event(&mut state, &Event::SubmitComment(draft)).unwrap();
        let (_, actions) = handle_event(
            &mut state,
            &reply(&only_call(&actions), Ok(RemoteData::CommentPosted)),
        )
        .unwrap();

        assert_eq!(
            only_call(&actions).request,
            RemoteRequest::ListComments {
                post_id: "p1".into()
            }
        );
    }

    #[test]
    fn non_admin_is_kept_off_teacher_form() {
        let mut state = signed_in(&[Role::User]);
        let (_, actions) =
            handle_event(&mut state, &Event::Navigate("/teachers/new".into())).unwrap();
        assert_eq!(state.route, Some(Route::Unauthorized));
        assert_eq!(actions, vec![Action::Redirect(Route::Unauthorized)]);
    }

    #[test]
    fn saved_teacher_returns_to_directory() {
        let mut state = signed_in(&[Role::Admin]);
        let draft = TeacherDraft {
            name: "Grace Hopper".into(),
            title: "Professor".into(),
            email: "grace@example.edu".into(),
            courses_taught: "Compilers, COBOL".into(),
            ..TeacherDraft::default()
        };
        let event = Event::SaveTeacher {
            id: Some("t1".into()),
            draft,
        };
        let (_, actions) = handle_event(&mut state, &event).unwrap();
        let call = only_call(&actions);
        assert!(matches!(call.request, RemoteRequest::UpdateTeacher { ref id, .. } if id == "t1"));

        let (_, actions) =
            handle_event(&mut state, &reply(&call, Ok(RemoteData::TeacherSaved))).unwrap();
        assert_eq!(state.route, Some(Route::Teachers));
        assert_eq!(actions.last(), Some(&Action::Redirect(Route::Teachers)));
    }

    #[test]
    fn unknown_path_notifies() {
        let mut state = signed_in(&[Role::User]);
        let (_, actions) = handle_event(&mut state, &Event::Navigate("/nowhere".into())).unwrap();
        assert!(actions.is_empty());
        assert!(state.drain_notifications()[0].is_error());
    }
}

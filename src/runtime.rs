//! Async driver around the reducer.
//!
//! [`Portal`] owns the [`AppState`] and executes the [`Action`]s that
//! [`handle_event`] returns: remote calls run on spawned Tokio tasks, debounce
//! timers sleep until their deadline, and the durable session copy is written
//! through the [`CredentialStore`]. Every completion is fed back into the
//! reducer as an [`Event`] by [`Portal::next`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use campus_portal::storage::MemoryCredentialStore;
//! use campus_portal::remote::HttpBackend;
//! use campus_portal::{Config, Event, Portal};
//!
//! # async fn demo() -> campus_portal::Result<()> {
//! let config = Config::default();
//! let backend = HttpBackend::new(&config.base_url, config.request_timeout())?;
//! let mut portal = Portal::new(&config, Arc::new(backend), Box::new(MemoryCredentialStore::new()));
//!
//! portal.dispatch(Event::Navigate("/login".into()))?;
//! portal.settle().await?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::app::{handle_event, Action, AppState, Event, ListKind, Notification};
use crate::domain::{Result, Session};
use crate::remote::{self, Backend, RemoteCall, RemoteReply};
use crate::storage::CredentialStore;
use crate::Config;

/// Something a spawned task finished.
#[derive(Debug)]
enum Completion {
    Reply(RemoteReply),
    Timer {
        list: ListKind,
        generation: u64,
        at: Instant,
    },
}

#[derive(Debug)]
struct Timer {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Client runtime: state, backend and credential store in one place.
pub struct Portal {
    state: AppState,
    backend: Arc<dyn Backend>,
    store: Box<dyn CredentialStore>,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    timers: HashMap<ListKind, Timer>,
    timer_generation: u64,
    in_flight: usize,
}

impl Portal {
    /// Builds the runtime with the session seeded from `store`.
    ///
    /// A store that cannot be read is treated as empty. Call [`Portal::start`]
    /// from inside a Tokio runtime to re-validate a restored session.
    pub fn new(config: &Config, backend: Arc<dyn Backend>, store: Box<dyn CredentialStore>) -> Self {
        let session = match store.load() {
            Ok(Some(stored)) => {
                tracing::debug!(has_user = stored.user.is_some(), "restoring stored session");
                Session::restored(stored.token, stored.user.map(|user| user.to_identity()))
            }
            Ok(None) => Session::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read stored session, starting signed out");
                Session::new()
            }
        };

        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: AppState::with_session(config, session),
            backend,
            store,
            tx,
            rx,
            timers: HashMap::new(),
            timer_generation: 0,
            in_flight: 0,
        }
    }

    /// Refreshes the identity of a restored session.
    ///
    /// # Errors
    ///
    /// Propagates reducer errors.
    pub fn start(&mut self) -> Result<()> {
        if self.state.session.is_authenticated() {
            self.dispatch(Event::RefreshIdentity)?;
        }
        Ok(())
    }

    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    #[must_use]
    pub fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.state.drain_notifications()
    }

    /// True when no remote call or search timer is outstanding.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.in_flight == 0 && self.timers.is_empty()
    }

    /// Runs `event` through the reducer and executes the resulting actions.
    ///
    /// Returns whether the state changed.
    ///
    /// # Errors
    ///
    /// Propagates reducer errors. Store failures are logged, not returned.
    pub fn dispatch(&mut self, event: Event) -> Result<bool> {
        let (changed, actions) = handle_event(&mut self.state, &event)?;
        for action in actions {
            self.execute(action);
        }
        Ok(changed)
    }

    /// Waits for the next completion and dispatches it.
    ///
    /// Returns `None` once nothing is outstanding.
    pub async fn next(&mut self) -> Option<Result<bool>> {
        if self.is_idle() {
            return None;
        }
        let completion = self.rx.recv().await?;
        let event = match completion {
            Completion::Reply(reply) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Event::Remote(reply)
            }
            Completion::Timer {
                list,
                generation,
                at,
            } => {
                if self
                    .timers
                    .get(&list)
                    .is_some_and(|timer| timer.generation == generation)
                {
                    self.timers.remove(&list);
                }
                Event::SearchDeadline { list, at }
            }
        };
        Some(self.dispatch(event))
    }

    /// Dispatches completions until nothing is outstanding.
    ///
    /// # Errors
    ///
    /// Stops at the first reducer error.
    pub async fn settle(&mut self) -> Result<()> {
        while let Some(result) = self.next().await {
            result?;
        }
        Ok(())
    }

    fn execute(&mut self, action: Action) {
        match action {
            Action::Remote(call) => self.spawn_remote(call),
            Action::PersistSession(record) => {
                tracing::debug!("persisting session");
                if let Err(e) = self.store.save(&record) {
                    tracing::warn!(error = %e, "failed to persist session");
                }
            }
            Action::ClearStoredSession => {
                tracing::debug!("clearing stored session");
                if let Err(e) = self.store.clear() {
                    tracing::warn!(error = %e, "failed to clear stored session");
                }
            }
            Action::ScheduleSearch { list, deadline } => self.arm_timer(list, deadline),
            Action::Redirect(route) => {
                tracing::debug!(route = %route, "redirected");
            }
        }
    }

    fn spawn_remote(&mut self, call: RemoteCall) {
        let backend = Arc::clone(&self.backend);
        let token = self.state.session.token().map(ToOwned::to_owned);
        let tx = self.tx.clone();
        self.in_flight += 1;

        tokio::spawn(async move {
            let reply = remote::execute(backend.as_ref(), token, call).await;
            if tx.send(Completion::Reply(reply)).is_err() {
                tracing::debug!("portal dropped before reply arrived");
            }
        });
    }

    fn arm_timer(&mut self, list: ListKind, deadline: Instant) {
        self.timer_generation += 1;
        let generation = self.timer_generation;
        let tx = self.tx.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let _ = tx.send(Completion::Timer {
                list,
                generation,
                at: Instant::now(),
            });
        });

        if let Some(previous) = self.timers.insert(list, Timer { generation, handle }) {
            previous.handle.abort();
        }
    }
}

impl Drop for Portal {
    fn drop(&mut self) {
        for timer in self.timers.values() {
            timer.handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::NotificationLevel;
    use crate::domain::{
        CoursePage, Course, Credentials, LoginGrant, PortalError, Role, UserProfile,
    };
    use crate::remote::backend::MockBackend;
    use crate::routing::Route;
    use crate::storage::{MemoryCredentialStore, StoredSession};
    use std::collections::BTreeSet;
    use std::time::Duration;

    fn profile(roles: &[Role]) -> UserProfile {
        UserProfile {
            id: "u1".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@uni.edu".into(),
            erp: Some(12345),
            roles: roles.iter().cloned().collect::<BTreeSet<_>>(),
            profile_picture: None,
        }
    }

    fn signed_in_store() -> Box<MemoryCredentialStore> {
        Box::new(MemoryCredentialStore::seeded(StoredSession::new(
            "tok",
            Some(profile(&[Role::User])),
        )))
    }

    fn page(names: &[&str]) -> CoursePage {
        CoursePage {
            courses: names
                .iter()
                .enumerate()
                .map(|(i, name)| Course {
                    id: format!("c{i}"),
                    name: (*name).into(),
                })
                .collect(),
            total_courses: names.len() as u64,
            total_pages: 1,
        }
    }

    #[tokio::test]
    async fn restored_session_refreshes_identity() {
        let mut backend = MockBackend::new();
        backend
            .expect_fetch_identity()
            .withf(|token| token == "tok")
            .times(1)
            .returning(|_| Ok(profile(&[Role::User, Role::Admin])));

        let mut portal = Portal::new(&Config::default(), Arc::new(backend), signed_in_store());
        assert_eq!(
            portal.state().identity().map(|i| i.display_name.as_str()),
            Some("Ada Lovelace")
        );

        portal.start().unwrap();
        portal.settle().await.unwrap();

        let identity = portal.state().identity().unwrap();
        assert!(identity.has_role(&Role::Admin));
        assert!(portal.is_idle());
    }

    #[tokio::test]
    async fn signed_out_start_does_nothing() {
        let backend = MockBackend::new();
        let mut portal = Portal::new(
            &Config::default(),
            Arc::new(backend),
            Box::new(MemoryCredentialStore::new()),
        );
        portal.start().unwrap();
        assert!(portal.is_idle());
        assert!(portal.next().await.is_none());
    }

    #[tokio::test]
    async fn login_persists_session() {
        let mut backend = MockBackend::new();
        backend.expect_login().times(1).returning(|_| {
            Ok(LoginGrant {
                token: "fresh".into(),
                user: profile(&[Role::User]),
            })
        });
        backend
            .expect_fetch_identity()
            .returning(|_| Ok(profile(&[Role::User])));
        backend.expect_list_posts().returning(|_| Ok(vec![]));

        let mut portal = Portal::new(
            &Config::default(),
            Arc::new(backend),
            Box::new(MemoryCredentialStore::new()),
        );
        portal
            .dispatch(Event::Login(Credentials {
                login_username: "ada@uni.edu".into(),
                password: "correct horse".into(),
                role: Role::User,
            }))
            .unwrap();
        portal.settle().await.unwrap();

        let stored = portal.store().load().unwrap().unwrap();
        assert_eq!(stored.token, "fresh");
        assert_eq!(portal.state().route, Some(Route::Home));

        let notifications = portal.drain_notifications();
        assert!(notifications
            .iter()
            .any(|n| n.level == NotificationLevel::Success && n.message == "Login successful!"));
    }

    #[tokio::test]
    async fn expired_token_clears_store() {
        let mut backend = MockBackend::new();
        backend
            .expect_list_posts()
            .returning(|_| Err(PortalError::Unauthorized("jwt expired".into())));

        let mut portal = Portal::new(&Config::default(), Arc::new(backend), signed_in_store());
        portal.dispatch(Event::Navigate("/posts".into())).unwrap();
        portal.settle().await.unwrap();

        assert!(!portal.state().session.is_authenticated());
        assert!(portal.store().load().unwrap().is_none());
        assert_eq!(portal.state().route, Some(Route::Login));
    }

    #[tokio::test(start_paused = true)]
    async fn typing_burst_fetches_once() {
        let mut backend = MockBackend::new();
        backend
            .expect_list_courses()
            .withf(|_, query| query.search.is_empty())
            .times(1)
            .returning(|_, _| Ok(page(&["Algorithms", "Compilers"])));
        backend
            .expect_list_courses()
            .withf(|_, query| query.search == "abcd" && query.page == 1)
            .times(1)
            .returning(|_, _| Ok(page(&["abcd"])));

        let mut portal = Portal::new(&Config::default(), Arc::new(backend), signed_in_store());
        portal.dispatch(Event::Navigate("/courses".into())).unwrap();

        for text in ["a", "ab", "abc", "abcd"] {
            portal
                .dispatch(Event::SearchInput {
                    list: ListKind::Courses,
                    text: text.into(),
                    at: Instant::now(),
                })
                .unwrap();
            tokio::time::advance(Duration::from_millis(100)).await;
        }
        portal.settle().await.unwrap();

        let courses = &portal.state().courses;
        assert_eq!(courses.query.search, "abcd");
        assert_eq!(courses.items.len(), 1);
        assert_eq!(courses.items[0].name, "abcd");
    }
}

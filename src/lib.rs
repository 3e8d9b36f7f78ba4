//! Campus portal: client-side coordinator for an academic community backend.
//!
//! The crate holds everything a front-end for the course, teacher and
//! discussion backend needs short of drawing pixels:
//! - A session store seeded from durable storage, with role-aware login
//! - Remote collection fetching where late replies never overwrite newer ones
//! - Debounced search and a compressed pagination bar for paged lists
//! - A route gate that sends guests to login and non-admins to `/unauthorized`

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! The crate follows a layered architecture pattern:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Front-end (main.rs CLI, or any embedding UI)       │  ← Intents
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Runtime (runtime.rs)                               │  ← Executes actions
//! │  - Spawns remote calls, arms debounce timers        │
//! │  - Persists the session                             │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │  ← Pure reducer
//! │  - Event handling, slot sequencing                  │
//! │  - View model computation                           │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ Remote        │   │ Storage       │   │ Routing / UI  │
//! │ (remote/)     │   │ (storage/)    │   │ (routing/,    │
//! │ - Backend port│   │ - JSON file   │   │  ui/)         │
//! │ - reqwest     │   │ - Atomic write│   │ - Gate        │
//! │ - Wire DTOs   │   │               │   │ - Pagination  │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!         │                    │                    │
//! ┌─────────────────────────────────────────────────────┐
//! │  Infrastructure & Domain Layers                     │
//! │  - Data directory (infrastructure/)                 │
//! │  - Error types, session, records (domain/)          │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │  ← Optional
//! │  - OpenTelemetry tracing, file-based OTLP export    │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`app`]: Application state machine with event/action model
//! - [`domain`]: Core domain types (session, courses, teachers, posts, errors)
//! - [`infrastructure`]: Data directory resolution
//! - [`remote`]: Backend port, HTTP adapter and wire types
//! - [`routing`]: Routes and the authorization gate
//! - [`runtime`]: Async driver executing actions
//! - [`storage`]: Durable credential store
//! - [`ui`]: Pagination, list view models and text rendering
//! - `observability`: OpenTelemetry tracing
//!
//! # Configuration
//!
//! Read from a TOML file, a string map, or `CAMPUS_PORTAL_*` environment
//! variables:
//!
//! ```toml
//! base_url = "http://localhost:3001/api"
//! page_limit_courses = 9
//! page_limit_teachers = 10
//! debounce_ms = 500
//! request_timeout_secs = 30
//! trace_level = "info"
//! ```
//!
//! # Example
//!
//! ```rust
//! use campus_portal::{handle_event, AppState, Config, Event};
//!
//! let mut state = AppState::new(&Config::default());
//! let (_, actions) = handle_event(&mut state, &Event::Navigate("/courses".into()))?;
//!
//! // A guest is sent to the login page instead.
//! assert_eq!(state.route, Some(campus_portal::routing::Route::Login));
//! # let _ = actions;
//! # Ok::<(), campus_portal::PortalError>(())
//! ```
//!
//! # Key Design Decisions
//!
//! ## Tickets instead of cancellation
//!
//! HTTP requests are never aborted. Every request carries the sequence number
//! of its slot and the session epoch it was issued under; the reducer applies a
//! reply only when both are still current.
//!
//! ## Pure reducer
//!
//! `handle_event` never performs I/O or reads the clock. Time enters through
//! event payloads, which keeps debounce behaviour testable with a paused clock.

pub mod app;
pub mod domain;
pub mod infrastructure;
pub mod remote;
pub mod routing;
pub mod runtime;
pub mod storage;

pub mod ui;

pub mod observability;

pub use app::{handle_event, Action, AppState, Event, ListKind, Notification};
pub use domain::{PortalError, Result};
pub use runtime::Portal;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:3001/api";

/// Client configuration.
///
/// Every field has a default, so a TOML file or map only needs the keys it
/// wants to change.
///
/// # Example
///
/// ```toml
/// base_url = "https://portal.example.edu/api"
/// page_limit_courses = 12
/// data_dir = "~/.portal"
/// trace_level = "debug"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the REST API; endpoint paths are joined onto it.
    pub base_url: String,

    /// Courses per page. Default: 9
    pub page_limit_courses: u32,

    /// Teachers per page. Default: 10
    pub page_limit_teachers: u32,

    /// Quiet period before a typed search term is committed. Default: 500
    pub debounce_ms: u64,

    /// Per-request timeout. Default: 30
    pub request_timeout_secs: u64,

    /// Where `session.json` and the trace file live. `~` is expanded.
    /// Default: see [`infrastructure::paths`].
    pub data_dir: Option<String>,

    /// Tracing filter, e.g. `info` or `campus_portal=debug`.
    ///
    /// `RUST_LOG` takes precedence when set. Default: `"info"`
    pub trace_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_limit_courses: 9,
            page_limit_teachers: 10,
            debounce_ms: app::debounce::DEFAULT_QUIET_PERIOD.as_millis() as u64,
            request_timeout_secs: 30,
            data_dir: None,
            trace_level: None,
        }
    }
}

impl Config {
    /// Parses configuration from a string map.
    ///
    /// Unknown keys are ignored and unparseable numbers fall back to the
    /// current value, like the defaults.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use campus_portal::Config;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("page_limit_courses".to_string(), "12".to_string());
    /// map.insert("debounce_ms".to_string(), "soon".to_string());
    ///
    /// let config = Config::from_map(&map);
    /// assert_eq!(config.page_limit_courses, 12);
    /// assert_eq!(config.debounce_ms, 500);
    /// ```
    #[must_use]
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        Self::default().merged_with(map)
    }

    /// Returns a copy with the keys present in `map` overriding this config.
    #[must_use]
    pub fn merged_with(mut self, map: &BTreeMap<String, String>) -> Self {
        fn parsed<T: std::str::FromStr>(map: &BTreeMap<String, String>, key: &str) -> Option<T> {
            map.get(key).and_then(|value| value.trim().parse().ok())
        }
        let text = |key: &str| {
            map.get(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(base_url) = text("base_url") {
            self.base_url = base_url;
        }
        if let Some(limit) = parsed::<u32>(map, "page_limit_courses").filter(|l| *l > 0) {
            self.page_limit_courses = limit;
        }
        if let Some(limit) = parsed::<u32>(map, "page_limit_teachers").filter(|l| *l > 0) {
            self.page_limit_teachers = limit;
        }
        if let Some(ms) = parsed(map, "debounce_ms") {
            self.debounce_ms = ms;
        }
        if let Some(secs) = parsed(map, "request_timeout_secs") {
            self.request_timeout_secs = secs;
        }
        if let Some(dir) = text("data_dir") {
            self.data_dir = Some(dir);
        }
        if let Some(level) = text("trace_level") {
            self.trace_level = Some(level);
        }
        self
    }

    /// Applies `CAMPUS_PORTAL_<KEY>` variables, e.g. `CAMPUS_PORTAL_BASE_URL`.
    #[must_use]
    pub fn with_env_overrides<I>(self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let map: BTreeMap<String, String> = vars
            .into_iter()
            .filter_map(|(key, value)| {
                key.strip_prefix("CAMPUS_PORTAL_")
                    .map(|suffix| (suffix.to_ascii_lowercase(), value))
            })
            .collect();
        self.merged_with(&map)
    }

    /// # Errors
    ///
    /// Returns [`PortalError::Config`] when the TOML does not parse.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| PortalError::Config(format!("invalid config: {e}")))
    }

    /// # Errors
    ///
    /// Returns an error when the file cannot be read or does not parse.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            PortalError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&contents)
    }

    #[must_use]
    pub const fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Data directory with `~` expanded, or the platform default.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.as_deref().map_or_else(infrastructure::get_data_dir, |dir| {
            PathBuf::from(infrastructure::expand_tilde(dir))
        })
    }
}

/// Builds a [`Portal`] talking HTTP to `config.base_url` with the session kept
/// in the data directory.
///
/// The stored session, if any, is restored and an identity refresh is queued.
///
/// # Errors
///
/// Returns an error when the base URL is invalid or the data directory cannot
/// be created.
pub fn initialize(config: &Config) -> Result<Portal> {
    tracing::debug!(base_url = %config.base_url, "initializing campus portal");

    let backend = remote::HttpBackend::new(&config.base_url, config.request_timeout())?;
    let store = storage::JsonCredentialStore::new(infrastructure::session_file(&config.data_dir()))?;
    Ok(Portal::new(config, Arc::new(backend), Box::new(store)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.base_url, "http://localhost:3001/api");
        assert_eq!(config.page_limit_courses, 9);
        assert_eq!(config.page_limit_teachers, 10);
        assert_eq!(config.search_debounce(), Duration::from_millis(500));
    }

    #[test]
    fn toml_overrides_only_given_keys() {
        let config = Config::from_toml_str(
            r#"
            base_url = "https://portal.example.edu/api"
            page_limit_teachers = 20
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url, "https://portal.example.edu/api");
        assert_eq!(config.page_limit_teachers, 20);
        assert_eq!(config.page_limit_courses, 9);
    }

    #[test]
    fn bad_toml_is_a_config_error() {
        let err = Config::from_toml_str("page_limit_courses = \"many\"").unwrap_err();
        assert!(matches!(err, PortalError::Config(_)));
    }

    #[test]
    fn zero_page_limit_is_ignored() {
        let map = BTreeMap::from([("page_limit_courses".to_string(), "0".to_string())]);
        assert_eq!(Config::from_map(&map).page_limit_courses, 9);
    }

    #[test]
    fn env_overrides_use_prefix() {
        let config = Config::default().with_env_overrides([
            ("CAMPUS_PORTAL_BASE_URL".to_string(), "http://api.test/".to_string()),
            ("CAMPUS_PORTAL_DEBOUNCE_MS".to_string(), "250".to_string()),
            ("HOME".to_string(), "/home/ada".to_string()),
        ]);
        assert_eq!(config.base_url, "http://api.test/");
        assert_eq!(config.debounce_ms, 250);
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portal.toml");
        std::fs::write(&path, "trace_level = \"debug\"\n").unwrap();
        assert_eq!(
            Config::from_file(&path).unwrap().trace_level.as_deref(),
            Some("debug")
        );
    }

    #[test]
    fn explicit_data_dir_wins() {
        let config = Config {
            data_dir: Some("/srv/portal".into()),
            ..Config::default()
        };
        assert_eq!(config.data_dir(), PathBuf::from("/srv/portal"));
    }
}

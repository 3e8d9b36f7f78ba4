//! Path utilities for the client's data directory.
//!
//! The data directory holds `session.json` (the durable token and user) and
//! the OTLP trace file. It is chosen, in order, from `CAMPUS_PORTAL_DATA_DIR`,
//! `$XDG_DATA_HOME/campus-portal`, `$HOME/.local/share/campus-portal`, and
//! finally `.campus-portal` in the working directory.

use std::env;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "campus-portal";

/// Name of the durable session file inside the data directory.
pub const SESSION_FILE: &str = "session.json";

/// Name of the OTLP trace export inside the data directory.
pub const TRACE_FILE: &str = "campus-portal-otlp.json";

/// Returns the data directory for this user, read from the environment.
///
/// # Examples
///
/// ```
/// use campus_portal::infrastructure::get_data_dir;
///
/// let session = campus_portal::infrastructure::session_file(&get_data_dir());
/// assert!(session.ends_with("session.json"));
/// ```
#[must_use]
pub fn get_data_dir() -> PathBuf {
    resolve_data_dir(
        env::var("CAMPUS_PORTAL_DATA_DIR").ok().as_deref(),
        env::var("XDG_DATA_HOME").ok().as_deref(),
        env::var("HOME").ok().as_deref(),
    )
}

/// Picks the data directory from explicit values; blank values count as unset.
fn resolve_data_dir(explicit: Option<&str>, xdg_data_home: Option<&str>, home: Option<&str>) -> PathBuf {
    fn non_blank(value: Option<&str>) -> Option<&str> {
        value.map(str::trim).filter(|v| !v.is_empty())
    }

    if let Some(dir) = non_blank(explicit) {
        return PathBuf::from(expand_tilde_with(dir, non_blank(home)));
    }
    if let Some(xdg) = non_blank(xdg_data_home) {
        return Path::new(xdg).join(APP_DIR);
    }
    if let Some(home) = non_blank(home) {
        return Path::new(home).join(".local").join("share").join(APP_DIR);
    }
    PathBuf::from(format!(".{APP_DIR}"))
}

/// Location of the durable session file under `data_dir`.
#[must_use]
pub fn session_file(data_dir: &Path) -> PathBuf {
    data_dir.join(SESSION_FILE)
}

/// Location of the trace export under `data_dir`.
#[must_use]
pub fn trace_file(data_dir: &Path) -> PathBuf {
    data_dir.join(TRACE_FILE)
}

/// Expands a leading `~` to `$HOME`.
///
/// Paths that do not start with `~`, or any path when `HOME` is unset, are
/// returned unchanged.
#[must_use]
pub fn expand_tilde(path: &str) -> String {
    expand_tilde_with(path, env::var("HOME").ok().as_deref())
}

fn expand_tilde_with(path: &str, home: Option<&str>) -> String {
    match (path, home) {
        ("~", Some(home)) => home.to_string(),
        (path, Some(home)) if path.starts_with("~/") => path.replacen('~', home, 1),
        (path, _) => path.to_string(),
    }
}

//! Presentation layer: view models, pagination and text rendering.
//!
//! Nothing here reads application state directly; `AppState` computes the view
//! models and the front-end hands them to a [`Renderer`].
//!
//! ```text
//! AppState → compute_list_viewmodel → ListViewModel → Renderer::list → text
//! ```
//!
//! # Modules
//!
//! - [`pagination`]: Compressed page-button sequence
//! - [`viewmodel`]: List view models with search highlighting
//! - [`render`]: Text rendering of view models and records
//! - [`theme`]: Color schemes and ANSI escape sequences
//!
//! # Example
//!
//! ```rust
//! use campus_portal::app::{AppState, ListKind};
//! use campus_portal::ui::Renderer;
//! use campus_portal::Config;
//!
//! let state = AppState::new(&Config::default());
//! let text = Renderer::plain().list(&state.compute_list_viewmodel(ListKind::Courses));
//! assert_eq!(text, "Courses");
//! ```

pub mod pagination;
pub mod render;
pub mod theme;
pub mod viewmodel;

pub use pagination::{compute_visible_pages, PageItem, PaginationView};
pub use render::Renderer;
pub use theme::Theme;
pub use viewmodel::{DisplayItem, EmptyState, HeaderInfo, ListViewModel, SearchBarInfo};

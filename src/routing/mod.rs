//! Route parsing and the authorization gate.
//!
//! - `route`: the [`Route`] enum, path parsing and per-route role requirements
//! - `gate`: [`authorize`] and [`navigate`]

pub mod gate;
pub mod route;

pub use gate::{authorize, navigate, AuthorizationDecision, Navigation};
pub use route::Route;

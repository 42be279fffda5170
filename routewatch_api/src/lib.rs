//! Shared routewatch data models consumed by the core library and backend crates.

pub mod diff;
pub mod history;
pub mod repository;

pub use diff::*;
pub use history::*;
pub use repository::*;

//! GitHub API service implementations.

mod activity;
mod repositories;
mod search;

pub use activity::*;
pub use repositories::*;
pub use search::*;

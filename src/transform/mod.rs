//! CDN transformation tasks.
//!
//! | Piece | Role |
//! |---|---|
//! | [`Task`] | closed catalogue of image operations, one variant per task |
//! | [`params`] | typed parameter records with range and enum constraints |
//! | [`TaskSet`] | ordered set of tasks, at most one per kind |
//! | [`TaskEncoder`] / [`CdnEncoder`] | validation and URL serialization |
//!
//! A task that violates a constraint fails with a [`ValidationError`]
//! naming the first offending field. Nothing is applied partially.

mod encoder;
pub mod params;
mod task;
mod validate;

pub use encoder::{CdnEncoder, DEFAULT_HOST, EncodeOptions, TaskEncoder};
pub use task::{TASK_NAMES, Task, TaskSet};
pub use validate::ValidationError;

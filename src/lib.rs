//! Storage layer of a discussion forum: topics, the nodes they live in, and
//! site-wide settings, kept in SQLite.

pub mod clock;
pub mod config;
pub mod db;
pub mod directory;
pub mod editable;
pub mod error;
pub mod models;

pub use config::Config;
pub use db::Repository;
pub use error::{AppError, Result};

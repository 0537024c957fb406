//! House listing search
//!
//! Keeps a Tantivy index of house listings eventually consistent with the
//! house store through asynchronous INDEX/DELETE commands, and serves
//! filtered search and autocomplete over that index.

pub mod api;
pub mod config;
pub mod error;
pub mod indexing;
pub mod messaging;
pub mod models;
pub mod search;
pub mod state;

pub use error::{AppError, Result};

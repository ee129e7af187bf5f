//! Query engine
//!
//! Translates a (content-type, free-text, cursor) triple into one bounded,
//! paginated index query and shapes raw hits into display-ready snippets.

pub mod builder;
pub mod config;
pub mod engine;
pub mod error;
pub mod snippet;

pub use config::QueryConfig;
pub use engine::{SearchEngine, SearchPage, Snippet};
pub use error::{QueryError, QueryResult};

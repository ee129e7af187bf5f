//! Index provider abstraction and the Elasticsearch HTTP client
//!
//! Everything that knows the remote index's URL shapes lives here. The rest of
//! the crate talks to [`IndexProvider`] only.

pub mod config;
pub mod elastic;
pub mod error;
pub mod provider;

pub use config::ElasticConfig;
pub use elastic::ElasticClient;
pub use error::{IndexError, IndexResult};
pub use provider::{ContextToken, IndexProvider};

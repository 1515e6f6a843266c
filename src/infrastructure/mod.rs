//! Infrastructure layer - Remote service clients and pipeline wiring

pub mod completion;
pub mod embedding;
pub mod factory;
pub mod http;
pub mod logging;
pub mod retrieval;
pub mod search_index;

pub use factory::SearchFactory;
pub use http::{HttpClient, HttpClientTrait};
pub use logging::init_logging;

//! Retrieval backend implementations

mod hybrid;
mod lexical;
mod vector;

pub use hybrid::HybridBackend;
pub use lexical::LexicalBackend;
pub use vector::VectorBackend;

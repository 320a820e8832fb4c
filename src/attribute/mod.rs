// Dynamic attribute loading: backend type coercion and column mappings

pub mod backend;
pub mod loader;

pub use backend::*;
pub use loader::*;

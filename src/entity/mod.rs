// Entity representations handed to the persistence layer

pub mod merge;
pub mod prepared;

pub use merge::*;
pub use prepared::*;

pub mod attribute;
pub mod cli;
pub mod config;
pub mod entity;
pub mod keys;
pub mod observer;
pub mod processor;
pub mod row;
pub mod subject;
pub mod types;

#[cfg(test)]
pub mod testing;

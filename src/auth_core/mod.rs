pub mod engine;
pub mod guard;
pub mod memory;
pub mod registry;
pub mod request;
pub mod strategies;
pub mod tokens;
pub mod types;

pub mod compliance;
pub mod config;
pub mod discovery;
pub mod error;
pub mod parse;
pub mod phase;
pub mod pipeline;
pub mod report;
pub mod scenario;
pub mod validate;
pub mod wasm;

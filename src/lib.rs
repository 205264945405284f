pub mod args;
pub mod commands;
mod config;
mod error;
pub mod model;
mod store;
mod summary;
#[cfg(test)]
mod test;
mod utils;

pub use config::Config;
pub use error::Error;
pub use error::Result;
pub use store::Store;
pub use summary::{MeterSummary, Summary, Usage};

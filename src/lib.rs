pub mod assess;
pub mod cleaner;
pub mod error;
pub mod fetch;
pub mod infra;
pub mod loader;
pub mod merger;
pub mod output;
pub mod records;
pub mod report;
pub mod services;

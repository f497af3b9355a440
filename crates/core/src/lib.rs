pub mod analysis;
pub mod config;
pub mod context;
pub mod error;
pub mod extract;
pub mod lifecycle;
pub mod profile;
pub mod provider;
pub mod proxy;
pub mod types;

pub use error::AnalyzeError;

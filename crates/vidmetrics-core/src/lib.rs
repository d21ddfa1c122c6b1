pub mod cleaning;
pub mod collector;
pub mod config;
pub mod error;
pub mod features;
pub mod outputs;
pub mod pipeline;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};

pub mod config;
pub mod error;
pub mod io;
pub mod logging;
pub mod matcher;
pub mod normalize;
pub mod relocate;
pub mod report;
pub mod scan;
pub mod task;

pub use error::{Result, ToolError};

pub mod config;
pub mod preview;

pub use config::ToolConfig;
pub use preview::side_by_side;

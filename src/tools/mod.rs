//! MeokPT Tools module
//!
//! MCP tool implementations for diet logging and intake targets.

pub mod daily;
pub mod diets;
pub mod feedback;
pub mod profile;
pub mod status;

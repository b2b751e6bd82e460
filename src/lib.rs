//! MeokPT Library
//!
//! Nutrition aggregation and intake-target engine, with a local diet store
//! and the MCP tools built on top of it.

pub mod build_info;
pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod tools;

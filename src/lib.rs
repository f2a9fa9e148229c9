//! Dieta Library
//!
//! Diet log storage and the recipe nutrition engine behind the Dieta MCP
//! server.

pub mod build_info;
pub mod catalog;
pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod tools;

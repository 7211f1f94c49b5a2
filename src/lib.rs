//! Azure DevOps MCP server.
//!
//! Exposes work items, pull requests, projects and teams as MCP tools over
//! stdio. The connection to the organization is built lazily on first tool
//! use and cached for the process lifetime; every tool call returns plain
//! text, with failures rendered as `Error ...` strings rather than protocol
//! errors.

pub mod cli;
pub mod clients;
pub mod core;
pub mod features;
pub mod infra;

//! Client library for the n8n REST API.
//!
//! Wraps the public `/api/v1` surface of an n8n instance: workflow CRUD,
//! execution listing and retrieval, webhook triggers, credentials, and
//! tags. Every operation is a single blocking HTTP request. The JSON
//! schemas stay owned by the server; responses pass through with unknown
//! fields preserved.

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::{Client, ExecutionFilter, WorkflowFilter};
pub use config::Config;
pub use error::{ApiError, Result};

//! Feature modules. Each contributes one named tool router to the registry
//! in [`registry`].

pub mod projects;
pub mod pull_requests;
pub mod registry;
pub mod teams;
pub mod work_items;

use std::sync::Arc;

use crate::clients::connection::ConnectionProvider;

/// The MCP server handler.
///
/// Holds the process-scoped connection provider; every tool resolves its
/// domain client through it per call, so the first call pays the handshake
/// and later calls reuse the cached connection.
#[derive(Clone)]
pub struct AdoService {
    provider: Arc<ConnectionProvider>,
}

impl AdoService {
    pub fn new(provider: Arc<ConnectionProvider>) -> Self {
        Self { provider }
    }
}

impl rmcp::ServerHandler for AdoService {}

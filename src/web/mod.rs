pub mod handlers;
pub mod models;
pub mod routes;

use crate::config::Config;
use crate::knowledge::KnowledgeBase;
use crate::llama::LlamaClient;

/// Shared application state. Everything here is read-only once the server
/// is up, so handlers need no locking.
pub struct AppState {
    pub config: Config,
    pub knowledge: KnowledgeBase,
    pub llama: LlamaClient,
}

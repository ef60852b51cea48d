pub mod config;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod startup;
pub mod utils;

use crate::config::Config;
use crate::services::{PortalClient, SessionStore};
use std::sync::Arc;

/// Shared application state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub portal: PortalClient,
    pub sessions: Arc<dyn SessionStore>,
    pub config: Config,
}

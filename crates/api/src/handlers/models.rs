use blobfinder_driver::Dispatcher;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub(super) dispatcher: Arc<Dispatcher>,
}

use super::models::AppState;
use axum::extract::FromRef;
use blobfinder_driver::Dispatcher;
use std::sync::Arc;

impl AppState {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

impl FromRef<AppState> for Arc<Dispatcher> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.dispatcher)
    }
}

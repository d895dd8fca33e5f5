mod models;
mod state;
mod thumbnails;
pub mod connector;

pub use models::AppState;
pub use connector::{connector_get, connector_post, ConnectorRequest};
pub use thumbnails::serve_thumbnail;

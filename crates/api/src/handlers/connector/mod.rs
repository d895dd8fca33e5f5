mod dispatch;
mod handler;
mod parser;
mod validator;

pub use dispatch::execute;
pub use handler::{connector_get, connector_post};
pub use parser::ConnectorRequest;

mod node;
mod responses;

pub use node::{Node, NodeKind, DIRECTORY_MIME};
pub use responses::*;

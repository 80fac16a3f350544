mod service;
mod types;

pub use service::PostService;
pub use types::{Ack, PostError};

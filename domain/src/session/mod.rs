//! Session domain module: chat messages and streaming events.

pub mod entities;
pub mod stream;

pub use entities::{Message, Role};
pub use stream::StreamEvent;

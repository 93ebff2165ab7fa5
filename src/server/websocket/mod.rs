mod connection;
mod handler;
pub mod messages;

pub use connection::{ConnectionManager, SendError};
pub use handler::ws_handler;

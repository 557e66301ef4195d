//! Transport adapters feeding [`Connection`](crate::connection::Connection).

mod ws;

pub use ws::{WsFrames, handle_socket, pump_outbox};

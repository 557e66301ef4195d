//! WebSocket relay server for two-player tic-tac-toe.
//!
//! # Architecture
//!
//! - **Protocol**: double-encoded `{eventType, eventData}` envelopes
//! - **Connection**: frame reassembly, size limit, per-connection outbox
//! - **Session**: one connection's requests turned into engine calls
//! - **Transport**: axum WebSocket adapter
//! - **Server**: router, shared state, graceful shutdown
//!
//! Game rules and matchmaking live in [`tiktaktok_game`].

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod connection;
mod error;
mod protocol;
mod server;
mod session;
pub mod transport;

pub use config::{ConfigError, PORT_VAR, ServerConfig};
pub use connection::{Connection, Frame, FrameSource, MessageAssembler, Outbound, Outbox};
pub use error::{ConnectionError, ProtocolError};
pub use protocol::{
    Envelope, EventType, decode_client_event, decode_server_event, encode_client_event,
    encode_server_event,
};
pub use server::{AppState, router, serve};
pub use session::{PlayerSession, serve_connection};

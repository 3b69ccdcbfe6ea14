//! HTTP request handlers.
//!
//! Handlers are thin: decode the wire shape, delegate to the session
//! bridge, encode the result. Each connection runs on its own task, so a
//! slow turn never delays routing or authentication of concurrent calls.

pub mod chat;
pub mod events;
pub mod speech;

//! Real-time push over WebSocket.
//!
//! `fanout` is the in-process hub, `notify` decides who hears about a change,
//! and `server` runs one event loop per connection.

pub mod events;
pub mod fanout;
pub mod handler;
pub mod notify;
pub mod server;
pub mod session;

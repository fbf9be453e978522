//! Session controller: per-session serialized exchanges.
//!
//! - `SessionController`: the public entry point (`handle`, `handle_streaming`, `reset`)
//! - `actor`: one worker task per active session, fed over an mpsc channel
//! - `segment`: splits a finished reply into streamable chunks

pub mod actor;
pub mod controller;
pub mod segment;

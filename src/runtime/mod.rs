//! Application lifecycle: startup wiring, HTTP server, graceful shutdown

pub mod lifetime;
pub mod server;

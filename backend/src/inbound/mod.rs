//! Inbound adapters translating external requests into domain calls.
//!
//! REST endpoints live under [`http`]; live notification sockets under
//! [`ws`].

pub mod http;
pub mod ws;

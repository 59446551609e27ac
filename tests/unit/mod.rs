//! Unit tests for skyscope modules
//!
//! These tests drive the public API end to end; only the edge server tests
//! open sockets, and those bind to loopback.

mod test_auth;
mod test_config;
mod test_effects;
mod test_loading;

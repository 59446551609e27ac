//! Terminal presentation for the CLI.

pub mod preview;
pub mod style;

pub use preview::TerminalMirror;

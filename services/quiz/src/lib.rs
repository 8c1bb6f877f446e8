//! Quiz Service Library Crate
//!
//! This library wires the quiz capability to a concrete environment:
//! configuration loaded from env vars and a console-backed responder for
//! standalone runs. The `quiz` binary is a thin wrapper around it.

pub mod config;
pub mod console;

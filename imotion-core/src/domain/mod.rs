//! Core domain types
//!
//! These types describe a generation request, the remote job it creates and
//! the local history record that tracks it. They are shared between the HTTP
//! client (wire encoding), the engine (lifecycle and persistence) and the CLI.

pub mod history;
pub mod job;
pub mod params;

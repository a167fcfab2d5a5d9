//! ImageMotion Core
//!
//! Core types shared by the ImageMotion client, engine and CLI.
//!
//! This crate contains:
//! - Domain types: generation parameters, job handles and results, history entries
//! - DTOs: wire envelopes exchanged with the remote generation API

pub mod domain;
pub mod dto;

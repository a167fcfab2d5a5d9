//! Data Transfer Objects for the remote generation API
//!
//! The API wraps every success payload in a `{ "data": ... }` envelope.
//! These DTOs mirror that shape and convert into domain types.

pub mod job;

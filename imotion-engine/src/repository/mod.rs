//! Repository layer
//!
//! The controller talks to the generation service only through the
//! [`JobRepository`] trait. The HTTP implementation is the
//! [`GenerationClient`](imotion_client::GenerationClient) itself; tests plug in
//! scripted fakes.

mod jobs;

pub use jobs::JobRepository;

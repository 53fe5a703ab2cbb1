//! Gemini collaborator: image, text, edit and video generation over the REST API.
//!
//! The API key travels in the `x-goog-api-key` header, never in a URL, so
//! request URLs are safe to log.

mod client;
mod poll;
mod wire;

pub use client::GeminiClient;
pub use poll::poll_until_done;

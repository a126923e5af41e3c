//! Presentation Layer
//!
//! Envelope codec, DTOs, extractors, HTTP handlers and router.

pub mod dto;
pub mod envelope;
pub mod extract;
pub mod handlers;
pub mod router;

//! Protocol definitions for the Ad Service client.
//!
//! This crate defines the protobuf messages exchanged with the Ad Service
//! and the gRPC stub used to call it.

mod ads;
mod service;

pub use ads::*;
pub use service::*;

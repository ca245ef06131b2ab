//! HuaweiCloud REST API plumbing and per-service operations

pub mod cbh;
pub mod client;
pub mod common;
pub mod cse;
pub mod cts;
pub mod ecs;
pub mod endpoints;
pub mod error;
pub mod esw;
pub mod poll;
pub mod sdrs;
pub mod signer;
pub mod sms;

pub use client::{Client, ClientConfig};
pub use error::ApiError;

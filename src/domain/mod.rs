//! Core domain types: specifier grammar and the canonical request object.

mod request;
mod specifier;

pub use request::{ComponentType, OutputMode, Request};
pub use specifier::Specifier;

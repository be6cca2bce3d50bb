//! Compo - a package manager CLI for platform-specific modules and widgets
//!
//! Compo turns a free-form command line into a fully resolved [`Request`]
//! and hands it to the install/uninstall/demo/info operations. The
//! interesting parts live in [`domain`] (specifier grammar, request
//! merging) and [`cli`] (command routing and the deferred-initialization
//! step that runs before every mutating command).

pub mod cli;
pub mod domain;
pub mod ops;
pub mod storage;

pub use domain::{ComponentType, OutputMode, Request, Specifier};

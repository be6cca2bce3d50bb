//! Install/uninstall/demo/info operations
//!
//! The dispatch layer hands every operation a finished [`Request`] and does
//! not inspect the outcome beyond success or failure. [`LocalStore`] is the
//! shipped implementation, working against the local component stores;
//! registry-backed resolution is deliberately out of scope and surfaces as
//! [`OpError::NoSource`].

mod store;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::Request;
use crate::storage::{Context, InitError};

pub use store::{Component, LocalStore};

#[derive(Debug, Error)]
pub enum OpError {
    #[error("missing <id>")]
    MissingId,

    #[error("`{0}` is not installed")]
    NotInstalled(String),

    #[error("no local source for `{0}`: registry lookups are not supported, install from a URL or an archive file")]
    NoSource(String),

    #[error("module `{0}` does not bundle an example app")]
    NoExample(String),

    #[error("{0} already exists, pass --force to overwrite it")]
    DemoExists(PathBuf),

    #[error("no component store available for this scope")]
    NoStore,

    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("failed to unpack {path}: {source}")]
    Unpack {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Init(#[from] InitError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// The operation contract consumed by the dispatch layer.
pub trait Ops {
    /// Installs from the request's source, or reports on the store when no
    /// source is present. Also serves `update` runs.
    fn install(&self, context: &Context, request: &Request) -> Result<(), OpError>;

    /// Removes installed components matching the request.
    fn uninstall(&self, context: &Context, request: &Request) -> Result<(), OpError>;

    /// Scaffolds a demo project from an installed module's example app.
    fn demo(&self, context: &Context, request: &Request) -> Result<(), OpError>;

    /// Displays information about an installed component. Runs without a
    /// prepared context.
    fn info(&self, request: &Request) -> Result<(), OpError>;
}

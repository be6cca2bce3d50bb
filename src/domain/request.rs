//! The canonical request object handed to every operation
//!
//! A [`Request`] is built in layers: global flags first, then
//! command-specific flags, then the fields derived from the positional
//! specifier token. The specifier layer wins over the flag layer for
//! `platform` only; all other fields do not overlap.

use std::path::PathBuf;

use clap::ValueEnum;
use serde::Serialize;

use super::specifier::Specifier;

/// Restricts an operation to one component kind; absent means both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Module,
    Widget,
}

impl ComponentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Module => "module",
            ComponentType::Widget => "widget",
        }
    }
}

/// Presentation mode for the `info` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputMode {
    #[default]
    Pretty,
    Json,
}

/// Fully merged request passed to the install/uninstall/demo/info
/// operations.
///
/// At most one of `url`, `file` and `id` is set: a URL or an existing local
/// archive short-circuits identifier parsing entirely. `version` is only
/// ever set alongside `id`. The request is constructed once per invocation
/// and never mutated after being handed to an operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Request {
    pub id: Option<String>,
    pub version: Option<String>,
    /// Target platform name or comma-separated list.
    pub platform: Option<String>,
    pub url: Option<String>,
    pub file: Option<PathBuf>,
    pub kind: Option<ComponentType>,
    pub force: bool,
    pub global: bool,
    pub alloy_base: Option<String>,
    /// Marks an update-all run; no positional fields are present.
    pub update: bool,
    pub output: Option<OutputMode>,
}

impl Request {
    /// Merges parser output into the request.
    ///
    /// A specifier-derived platform overrides the `--platform` flag. When a
    /// single token resolves both an id and a version, `force` is raised
    /// unconditionally: an explicit version pin always replaces an existing
    /// install.
    pub fn apply_specifier(&mut self, specifier: Specifier) {
        match specifier {
            Specifier::Url(url) => self.url = Some(url),
            Specifier::FilePath(path) => self.file = Some(path),
            Specifier::Identifier {
                id,
                version,
                platform,
            } => {
                if platform.is_some() {
                    self.platform = platform;
                }
                if version.is_some() {
                    self.force = true;
                }
                self.id = Some(id);
                self.version = version;
            }
            Specifier::Empty => {}
        }
    }
}

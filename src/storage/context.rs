//! Invocation context prepared before any mutating command runs
//!
//! Every mutating command goes through [`Context::prepare`] before its body
//! executes: the global configuration is loaded, the enclosing project is
//! detected, and the effective alloy base and store locations are resolved.
//! Preparation runs at most once per invocation; when it fails, nothing
//! else runs.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::config::{ConfigError, GlobalConfig};
use crate::domain::Request;

/// Marker file identifying a project root.
pub const PROJECT_MARKER: &str = "tiapp.xml";

/// Alloy base directory used when neither flag nor config override it.
pub const DEFAULT_ALLOY_BASE: &str = "app";

#[derive(Debug, Error)]
pub enum InitError {
    #[error("not inside a project (no tiapp.xml found in this or any parent directory); pass --global to use the global store")]
    NoProject,

    #[error("could not determine a data directory for the global store")]
    NoGlobalStore,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Resolved environment for one invocation.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: GlobalConfig,
    /// Nearest ancestor directory containing the project marker, if any.
    pub project_root: Option<PathBuf>,
    /// Effective alloy base directory (flag > config > `app`).
    pub alloy_base: String,
    /// Root of the global component store.
    pub global_base: PathBuf,
}

impl Context {
    /// Resolves configuration and environment without requiring a project.
    /// Used by commands that work in any directory, like `info`.
    pub fn discover() -> Result<Self, InitError> {
        let config = GlobalConfig::load()?;
        let project_root = find_project_root();

        let global_base = match &config.global_path {
            Some(path) => path.clone(),
            None => GlobalConfig::data_dir().ok_or(InitError::NoGlobalStore)?,
        };
        let alloy_base = effective_alloy_base(None, config.alloy_base.as_deref());

        Ok(Self {
            config,
            project_root,
            alloy_base,
            global_base,
        })
    }

    /// Prepares the context for a mutating command.
    ///
    /// Fails with [`InitError::NoProject`] when the request targets the
    /// project store but no project encloses the working directory.
    pub fn prepare(request: &Request) -> Result<Self, InitError> {
        let mut context = Self::discover()?;
        context.alloy_base = effective_alloy_base(
            request.alloy_base.as_deref(),
            context.config.alloy_base.as_deref(),
        );

        if !request.global && context.project_root.is_none() {
            return Err(InitError::NoProject);
        }

        Ok(context)
    }

    /// Base directory component archives unpack into for the given scope.
    pub fn base_dir(&self, global: bool) -> Option<&Path> {
        if global {
            Some(&self.global_base)
        } else {
            self.project_root.as_deref()
        }
    }

    /// Module store: `<base>/modules/<platform>/<id>/<version>/`.
    pub fn modules_dir(&self, global: bool) -> Option<PathBuf> {
        self.base_dir(global).map(|base| base.join("modules"))
    }

    /// Widget store: `<root>/<alloy_base>/widgets/<id>/` in a project,
    /// `<base>/widgets/<id>/` globally.
    pub fn widgets_dir(&self, global: bool) -> Option<PathBuf> {
        if global {
            Some(self.global_base.join("widgets"))
        } else {
            self.project_root
                .as_deref()
                .map(|root| root.join(&self.alloy_base).join("widgets"))
        }
    }
}

/// Flag wins over config, config over the built-in default.
fn effective_alloy_base(flag: Option<&str>, config: Option<&str>) -> String {
    flag.or(config).unwrap_or(DEFAULT_ALLOY_BASE).to_string()
}

/// Finds the project root by walking up from the current directory looking
/// for the project marker file.
pub fn find_project_root() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        if current.join(PROJECT_MARKER).is_file() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

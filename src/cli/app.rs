//! Main CLI application structure
//!
//! Commands and their shorthand aliases resolve to a single registration
//! each (`install`/`i`, `uninstall`/`u`), so an alias always accepts
//! exactly the flags of its primary command. The additional specifier
//! shapes shown in help are documentation only and carry no handler of
//! their own.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

use super::dispatch;
use super::output::Output;
use crate::domain::{ComponentType, OutputMode, Request};
use crate::ops::LocalStore;
use crate::storage::GlobalConfig;

const INSTALL_FORMS: &str = "\
Specifier forms:
  <id>                               install the latest version
  <id>@<version-range>               install a specific version (range)
  <id>@<version-range>:<platform>    install for specific platform(s)
  <url>                              install from a remote component archive
  <path>                             install from a local component archive";

const UNINSTALL_FORMS: &str = "\
Specifier forms:
  <id>                               uninstall every installed version
  <id>@<version>                     uninstall a specific version
  <id>@<version>:<platform>          uninstall a specific version for specific platform(s)";

#[derive(Parser)]
#[command(name = "compo")]
#[command(author, version)]
#[command(about = "Install and manage platform-specific modules and widgets")]
#[command(override_usage = "compo <command> [args] [options]")]
pub struct Cli {
    /// Use the global store instead of the enclosing project
    #[arg(long, short = 'g', global = true)]
    pub global: bool,

    /// Install components even if already present
    #[arg(long, short = 'f', global = true)]
    pub force: bool,

    /// Alternate alloy base directory instead of `app`, e.g. `src`
    #[arg(long, short = 'b', global = true, value_name = "directory")]
    pub alloy_base: Option<String>,

    /// Apply to a specific platform only (comma separated)
    #[arg(long, short = 'p', global = true, value_name = "platform")]
    pub platform: Option<String>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install all missing modules and widgets, or one component
    #[command(visible_alias = "i", after_help = INSTALL_FORMS)]
    Install {
        /// Component specifier: `<id>[@<version-range>][:<platform>]`, a URL, or an archive path
        #[arg(value_name = "specifier")]
        specifier: Option<String>,

        /// widget or module (default: both)
        #[arg(long = "type", short = 't', value_name = "type")]
        kind: Option<ComponentType>,
    },

    /// Update all modules and widgets
    Update {
        /// widget or module (default: both)
        #[arg(long = "type", short = 't', value_name = "type")]
        kind: Option<ComponentType>,
    },

    /// Uninstall a module or widget
    #[command(visible_alias = "u", after_help = UNINSTALL_FORMS)]
    Uninstall {
        /// Component specifier: `<id>[@<version>][:<platform>]`
        #[arg(value_name = "specifier")]
        specifier: Option<String>,
    },

    /// Display info about a component
    Info {
        #[arg(value_name = "id")]
        id: String,

        /// pretty or json (default: pretty)
        #[arg(long, short = 'o', value_name = "output", default_value = "pretty")]
        output: OutputMode,
    },

    /// Create a demo project from a module's bundled example app
    Demo {
        /// Component specifier: `<id>[@<version>][:<platform>]`
        #[arg(value_name = "specifier")]
        specifier: Option<String>,
    },

    /// List or set global configuration settings
    Config {
        /// Setting to change; omit to list all settings
        #[arg(value_name = "key", requires = "value")]
        key: Option<String>,

        /// New value for the setting
        #[arg(value_name = "value")]
        value: Option<String>,
    },
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(cli.verbose);

    // Layer 1: global flags, shared by every command.
    let base = Request {
        force: cli.force,
        global: cli.global,
        platform: cli.platform.clone(),
        alloy_base: cli.alloy_base.clone(),
        ..Request::default()
    };

    // No actionable command: show usage help and exit normally.
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let store = LocalStore::new(&output);

    match command {
        Commands::Install { specifier, kind } => dispatch::install(
            &store,
            &output,
            Request { kind, ..base },
            specifier.as_deref(),
        )?,

        Commands::Update { kind } => {
            dispatch::update(&store, &output, Request { kind, ..base })?
        }

        Commands::Uninstall { specifier } => {
            dispatch::uninstall(&store, &output, base, specifier.as_deref())?
        }

        Commands::Info { id, output: mode } => dispatch::info(
            &store,
            &output,
            Request {
                id: Some(id),
                output: Some(mode),
                ..Request::default()
            },
        )?,

        Commands::Demo { specifier } => dispatch::demo(
            &store,
            &output,
            // The demo store is always the global one.
            Request {
                global: true,
                ..base
            },
            specifier.as_deref(),
        )?,

        Commands::Config { key, value } => config_command(&output, key.as_deref(), value.as_deref())?,
    }

    Ok(())
}

/// `config` lists every setting, `config <key> <value>` sets one.
fn config_command(output: &Output, key: Option<&str>, value: Option<&str>) -> Result<()> {
    let mut config = GlobalConfig::load()?;

    match (key, value) {
        (Some(key), Some(value)) => {
            config.set(key, value)?;
            config.save()?;
            output.success(&format!("{} = {}", key, value));
        }
        _ => {
            for (key, value) in config.entries() {
                match value {
                    Some(value) => println!("{:<12} {}", key, value),
                    None => println!("{:<12} (unset)", key),
                }
            }
        }
    }

    Ok(())
}

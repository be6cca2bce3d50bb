//! Component specifier grammar
//!
//! A specifier is the single positional token accepted by `install`,
//! `uninstall` and `demo`:
//!
//! - `<id>` - bare identifier (e.g. `ti.paint`)
//! - `<id>@<version-range>` - pinned to a version or range (e.g. `ti.paint@1.2.x`)
//! - `<id>@<version-range>:<platform>` - additionally restricted to one or
//!   more platforms (e.g. `ti.paint@1.2.x:android`)
//! - a URL pointing at a component archive (`https://example.com/x.tgz`)
//! - a path to a local component archive
//!
//! URL and file forms are only recognized for commands that can install from
//! them; for everything else the token is always an identifier specifier.
//!
//! Parsing is purely lexical. Identifiers, version ranges and platform names
//! are not validated here; that is the job of the operation that receives
//! the finished request. Separator priority: `:` is resolved before `@`, so
//! a version range can never be mistaken for a platform suffix. A separator
//! at position 0 is treated as absent, which keeps a token like `:android`
//! from parsing as an empty identifier.

use std::path::{Path, PathBuf};

/// A parsed positional specifier token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Specifier {
    /// `<id>[@<version-range>][:<platform>]`
    Identifier {
        id: String,
        version: Option<String>,
        platform: Option<String>,
    },
    /// A remote archive URL.
    Url(String),
    /// An existing local archive path.
    FilePath(PathBuf),
    /// No token was supplied.
    Empty,
}

impl Specifier {
    /// Parses an optional positional token.
    ///
    /// `allow_sources` enables URL and file recognition. The checks run in
    /// order, first match wins: URL, existing local path, identifier
    /// grammar. The only I/O is the local path existence check.
    pub fn parse(token: Option<&str>, allow_sources: bool) -> Self {
        let Some(token) = token else {
            return Specifier::Empty;
        };

        if allow_sources {
            if token.find("://").map_or(false, |at| at > 0) {
                return Specifier::Url(token.to_string());
            }

            let path = Path::new(token);
            if path.exists() {
                return Specifier::FilePath(path.to_path_buf());
            }
        }

        Self::split_identifier(token)
    }

    /// Splits `<id>[@<version>][:<platform>]` on first-occurrence separators.
    fn split_identifier(token: &str) -> Self {
        // Carve the platform off first so the remainder is id[@version].
        let (rest, platform) = match token.find(':') {
            Some(at) if at > 0 => (&token[..at], Some(token[at + 1..].to_string())),
            _ => (token, None),
        };

        let (id, version) = match rest.find('@') {
            Some(at) if at > 0 => (&rest[..at], Some(rest[at + 1..].to_string())),
            _ => (rest, None),
        };

        Specifier::Identifier {
            id: id.to_string(),
            version,
            platform,
        }
    }
}

//! Versioned artifacts on disk.
//!
//! An artifact is a standalone installable file named
//! `<prefix><version><extension>`, e.g. `komga-1.11.2.jar`. This module knows
//! how to recognise such names ([`ArtifactPattern`]), find them in a directory
//! tree ([`scanner`]), and delete the ones that are no longer active
//! ([`pruner`]).

pub mod pruner;
pub mod scanner;

pub use pruner::{prune_stale, prune_stale_with};
pub use scanner::{latest, scan};

use crate::core::UpdaterError;
use crate::version::DottedVersion;
use anyhow::Result;
use regex::Regex;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Naming convention for one product's artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactPattern {
    prefix: String,
    extension: String,
    /// Whole-filename match, version in group 1.
    file_name: Regex,
    /// Same shape, unanchored, for filenames embedded in other text.
    embedded: Regex,
    /// An embedded filename together with any directory written before it.
    embedded_path: Regex,
}

impl ArtifactPattern {
    /// Build a pattern from a literal prefix (`komga-`) and extension (`.jar`).
    ///
    /// The version part is one or more digits and dots.
    pub fn new(prefix: &str, extension: &str) -> Result<Self> {
        if prefix.is_empty() || extension.is_empty() {
            return Err(UpdaterError::Configuration {
                message: "artifact prefix and extension must not be empty".to_string(),
            }
            .into());
        }

        let core = format!("{}([0-9.]+){}", regex::escape(prefix), regex::escape(extension));
        let file_name = Regex::new(&format!("^{core}$"))?;
        let embedded = Regex::new(&core)?;
        let embedded_path = Regex::new(&format!(r#"[^\s"'=]*{core}"#))?;

        Ok(Self {
            prefix: prefix.to_string(),
            extension: extension.to_string(),
            file_name,
            embedded,
            embedded_path,
        })
    }

    /// Literal filename prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Literal filename extension, including the dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Filename for a given version: `komga-` + `1.2.3` + `.jar`.
    pub fn file_name_for(&self, version: &str) -> String {
        format!("{}{}{}", self.prefix, version, self.extension)
    }

    /// Version token of a bare filename, if the whole name matches.
    pub fn version_of<'a>(&self, file_name: &'a str) -> Option<&'a str> {
        self.file_name.captures(file_name).and_then(|c| c.get(1)).map(|m| m.as_str())
    }

    /// First version token of an artifact filename embedded anywhere in `text`.
    pub fn find_version<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.embedded.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str())
    }

    /// Every artifact path token in `text`: the filename plus whatever
    /// directory precedes it up to whitespace, a quote, or `=`.
    pub fn find_paths<'a>(&self, text: &'a str) -> impl Iterator<Item = &'a str> {
        self.embedded_path.find_iter(text).map(|m| m.as_str())
    }

    /// Replace every artifact path token in `text` with `replacement`.
    pub fn replace_paths<'a>(&self, text: &'a str, replacement: &str) -> Cow<'a, str> {
        self.embedded_path.replace_all(text, regex::NoExpand(replacement))
    }

    /// Loose check used for release assets: right prefix and extension,
    /// whatever sits in between.
    pub fn matches_asset(&self, name: &str) -> bool {
        name.starts_with(&self.prefix) && name.ends_with(&self.extension)
    }
}

/// An artifact file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactCandidate {
    /// Full path as produced by the directory walk
    pub path: PathBuf,
    /// Version parsed from the filename
    pub version: DottedVersion,
}

impl ArtifactCandidate {
    /// Build a candidate from a path whose filename matches `pattern`.
    pub fn from_path(path: &Path, pattern: &ArtifactPattern) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        let version = pattern.version_of(name)?;
        Some(Self {
            path: path.to_path_buf(),
            version: DottedVersion::parse(version),
        })
    }
}

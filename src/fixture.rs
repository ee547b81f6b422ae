//! Fixture resolution and loading.
//!
//! Fixture paths are declared relative to the directory of the suite that
//! uses them and resolved to canonical absolute paths before any case in the
//! group runs. The `defaults.yaml` fixture is only ever read here.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use serde_yaml::{Mapping, Value};
use thiserror::Error;

/// Errors raised while resolving or reading fixtures.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum FixtureError {
    /// Raised when the fixture path cannot be canonicalised.
    #[error("fixture {path} could not be resolved: {message}")]
    Unresolved {
        /// Path as declared, joined onto its anchor.
        path: Utf8PathBuf,
        /// Operating system error string.
        message: String,
    },
    /// Raised when the resolved path is not a regular file.
    #[error("fixture {path} is not a file")]
    NotAFile {
        /// Canonical path of the fixture.
        path: Utf8PathBuf,
    },
    /// Raised when reading the fixture fails.
    #[error("failed to read fixture {path}: {message}")]
    Read {
        /// Path that could not be read.
        path: Utf8PathBuf,
        /// Underlying error message.
        message: String,
    },
    /// Raised when the fixture is not a YAML mapping.
    #[error("fixture {path} is not a valid YAML mapping: {message}")]
    Parse {
        /// Path that failed to parse.
        path: Utf8PathBuf,
        /// Parser error message.
        message: String,
    },
}

/// Resolves `relative` against `anchor` into a canonical, existing file path.
///
/// # Errors
///
/// Returns [`FixtureError::Unresolved`] when the path does not exist and
/// [`FixtureError::NotAFile`] when it names a directory.
pub fn resolve_fixture(
    anchor: &Utf8Path,
    relative: &Utf8Path,
) -> Result<Utf8PathBuf, FixtureError> {
    let joined = anchor.join(relative);
    let canonical = joined
        .canonicalize_utf8()
        .map_err(|err| FixtureError::Unresolved {
            path: joined.clone(),
            message: err.to_string(),
        })?;
    if !canonical.is_file() {
        return Err(FixtureError::NotAFile { path: canonical });
    }
    Ok(canonical)
}

/// Provisioning defaults consumed by provider scenarios.
#[derive(Clone, Debug, PartialEq)]
pub struct ProvisionDefaults {
    path: Utf8PathBuf,
    values: Mapping,
}

impl ProvisionDefaults {
    /// Path the defaults were loaded from.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Top-level value for `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Number of top-level keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when the mapping has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Reads and parses a defaults YAML file.
///
/// # Errors
///
/// Returns [`FixtureError::Read`] when the file cannot be read and
/// [`FixtureError::Parse`] when it is not a YAML mapping.
pub fn load_defaults(path: &Utf8Path) -> Result<ProvisionDefaults, FixtureError> {
    let content = read_to_string_ambient(path).map_err(|message| FixtureError::Read {
        path: path.to_path_buf(),
        message,
    })?;
    let value: Value = serde_yaml::from_str(&content).map_err(|err| FixtureError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    let Value::Mapping(values) = value else {
        return Err(FixtureError::Parse {
            path: path.to_path_buf(),
            message: String::from("top-level document must be a mapping"),
        });
    };
    Ok(ProvisionDefaults {
        path: path.to_path_buf(),
        values,
    })
}

fn read_to_string_ambient(path: &Utf8Path) -> Result<String, String> {
    let parent = path
        .parent()
        .ok_or_else(|| format!("path has no parent directory: {path}"))?;
    let file_name = path
        .file_name()
        .ok_or_else(|| format!("path has no file name: {path}"))?;
    let dir_path = if parent.as_str().is_empty() {
        Utf8Path::new(".")
    } else {
        parent
    };

    let dir =
        Dir::open_ambient_dir(dir_path, ambient_authority()).map_err(|err| err.to_string())?;
    dir.read_to_string(file_name).map_err(|err| err.to_string())
}

//! Filter configuration files.
//!
//! Every top-level TOML table is one section describing a prefix list to
//! generate:
//!
//! ```toml
//! [DOWNSTREAM_PREFIX_AS215172]
//! enabled = true
//! ipv6 = false
//! from = "AS215172"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::repository::display_path;
use crate::{Error, Result};

/// File extension of configuration files.
pub const CONFIG_EXTENSION: &str = "toml";

/// One prefix list to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSection {
    /// Table name; also the name of the generated list and artifact.
    pub name: String,
    /// Whether the section is processed at all.
    pub enabled: bool,
    /// Query IPv6 rather than IPv4 prefixes.
    pub ipv6: bool,
    /// AS number or AS-SET queried for prefixes.
    pub from: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SectionFields {
    enabled: bool,
    ipv6: bool,
    from: String,
}

/// A parsed configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    /// File stem, used to name the output directory and reports.
    pub name: String,
    /// Location the configuration was read from.
    pub path: PathBuf,
    /// Sections in file order.
    pub sections: Vec<FilterSection>,
}

impl FilterConfig {
    /// Read and parse the configuration at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be read and
    /// [`Error::Config`] when it is not valid TOML or a section field has
    /// the wrong type.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: display_path(path),
            source,
        })?;
        let name = path
            .file_stem()
            .map_or_else(|| display_path(path), |stem| stem.to_string_lossy().into_owned());

        Self::parse(name, path, &text)
    }

    /// Parse configuration `text` under the given name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when `text` is not valid TOML or a section
    /// field has the wrong type.
    pub fn parse(name: impl Into<String>, path: impl Into<PathBuf>, text: &str) -> Result<Self> {
        let path = path.into();
        let config_error = |source| Error::Config {
            path: display_path(&path),
            source,
        };

        let table: toml::Table = toml::from_str(text).map_err(config_error)?;
        let mut sections = Vec::with_capacity(table.len());
        for (section, value) in table {
            if !value.is_table() {
                log::warn!(
                    "ignoring non-table entry {section} in {}",
                    path.display()
                );
                continue;
            }

            let fields = value.try_into::<SectionFields>().map_err(config_error)?;
            sections.push(FilterSection {
                name: section,
                enabled: fields.enabled,
                ipv6: fields.ipv6,
                from: fields.from,
            });
        }

        Ok(Self {
            name: name.into(),
            path,
            sections,
        })
    }

    /// Sections with `enabled = true`, in file order.
    pub fn enabled_sections(&self) -> impl Iterator<Item = &FilterSection> {
        self.sections.iter().filter(|section| section.enabled)
    }
}

/// Every configuration file in `dir`, sorted by file name.
///
/// # Errors
///
/// Returns [`Error::Io`] when the directory cannot be listed.
pub fn discover_configs(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let io_error = |source| Error::Io {
        path: display_path(dir),
        source,
    };

    let mut configs = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        let is_config = path
            .extension()
            .is_some_and(|ext| ext == CONFIG_EXTENSION);
        if is_config && path.is_file() {
            configs.push(path);
        }
    }
    configs.sort();
    Ok(configs)
}

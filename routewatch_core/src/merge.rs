//! Concatenation of per-section artifacts into one router-loadable file.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::repository::display_path;
use crate::{Error, Result};

/// File name of the merged artifact inside a config's output directory.
pub const MERGED_FILE_NAME: &str = "filtersprefix.conf";

const RULE_WIDTH: usize = 70;

/// Concatenate `files` into `output`, each preceded by a source banner.
///
/// Inputs that do not exist are skipped with a warning. The merged file is
/// written even when nothing could be included.
///
/// # Errors
///
/// Returns [`Error::Io`] when an existing input cannot be read or `output`
/// cannot be written.
pub fn merge_files<P: AsRef<Path>>(files: &[P], output: &Path) -> Result<PathBuf> {
    let rule = "=".repeat(RULE_WIDTH);
    let mut merged = String::new();
    let mut included = 0_usize;

    for file in files {
        let file = file.as_ref();
        if !file.exists() {
            log::warn!("{} does not exist; leaving it out of the merge", file.display());
            continue;
        }

        let content = fs::read_to_string(file).map_err(|source| Error::Io {
            path: display_path(file),
            source,
        })?;
        let name = file
            .file_name()
            .map_or_else(|| display_path(file), |name| name.to_string_lossy().into_owned());

        if included > 0 {
            let _ = writeln!(merged, "\n# {rule}");
        }
        let _ = write!(merged, "# Source: {name}\n# {rule}\n\n");
        merged.push_str(&content);
        if !content.ends_with('\n') {
            merged.push('\n');
        }
        included += 1;
    }

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).map_err(|source| Error::Io {
            path: display_path(parent),
            source,
        })?;
    }
    fs::write(output, merged).map_err(|source| Error::Io {
        path: display_path(output),
        source,
    })?;

    log::info!("merged {included} file(s) into {}", output.display());
    Ok(output.to_path_buf())
}

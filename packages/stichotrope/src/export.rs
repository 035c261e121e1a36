//! Renders results snapshots as CSV, JSON or console text.
//!
//! Every exporter is a pure function of a [`ProfilerResults`](crate::ProfilerResults): the
//! same snapshot always produces byte-identical output.

pub(crate) mod console;
pub(crate) mod csv;
pub(crate) mod json;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::Error;
use crate::error::Result;

/// Writes `contents` to a new file at `path`, replacing any existing file.
///
/// The destination is validated before anything is created.
fn write_file(path: &Path, contents: &[u8], format: &'static str) -> Result<()> {
    validate_destination(path)?;

    let export_error = |source| Error::Export {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = BufWriter::new(File::create(path).map_err(export_error)?);
    writer.write_all(contents).map_err(export_error)?;
    writer.flush().map_err(export_error)?;

    debug!(path = %path.display(), format, bytes = contents.len(), "results exported");

    Ok(())
}

fn validate_destination(path: &Path) -> Result<()> {
    let invalid = |problem: &str| {
        Err(Error::InvalidDestination {
            path: path.to_path_buf(),
            problem: problem.to_string(),
        })
    };

    if path.as_os_str().is_empty() {
        return invalid("the path is empty");
    }

    if path.is_dir() {
        return invalid("the path refers to a directory");
    }

    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            invalid("the parent directory does not exist")
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn empty_path_is_invalid() {
        let error = write_file(Path::new(""), b"data", "test").unwrap_err();
        assert!(matches!(error, Error::InvalidDestination { .. }));
    }

    #[test]
    fn directory_is_invalid() {
        let dir = tempfile::tempdir().unwrap();

        let error = write_file(dir.path(), b"data", "test").unwrap_err();
        assert!(matches!(error, Error::InvalidDestination { .. }));
    }

    #[test]
    fn missing_parent_is_invalid_and_nothing_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");

        let error = write_file(&path, b"data", "test").unwrap_err();
        assert!(matches!(error, Error::InvalidDestination { .. }));
        assert!(!dir.path().join("missing").exists());
    }

    #[test]
    fn writes_and_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");

        write_file(&path, b"first", "test").unwrap();
        write_file(&path, b"second", "test").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn bare_file_name_is_valid() {
        assert!(validate_destination(Path::new("results.json")).is_ok());
    }
}

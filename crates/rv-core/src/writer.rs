//! Report persistence.
//!
//! Reports are written to a sibling temp file and renamed into place, so a
//! reader never sees a half-written document and a failed run leaves the
//! previous report (if any) untouched.

use std::io::Write;
use std::path::{Path, PathBuf};

use rv_common::{Error, Report, Result};

/// Write `report` as pretty JSON to `path`, creating parent directories.
pub fn write_report(path: &Path, report: &Report) -> Result<()> {
    let content = report.to_json_pretty()?;
    write_atomic(path, content.as_bytes())
}

/// Atomically replace `path` with `content`.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::OutputWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let tmp_path = temp_path(path);
    let result = write_and_sync(&tmp_path, content).and_then(|()| {
        std::fs::rename(&tmp_path, path).map_err(|e| Error::OutputWrite {
            path: path.to_path_buf(),
            source: e,
        })
    });

    if result.is_err() {
        let _ = std::fs::remove_file(&tmp_path);
    }
    result
}

fn write_and_sync(tmp_path: &Path, content: &[u8]) -> Result<()> {
    let to_err = |e| Error::OutputWrite {
        path: tmp_path.to_path_buf(),
        source: e,
    };
    let mut file = std::fs::File::create(tmp_path).map_err(to_err)?;
    file.write_all(content).map_err(to_err)?;
    file.sync_all().map_err(to_err)?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("report.json");
    path.with_file_name(format!(".{}.tmp.{}", file_name, std::process::id()))
}

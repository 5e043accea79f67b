//! Atomic JSON artifact writes.
//!
//! Artifacts land in a temp file beside the destination, get synced, and
//! are renamed into place. A concurrent reader never observes a
//! half-written artifact and a failed write never clobbers the previous
//! one.

use crate::error::StoreError;
use serde_json::Value;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::WriteFile {
        path: path.to_path_buf(),
        source,
    }
}

/// Write `value` to `path` as pretty-printed JSON, atomically.
pub fn write_json_atomic(path: impl AsRef<Path>, value: &Value) -> Result<(), StoreError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
    }

    let mut payload =
        serde_json::to_vec_pretty(value).map_err(|source| StoreError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;
    payload.push(b'\n');

    let tmp_path = tmp_write_path(path);
    let write_result = (|| -> Result<(), StoreError> {
        let file = File::create(&tmp_path).map_err(|source| io_error(&tmp_path, source))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(&payload)
            .map_err(|source| io_error(&tmp_path, source))?;
        writer
            .flush()
            .map_err(|source| io_error(&tmp_path, source))?;
        let file = writer
            .into_inner()
            .map_err(|source| io_error(&tmp_path, source.into()))?;
        file.sync_all()
            .map_err(|source| io_error(&tmp_path, source))?;
        Ok(())
    })();

    if let Err(error) = write_result {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }

    fs::rename(&tmp_path, path).map_err(|source| {
        let _ = fs::remove_file(&tmp_path);
        io_error(path, source)
    })?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        let dir = File::open(parent).map_err(|source| io_error(parent, source))?;
        dir.sync_all().map_err(|source| io_error(parent, source))?;
    }

    Ok(())
}

fn tmp_write_path(path: &Path) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut tmp: OsString = path.as_os_str().to_os_string();
    tmp.push(format!(".tmp.{}.{}", std::process::id(), unique));
    PathBuf::from(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::read_json_value;
    use serde_json::json;

    fn temp_dir(prefix: &str) -> PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "tollgate-atomic-{prefix}-{}-{unique}",
            std::process::id()
        ))
    }

    #[test]
    fn write_replaces_the_previous_artifact() {
        let dir = temp_dir("replace");
        let path = dir.join("artifact.json");

        write_json_atomic(&path, &json!({"generation": 1})).expect("first write should succeed");
        write_json_atomic(&path, &json!({"generation": 2})).expect("second write should succeed");

        let value = read_json_value(&path).expect("artifact should parse");
        assert_eq!(value["generation"], 2);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn write_creates_missing_parent_directories() {
        let dir = temp_dir("mkdirs");
        let path = dir.join("nested/deeper/artifact.json");

        write_json_atomic(&path, &json!({"ok": true})).expect("write should succeed");
        assert!(path.is_file());

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn write_leaves_no_temp_files_behind() {
        let dir = temp_dir("clean");
        let path = dir.join("artifact.json");

        write_json_atomic(&path, &json!({"ok": true})).expect("write should succeed");

        let entries: Vec<String> = fs::read_dir(&dir)
            .expect("dir should list")
            .map(|e| e.expect("entry should read").file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, vec!["artifact.json"]);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn output_ends_with_a_newline() {
        let dir = temp_dir("newline");
        let path = dir.join("artifact.json");

        write_json_atomic(&path, &json!({"ok": true})).expect("write should succeed");
        let text = fs::read_to_string(&path).expect("artifact should read");
        assert!(text.ends_with('\n'));

        let _ = fs::remove_dir_all(dir);
    }
}

use std::io::ErrorKind;
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::error::StoreError;

/// Reads `path` as JSON.
///
/// `Ok(None)` means no file exists yet. A corrupt file falls back to its
/// `.json.tmp` sibling; when that is unusable too the parse error is returned
/// so callers can tell a damaged store from a fresh one.
pub(crate) async fn read_json_with_tmp_fallback<T: DeserializeOwned>(
    path: &Path,
) -> Result<Option<T>, StoreError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let err = match serde_json::from_slice::<T>(&bytes) {
        Ok(v) => return Ok(Some(v)),
        Err(err) => err,
    };
    warn!(error = %err, path = %path.display(), "failed to parse JSON, trying tmp fallback");
    let tmp = path.with_extension("json.tmp");
    match tokio::fs::read(&tmp).await {
        Ok(tmp_bytes) => match serde_json::from_slice::<T>(&tmp_bytes) {
            Ok(v) => {
                warn!(path = %tmp.display(), "recovered from tmp fallback");
                Ok(Some(v))
            }
            Err(_) => Err(err.into()),
        },
        Err(_) => Err(err.into()),
    }
}

/// Writes to `<path>.json.tmp` then renames over `path`.
pub(crate) async fn write_json_atomic<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(value)?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn sample() -> BTreeMap<String, bool> {
        BTreeMap::from([("1".to_string(), true)])
    }

    #[tokio::test]
    async fn atomic_write_then_read_back() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("prefs.json");

        write_json_atomic(&path, &sample()).await.unwrap();
        assert!(!path.with_extension("json.tmp").exists());

        let loaded: Option<BTreeMap<String, bool>> =
            read_json_with_tmp_fallback(&path).await.unwrap();
        assert_eq!(loaded, Some(sample()));
    }

    #[tokio::test]
    async fn missing_file_reads_as_none() {
        let dir = tempfile::TempDir::new().unwrap();
        let loaded: Option<Vec<String>> =
            read_json_with_tmp_fallback(&dir.path().join("nope.json")).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn corrupt_file_without_tmp_is_a_parse_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");
        tokio::fs::write(&path, b"{ not json").await.unwrap();

        let result = read_json_with_tmp_fallback::<BTreeMap<String, bool>>(&path).await;
        assert!(matches!(result, Err(StoreError::Json(_))));

        tokio::fs::write(path.with_extension("json.tmp"), b"also broken").await.unwrap();
        let result = read_json_with_tmp_fallback::<BTreeMap<String, bool>>(&path).await;
        assert!(matches!(result, Err(StoreError::Json(_))));
    }

    #[tokio::test]
    async fn corrupt_file_recovers_from_tmp() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("prefs.json");
        tokio::fs::write(&path, b"{ not json").await.unwrap();
        tokio::fs::write(
            path.with_extension("json.tmp"),
            serde_json::to_vec(&sample()).unwrap(),
        )
        .await
        .unwrap();

        let loaded = read_json_with_tmp_fallback::<BTreeMap<String, bool>>(&path).await;
        assert_eq!(loaded.unwrap(), Some(sample()));
    }

    #[tokio::test]
    async fn unreadable_path_is_an_io_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = read_json_with_tmp_fallback::<Vec<String>>(dir.path()).await;
        assert!(matches!(result, Err(StoreError::Io(_))));
    }
}

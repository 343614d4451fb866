//! Whole-document JSON persistence shared by the file adapters.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::ports::StorageError;

/// Reads a JSON document, returning `T::default()` when the file is absent.
pub(crate) async fn read_or_default<T>(path: &Path) -> Result<T, StorageError>
where
    T: DeserializeOwned + Default,
{
    let raw = match fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => {
            return Err(StorageError::io(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            )))
        }
    };

    if raw.trim().is_empty() {
        return Ok(T::default());
    }

    serde_json::from_str(&raw).map_err(|e| {
        StorageError::serialization(format!("Failed to parse {}: {}", path.display(), e))
    })
}

/// Writes a JSON document atomically: temporary file, then rename.
///
/// On failure the previous document is left in place.
pub(crate) async fn write_atomic<T>(path: &Path, document: &T) -> Result<(), StorageError>
where
    T: Serialize + ?Sized,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| StorageError::io(format!("Failed to create directory: {}", e)))?;
    }

    let json = serde_json::to_string_pretty(document)?;

    let temp_path = temp_path_for(path);
    fs::write(&temp_path, json)
        .await
        .map_err(|e| StorageError::io(format!("Failed to write temporary file: {}", e)))?;

    // Rename to final location (atomic operation on Unix)
    if let Err(e) = fs::rename(&temp_path, path).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(StorageError::io(format!("Failed to rename file: {}", e)));
    }

    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_file_reads_as_default() {
        let dir = TempDir::new().unwrap();
        let value: Vec<u32> = read_or_default(&dir.path().join("absent.json")).await.unwrap();
        assert!(value.is_empty());
    }

    #[tokio::test]
    async fn write_creates_parent_directories_and_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("doc.json");

        write_atomic(&path, &vec![1u32, 2, 3]).await.unwrap();
        let value: Vec<u32> = read_or_default(&path).await.unwrap();

        assert_eq!(value, vec![1, 2, 3]);
        assert!(!temp_path_for(&path).exists());
    }

    #[tokio::test]
    async fn corrupt_document_is_a_serialization_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let result: Result<Vec<u32>, _> = read_or_default(&path).await;
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }

    #[test]
    fn temp_path_keeps_directory_and_extends_name() {
        let path = Path::new("data/feedback.json");
        assert_eq!(temp_path_for(path), PathBuf::from("data/feedback.json.tmp"));
    }
}

use crate::Result;
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Write a file.
pub(crate) async fn write(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Result<()> {
    let path = path.as_ref();
    tokio::fs::write(path, contents)
        .await
        .context(format!("Unable to write to {}", path.to_string_lossy()))
}

/// Read a file to a `String`.
pub(crate) async fn read(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read file at {}", path.display()))
}

/// Create a directory and any missing parents.
pub(crate) async fn make_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    tokio::fs::create_dir_all(path)
        .await
        .with_context(|| format!("Unable to create directory {}", path.display()))
}

pub(crate) async fn canonicalize(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    tokio::fs::canonicalize(path)
        .await
        .with_context(|| format!("Unable to canonicalize {}", path.display()))
}

/// True when `path` is a directory. A path that cannot be read counts as missing.
pub(crate) async fn is_dir(path: impl AsRef<Path>) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

/// True when `path` is a regular file. A path that cannot be read counts as missing.
pub(crate) async fn is_file(path: impl AsRef<Path>) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

pub(crate) async fn exists(path: impl AsRef<Path>) -> bool {
    tokio::fs::metadata(path).await.is_ok()
}

/// The names of the entries in a directory.
pub(crate) async fn list_dir(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let mut entries = tokio::fs::read_dir(path)
        .await
        .with_context(|| format!("Unable to read directory {}", path.display()))?;
    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .with_context(|| format!("Unable to read an entry in {}", path.display()))?
    {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_read_list() {
        let dir = TempDir::new().unwrap();
        make_dir(dir.path().join("a/b")).await.unwrap();
        write(dir.path().join("z.txt"), "zed").await.unwrap();
        assert_eq!(read(&dir.path().join("z.txt")).await.unwrap(), "zed");
        assert_eq!(list_dir(dir.path()).await.unwrap(), vec!["a", "z.txt"]);
        assert!(read(&dir.path().join("missing")).await.is_err());
    }

    #[tokio::test]
    async fn test_path_checks() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("f.csv");
        write(&file, "x").await.unwrap();
        assert!(is_dir(dir.path()).await);
        assert!(!is_dir(&file).await);
        assert!(is_file(&file).await);
        assert!(!is_file(dir.path()).await);
        assert!(exists(&file).await);
        assert!(!exists(dir.path().join("missing")).await);
        assert!(!is_file(dir.path().join("missing")).await);
    }
}

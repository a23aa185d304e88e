use std::path::{Path, PathBuf};

use log::debug;
use tokio::fs;

use crate::utils::{Error, Result};

/// Ensures a directory exists, creating it and all parent directories if necessary.
pub async fn ensure_directory<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if !fs::try_exists(path)
        .await
        .map_err(|e| Error::storage(path, e))?
    {
        fs::create_dir_all(path)
            .await
            .map_err(|e| Error::storage(path, e))?;
        debug!("Created directory: {path:?}");
    }
    Ok(())
}

/// Writes `contents` to a sibling temp file, then renames it over `path`.
pub async fn write_atomic<P: AsRef<Path>>(path: P, contents: &[u8]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        ensure_directory(parent).await?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, contents)
        .await
        .map_err(|e| Error::storage(&tmp, e))?;
    fs::rename(&tmp, path)
        .await
        .map_err(|e| Error::storage(path, e))?;
    Ok(())
}

/// Removes a directory and all its contents if it exists.
pub async fn remove_dir_if_exists<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    match fs::remove_dir_all(path).await {
        Ok(()) => {
            debug!("Removed directory: {path:?}");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::storage(path, e)),
    }
}

/// Recursively collects files under `root` with the given extension, sorted by path.
pub async fn collect_files_with_extension<P: AsRef<Path>>(
    root: P,
    extension: &str,
) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![root.as_ref().to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| Error::storage(&dir, e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::storage(&dir, e))?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| Error::storage(&path, e))?;

            if file_type.is_dir() {
                pending.push(path);
            } else if path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
            {
                found.push(path);
            }
        }
    }

    found.sort();
    Ok(found)
}

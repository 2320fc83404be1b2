use std::{ffi::OsString, path::{Path, PathBuf}};

use anyhow::{anyhow, Result};
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::trace;

/// Sibling path used while a file is being replaced: `name.json` becomes `name.json.tmp`.
fn temporary_path(path: &Path) -> Result<PathBuf> {
    let name = path
        .file_name()
        .ok_or_else(|| anyhow!("Can't replace {path:?}, it has no file name"))?;
    let mut temporary = OsString::from(name);
    temporary.push(".tmp");
    Ok(path.with_file_name(temporary))
}

/// Replaces the contents of `path` so that readers see either the old or the new contents,
/// never a partial write. The parent directory is created if needed.
pub async fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let temporary = temporary_path(path)?;
    trace!("Writing {} bytes to {temporary:?}", contents.len());

    let mut file = File::create(&temporary).await?;
    file.write_all(contents).await?;
    file.sync_all().await?;
    drop(file);

    if let Err(e) = tokio::fs::rename(&temporary, path).await {
        // Leftover temp files are harmless but confusing
        let _ = tokio::fs::remove_file(&temporary).await;
        return Err(e.into());
    }
    Ok(())
}

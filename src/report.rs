use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Persist an analysis report under `dir` as `<label>-<timestamp>.txt`,
/// creating the directory if needed. Returns the written path.
pub fn write_report(dir: &Path, label: &str, body: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
        .as_secs();

    let path = dir.join(format!("{}-{}.txt", label, timestamp));
    fs::write(&path, body)?;
    Ok(path)
}

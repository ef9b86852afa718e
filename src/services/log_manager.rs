// LogManager Service
// Retention cleanup and tail reading for the server log directory

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

pub const LOG_FILE_NAME: &str = "danceai-server.log";
pub const DEFAULT_RECENT_LINES: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("Failed to read log directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read log file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Path of the active log file inside `log_dir`
pub fn log_file_path(log_dir: &Path) -> PathBuf {
    log_dir.join(LOG_FILE_NAME)
}

/// Delete `.log` files older than the retention window. Zero keeps everything.
pub fn prune_logs(log_dir: &Path, retention_days: u32) -> Result<usize, LogError> {
    if retention_days == 0 || !log_dir.exists() {
        return Ok(0);
    }

    let window = Duration::from_secs(u64::from(retention_days) * 24 * 60 * 60);
    let cutoff = SystemTime::now()
        .checked_sub(window)
        .unwrap_or(SystemTime::UNIX_EPOCH);

    let removed = log_files(log_dir)?
        .into_iter()
        .filter(|(_, modified)| *modified < cutoff)
        .filter(|(path, _)| match fs::remove_file(path) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to remove old log {}: {e}", path.display());
                false
            }
        })
        .count();

    if removed > 0 {
        log::info!("Pruned {removed} log files older than {retention_days} days");
    }
    Ok(removed)
}

/// Last `max_lines` non-blank lines of the most recently written log file
pub fn read_recent_logs(log_dir: &Path, max_lines: usize) -> Result<Vec<String>, LogError> {
    if !log_dir.exists() {
        return Ok(Vec::new());
    }

    let latest = log_files(log_dir)?
        .into_iter()
        .max_by_key(|(_, modified)| *modified)
        .map(|(path, _)| path);

    let Some(path) = latest else {
        return Ok(Vec::new());
    };

    let bytes = fs::read(&path).map_err(|source| LogError::ReadFile {
        path: path.clone(),
        source,
    })?;
    let content = String::from_utf8_lossy(&bytes);
    let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(max_lines);
    Ok(lines[start..].iter().map(|l| l.to_string()).collect())
}

fn log_files(log_dir: &Path) -> Result<Vec<(PathBuf, SystemTime)>, LogError> {
    let entries = fs::read_dir(log_dir).map_err(|source| LogError::ReadDir {
        path: log_dir.to_path_buf(),
        source,
    })?;

    Ok(entries
        .flatten()
        .filter(|entry| entry.path().extension().and_then(|ext| ext.to_str()) == Some("log"))
        .map(|entry| {
            let modified = entry
                .metadata()
                .and_then(|metadata| metadata.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (entry.path(), modified)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_dir_is_empty() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("logs");
        assert_eq!(prune_logs(&missing, 30).unwrap(), 0);
        assert!(read_recent_logs(&missing, 10).unwrap().is_empty());
    }

    #[test]
    fn test_read_recent_logs_tails_and_skips_blank() {
        let dir = tempdir().unwrap();
        fs::write(log_file_path(dir.path()), "one\n\ntwo\n   \nthree\nfour\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored\n").unwrap();

        let lines = read_recent_logs(dir.path(), 2).unwrap();
        assert_eq!(lines, vec!["three", "four"]);
        assert_eq!(read_recent_logs(dir.path(), 100).unwrap().len(), 4);
    }

    #[test]
    fn test_read_recent_logs_ignores_non_log_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "not a log\n").unwrap();
        assert!(read_recent_logs(dir.path(), 10).unwrap().is_empty());
    }

    #[test]
    fn test_prune_keeps_fresh_files() {
        let dir = tempdir().unwrap();
        fs::write(log_file_path(dir.path()), "fresh\n").unwrap();

        assert_eq!(prune_logs(dir.path(), 30).unwrap(), 0);
        assert_eq!(prune_logs(dir.path(), 0).unwrap(), 0);
        assert!(log_file_path(dir.path()).exists());
    }
}

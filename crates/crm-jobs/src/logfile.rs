use std::path::Path;

use tokio::io::AsyncWriteExt;

use crate::JobError;

/// Append each line (newline-terminated) to `path`, creating the file if needed.
///
/// # Errors
///
/// Returns [`JobError::LogFile`] if the file cannot be opened or written.
pub async fn append_lines(path: &Path, lines: &[String]) -> Result<(), JobError> {
    let io_err = |source| JobError::LogFile {
        path: path.display().to_string(),
        source,
    };

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(io_err)?;

    let mut buf = String::new();
    for line in lines {
        buf.push_str(line);
        buf.push('\n');
    }
    file.write_all(buf.as_bytes()).await.map_err(io_err)?;
    file.flush().await.map_err(io_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn appends_without_truncating() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("log.txt");

        append_lines(&path, &["one".to_string()]).await.unwrap();
        append_lines(&path, &["two".to_string(), "three".to_string()])
            .await
            .unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(content, "one\ntwo\nthree\n");
    }

    #[tokio::test]
    async fn missing_directory_is_reported_with_path() {
        let err = append_lines(Path::new("/nonexistent-dir/log.txt"), &["x".to_string()])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent-dir/log.txt"));
    }
}

// curudroid-core/src/infrastructure/fs.rs

use crate::infrastructure::error::InfrastructureError;
use std::io::Write;
use std::path::Path;

/// Write content to a file atomically using a temporary file.
///
/// This function:
/// 1. Creates a temporary file in the same directory as the target path.
/// 2. Writes the content to the temporary file.
/// 3. Persists (renames) the temporary file to the target path.
///
/// This ensures that the target file is either fully written or not written at all,
/// preventing partial data corruption. Used for plans, execution reports, the
/// policy lock, and ledger recovery's genesis rewrite.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent).map_err(InfrastructureError::Io)?;

    let mut temp_file = tempfile::NamedTempFile::new_in(parent).map_err(InfrastructureError::Io)?;

    temp_file
        .write_all(content.as_ref())
        .map_err(InfrastructureError::Io)?;

    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}

/// Append a single line (newline-terminated) to a file, creating it if
/// absent. Used by the ledger and the observability decision log, both of
/// which are append-only by contract.
pub fn append_line<P: AsRef<Path>>(path: P, line: &str) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(InfrastructureError::Io)?;
    }

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(InfrastructureError::Io)?;

    file.write_all(line.as_bytes())
        .map_err(InfrastructureError::Io)?;
    file.write_all(b"\n").map_err(InfrastructureError::Io)?;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn atomic_write_creates_file() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("test.txt");
        atomic_write(&file_path, "Hello, World!")?;
        assert!(file_path.exists());
        assert_eq!(fs::read_to_string(file_path)?, "Hello, World!");
        Ok(())
    }

    #[test]
    fn atomic_write_overwrites_existing() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("test.txt");
        atomic_write(&file_path, "Initial")?;
        atomic_write(&file_path, "Updated")?;
        assert_eq!(fs::read_to_string(file_path)?, "Updated");
        Ok(())
    }

    #[test]
    fn append_line_accumulates_across_calls() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("ledger.ndjson");
        append_line(&file_path, "{\"a\":1}")?;
        append_line(&file_path, "{\"a\":2}")?;
        let content = fs::read_to_string(file_path)?;
        assert_eq!(content, "{\"a\":1}\n{\"a\":2}\n");
        Ok(())
    }
}

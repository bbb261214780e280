use std::path::{Path, PathBuf};

use anyhow::Context as _;

/// Create a target directory, parents included. Idempotent: an
/// already-existing directory is a no-op, not an error.
pub fn ensure_dir(path: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("create directory: {}", path.display()))
}

/// Whole-buffer write of a book text. The final path is only reported once
/// the write has returned without error.
pub fn write_text(path: &Path, content: &str) -> anyhow::Result<PathBuf> {
    std::fs::write(path, content)
        .with_context(|| format!("write text: {}", path.display()))?;

    Ok(path.to_path_buf())
}

/// Whole-buffer write of a cover image.
pub fn write_binary(path: &Path, bytes: &[u8]) -> anyhow::Result<PathBuf> {
    std::fs::write(path, bytes)
        .with_context(|| format!("write binary: {}", path.display()))?;

    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_dir_is_idempotent() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let dir = temp.path().join("books").join("nested");

        ensure_dir(&dir)?;
        ensure_dir(&dir)?;

        assert!(dir.is_dir());
        Ok(())
    }

    #[test]
    fn write_text_reports_the_path_it_wrote() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let path = temp.path().join("1.Book.txt");

        let reported = write_text(&path, "line one\nline two\n")?;

        assert_eq!(reported, path);
        assert_eq!(std::fs::read_to_string(&path)?, "line one\nline two\n");
        Ok(())
    }

    #[test]
    fn write_binary_round_trips_bytes() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let path = temp.path().join("1_Book.jpg");
        let bytes = [0xff_u8, 0xd8, 0xff, 0xe0, 0x00];

        write_binary(&path, &bytes)?;

        assert_eq!(std::fs::read(&path)?, bytes);
        Ok(())
    }

    #[test]
    fn write_into_a_missing_directory_fails() {
        let temp = tempfile::TempDir::new().expect("create temp dir");
        let path = temp.path().join("no-such-dir").join("1.Book.txt");

        assert!(write_text(&path, "text").is_err());
    }
}

use anyhow::{Result, Context};
use std::fs;
use std::path::Path;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::PipelineError;

// @module: File and directory utilities

// @const: Characters never allowed in a derived artifact name
static FORBIDDEN_NAME_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[\x00-\x1f"<>|?*]"#).unwrap()
});

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Remove a file, treating an already absent file as success
    pub fn remove_file_if_exists<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove file: {:?}", path)),
        }
    }
}

/// Reduce a caller-supplied display name to a safe terminal file name.
///
/// Strips any directory part regardless of separator convention and rejects
/// names that are empty or pure path traversal after cleaning. Callers derive
/// every artifact name from the result, so nothing escapes the output
/// directory.
pub fn sanitize_file_name(name: &str) -> Result<String, PipelineError> {
    let terminal = name.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned = FORBIDDEN_NAME_CHARS.replace_all(terminal, "").trim().to_string();

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        return Err(PipelineError::MissingInput(format!(
            "Unusable video file name: {:?}",
            name
        )));
    }

    Ok(cleaned)
}

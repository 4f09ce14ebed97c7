use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

// @module: File, path and file-name utilities

/// Longest sanitized title kept in an export file name
pub const MAX_STEM_CHARS: usize = 60;

/// Stem used when a title has no usable characters
pub const UNTITLED_STEM: &str = "untitled";

static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_-]+").unwrap());
static UNDERSCORE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"_{2,}").unwrap());

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
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
        fs::read_to_string(&path).with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Read and deserialize a JSON file
    pub fn read_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
        let content = Self::read_to_string(&path)?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse JSON file: {:?}", path.as_ref()))
    }

    /// Write bytes to a file, creating parent directories
    pub fn write_bytes<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
        if let Some(parent) = path.as_ref().parent().filter(|p| !p.as_os_str().is_empty()) {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content).with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    // @resolves: Storage key below a root directory, rejecting escapes
    pub fn join_key<P: AsRef<Path>>(root: P, key: &str) -> Result<PathBuf> {
        let mut path = root.as_ref().to_path_buf();
        for part in key.split('/').filter(|p| !p.is_empty()) {
            if part == "." || part == ".." {
                return Err(anyhow::anyhow!("Invalid storage key: {}", key));
            }
            path.push(part);
        }
        Ok(path)
    }
}

/// Reduce a title to `[A-Za-z0-9_-]`, collapsing runs and capping the length
pub fn sanitize_file_stem(title: &str) -> String {
    let replaced = UNSAFE_CHARS.replace_all(title.trim(), "_");
    let collapsed = UNDERSCORE_RUNS.replace_all(&replaced, "_");
    let stem: String = collapsed.trim_matches('_').chars().take(MAX_STEM_CHARS).collect();
    let stem = stem.trim_end_matches('_');

    if stem.is_empty() {
        UNTITLED_STEM.to_string()
    } else {
        stem.to_string()
    }
}

// @generates: Export file name `{stem}_{YYYYMMDDTHHMMSSmmmZ}_{tag}.{extension}`
pub fn export_file_name(title: &str, at: DateTime<Utc>, tag: &str, extension: &str) -> String {
    format!(
        "{}_{}_{}.{}",
        sanitize_file_stem(title),
        at.format("%Y%m%dT%H%M%S%3fZ"),
        tag,
        extension
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sanitizeFileStem_shouldKeepSafeCharacters() {
        assert_eq!(sanitize_file_stem("Soil Erosion: A Study!"), "Soil_Erosion_A_Study");
        assert_eq!(sanitize_file_stem("already_safe-name"), "already_safe-name");
        assert_eq!(sanitize_file_stem("a   __  b"), "a_b");
    }

    #[test]
    fn test_sanitizeFileStem_withNothingUsable_shouldBeUntitled() {
        assert_eq!(sanitize_file_stem(""), "untitled");
        assert_eq!(sanitize_file_stem("   ...   "), "untitled");
        assert_eq!(sanitize_file_stem("日本語"), "untitled");
    }

    #[test]
    fn test_sanitizeFileStem_shouldCapLength() {
        let stem = sanitize_file_stem(&"word ".repeat(40));
        assert!(stem.len() <= MAX_STEM_CHARS);
        assert!(!stem.ends_with('_'));
    }

    #[test]
    fn test_exportFileName_shouldAppendTimestampAndExtension() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap() + chrono::Duration::milliseconds(42);
        assert_eq!(
            export_file_name("My Report", at, "1a2b3c4d", "pdf"),
            "My_Report_20240305T140709042Z_1a2b3c4d.pdf"
        );
    }

    #[test]
    fn test_joinKey_shouldRejectTraversal() {
        let root = Path::new("/srv/storage");
        assert_eq!(
            FileManager::join_key(root, "exports/p1/a.pdf").unwrap(),
            PathBuf::from("/srv/storage/exports/p1/a.pdf")
        );
        assert!(FileManager::join_key(root, "exports/../../etc/passwd").is_err());
    }

    #[test]
    fn test_writeBytes_shouldCreateParents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/file.bin");

        FileManager::write_bytes(&path, b"data").unwrap();

        assert!(FileManager::file_exists(&path));
        assert_eq!(fs::read(&path).unwrap(), b"data");
    }
}

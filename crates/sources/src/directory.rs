//! Directory Source - vCard files on disk
//!
//! Reads every card file in a folder and hands back one raw record per card.
//!
//! ## Algorithm
//! 1. Check the configured path is an existing directory
//! 2. List files whose extension matches (case-insensitive), optionally
//!    descending into subdirectories
//! 3. Sort paths so the record order is stable between cycles
//! 4. Read each file and split it into individual `BEGIN:VCARD` blocks
//!
//! A file that cannot be read is logged and skipped; only a missing or
//! unlistable directory fails the whole fetch.

use crate::error::{Result, SourceError};
use crate::traits::SourceCollector;
use contacts::split_records;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

/// Scans a directory for vCard files
#[derive(Debug, Clone)]
pub struct DirectoryCollector {
    directory: PathBuf,

    /// File extension to pick up, without the dot
    extension: String,

    /// Descend into subdirectories
    recursive: bool,

    name: String,
}

impl DirectoryCollector {
    /// Create a collector for `directory` reading `*.vcf`, non-recursive
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        let directory = directory.into();
        let name = format!("directory:{}", directory.display());
        Self {
            directory,
            extension: "vcf".to_string(),
            recursive: false,
            name,
        }
    }

    /// Configure the file extension (default: "vcf")
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    /// Configure whether subdirectories are scanned (default: false)
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension))
    }

    /// Card files under the directory, sorted by path
    fn card_files(&self) -> Result<Vec<PathBuf>> {
        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.directory).min_depth(1).max_depth(max_depth) {
            let entry = match entry {
                Ok(entry) => entry,
                // The root itself failing means the source is unusable
                Err(e) if e.depth() == 0 => return Err(SourceError::Walk(e.to_string())),
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {}", self.directory.display(), e);
                    continue;
                }
            };
            if entry.file_type().is_file() && self.matches_extension(entry.path()) {
                files.push(entry.into_path());
            }
        }

        files.sort();
        Ok(files)
    }
}

impl SourceCollector for DirectoryCollector {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self), fields(directory = %self.directory.display()))]
    fn fetch_raw_records(&self) -> Result<Vec<String>> {
        let metadata = fs::metadata(&self.directory).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SourceError::NotFound {
                path: self.directory.clone(),
            },
            _ => SourceError::Io(e),
        })?;
        if !metadata.is_dir() {
            return Err(SourceError::NotADirectory {
                path: self.directory.clone(),
            });
        }

        let files = self.card_files()?;
        let mut records = Vec::new();

        for path in &files {
            let bytes = match fs::read(path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Skipping unreadable card file {}: {}", path.display(), e);
                    continue;
                }
            };
            let text = String::from_utf8_lossy(&bytes);
            let cards = split_records(&text);
            debug!("{} card(s) in {}", cards.len(), path.display());
            records.extend(cards);
        }

        debug!("Read {} raw records from {} file(s)", records.len(), files.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn card(given: &str) -> String {
        format!("BEGIN:VCARD\nVERSION:3.0\nN:Doe;{given};;;\nEND:VCARD\n")
    }

    #[test]
    fn test_reads_matching_files_in_path_order() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.vcf"), card("Bea")).unwrap();
        fs::write(dir.path().join("a.VCF"), card("Al")).unwrap();
        fs::write(dir.path().join("notes.txt"), "not a card").unwrap();

        let records = DirectoryCollector::new(dir.path()).fetch_raw_records().unwrap();

        assert_eq!(records, vec![card("Al"), card("Bea")]);
    }

    #[test]
    fn test_multi_card_files_are_split() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("book.vcf"), format!("{}{}", card("One"), card("Two"))).unwrap();

        let records = DirectoryCollector::new(dir.path()).fetch_raw_records().unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_recursion_is_opt_in() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("family")).unwrap();
        fs::write(dir.path().join("family").join("mum.vcf"), card("Mum")).unwrap();
        fs::write(dir.path().join("me.vcf"), card("Me")).unwrap();

        let flat = DirectoryCollector::new(dir.path());
        assert_eq!(flat.fetch_raw_records().unwrap().len(), 1);

        let deep = DirectoryCollector::new(dir.path()).with_recursive(true);
        assert_eq!(deep.fetch_raw_records().unwrap().len(), 2);
    }

    #[test]
    fn test_custom_extension() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.vcard"), card("Al")).unwrap();
        fs::write(dir.path().join("b.vcf"), card("Bea")).unwrap();

        let collector = DirectoryCollector::new(dir.path()).with_extension(".vcard");
        assert_eq!(collector.fetch_raw_records().unwrap(), vec![card("Al")]);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");

        let err = DirectoryCollector::new(&missing).fetch_raw_records().unwrap_err();
        assert!(matches!(err, SourceError::NotFound { .. }));
    }

    #[test]
    fn test_file_path_is_not_a_directory() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.vcf");
        fs::write(&file, card("Al")).unwrap();

        let err = DirectoryCollector::new(&file).fetch_raw_records().unwrap_err();
        assert!(matches!(err, SourceError::NotADirectory { .. }));
    }

    #[test]
    fn test_empty_directory_yields_no_records() {
        let dir = TempDir::new().unwrap();
        let records = DirectoryCollector::new(dir.path()).fetch_raw_records().unwrap();
        assert!(records.is_empty());
    }
}

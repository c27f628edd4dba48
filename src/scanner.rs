use anyhow::Result;
use log::warn;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions of cached analysis files
const ANALYSIS_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// Directories that never hold analysis caches
const SKIPPED_DIRS: [&str; 2] = ["vendor", "node_modules"];

/// File scanner for collecting cached validation analyses.
///
/// The analyzer writes one JSON or YAML file per form request. The
/// `FileScanner` walks a cache directory to find them, skipping hidden
/// directories (those starting with `.`) as well as `vendor` and
/// `node_modules`. A path that points at a single file scans to that file.
///
/// # Example
///
/// ```no_run
/// use laravel_openapi_rules::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./storage/app/openapi-cache"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} analysis files", result.analysis_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
}

/// Result of directory scanning operation.
///
/// Contains the list of discovered analysis files and any warnings encountered during scanning.
pub struct ScanResult {
    /// Paths of all discovered `.json`, `.yaml` and `.yml` files, sorted
    pub analysis_files: Vec<PathBuf>,
    /// Warning messages for any issues encountered (e.g., inaccessible directories)
    pub warnings: Vec<String>,
}

impl FileScanner {
    /// Creates a new `FileScanner` for the specified root directory or file.
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Whether `path` has one of the analysis cache extensions
    pub fn is_analysis_file(path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ANALYSIS_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
    }

    /// Scans the directory tree and collects all analysis files.
    ///
    /// If any directories or files cannot be accessed, warnings are logged and added to
    /// the result, but scanning continues. Files are returned sorted by path so that
    /// output is stable between runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the root path cannot be accessed.
    pub fn scan(&self) -> Result<ScanResult> {
        let mut analysis_files = Vec::new();
        let mut warnings = Vec::new();

        if self.root_path.is_file() {
            analysis_files.push(self.root_path.clone());
            return Ok(ScanResult {
                analysis_files,
                warnings,
            });
        }

        for entry in WalkDir::new(&self.root_path)
            .into_iter()
            .filter_entry(|e| {
                // Don't filter the root directory itself
                if e.path() == self.root_path {
                    return true;
                }

                if !e.file_type().is_dir() {
                    return true;
                }

                let file_name = e.file_name().to_string_lossy();
                let is_hidden = file_name.starts_with('.');
                let is_skipped = SKIPPED_DIRS.iter().any(|dir| *dir == file_name);

                !is_hidden && !is_skipped
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && Self::is_analysis_file(path) {
                        analysis_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    // Record warning for inaccessible directories/files
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        analysis_files.sort();

        Ok(ScanResult {
            analysis_files,
            warnings,
        })
    }
}

//! Migration files and their discovery on disk.

use crate::order::extract_referenced_tables;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// File extension a migration must carry to be picked up.
pub const MIGRATION_EXTENSION: &str = "sql";

/// A single SQL script representing one incremental schema change.
///
/// The filename is the stable identifier: it is what gets recorded in the
/// tracking table and what orders migrations lexicographically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    name: String,
    path: PathBuf,
    content: String,
    referenced_tables: BTreeSet<String>,
}

impl MigrationFile {
    /// Creates a migration from its filename and SQL text.
    ///
    /// Referenced tables are parsed from the content immediately.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        let name = name.into();
        let path = PathBuf::from(&name);
        Self::with_path(name, path, content)
    }

    /// Creates a migration that remembers where it was loaded from.
    pub fn with_path(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        content: impl Into<String>,
    ) -> Self {
        let content = content.into();
        let referenced_tables = extract_referenced_tables(&content);
        Self {
            name: name.into(),
            path: path.into(),
            content,
            referenced_tables,
        }
    }

    /// The filename, e.g. `001_init.sql`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the file was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw SQL text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Table names this file points at through `REFERENCES` clauses.
    pub fn referenced_tables(&self) -> &BTreeSet<String> {
        &self.referenced_tables
    }
}

/// Outcome of looking for migrations in a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discovery {
    /// The directory does not exist. Not an error: the run is a no-op.
    DirectoryMissing(PathBuf),
    /// The directory exists; holds every `.sql` file found (possibly none),
    /// unordered.
    Found(Vec<MigrationFile>),
}

impl Discovery {
    /// Consumes the discovery, yielding the files found (empty when the
    /// directory was missing).
    pub fn into_files(self) -> Vec<MigrationFile> {
        match self {
            Discovery::DirectoryMissing(_) => Vec::new(),
            Discovery::Found(files) => files,
        }
    }
}

/// A directory entry that could not be read during discovery.
#[derive(Debug, thiserror::Error)]
#[error("Failed to read {}: {source}", .path.display())]
pub struct DiscoveryError {
    /// The directory or file being read.
    pub path: PathBuf,
    /// The underlying I/O error.
    #[source]
    pub source: std::io::Error,
}

impl DiscoveryError {
    fn new(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }
}

/// Lists the migration files in `directory`, without recursing.
///
/// Only regular files whose extension is exactly `sql` are considered. Each
/// file is read eagerly so later ordering and application never touch the
/// filesystem again. A path that exists but is not a directory holds no
/// migrations.
pub fn discover_migration_files(directory: &Path) -> Result<Discovery, DiscoveryError> {
    let entries = match std::fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::warn!("Directory not found: {}", directory.display());
            return Ok(Discovery::DirectoryMissing(directory.to_path_buf()));
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotADirectory => {
            log::warn!("Not a directory: {}", directory.display());
            log::info!("No migrations found");
            return Ok(Discovery::Found(Vec::new()));
        }
        Err(e) => return Err(DiscoveryError::new(directory, e)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| DiscoveryError::new(directory, e))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|e| DiscoveryError::new(&path, e))?;
        if !file_type.is_file() {
            continue;
        }
        if path.extension().and_then(|ext| ext.to_str()) != Some(MIGRATION_EXTENSION) {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_owned) else {
            log::warn!("Skipping migration with non UTF-8 name: {}", path.display());
            continue;
        };
        let content =
            std::fs::read_to_string(&path).map_err(|e| DiscoveryError::new(&path, e))?;
        files.push(MigrationFile::with_path(name, path, content));
    }

    if files.is_empty() {
        log::info!("No migrations found");
    }

    Ok(Discovery::Found(files))
}

//! Source providers
//!
//! The compiler never touches the file system directly. Every read of a root
//! document, an included file or an embedded file goes through a
//! [`SourceProvider`], which lets hosts compile from memory, from a virtual
//! file system, or from disk via [`FsSourceProvider`].

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Failure to read a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    NotFound(PathBuf),
    PermissionDenied(PathBuf),
    IsADirectory(PathBuf),
    Io { path: PathBuf, message: String },
}

impl SourceError {
    pub fn from_io(path: &Path, error: &io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => SourceError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => SourceError::PermissionDenied(path.to_path_buf()),
            _ => SourceError::Io {
                path: path.to_path_buf(),
                message: error.to_string(),
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SourceError::NotFound(_))
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::NotFound(path) => write!(f, "File not found: {}", path.display()),
            SourceError::PermissionDenied(path) => {
                write!(f, "You do not have permission to access: {}", path.display())
            }
            SourceError::IsADirectory(path) => write!(f, "Is a directory: {}", path.display()),
            SourceError::Io { message, .. } => write!(f, "OS error: {}", message),
        }
    }
}

impl std::error::Error for SourceError {}

/// Read access to source files
///
/// Implementations must be safe to share between concurrent compile calls
/// if the host compiles on several threads; the compiler itself only reads.
pub trait SourceProvider {
    fn read(&self, path: &Path) -> Result<String, SourceError>;

    /// Stable identity of a file, used to detect include cycles
    fn canonicalize(&self, path: &Path) -> PathBuf {
        normalize_lexically(path)
    }
}

impl<P: SourceProvider + ?Sized> SourceProvider for &P {
    fn read(&self, path: &Path) -> Result<String, SourceError> {
        (**self).read(path)
    }

    fn canonicalize(&self, path: &Path) -> PathBuf {
        (**self).canonicalize(path)
    }
}

/// Reads sources from the local file system
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSourceProvider;

impl SourceProvider for FsSourceProvider {
    fn read(&self, path: &Path) -> Result<String, SourceError> {
        if path.is_dir() {
            return Err(SourceError::IsADirectory(path.to_path_buf()));
        }
        fs::read_to_string(path).map_err(|e| SourceError::from_io(path, &e))
    }

    fn canonicalize(&self, path: &Path) -> PathBuf {
        fs::canonicalize(path).unwrap_or_else(|_| normalize_lexically(path))
    }
}

/// In-memory sources keyed by normalized path
#[derive(Debug, Clone, Default)]
pub struct MemorySourceProvider {
    files: BTreeMap<PathBuf, String>,
}

impl MemorySourceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl AsRef<Path>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, contents: impl Into<String>) {
        self.files
            .insert(normalize_lexically(path.as_ref()), contents.into());
    }
}

impl SourceProvider for MemorySourceProvider {
    fn read(&self, path: &Path) -> Result<String, SourceError> {
        self.files
            .get(&normalize_lexically(path))
            .cloned()
            .ok_or_else(|| SourceError::NotFound(path.to_path_buf()))
    }
}

/// Resolve `.` and `..` components without touching the file system
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Find and read `target` as referenced from `current_file`
///
/// Absolute targets are read as written. Relative targets are tried against
/// the including file's directory first and then each search path in order.
/// A missing candidate moves on to the next one; any other failure stops the
/// search. Returns the path that was read along with its contents.
pub fn locate<P: SourceProvider + ?Sized>(
    provider: &P,
    target: &str,
    current_file: &Path,
    search_paths: &[PathBuf],
) -> Result<(PathBuf, String), SourceError> {
    let target_path = Path::new(target);
    let candidates: Vec<PathBuf> = if target_path.is_absolute() {
        vec![target_path.to_path_buf()]
    } else {
        let base = current_file.parent().unwrap_or_else(|| Path::new(""));
        std::iter::once(base.join(target_path))
            .chain(search_paths.iter().map(|dir| dir.join(target_path)))
            .collect()
    };

    let mut first_missing = None;
    for candidate in candidates {
        match provider.read(&candidate) {
            Ok(text) => return Ok((candidate, text)),
            Err(error) if error.is_not_found() => {
                first_missing.get_or_insert(error);
            }
            Err(error) => return Err(error),
        }
    }

    Err(first_missing.unwrap_or_else(|| SourceError::NotFound(target_path.to_path_buf())))
}

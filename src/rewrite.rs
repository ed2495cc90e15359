// src/rewrite.rs
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

#[derive(Debug)]
pub enum RewriteError {
    Io(io::Error),
    MarkerNotFound(String),
    MissingNewline(String),
}

impl fmt::Display for RewriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {}", err),
            Self::MarkerNotFound(marker) => {
                write!(f, "no occurrence of {:?} in file contents", marker)
            }
            Self::MissingNewline(tail) => {
                write!(f, "no newline at the end of {:?}", tail)
            }
        }
    }
}

impl std::error::Error for RewriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for RewriteError {
    fn from(err: io::Error) -> Self {
        RewriteError::Io(err)
    }
}

/// Inserts `new_content` on the line after the last occurrence of `marker`,
/// rewriting the file at `path` in place. The write is destructive and
/// non-atomic; the file keeps mode 0644 on Unix.
pub fn insert_after_marker<P: AsRef<Path>>(
    path: P,
    marker: &str,
    new_content: &str,
) -> Result<(), RewriteError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let updated = splice_after_marker(&contents, marker, new_content)?;

    fs::write(path, updated)?;
    #[cfg(unix)]
    fs::set_permissions(path, fs::Permissions::from_mode(0o644))?;
    Ok(())
}

// Pure splice over the contents; knows nothing about the file's syntax. The
// caller picks a marker distinctive enough that its last occurrence is the
// right anchor.
fn splice_after_marker(
    contents: &str,
    marker: &str,
    new_content: &str,
) -> Result<String, RewriteError> {
    let marker_idx = contents
        .rfind(marker)
        .ok_or_else(|| RewriteError::MarkerNotFound(marker.to_string()))?;

    let newline_offset = contents[marker_idx..]
        .find('\n')
        .ok_or_else(|| RewriteError::MissingNewline(contents[marker_idx..].to_string()))?;

    let at = marker_idx + newline_offset + 1;
    Ok(format!(
        "{}{}{}",
        &contents[..at],
        new_content,
        &contents[at..]
    ))
}

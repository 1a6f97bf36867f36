//! Origin parsing for touched-file URIs.
//!
//! Supports `jar:file:<archive>!/<member>` (archive member), `file:<path>`
//! and bare paths (plain disk).

use std::path::{Path, PathBuf};

use capsule_common::constants::{ARCHIVE_MEMBER_SEPARATOR, ARCHIVE_SCHEME, FILE_SCHEME};
use capsule_common::error::{CapsuleError, Phase, Result};

/// Where a touched file's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// A member of a dependency archive.
    Archive {
        /// Location of the archive on disk.
        archive: PathBuf,
        /// In-archive path, always starting with `/`.
        member: String,
    },
    /// A plain file on disk.
    Disk(PathBuf),
}

impl Origin {
    /// Returns the on-disk file the content lives in: the archive for
    /// archive members, the file itself otherwise.
    #[must_use]
    pub fn container(&self) -> &Path {
        match self {
            Self::Archive { archive, .. } => archive,
            Self::Disk(path) => path,
        }
    }
}

/// Parses the origin of a touched-file URI.
///
/// # Errors
///
/// Returns an extraction error for the classify phase if the scheme is not
/// supported or an archive URI lacks its member part.
pub fn parse(uri: &str) -> Result<Origin> {
    match scheme_of(uri) {
        None => Ok(Origin::Disk(PathBuf::from(uri))),
        Some((scheme, rest)) if scheme == FILE_SCHEME => Ok(Origin::Disk(file_path(rest))),
        Some((scheme, rest)) if scheme == ARCHIVE_SCHEME => {
            let (archive, member) = rest
                .split_once(ARCHIVE_MEMBER_SEPARATOR)
                .ok_or_else(|| {
                    CapsuleError::extraction(Phase::Classify, uri, "archive URI has no member path")
                })?;
            let archive = match scheme_of(archive) {
                Some((inner, path)) if inner == FILE_SCHEME => file_path(path),
                None => PathBuf::from(archive),
                Some((inner, _)) => {
                    return Err(CapsuleError::extraction(
                        Phase::Classify,
                        uri,
                        format!("unsupported archive location scheme '{inner}'"),
                    ));
                }
            };
            let member = if member.starts_with('/') {
                member.to_string()
            } else {
                format!("/{member}")
            };
            Ok(Origin::Archive { archive, member })
        }
        Some((scheme, _)) => Err(CapsuleError::extraction(
            Phase::Classify,
            uri,
            format!("unsupported URI scheme '{scheme}'"),
        )),
    }
}

/// Splits `scheme:rest` when the prefix is a plausible URI scheme.
fn scheme_of(uri: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = uri.split_once(':')?;
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        && scheme.len() > 1;
    valid.then_some((scheme, rest))
}

/// Strips the authority marker of `file://` forms.
fn file_path(rest: &str) -> PathBuf {
    PathBuf::from(rest.strip_prefix("//").unwrap_or(rest))
}

/// Makes `path` relative to `root` when it lies beneath it; returns `.` for
/// the root itself and `path` unchanged otherwise.
#[must_use]
pub fn try_make_relative(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(relative) if relative.as_os_str().is_empty() => ".".to_string(),
        Ok(relative) => relative.display().to_string(),
        Err(_) => path.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_archive_member() {
        let origin = parse("jar:file:/repo/lib/guava.jar!/com/google/Foo.class").expect("parse");
        assert_eq!(
            origin,
            Origin::Archive {
                archive: PathBuf::from("/repo/lib/guava.jar"),
                member: "/com/google/Foo.class".into(),
            }
        );
        assert_eq!(origin.container(), Path::new("/repo/lib/guava.jar"));
    }

    #[test]
    fn parse_archive_with_authority_form() {
        let origin = parse("jar:file:///repo/a.jar!/x/Y.class").expect("parse");
        assert!(matches!(origin, Origin::Archive { ref archive, .. } if archive == Path::new("/repo/a.jar")));
    }

    #[test]
    fn parse_disk_forms() {
        assert_eq!(
            parse("file:/repo/src/A.java").expect("parse"),
            Origin::Disk(PathBuf::from("/repo/src/A.java"))
        );
        assert_eq!(
            parse("file:///repo/src/A.java").expect("parse"),
            Origin::Disk(PathBuf::from("/repo/src/A.java"))
        );
        assert_eq!(
            parse("/repo/src/A.java").expect("parse"),
            Origin::Disk(PathBuf::from("/repo/src/A.java"))
        );
    }

    #[test]
    fn parse_rejects_unknown_scheme() {
        let err = parse("http://example.com/A.java").unwrap_err();
        assert_eq!(err.phase(), Some(Phase::Classify));
        assert!(err.to_string().contains("http://example.com/A.java"));
    }

    #[test]
    fn parse_rejects_archive_without_member() {
        assert!(parse("jar:file:/repo/a.jar").is_err());
    }

    #[test]
    fn relative_paths() {
        let root = Path::new("/repo");
        assert_eq!(try_make_relative(root, Path::new("/repo/src/A.java")), "src/A.java");
        assert_eq!(try_make_relative(root, Path::new("/repo")), ".");
        assert_eq!(try_make_relative(root, Path::new("/other/A.java")), "/other/A.java");
        assert_eq!(try_make_relative(root, Path::new("/repository/A.java")), "/repository/A.java");
    }
}

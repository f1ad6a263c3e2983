//! Common functionality and types.

use anyhow::{Context, Result};
use console::Emoji;
use std::fs::Metadata;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub static STARTING: Emoji = Emoji("🚀 ", "");
pub static SUCCESS: Emoji = Emoji("✅ ", "");

/// Checks if path exists and metadata matches the given predicate.
pub async fn path_exists_and(
    path: impl AsRef<Path>,
    and: impl FnOnce(Metadata) -> bool,
) -> Result<bool> {
    tokio::fs::metadata(path.as_ref())
        .await
        .map(and)
        .or_else(|error| {
            if error.kind() == ErrorKind::NotFound {
                Ok(false)
            } else {
                Err(error)
            }
        })
        .with_context(|| {
            format!(
                "error checking for existence of path at {:?}",
                path.as_ref()
            )
        })
}

/// Search for the first of the given file names, in `dir` and then in each of its ancestors.
///
/// Within one directory, names are checked in the order given.
pub async fn find_up(dir: &Path, names: &[&str]) -> Result<Option<PathBuf>> {
    for dir in dir.ancestors() {
        for name in names {
            let candidate = dir.join(name);
            if path_exists_and(&candidate, |meta| meta.is_file()).await? {
                return Ok(Some(candidate));
            }
        }
    }

    Ok(None)
}

/// Normalize a path's separators to forward slashes.
///
/// Paths end up inside generated source code, which must not contain platform specific escape
/// sequences.
pub fn normalize_path_sep(path: impl AsRef<str>) -> String {
    path.as_ref().replace('\\', "/")
}

/// Join a file name to a directory, using forward slashes regardless of the host platform.
pub fn join_href(dir: &Path, name: &str) -> String {
    normalize_path_sep(dir.join(name).to_string_lossy())
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_normalize_path_sep() {
        assert_eq!(
            normalize_path_sep(r"C:\project\pages"),
            "C:/project/pages"
        );
        assert_eq!(normalize_path_sep("/project/pages"), "/project/pages");
    }

    #[test]
    fn test_join_href() {
        assert_eq!(
            join_href(Path::new(r"C:\project\.next"), "build-manifest.json"),
            "C:/project/.next/build-manifest.json"
        );
    }

    #[tokio::test]
    async fn finds_in_ancestors() {
        let root = tempdir().expect("should be able to create temp directory");
        let nested = root.path().join("a").join("b");
        fs::create_dir_all(&nested).expect("should create directories");
        fs::write(root.path().join("target.toml"), "").expect("should write file");

        let found = find_up(&nested, &["missing.toml", "target.toml"])
            .await
            .expect("must not fail");
        assert_eq!(found, Some(root.path().join("target.toml")));

        let found = find_up(&nested, &["missing.toml"])
            .await
            .expect("must not fail");
        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn ignores_directories() {
        let root = tempdir().expect("should be able to create temp directory");
        fs::create_dir_all(root.path().join("target.toml")).expect("should create directory");

        let found = find_up(root.path(), &["target.toml"])
            .await
            .expect("must not fail");
        assert_eq!(found, None);
    }
}

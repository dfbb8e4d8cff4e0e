//! Static file resolution — the fallback when no route matches.
//!
//! Files are served from the `Public` directory under the configured work
//! directory: a request for `/css/site.css` resolves against
//! `<work_dir>/Public/css/site.css`.
//!
//! The three-way [`Resolved`] answer matters: the dispatcher warns on a file
//! that *exists but cannot be read* and stays silent on a plain miss, so the
//! two must never be conflated here.

use std::io;
use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use tokio::fs;

/// Directory under the work directory that static files are served from.
const PUBLIC_DIR: &str = "Public";

/// The outcome of a static file lookup.
pub enum Resolved {
    /// Nothing at the computed path.
    NotFound,
    /// Something is at the path but it could not be read as a file
    /// (permissions, it is a directory, …).
    Unreadable(io::Error),
    /// The file's raw bytes.
    File(Bytes),
}

/// Resolves request paths against `<work_dir>/Public`.
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    pub fn new(work_dir: impl AsRef<Path>) -> Self {
        Self { root: work_dir.as_ref().join(PUBLIC_DIR) }
    }

    /// Looks up `request_path` under the public root.
    ///
    /// Paths with `..` components never touch the filesystem — they resolve
    /// to [`Resolved::NotFound`], so a request cannot escape the public root.
    pub async fn resolve(&self, request_path: &str) -> Resolved {
        let Some(relative) = sanitize(request_path) else {
            return Resolved::NotFound;
        };
        let path = self.root.join(relative);

        match fs::metadata(&path).await {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Resolved::NotFound,
            Err(e) => Resolved::Unreadable(e),
            Ok(meta) if !meta.is_file() => Resolved::Unreadable(io::Error::new(
                io::ErrorKind::IsADirectory,
                "not a regular file",
            )),
            Ok(_) => match fs::read(&path).await {
                Ok(bytes) => Resolved::File(Bytes::from(bytes)),
                Err(e) => Resolved::Unreadable(e),
            },
        }
    }
}

/// Reduces a request path to a relative path of plain components.
///
/// Rejects (returns `None`) anything containing a `..` component, and yields
/// `None` for paths with nothing left after stripping separators — `/` on its
/// own is not a file.
fn sanitize(request_path: &str) -> Option<PathBuf> {
    let mut clean = PathBuf::new();
    for component in Path::new(request_path.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            // ParentDir escapes the root; Prefix/RootDir would restart it.
            Component::ParentDir | Component::Prefix(_) | Component::RootDir => return None,
        }
    }
    if clean.as_os_str().is_empty() { None } else { Some(clean) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn public_root(dir: &TempDir) -> PathBuf {
        let public = dir.path().join(PUBLIC_DIR);
        std::fs::create_dir(&public).unwrap();
        public
    }

    #[tokio::test]
    async fn resolves_file_bytes_exactly() {
        let dir = TempDir::new().unwrap();
        let content: &[u8] = b"body { color: red }\n\xff\xfe";
        std::fs::write(public_root(&dir).join("site.css"), content).unwrap();

        let files = StaticFiles::new(dir.path());
        match files.resolve("/site.css").await {
            Resolved::File(bytes) => assert_eq!(&bytes[..], content),
            _ => panic!("expected file"),
        }
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        public_root(&dir);

        let files = StaticFiles::new(dir.path());
        assert!(matches!(files.resolve("/nope.txt").await, Resolved::NotFound));
    }

    #[tokio::test]
    async fn directory_is_unreadable_not_missing() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(public_root(&dir).join("assets")).unwrap();

        let files = StaticFiles::new(dir.path());
        assert!(matches!(files.resolve("/assets").await, Resolved::Unreadable(_)));
    }

    #[tokio::test]
    async fn parent_components_cannot_escape_the_root() {
        let dir = TempDir::new().unwrap();
        public_root(&dir);
        std::fs::write(dir.path().join("secret.txt"), b"secret").unwrap();

        let files = StaticFiles::new(dir.path());
        assert!(matches!(files.resolve("/../secret.txt").await, Resolved::NotFound));
        assert!(matches!(files.resolve("/a/../../secret.txt").await, Resolved::NotFound));
    }

    #[tokio::test]
    async fn bare_slash_is_not_a_file() {
        let dir = TempDir::new().unwrap();
        public_root(&dir);

        let files = StaticFiles::new(dir.path());
        assert!(matches!(files.resolve("/").await, Resolved::NotFound));
    }
}

use anyhow::Context;
use anyhow::Result;
use std::path::Path;
use std::path::PathBuf;

const BINARY_STEM: &str = "defitestprogram";

/// Where compiled programs are written. Either a temporary directory that's deleted when we're
/// done, or a directory the user asked for.
pub(crate) enum BuildDir {
    Owned(tempfile::TempDir),
    Borrowed(PathBuf),
}

impl BuildDir {
    pub(crate) fn new(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            std::fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory `{}`", path.display()))?;
            Ok(BuildDir::Borrowed(path.to_owned()))
        } else {
            Ok(BuildDir::Owned(
                tempfile::Builder::new()
                    .prefix("defi")
                    .tempdir()
                    .context("Failed to create temporary build directory")?,
            ))
        }
    }

    pub(crate) fn path(&self) -> &Path {
        match self {
            BuildDir::Owned(t) => t.path(),
            BuildDir::Borrowed(t) => t,
        }
    }

    /// Returns the path that the compiled program gets written to.
    pub(crate) fn binary_path(&self) -> PathBuf {
        self.path()
            .join(format!("{BINARY_STEM}{}", std::env::consts::EXE_SUFFIX))
    }
}

#[test]
fn test_borrowed_build_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("a").join("b");
    let build_dir = BuildDir::new(Some(&dir)).unwrap();
    assert!(dir.is_dir());
    assert_eq!(build_dir.binary_path().parent(), Some(dir.as_path()));
    drop(build_dir);
    assert!(dir.is_dir());
}

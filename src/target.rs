//! Works out which source file should be run, given a file, a directory or a glob pattern.

use crate::config::Languages;
use anyhow::Context;
use anyhow::Result;
use glob::Pattern;
use std::fmt::Display;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;

#[derive(Debug, Clone)]
pub(crate) enum WatchSpec {
    File(PathBuf),
    Directory {
        dir: PathBuf,
        /// Only files whose names match are considered. If absent, any file with a supported
        /// extension is.
        pattern: Option<Pattern>,
    },
}

impl WatchSpec {
    pub(crate) fn parse(input: &str) -> Result<Self> {
        let input = if input.is_empty() { "." } else { input };
        let path = Path::new(input);
        if input.contains(['*', '?', '[']) {
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_owned(),
                _ => PathBuf::from("."),
            };
            let name = path
                .file_name()
                .and_then(|name| name.to_str())
                .with_context(|| format!("Invalid pattern `{input}`"))?;
            let pattern =
                Pattern::new(name).with_context(|| format!("Invalid pattern `{input}`"))?;
            return Ok(WatchSpec::Directory {
                dir,
                pattern: Some(pattern),
            });
        }
        let metadata =
            std::fs::metadata(path).with_context(|| format!("Failed to access `{input}`"))?;
        if metadata.is_dir() {
            Ok(WatchSpec::Directory {
                dir: path.to_owned(),
                pattern: None,
            })
        } else {
            Ok(WatchSpec::File(path.to_owned()))
        }
    }

    /// Returns the file that should be run, together with its modification time. If there are
    /// multiple candidates, the most recently modified is selected. Returns None if nothing
    /// matches.
    pub(crate) fn resolve_latest(
        &self,
        languages: Languages,
    ) -> Result<Option<(PathBuf, SystemTime)>> {
        match self {
            WatchSpec::File(path) => {
                if !path.exists() {
                    return Ok(None);
                }
                Ok(Some((path.clone(), crate::fs::modification_time(path)?)))
            }
            WatchSpec::Directory { dir, pattern } => {
                let mut latest: Option<(PathBuf, SystemTime)> = None;
                let entries = std::fs::read_dir(dir)
                    .with_context(|| format!("Failed to read directory `{}`", dir.display()))?;
                for entry in entries {
                    let entry = entry?;
                    if entry.file_type()?.is_dir() {
                        continue;
                    }
                    let path = entry.path();
                    let matches = match pattern {
                        Some(pattern) => pattern.matches(&entry.file_name().to_string_lossy()),
                        None => languages.is_supported(&path),
                    };
                    if !matches {
                        continue;
                    }
                    let modified = crate::fs::modification_time(&path)?;
                    if latest
                        .as_ref()
                        .map(|(_, latest_time)| modified > *latest_time)
                        .unwrap_or(true)
                    {
                        latest = Some((path, modified));
                    }
                }
                Ok(latest)
            }
        }
    }

    /// Returns an object that when displayed shows what's being watched.
    pub(crate) fn display_base(&self) -> impl Display + '_ {
        DisplayBase(self)
    }
}

struct DisplayBase<'a>(&'a WatchSpec);

impl Display for DisplayBase<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            WatchSpec::File(path) => write!(f, "{}", path.display()),
            WatchSpec::Directory {
                dir,
                pattern: Some(pattern),
            } => write!(f, "{}", dir.join(pattern.as_str()).display()),
            WatchSpec::Directory { dir, pattern: None } => write!(f, "{}", dir.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::time::Duration;

    fn touch(path: &Path, age_secs: u64) {
        std::fs::write(path, "").unwrap();
        let file = std::fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(age_secs))
            .unwrap();
    }

    fn latest_name(spec: &WatchSpec) -> Option<String> {
        let config = Config::default();
        spec.resolve_latest(config.languages())
            .unwrap()
            .map(|(path, _)| path.file_name().unwrap().to_string_lossy().into_owned())
    }

    #[test]
    fn directory_picks_newest_supported_file() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("old.cpp"), 100);
        touch(&dir.path().join("new.cpp"), 10);
        touch(&dir.path().join("newest.txt"), 0);
        std::fs::create_dir(dir.path().join("sub.cpp")).unwrap();
        let spec = WatchSpec::parse(dir.path().to_str().unwrap()).unwrap();
        assert!(matches!(spec, WatchSpec::Directory { pattern: None, .. }));
        assert_eq!(latest_name(&spec).as_deref(), Some("new.cpp"));
    }

    #[test]
    fn glob_honours_pattern() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a1.cpp"), 50);
        touch(&dir.path().join("a2.cpp"), 20);
        touch(&dir.path().join("b.cpp"), 0);
        let input = format!("{}/a*.cpp", dir.path().display());
        let spec = WatchSpec::parse(&input).unwrap();
        assert_eq!(latest_name(&spec).as_deref(), Some("a2.cpp"));
        assert_eq!(spec.display_base().to_string(), input);
    }

    #[test]
    fn glob_without_directory() {
        let spec = WatchSpec::parse("*.cpp").unwrap();
        let WatchSpec::Directory { dir, pattern } = spec else {
            panic!("Expected directory spec");
        };
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(pattern.unwrap().as_str(), "*.cpp");
    }

    #[test]
    fn no_matches() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("notes.txt"), 0);
        let spec = WatchSpec::parse(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(latest_name(&spec), None);
    }

    #[test]
    fn file_spec() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.cpp");
        touch(&path, 0);
        let spec = WatchSpec::parse(path.to_str().unwrap()).unwrap();
        assert_eq!(latest_name(&spec).as_deref(), Some("new.cpp"));
        assert_eq!(spec.display_base().to_string(), path.display().to_string());
        std::fs::remove_file(&path).unwrap();
        assert_eq!(latest_name(&spec), None);
    }

    #[test]
    fn missing_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(WatchSpec::parse(dir.path().join("missing.cpp").to_str().unwrap()).is_err());
    }
}

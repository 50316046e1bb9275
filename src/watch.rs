//! Re-runs the workflow whenever the watched source changes. We poll rather than using inotify
//! since we don't need an instant response and polling copes with editors that replace files.

use crate::config::Languages;
use crate::target::WatchSpec;
use crate::ui::Reporter;
use crate::workflow::Workflow;
use anyhow::Result;
use colored::Colorize;
use log::info;
use std::path::PathBuf;
use std::time::Duration;
use std::time::SystemTime;

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum WatchEvent {
    /// The file to run is new, different or has been modified.
    Changed { path: PathBuf, initial: bool },
    /// Nothing matches. Only reported on the first poll and when a previously present file
    /// disappears.
    Idle,
    Unchanged,
}

pub(crate) struct Watcher {
    spec: WatchSpec,
    first: bool,
    last: Option<(PathBuf, SystemTime)>,
    had_file: bool,
}

impl Watcher {
    pub(crate) fn new(spec: WatchSpec) -> Self {
        Self {
            spec,
            first: true,
            last: None,
            had_file: false,
        }
    }

    pub(crate) fn spec(&self) -> &WatchSpec {
        &self.spec
    }

    pub(crate) fn poll(&mut self, languages: Languages) -> Result<WatchEvent> {
        let first = std::mem::replace(&mut self.first, false);
        let Some((path, modified)) = self.spec.resolve_latest(languages)? else {
            let was_present = std::mem::replace(&mut self.had_file, false);
            return Ok(if was_present || first {
                WatchEvent::Idle
            } else {
                WatchEvent::Unchanged
            });
        };
        let reappeared = !std::mem::replace(&mut self.had_file, true);
        let changed = match &self.last {
            Some((last_path, last_modified)) => {
                reappeared || *last_path != path || modified > *last_modified
            }
            None => true,
        };
        if !changed {
            return Ok(WatchEvent::Unchanged);
        }
        self.last = Some((path.clone(), modified));
        Ok(WatchEvent::Changed {
            path,
            initial: first,
        })
    }
}

/// Polls every `interval` and runs `workflow` each time the target changes. Only returns if
/// interrupted.
pub(crate) fn run(
    mut watcher: Watcher,
    interval: Duration,
    languages: Languages,
    workflow: &mut Workflow,
    reporter: &mut dyn Reporter,
) -> Result<()> {
    println!(
        "Watching {} every {}s. Press control-c to stop.",
        watcher.spec().display_base(),
        interval.as_secs()
    );
    loop {
        match watcher.poll(languages) {
            Ok(WatchEvent::Changed { path, initial }) => {
                info!("Change detected in `{}`", path.display());
                if !initial {
                    println!("\n`{}` changed, re-running", path.display());
                }
                match workflow.run(&path, reporter) {
                    Ok(summary) => crate::ui::print_summary(&summary),
                    Err(error) => eprintln!("{} {error:#}", "ERROR:".red()),
                }
                crate::ui::print_timings(workflow.timings());
            }
            Ok(WatchEvent::Idle) => {
                println!(
                    "Waiting for a file matching {}",
                    watcher.spec().display_base()
                );
            }
            Ok(WatchEvent::Unchanged) => {}
            Err(error) => eprintln!("{} {error:#}", "ERROR:".red()),
        }
        std::thread::sleep(interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::path::Path;

    fn set_age(path: &Path, age_secs: u64) {
        let file = std::fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(age_secs))
            .unwrap();
    }

    #[test]
    fn poll_sequence() {
        let config = Config::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.cpp");
        std::fs::write(&path, "").unwrap();
        set_age(&path, 60);

        let mut watcher = Watcher::new(WatchSpec::parse(dir.path().to_str().unwrap()).unwrap());
        assert_eq!(
            watcher.poll(config.languages()).unwrap(),
            WatchEvent::Changed {
                path: path.clone(),
                initial: true
            }
        );
        assert_eq!(
            watcher.poll(config.languages()).unwrap(),
            WatchEvent::Unchanged
        );

        set_age(&path, 30);
        assert_eq!(
            watcher.poll(config.languages()).unwrap(),
            WatchEvent::Changed {
                path: path.clone(),
                initial: false
            }
        );

        std::fs::remove_file(&path).unwrap();
        assert_eq!(watcher.poll(config.languages()).unwrap(), WatchEvent::Idle);
        assert_eq!(
            watcher.poll(config.languages()).unwrap(),
            WatchEvent::Unchanged
        );

        std::fs::write(&path, "").unwrap();
        set_age(&path, 30);
        assert_eq!(
            watcher.poll(config.languages()).unwrap(),
            WatchEvent::Changed {
                path,
                initial: false
            }
        );
    }

    #[test]
    fn idle_when_nothing_matches_initially() {
        let config = Config::default();
        let dir = tempfile::tempdir().unwrap();
        let mut watcher = Watcher::new(WatchSpec::parse(dir.path().to_str().unwrap()).unwrap());
        assert_eq!(watcher.poll(config.languages()).unwrap(), WatchEvent::Idle);
        assert_eq!(
            watcher.poll(config.languages()).unwrap(),
            WatchEvent::Unchanged
        );
    }

    #[test]
    fn newer_file_takes_over() {
        let config = Config::default();
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.cpp");
        std::fs::write(&first, "").unwrap();
        set_age(&first, 60);
        let mut watcher = Watcher::new(WatchSpec::parse(dir.path().to_str().unwrap()).unwrap());
        watcher.poll(config.languages()).unwrap();

        let second = dir.path().join("b.cpp");
        std::fs::write(&second, "").unwrap();
        assert_eq!(
            watcher.poll(config.languages()).unwrap(),
            WatchEvent::Changed {
                path: second,
                initial: false
            }
        );
    }
}

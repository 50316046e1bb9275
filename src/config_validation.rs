use crate::config::Config;
use crate::config::MAX_VERSION;
use std::fmt::Display;
use std::path::Path;
use std::path::PathBuf;

#[derive(Debug)]
pub(crate) struct InvalidConfig {
    config_path: PathBuf,
    problems: Vec<Problem>,
}

#[derive(Debug)]
enum Problem {
    UnsupportedVersion(u32),
    ZeroInterval,
    EmptyCompiler(String),
}

pub(crate) fn validate(config: &Config, config_path: &Path) -> Result<(), InvalidConfig> {
    let mut problems = Vec::new();
    if config.version == 0 || config.version > MAX_VERSION {
        problems.push(Problem::UnsupportedVersion(config.version));
    }
    if config.interval == Some(0) {
        problems.push(Problem::ZeroInterval);
    }
    for (extension, language) in &config.languages {
        if language.compiler.trim().is_empty() {
            problems.push(Problem::EmptyCompiler(extension.clone()));
        }
    }
    if problems.is_empty() {
        Ok(())
    } else {
        Err(InvalidConfig {
            config_path: config_path.to_owned(),
            problems,
        })
    }
}

impl Display for InvalidConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid config {}", self.config_path.display())?;
        for problem in &self.problems {
            writeln!(f)?;
            match problem {
                Problem::UnsupportedVersion(version) => {
                    write!(f, "  Unsupported version '{version}'")?
                }
                Problem::ZeroInterval => write!(f, "  Interval must be greater than zero")?,
                Problem::EmptyCompiler(extension) => {
                    write!(f, "  Empty compiler for language '{extension}'")?
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for InvalidConfig {}

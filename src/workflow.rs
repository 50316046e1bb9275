//! Builds a program, then runs it against each sample case from its source and compares what it
//! prints with what was expected.

use crate::config::Languages;
use crate::exit_code::ExitCode;
use crate::prompt::PromptCase;
use crate::timing::TimingCollector;
use crate::tmpdir::BuildDir;
use crate::ui::Reporter;
use anyhow::anyhow;
use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use log::debug;
use log::info;
use std::ffi::OsString;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Stdio;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Phase {
    ValidatingSource,
    CleaningPreviousBuild,
    Compiling,
    ParsingPrompts,
}

/// Timing category for executing the cases, which happens after all phases.
const RUNNING_CASES: &str = "Running cases";

impl Phase {
    pub(crate) fn name(self) -> &'static str {
        match self {
            Phase::ValidatingSource => "Validating source",
            Phase::CleaningPreviousBuild => "Cleaning previous build",
            Phase::Compiling => "Compiling",
            Phase::ParsingPrompts => "Parsing prompts",
        }
    }
}

/// An already-built program to run instead of compiling the source.
#[derive(Debug, Clone)]
pub(crate) struct RunCommand {
    pub(crate) program: PathBuf,
    pub(crate) args: Vec<OsString>,
}

pub(crate) struct Workflow<'a> {
    languages: Languages<'a>,
    /// Compiler flags to use instead of the language's defaults.
    override_flags: Vec<String>,
    run_command: Option<RunCommand>,
    build_dir: BuildDir,
    timings: TimingCollector,
}

/// What happened when we ran a single case.
pub(crate) enum CaseOutcome {
    Passed,
    /// The program couldn't be run, or it exited with a non-zero status.
    ExecutionFailed(anyhow::Error),
    /// The program ran, but printed the wrong thing.
    Mismatch {
        error: anyhow::Error,
        actual: Vec<String>,
    },
}

pub(crate) struct CaseResult<'a> {
    pub(crate) case: &'a PromptCase,
    pub(crate) outcome: CaseOutcome,
}

#[derive(Debug)]
pub(crate) struct RunSummary {
    pub(crate) passed: usize,
    pub(crate) total: usize,
    pub(crate) first_error: Option<anyhow::Error>,
}

/// State shared between phases of a single run.
#[derive(Default)]
struct RunState<'a> {
    compiler: Option<&'a str>,
    default_flags: &'a [String],
    cases: Vec<PromptCase>,
}

impl<'a> Workflow<'a> {
    pub(crate) fn new(
        languages: Languages<'a>,
        override_flags: Vec<String>,
        run_command: Option<RunCommand>,
        build_dir: BuildDir,
        timings: TimingCollector,
    ) -> Self {
        Self {
            languages,
            override_flags,
            run_command,
            build_dir,
            timings,
        }
    }

    pub(crate) fn timings(&self) -> &TimingCollector {
        &self.timings
    }

    fn phases(&self) -> Vec<Phase> {
        if self.run_command.is_some() {
            vec![Phase::ValidatingSource, Phase::ParsingPrompts]
        } else {
            vec![
                Phase::ValidatingSource,
                Phase::CleaningPreviousBuild,
                Phase::Compiling,
                Phase::ParsingPrompts,
            ]
        }
    }

    /// Runs all phases for `source`. An error is only returned if a phase failed. Failing cases
    /// are reported via the returned summary.
    pub(crate) fn run(
        &mut self,
        source: &Path,
        reporter: &mut dyn Reporter,
    ) -> Result<RunSummary> {
        info!("Running workflow for `{}`", source.display());
        let phases = self.phases();
        let mut state = RunState::default();
        let mut start = Instant::now();
        for (index, phase) in phases.iter().enumerate() {
            reporter.phase_started(*phase, index + 1, phases.len());
            self.run_phase(*phase, source, &mut state)?;
            reporter.phase_finished(*phase, index + 1, phases.len());
            start = self.timings.add_timing(start, phase.name());
        }

        let total = state.cases.len();
        reporter.tests_started(total);
        let mut summary = RunSummary {
            passed: 0,
            total,
            first_error: None,
        };
        for (index, case) in state.cases.iter().enumerate() {
            reporter.case_started(index + 1, total);
            let outcome = self.run_case(index, case);
            let result = CaseResult { case, outcome };
            reporter.case_finished(index + 1, total, &result);
            match result.outcome {
                CaseOutcome::Passed => summary.passed += 1,
                CaseOutcome::ExecutionFailed(error) | CaseOutcome::Mismatch { error, .. } => {
                    summary.first_error.get_or_insert(error);
                }
            }
        }
        self.timings.add_timing(start, RUNNING_CASES);
        info!("Passed {}/{}", summary.passed, summary.total);
        Ok(summary)
    }

    fn run_phase(&self, phase: Phase, source: &Path, state: &mut RunState<'a>) -> Result<()> {
        match phase {
            Phase::ValidatingSource => self.validate_source(source, state),
            Phase::CleaningPreviousBuild => {
                crate::fs::remove_if_exists(&self.build_dir.binary_path())
            }
            Phase::Compiling => self.compile(source, state),
            Phase::ParsingPrompts => {
                state.cases = crate::prompt::parse_file(source)?;
                Ok(())
            }
        }
    }

    fn validate_source(&self, source: &Path, state: &mut RunState<'a>) -> Result<()> {
        let metadata = std::fs::metadata(source)
            .with_context(|| format!("Failed to access `{}`", source.display()))?;
        if metadata.is_dir() {
            bail!("`{}` is a directory, expected a file", source.display());
        }
        if self.run_command.is_some() {
            return Ok(());
        }
        let Some(language) = self.languages.for_path(source) else {
            bail!(
                "Unsupported file extension {:?}",
                source.extension().unwrap_or_default()
            );
        };
        let compiler_path = which::which(&language.compiler).map_err(|error| {
            anyhow!(
                "Required compiler `{}` not found in PATH ({error})",
                language.compiler
            )
        })?;
        debug!("Using compiler `{}`", compiler_path.display());
        state.compiler = Some(&language.compiler);
        state.default_flags = &language.flags;
        Ok(())
    }

    fn compile(&self, source: &Path, state: &RunState) -> Result<()> {
        let compiler = state
            .compiler
            .ok_or_else(|| anyhow!("Compiler wasn't selected before compiling"))?;
        let flags = if self.override_flags.is_empty() {
            state.default_flags
        } else {
            &self.override_flags[..]
        };
        let mut command = Command::new(compiler);
        command
            .args(flags)
            .arg(source)
            .arg("-o")
            .arg(self.build_dir.binary_path());
        info!("Compiling: {command:?}");
        let status: ExitCode = command
            .status()
            .with_context(|| format!("Failed to run compiler `{compiler}`"))?
            .into();
        if !status.is_ok() {
            bail!("Compilation failed with exit code {status}");
        }
        Ok(())
    }

    fn program_command(&self) -> Command {
        match &self.run_command {
            Some(run_command) => {
                let mut command = Command::new(&run_command.program);
                command.args(&run_command.args);
                command
            }
            None => Command::new(self.build_dir.binary_path()),
        }
    }

    fn run_case(&self, index: usize, case: &PromptCase) -> CaseOutcome {
        let case_number = index + 1;
        match self.execute(case) {
            Err(error) => {
                CaseOutcome::ExecutionFailed(error.context(format!("case {case_number}")))
            }
            Ok(actual) => match compare_outputs(&case.outputs, &actual) {
                Ok(()) => CaseOutcome::Passed,
                Err(error) => CaseOutcome::Mismatch {
                    error: error.context(format!("case {case_number}")),
                    actual,
                },
            },
        }
    }

    /// Runs the program with the case's inputs and returns the lines it printed.
    fn execute(&self, case: &PromptCase) -> Result<Vec<String>> {
        let mut command = self.program_command();
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        debug!("Running case: {command:?}");
        let mut child = command.spawn().context("Start failed")?;

        let write_result = match child.stdin.take() {
            Some(mut stdin) => write_inputs(&mut stdin, &case.inputs),
            None => Err(anyhow!("Failed to obtain stdin")),
        };
        if let Err(error) = write_result {
            let _ = child.wait();
            return Err(error);
        }

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("Failed to obtain stdout"))?;
        let mut outputs = Vec::new();
        for line in BufReader::new(stdout).lines() {
            match line {
                Ok(line) => outputs.push(line.trim_end_matches('\r').to_owned()),
                Err(error) => {
                    let _ = child.wait();
                    return Err(error).context("Failed to read stdout");
                }
            }
        }

        let status: ExitCode = child.wait().context("Failed to wait for program")?.into();
        if !status.is_ok() {
            bail!("Execution failed with exit code {status}");
        }
        Ok(outputs)
    }
}

fn write_inputs(stdin: &mut impl Write, inputs: &[String]) -> Result<()> {
    for line in inputs {
        writeln!(stdin, "{line}").context("Failed to write input")?;
    }
    Ok(())
}

/// Checks that `actual` matches `expected` line by line, ignoring surrounding whitespace.
pub(crate) fn compare_outputs(expected: &[String], actual: &[String]) -> Result<()> {
    if expected.len() != actual.len() {
        bail!(
            "expected {} output lines, got {}",
            expected.len(),
            actual.len()
        );
    }
    for (line_number, (expected, actual)) in expected.iter().zip(actual).enumerate() {
        if expected.trim() != actual.trim() {
            bail!(
                "expected output {expected:?}, got {actual:?} (line {})",
                line_number + 1
            );
        }
    }
    Ok(())
}

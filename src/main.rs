//! Sums integers read from stdin, and runs programs against the sample cases embedded in their
//! source.

#![forbid(unsafe_code)]

mod colour;
mod config;
mod config_validation;
mod exit_code;
mod fs;
mod logging;
mod prompt;
mod sum;
mod target;
mod timing;
mod tmpdir;
mod ui;
mod watch;
mod workflow;

use anyhow::bail;
use anyhow::Result;
use clap::Parser;
use clap::Subcommand;
use colored::Colorize;
use exit_code::ExitCode;
use log::LevelFilter;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;
use target::WatchSpec;
use timing::TimingCollector;
use tmpdir::BuildDir;
use workflow::RunCommand;
use workflow::Workflow;

const CONFIG_FILE_NAME: &str = "defi.toml";

#[derive(Parser, Debug, Clone)]
#[clap(version, about)]
struct Args {
    /// Whether to use coloured output.
    #[clap(long, alias = "color", default_value = "auto", global = true)]
    colour: colour::Colour,

    /// Path to defi.toml. Defaults to defi.toml in the current directory. It's fine for it not to
    /// exist.
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Write log messages to this file.
    #[clap(long, global = true)]
    log_file: Option<PathBuf>,

    /// Log filter to use with --log-file [ off, error, warn, info, debug, trace ].
    #[clap(long, default_value_t = LevelFilter::Info, global = true)]
    log_level: LevelFilter,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Read a count then that many integers from stdin and print their sum.
    Sum,

    /// Run a program against the defiprompt samples in its source.
    Check(CheckArgs),
}

#[derive(clap::Args, Debug, Clone)]
struct CheckArgs {
    /// Source file, directory or glob pattern. For directories and patterns, the most recently
    /// modified match is run.
    #[clap(default_value = ".")]
    target: String,

    /// Polling interval in seconds.
    #[clap(long, value_parser = clap::value_parser!(u64).range(1..))]
    interval: Option<u64>,

    /// Run the samples once and exit rather than watching for changes.
    #[clap(long)]
    once: bool,

    /// Compiler flag to use instead of the defaults for the language. May be repeated.
    #[clap(long = "flags", value_name = "FLAG", allow_hyphen_values = true)]
    flags: Vec<String>,

    /// Don't compile. Run this program for each sample instead, with any arguments given after
    /// `--`.
    #[clap(long, value_name = "PROGRAM")]
    run: Option<PathBuf>,

    /// Directory to compile into. Defaults to a temporary directory.
    #[clap(long)]
    build_dir: Option<PathBuf>,

    /// Print how long each phase took.
    #[clap(long)]
    print_timing: bool,

    /// Arguments for the program given by --run.
    #[clap(last = true)]
    run_args: Vec<OsString>,
}

fn main() {
    let mut args = Args::parse();
    args.colour = args.colour.detect();
    let exit_code = match run(args) {
        Ok(exit_code) => exit_code,
        Err(error) => {
            eprintln!("{} {:#}", "ERROR:".red(), error);
            exit_code::FAILURE
        }
    };
    std::process::exit(exit_code.code());
}

fn run(args: Args) -> Result<ExitCode> {
    if let Some(log_file) = &args.log_file {
        logging::init(log_file, args.log_level)?;
    }
    match &args.command {
        Command::Sum => Ok(sum::run(std::io::stdin().lock(), std::io::stdout().lock())),
        Command::Check(check_args) => check(&args, check_args),
    }
}

fn check(args: &Args, check_args: &CheckArgs) -> Result<ExitCode> {
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
    let config = config::parse_file(&config_path)?;
    let languages = config.languages();

    let run_command = match &check_args.run {
        Some(program) => Some(RunCommand {
            program: program.clone(),
            args: check_args.run_args.clone(),
        }),
        None if !check_args.run_args.is_empty() => {
            bail!("Arguments after `--` are only used together with --run")
        }
        None => None,
    };

    let spec = WatchSpec::parse(&check_args.target)?;
    let mut workflow = Workflow::new(
        languages,
        check_args.flags.clone(),
        run_command,
        BuildDir::new(check_args.build_dir.as_deref())?,
        TimingCollector::new(check_args.print_timing),
    );
    let mut reporter = ui::BasicTermReporter;

    if !check_args.once {
        let interval = check_args
            .interval
            .map(Duration::from_secs)
            .unwrap_or_else(|| config.interval());
        watch::run(
            watch::Watcher::new(spec),
            interval,
            languages,
            &mut workflow,
            &mut reporter,
        )?;
        return Ok(exit_code::SUCCESS);
    }

    let Some((path, _)) = spec.resolve_latest(languages)? else {
        bail!("No matching files found for {}", spec.display_base());
    };
    let summary = workflow.run(&path, &mut reporter)?;
    ui::print_summary(&summary);
    ui::print_timings(workflow.timings());
    if summary.first_error.is_some() {
        Ok(exit_code::FAILURE)
    } else {
        Ok(exit_code::SUCCESS)
    }
}

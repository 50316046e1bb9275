//! Reporting the progress and results of a run to the user.

use crate::timing::TimingCollector;
use crate::workflow::CaseResult;
use crate::workflow::Phase;
use crate::workflow::RunSummary;
use colored::Colorize;

mod basic_term;

pub(crate) use basic_term::BasicTermReporter;

/// Receives progress notifications from a workflow run.
pub(crate) trait Reporter {
    /// Called before `phase` starts. `index` is one-based.
    fn phase_started(&mut self, phase: Phase, index: usize, total: usize);

    fn phase_finished(&mut self, _phase: Phase, _index: usize, _total: usize) {}

    /// Called once all phases have completed, before any case is run.
    fn tests_started(&mut self, total: usize);

    fn case_started(&mut self, _index: usize, _total: usize) {}

    fn case_finished(&mut self, index: usize, total: usize, result: &CaseResult);
}

/// Prints the final pass count. The first error, if any, goes to stderr.
pub(crate) fn print_summary(summary: &RunSummary) {
    match &summary.first_error {
        Some(error) => {
            println!("🚨 Tests passed: {}/{}", summary.passed, summary.total);
            eprintln!("{} {error:#}", "ERROR:".red());
        }
        None => {
            if summary.total > 0 {
                println!("🎉 Tests passed: {}/{}", summary.passed, summary.total);
            }
        }
    }
}

pub(crate) fn print_timings(timings: &TimingCollector) {
    if timings.is_enabled() {
        print!("{timings}");
    }
}

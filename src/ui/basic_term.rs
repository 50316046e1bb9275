//! A plain line-oriented reporter. Doesn't redraw anything, just prints as things happen.

use super::Reporter;
use crate::workflow::CaseOutcome;
use crate::workflow::CaseResult;
use crate::workflow::Phase;
use colored::Colorize;
use std::fmt::Write;

#[derive(Default)]
pub(crate) struct BasicTermReporter;

impl Reporter for BasicTermReporter {
    fn phase_started(&mut self, phase: Phase, index: usize, total: usize) {
        let icon = match phase {
            Phase::ValidatingSource => "🔍",
            Phase::CleaningPreviousBuild => "🧹",
            Phase::Compiling => "🛠️",
            Phase::ParsingPrompts => "📝",
        };
        println!("[{index}/{total}] {icon} {}", phase.name().bold());
    }

    fn tests_started(&mut self, total: usize) {
        println!("Running {total} case(s)");
    }

    fn case_finished(&mut self, index: usize, total: usize, result: &CaseResult) {
        match &result.outcome {
            CaseOutcome::Passed => println!("{} case {index}/{total}", "PASS".green()),
            CaseOutcome::ExecutionFailed(error) => {
                println!("{} case {index}/{total}: {error:#}", "FAIL".red());
            }
            CaseOutcome::Mismatch { error, actual } => {
                println!("{} case {index}/{total}: {error:#}", "FAIL".red());
                println!("  Input:");
                for line in &result.case.inputs {
                    println!("    {line}");
                }
                println!("  Output ({} expected, {} actual):", "-".red(), "+".green());
                print!("{}", output_diff(&result.case.outputs, actual));
            }
        }
    }
}

/// Renders a line diff from `expected` to `actual`, one line per output line.
fn output_diff(expected: &[String], actual: &[String]) -> String {
    let expected = expected.join("\n");
    let actual = actual.join("\n");
    let mut out = String::new();
    for diff in diff::lines(&expected, &actual) {
        // Writing to a String can't fail.
        let _ = match diff {
            diff::Result::Both(s, _) => writeln!(out, "     {s}"),
            diff::Result::Left(s) => writeln!(out, "    {}{}", "-".red(), s.red()),
            diff::Result::Right(s) => writeln!(out, "    {}{}", "+".green(), s.green()),
        };
    }
    out
}

#[test]
fn test_output_diff() {
    colored::control::set_override(false);
    let lines =
        |values: &[&str]| -> Vec<String> { values.iter().map(|s| s.to_string()).collect() };
    assert_eq!(
        output_diff(&lines(&["1", "6", "3"]), &lines(&["1", "7", "3"])),
        "     1\n    -6\n    +7\n     3\n"
    );
}

//! Extracts sample cases from `/*defiprompt ... */` comments in a source file.

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use std::path::Path;

const MARKER: &str = "/*defiprompt";
const TERMINATOR: &str = "*/";

/// A single sample: lines to feed the program and the lines it's expected to print.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PromptCase {
    pub(crate) inputs: Vec<String>,
    pub(crate) outputs: Vec<String>,
}

#[derive(Clone, Copy)]
enum Section {
    None,
    Inputs,
    Outputs,
}

pub(crate) fn parse_file(path: &Path) -> Result<Vec<PromptCase>> {
    let content = crate::fs::read_to_string(path)?;
    let cases = parse(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
    if cases.is_empty() {
        bail!("No defiprompt blocks found in `{}`", path.display());
    }
    Ok(cases)
}

pub(crate) fn parse(content: &str) -> Result<Vec<PromptCase>> {
    let mut cases = Vec::new();
    let mut rest = content;
    while let Some(start) = rest.find(MARKER) {
        let block_and_rest = &rest[start + MARKER.len()..];
        let Some(end) = block_and_rest.find(TERMINATOR) else {
            bail!("Unterminated defiprompt block");
        };
        cases.extend(parse_block(&block_and_rest[..end])?);
        rest = &block_and_rest[end + TERMINATOR.len()..];
    }
    Ok(cases)
}

fn parse_block(block: &str) -> Result<Vec<PromptCase>> {
    let mut cases = Vec::new();
    let mut current: Option<PromptCase> = None;
    let mut section = Section::None;

    for line in block.lines().map(str::trim).filter(|line| !line.is_empty()) {
        match line {
            "INPUTS" | "INPUTS:" => {
                flush(&mut current, &mut cases)?;
                current = Some(PromptCase::default());
                section = Section::Inputs;
            }
            "OUTPUT" | "OUTPUT:" => {
                if current.is_none() {
                    bail!("OUTPUT encountered before INPUTS");
                }
                section = Section::Outputs;
            }
            "-*-" => {
                flush(&mut current, &mut cases)?;
                section = Section::None;
            }
            _ => match (section, current.as_mut()) {
                (Section::Inputs, Some(case)) => case.inputs.push(line.to_owned()),
                (Section::Outputs, Some(case)) => case.outputs.push(line.to_owned()),
                // Stray lines outside a section are ignored.
                _ => {}
            },
        }
    }
    flush(&mut current, &mut cases)?;
    Ok(cases)
}

fn flush(current: &mut Option<PromptCase>, cases: &mut Vec<PromptCase>) -> Result<()> {
    if let Some(case) = current.take() {
        if case.inputs.is_empty() || case.outputs.is_empty() {
            bail!("Incomplete prompt case detected");
        }
        cases.push(case);
    }
    Ok(())
}

/// The sample program the harness was written against.
#[cfg(test)]
pub(crate) const SAMPLE_PROGRAM: &str = indoc::indoc! {r#"
    #include <iostream>

    /*defiprompt
    INPUTS:
    3
    1
    2
    3
    OUTPUT:
    6
    -*-
    INPUTS:
    4
    10
    2
    3
    5
    OUTPUT:
    20
    -*-
    INPUTS:
    5
    8
    -3
    4
    0
    11
    OUTPUT:
    20
    */

    int main() {
        return 0;
    }
"#};

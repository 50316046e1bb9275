//! Reads a count followed by that many signed integers and prints their sum.

use crate::exit_code::ExitCode;
use std::collections::VecDeque;
use std::fmt::Display;
use std::io::BufRead;
use std::io::Write;

/// Reads `n` then `n` integers from `input` and writes their sum followed by a newline to
/// `output`. Nothing is written unless every value was read successfully.
pub(crate) fn run<R: BufRead, W: Write>(input: R, mut output: W) -> ExitCode {
    let Ok(sum) = sum_values(input) else {
        return crate::exit_code::FAILURE;
    };
    if writeln!(output, "{sum}").and_then(|_| output.flush()).is_err() {
        return crate::exit_code::FAILURE;
    }
    crate::exit_code::SUCCESS
}

pub(crate) fn sum_values<R: BufRead>(input: R) -> Result<i128, SumError> {
    let mut tokens = Tokens::new(input);
    let count = tokens.next_i64(Position::Count)?;
    let count = u64::try_from(count).map_err(|_| SumError::Malformed {
        position: Position::Count,
        reason: Reason::NegativeCount(count),
    })?;
    let mut sum: i128 = 0;
    for index in 0..count {
        sum += i128::from(tokens.next_i64(Position::Value(index))?);
    }
    Ok(sum)
}

#[derive(Debug)]
pub(crate) enum SumError {
    /// The count or one of the values was missing or wasn't an integer.
    Malformed { position: Position, reason: Reason },
    Io(std::io::Error),
}

/// Which token we were trying to read when things went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Position {
    Count,
    /// Zero-based index into the values that follow the count.
    Value(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Reason {
    EndOfInput,
    NotAnInteger(String),
    NegativeCount(i64),
}

/// Splits input into whitespace-delimited tokens. Input is only read a line at a time as tokens
/// are requested, so nothing past the last requested token's line is consumed.
struct Tokens<R> {
    input: R,
    pending: VecDeque<Vec<u8>>,
    line: Vec<u8>,
}

impl<R: BufRead> Tokens<R> {
    fn new(input: R) -> Self {
        Self {
            input,
            pending: VecDeque::new(),
            line: Vec::new(),
        }
    }

    fn next_token(&mut self) -> Result<Option<Vec<u8>>, std::io::Error> {
        while self.pending.is_empty() {
            self.line.clear();
            if self.input.read_until(b'\n', &mut self.line)? == 0 {
                return Ok(None);
            }
            self.pending.extend(
                self.line
                    .split(|b| b.is_ascii_whitespace())
                    .filter(|token| !token.is_empty())
                    .map(|token| token.to_vec()),
            );
        }
        Ok(self.pending.pop_front())
    }

    fn next_i64(&mut self, position: Position) -> Result<i64, SumError> {
        let malformed = |reason| SumError::Malformed { position, reason };
        let token = self.next_token()?.ok_or_else(|| malformed(Reason::EndOfInput))?;
        std::str::from_utf8(&token)
            .ok()
            .and_then(|text| text.parse().ok())
            .ok_or_else(|| malformed(Reason::NotAnInteger(String::from_utf8_lossy(&token).into())))
    }
}

impl From<std::io::Error> for SumError {
    fn from(error: std::io::Error) -> Self {
        SumError::Io(error)
    }
}

impl Display for SumError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SumError::Malformed { position, reason } => {
                write!(f, "Malformed or incomplete input reading {position}: ")?;
                match reason {
                    Reason::EndOfInput => write!(f, "unexpected end of input"),
                    Reason::NotAnInteger(token) => write!(f, "`{token}` is not an integer"),
                    Reason::NegativeCount(count) => write!(f, "count {count} is negative"),
                }
            }
            SumError::Io(error) => write!(f, "Failed to read input: {error}"),
        }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Position::Count => write!(f, "count"),
            Position::Value(index) => write!(f, "value {}", index + 1),
        }
    }
}

impl std::error::Error for SumError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SumError::Io(error) => Some(error),
            SumError::Malformed { .. } => None,
        }
    }
}

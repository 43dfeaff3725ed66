//! G-code line parser
//!
//! Only the commands a pen plotter needs are understood:
//! - `G21` millimetres and `G90` absolute coordinates (accepted, no-op)
//! - `G0 X.. Y..` pen-up travel
//! - `G1 X.. Y..` pen-down draw
//! - `M2` end of program
//!
//! Everything after the first `;` is a comment. Any other command word is
//! reported as [`Command::Unknown`] and left to the caller to skip.

use serde::{Deserialize, Serialize};
use std::io;
use vplotter_core::{GcodeError, Position};

/// One interpreted program line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// G21
    Millimetres,
    /// G90
    Absolute,
    /// G0, target before offsets
    Travel(Position),
    /// G1, target before offsets
    Draw(Position),
    /// M2
    End,
    /// Any other command word
    Unknown(String),
}

/// Parse one line. Blank and comment-only lines yield `None`.
pub fn parse_line(line: &str, line_number: usize) -> Result<Option<Command>, GcodeError> {
    let code = match line.find(';') {
        Some(idx) => &line[..idx],
        None => line,
    };

    let mut tokens = code.split_whitespace();
    let Some(word) = tokens.next() else {
        return Ok(None);
    };
    let operands: Vec<&str> = tokens.collect();

    let command = match word.to_ascii_uppercase().as_str() {
        "G21" => Command::Millimetres,
        "G90" => Command::Absolute,
        "G0" => Command::Travel(target(&operands, line_number)?),
        "G1" => Command::Draw(target(&operands, line_number)?),
        "M2" => Command::End,
        _ => Command::Unknown(word.to_string()),
    };
    Ok(Some(command))
}

fn target(operands: &[&str], line_number: usize) -> Result<Position, GcodeError> {
    Ok(Position::new(
        operand(operands, 'X', line_number)?,
        operand(operands, 'Y', line_number)?,
    ))
}

/// Value of the first operand starting with `letter` (either case).
fn operand(operands: &[&str], letter: char, line_number: usize) -> Result<f64, GcodeError> {
    let token = operands
        .iter()
        .find(|token| {
            token
                .chars()
                .next()
                .is_some_and(|c| c.eq_ignore_ascii_case(&letter))
        })
        .ok_or_else(|| GcodeError::MalformedLine {
            line_number,
            reason: format!("missing {} operand", letter),
        })?;

    let raw = &token[letter.len_utf8()..];
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(GcodeError::MalformedLine {
            line_number,
            reason: format!("invalid {} operand '{}'", letter, token),
        }),
    }
}

/// Iterator over the commands of a program
///
/// Wraps a line source, skips blank lines and tags every command with its
/// 1-based line number. Read failures surface as [`GcodeError::Io`].
pub struct Program<I> {
    lines: I,
    line_number: usize,
}

impl<I> Program<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            line_number: 0,
        }
    }

    /// Number of lines consumed so far, including blank ones
    pub fn lines_read(&self) -> usize {
        self.line_number
    }
}

impl<I> Iterator for Program<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    type Item = Result<(usize, Command), GcodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => {
                    return Some(Err(GcodeError::Io {
                        reason: e.to_string(),
                    }))
                }
            };
            self.line_number += 1;

            match parse_line(&line, self.line_number) {
                Ok(Some(command)) => return Some(Ok((self.line_number, command))),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

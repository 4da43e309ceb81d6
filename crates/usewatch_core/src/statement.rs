use log::trace;
use std::{
    iter::Enumerate,
    path::Path,
    str::Lines,
};

use crate::{
    constants::{LINE_COMMENT, TERMINATOR, USE_KEYWORD},
    types::RawStatement,
};

/// Lazily yields the import statements of one file.
///
/// A statement starts on a line beginning with `use ` and runs until a line
/// whose uncommented part contains `;`. Lines outside statements are skipped.
/// A second `use ` right after the `;` starts a new statement on that line.
pub struct Statements<'a> {
    file: &'a Path,
    lines: Enumerate<Lines<'a>>,
    /// Statement text left over after the terminator of the previous one
    carry: Option<(usize, String)>,
}

pub fn statements<'a>(file: &'a Path, source: &'a str) -> Statements<'a> {
    Statements { file, lines: source.lines().enumerate(), carry: None }
}

impl<'a> Statements<'a> {
    fn next_start(&mut self) -> Option<(usize, String)> {
        let (idx, line) = self.lines.find(|(_, line)| line.starts_with(USE_KEYWORD))?;
        Some((idx, line.to_string()))
    }
}

impl<'a> Iterator for Statements<'a> {
    type Item = RawStatement<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (idx, mut text) = match self.carry.take() {
            Some(carried) => carried,
            None => self.next_start()?,
        };
        let mut last = idx;
        let mut truncated = false;
        let mut done = ends_statement(&text);

        while !done {
            match self.lines.next() {
                Some((i, line)) => {
                    text.push('\n');
                    text.push_str(line);
                    last = i;
                    done = ends_statement(line);
                }
                None => {
                    trace!("{} ended inside statement at line {}", self.file.display(), idx + 1);
                    text.push('\n');
                    text.push(TERMINATOR);
                    truncated = true;
                    done = true;
                }
            }
        }

        if !truncated && let Some(end) = next_statement_offset(&text) {
            let rest = text[end..].trim_start().to_string();
            trace!("Second statement on {}:{}: {:?}", self.file.display(), last + 1, rest);
            self.carry = Some((last, rest));
            text.truncate(end);
        }

        trace!("Statement at {}:{}: {:?}", self.file.display(), idx + 1, text);
        Some(RawStatement { file: self.file, line: idx + 1, text, truncated })
    }
}

/// Cut a physical line at the start of its line comment, if any.
pub(crate) fn strip_line_comment(line: &str) -> &str {
    match line.find(LINE_COMMENT) {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn ends_statement(line: &str) -> bool {
    strip_line_comment(line).contains(TERMINATOR)
}

/// Offset just past the first `;` of the last line, when another `use `
/// statement follows it on the same line.
fn next_statement_offset(text: &str) -> Option<usize> {
    let line_start = text.rfind('\n').map_or(0, |i| i + 1);
    let pos = strip_line_comment(&text[line_start..]).find(TERMINATOR)?;
    let end = line_start + pos + 1;
    text[end..].trim_start().starts_with(USE_KEYWORD).then_some(end)
}

//! Interactive suggestion menu.
//!
//! Rendering and prompting run over injected reader/writer streams in the
//! same style as the rest of the crate's I/O, so tests drive the menu with
//! byte buffers. The prompt returns the raw input line; turning that line
//! into a selection is [`resolve_choice`]'s job.

use crate::suggestion::Suggestion;
use anyhow::Result;
use colored::Colorize;
use std::io::{BufRead, Write};

/// Prints a titled, 1-based list of suggestions.
pub fn print_suggestions<W: Write>(
    output: &mut W,
    suggestions: &[Suggestion],
    title: &str,
) -> Result<()> {
    writeln!(output, "{}", title.yellow().bold())?;
    for (i, suggestion) in suggestions.iter().enumerate() {
        writeln!(output, "{}", format!("{}. {}", i + 1, suggestion.command).cyan())?;
        writeln!(output, "{}", suggestion.explanation.dimmed())?;
        writeln!(output)?;
    }
    Ok(())
}

/// Prompts for a choice and returns the raw input line, trimmed.
///
/// With more than one suggestion the prompt lists the numeric options
/// joined with "or" before the last one; with exactly one it asks for `y`.
/// When `can_improve` is set the prompt also advertises `i`.
pub fn prompt_choice<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    suggestions: &[Suggestion],
    can_improve: bool,
) -> Result<String> {
    let improve_hint = if can_improve {
        ", discard and improve with 'i'"
    } else {
        ""
    };

    let prompt = if suggestions.len() > 1 {
        format!(
            "Choose an option ({}){} or press any other key to exit: ",
            numbered_options(suggestions.len()),
            improve_hint
        )
    } else {
        format!(
            "Type 'y' to execute the following command{} or press any other key to exit: ",
            improve_hint
        )
    };

    write!(output, "{}", prompt.green())?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Joins `1..=len` with commas and "or" before the last: "1, 2 or 3".
fn numbered_options(len: usize) -> String {
    let numbers: Vec<String> = (1..=len).map(|n| n.to_string()).collect();
    match numbers.split_last() {
        Some((last, rest)) if !rest.is_empty() => {
            format!("{} or {}", rest.join(", "), last)
        }
        _ => numbers.join(""),
    }
}

/// Maps a raw input line to a 0-based suggestion index.
///
/// Accepts `1..=len` as 1-based indices, and `y` as shorthand for the
/// first suggestion regardless of list length (one consistent mapping for
/// both the single- and multi-suggestion prompts). Anything else is no
/// selection, which callers treat as the exit path.
pub fn resolve_choice(input: &str, len: usize) -> Option<usize> {
    let input = input.trim();
    if len == 0 {
        return None;
    }
    if input == "y" {
        return Some(0);
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=len).contains(&n) => Some(n - 1),
        _ => None,
    }
}

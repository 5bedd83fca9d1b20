//! One interactive invocation, end to end.
//!
//! Generate, dedupe, menu, optional improve pass, then execute with the
//! consent-gated fix loop. The fix loop is an explicit iteration with a
//! single termination condition (the user declines or makes no valid
//! choice), never call-stack recursion.

use crate::executor::{Executor, ProcessRunner};
use crate::generator::SuggestionGenerator;
use crate::menu;
use crate::suggestion::dedupe;
use crate::system_info;
use anyhow::Result;
use colored::Colorize;
use std::io::{BufRead, Write};
use tracing::info;

pub struct Session {
    generator: Box<dyn SuggestionGenerator>,
    runner: Box<dyn ProcessRunner>,
    executor: Executor,
}

impl Session {
    pub fn new(generator: Box<dyn SuggestionGenerator>, runner: Box<dyn ProcessRunner>) -> Self {
        Self {
            generator,
            runner,
            executor: Executor,
        }
    }

    /// Runs the whole interaction for one query.
    ///
    /// Returns `Ok(())` for every consented outcome, including the user
    /// declining to run anything. Remote-call failures and malformed
    /// responses propagate as errors; the caller reports them and exits
    /// non-zero.
    pub async fn run<R: BufRead, W: Write>(
        &self,
        query: &str,
        input: &mut R,
        output: &mut W,
    ) -> Result<()> {
        info!("Processing query: {query}");
        let system_info = system_info::probe(self.runner.as_ref());

        writeln!(output, "{}", "Thinking...".yellow().dimmed())?;
        let suggestions = dedupe(self.generator.generate(query, &system_info).await?);

        menu::print_suggestions(output, &suggestions, "Suggestions")?;
        let mut choice = menu::prompt_choice(input, output, &suggestions, true)?;

        let suggestions = if choice == "i" {
            writeln!(output, "\n{}", "Thinking harder...".yellow().dimmed())?;
            let improved =
                dedupe(self.generator.improve(query, &suggestions, &system_info).await?);

            menu::print_suggestions(output, &improved, "Improved suggestions")?;
            choice = menu::prompt_choice(input, output, &improved, false)?;
            improved
        } else {
            suggestions
        };

        let Some(index) = menu::resolve_choice(&choice, suggestions.len()) else {
            return self.exit_without_running(output);
        };
        let mut suggestion = suggestions[index].clone();

        loop {
            writeln!(output)?;
            let outcome = self.executor.execute(&suggestion, self.runner.as_ref())?;
            if outcome.success() {
                return Ok(());
            }

            writeln!(
                output,
                "{}",
                format!("Error: command failed (exit code {})", outcome.exit_code).red()
            )?;
            writeln!(output, "Error output: {}", outcome.stderr.dimmed())?;

            write!(
                output,
                "{}",
                "Type 'y' to fix the command or press any other key to exit: ".green()
            )?;
            output.flush()?;
            let mut line = String::new();
            input.read_line(&mut line)?;
            if line.trim() != "y" {
                return self.exit_without_running(output);
            }

            writeln!(output, "\n{}", "Fixing suggestion...".yellow().dimmed())?;
            let fixed = dedupe(
                self.generator
                    .fix(
                        query,
                        &suggestion,
                        outcome.exit_code,
                        &outcome.stderr,
                        &system_info,
                    )
                    .await?,
            );

            menu::print_suggestions(output, &fixed, "Fixed suggestions")?;
            let choice = menu::prompt_choice(input, output, &fixed, false)?;
            match menu::resolve_choice(&choice, fixed.len()) {
                Some(index) => suggestion = fixed[index].clone(),
                None => return self.exit_without_running(output),
            }
        }
    }

    fn exit_without_running<W: Write>(&self, output: &mut W) -> Result<()> {
        writeln!(output, "{}", "\n[*] Exiting...".red())?;
        Ok(())
    }
}

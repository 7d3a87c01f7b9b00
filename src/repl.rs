// File: src/repl.rs
use crate::core::engine::{RecommenderEngine, Session};
use crate::error::{RecommendError, Result};
use crate::report::render_recommendation;
use crossterm::style::Stylize;
use std::io::{BufRead, Write};
use tracing::debug;

const QUIT_WORDS: [&str; 3] = ["quit", "exit", "q"];

/// One line typed at the name prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Quit,
    Blank,
    Name(String),
}

pub fn parse_name(line: &str) -> Input {
    let name = line.trim();
    if name.is_empty() {
        Input::Blank
    } else if QUIT_WORDS.contains(&name.to_lowercase().as_str()) {
        Input::Quit
    } else {
        Input::Name(name.to_string())
    }
}

/// Blank means `default`; anything that is not a positive integer is an
/// `InvalidCount`.
pub fn parse_count(line: &str, default: usize) -> Result<usize> {
    let raw = line.trim();
    if raw.is_empty() {
        return Ok(default);
    }
    match raw.parse::<i64>() {
        Ok(n) if n >= 1 => Ok(n as usize),
        _ => Err(RecommendError::InvalidCount(raw.to_string())),
    }
}

/// Interactive query loop over a loaded engine.
pub struct Repl<'a, R, W> {
    session: &'a Session,
    input: R,
    output: W,
    default_top_n: usize,
}

impl<'a, R: BufRead, W: Write> Repl<'a, R, W> {
    /// Fails with `NotInitialized` unless the engine is loaded.
    pub fn new(engine: &'a RecommenderEngine, input: R, output: W, default_top_n: usize) -> Result<Self> {
        Ok(Self {
            session: engine.session()?,
            input,
            output,
            default_top_n,
        })
    }

    /// Runs until `quit` or end of input.
    pub fn run(&mut self) -> Result<()> {
        loop {
            writeln!(self.output, "{}", "-".repeat(70).dark_grey())?;
            let Some(line) = self.prompt("Enter medicine name (or 'quit' to exit): ")? else {
                break;
            };

            let name = match parse_name(&line) {
                Input::Quit => {
                    writeln!(self.output, "\nThank you for using Medicine Recommendation System!")?;
                    break;
                }
                Input::Blank => {
                    writeln!(self.output, "Please enter a valid medicine name.")?;
                    continue;
                }
                Input::Name(name) => name,
            };

            let Some(count_line) = self.prompt(&format!("Number of recommendations (default: {}): ", self.default_top_n))? else {
                break;
            };
            let top_n = match parse_count(&count_line, self.default_top_n) {
                Ok(n) => n,
                Err(e) => {
                    debug!(error = %e, "using default count");
                    writeln!(self.output, "{} using {}", "Invalid count,".yellow(), self.default_top_n)?;
                    self.default_top_n
                }
            };

            match self.session.recommend(&name, top_n) {
                Ok(rec) => {
                    writeln!(self.output, "\n{}", render_recommendation(&rec))?;
                }
                Err(RecommendError::NotFound(name)) => {
                    writeln!(self.output, "\n{} '{}'.", "No medicine named".red(), name)?;
                    writeln!(self.output, "The medicine might not exist in the database.\n")?;
                }
                Err(e) => return Err(e),
            }
        }
        self.output.flush()?;
        Ok(())
    }

    /// Prints `text` and reads one line; `None` at end of input.
    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.output, "{}", text.bold())?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

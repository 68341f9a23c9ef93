//! Typed interactive prompting
//!
//! Every prompt goes through one line-read primitive that writes
//! `"{label}? "` and reads a single line. The typed prompts build on it and
//! report bad input as errors instead of substituting defaults, so a template
//! that asks for a number never renders with a made-up one.

use std::io::{self, BufRead, BufReader, IsTerminal, Write};
use std::num::ParseIntError;
use std::sync::Mutex;
use thiserror::Error;

/// Prompt failures
#[derive(Error, Debug)]
pub enum PromptError {
    /// The answer could not be read
    #[error("failed to read answer for {field}: {source}")]
    Read {
        field: String,
        #[source]
        source: io::Error,
    },

    /// The answer is not a boolean
    #[error("invalid boolean answer for {field}: {value:?}")]
    InvalidBool { field: String, value: String },

    /// The answer is not a base-10 integer
    #[error("invalid integer answer for {field}: {value:?}")]
    InvalidInt {
        field: String,
        value: String,
        #[source]
        source: ParseIntError,
    },
}

/// Line-oriented prompter over an input and an output stream
pub struct Prompter {
    input: Mutex<Box<dyn BufRead + Send>>,
    output: Mutex<Box<dyn Write + Send>>,
    interactive: bool,
}

impl std::fmt::Debug for Prompter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prompter")
            .field("interactive", &self.interactive)
            .finish_non_exhaustive()
    }
}

impl Prompter {
    /// Create a prompter over arbitrary streams
    pub fn new(
        input: impl BufRead + Send + 'static,
        output: impl Write + Send + 'static,
        interactive: bool,
    ) -> Self {
        Self {
            input: Mutex::new(Box::new(input)),
            output: Mutex::new(Box::new(output)),
            interactive,
        }
    }

    /// Create a prompter reading stdin and writing stdout
    pub fn stdio() -> Self {
        let interactive = io::stdin().is_terminal();
        Self::new(BufReader::new(io::stdin()), io::stdout(), interactive)
    }

    /// Write `"{label}? "` and read one line, including its terminator.
    ///
    /// End of input with nothing read is an error; a final line without a
    /// newline is returned as is.
    pub fn read_line(&self, label: &str) -> io::Result<String> {
        {
            let mut output = self
                .output
                .lock()
                .map_err(|_| io::Error::other("prompt output lock poisoned"))?;
            write!(output, "{}? ", label)?;
            output.flush()?;
        }

        let mut input = self
            .input
            .lock()
            .map_err(|_| io::Error::other("prompt input lock poisoned"))?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "end of input",
            ));
        }
        Ok(line)
    }

    /// Prompt for a string; surrounding whitespace is trimmed
    pub fn prompt_string(&self, field: &str) -> Result<String, PromptError> {
        self.read_line(field)
            .map(|line| line.trim().to_string())
            .map_err(|source| PromptError::Read {
                field: field.to_string(),
                source,
            })
    }

    /// Prompt for a boolean
    pub fn prompt_bool(&self, field: &str) -> Result<bool, PromptError> {
        let value = self.prompt_string(field)?;
        parse_bool(&value).ok_or_else(|| PromptError::InvalidBool {
            field: field.to_string(),
            value,
        })
    }

    /// Prompt for a base-10 signed integer
    pub fn prompt_int(&self, field: &str) -> Result<i64, PromptError> {
        let value = self.prompt_string(field)?;
        value.parse::<i64>().map_err(|source| PromptError::InvalidInt {
            field: field.to_string(),
            value,
            source,
        })
    }

    /// Whether the input stream is an attached terminal
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }
}

/// Parse the boolean spellings accepted at prompts
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "on" | "t" | "true" | "y" | "yes" => Some(true),
        "0" | "off" | "f" | "false" | "n" | "no" => Some(false),
        _ => None,
    }
}

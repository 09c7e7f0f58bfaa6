//! Line-oriented input sources for the interactive loops
//!
//! The menus only ever ask a question and wait for one line back, so the
//! console can be swapped for a scripted replay.

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::Path;

use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor, EditMode};

/// Something that answers prompts one line at a time
pub trait InputSource {
    /// Show `prompt` and return the answer without its line ending.
    /// `None` means the source is exhausted.
    fn read_line(&mut self, prompt: &str) -> Option<String>;
}

/// Interactive terminal with line editing and in-session history
pub struct ConsoleInput {
    editor: DefaultEditor,
}

impl ConsoleInput {
    pub fn new() -> Result<Self, ReadlineError> {
        let config = Config::builder().edit_mode(EditMode::Emacs).build();
        Ok(Self {
            editor: DefaultEditor::with_config(config)?,
        })
    }
}

impl InputSource for ConsoleInput {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        let line = console_answer(self.editor.readline(prompt))?;
        if !line.trim().is_empty() {
            if let Err(e) = self.editor.add_history_entry(line.as_str()) {
                log::debug!("Failed to record history: {}", e);
            }
        }
        Some(line)
    }
}

/// Ctrl-D and Ctrl-C close the source like end of input
fn console_answer(result: Result<String, ReadlineError>) -> Option<String> {
    match result {
        Ok(line) => Some(line),
        Err(ReadlineError::Eof | ReadlineError::Interrupted) => None,
        Err(e) => {
            log::error!("Failed to read from terminal: {}", e);
            None
        }
    }
}

/// Pre-recorded answers, consumed in order
#[derive(Debug, Default, Clone)]
pub struct ScriptedInput {
    answers: VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    /// One answer per line of a replay file
    pub fn from_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::new(text.lines()))
    }

    /// Prompts shown so far
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl InputSource for ScriptedInput {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        self.prompts.push(prompt.to_string());
        let answer = self.answers.pop_front()?;
        println!("{}{}", prompt, answer);
        Some(answer)
    }
}

/// `y` or `yes`, any case
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// `quit`, `exit` or `q`, any case
pub fn is_quit(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "quit" | "exit" | "q")
}

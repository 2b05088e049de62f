//! Interactive question answering
//!
//! Answers are trimmed. Yes/no questions accept `y`/`yes` as yes and treat
//! anything else, including an empty answer, as no.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::sync::Mutex;

pub trait Prompter: Send + Sync {
    /// Asks a free-form question; `None` once input is exhausted
    fn ask(&self, question: &str) -> io::Result<Option<String>>;

    fn confirm(&self, question: &str) -> io::Result<bool> {
        Ok(self
            .ask(&format!("{} (y/n): ", question))?
            .map(|answer| is_yes(&answer))
            .unwrap_or(false))
    }

    /// Free-form answer with blanks mapped to `None`
    fn ask_optional(&self, question: &str) -> io::Result<Option<String>> {
        Ok(self.ask(question)?.filter(|answer| !answer.is_empty()))
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Prompter reading answers from stdin, questions written to stdout
#[derive(Debug, Default)]
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn ask(&self, question: &str) -> io::Result<Option<String>> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "{}", question)?;
        stdout.flush()?;

        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

/// Prompter answering from a fixed script
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<String>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn questions(&self) -> Vec<String> {
        self.asked.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&self, question: &str) -> io::Result<Option<String>> {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(question.to_string());
        }
        let answer = self
            .answers
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "prompt script poisoned"))?
            .pop_front();
        Ok(answer.map(|a| a.trim().to_string()))
    }
}

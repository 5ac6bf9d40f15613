//! Interactive prompting.
//!
//! Login credentials, the two-factor code, and unknown station metadata
//! all come from the user. The `PromptProvider` trait keeps those reads
//! out of the session and pipeline logic: the CLI uses [`TerminalPrompt`],
//! tests and headless runs use [`ScriptedPrompt`].

use anyhow::{bail, Context, Result};
use secrecy::SecretString;
use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::sync::Mutex;

pub trait PromptProvider: Send + Sync {
    /// Ask for free text. An empty answer yields `default` when given.
    fn ask_text(&self, question: &str, default: Option<&str>) -> Result<String>;

    /// Ask for a secret. The answer must never be echoed or logged.
    fn ask_secret(&self, question: &str) -> Result<SecretString>;

    /// Ask for one of `choices` (case-insensitive). Empty yields `default`.
    fn ask_choice(&self, question: &str, choices: &[char], default: char) -> Result<char>;

    /// Show an informational message.
    fn notify(&self, message: &str);
}

fn pick_choice(answer: &str, choices: &[char], default: char) -> Option<char> {
    let answer = answer.trim();
    let Some(first) = answer.chars().next() else {
        return Some(default);
    };
    if answer.chars().count() != 1 {
        return None;
    }
    choices
        .iter()
        .copied()
        .find(|c| c.eq_ignore_ascii_case(&first))
}

fn choice_label(choices: &[char], default: char) -> String {
    let options: Vec<String> = choices.iter().map(char::to_string).collect();
    format!("{}, or enter for {default}", options.join(", "))
}

// ---------------------------------------------------------------------------
// Terminal
// ---------------------------------------------------------------------------

/// Reads answers from standard input.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    fn read_line(&self, question: &str) -> Result<String> {
        let mut stdout = std::io::stdout();
        write!(stdout, "{question}: ").context("Failed to write prompt")?;
        stdout.flush().context("Failed to flush prompt")?;

        let mut line = String::new();
        let read = std::io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read from standard input")?;
        if read == 0 {
            bail!("Standard input closed while waiting for an answer");
        }
        Ok(line.trim().to_string())
    }
}

impl PromptProvider for TerminalPrompt {
    fn ask_text(&self, question: &str, default: Option<&str>) -> Result<String> {
        let label = match default {
            Some(d) => format!("{question} (enter for {d})"),
            None => question.to_string(),
        };
        let answer = self.read_line(&label)?;
        Ok(match (answer.is_empty(), default) {
            (true, Some(d)) => d.to_string(),
            _ => answer,
        })
    }

    fn ask_secret(&self, question: &str) -> Result<SecretString> {
        let secret = rpassword::prompt_password(format!("{question}: "))
            .context("Failed to read secret from terminal")?;
        Ok(SecretString::new(secret))
    }

    fn ask_choice(&self, question: &str, choices: &[char], default: char) -> Result<char> {
        let label = format!("{question} ({})", choice_label(choices, default));
        loop {
            let answer = self.read_line(&label)?;
            if let Some(c) = pick_choice(&answer, choices, default) {
                return Ok(c);
            }
            println!("Please answer one of: {}", choice_label(choices, default));
        }
    }

    fn notify(&self, message: &str) {
        println!("{message}");
    }
}

// ---------------------------------------------------------------------------
// Scripted
// ---------------------------------------------------------------------------

/// Answers questions from a fixed script, in order.
///
/// Every question asked is recorded so callers can assert on the
/// conversation. Running out of answers is an error.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<String>>,
    asked: Mutex<Vec<String>>,
    notices: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Questions asked so far.
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().map(|a| a.clone()).unwrap_or_default()
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }

    /// Answers not yet consumed.
    pub fn remaining(&self) -> usize {
        self.answers.lock().map(|a| a.len()).unwrap_or_default()
    }

    fn next(&self, question: &str) -> Result<String> {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(question.to_string());
        }
        let mut answers = self
            .answers
            .lock()
            .map_err(|_| anyhow::anyhow!("prompt script poisoned"))?;
        answers
            .pop_front()
            .with_context(|| format!("No scripted answer for '{question}'"))
    }
}

impl PromptProvider for ScriptedPrompt {
    fn ask_text(&self, question: &str, default: Option<&str>) -> Result<String> {
        let answer = self.next(question)?;
        Ok(match (answer.trim().is_empty(), default) {
            (true, Some(d)) => d.to_string(),
            _ => answer.trim().to_string(),
        })
    }

    fn ask_secret(&self, question: &str) -> Result<SecretString> {
        Ok(SecretString::new(self.next(question)?))
    }

    fn ask_choice(&self, question: &str, choices: &[char], default: char) -> Result<char> {
        let answer = self.next(question)?;
        match pick_choice(&answer, choices, default) {
            Some(c) => Ok(c),
            None => bail!("Scripted answer '{answer}' is not one of {choices:?}"),
        }
    }

    fn notify(&self, message: &str) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(message.to_string());
        }
    }
}

// safegit: Safe Branch & Rollback Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! User interaction for operation commands.
//!
//! ```text
//! Console
//!   show     print a line
//!   confirm  [y/N]
//!   ask      free text, None on EOF
//!   choose   numbered options, None to abort
//!
//! TerminalConsole   stdout + stdin
//! ScriptedConsole   canned answers, records output
//! ```

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

pub trait Console {
    fn show(&mut self, line: &str);

    /// Ask a yes/no question. Anything but `y`/`yes` is no.
    ///
    /// # Errors
    ///
    /// Returns an error if the answer cannot be read.
    fn confirm(&mut self, question: &str) -> io::Result<bool>;

    /// Ask for a line of text. `None` if input is closed.
    ///
    /// # Errors
    ///
    /// Returns an error if the answer cannot be read.
    fn ask(&mut self, question: &str) -> io::Result<Option<String>>;

    /// Offer numbered options. `None` if the answer is not a valid number.
    ///
    /// # Errors
    ///
    /// Returns an error if the answer cannot be read.
    fn choose(&mut self, question: &str, options: &[String]) -> io::Result<Option<usize>> {
        self.show(question);
        for (i, option) in options.iter().enumerate() {
            self.show(&format!("  {}) {option}", i + 1));
        }
        let answer = self.ask("Choice")?;
        Ok(answer
            .and_then(|a| a.trim().parse::<usize>().ok())
            .and_then(|n| n.checked_sub(1))
            .filter(|&n| n < options.len()))
    }
}

/// Interactive terminal.
#[derive(Debug, Default)]
pub struct TerminalConsole;

impl TerminalConsole {
    fn read_line(prompt: &str) -> io::Result<Option<String>> {
        print!("{prompt}");
        io::stdout().flush()?;

        let mut input = String::new();
        let read = io::stdin().lock().read_line(&mut input)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(input.trim().to_string()))
    }
}

impl Console for TerminalConsole {
    fn show(&mut self, line: &str) {
        println!("{line}");
    }

    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        let response = Self::read_line(&format!("{question} [y/N]: "))?
            .unwrap_or_default()
            .to_lowercase();
        Ok(matches!(response.as_str(), "y" | "yes"))
    }

    fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        Self::read_line(&format!("{question}: "))
    }
}

/// Non-interactive console fed with canned answers.
///
/// Every question consumes one answer; running out behaves like closed input.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    answers: VecDeque<String>,
    /// Lines shown and questions asked, in order.
    pub transcript: Vec<String>,
}

impl ScriptedConsole {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            transcript: Vec::new(),
        }
    }

    /// Questions asked so far, without the shown lines.
    #[must_use]
    pub fn questions(&self) -> Vec<&str> {
        self.transcript
            .iter()
            .filter_map(|l| l.strip_prefix("? "))
            .collect()
    }

    #[must_use]
    pub fn output(&self) -> String {
        self.transcript.join("\n")
    }
}

impl Console for ScriptedConsole {
    fn show(&mut self, line: &str) {
        self.transcript.push(line.to_string());
    }

    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        let answer = self.ask(question)?.unwrap_or_default().to_lowercase();
        Ok(matches!(answer.as_str(), "y" | "yes"))
    }

    fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        self.transcript.push(format!("? {question}"));
        Ok(self.answers.pop_front())
    }
}

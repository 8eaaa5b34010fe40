//! Operator interaction as request/response messages.
//!
//! The resolver never touches stdin/stdout directly; it sends
//! [`MenuRequest`]s and [`InputRequest`]s to a [`Prompter`]. The terminal
//! implementation renders a numbered menu, the scripted one replays
//! pre-programmed answers for tests and unattended runs.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use async_trait::async_trait;
use parking_lot::Mutex;

const SEPARATOR_WIDTH: usize = 40;

/// What the operator sees about the file being resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileContext {
    /// 1-based index and total
    pub position: Option<(usize, usize)>,
    /// Label built from the file's embedded tags
    pub original_label: String,
    /// File name as found on disk
    pub display_name: String,
    /// `m:ss`
    pub duration: Option<String>,
}

impl FileContext {
    /// Header lines printed above every prompt for this file.
    pub fn header_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(4);
        if let Some((current, total)) = self.position {
            lines.push(format!("[Track {current}/{total}]"));
        }
        lines.push(format!("[{}]", self.original_label));
        lines.push(format!("\"{}\"", self.display_name));
        if let Some(duration) = &self.duration {
            lines.push(format!("Length: {duration}"));
        }
        lines
    }
}

/// Single-choice menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuRequest {
    pub context: FileContext,
    pub message: String,
    pub options: Vec<String>,
}

/// Free-text question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRequest {
    pub context: FileContext,
    pub message: String,
}

/// Delivery medium for operator prompts.
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Index of the chosen option, or `None` when no answer was given.
    async fn select(&self, request: &MenuRequest) -> Option<usize>;

    /// Text entered by the operator, or `None` when no answer was given.
    async fn input(&self, request: &InputRequest) -> Option<String>;

    /// One-line notice (e.g. "lookup failed, returning to menu").
    fn notify(&self, message: &str);
}

/// Numbered menus on stdout, answers from stdin.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    pub fn new() -> Self {
        Self
    }

    fn print_header(context: &FileContext) {
        let mut out = io::stdout().lock();
        let _ = writeln!(out);
        for line in context.header_lines() {
            let _ = writeln!(out, "{line}");
        }
        let _ = writeln!(out, "{}\n", "─".repeat(SEPARATOR_WIDTH));
    }

    fn print_prompt(text: &str) {
        let mut out = io::stdout().lock();
        let _ = write!(out, "{text}");
        let _ = out.flush();
    }

    /// Read one line on a blocking thread. `None` on EOF or read error.
    async fn read_line() -> Option<String> {
        let line = tokio::task::spawn_blocking(|| {
            let mut buf = String::new();
            match io::stdin().lock().read_line(&mut buf) {
                Ok(0) => None,
                Ok(_) => Some(buf),
                Err(e) => {
                    tracing::warn!("Failed to read operator input: {}", e);
                    None
                }
            }
        })
        .await
        .ok()
        .flatten()?;

        Some(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

#[async_trait]
impl Prompter for TerminalPrompter {
    async fn select(&self, request: &MenuRequest) -> Option<usize> {
        Self::print_header(&request.context);
        println!("{}", request.message);
        for (i, option) in request.options.iter().enumerate() {
            println!("  {:>2}. {}", i + 1, option);
        }

        let count = request.options.len();
        loop {
            Self::print_prompt(&format!("\nEnter number [1-{count}]: "));
            let answer = Self::read_line().await?;
            match answer.trim().parse::<usize>() {
                Ok(n) if (1..=count).contains(&n) => return Some(n - 1),
                _ => println!("Please enter a number between 1 and {count}."),
            }
        }
    }

    async fn input(&self, request: &InputRequest) -> Option<String> {
        Self::print_header(&request.context);
        println!("{}", request.message);
        Self::print_prompt("> ");
        Self::read_line().await
    }

    fn notify(&self, message: &str) {
        println!("{message}");
    }
}

/// One pre-programmed answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedAnswer {
    /// Pick the option at this index
    Choose(usize),
    /// Pick the option with this exact label
    ChooseLabel(String),
    /// Answer a text question
    Text(String),
    /// Give no answer
    NoResponse,
}

/// Everything a scripted prompter was asked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptRecord {
    Menu(MenuRequest),
    Input(InputRequest),
    Notice(String),
}

/// Replays answers in order and records every request.
///
/// When the script runs out every prompt gets no answer, so an empty
/// script skips every ambiguous file.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<ScriptedAnswer>>,
    transcript: Mutex<Vec<PromptRecord>>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = ScriptedAnswer>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            transcript: Mutex::new(Vec::new()),
        }
    }

    /// Answers nothing; used for non-interactive runs.
    pub fn unattended() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> Vec<PromptRecord> {
        self.transcript.lock().clone()
    }

    /// Menus shown so far.
    pub fn menus(&self) -> Vec<MenuRequest> {
        self.transcript
            .lock()
            .iter()
            .filter_map(|r| match r {
                PromptRecord::Menu(m) => Some(m.clone()),
                _ => None,
            })
            .collect()
    }

    /// Answers not consumed yet.
    pub fn remaining(&self) -> usize {
        self.answers.lock().len()
    }

    fn next_answer(&self) -> Option<ScriptedAnswer> {
        self.answers.lock().pop_front()
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn select(&self, request: &MenuRequest) -> Option<usize> {
        self.transcript.lock().push(PromptRecord::Menu(request.clone()));

        match self.next_answer()? {
            ScriptedAnswer::Choose(i) if i < request.options.len() => Some(i),
            ScriptedAnswer::ChooseLabel(label) => {
                request.options.iter().position(|o| *o == label)
            }
            other => {
                tracing::debug!("Scripted answer {:?} does not fit a menu", other);
                None
            }
        }
    }

    async fn input(&self, request: &InputRequest) -> Option<String> {
        self.transcript.lock().push(PromptRecord::Input(request.clone()));

        match self.next_answer()? {
            ScriptedAnswer::Text(text) => Some(text),
            other => {
                tracing::debug!("Scripted answer {:?} does not fit a question", other);
                None
            }
        }
    }

    fn notify(&self, message: &str) {
        self.transcript
            .lock()
            .push(PromptRecord::Notice(message.to_string()));
    }
}

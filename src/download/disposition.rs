//! What to do with a downloaded file that is not a PDF.
//!
//! The policy is fixed for the whole run. Under [`NonPdfPolicy::Prompt`] the
//! operator is asked per file; the exchange is a small state machine:
//!
//! ```text
//! AwaitingInput --"", y, yes--> Decided(Remove)
//! AwaitingInput --n, no------> Decided(Keep)
//! AwaitingInput --other------> Retry --usage hint--> AwaitingInput
//! ```

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Handling of downloads that fail the PDF signature check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NonPdfPolicy {
    /// Ask the operator for every invalid file
    #[default]
    Prompt,
    /// Delete invalid files without asking
    #[serde(alias = "remove")]
    AutoRemove,
    /// Keep invalid files without asking
    #[serde(alias = "keep")]
    AutoKeep,
}

/// Final decision for one invalid file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Remove,
    Keep,
}

/// Classification of one line of operator input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Invalid,
}

impl Answer {
    /// Case-insensitive; an empty answer means yes. Only the line ending is
    /// stripped, so stray whitespace is never taken as consent to delete.
    pub fn classify(input: &str) -> Self {
        match input.trim_end_matches(['\r', '\n']).to_lowercase().as_str() {
            "" | "y" | "yes" => Answer::Yes,
            "n" | "no" => Answer::No,
            _ => Answer::Invalid,
        }
    }
}

/// State of the removal prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptState {
    AwaitingInput,
    Retry,
    Decided(Disposition),
}

impl PromptState {
    /// Transition on one line of input.
    pub fn on_input(self, input: &str) -> Self {
        match self {
            PromptState::AwaitingInput => match Answer::classify(input) {
                Answer::Yes => PromptState::Decided(Disposition::Remove),
                Answer::No => PromptState::Decided(Disposition::Keep),
                Answer::Invalid => PromptState::Retry,
            },
            other => other,
        }
    }
}

/// Line-based channel to the person running the program
pub trait Operator: Send {
    /// Show `question` and read one line; `None` at end of input.
    fn ask(&mut self, question: &str) -> io::Result<Option<String>>;

    /// Tell the operator their answer was not understood.
    fn complain(&mut self, message: &str);
}

pub const USAGE_HINT: &str = "valid choices are 'y' and 'n'";

/// Question shown for an invalid file
pub fn removal_question(path: &Path) -> String {
    format!(
        "downloaded file {} is not a pdf; remove file? (y/n): ",
        path.display()
    )
}

/// Ask until the operator gives a valid answer.
///
/// End of input is an error: without it the loop could never terminate.
pub fn ask_disposition(path: &Path, operator: &mut dyn Operator) -> io::Result<Disposition> {
    let question = removal_question(path);
    let mut state = PromptState::AwaitingInput;

    loop {
        state = match state {
            PromptState::Decided(disposition) => return Ok(disposition),
            PromptState::Retry => {
                operator.complain(USAGE_HINT);
                PromptState::AwaitingInput
            }
            PromptState::AwaitingInput => match operator.ask(&question)? {
                Some(line) => state.on_input(&line),
                None => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "input closed while waiting for an answer",
                    ))
                }
            },
        };
    }
}

/// Decide the fate of an invalid file under `policy`.
pub fn decide(
    policy: NonPdfPolicy,
    path: &Path,
    operator: &mut dyn Operator,
) -> io::Result<Disposition> {
    match policy {
        NonPdfPolicy::AutoKeep => Ok(Disposition::Keep),
        NonPdfPolicy::AutoRemove => Ok(Disposition::Remove),
        NonPdfPolicy::Prompt => ask_disposition(path, operator),
    }
}

/// Operator fed from a fixed list of answers, for tests and non-interactive use
#[derive(Debug, Default)]
pub struct ScriptedOperator {
    answers: std::collections::VecDeque<String>,
    pub questions: Vec<String>,
    pub complaints: Vec<String>,
}

impl ScriptedOperator {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            questions: Vec::new(),
            complaints: Vec::new(),
        }
    }
}

impl Operator for ScriptedOperator {
    fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        self.questions.push(question.to_string());
        Ok(self.answers.pop_front())
    }

    fn complain(&mut self, message: &str) {
        self.complaints.push(message.to_string());
    }
}

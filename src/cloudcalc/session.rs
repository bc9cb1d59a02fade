//! The calculator interaction state machine.
//!
//! A [`Session`] owns everything the presentation layer shows: the input
//! buffer, the last result, the mode, the AI busy flag, the AI explanation and
//! the [`HistoryLog`]. User actions are applied with [`Session::apply`], which
//! never performs I/O. When an AI-mode `Evaluate` is admitted, `apply` returns
//! [`Outcome::AiRequested`] and the session stays busy until the matching
//! [`Session::settle_ai`] call; the async plumbing around that lives in
//! [`Calculator`](crate::Calculator).
//!
//! ```rust
//! use cloudcalc::session::{Action, Session};
//!
//! let mut session = Session::new();
//! session.apply(Action::append("2"));
//! session.apply(Action::append("+"));
//! session.apply(Action::append("6"));
//! session.apply(Action::Evaluate);
//! assert_eq!(session.last_result(), "8");
//!
//! // An operator continues from the previous result.
//! session.apply(Action::append("*"));
//! assert_eq!(session.input_buffer(), "8*");
//! assert_eq!(session.last_result(), "");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cloudcalc::evaluator::{self, EvalError};
use crate::cloudcalc::history::{HistoryEntry, HistoryLog};
use crate::cloudcalc::resolver::{AiResolutionFailed, AiSolution};

/// Result text shown for any failed evaluation.
pub const ERROR_DISPLAY: &str = "Erro";
/// Explanation shown while an AI request is in flight.
pub const THINKING_EXPLANATION: &str = "Pensando...";
/// Explanation shown when the AI resolver fails.
pub const AI_FAILURE_EXPLANATION: &str = "Falha na conexão.";

/// Which evaluation path `Evaluate` takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalculatorMode {
    #[default]
    Standard,
    Ai,
}

impl CalculatorMode {
    /// Placeholder text for an empty input area.
    pub fn placeholder(&self) -> &'static str {
        match self {
            CalculatorMode::Standard => "0",
            CalculatorMode::Ai => "Digite um problema matemático...",
        }
    }

    /// Short label for the mode switcher.
    pub fn label(&self) -> &'static str {
        match self {
            CalculatorMode::Standard => "Padrão",
            CalculatorMode::Ai => "IA",
        }
    }
}

impl fmt::Display for CalculatorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalculatorMode::Standard => write!(f, "STANDARD"),
            CalculatorMode::Ai => write!(f, "AI"),
        }
    }
}

/// How an appended key interacts with a previous result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Digits, `.` and parentheses: start fresh input after a result.
    Operand,
    /// `+ - * / %`: continue from the previous result.
    Operator,
}

impl KeyKind {
    /// Classify keypad text the way the standard keypad does.
    pub fn classify(value: &str) -> Self {
        match value {
            "+" | "-" | "*" | "/" | "%" => KeyKind::Operator,
            _ => KeyKind::Operand,
        }
    }
}

/// Everything a user can do to a session.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    AppendToken { value: String, kind: KeyKind },
    Clear,
    SwitchMode(CalculatorMode),
    Evaluate,
    SelectHistoryEntry(HistoryEntry),
    ClearHistory,
}

impl Action {
    /// `AppendToken` with the kind inferred by [`KeyKind::classify`].
    pub fn append(value: impl Into<String>) -> Self {
        let value = value.into();
        let kind = KeyKind::classify(&value);
        Action::AppendToken { value, kind }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::AppendToken { .. } => "AppendToken",
            Action::Clear => "Clear",
            Action::SwitchMode(_) => "SwitchMode",
            Action::Evaluate => "Evaluate",
            Action::SelectHistoryEntry(_) => "SelectHistoryEntry",
            Action::ClearHistory => "ClearHistory",
        }
    }
}

/// A pending call to the AI resolver. The id must be handed back on settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiRequest {
    pub id: Uuid,
    pub input: String,
}

/// What [`Session::apply`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// State changed without an evaluation.
    Applied,
    /// The action had no effect (same-mode switch, blank or busy AI evaluate).
    Ignored,
    /// A standard evaluation ran. On success carries the recorded entry and
    /// any entry evicted to make room for it.
    Evaluated(Result<Recorded, EvalError>),
    /// An AI evaluation was admitted; the session is now busy.
    AiRequested(AiRequest),
}

/// A history write: the new entry plus the one pushed out, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub entry: HistoryEntry,
    pub evicted: Option<HistoryEntry>,
}

/// Read-only view of a session for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub input_buffer: String,
    pub last_result: String,
    pub mode: CalculatorMode,
    pub is_busy: bool,
    pub explanation: String,
    pub history: Vec<HistoryEntry>,
}

/// Mutable calculator state. One per interactive surface, single writer.
#[derive(Debug, Clone, Default)]
pub struct Session {
    input_buffer: String,
    last_result: String,
    mode: CalculatorMode,
    explanation: String,
    pending: Option<AiRequest>,
    history: HistoryLog,
}

impl Session {
    /// Empty buffer and result, STANDARD mode, empty history.
    pub fn new() -> Self {
        Session::default()
    }

    pub fn input_buffer(&self) -> &str {
        &self.input_buffer
    }

    pub fn last_result(&self) -> &str {
        &self.last_result
    }

    pub fn mode(&self) -> CalculatorMode {
        self.mode
    }

    /// True only while an AI request is outstanding.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// The outstanding AI request, if any.
    pub fn pending_request(&self) -> Option<&AiRequest> {
        self.pending.as_ref()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            input_buffer: self.input_buffer.clone(),
            last_result: self.last_result.clone(),
            mode: self.mode,
            is_busy: self.is_busy(),
            explanation: self.explanation.clone(),
            history: self.history.to_vec(),
        }
    }

    /// Apply one user action.
    pub fn apply(&mut self, action: Action) -> Outcome {
        log::debug!("session: applying {}", action.name());
        match action {
            Action::AppendToken { value, kind } => {
                self.append(&value, kind);
                Outcome::Applied
            }
            Action::Clear => {
                self.reset_display();
                Outcome::Applied
            }
            Action::SwitchMode(mode) => {
                if mode == self.mode {
                    return Outcome::Ignored;
                }
                self.reset_display();
                self.mode = mode;
                Outcome::Applied
            }
            Action::Evaluate => match self.mode {
                CalculatorMode::Standard => Outcome::Evaluated(self.evaluate_standard()),
                CalculatorMode::Ai => self.request_ai(),
            },
            Action::SelectHistoryEntry(entry) => {
                self.input_buffer = entry.expression;
                self.last_result = entry.result;
                self.clear_explanation();
                self.mode = if entry.via_ai {
                    CalculatorMode::Ai
                } else {
                    CalculatorMode::Standard
                };
                Outcome::Applied
            }
            Action::ClearHistory => {
                self.history.clear();
                Outcome::Applied
            }
        }
    }

    /// Complete the outstanding AI request.
    ///
    /// Returns `None` without touching state when `request_id` does not match
    /// the pending request. On success the result is recorded in history; on
    /// failure the display shows [`ERROR_DISPLAY`] and history is left alone.
    pub fn settle_ai(
        &mut self,
        request_id: Uuid,
        outcome: Result<AiSolution, AiResolutionFailed>,
    ) -> Option<Result<Recorded, AiResolutionFailed>> {
        let request = match self.pending.take() {
            Some(request) if request.id == request_id => request,
            other => {
                log::warn!("session: ignoring settlement for unknown request {}", request_id);
                self.pending = other;
                return None;
            }
        };

        match outcome {
            Ok(solution) => {
                self.last_result = solution.result.clone();
                self.explanation = solution.explanation;
                let entry = HistoryEntry::new(request.input, solution.result, true);
                let evicted = self.history.record(entry.clone());
                Some(Ok(Recorded { entry, evicted }))
            }
            Err(failure) => {
                self.last_result = ERROR_DISPLAY.to_string();
                self.explanation = AI_FAILURE_EXPLANATION.to_string();
                Some(Err(failure))
            }
        }
    }

    fn append(&mut self, value: &str, kind: KeyKind) {
        if self.last_result.is_empty() {
            self.input_buffer.push_str(value);
            return;
        }

        self.input_buffer = match kind {
            KeyKind::Operator => format!("{}{}", self.last_result, value),
            KeyKind::Operand => value.to_string(),
        };
        self.last_result.clear();
        self.clear_explanation();
    }

    fn reset_display(&mut self) {
        self.input_buffer.clear();
        self.last_result.clear();
        self.clear_explanation();
    }

    /// The thinking text stays up for as long as a request is in flight.
    fn clear_explanation(&mut self) {
        if self.pending.is_some() {
            self.explanation = THINKING_EXPLANATION.to_string();
        } else {
            self.explanation.clear();
        }
    }

    fn evaluate_standard(&mut self) -> Result<Recorded, EvalError> {
        self.clear_explanation();
        match evaluator::evaluate(&self.input_buffer) {
            Ok(value) => {
                self.last_result = evaluator::format_result(value);
                let entry = HistoryEntry::new(self.input_buffer.clone(), self.last_result.clone(), false);
                let evicted = self.history.record(entry.clone());
                Ok(Recorded { entry, evicted })
            }
            Err(err) => {
                self.last_result = ERROR_DISPLAY.to_string();
                Err(err)
            }
        }
    }

    fn request_ai(&mut self) -> Outcome {
        if self.input_buffer.trim().is_empty() || self.pending.is_some() {
            return Outcome::Ignored;
        }

        let request = AiRequest {
            id: Uuid::new_v4(),
            input: self.input_buffer.clone(),
        };
        self.pending = Some(request.clone());
        self.last_result.clear();
        self.explanation = THINKING_EXPLANATION.to_string();
        Outcome::AiRequested(request)
    }
}

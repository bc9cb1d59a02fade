//! # CloudCalc
//!
//! CloudCalc is the core of an interactive calculator with an optional
//! "AI mode". It contains no rendering code: a presentation layer sends
//! discrete [`Action`]s and renders the [`Snapshot`] it gets back.
//!
//! The crate provides:
//!
//! * **Expression Evaluation**: [`evaluator`] tokenizes, parses and evaluates
//!   keypad arithmetic (`+ - * /`, parentheses, unary minus, postfix `%`) without
//!   ever executing the input as code, and reports typed [`EvalError`]s.
//! * **Session State Machine**: [`Session`] holds the input buffer, last result,
//!   mode, AI busy flag, explanation and a [`HistoryLog`] capped at 50 entries,
//!   and defines how every action changes them.
//! * **Async Driver**: [`Calculator`] wraps a session for use from an event loop,
//!   running AI requests through a single-slot admission gate.
//! * **AI Resolver**: [`resolver::AiResolver`] is the seam to the external
//!   reasoning service; [`resolver::LlmResolver`] implements it over the
//!   [`ClientWrapper`] trait, with Gemini and OpenAI clients in [`clients`].
//!
//! ## Standard mode
//!
//! ```rust
//! use cloudcalc::{Action, Session};
//!
//! let mut session = Session::new();
//! for key in ["5", "0", "%", "+", "1", "0"] {
//!     session.apply(Action::append(key));
//! }
//! session.apply(Action::Evaluate);
//! assert_eq!(session.last_result(), "10.5");
//!
//! // Failures show "Erro" and never reach history.
//! session.apply(Action::Clear);
//! session.apply(Action::append("1/0"));
//! session.apply(Action::Evaluate);
//! assert_eq!(session.last_result(), "Erro");
//! assert_eq!(session.history().len(), 1);
//! ```
//!
//! ## AI mode
//!
//! ```rust,no_run
//! use cloudcalc::{Action, Calculator, CalculatorMode, CloudCalcConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     cloudcalc::init_logger();
//!
//!     // Reads CLOUDCALC_PROVIDER, CLOUDCALC_API_KEY / API_KEY / GEMINI_API_KEY, ...
//!     let calc = Calculator::from_config(&CloudCalcConfig::from_env());
//!
//!     calc.dispatch(Action::SwitchMode(CalculatorMode::Ai)).await;
//!     calc.dispatch(Action::append("Quanto é a raiz quadrada de 144 mais 15%?")).await;
//!     let view = calc.dispatch(Action::Evaluate).await;
//!     println!("{} ({})", view.last_result, view.explanation);
//! }
//! ```

use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Initialise the global [`env_logger`] subscriber exactly once.
///
/// The helper is intentionally lightweight so that applications embedding CloudCalc can opt-in
/// to simple `RUST_LOG` driven diagnostics without having to choose a specific logging backend
/// upfront.
///
/// ```rust
/// cloudcalc::init_logger();
/// log::info!("Logger is ready");
/// ```
pub fn init_logger() {
    INIT_LOGGER.call_once(|| {
        env_logger::init();
    });
}

// Import the top-level `cloudcalc` module.
pub mod cloudcalc;

// Re-exporting key items for easier external access.
pub use cloudcalc::calculator::Calculator;
pub use cloudcalc::client_wrapper;
pub use cloudcalc::client_wrapper::{ClientWrapper, Message, Role, TokenUsage};
pub use cloudcalc::clients;
pub use cloudcalc::config;
pub use cloudcalc::config::{CloudCalcConfig, Provider};
pub use cloudcalc::evaluator;
pub use cloudcalc::evaluator::{evaluate, EvalError};
pub use cloudcalc::event;
pub use cloudcalc::event::{EventHandler, SessionEvent};
pub use cloudcalc::history;
pub use cloudcalc::history::{HistoryEntry, HistoryLog, HISTORY_CAPACITY};
pub use cloudcalc::resolver;
pub use cloudcalc::resolver::{AiResolutionFailed, AiResolver, AiSolution};
pub use cloudcalc::session;
pub use cloudcalc::session::{Action, CalculatorMode, KeyKind, Outcome, Session, Snapshot};

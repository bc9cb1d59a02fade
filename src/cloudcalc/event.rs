//! Calculator event system.
//!
//! Provides a callback-based observability layer for the [`Calculator`](crate::Calculator)
//! driver. Implement [`EventHandler`] to receive notifications about:
//!
//! - **Evaluations**: standard and AI results, and failures with their reason
//! - **AI admission gate**: requests started, dropped while busy, and settled
//! - **History**: evictions past capacity and explicit clears
//! - **Mode switches**
//!
//! The single method has a default no-op implementation, so a handler only
//! matches the variants it cares about.
//!
//! # Example
//!
//! ```rust,no_run
//! use cloudcalc::event::{EventHandler, SessionEvent};
//! use async_trait::async_trait;
//!
//! struct PrintHandler;
//!
//! #[async_trait]
//! impl EventHandler for PrintHandler {
//!     async fn on_session_event(&self, event: &SessionEvent) {
//!         match event {
//!             SessionEvent::EvaluationSucceeded { expression, result, .. } => {
//!                 println!("{} = {}", expression, result);
//!             }
//!             SessionEvent::AiRequestDropped { .. } => println!("still thinking..."),
//!             _ => {}
//!         }
//!     }
//! }
//! ```

use async_trait::async_trait;
use uuid::Uuid;

use crate::cloudcalc::history::HistoryEntry;
use crate::cloudcalc::session::CalculatorMode;

/// Events emitted by [`Calculator::dispatch`](crate::Calculator::dispatch).
///
/// ```text
/// Evaluate (STANDARD)  -> EvaluationSucceeded [HistoryEvicted] | EvaluationFailed
/// Evaluate (AI)        -> AiRequestStarted ... AiRequestSettled
///                           -> EvaluationSucceeded [HistoryEvicted] | EvaluationFailed
/// Evaluate (AI, busy)  -> AiRequestDropped
/// ```
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A result was displayed and recorded in history.
    EvaluationSucceeded {
        expression: String,
        result: String,
        via_ai: bool,
    },

    /// An evaluation failed and the display shows the error text.
    EvaluationFailed {
        expression: String,
        /// Evaluator error or resolver failure, for diagnostics only.
        reason: String,
        via_ai: bool,
    },

    /// An AI request passed the admission gate.
    AiRequestStarted { request_id: Uuid, input: String },

    /// An AI `Evaluate` was dropped because a request is already in flight.
    AiRequestDropped { in_flight: Uuid },

    /// The resolver answered (successfully or not) and the gate reopened.
    AiRequestSettled { request_id: Uuid, success: bool },

    /// The mode changed, by a mode switch or by restoring a history entry.
    ModeSwitched {
        from: CalculatorMode,
        to: CalculatorMode,
    },

    /// The oldest entry was evicted to keep history within capacity.
    HistoryEvicted { entry: HistoryEntry },

    HistoryCleared,
}

/// Receiver of [`SessionEvent`]s. Shared as `Arc<dyn EventHandler>`.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn on_session_event(&self, _event: &SessionEvent) {}
}

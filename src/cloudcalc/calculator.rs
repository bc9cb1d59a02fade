//! Async driver around a [`Session`].
//!
//! [`Calculator`] is what a presentation layer talks to: it sends
//! [`Action`]s through [`Calculator::dispatch`] and renders the returned
//! [`Snapshot`]. Standard evaluation completes inside the call. An AI
//! evaluation releases the session lock while the [`AiResolver`] works, so
//! the surface stays responsive and further actions are applied meanwhile;
//! another AI `Evaluate` during that window is dropped by the session's
//! admission gate, not queued.
//!
//! If the `dispatch` future of an admitted AI request is dropped before the
//! resolver answers (a `timeout`, a `select!`, a closed UI task), the request
//! is settled as failed so the gate reopens.
//!
//! ```rust
//! use std::sync::Arc;
//! use cloudcalc::{Action, Calculator, CalculatorMode};
//! use cloudcalc::resolver::UnconfiguredResolver;
//!
//! #[tokio::main]
//! async fn main() {
//!     let calc = Calculator::new(Arc::new(UnconfiguredResolver));
//!
//!     for key in ["1", "2", "*", "3"] {
//!         calc.dispatch(Action::append(key)).await;
//!     }
//!     let view = calc.dispatch(Action::Evaluate).await;
//!     assert_eq!(view.last_result, "36");
//!     assert_eq!(view.history.len(), 1);
//!
//!     // Without credentials AI mode reports an error instead of crashing.
//!     calc.dispatch(Action::SwitchMode(CalculatorMode::Ai)).await;
//!     calc.dispatch(Action::append("15% of 200")).await;
//!     let view = calc.dispatch(Action::Evaluate).await;
//!     assert_eq!(view.last_result, "Erro");
//!     assert!(!view.is_busy);
//! }
//! ```

use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::cloudcalc::config::CloudCalcConfig;
use crate::cloudcalc::event::{EventHandler, SessionEvent};
use crate::cloudcalc::resolver::{build_resolver, AiResolutionFailed, AiResolver};
use crate::cloudcalc::session::{Action, AiRequest, Outcome, Recorded, Session, Snapshot};

/// One interactive calculator: a session, the AI collaborator, and an
/// optional event handler.
pub struct Calculator {
    session: Arc<Mutex<Session>>,
    resolver: Arc<dyn AiResolver>,
    event_handler: Option<Arc<dyn EventHandler>>,
}

impl Calculator {
    /// Create a calculator in its initial state (STANDARD, empty).
    pub fn new(resolver: Arc<dyn AiResolver>) -> Self {
        Calculator {
            session: Arc::new(Mutex::new(Session::new())),
            resolver,
            event_handler: None,
        }
    }

    /// Create a calculator whose AI mode is backed by the provider in `config`.
    pub fn from_config(config: &CloudCalcConfig) -> Self {
        Self::new(build_resolver(config))
    }

    pub fn with_event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    /// Current state for rendering.
    pub async fn snapshot(&self) -> Snapshot {
        self.session.lock().await.snapshot()
    }

    /// Apply `action` and return the resulting state.
    ///
    /// For an admitted AI `Evaluate` this waits until the resolver settles;
    /// there is no timeout.
    pub async fn dispatch(&self, action: Action) -> Snapshot {
        let (outcome, events) = {
            let mut session = self.session.lock().await;
            let mode_before = session.mode();
            let expression = session.input_buffer().to_string();
            let in_flight = session.pending_request().map(|request| request.id);
            let is_evaluate = matches!(action, Action::Evaluate);
            let is_clear_history = matches!(action, Action::ClearHistory);

            let outcome = session.apply(action);
            let mut events = Vec::new();
            match &outcome {
                Outcome::Applied => {
                    if session.mode() != mode_before {
                        events.push(SessionEvent::ModeSwitched {
                            from: mode_before,
                            to: session.mode(),
                        });
                    }
                    if is_clear_history {
                        events.push(SessionEvent::HistoryCleared);
                    }
                }
                Outcome::Ignored => match in_flight {
                    Some(in_flight) if is_evaluate => {
                        log::warn!("Calculator: AI request {} in flight, dropping Evaluate", in_flight);
                        events.push(SessionEvent::AiRequestDropped { in_flight });
                    }
                    _ => log::debug!("Calculator: action had no effect"),
                },
                Outcome::Evaluated(Ok(recorded)) => {
                    log::info!(
                        "Calculator: {} = {}",
                        recorded.entry.expression,
                        recorded.entry.result
                    );
                    events.extend(recorded_events(recorded));
                }
                Outcome::Evaluated(Err(err)) => {
                    log::info!("Calculator: '{}' failed: {}", expression, err);
                    events.push(SessionEvent::EvaluationFailed {
                        expression,
                        reason: err.to_string(),
                        via_ai: false,
                    });
                }
                Outcome::AiRequested(request) => {
                    log::info!("Calculator: AI request {} started", request.id);
                    events.push(SessionEvent::AiRequestStarted {
                        request_id: request.id,
                        input: request.input.clone(),
                    });
                }
            }
            (outcome, events)
        };

        // Armed before the first await so an early drop still settles.
        let request = match outcome {
            Outcome::AiRequested(request) => {
                let guard = AbandonGuard::new(Arc::clone(&self.session), request.id);
                Some((request, guard))
            }
            _ => None,
        };

        self.emit_all(events).await;

        if let Some((request, guard)) = request {
            self.resolve(request, guard).await;
        }

        self.snapshot().await
    }

    async fn resolve(&self, request: AiRequest, mut guard: AbandonGuard) {
        let outcome = self.resolver.resolve(&request.input).await;

        let events = {
            let mut session = self.session.lock().await;
            let settled = session.settle_ai(request.id, outcome);
            guard.disarm();
            let Some(settled) = settled else {
                return;
            };

            let mut events = vec![SessionEvent::AiRequestSettled {
                request_id: request.id,
                success: settled.is_ok(),
            }];
            match settled {
                Ok(recorded) => {
                    log::info!("Calculator: AI request {} resolved", request.id);
                    events.extend(recorded_events(&recorded));
                }
                Err(failure) => {
                    log::warn!("Calculator: AI request {} failed: {}", request.id, failure);
                    events.push(SessionEvent::EvaluationFailed {
                        expression: request.input.clone(),
                        reason: failure.to_string(),
                        via_ai: true,
                    });
                }
            }
            events
        };

        self.emit_all(events).await;
    }

    async fn emit_all(&self, events: Vec<SessionEvent>) {
        if let Some(handler) = &self.event_handler {
            for event in &events {
                handler.on_session_event(event).await;
            }
        }
    }
}

/// Fails an admitted AI request if the future driving it is dropped before
/// the resolver's answer is applied.
struct AbandonGuard {
    session: Arc<Mutex<Session>>,
    request_id: Option<Uuid>,
}

impl AbandonGuard {
    fn new(session: Arc<Mutex<Session>>, request_id: Uuid) -> Self {
        AbandonGuard {
            session,
            request_id: Some(request_id),
        }
    }

    fn disarm(&mut self) {
        self.request_id = None;
    }
}

impl Drop for AbandonGuard {
    fn drop(&mut self) {
        let Some(request_id) = self.request_id.take() else {
            return;
        };
        log::warn!("Calculator: AI request {} abandoned before settling", request_id);

        if let Ok(mut session) = self.session.try_lock() {
            session.settle_ai(request_id, Err(AiResolutionFailed::new("request abandoned")));
            return;
        }
        // Another dispatch holds the lock for a moment; settle once it is released.
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let session = Arc::clone(&self.session);
                handle.spawn(async move {
                    session
                        .lock()
                        .await
                        .settle_ai(request_id, Err(AiResolutionFailed::new("request abandoned")));
                });
            }
            Err(err) => log::error!(
                "Calculator: cannot settle abandoned request {}: {}",
                request_id,
                err
            ),
        }
    }
}

fn recorded_events(recorded: &Recorded) -> Vec<SessionEvent> {
    let mut events = vec![SessionEvent::EvaluationSucceeded {
        expression: recorded.entry.expression.clone(),
        result: recorded.entry.result.clone(),
        via_ai: recorded.entry.via_ai,
    }];
    if let Some(evicted) = &recorded.evicted {
        events.push(SessionEvent::HistoryEvicted {
            entry: evicted.clone(),
        });
    }
    events
}

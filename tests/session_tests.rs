//! Test suite for the calculator session state machine
//!
//! Tests cover:
//! - Appending keys and continuing from a previous result
//! - Standard evaluation and error display
//! - Mode switching and history restore
//! - History capacity and ordering
//! - AI request admission and settlement

use cloudcalc::history::HISTORY_CAPACITY;
use cloudcalc::resolver::{AiResolutionFailed, AiSolution};
use cloudcalc::session::{
    Action, CalculatorMode, KeyKind, Outcome, Session, AI_FAILURE_EXPLANATION, ERROR_DISPLAY,
    THINKING_EXPLANATION,
};
use cloudcalc::{EvalError, HistoryEntry};
use uuid::Uuid;

fn type_keys(session: &mut Session, keys: &[&str]) {
    for key in keys {
        session.apply(Action::append(*key));
    }
}

fn evaluate_text(session: &mut Session, text: &str) -> Outcome {
    session.apply(Action::Clear);
    session.apply(Action::append(text));
    session.apply(Action::Evaluate)
}

fn ai_session_with_pending(input: &str) -> (Session, Uuid) {
    let mut session = Session::new();
    session.apply(Action::SwitchMode(CalculatorMode::Ai));
    session.apply(Action::append(input));
    match session.apply(Action::Evaluate) {
        Outcome::AiRequested(request) => (session, request.id),
        other => panic!("expected an AI request, got {:?}", other),
    }
}

#[test]
fn test_initial_state() {
    let session = Session::new();
    assert_eq!(session.input_buffer(), "");
    assert_eq!(session.last_result(), "");
    assert_eq!(session.mode(), CalculatorMode::Standard);
    assert!(!session.is_busy());
    assert_eq!(session.explanation(), "");
    assert!(session.history().is_empty());
}

#[test]
fn test_key_classification() {
    for key in ["+", "-", "*", "/", "%"] {
        assert_eq!(KeyKind::classify(key), KeyKind::Operator, "{}", key);
    }
    for key in ["0", "7", ".", "(", ")"] {
        assert_eq!(KeyKind::classify(key), KeyKind::Operand, "{}", key);
    }
}

#[test]
fn test_append_concatenates_without_result() {
    let mut session = Session::new();
    type_keys(&mut session, &["1", "2", "+", "3"]);
    assert_eq!(session.input_buffer(), "12+3");
    assert_eq!(session.last_result(), "");
}

#[test]
fn test_standard_evaluation_records_history() {
    let mut session = Session::new();
    type_keys(&mut session, &["2", "+", "2"]);
    let outcome = session.apply(Action::Evaluate);

    let Outcome::Evaluated(Ok(recorded)) = outcome else {
        panic!("expected a successful evaluation");
    };
    assert_eq!(recorded.entry.expression, "2+2");
    assert_eq!(recorded.entry.result, "4");
    assert!(!recorded.entry.via_ai);
    assert!(recorded.evicted.is_none());

    assert_eq!(session.last_result(), "4");
    assert_eq!(session.input_buffer(), "2+2");
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.history().latest(), Some(&recorded.entry));
}

#[test]
fn test_operator_continues_from_result() {
    let mut session = Session::new();
    type_keys(&mut session, &["2", "+", "2"]);
    session.apply(Action::Evaluate);

    session.apply(Action::append("*"));
    assert_eq!(session.input_buffer(), "4*");
    assert_eq!(session.last_result(), "");

    session.apply(Action::append("3"));
    session.apply(Action::Evaluate);
    assert_eq!(session.last_result(), "12");
    assert_eq!(session.history().len(), 2);
    assert_eq!(session.history().latest().unwrap().expression, "4*3");
}

#[test]
fn test_operand_starts_fresh_after_result() {
    let mut session = Session::new();
    type_keys(&mut session, &["2", "+", "2"]);
    session.apply(Action::Evaluate);

    session.apply(Action::append("7"));
    assert_eq!(session.input_buffer(), "7");
    assert_eq!(session.last_result(), "");

    session.apply(Action::Evaluate);
    session.apply(Action::append("("));
    assert_eq!(session.input_buffer(), "(");
}

#[test]
fn test_percent_key_continues_from_result() {
    let mut session = Session::new();
    type_keys(&mut session, &["5", "0"]);
    session.apply(Action::Evaluate);
    session.apply(Action::append("%"));
    assert_eq!(session.input_buffer(), "50%");
    session.apply(Action::Evaluate);
    assert_eq!(session.last_result(), "0.5");
}

#[test]
fn test_explicit_kind_overrides_classification() {
    let mut session = Session::new();
    type_keys(&mut session, &["9"]);
    session.apply(Action::Evaluate);
    session.apply(Action::AppendToken {
        value: "-".to_string(),
        kind: KeyKind::Operand,
    });
    assert_eq!(session.input_buffer(), "-");
}

#[test]
fn test_failed_evaluation_shows_error_and_skips_history() {
    let mut session = Session::new();
    let outcome = evaluate_text(&mut session, "1/0");
    assert_eq!(outcome, Outcome::Evaluated(Err(EvalError::DivisionByZero)));
    assert_eq!(session.last_result(), ERROR_DISPLAY);
    assert_eq!(session.input_buffer(), "1/0");
    assert!(session.history().is_empty());

    let outcome = evaluate_text(&mut session, "2+");
    assert!(matches!(
        outcome,
        Outcome::Evaluated(Err(EvalError::SyntaxError { .. }))
    ));
    assert!(session.history().is_empty());
}

#[test]
fn test_empty_standard_evaluate_is_an_error() {
    let mut session = Session::new();
    let outcome = session.apply(Action::Evaluate);
    assert!(matches!(
        outcome,
        Outcome::Evaluated(Err(EvalError::SyntaxError { .. }))
    ));
    assert_eq!(session.last_result(), ERROR_DISPLAY);
    assert!(session.history().is_empty());
}

#[test]
fn test_typing_after_error_starts_fresh() {
    let mut session = Session::new();
    evaluate_text(&mut session, "1/0");
    session.apply(Action::append("5"));
    assert_eq!(session.input_buffer(), "5");
    assert_eq!(session.last_result(), "");
}

#[test]
fn test_clear_resets_display_but_keeps_history_and_mode() {
    let mut session = Session::new();
    evaluate_text(&mut session, "3*3");
    session.apply(Action::append("+"));
    session.apply(Action::Clear);

    assert_eq!(session.input_buffer(), "");
    assert_eq!(session.last_result(), "");
    assert_eq!(session.explanation(), "");
    assert_eq!(session.mode(), CalculatorMode::Standard);
    assert_eq!(session.history().len(), 1);
}

#[test]
fn test_switch_mode_resets_display() {
    let mut session = Session::new();
    evaluate_text(&mut session, "1+1");

    assert_eq!(
        session.apply(Action::SwitchMode(CalculatorMode::Ai)),
        Outcome::Applied
    );
    assert_eq!(session.mode(), CalculatorMode::Ai);
    assert_eq!(session.input_buffer(), "");
    assert_eq!(session.last_result(), "");
    assert_eq!(session.history().len(), 1);
}

#[test]
fn test_switch_to_same_mode_is_ignored() {
    let mut session = Session::new();
    session.apply(Action::append("12"));
    assert_eq!(
        session.apply(Action::SwitchMode(CalculatorMode::Standard)),
        Outcome::Ignored
    );
    assert_eq!(session.input_buffer(), "12");
}

#[test]
fn test_select_history_entry_restores_state() {
    let mut session = Session::new();
    evaluate_text(&mut session, "6*7");
    let entry = session.history().latest().unwrap().clone();

    session.apply(Action::Clear);
    session.apply(Action::SelectHistoryEntry(entry));
    assert_eq!(session.input_buffer(), "6*7");
    assert_eq!(session.last_result(), "42");
    assert_eq!(session.mode(), CalculatorMode::Standard);
    assert_eq!(session.history().len(), 1);

    // Restored result behaves like a fresh one.
    session.apply(Action::append("+"));
    assert_eq!(session.input_buffer(), "42+");
}

#[test]
fn test_select_ai_entry_switches_to_ai_mode() {
    let mut session = Session::new();
    let entry = HistoryEntry::new("15% de 200", "30", true);
    session.apply(Action::SelectHistoryEntry(entry));
    assert_eq!(session.mode(), CalculatorMode::Ai);
    assert_eq!(session.input_buffer(), "15% de 200");
    assert_eq!(session.last_result(), "30");
    assert_eq!(session.explanation(), "");
}

#[test]
fn test_clear_history_keeps_display() {
    let mut session = Session::new();
    evaluate_text(&mut session, "2*2");
    evaluate_text(&mut session, "3*3");
    session.apply(Action::ClearHistory);

    assert!(session.history().is_empty());
    assert_eq!(session.last_result(), "9");
    assert_eq!(session.input_buffer(), "3*3");
}

#[test]
fn test_history_is_capped_newest_first() {
    let mut session = Session::new();
    let total = HISTORY_CAPACITY + 5;
    let mut evictions = 0;
    for i in 1..=total {
        if let Outcome::Evaluated(Ok(recorded)) = evaluate_text(&mut session, &format!("{}+0", i)) {
            if recorded.evicted.is_some() {
                evictions += 1;
            }
        } else {
            panic!("evaluation {} failed", i);
        }
    }

    assert_eq!(evictions, 5);
    assert_eq!(session.history().len(), HISTORY_CAPACITY);
    assert_eq!(session.history().latest().unwrap().result, total.to_string());
    assert_eq!(
        session.history().get(HISTORY_CAPACITY - 1).unwrap().result,
        "6"
    );
    let results: Vec<_> = session
        .history()
        .iter()
        .map(|entry| entry.result.parse::<usize>().unwrap())
        .collect();
    assert!(results.windows(2).all(|pair| pair[0] > pair[1]));
}

#[test]
fn test_ai_evaluate_admits_request() {
    let (session, id) = ai_session_with_pending("quanto é 15% de 200?");
    assert!(session.is_busy());
    assert_eq!(session.pending_request().unwrap().id, id);
    assert_eq!(session.pending_request().unwrap().input, "quanto é 15% de 200?");
    assert_eq!(session.explanation(), THINKING_EXPLANATION);
    assert_eq!(session.last_result(), "");
}

#[test]
fn test_ai_evaluate_blank_input_is_ignored() {
    let mut session = Session::new();
    session.apply(Action::SwitchMode(CalculatorMode::Ai));
    assert_eq!(session.apply(Action::Evaluate), Outcome::Ignored);
    session.apply(Action::append("   "));
    assert_eq!(session.apply(Action::Evaluate), Outcome::Ignored);
    assert!(!session.is_busy());
    assert_eq!(session.explanation(), "");
}

#[test]
fn test_ai_evaluate_while_busy_is_ignored() {
    let (mut session, id) = ai_session_with_pending("2+2");
    assert_eq!(session.apply(Action::Evaluate), Outcome::Ignored);
    assert_eq!(session.pending_request().unwrap().id, id);
}

#[test]
fn test_ai_success_records_history() {
    let (mut session, id) = ai_session_with_pending("15% of 200");
    let settled = session.settle_ai(
        id,
        Ok(AiSolution {
            result: "30".to_string(),
            explanation: "15% of 200 is 30.".to_string(),
        }),
    );

    let recorded = settled.unwrap().unwrap();
    assert_eq!(recorded.entry.expression, "15% of 200");
    assert_eq!(recorded.entry.result, "30");
    assert!(recorded.entry.via_ai);

    assert!(!session.is_busy());
    assert_eq!(session.last_result(), "30");
    assert_eq!(session.explanation(), "15% of 200 is 30.");
    assert_eq!(session.history().len(), 1);
}

#[test]
fn test_ai_failure_shows_error_without_history() {
    let (mut session, id) = ai_session_with_pending("what?");
    let settled = session.settle_ai(id, Err(AiResolutionFailed::new("timeout")));

    assert!(settled.unwrap().is_err());
    assert!(!session.is_busy());
    assert_eq!(session.last_result(), ERROR_DISPLAY);
    assert_eq!(session.explanation(), AI_FAILURE_EXPLANATION);
    assert!(session.history().is_empty());
}

#[test]
fn test_settlement_with_unknown_id_is_ignored() {
    let (mut session, id) = ai_session_with_pending("1+1");
    let settled = session.settle_ai(
        Uuid::new_v4(),
        Ok(AiSolution {
            result: "2".to_string(),
            explanation: "One plus one.".to_string(),
        }),
    );

    assert!(settled.is_none());
    assert!(session.is_busy());
    assert_eq!(session.pending_request().unwrap().id, id);
    assert!(session.history().is_empty());

    let mut idle = Session::new();
    assert!(idle
        .settle_ai(id, Err(AiResolutionFailed::new("late")))
        .is_none());
    assert_eq!(idle.last_result(), "");
}

#[test]
fn test_settlement_applies_after_clear() {
    let (mut session, id) = ai_session_with_pending("10*10");
    session.apply(Action::Clear);
    assert!(session.is_busy());

    let settled = session.settle_ai(
        id,
        Ok(AiSolution {
            result: "100".to_string(),
            explanation: "Ten times ten.".to_string(),
        }),
    );
    assert!(settled.unwrap().is_ok());
    assert_eq!(session.last_result(), "100");
    assert_eq!(session.history().latest().unwrap().expression, "10*10");
}

#[test]
fn test_standard_success_clears_explanation() {
    let (mut session, id) = ai_session_with_pending("1+2");
    session.settle_ai(
        id,
        Ok(AiSolution {
            result: "3".to_string(),
            explanation: "One plus two.".to_string(),
        }),
    );
    session.apply(Action::SwitchMode(CalculatorMode::Standard));
    evaluate_text(&mut session, "4+4");
    assert_eq!(session.explanation(), "");
    assert_eq!(session.history().len(), 2);
}

#[test]
fn test_snapshot_mirrors_session() {
    let mut session = Session::new();
    evaluate_text(&mut session, "8/2");
    let snapshot = session.snapshot();

    assert_eq!(snapshot.input_buffer, "8/2");
    assert_eq!(snapshot.last_result, "4");
    assert_eq!(snapshot.mode, CalculatorMode::Standard);
    assert!(!snapshot.is_busy);
    assert_eq!(snapshot.history, session.history().to_vec());

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["mode"], "STANDARD");
    assert_eq!(json["history"][0]["result"], "4");
}

#[test]
fn test_mode_texts() {
    assert_eq!(CalculatorMode::Standard.placeholder(), "0");
    assert_eq!(CalculatorMode::Ai.to_string(), "AI");
    assert_eq!(CalculatorMode::default(), CalculatorMode::Standard);
}

#[test]
fn test_thinking_text_survives_clear_while_busy() {
    let (mut session, id) = ai_session_with_pending("2*21");
    session.apply(Action::Clear);
    assert!(session.is_busy());
    assert_eq!(session.explanation(), THINKING_EXPLANATION);

    session.apply(Action::SwitchMode(CalculatorMode::Standard));
    assert_eq!(session.explanation(), THINKING_EXPLANATION);

    session.settle_ai(
        id,
        Ok(AiSolution {
            result: "42".to_string(),
            explanation: "Two times twenty-one.".to_string(),
        }),
    );
    session.apply(Action::Clear);
    assert_eq!(session.explanation(), "");
}

#[test]
fn test_deeply_nested_input_shows_error() {
    let mut session = Session::new();
    let outcome = evaluate_text(&mut session, &format!("{}1", "(".repeat(50_000)));
    assert!(matches!(
        outcome,
        Outcome::Evaluated(Err(EvalError::SyntaxError { .. }))
    ));
    assert_eq!(session.last_result(), ERROR_DISPLAY);
    assert!(session.history().is_empty());
}

use std::io::{self, Write};

use tokio::sync::watch;
use tokio::time::{sleep, Duration};

use cloudcalc::{Action, Calculator, CalculatorMode, CloudCalcConfig, Snapshot};

// Run from the root folder of the repo as follows:
// GEMINI_API_KEY=your-key-here cargo run --example repl
//
// Each line is a sequence of keys (e.g. `12*3` or `50%+10`) and is appended to
// the input. Commands:
//   =               evaluate
//   :ai / :std      switch mode
//   :c              clear the display
//   :h              list history
//   :pick N         restore history entry N
//   :clear-history  empty the history
//   :q              quit

#[tokio::main]
async fn main() {
    cloudcalc::init_logger();

    let calc = Calculator::from_config(&CloudCalcConfig::from_env());
    render(&calc.snapshot().await);

    loop {
        print!("> ");
        io::stdout().flush().unwrap();

        let mut line = String::new();
        if io::stdin().read_line(&mut line).unwrap() == 0 {
            break;
        }
        let line = line.trim_end_matches(['\r', '\n']);

        let view = match line.trim() {
            ":q" => break,
            "=" => evaluate(&calc).await,
            ":ai" => calc.dispatch(Action::SwitchMode(CalculatorMode::Ai)).await,
            ":std" => calc.dispatch(Action::SwitchMode(CalculatorMode::Standard)).await,
            ":c" => calc.dispatch(Action::Clear).await,
            ":clear-history" => calc.dispatch(Action::ClearHistory).await,
            ":h" => {
                print_history(&calc.snapshot().await);
                continue;
            }
            command if command.starts_with(":pick") => {
                let snapshot = calc.snapshot().await;
                let picked = command[5..]
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| snapshot.history.get(index).cloned());
                match picked {
                    Some(entry) => calc.dispatch(Action::SelectHistoryEntry(entry)).await,
                    None => {
                        println!("No such history entry.");
                        continue;
                    }
                }
            }
            _ => append_line(&calc, line).await,
        };

        render(&view);
    }
}

async fn append_line(calc: &Calculator, line: &str) -> Snapshot {
    if calc.snapshot().await.mode == CalculatorMode::Ai {
        // Free-form text goes in as one token.
        return calc.dispatch(Action::append(line)).await;
    }

    let mut view = calc.snapshot().await;
    for key in line.chars().filter(|c| !c.is_whitespace()) {
        view = calc.dispatch(Action::append(key.to_string())).await;
    }
    view
}

async fn evaluate(calc: &Calculator) -> Snapshot {
    if calc.snapshot().await.mode == CalculatorMode::Standard {
        return calc.dispatch(Action::Evaluate).await;
    }

    let (tx, rx) = watch::channel(true);
    let dots = tokio::spawn(display_waiting_dots(rx, 3));
    let view = calc.dispatch(Action::Evaluate).await;
    tx.send(false).unwrap();
    dots.await.unwrap();
    view
}

fn render(view: &Snapshot) {
    let input = if view.input_buffer.is_empty() {
        view.mode.placeholder()
    } else {
        view.input_buffer.as_str()
    };
    println!("[{}] {}", view.mode.label(), input);
    if !view.last_result.is_empty() {
        println!("  = {}", view.last_result);
    }
    if !view.explanation.is_empty() {
        println!("  {}", view.explanation);
    }
}

fn print_history(view: &Snapshot) {
    if view.history.is_empty() {
        println!("History is empty.");
        return;
    }
    for (index, entry) in view.history.iter().enumerate() {
        let tag = if entry.via_ai { "IA" } else { "  " };
        println!("{:>2} {} {} = {}", index, tag, entry.expression, entry.result);
    }
}

async fn display_waiting_dots(rx: watch::Receiver<bool>, num_dots: usize) {
    let mut loading = *rx.borrow();
    while loading {
        for _ in 0..num_dots {
            if !*rx.borrow() {
                break;
            }
            print!(".");
            io::stdout().flush().unwrap();
            sleep(Duration::from_millis(300)).await;
        }
        print!("\r{}\r", " ".repeat(num_dots));
        io::stdout().flush().unwrap();
        loading = *rx.borrow();
    }
}

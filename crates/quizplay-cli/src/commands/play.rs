//! The `quizplay play` command.
//!
//! Owns the once-per-tick timer and the stdin reader, and feeds both into a
//! single `QuizSession`.

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use quizplay_core::session::{Notice, Outcome, Phase, QuizSession, SessionObserver, TickOutcome};
use quizplay_core::{normalize_answer, QuestionKind, Rejection, ScoreCard};
use quizplay_store::{load_config_from, FileQuestionSource, JsonResultStore, SnapshotFile};

/// Prints session events as they happen.
struct ConsoleObserver;

impl SessionObserver for ConsoleObserver {
    fn on_phase_change(&self, _from: Phase, to: Phase) {
        if to == Phase::Submitting {
            println!("Submitting answers...");
        }
    }

    fn on_notice(&self, notice: &Notice) {
        println!("! {}", notice.message);
    }

    fn on_time_expired(&self) {
        println!("\nTime is up!");
    }
}

/// A parsed line of user input.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Empty,
    Help,
    /// A number: an option's text, an option position, or a free answer.
    Number(usize, &'a str),
    Next,
    Previous,
    Submit,
    Save,
    Quit,
    Answer(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    let trimmed = line.trim();
    match trimmed {
        "" => Input::Empty,
        ":h" | ":help" => Input::Help,
        ":n" | ":next" => Input::Next,
        ":p" | ":prev" => Input::Previous,
        ":s" | ":submit" => Input::Submit,
        ":save" => Input::Save,
        ":q" | ":quit" => Input::Quit,
        _ => match trimmed.parse::<usize>() {
            Ok(n) => Input::Number(n, trimmed),
            Err(_) => Input::Answer(trimmed),
        },
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

pub async fn execute(
    quiz_path: Option<PathBuf>,
    resume: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let slot = SnapshotFile::new(&config.snapshot_path);
    let observer = Arc::new(ConsoleObserver);

    let mut session = if resume {
        anyhow::ensure!(
            slot.exists(),
            "no saved session at {}",
            slot.path().display()
        );
        let snapshot = slot.load()?;
        let mut store = JsonResultStore::new(&config.results_path);
        if let Some(quiz_id) = snapshot.quiz_id() {
            store = store.with_quiz_id(quiz_id);
        }
        let store = Arc::new(store);
        let session = QuizSession::restore(snapshot, store)
            .with_context(|| format!("cannot resume from {}", slot.path().display()))?;
        println!("Resuming saved session.");
        session.with_observer(observer)
    } else {
        let path = quiz_path.context("--quiz is required unless --resume is given")?;
        let path = resolve_quiz_path(path, &config.quiz_dir);
        let source = FileQuestionSource::new(&path);
        let quiz = source
            .load_quiz()?
            .with_context(|| format!("quiz file not found: {}", path.display()))?;

        if slot.exists() {
            eprintln!("Note: a saved session exists. Use `quizplay play --resume` to continue it.");
        }

        let store = Arc::new(JsonResultStore::new(&config.results_path).with_quiz_id(&quiz.id));
        println!("{} ({} questions)", quiz.name, quiz.questions.len());
        if !quiz.description.is_empty() {
            println!("{}", quiz.description);
        }
        QuizSession::new(quiz.questions, store)?
            .with_quiz_id(quiz.id)
            .with_observer(observer)
    };

    if session.phase() == Phase::Active {
        println!(
            "You have {}. Type :help for commands.\n",
            format_clock(session.remaining_seconds())
        );
        render_question(&session);
        run_loop(&mut session, &slot, config.tick_interval_ms).await?;
    }

    match session.phase() {
        Phase::Completed => {
            if let Some(card) = session.score_card() {
                print_score_card(card);
            }
            if resume {
                slot.remove()?;
            }
        }
        Phase::Aborted => println!("Quiz aborted."),
        Phase::Active | Phase::Submitting => {}
    }

    Ok(())
}

/// Drive the session until it finishes or the user leaves.
async fn run_loop(session: &mut QuizSession, slot: &SnapshotFile, tick_ms: u64) -> Result<()> {
    let mut ticker = tokio::time::interval(Duration::from_millis(tick_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    let mut lines = spawn_stdin_reader();
    let mut input_open = true;

    loop {
        tokio::select! {
            biased;

            _ = ticker.tick() => {
                session.clear_expired_notice();
                match session.tick() {
                    TickOutcome::Running { remaining } => {
                        if remaining == 60 || remaining == 10 {
                            println!("({} left)", format_clock(remaining));
                        }
                    }
                    TickOutcome::Expired(_) | TickOutcome::Inactive => break,
                }
            }

            line = lines.recv(), if input_open => {
                match line {
                    Some(line) => {
                        if handle_line(session, &line, slot)? == Flow::Stop {
                            break;
                        }
                    }
                    None => {
                        tracing::debug!("stdin closed, waiting for the timer");
                        input_open = false;
                    }
                }
            }
        }
    }

    Ok(())
}

/// Read stdin on a plain thread so a pending read never holds up exit.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break; // Session finished
                    }
                }
                Err(e) => {
                    tracing::warn!("failed to read stdin: {e}");
                    break;
                }
            }
        }
    });
    rx
}

fn handle_line(session: &mut QuizSession, line: &str, slot: &SnapshotFile) -> Result<Flow> {
    match parse_input(line) {
        Input::Empty => {}
        Input::Help => print_help(),
        Input::Number(n, text) => {
            let options = session.current_question().options();
            let names_option = options
                .iter()
                .any(|o| normalize_answer(o) == normalize_answer(text));
            let outcome = if !names_option && (1..=options.len()).contains(&n) {
                session.select_option(n - 1)
            } else {
                session.answer_current(text)
            };
            report_answer(session, &outcome);
        }
        Input::Answer(text) => {
            let outcome = session.answer_current(text);
            report_answer(session, &outcome);
        }
        Input::Next => match session.next() {
            Outcome::Applied => render_question(session),
            Outcome::Unchanged => println!("This is the last question. Type :s to submit."),
            Outcome::Rejected(_) | Outcome::Inactive => {}
        },
        Input::Previous => match session.previous() {
            Outcome::Applied => render_question(session),
            Outcome::Unchanged => println!("Already at the first question."),
            Outcome::Rejected(_) | Outcome::Inactive => {}
        },
        Input::Submit => match session.submit(false) {
            Outcome::Applied => return Ok(Flow::Stop),
            Outcome::Rejected(Rejection::Incomplete { missing }) => {
                let numbers: Vec<String> = missing.iter().map(|i| (i + 1).to_string()).collect();
                println!("Unanswered: {}", numbers.join(", "));
            }
            _ => {}
        },
        Input::Save => {
            slot.save(&session.snapshot())?;
            println!("Session saved. Resume with `quizplay play --resume`.");
            return Ok(Flow::Stop);
        }
        Input::Quit => {
            if let Err(e) = session.abort() {
                tracing::debug!("abort refused: {e}");
                println!("Leaving the quiz unfinished.");
            }
            return Ok(Flow::Stop);
        }
    }

    Ok(Flow::Continue)
}

fn report_answer(session: &QuizSession, outcome: &Outcome) {
    if !outcome.is_applied() {
        return;
    }
    match session.answer(session.current_index()) {
        Some(answer) => println!("Answer: {answer}"),
        None => println!("Answer cleared."),
    }
}

fn render_question(session: &QuizSession) {
    let question = session.current_question();
    let index = session.current_index();

    println!(
        "Question {}/{} [{}] ({} left)",
        index + 1,
        session.total(),
        question.kind,
        format_clock(session.remaining_seconds())
    );
    println!("{}", question.prompt);

    let current = session.answer(index);
    for (i, option) in question.options().iter().enumerate() {
        let marker = if current == Some(normalize_answer(option).as_str()) {
            "*"
        } else {
            " "
        };
        println!(" {marker}{}) {option}", i + 1);
    }
    if question.kind == QuestionKind::MultipleChoice {
        println!("Pick a number or type an answer.");
    }
}

fn print_help() {
    println!("  <number>       pick that option (or answer with the number itself)");
    println!("  <text>         answer with free text");
    println!("  :n, :next      next question");
    println!("  :p, :prev      previous question");
    println!("  :s, :submit    submit all answers");
    println!("  :save          save the session and exit");
    println!("  :q, :quit      leave the quiz");
}

fn print_score_card(card: &ScoreCard) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Your answer", "Correct answer", "Result"]);

    for outcome in &card.outcomes {
        table.add_row(vec![
            Cell::new(outcome.index + 1),
            Cell::new(&outcome.prompt),
            Cell::new(outcome.given.as_deref().unwrap_or("-")),
            Cell::new(&outcome.expected),
            Cell::new(if outcome.correct { "correct" } else { "wrong" }),
        ]);
    }

    println!("\n{table}");
    println!(
        "Score: {}/{} ({:.0}%)",
        card.result.score,
        card.result.total,
        card.result.ratio() * 100.0
    );
}

/// Relative quiz paths that do not exist as given are looked up in the
/// configured quiz directory.
fn resolve_quiz_path(path: PathBuf, quiz_dir: &Path) -> PathBuf {
    if path.exists() || path.is_absolute() {
        return path;
    }
    let candidate = quiz_dir.join(&path);
    if candidate.exists() {
        candidate
    } else {
        path
    }
}

fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use quizplay_core::traits::NullResultStore;
    use quizplay_core::Question;

    use super::*;

    #[test]
    fn parse_commands_and_answers() {
        assert_eq!(parse_input("  "), Input::Empty);
        assert_eq!(parse_input(":n"), Input::Next);
        assert_eq!(parse_input(":prev"), Input::Previous);
        assert_eq!(parse_input(":submit\n"), Input::Submit);
        assert_eq!(parse_input(":save"), Input::Save);
        assert_eq!(parse_input(":q"), Input::Quit);
        assert_eq!(parse_input(" 3 "), Input::Number(3, "3"));
        assert_eq!(parse_input(" Paris "), Input::Answer("Paris"));
        assert_eq!(parse_input(":unknown"), Input::Answer(":unknown"));
    }

    #[test]
    fn numbers_prefer_option_text_then_position() {
        let questions = vec![
            Question::multiple_choice("Sides of a hexagon?", "6", &["5", "7", "8"]),
            Question::multiple_choice("Capital of France?", "Paris", &["Rome", "Berlin"]),
        ];
        let mut session = QuizSession::new(questions, Arc::new(NullResultStore)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let slot = SnapshotFile::new(dir.path().join("session.json"));

        // "6" is itself an option
        handle_line(&mut session, "6", &slot).unwrap();
        assert_eq!(session.answer(0), Some("6"));

        // options are 5, 6, 7, 8: position 1 is "5"
        handle_line(&mut session, "1", &slot).unwrap();
        assert_eq!(session.answer(0), Some("5"));

        // neither an option nor a position
        handle_line(&mut session, "12", &slot).unwrap();
        assert_eq!(session.answer(0), Some("12"));

        handle_line(&mut session, ":n", &slot).unwrap();
        handle_line(&mut session, "2", &slot).unwrap();
        assert_eq!(session.answer(1), Some("paris"));
    }

    #[test]
    fn clock_format() {
        assert_eq!(format_clock(240), "4:00");
        assert_eq!(format_clock(61), "1:01");
        assert_eq!(format_clock(9), "0:09");
    }

    #[test]
    fn quiz_path_falls_back_to_quiz_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("capitals.toml"), "").unwrap();

        let resolved = resolve_quiz_path(PathBuf::from("capitals.toml"), dir.path());
        assert_eq!(resolved, dir.path().join("capitals.toml"));

        let missing = resolve_quiz_path(PathBuf::from("nope.toml"), dir.path());
        assert_eq!(missing, PathBuf::from("nope.toml"));
    }
}

//! The `quizplay init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("quizplay.toml").exists() {
        println!("quizplay.toml already exists, skipping.");
    } else {
        std::fs::write("quizplay.toml", SAMPLE_CONFIG)?;
        println!("Created quizplay.toml");
    }

    std::fs::create_dir_all("quizzes")?;
    let example_path = std::path::Path::new("quizzes/example.toml");
    if example_path.exists() {
        println!("quizzes/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUIZ)?;
        println!("Created quizzes/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: quizplay validate --quiz quizzes/example.toml");
    println!("  2. Run: quizplay play --quiz example.toml");
    println!("  3. Run: quizplay result");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizplay configuration

quiz_dir = "./quizzes"
results_path = "./quizplay-results/last-result.json"
snapshot_path = "./quizplay-results/session.json"

# One quiz second per tick.
tick_interval_ms = 1000
"#;

const EXAMPLE_QUIZ: &str = r#"[quiz]
id = "example"
name = "Example Quiz"
description = "A short quiz to get started"

[[questions]]
kind = "multiple-choice"
prompt = "Which planet is known as the Red Planet?"
correct_answer = "Mars"
distractors = ["Venus", "Jupiter", "Saturn"]
category = "Science"
difficulty = "easy"

[[questions]]
kind = "boolean"
prompt = "Water boils at 100 degrees Celsius at sea level."
correct_answer = "True"
category = "Science"
difficulty = "easy"

[[questions]]
kind = "multiple-choice"
prompt = "How many sides does a hexagon have?"
correct_answer = "6"
distractors = ["5", "7", "8"]
category = "Mathematics"
difficulty = "easy"
"#;

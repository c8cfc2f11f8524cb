//! The `quizplay result` command.

use std::path::PathBuf;

use anyhow::Result;

use quizplay_store::{load_config_from, JsonResultStore};

pub fn execute(json: bool, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = JsonResultStore::new(&config.results_path);

    let Some(last) = store.load_last()? else {
        println!("No result recorded yet. Run `quizplay play --quiz <file>` first.");
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&last)?);
        return Ok(());
    }

    let quiz = last.quiz_id.as_deref().unwrap_or("unknown quiz");
    println!(
        "Last result: {}/{} ({:.0}%) on {quiz}",
        last.score,
        last.total,
        last.result().ratio() * 100.0
    );
    println!(
        "Recorded at: {}",
        last.recorded_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S")
    );

    Ok(())
}

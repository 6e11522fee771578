use std::path;

use anyhow::Result;
use chrono::Local;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use super::cli::GenerateCommand;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::BackendName;
use crate::domain::models::GeneratedImage;
use crate::domain::models::GenerationResult;
use crate::domain::services::GenerationSession;
use crate::domain::services::HistoryStore;
use crate::infrastructure::backends::BackendManager;
use crate::infrastructure::storage::DiskStore;

async fn save_image(image: &GeneratedImage) -> Result<path::PathBuf> {
    let bytes = image.decode()?;

    let output_dir = path::PathBuf::from(Config::get(ConfigKey::OutputDir));
    if !output_dir.exists() {
        fs::create_dir_all(&output_dir).await?;
    }

    let filename = format!("easel-{}.png", Local::now().format("%Y%m%d-%H%M%S"));
    let output_path = output_dir.join(filename);

    let mut file = fs::File::create(&output_path).await?;
    file.write_all(&bytes).await?;

    return Ok(output_path);
}

/// Runs a single generation and reports the outcome on the terminal.
/// Classified generation failures are printed, not propagated; `Err` covers
/// setup and filesystem problems only.
pub async fn start(command: &GenerateCommand) -> Result<()> {
    let backend = BackendManager::get(BackendName::parse(Config::get(ConfigKey::Backend))?)?;
    backend.health_check().await?;

    let history = HistoryStore::new(Box::<DiskStore>::default());
    let mut session = GenerationSession::new(backend, history);

    println!("Generating image...");
    let result = session.submit(&command.prompt).await?;
    tracing::debug!(state = ?session.state(), "session settled");

    match result {
        GenerationResult::Success(image) => {
            if command.data_uri {
                println!("{}", image.as_data_uri());
            } else {
                let output_path = save_image(&image).await?;
                println!(
                    "{}",
                    Paint::green(format!("Saved image to {}", output_path.display()))
                );
            }

            let entries = session.history().load().await;
            println!("Prompt saved to history ({} stored).", entries.len());
        }
        GenerationResult::Failure(failure) => {
            eprintln!(
                "{}",
                Paint::red(format!("{}: {}", failure.kind.title(), failure.message))
            );
        }
    }

    // Acknowledge the terminal state. The session never resets itself.
    session.reset();

    return Ok(());
}

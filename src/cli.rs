use clap::{Parser, Subcommand};
use chrono::Utc;
use inquire::Text;

use crate::config::Settings;
use crate::handlers::http::reply_parts;
use crate::models::envelope::AssistantRequest;
use crate::models::note::NotePoints;
use crate::runtime::{self, StartupError};
use crate::service::note_store::{NoteStore, SqliteNoteStore};
use crate::service::prompts::PromptScope;

#[derive(Parser)]
#[command(about = "Notes and calendar assistant driven by an LLM")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API
    Serve,
    /// Send one message through the assistant and print the reply
    Ask {
        message: Option<String>,
        /// Note point to store with an add request; repeatable
        #[arg(short, long = "points")]
        points: Vec<String>,
    },
    /// Print every stored note
    Notes,
    /// Print the points stored for one topic
    Note { topic: String },
}

pub async fn run(cli: Cli, settings: Settings) -> Result<(), StartupError> {
    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => runtime::run_api(settings).await,
        Commands::Ask { message, points } => {
            let message = match message {
                Some(message) => message,
                None => specify_prompt()?,
            };
            let engine = runtime::build_engine(&settings)?;
            let request = AssistantRequest {
                message: Some(message),
                points: if points.is_empty() { None } else { Some(NotePoints::List(points)) },
            };
            let (status, reply) = reply_parts(
                engine
                    .handle_request(request, PromptScope::Assistant, Utc::now())
                    .await,
            );
            println!("{}", serde_json::to_string_pretty(&reply)?);
            if !status.is_success() {
                return Err(format!("request failed with status {}", status).into());
            }
            Ok(())
        }
        Commands::Notes => {
            let store = SqliteNoteStore::open(&settings.db_path)?;
            let notes = store.list_all().await?;
            if notes.is_empty() {
                println!("No notes found.");
            }
            for (topic, points) in notes {
                println!("{}:", topic);
                for point in points {
                    println!("  - {}", point);
                }
            }
            Ok(())
        }
        Commands::Note { topic } => {
            let store = SqliteNoteStore::open(&settings.db_path)?;
            match store.get(&topic).await? {
                Some(points) => {
                    for point in points {
                        println!("- {}", point);
                    }
                }
                None => println!("No note found for topic '{}'.", topic),
            }
            Ok(())
        }
    }
}

fn specify_prompt() -> Result<String, StartupError> {
    Ok(Text::new("What would you like to do?").prompt()?)
}

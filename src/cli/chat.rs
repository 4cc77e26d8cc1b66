use std::fs;
use std::sync::Arc;

use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::analytics::{UsageEvent, UsageTracker};
use crate::chat::ChatSession;
use crate::core::AppConfig;
use crate::feedback::{FeedbackRecord, FeedbackRecorder, Score};
use crate::openai::{CompletionClient, OpenAiClient};
use crate::store::SqliteDocumentStore;

#[derive(Debug, PartialEq)]
enum Input {
    Message(String),
    Feedback(Score, Option<String>),
}

/// Lines starting with `/up` or `/down` are feedback for the last
/// reply, anything after the command is the comment.
fn parse_line(line: &str) -> Input {
    let trimmed = line.trim();
    let (command, rest) = trimmed.split_once(' ').unwrap_or((trimmed, ""));
    let comment = Some(rest.trim().to_string()).filter(|s| !s.is_empty());
    match command {
        "/up" => Input::Feedback(Score::Up, comment),
        "/down" => Input::Feedback(Score::Down, comment),
        _ => Input::Message(line.to_string()),
    }
}

/// Log filter used when `RUST_LOG` is unset. Only warnings and errors
/// so logs don't drown out the conversation.
fn default_log_filter() -> String {
    format!("{}=warn", env!("CARGO_CRATE_NAME"))
}

pub async fn run(config: AppConfig, who: Option<String>) -> Result<()> {
    // Logs go to stderr so they stay out of the chat on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut rl = DefaultEditor::new()?;

    fs::create_dir_all(&config.db_path)?;
    let store = Arc::new(SqliteDocumentStore::connect(&config.db_path).await?);
    let recorder = FeedbackRecorder::new(store.clone());
    let usage = UsageTracker::new(store);
    let client = OpenAiClient::from_config(&config);

    let session_id = uuid::Uuid::new_v4().to_string();
    let mut session = ChatSession::new(&session_id, who.as_deref());
    session.initialize(&config.greeting);
    usage.track(UsageEvent::SessionStarted).await;

    for msg in session.transcript() {
        println!("{}", msg.content);
    }
    println!("(Rate a reply with /up or /down followed by an optional comment)");

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());
                match parse_line(&line) {
                    Input::Message(text) => {
                        let request = match session.begin_turn(
                            &text,
                            &config.system_message,
                            config.context_mode,
                        ) {
                            Ok(request) => request,
                            Err(e) => {
                                println!("{}", e);
                                continue;
                            }
                        };
                        usage.track(UsageEvent::MessageSubmitted).await;

                        match client.complete(&request).await {
                            Ok(reply) => {
                                session.complete_turn(&reply)?;
                                println!("{}", reply);
                            }
                            Err(e) => {
                                session.abort_turn();
                                println!("Error: {}", e);
                            }
                        }
                    }
                    Input::Feedback(score, comment) => {
                        let record = FeedbackRecord::new(
                            session.identity(),
                            score,
                            comment.as_deref(),
                            session.transcript(),
                        )?;
                        let reply = match session.begin_feedback() {
                            Ok(reply) => reply,
                            Err(e) => {
                                println!("{}", e);
                                continue;
                            }
                        };
                        match recorder.record(&record).await {
                            Ok(_) => {
                                session.feedback_recorded(reply);
                                usage.track(UsageEvent::FeedbackSubmitted).await;
                                println!("Feedback recorded!");
                            }
                            Err(e) => {
                                session.feedback_failed(reply);
                                println!("Error: {}", e);
                            }
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}

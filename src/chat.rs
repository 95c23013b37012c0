// Terminal chat: one query per input line, answers rendered as text bubbles.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use crate::answer_service::AnswerService;
use crate::constants::{PAGE_TITLE, PENDING_TEXT};
use crate::conversation::StoreError;
use crate::message::Message;
use crate::render::render_message;
use crate::session::ChatSession;

const HELP: &str = "Ask a question about sustainability data. /history lists your questions, /quit leaves.";

pub async fn run_chat<S, R, W>(session: &ChatSession<S>, input: R, mut output: W) -> Result<()>
where
    S: AnswerService,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!("Starting terminal chat...");
    write_block(&mut output, &format!("{PAGE_TITLE}\n{HELP}")).await?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        match line.trim() {
            "/quit" | "/exit" => break,
            "/history" => {
                let history = session.snapshot().history();
                let text = if history.is_empty() {
                    "No history yet...".to_string()
                } else {
                    history
                        .iter()
                        .map(|entry| format!("  - {entry}"))
                        .collect::<Vec<_>>()
                        .join("\n")
                };
                write_block(&mut output, &text).await?;
            }
            _ => match session.submit(&line) {
                Ok(pending) => {
                    write_block(&mut output, &render_message(&Message::user(pending.query())))
                        .await?;
                    write_block(&mut output, PENDING_TEXT).await?;
                    let message = session.resolve(pending).await?;
                    write_block(&mut output, &render_message(&message)).await?;
                }
                Err(StoreError::EmptyInput) => continue,
                Err(err) => warn!(error = %err, "Submission rejected"),
            },
        }
    }

    info!("Terminal chat finished.");
    Ok(())
}

/// Sends a single query and prints the resulting bubble.
pub async fn ask_once<S, W>(session: &ChatSession<S>, query: &str, mut output: W) -> Result<Message>
where
    S: AnswerService,
    W: AsyncWrite + Unpin,
{
    let message = session.ask(query).await.context("Query was not accepted")?;
    write_block(&mut output, &render_message(&message)).await?;
    Ok(message)
}

async fn write_block<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    output
        .write_all(format!("{text}\n\n").as_bytes())
        .await
        .context("Failed to write output")?;
    output.flush().await.context("Failed to flush output")?;
    Ok(())
}

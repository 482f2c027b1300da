//! The interactive terminal loop.

use std::io::Write as _;

use futures::StreamExt;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use quarry_cohere::{ChatEventStream, StreamEvent};

use crate::chatbot::Chatbot;

/// Run the chat loop until the user types `quit` or closes stdin.
///
/// A failed turn is reported and the loop continues; the conversation
/// survives across turns.
pub async fn run_console(chatbot: &Chatbot) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new()?;

    loop {
        match editor.readline("User: ") {
            Ok(line) => {
                let message = line.trim();
                if message.is_empty() {
                    continue;
                }
                if message.eq_ignore_ascii_case("quit") {
                    println!("Ending chat.");
                    break;
                }
                editor.add_history_entry(message)?;

                if let Err(e) = take_turn(chatbot, message).await {
                    eprintln!("turn failed: {e}");
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("Ending chat.");
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

async fn take_turn(chatbot: &Chatbot, message: &str) -> anyhow::Result<()> {
    let stream = chatbot.respond(message).await?;
    print_response(stream).await
}

/// Drain one response stream: text deltas inline, citations once at the
/// end of the answer.
async fn print_response(mut stream: ChatEventStream) -> anyhow::Result<()> {
    println!("Chatbot:");
    let mut printed_citation_header = false;

    while let Some(event) = stream.next().await {
        match event? {
            StreamEvent::TextDelta(text) => {
                print!("{text}");
                std::io::stdout().flush()?;
            }
            StreamEvent::Citations(citations) => {
                if !printed_citation_header {
                    println!("\n\nCITATIONS:");
                    printed_citation_header = true;
                }
                for citation in citations {
                    println!(
                        "[{}..{}] {:?} ({})",
                        citation.start,
                        citation.end,
                        citation.text,
                        citation.document_ids.join(", ")
                    );
                }
            }
            StreamEvent::Done { .. } => {}
        }
    }

    println!("\n{}", "-".repeat(100));
    Ok(())
}

/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes four top-level command modules:

- `serve` - Run the HTTP server
- `chat`  - Interactive terminal chat against a running server
- `ask`   - Send a single question and print the answer
- `criteria` - Show the search criteria parsed from a message
*/

use crate::client::{ChatClient, ChatSession, TurnState};
use crate::config::Config;
use crate::error::{ProfragError, Result};
use crate::providers::Role;
use std::io::Write;

// Special commands parser for the interactive client
pub mod special_commands;

// Server command handler
pub mod serve {
    //! HTTP server command handler.

    use super::*;

    /// Run the server until a shutdown signal arrives
    pub async fn run_serve(config: Config) -> Result<()> {
        tracing::info!(bind_address = %config.server.bind_address, "Starting server");
        crate::server::run(&config).await
    }
}

// Chat command handler
pub mod chat {
    //! Interactive chat handler.
    //!
    //! Runs a readline loop; every line that is not a special command is
    //! sent to the server together with the conversation so far, and the
    //! answer is printed as it streams in.

    use super::special_commands::{parse_special_command, print_help, SpecialCommand};
    use super::*;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    pub async fn run_chat(config: Config) -> Result<()> {
        let client = ChatClient::new(&config.client.endpoint)?;
        let mut rl = DefaultEditor::new()?;
        let mut session = ChatSession::new();

        print_welcome_banner(client.endpoint());
        print_greeting(&session);

        loop {
            match rl.readline("you> ") {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(trimmed)?;

                    match parse_special_command(trimmed) {
                        Ok(SpecialCommand::History) => {
                            print!("{}", render_history(&session));
                            continue;
                        }
                        Ok(SpecialCommand::Reset) => {
                            session.reset();
                            print_greeting(&session);
                            continue;
                        }
                        Ok(SpecialCommand::Help) => {
                            print_help();
                            continue;
                        }
                        Ok(SpecialCommand::Exit) => break,
                        Ok(SpecialCommand::None) => {}
                        Err(e) => {
                            eprintln!("{}", e);
                            continue;
                        }
                    }

                    session = send_and_print(&client, session, trimmed).await?;
                    session.finish_turn();
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    fn print_welcome_banner(endpoint: &str) {
        use colored::Colorize;

        println!();
        println!("{}", "profrag - Rate My Professor assistant".bold());
        println!("Server: {}", endpoint.cyan());
        println!("Type '/help' for commands, '/exit' to quit.");
        println!();
    }

    fn print_greeting(session: &ChatSession) {
        use colored::Colorize;

        if let Some(greeting) = session.last_answer() {
            println!("{} {}\n", "assistant>".green(), greeting);
        }
    }
}

// Single-question command handler
pub mod ask {
    //! One-shot question handler.

    use super::*;

    /// Ask one question and print the streamed answer
    ///
    /// # Errors
    ///
    /// Returns `ProfragError::Client` if the turn ends in an error state
    pub async fn run_ask(config: Config, message: String) -> Result<()> {
        let client = ChatClient::new(&config.client.endpoint)?;
        let session = send_and_print(&client, ChatSession::new(), &message).await?;

        match session.state() {
            TurnState::Error(message) => Err(ProfragError::Client(message.clone()).into()),
            _ => Ok(()),
        }
    }
}

// Criteria inspection command handler
pub mod criteria {
    //! Prints the criteria the server would derive from a message.

    use super::*;
    use crate::intent::IntentParser;

    /// Render the parsed criteria as pretty JSON
    ///
    /// # Examples
    ///
    /// ```
    /// use profrag::commands::criteria::criteria_json;
    ///
    /// let json = criteria_json("rating 4.5").unwrap();
    /// assert!(json.contains("4.5"));
    /// ```
    pub fn criteria_json(text: &str) -> Result<String> {
        let criteria = IntentParser::new()?.parse(text);
        Ok(serde_json::to_string_pretty(&criteria)?)
    }

    /// Print the parsed criteria
    pub fn run_criteria(text: &str) -> Result<()> {
        println!("{}", criteria_json(text)?);
        Ok(())
    }
}

/// Run one turn, printing fragments as they arrive
async fn send_and_print(
    client: &ChatClient,
    session: ChatSession,
    message: &str,
) -> Result<ChatSession> {
    use colored::Colorize;

    print!("{} ", "assistant>".green());
    let _ = std::io::stdout().flush();

    let session = client
        .send_turn(session, message, |fragment| {
            print!("{}", fragment);
            let _ = std::io::stdout().flush();
        })
        .await?;

    println!();
    if let TurnState::Error(message) = session.state() {
        eprintln!("{}", format!("Error: {}", message).red());
    }
    println!();

    Ok(session)
}

/// Render the conversation for `/history`
pub fn render_history(session: &ChatSession) -> String {
    let mut out = String::new();
    for message in session.messages() {
        let label = match message.role {
            Role::System => "system",
            Role::User => "you",
            Role::Assistant => "assistant",
        };
        out.push_str(&format!("{}> {}\n", label, message.text()));
    }
    out.push_str(&format!("[{}]\n", session.state()));
    out
}

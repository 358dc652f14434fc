//! Prompt assembly
//!
//! This module builds the message sequence sent to the generation service:
//! the system instruction, the prior conversation, and the newest user
//! message with the retrieved professor records appended as context.

pub mod recommendation_prompt;

use crate::error::{ProfragError, Result};
use crate::providers::{Message, Role};
use crate::search::MatchResult;
use std::fmt::Write;

/// Header line introducing the retrieved records
pub const CONTEXT_HEADER: &str = "Returned results from vector db:";

/// Context used when the search returned nothing
pub const FALLBACK_CONTEXT: &str = "No matching professors were found in the review database. \
Ask the student to clarify what they are looking for (subject, course, rating or focus area) \
and offer general advice on choosing a professor.";

/// Builds the default system prompt
pub fn build_system_prompt() -> String {
    recommendation_prompt::generate_recommendation_prompt()
}

/// Renders the context block appended to the newest user message
///
/// One labeled block per match in ranking order, or [`FALLBACK_CONTEXT`]
/// when there are no matches. Never empty.
///
/// # Examples
///
/// ```
/// use profrag::prompts::{render_context, FALLBACK_CONTEXT};
///
/// assert!(render_context(&[]).contains(FALLBACK_CONTEXT));
/// ```
pub fn render_context(matches: &[MatchResult]) -> String {
    let mut context = String::from("\n\n");
    if matches.is_empty() {
        context.push_str(FALLBACK_CONTEXT);
        return context;
    }

    context.push_str(CONTEXT_HEADER);
    for m in matches {
        // Writing to a String cannot fail
        let _ = write!(
            context,
            "\n\nProfessor: {}\nSubject: {}\nStars: {}\nReview: {}",
            m.id, m.subject, m.stars, m.review
        );
    }
    context
}

/// Assembles the full prompt for one turn
///
/// Output order: system instruction, every history message except the last
/// (verbatim), then a user message carrying the last message's content
/// followed by the rendered context. The result always holds
/// `history.len() + 1` messages.
///
/// # Errors
///
/// Returns `ProfragError::Input` when `history` is empty
///
/// # Examples
///
/// ```
/// use profrag::prompts::assemble_prompt;
/// use profrag::providers::{Message, Role};
///
/// let history = vec![Message::assistant("Hi!"), Message::user("Who teaches physics?")];
/// let prompt = assemble_prompt("Be helpful.", &history, &[]).unwrap();
/// assert_eq!(prompt.len(), 3);
/// assert_eq!(prompt[0].role, Role::System);
/// assert_eq!(prompt[2].role, Role::User);
/// ```
pub fn assemble_prompt(
    system_prompt: &str,
    history: &[Message],
    matches: &[MatchResult],
) -> Result<Vec<Message>> {
    let (last, earlier) = history
        .split_last()
        .ok_or_else(|| ProfragError::Input("No content provided.".to_string()))?;

    let mut prompt = Vec::with_capacity(history.len() + 1);
    prompt.push(Message::system(system_prompt));
    prompt.extend(earlier.iter().cloned());
    prompt.push(Message {
        role: Role::User,
        content: Some(format!("{}{}", last.text(), render_context(matches))),
    });

    Ok(prompt)
}

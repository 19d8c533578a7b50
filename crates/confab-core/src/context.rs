//! Prompt context derivation.
//!
//! Builds the bounded text window sent to the remote model alongside a new
//! user turn. Pure: never mutates the conversation.

use crate::message::{Message, MessageRole};

/// Maximum number of prior messages considered for the context window.
pub const CONTEXT_WINDOW: usize = 10;

/// Builds the prompt for a new user turn from the active conversation.
///
/// Takes the last [`CONTEXT_WINDOW`] messages *before* the new user message
/// is appended. With at most one windowed message (only the greeting, or
/// nothing), the prompt is just the labeled new turn. Otherwise the window
/// minus its first message (the greeting is excluded from context) renders
/// as labeled lines in chronological order, followed by the new turn.
pub fn build_prompt(messages: &[Message], new_user_text: &str) -> String {
    let start = messages.len().saturating_sub(CONTEXT_WINDOW);
    let recent = &messages[start..];

    if recent.len() <= 1 {
        return format!("user: {new_user_text}");
    }

    let history = recent[1..]
        .iter()
        .map(|m| format!("{}: {}", role_label(m.role), m.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!("[conversation history]\n{history}\n\n[current question]\nuser: {new_user_text}")
}

fn role_label(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Conversation;
    use crate::message::MessageIdGenerator;

    #[test]
    fn test_greeting_only_yields_minimal_prompt() {
        let mut ids = MessageIdGenerator::new();
        let conversation = Conversation::new(ids.next_id());

        let prompt = build_prompt(&conversation.messages, "what is rust?");

        assert_eq!(prompt, "user: what is rust?");
        assert!(!prompt.contains("[conversation history]"));
    }

    #[test]
    fn test_empty_history_yields_minimal_prompt() {
        let prompt = build_prompt(&[], "hello");
        assert_eq!(prompt, "user: hello");
    }

    #[test]
    fn test_history_excludes_greeting_and_labels_roles() {
        let mut ids = MessageIdGenerator::new();
        let mut conversation = Conversation::new(ids.next_id());
        conversation.push(Message::user(ids.next_id(), "first question"));
        conversation.push(Message::assistant(ids.next_id(), "first answer"));

        let prompt = build_prompt(&conversation.messages, "second question");

        assert!(!prompt.contains(crate::conversation::GREETING));
        assert!(prompt.contains("user: first question"));
        assert!(prompt.contains("assistant: first answer"));
        assert!(prompt.ends_with("[current question]\nuser: second question"));
    }

    #[test]
    fn test_window_is_bounded_to_last_ten_messages() {
        let mut ids = MessageIdGenerator::new();
        let mut conversation = Conversation::new(ids.next_id());
        for i in 0..20 {
            conversation.push(Message::user(ids.next_id(), format!("question {i}")));
            conversation.push(Message::assistant(ids.next_id(), format!("answer {i}")));
        }

        let prompt = build_prompt(&conversation.messages, "latest");

        // 41 messages total; window = last 10, minus the first windowed one.
        assert!(!prompt.contains("question 14"));
        assert!(prompt.contains("answer 15"));
        assert!(prompt.contains("question 19"));
        assert_eq!(prompt.matches('\n').count(), 9 + 3);
    }

    #[test]
    fn test_build_prompt_does_not_mutate_conversation() {
        let mut ids = MessageIdGenerator::new();
        let mut conversation = Conversation::new(ids.next_id());
        conversation.push(Message::user(ids.next_id(), "hi"));
        let before = conversation.clone();

        let _ = build_prompt(&conversation.messages, "again");

        assert_eq!(conversation, before);
    }
}

// flightai-core/src/models/chat.rs
use super::tools::ToolCall;
use serde::{Deserialize, Serialize};

/// The author of a [`ChatMessage`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    #[default]
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

/// Represents a message in the chat history sequence sent to/from the AI.
/// Can represent system, user, assistant, or tool messages.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            tool_call_id: Some(tool_call_id.into()),
            ..Default::default()
        }
    }

    /// True when the model asked for at least one tool call in this message.
    pub fn has_tool_calls(&self) -> bool {
        self.tool_calls.as_ref().is_some_and(|calls| !calls.is_empty())
    }
}

/// Represents one of the choices returned by the AI API.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Choice {
    pub index: u32,
    pub message: ChatMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Represents the overall structure of the AI API response.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiResponse {
    pub id: String,
    pub choices: Vec<Choice>,
}

impl ApiResponse {
    /// Takes the message of the first choice, the only one this crate looks at.
    pub fn into_first_message(self) -> Option<ChatMessage> {
        self.choices.into_iter().next().map(|choice| choice.message)
    }
}

/// The user-visible conversation: user and assistant messages only.
///
/// Owned by the presentation layer across turns. Tool traffic and the system
/// prompt live in the per-turn working message list, never here.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(content));
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl From<Vec<ChatMessage>> for Transcript {
    fn from(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_serializes_lowercase() {
        let message = ChatMessage::tool("call_1", "{}");
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(
            value,
            json!({ "role": "tool", "content": "{}", "tool_call_id": "call_1" })
        );
    }

    #[test]
    fn test_assistant_message_with_null_content_deserializes() {
        let message: ChatMessage = serde_json::from_value(json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_1",
                "type": "function",
                "function": { "name": "get_ticket_price", "arguments": "{}" }
            }]
        }))
        .unwrap();
        assert_eq!(message.role, Role::Assistant);
        assert!(message.content.is_none());
        assert!(message.has_tool_calls());
    }

    #[test]
    fn test_transcript_appends_in_order() {
        let mut transcript = Transcript::new();
        assert!(transcript.is_empty());
        transcript.push_user("How much is a ticket to Paris?");
        transcript.push_assistant("A return ticket to Paris is $899.");
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.messages()[0].role, Role::User);
        assert_eq!(transcript.last().unwrap().role, Role::Assistant);
        transcript.clear();
        assert!(transcript.is_empty());
    }
}

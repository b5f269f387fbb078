use crate::traits::{ChatRequest, ChatResponse, FinishReason, Provider, ToolCall};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Deterministic provider replaying a fixed script of responses. Running
/// past the end of the script fails the chat call, which makes accidental
/// extra iterations visible in tests.
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<ChatResponse>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<ChatResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }

    pub fn text(content: impl Into<String>) -> ChatResponse {
        ChatResponse {
            content: Some(content.into()),
            tool_calls: Vec::new(),
            finish_reason: FinishReason::Stop,
        }
    }

    pub fn tool_call(name: impl Into<String>, arguments: impl Into<String>) -> ChatResponse {
        ChatResponse {
            content: None,
            tool_calls: vec![ToolCall {
                id: format!("call_{}", uuid::Uuid::new_v4().simple()),
                name: name.into(),
                arguments: arguments.into(),
            }],
            finish_reason: FinishReason::ToolCalls,
        }
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn chat(&self, _request: ChatRequest<'_>) -> anyhow::Result<ChatResponse> {
        let mut responses = self.responses.lock().unwrap();
        responses
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("scripted provider: script exhausted"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_in_order_then_fails() {
        let provider = ScriptedProvider::new(vec![
            ScriptedProvider::text("first"),
            ScriptedProvider::text("second"),
        ]);
        let request = ChatRequest {
            messages: &[],
            tools: None,
        };
        assert_eq!(
            provider.chat(request).await.unwrap().content.unwrap(),
            "first"
        );
        assert_eq!(
            provider.chat(request).await.unwrap().content.unwrap(),
            "second"
        );
        assert!(provider.chat(request).await.is_err());
    }

    #[test]
    fn tool_call_helper_generates_unique_ids() {
        let a = ScriptedProvider::tool_call("clock", "{}");
        let b = ScriptedProvider::tool_call("clock", "{}");
        assert_ne!(a.tool_calls[0].id, b.tool_calls[0].id);
    }
}

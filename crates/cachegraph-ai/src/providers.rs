//! Per-provider request/response strategies.
//!
//! The four supported APIs differ only in endpoint, authentication, request
//! body shape and where the generated text sits in the reply, so each is a
//! [`ProviderSpec`] record rather than its own client.

use cachegraph_core::canonical_llm_provider;
use serde_json::{json, Value};

use crate::llm_provider::{GenerationConfig, Message, MessageRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Anthropic,
    OpenAI,
    Google,
    XAI,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::Anthropic,
        ProviderKind::OpenAI,
        ProviderKind::Google,
        ProviderKind::XAI,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        let canonical = canonical_llm_provider(name)?;
        Self::ALL.into_iter().find(|kind| kind.name() == canonical)
    }

    pub fn spec(self) -> &'static ProviderSpec {
        match self {
            ProviderKind::Anthropic => &ANTHROPIC,
            ProviderKind::OpenAI => &OPENAI,
            ProviderKind::Google => &GOOGLE,
            ProviderKind::XAI => &XAI,
        }
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStyle {
    /// `<name>: <prefix><key>`
    Header {
        name: &'static str,
        prefix: &'static str,
    },
    /// `?<name>=<key>`
    QueryParam { name: &'static str },
}

pub struct ProviderSpec {
    pub kind: ProviderKind,
    pub name: &'static str,
    /// Request URL; `{model}` is replaced with the model name.
    pub endpoint: &'static str,
    pub default_model: &'static str,
    pub env_key: &'static str,
    pub auth: AuthStyle,
    pub extra_headers: &'static [(&'static str, &'static str)],
    pub build_body: fn(&str, &[Message], &GenerationConfig) -> Value,
    pub extract_text: fn(&Value) -> Option<String>,
}

impl ProviderSpec {
    pub fn url(&self, model: &str) -> String {
        self.endpoint.replace("{model}", model)
    }
}

pub static ANTHROPIC: ProviderSpec = ProviderSpec {
    kind: ProviderKind::Anthropic,
    name: "anthropic",
    endpoint: "https://api.anthropic.com/v1/messages",
    default_model: "claude-3-5-sonnet-20241022",
    env_key: "ANTHROPIC_API_KEY",
    auth: AuthStyle::Header {
        name: "x-api-key",
        prefix: "",
    },
    extra_headers: &[("anthropic-version", "2023-06-01")],
    build_body: anthropic_body,
    extract_text: anthropic_text,
};

pub static OPENAI: ProviderSpec = ProviderSpec {
    kind: ProviderKind::OpenAI,
    name: "openai",
    endpoint: "https://api.openai.com/v1/chat/completions",
    default_model: "gpt-4o",
    env_key: "OPENAI_API_KEY",
    auth: AuthStyle::Header {
        name: "Authorization",
        prefix: "Bearer ",
    },
    extra_headers: &[],
    build_body: chat_completions_body,
    extract_text: chat_completions_text,
};

pub static GOOGLE: ProviderSpec = ProviderSpec {
    kind: ProviderKind::Google,
    name: "google",
    endpoint: "https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent",
    default_model: "gemini-1.5-pro",
    env_key: "GOOGLE_API_KEY",
    auth: AuthStyle::QueryParam { name: "key" },
    extra_headers: &[],
    build_body: gemini_body,
    extract_text: gemini_text,
};

pub static XAI: ProviderSpec = ProviderSpec {
    kind: ProviderKind::XAI,
    name: "xai",
    endpoint: "https://api.x.ai/v1/chat/completions",
    default_model: "grok-2-latest",
    env_key: "XAI_API_KEY",
    auth: AuthStyle::Header {
        name: "Authorization",
        prefix: "Bearer ",
    },
    extra_headers: &[],
    build_body: chat_completions_body,
    extract_text: chat_completions_text,
};

fn system_text(messages: &[Message]) -> Option<String> {
    let parts: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == MessageRole::System)
        .map(|m| m.content.as_str())
        .collect();
    (!parts.is_empty()).then(|| parts.join("\n\n"))
}

fn anthropic_body(model: &str, messages: &[Message], config: &GenerationConfig) -> Value {
    let turns: Vec<Value> = messages
        .iter()
        .filter(|m| m.role != MessageRole::System)
        .map(|m| json!({ "role": m.role.to_string(), "content": m.content }))
        .collect();

    let mut body = json!({
        "model": model,
        "max_tokens": config.max_tokens,
        "temperature": config.temperature,
        "messages": turns,
    });
    if let Some(system) = system_text(messages) {
        body["system"] = Value::String(system);
    }
    body
}

fn anthropic_text(response: &Value) -> Option<String> {
    let blocks = response.get("content")?.as_array()?;
    let text: Vec<&str> = blocks
        .iter()
        .filter(|b| b.get("type").and_then(Value::as_str) == Some("text"))
        .filter_map(|b| b.get("text").and_then(Value::as_str))
        .collect();
    (!text.is_empty()).then(|| text.join(""))
}

fn chat_completions_body(model: &str, messages: &[Message], config: &GenerationConfig) -> Value {
    let turns: Vec<Value> = messages
        .iter()
        .map(|m| json!({ "role": m.role.to_string(), "content": m.content }))
        .collect();

    json!({
        "model": model,
        "messages": turns,
        "temperature": config.temperature,
        "max_tokens": config.max_tokens,
    })
}

fn chat_completions_text(response: &Value) -> Option<String> {
    response
        .pointer("/choices/0/message/content")?
        .as_str()
        .map(str::to_string)
}

fn gemini_body(_model: &str, messages: &[Message], config: &GenerationConfig) -> Value {
    let contents: Vec<Value> = messages
        .iter()
        .filter(|m| m.role != MessageRole::System)
        .map(|m| {
            let role = match m.role {
                MessageRole::Assistant => "model",
                _ => "user",
            };
            json!({ "role": role, "parts": [{ "text": m.content }] })
        })
        .collect();

    let mut body = json!({
        "contents": contents,
        "generationConfig": {
            "temperature": config.temperature,
            "maxOutputTokens": config.max_tokens,
        },
    });
    if let Some(system) = system_text(messages) {
        body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
    }
    body
}

fn gemini_text(response: &Value) -> Option<String> {
    let parts = response.pointer("/candidates/0/content/parts")?.as_array()?;
    let text: Vec<&str> = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();
    (!text.is_empty()).then(|| text.join(""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation() -> Vec<Message> {
        vec![Message::system("be terse"), Message::user("hello")]
    }

    #[test]
    fn test_every_kind_has_its_own_spec() {
        for kind in ProviderKind::ALL {
            assert_eq!(kind.spec().kind, kind);
            assert_eq!(ProviderKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ProviderKind::from_name("Gemini"), Some(ProviderKind::Google));
        assert_eq!(ProviderKind::from_name("mistral"), None);
    }

    #[test]
    fn test_google_url_embeds_model() {
        assert_eq!(
            GOOGLE.url("gemini-1.5-flash"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
        assert_eq!(OPENAI.url("gpt-4o"), OPENAI.endpoint);
    }

    #[test]
    fn test_anthropic_body_lifts_system_prompt() {
        let body = (ANTHROPIC.build_body)("claude", &conversation(), &GenerationConfig::default());
        assert_eq!(body["system"], "be terse");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["max_tokens"], 4096);
    }

    #[test]
    fn test_chat_completions_body_keeps_system_turn() {
        let body = (XAI.build_body)("grok", &conversation(), &GenerationConfig::default());
        assert_eq!(body["model"], "grok");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hello");
    }

    #[test]
    fn test_gemini_body_shape() {
        let body = (GOOGLE.build_body)("gemini", &conversation(), &GenerationConfig::default());
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be terse");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 4096);
    }

    #[test]
    fn test_text_extraction_paths() {
        let anthropic = json!({ "content": [
            { "type": "text", "text": "a" },
            { "type": "tool_use", "id": "x" },
            { "type": "text", "text": "b" }
        ]});
        assert_eq!((ANTHROPIC.extract_text)(&anthropic).as_deref(), Some("ab"));

        let openai = json!({ "choices": [{ "message": { "role": "assistant", "content": "hi" } }] });
        assert_eq!((OPENAI.extract_text)(&openai).as_deref(), Some("hi"));

        let gemini = json!({ "candidates": [{ "content": { "parts": [{ "text": "yo" }] } }] });
        assert_eq!((GOOGLE.extract_text)(&gemini).as_deref(), Some("yo"));

        assert_eq!((OPENAI.extract_text)(&json!({ "choices": [] })), None);
        assert_eq!((ANTHROPIC.extract_text)(&json!({ "content": [] })), None);
    }
}

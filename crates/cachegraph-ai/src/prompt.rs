use cachegraph_core::{render_summary, AnalyzedSchema};

use crate::llm_provider::Message;

pub const SYSTEM_PROMPT: &str = "You are an expert in HTTP caching for GraphQL APIs served \
through an edge cache. You design cache rules that maximize hit rates without ever serving \
one user's private data to another. You reply with a single JSON object and nothing else.";

const RESPONSE_FORMAT: &str = r#"Respond with JSON in exactly this shape:

{
  "rules": [
    {
      "types": ["TypeName"],
      "maxAge": 300,
      "staleWhileRevalidate": 60,
      "staleIfError": 3600,
      "scope": "public",
      "passthrough": false,
      "reasoning": "why these types share this policy"
    }
  ],
  "invalidations": {
    "mutationName": ["TypeName:*"]
  },
  "explanation": "overall strategy in a few sentences",
  "confidence": 0.8,
  "warnings": ["anything the operator should double-check"]
}

"staleWhileRevalidate", "staleIfError", "scope" and "passthrough" are optional.
Durations are in seconds. "confidence" is between 0 and 1."#;

const GUIDELINES: &str = "Guidelines:
- Types with sensitive fields (credentials, contact details, financial data) must be private or passthrough.
- Types tied to the current viewer or an owner should be private.
- Frequently changing types (counters, statuses, timestamps) need short max-age values.
- Stable reference data can be cached for longer with stale-while-revalidate.
- Every mutation that modifies a type should invalidate that type with a \"Type:*\" pattern.
- Only use type names that appear in the schema analysis.";

/// The user prompt: schema summary, guidelines and the expected reply format.
pub fn build_user_prompt(schema: &AnalyzedSchema) -> String {
    format!(
        "Design cache rules for the following GraphQL schema.\n\n{}\n{}\n\n{}",
        render_summary(schema),
        GUIDELINES,
        RESPONSE_FORMAT
    )
}

pub fn build_messages(schema: &AnalyzedSchema) -> Vec<Message> {
    vec![
        Message::system(SYSTEM_PROMPT),
        Message::user(build_user_prompt(schema)),
    ]
}

//! Oracle adapter for the Gemini `generateContent` API.
//!
//! ```text
//! Turn::Prompt(text)        → {"role": "user",  "parts": [{"text": ...}]}
//! Turn::Oracle(turn)        → turn.raw, or {"role": "model", "parts": [text?, functionCall*]}
//! Turn::ToolResults(results)→ {"role": "user",  "parts": [functionResponse*]}
//! ```

use crate::conversation::{Conversation, OracleTurn, ToolCall, Turn};
use crate::credentials::ApiKey;
use crate::oracle::{Oracle, OracleError, ToolSchema};
use crate::tools::tool_payload;
use dockhand_core::AgentConfig;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::time::Duration;

/// Oracle backed by a Gemini model.
#[derive(Debug)]
pub struct GeminiOracle {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
    api_key: ApiKey,
}

impl GeminiOracle {
    pub fn new(config: &AgentConfig, api_key: ApiKey) -> Result<Self, OracleError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| OracleError::Http { source: e })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_owned(),
            model: config.model.clone(),
            temperature: config.temperature,
            api_key,
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

impl Oracle for GeminiOracle {
    async fn converse(
        &self,
        system: &str,
        tools: &[ToolSchema],
        history: &Conversation,
    ) -> Result<OracleTurn, OracleError> {
        let body = request_body(system, tools, history, self.temperature);
        tracing::debug!(model = %self.model, turns = history.len(), "calling oracle");

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", self.api_key.secret.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| OracleError::Http { source: e })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| OracleError::Http { source: e })?;

        if !status.is_success() {
            return Err(OracleError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&text).map_err(|e| OracleError::Decode { source: e })?;
        turn_from_response(parsed)
    }
}

// ── Wire types ──

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Value,
    contents: Vec<Value>,
    tools: [FunctionDeclarations<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FunctionDeclarations<'a> {
    function_declarations: &'a [ToolSchema],
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: Option<Map<String, Value>>,
}

fn request_body<'a>(
    system: &str,
    tools: &'a [ToolSchema],
    history: &Conversation,
    temperature: f32,
) -> GenerateContentRequest<'a> {
    GenerateContentRequest {
        system_instruction: json!({ "parts": [{ "text": system }] }),
        contents: history.turns().iter().map(turn_to_content).collect(),
        tools: [FunctionDeclarations {
            function_declarations: tools,
        }],
        generation_config: GenerationConfig { temperature },
    }
}

fn turn_to_content(turn: &Turn) -> Value {
    match turn {
        Turn::Prompt(text) => json!({ "role": "user", "parts": [{ "text": text }] }),
        Turn::Oracle(reply) => {
            if let Some(raw) = &reply.raw {
                return raw.clone();
            }
            let mut parts = Vec::new();
            if let Some(text) = &reply.text {
                parts.push(json!({ "text": text }));
            }
            for call in &reply.calls {
                parts.push(json!({
                    "functionCall": { "name": call.name, "args": call.args }
                }));
            }
            json!({ "role": "model", "parts": parts })
        }
        Turn::ToolResults(outcomes) => {
            let parts: Vec<Value> = outcomes
                .iter()
                .map(|o| {
                    json!({
                        "functionResponse": {
                            "name": o.name,
                            "response": tool_payload(&o.result),
                        }
                    })
                })
                .collect();
            json!({ "role": "user", "parts": parts })
        }
    }
}

fn turn_from_response(response: GenerateContentResponse) -> Result<OracleTurn, OracleError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(OracleError::EmptyResponse)?;

    // A candidate without content (e.g. blocked) reads as an empty reply.
    let Some(raw) = candidate.content else {
        return Ok(OracleTurn::default());
    };
    let content: Content =
        serde_json::from_value(raw.clone()).map_err(|e| OracleError::Decode { source: e })?;

    let mut text = String::new();
    let mut calls = Vec::new();
    for part in content.parts {
        if let Some(call) = part.function_call {
            calls.push(ToolCall::new(call.name, call.args.unwrap_or_default()));
        } else if let Some(t) = part.text {
            if !part.thought {
                text.push_str(&t);
            }
        }
    }

    Ok(OracleTurn {
        text: (!text.is_empty()).then_some(text),
        calls,
        raw: Some(raw),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::ToolOutcome;
    use crate::schema::tool_schemas;
    use crate::tools::{ToolError, ToolOutput};
    use std::path::PathBuf;

    fn parse(body: Value) -> Result<OracleTurn, OracleError> {
        turn_from_response(serde_json::from_value(body).unwrap())
    }

    #[test]
    fn parses_function_calls_with_args() {
        let turn = parse(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "functionCall": { "name": "list_directory", "args": { "path": "." } } },
                        { "functionCall": { "name": "read_file", "args": { "path": "go.mod", "max_lines": 50 } } }
                    ]
                }
            }]
        }))
        .unwrap();

        assert!(turn.text.is_none());
        assert_eq!(turn.calls.len(), 2);
        assert_eq!(turn.calls[0].name, "list_directory");
        assert_eq!(turn.calls[0].args["path"], ".");
        assert_eq!(turn.calls[1].args["max_lines"], 50);
        assert!(turn.raw.is_some());
    }

    #[test]
    fn function_call_without_args_gets_empty_map() {
        let turn = parse(json!({
            "candidates": [{ "content": { "parts": [{ "functionCall": { "name": "list_directory" } }] } }]
        }))
        .unwrap();
        assert!(turn.calls[0].args.is_empty());
    }

    #[test]
    fn concatenates_text_and_skips_thoughts() {
        let turn = parse(json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "thinking...", "thought": true },
                        { "text": "I could not " },
                        { "text": "find an entrypoint." }
                    ]
                }
            }]
        }))
        .unwrap();
        assert_eq!(turn.text.as_deref(), Some("I could not find an entrypoint."));
        assert!(turn.calls.is_empty());
    }

    #[test]
    fn no_candidates_is_an_error() {
        assert!(matches!(
            parse(json!({ "candidates": [] })),
            Err(OracleError::EmptyResponse)
        ));
        assert!(matches!(parse(json!({})), Err(OracleError::EmptyResponse)));
    }

    #[test]
    fn candidate_without_content_is_an_empty_turn() {
        let turn = parse(json!({ "candidates": [{ "finishReason": "SAFETY" }] })).unwrap();
        assert!(turn.text.is_none());
        assert!(turn.calls.is_empty());
    }

    #[test]
    fn request_body_maps_every_turn_kind() {
        let mut conversation = Conversation::with_prompt("Generate a Dockerfile");
        let mut args = Map::new();
        args.insert("path".to_owned(), json!("."));
        conversation.push(Turn::Oracle(OracleTurn::calls(vec![ToolCall::new(
            "list_directory",
            args,
        )])));
        conversation.push(Turn::ToolResults(vec![
            ToolOutcome {
                name: "list_directory".to_owned(),
                result: Ok(ToolOutput::Written(PathBuf::from("/p/Dockerfile"))),
            },
            ToolOutcome {
                name: "nope".to_owned(),
                result: Err(ToolError::unknown_tool("nope")),
            },
        ]));

        let schemas = tool_schemas();
        let body = serde_json::to_value(request_body("sys", &schemas, &conversation, 0.2)).unwrap();

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "sys");
        assert_eq!(body["tools"][0]["functionDeclarations"].as_array().unwrap().len(), 4);
        assert_eq!(body["tools"][0]["functionDeclarations"][0]["name"], "list_directory");
        assert!((body["generationConfig"]["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);

        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[0]["parts"][0]["text"], "Generate a Dockerfile");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[1]["parts"][0]["functionCall"]["name"], "list_directory");
        assert_eq!(contents[1]["parts"][0]["functionCall"]["args"]["path"], ".");
        assert_eq!(contents[2]["role"], "user");
        assert_eq!(
            contents[2]["parts"][0]["functionResponse"]["response"]["path"],
            "/p/Dockerfile"
        );
        assert_eq!(
            contents[2]["parts"][1]["functionResponse"]["response"]["error"],
            "Unknown tool: nope"
        );
    }

    #[test]
    fn raw_oracle_content_is_replayed_verbatim() {
        let raw = json!({
            "role": "model",
            "parts": [{ "functionCall": { "name": "read_file", "args": {} }, "thoughtSignature": "abc" }]
        });
        let turn = OracleTurn {
            raw: Some(raw.clone()),
            ..Default::default()
        };
        assert_eq!(turn_to_content(&Turn::Oracle(turn)), raw);
    }
}

//! AI-powered suggestion generation.
//!
//! Three prompt variants share one request path: `generate` for the first
//! pass, `improve` when the user discards the batch, and `fix` after a
//! chosen command fails. Each completion's content must be a JSON object
//! with `command` and `explanation` keys; anything else is a
//! response-format error that carries the raw body for diagnosis.

use crate::config::{BASE_MODEL, DEFAULT_SAMPLES, IMPROVED_MODEL, MAX_TOKENS, TEMPERATURE};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::suggestion::Suggestion;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

const API_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Trait for producing suggestions from a query and execution context.
#[async_trait]
pub trait SuggestionGenerator: Send + Sync {
    /// First-pass suggestions for a fresh query.
    async fn generate(&self, query: &str, system_info: &str) -> Result<Vec<Suggestion>>;

    /// A better suggestion after the user discarded a whole batch.
    async fn improve(
        &self,
        query: &str,
        discarded: &[Suggestion],
        system_info: &str,
    ) -> Result<Vec<Suggestion>>;

    /// A corrected suggestion after an execution failed.
    async fn fix(
        &self,
        query: &str,
        used: &Suggestion,
        exit_code: i32,
        stderr: &str,
        system_info: &str,
    ) -> Result<Vec<Suggestion>>;
}

/// Generator backed by the OpenAI chat-completions API.
pub struct LlmGenerator {
    http: Box<dyn HttpClient>,
    api_key: String,
}

impl LlmGenerator {
    pub fn new(api_key: &str) -> Self {
        Self::with_http_client(api_key, Box::new(ReqwestHttpClient::new()))
    }

    /// Creates a generator with an injected HTTP client (for testing).
    pub fn with_http_client(api_key: &str, http: Box<dyn HttpClient>) -> Self {
        Self {
            http,
            api_key: api_key.to_string(),
        }
    }

    async fn complete(
        &self,
        model: &str,
        messages: Vec<Message>,
        samples: u32,
    ) -> Result<Vec<Suggestion>> {
        let body = json!({
            "model": model,
            "messages": messages,
            "max_tokens": MAX_TOKENS,
            "n": samples,
            "response_format": { "type": "json_object" },
            "temperature": TEMPERATURE,
        });

        info!("Requesting {samples} completion(s) from {model}");
        let raw = self.http.post_json(API_URL, &self.api_key, &body).await?;

        parse_completions(&raw)
    }
}

/// Parses the API response body into suggestions.
///
/// Fails if the envelope is not a chat completion, contains no choices, or
/// any choice's content is not a `{command, explanation}` object. The
/// error message includes the raw body so the user can see what came back.
fn parse_completions(raw: &str) -> Result<Vec<Suggestion>> {
    let completion: ChatCompletion = serde_json::from_str(raw).map_err(|e| {
        warn!("Unexpected response envelope: {e}");
        invalid_response(raw)
    })?;

    if completion.choices.is_empty() {
        return Err(invalid_response(raw));
    }

    completion
        .choices
        .iter()
        .map(|choice| {
            let content = choice.message.content.as_deref().unwrap_or_default();
            Suggestion::from_json(content).map_err(|e| {
                warn!("Completion content is not a suggestion: {e}");
                invalid_response(raw)
            })
        })
        .collect()
}

fn invalid_response(raw: &str) -> anyhow::Error {
    anyhow!("Invalid response from the model API.\nRaw response: {raw}")
}

#[async_trait]
impl SuggestionGenerator for LlmGenerator {
    async fn generate(&self, query: &str, system_info: &str) -> Result<Vec<Suggestion>> {
        let messages = vec![
            Message {
                role: "system",
                content: format!(
                    "Generate an executable shell command for the user's query, \
                     for system: '{system_info}'. Give the command and also a \
                     technical explanation of what the command does and how it is \
                     constructed. Present in JSON format with keys 'command' and \
                     'explanation'"
                ),
            },
            Message {
                role: "user",
                content: format!("QUERY: {query}"),
            },
        ];

        self.complete(BASE_MODEL, messages, DEFAULT_SAMPLES).await
    }

    async fn improve(
        &self,
        query: &str,
        discarded: &[Suggestion],
        system_info: &str,
    ) -> Result<Vec<Suggestion>> {
        let discarded_text = discarded
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join("\n");

        let messages = vec![
            Message {
                role: "system",
                content: format!(
                    "Improve the shell command suggestions given by another AI. \
                     The user didn't like those suggestions and wants a new \
                     command; give an improved suggestion based on the user query \
                     and the discarded suggestions, for system: '{system_info}'. \
                     Give the command and also a technical explanation of what \
                     the command does and how it is constructed, and how it is \
                     better or different from the others. Present in JSON format \
                     with keys 'command' and 'explanation'"
                ),
            },
            Message {
                role: "user",
                content: format!(
                    "USER QUERY: {query}\nDISCARDED SUGGESTIONS: {discarded_text}"
                ),
            },
        ];

        self.complete(IMPROVED_MODEL, messages, DEFAULT_SAMPLES).await
    }

    async fn fix(
        &self,
        query: &str,
        used: &Suggestion,
        exit_code: i32,
        stderr: &str,
        system_info: &str,
    ) -> Result<Vec<Suggestion>> {
        let messages = vec![
            Message {
                role: "system",
                content: format!(
                    "Fix the shell command suggestion given by another AI. The \
                     command should directly answer the user's query, but fixed \
                     to work on the user's system: {system_info}. Give the \
                     command and also a technical explanation of what the \
                     command does and how it is constructed, but most \
                     importantly: what the issue was and how it was fixed. \
                     Present in JSON format with keys 'command' and \
                     'explanation'. Start by writing the 'explanation' first."
                ),
            },
            Message {
                role: "user",
                content: format!(
                    "USER QUERY: {query}\nUSED SUGGESTION: {used}\n\
                     ERROR CODE: {exit_code}\nSTDERR: {stderr}"
                ),
            },
        ];

        // A fix is a single targeted correction, not a sampling exercise.
        self.complete(IMPROVED_MODEL, messages, 1).await
    }
}

/// Deterministic generator used when `ASKG_USE_MOCK=1` is set.
///
/// Keeps integration tests off the network: generated commands echo the
/// query back, so tests can assert on the executed output.
pub struct MockGenerator;

impl MockGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SuggestionGenerator for MockGenerator {
    async fn generate(&self, query: &str, _system_info: &str) -> Result<Vec<Suggestion>> {
        info!("Using mock generator (ASKG_USE_MOCK=1)");
        // Two samples that collapse to one after dedupe, like a real model
        // often does at low temperature.
        Ok(vec![
            Suggestion {
                command: format!("echo mock: {query}"),
                explanation: "Echoes the query back using the shell builtin.".to_string(),
            },
            Suggestion {
                command: format!("echo mock: {query}"),
                explanation: "Prints the query to standard output.".to_string(),
            },
        ])
    }

    async fn improve(
        &self,
        query: &str,
        _discarded: &[Suggestion],
        _system_info: &str,
    ) -> Result<Vec<Suggestion>> {
        Ok(vec![Suggestion {
            command: format!("echo improved: {query}"),
            explanation: "A distinct take on the same query.".to_string(),
        }])
    }

    async fn fix(
        &self,
        _query: &str,
        used: &Suggestion,
        exit_code: i32,
        _stderr: &str,
        _system_info: &str,
    ) -> Result<Vec<Suggestion>> {
        Ok(vec![Suggestion {
            command: "true".to_string(),
            explanation: format!(
                "The command '{}' exited with code {exit_code}; replaced with a \
                 no-op that always succeeds.",
                used.command
            ),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock HTTP client returning a canned body and recording request
    /// bodies for inspection.
    struct MockHttpClient {
        response: String,
        requests: Mutex<Vec<serde_json::Value>>,
    }

    impl MockHttpClient {
        fn new(response: &str) -> Self {
            Self {
                response: response.to_string(),
                requests: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn post_json(
            &self,
            _url: &str,
            _bearer_token: &str,
            body: &serde_json::Value,
        ) -> Result<String> {
            self.requests.lock().unwrap().push(body.clone());
            Ok(self.response.clone())
        }
    }

    /// Arc wrapper so a test keeps a handle on the client owned by the
    /// generator.
    struct SharedHttpClient(Arc<MockHttpClient>);

    #[async_trait]
    impl HttpClient for SharedHttpClient {
        async fn post_json(
            &self,
            url: &str,
            bearer_token: &str,
            body: &serde_json::Value,
        ) -> Result<String> {
            self.0.post_json(url, bearer_token, body).await
        }
    }

    /// Builds a generator whose requests can be inspected after the call.
    fn recording_generator(body: &str) -> (Arc<MockHttpClient>, LlmGenerator) {
        let client = Arc::new(MockHttpClient::new(body));
        let generator = LlmGenerator::with_http_client(
            "sk-test-12345",
            Box::new(SharedHttpClient(Arc::clone(&client))),
        );
        (client, generator)
    }

    fn first_request(client: &MockHttpClient) -> serde_json::Value {
        client.requests.lock().unwrap()[0].clone()
    }

    fn completion_body(contents: &[&str]) -> String {
        let choices: Vec<serde_json::Value> = contents
            .iter()
            .map(|c| json!({ "message": { "content": c } }))
            .collect();
        json!({ "choices": choices }).to_string()
    }

    fn suggestion_content(command: &str) -> String {
        json!({ "command": command, "explanation": "does things" }).to_string()
    }

    #[tokio::test]
    async fn test_generate_parses_two_samples() {
        let body = completion_body(&[
            &suggestion_content("ls -la"),
            &suggestion_content("du -sh *"),
        ]);
        let generator =
            LlmGenerator::with_http_client("sk-test-12345", Box::new(MockHttpClient::new(&body)));

        let suggestions = generator.generate("list files", "Linux").await.unwrap();
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].command, "ls -la");
        assert_eq!(suggestions[1].command, "du -sh *");
    }

    #[tokio::test]
    async fn test_generate_sets_model_samples_and_temperature() {
        let body = completion_body(&[&suggestion_content("ls")]);
        let (client, generator) = recording_generator(&body);

        generator.generate("q", "sys").await.unwrap();
        let recorded = first_request(&client);

        assert_eq!(recorded["model"], BASE_MODEL);
        assert_eq!(recorded["n"], DEFAULT_SAMPLES);
        assert_eq!(recorded["max_tokens"], MAX_TOKENS);
        assert_eq!(recorded["response_format"]["type"], "json_object");
        let temperature = recorded["temperature"].as_f64().unwrap();
        assert!((temperature - f64::from(TEMPERATURE)).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_generate_tags_prompt_with_system_info_and_query() {
        let body = completion_body(&[&suggestion_content("ls")]);
        let (client, generator) = recording_generator(&body);

        generator.generate("list files", "Linux box 6.1.0").await.unwrap();
        let recorded = first_request(&client);

        let system_content = recorded["messages"][0]["content"].as_str().unwrap();
        assert_eq!(recorded["messages"][0]["role"], "system");
        assert!(system_content.contains("Linux box 6.1.0"));
        assert_eq!(recorded["messages"][1]["role"], "user");
        assert_eq!(
            recorded["messages"][1]["content"].as_str().unwrap(),
            "QUERY: list files"
        );
    }

    #[tokio::test]
    async fn test_improve_uses_stronger_model_and_embeds_discards() {
        let body = completion_body(&[&suggestion_content("find . -name '*.rs'")]);
        let discarded = vec![Suggestion {
            command: "ls".to_string(),
            explanation: "too simple".to_string(),
        }];
        let (client, generator) = recording_generator(&body);

        generator
            .improve("find rust files", &discarded, "sys")
            .await
            .unwrap();
        let recorded = first_request(&client);

        assert_eq!(recorded["model"], IMPROVED_MODEL);
        assert_eq!(recorded["n"], DEFAULT_SAMPLES);
        let user_content = recorded["messages"][1]["content"].as_str().unwrap();
        assert!(user_content.contains("DISCARDED SUGGESTIONS:"));
        assert!(user_content.contains(r#""command":"ls""#));
    }

    #[tokio::test]
    async fn test_fix_uses_single_sample_and_embeds_failure() {
        let body = completion_body(&[&suggestion_content("ls -la /tmp")]);
        let used = Suggestion {
            command: "ls /nope".to_string(),
            explanation: "lists".to_string(),
        };
        let (client, generator) = recording_generator(&body);

        generator
            .fix("list files", &used, 2, "No such file or directory", "sys")
            .await
            .unwrap();
        let recorded = first_request(&client);

        assert_eq!(recorded["model"], IMPROVED_MODEL);
        assert_eq!(recorded["n"], 1);
        let system_content = recorded["messages"][0]["content"].as_str().unwrap();
        assert!(system_content.contains("writing the 'explanation' first"));
        let user_content = recorded["messages"][1]["content"].as_str().unwrap();
        assert!(user_content.contains("ERROR CODE: 2"));
        assert!(user_content.contains("STDERR: No such file or directory"));
        assert!(user_content.contains("ls /nope"));
    }

    #[tokio::test]
    async fn test_non_json_body_is_response_format_error() {
        let generator = LlmGenerator::with_http_client(
            "sk-test-12345",
            Box::new(MockHttpClient::new("upstream timeout")),
        );

        let err = generator.generate("q", "sys").await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Invalid response"));
        assert!(message.contains("upstream timeout"));
    }

    #[tokio::test]
    async fn test_content_missing_keys_is_response_format_error() {
        let body = completion_body(&[r#"{"cmd": "ls"}"#]);
        let generator = LlmGenerator::with_http_client(
            "sk-test-12345",
            Box::new(MockHttpClient::new(&body)),
        );

        let err = generator.generate("q", "sys").await.unwrap_err();
        assert!(err.to_string().contains("Invalid response"));
    }

    #[tokio::test]
    async fn test_content_not_json_is_response_format_error() {
        let body = completion_body(&["try running ls -la"]);
        let generator = LlmGenerator::with_http_client(
            "sk-test-12345",
            Box::new(MockHttpClient::new(&body)),
        );

        assert!(generator.generate("q", "sys").await.is_err());
    }

    #[tokio::test]
    async fn test_empty_choices_is_response_format_error() {
        let generator = LlmGenerator::with_http_client(
            "sk-test-12345",
            Box::new(MockHttpClient::new(r#"{"choices": []}"#)),
        );

        assert!(generator.generate("q", "sys").await.is_err());
    }

    #[tokio::test]
    async fn test_mock_generator_duplicates_collapse_to_query_echo() {
        let suggestions = MockGenerator.generate("list files", "sys").await.unwrap();
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].command, "echo mock: list files");
        assert_eq!(suggestions[0].command, suggestions[1].command);
    }
}

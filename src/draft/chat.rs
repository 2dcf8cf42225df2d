//! Chat-completion drafting over HTTP.
//!
//! Speaks the OpenAI-compatible `chat/completions` shape, which is what
//! Perplexity serves. One request per draft: no retries, no streaming.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DraftingConfig;
use crate::model::Incident;

use super::{DraftError, Drafter};

/// Longest slice of an error body carried into [`DraftError::Status`].
const ERROR_BODY_LIMIT: usize = 200;

/// Drafts customer messages with a hosted chat model.
#[derive(Debug, Clone)]
pub struct ChatDrafter {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: ChatReply,
}

#[derive(Debug, Default, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

impl ChatDrafter {
    pub fn new(config: &DraftingConfig, api_key: String) -> Result<Self, DraftError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn request_body(&self, incident: &Incident) -> ChatRequest<'_> {
        ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt(incident),
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

impl Drafter for ChatDrafter {
    fn draft(&self, incident: &Incident) -> Result<String, DraftError> {
        debug!(
            endpoint = %self.endpoint,
            model = %self.model,
            incident = %incident.id,
            "requesting draft"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(incident))
            .send()?;

        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(DraftError::Status {
                status: status.as_u16(),
                body: truncate(&body, ERROR_BODY_LIMIT),
            });
        }

        parse_completion(&body)
    }
}

/// The instruction sent to the model for one incident.
fn prompt(incident: &Incident) -> String {
    format!(
        "You are a professional customer communications specialist.\n\
         Draft a clear, concise incident message for customers based on the following info:\n\
         \n\
         - Title: {title}\n\
         - Severity: {severity}\n\
         - Service: {service}\n\
         - State: {state}\n\
         - Time Created: {created}\n\
         - Owner: {owner}\n\
         \n\
         Keep it under 300 words. Inform users of the impact and steps being taken. \
         Include a reassurance message and status link.\n",
        title = incident.title,
        severity = incident.severity,
        service = incident.owning_service,
        state = incident.state,
        created = incident.created_display(),
        owner = incident.owner,
    )
}

/// Pulls the first choice's text out of a completion body.
fn parse_completion(body: &str) -> Result<String, DraftError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| DraftError::Malformed(e.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or(DraftError::Empty)
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    use crate::model::sample_incident;

    fn drafter() -> ChatDrafter {
        ChatDrafter::new(&DraftingConfig::default(), "test-key".to_string()).unwrap()
    }

    fn drafter_at(endpoint: String) -> ChatDrafter {
        let config = DraftingConfig {
            endpoint,
            timeout_secs: 5,
            ..DraftingConfig::default()
        };
        ChatDrafter::new(&config, "test-key".to_string()).unwrap()
    }

    /// Answers one request with `status` and `body`, returning the endpoint
    /// and a handle yielding the request head.
    fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}/chat/completions", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);

            let mut head = String::new();
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
                head.push_str(&line);
            }
            let mut request_body = vec![0; content_length];
            reader.read_exact(&mut request_body).unwrap();

            let mut stream = reader.into_inner();
            write!(
                stream,
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
            stream.flush().unwrap();
            head
        });

        (endpoint, handle)
    }

    #[test]
    fn prompt_lists_incident_fields() {
        let text = prompt(&sample_incident());
        assert!(text.contains("- Title: Service degradation in Payment Service\n"));
        assert!(text.contains("- Severity: High\n"));
        assert!(text.contains("- Service: Payment Service\n"));
        assert!(text.contains("- State: Open\n"));
        assert!(text.contains("- Time Created: 2023-11-14 22:13\n"));
        assert!(text.contains("- Owner: Jane Smith\n"));
        assert!(text.contains("under 300 words"));
    }

    #[test]
    fn request_body_has_chat_shape() {
        let drafter = drafter();
        let body = serde_json::to_value(drafter.request_body(&sample_incident())).unwrap();

        assert_eq!(body["model"], "sonar");
        assert_eq!(body["max_tokens"], 300);
        assert_eq!(body["messages"][0]["role"], "user");
        assert!(
            body["messages"][0]["content"]
                .as_str()
                .unwrap()
                .contains("Payment Service")
        );
        assert!((body["temperature"].as_f64().unwrap() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn parse_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"  Hello customers.\n"}}]}"#;
        assert_eq!(parse_completion(body).unwrap(), "Hello customers.");
    }

    #[test]
    fn parse_without_choices_is_empty() {
        assert!(matches!(
            parse_completion(r#"{"choices":[]}"#),
            Err(DraftError::Empty)
        ));
        assert!(matches!(
            parse_completion(r#"{"choices":[{"message":{"content":"   "}}]}"#),
            Err(DraftError::Empty)
        ));
    }

    #[test]
    fn parse_garbage_is_malformed() {
        assert!(matches!(
            parse_completion("<html>bad gateway</html>"),
            Err(DraftError::Malformed(_))
        ));
    }

    #[test]
    fn successful_reply_is_drafted() {
        let body = r#"{"choices":[{"message":{"content":"We are on it."}}]}"#.to_string();
        let (endpoint, server) = serve_once("200 OK", body);

        let text = drafter_at(endpoint).draft(&sample_incident()).unwrap();
        assert_eq!(text, "We are on it.");

        let head = server.join().unwrap();
        assert!(head.starts_with("POST /chat/completions HTTP/1.1"));
        assert!(head.to_ascii_lowercase().contains("authorization: bearer test-key"));
    }

    #[test]
    fn error_status_becomes_status_error() {
        let (endpoint, server) = serve_once("503 Service Unavailable", "x".repeat(300));

        let err = drafter_at(endpoint).draft(&sample_incident()).unwrap_err();
        server.join().unwrap();

        match err {
            DraftError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, format!("{}…", "x".repeat(ERROR_BODY_LIMIT)));
            }
            other => panic!("expected a status error, got {other:?}"),
        }
    }

    #[test]
    fn unreachable_endpoint_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}/chat/completions", listener.local_addr().unwrap());
        drop(listener);

        let err = drafter_at(endpoint).draft(&sample_incident()).unwrap_err();
        assert!(matches!(err, DraftError::Transport(_)));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééé", 2), "éé…");
    }
}

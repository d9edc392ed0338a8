use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::Config;
use crate::markup::{self, Bullet};
use crate::models::ReportMode;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const BULLET_PROMPT: &str = "I am about to give you a few points that summarize an event. \
Please format these points into a more professional style. \
Remember this is for a report so whatever points are given, make sure you write it in a way that \
displays what was taught/done and not what the points mean (Like write something along the lines \
of '_____ was conducted where ________ was taught and ____ was performed'). \
Provide them in a bullet-point format, separated by ';'. \
Make sure the words you use are extremely simple but professional. Don't use any complex words and \
don't make 1 point use longer than 10 words (Make sure it STRICTLY ENDS BEFORE 10 Words. Not a single word more). \
If any text should be bold, enclose it in '**'. \
Output nothing other than the refined points in the specified format. And I mean ABSOLUTELY NOTHING, \
not even things like 'Here's the .....'. \
Points: ";

const PARAGRAPH_PROMPT: &str = "I am about to give you a few points that summarize an event. \
Expand them into one professional paragraph for an event report, describing what was taught and \
what was done. Use simple, professional words. \
Do not use bullet points, headings or any markup. \
Output nothing other than the paragraph itself, not even things like 'Here's the .....'. \
Points: ";

/// Raw result of one completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Completion {
    Success(String),
    Failed(String),
}

impl Completion {
    /// The response text, or empty when the request failed
    pub fn text(&self) -> &str {
        match self {
            Completion::Success(text) => text,
            Completion::Failed(_) => "",
        }
    }
}

/// Completion text shaped for the document body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FormattedOutput {
    Bullets(Vec<Bullet>),
    Paragraph(String),
}

impl FormattedOutput {
    /// Shape raw completion text for `mode`. Bullet output is padded to the minimum count.
    pub fn from_text(mode: ReportMode, text: &str) -> Self {
        match mode {
            ReportMode::Bullets => FormattedOutput::Bullets(markup::bullets_with_minimum(text)),
            ReportMode::Paragraph => FormattedOutput::Paragraph(text.trim().to_string()),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
}

#[derive(Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

pub fn prompt_for(mode: ReportMode) -> &'static str {
    match mode {
        ReportMode::Bullets => BULLET_PROMPT,
        ReportMode::Paragraph => PARAGRAPH_PROMPT,
    }
}

/// The single user message sent for `points`
pub fn build_message(mode: ReportMode, points: &[String]) -> String {
    format!("{} {}", prompt_for(mode), points.join(", "))
}

/// Client for the Groq chat-completions API
pub struct NarrativeFormatter {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl NarrativeFormatter {
    pub fn new(api_key: String, model: String, base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            model,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.groq_api_key.clone(),
            config.groq_model.clone(),
            &config.groq_base_url,
            DEFAULT_TIMEOUT,
        )
    }

    /// Send the points for rewording. Errors are folded into [`Completion::Failed`].
    pub async fn format_points(&self, points: &[String], mode: ReportMode) -> Completion {
        if points.is_empty() {
            return Completion::Failed("No points to format".to_string());
        }

        match self.try_format(points, mode).await {
            Ok(text) => {
                tracing::info!(chars = text.len(), ?mode, "completion received");
                Completion::Success(text)
            }
            Err(e) => {
                tracing::debug!(error = %e, "completion request failed");
                Completion::Failed(format!("{:#}", e))
            }
        }
    }

    async fn try_format(&self, points: &[String], mode: ReportMode) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: build_message(mode, points),
            }],
        };

        tracing::debug!(endpoint = %self.endpoint, model = %self.model, points = points.len(), "sending completion request");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Groq API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            anyhow::bail!("Groq API error ({}): {}", status.as_u16(), error_text);
        }

        let chat_response = response
            .json::<ChatResponse>()
            .await
            .context("Failed to parse Groq API response")?;

        Ok(extract_content(chat_response))
    }
}

fn extract_content(response: ChatResponse) -> String {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.trim().to_string())
        .unwrap_or_default()
}

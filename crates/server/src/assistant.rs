//! Procurement assistant providers.
//!
//! [`Assistant::Canned`] answers from a fixed table of procurement tips and
//! never fails. [`Assistant::OpenAi`] forwards the transcript to an OpenAI
//! compatible chat completions endpoint, once, without retries.

use std::time::Duration;

use api_types::chat::{ChatMessage, ChatRole};
use chrono::Utc;
use engine::{Money, Rfq};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SYSTEM_PROMPT: &str = "You are Bell24H's procurement assistant. Give concise, \
practical advice to buyers and suppliers on RFQs, bids, contracts and payments.";

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("assistant transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("assistant provider returned {status}: {message}")]
    Provider { status: u16, message: String },
    #[error("assistant provider returned no reply")]
    EmptyReply,
}

pub struct OpenAiProvider {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

pub enum Assistant {
    Canned,
    OpenAi(OpenAiProvider),
}

impl Assistant {
    pub fn canned() -> Self {
        Self::Canned
    }

    pub fn openai(api_key: String, model: Option<String>, base_url: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self::OpenAi(OpenAiProvider {
            http,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: model.unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            api_key,
        })
    }

    pub fn provider_name(&self) -> &'static str {
        match self {
            Self::Canned => "canned",
            Self::OpenAi(_) => "openai",
        }
    }

    /// Reply to the last user message of `transcript`.
    pub async fn reply(&self, transcript: &[ChatMessage]) -> Result<String, AssistantError> {
        match self {
            Self::Canned => {
                let prompt = transcript
                    .iter()
                    .rev()
                    .find(|message| message.role == ChatRole::User)
                    .map_or("", |message| message.content.as_str());
                Ok(canned_reply(prompt).to_string())
            }
            Self::OpenAi(provider) => provider.complete(transcript).await,
        }
    }

    /// Advice on one RFQ.
    pub async fn analyze_rfq(&self, rfq: &Rfq) -> Result<String, AssistantError> {
        match self {
            Self::Canned => Ok(canned_rfq_analysis(rfq)),
            Self::OpenAi(provider) => {
                let prompt = ChatMessage {
                    role: ChatRole::User,
                    content: format!(
                        "Analyze this RFQ and suggest improvements to attract good bids.\n{}",
                        describe_rfq(rfq)
                    ),
                };
                provider.complete(std::slice::from_ref(&prompt)).await
            }
        }
    }
}

#[derive(Serialize)]
struct CompletionMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<CompletionMessage<'a>>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionReply,
}

#[derive(Deserialize)]
struct CompletionReply {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    message: String,
}

impl OpenAiProvider {
    async fn complete(&self, transcript: &[ChatMessage]) -> Result<String, AssistantError> {
        let mut messages = vec![CompletionMessage {
            role: "system",
            content: SYSTEM_PROMPT,
        }];
        messages.extend(transcript.iter().map(|message| CompletionMessage {
            role: message.role.as_str(),
            content: &message.content,
        }));

        let res = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&CompletionRequest {
                model: &self.model,
                messages,
            })
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let message = res
                .json::<ProviderError>()
                .await
                .map(|err| err.error.message)
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(AssistantError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let body = res.json::<CompletionResponse>().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(AssistantError::EmptyReply)
    }
}

/// Keyword table, checked in order; the first match wins.
const CANNED_TIPS: &[(&[&str], &str)] = &[
    (
        &["rfq", "quotation", "request"],
        "A good RFQ states the exact specification, quantity, delivery location and \
         deadline. Attach drawings or standards where possible and give suppliers at \
         least a week to respond.",
    ),
    (
        &["bid", "price", "quote", "negotiat"],
        "Compare bids on total cost, not unit price alone: include delivery time, \
         payment terms and the supplier's track record. Ask the two best bidders for \
         a final offer before awarding.",
    ),
    (
        &["supplier", "vendor", "verify", "risk"],
        "Prefer verified suppliers with a low risk score. For new suppliers, start \
         with a smaller order and check GST registration and references.",
    ),
    (
        &["contract", "terms", "agreement"],
        "Put delivery milestones, quality acceptance criteria and penalties for delay \
         in the contract terms. Move the contract to pending approval so the supplier \
         can confirm before work starts.",
    ),
    (
        &["payment", "wallet", "escrow", "invoice"],
        "Use escrow for first orders with a supplier and release payment against \
         delivery milestones. Keep enough wallet balance to cover committed contracts.",
    ),
    (
        &["deadline", "deliver", "logistic", "shipping"],
        "Build a buffer of a few days into delivery deadlines and confirm the \
         Incoterms so both sides know who pays for freight and insurance.",
    ),
];

const CANNED_FALLBACK: &str = "I can help with RFQs, bids, supplier selection, contracts \
and payments. Tell me what you are trying to buy or sell.";

pub fn canned_reply(prompt: &str) -> &'static str {
    let prompt = prompt.to_lowercase();
    CANNED_TIPS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| prompt.contains(keyword)))
        .map_or(CANNED_FALLBACK, |(_, tip)| *tip)
}

fn describe_rfq(rfq: &Rfq) -> String {
    let budget = rfq
        .budget_minor
        .map_or_else(|| "not set".to_string(), |b| Money::new(b).to_string());
    format!(
        "Title: {}\nCategory: {}\nQuantity: {}\nBudget: {}\nDeadline: {}\nStatus: {}\nDescription: {}",
        rfq.title,
        rfq.category,
        rfq.quantity,
        budget,
        rfq.deadline.to_rfc3339(),
        rfq.status.as_str(),
        rfq.description
    )
}

fn canned_rfq_analysis(rfq: &Rfq) -> String {
    let mut notes = Vec::new();

    match rfq.budget_minor {
        Some(budget) if rfq.quantity > 0 => notes.push(format!(
            "Budget works out to {} per unit.",
            Money::new(budget / rfq.quantity)
        )),
        _ => notes.push(
            "No budget is set; suppliers tend to quote higher without a target price."
                .to_string(),
        ),
    }

    let days_left = (rfq.deadline - Utc::now()).num_days();
    if days_left < 3 {
        notes.push(format!(
            "Only {} day(s) remain until the deadline; consider extending it to get more bids.",
            days_left.max(0)
        ));
    } else {
        notes.push(format!("{days_left} days remain for suppliers to respond."));
    }

    if rfq.description.split_whitespace().count() < 10 {
        notes.push(
            "The description is short; add specifications, standards and delivery location."
                .to_string(),
        );
    }

    format!("Analysis of \"{}\": {}", rfq.title, notes.join(" "))
}

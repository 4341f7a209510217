use super::ApodFetcher;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};

pub const FALLBACK_TITLE: &str = "NASA APOD";
pub const FALLBACK_API_ERROR: &str = "API error";

pub struct HttpApodFetcher {
    client: reqwest::Client,
}

impl HttpApodFetcher {
    pub fn new() -> Self {
        // The default client has no request timeout; a fetch waits as long as
        // the server takes.
        let client = reqwest::Client::builder()
            .user_agent(concat!("wqdash/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client }
    }
}

impl Default for HttpApodFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApodFetcher for HttpApodFetcher {
    async fn fetch(&self, base_url: &str, credential: &str) -> Result<Value> {
        let url = format!("{}{}", base_url, credential);
        let response = self.client.get(&url).send().await?;
        let payload: Value = response.json().await?;
        Ok(payload)
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("image request returned HTTP {}", response.status()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// APOD response with every field optional.
///
/// Fields that are absent or `null` are `None`; the accessor methods carry the
/// fallback rules used for display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApodPayload {
    pub title: Option<String>,
    pub date: Option<String>,
    pub explanation: Option<String>,
    pub url: Option<String>,
    pub hdurl: Option<String>,
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiErrorBody {
    pub message: Option<String>,
}

impl ApodPayload {
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| anyhow!("expected a JSON object, got {}", kind_of(value)))?;

        Ok(Self {
            title: text_field(obj, "title"),
            date: text_field(obj, "date"),
            explanation: text_field(obj, "explanation"),
            url: text_field(obj, "url"),
            hdurl: text_field(obj, "hdurl"),
            error: obj.get("error").filter(|e| is_truthy(e)).map(|e| match e {
                Value::Object(body) => ApiErrorBody {
                    message: text_field(body, "message"),
                },
                Value::String(s) => ApiErrorBody {
                    message: Some(s.clone()),
                },
                _ => ApiErrorBody::default(),
            }),
        })
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|e| {
            e.message
                .as_deref()
                .unwrap_or(FALLBACK_API_ERROR)
        })
    }

    pub fn title_or_default(&self) -> &str {
        self.title.as_deref().unwrap_or(FALLBACK_TITLE)
    }

    pub fn date_or_empty(&self) -> &str {
        self.date.as_deref().unwrap_or("")
    }

    pub fn explanation_or_empty(&self) -> &str {
        self.explanation.as_deref().unwrap_or("")
    }

    /// The high-definition URL when it is set, else the standard one. Empty
    /// strings count as unset.
    pub fn image_url(&self) -> Option<&str> {
        self.hdurl
            .as_deref()
            .filter(|u| !u.is_empty())
            .or_else(|| self.url.as_deref().filter(|u| !u.is_empty()))
    }
}

fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApodEntry {
    pub title: String,
    pub date: String,
    pub image_url: Option<String>,
    pub explanation: String,
}

impl From<&ApodPayload> for ApodEntry {
    fn from(payload: &ApodPayload) -> Self {
        Self {
            title: payload.title_or_default().to_string(),
            date: payload.date_or_empty().to_string(),
            image_url: payload.image_url().map(str::to_string),
            explanation: payload.explanation_or_empty().to_string(),
        }
    }
}

/// What the APOD tab shows for one display cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum ApodState {
    Loading,
    NoCredential,
    ApiError(String),
    RequestFailed(String),
    Displayed(ApodEntry),
}

/// Turns a credential into a display state, containing every network and API
/// failure. Without a credential the fetcher is not called.
pub async fn resolve_apod_view(
    fetcher: &dyn ApodFetcher,
    base_url: &str,
    credential: Option<&str>,
) -> ApodState {
    let credential = match credential {
        Some(c) if !c.is_empty() => c,
        _ => return ApodState::NoCredential,
    };

    let payload = fetcher
        .fetch(base_url, credential)
        .await
        .and_then(|value| ApodPayload::from_value(&value));

    match payload {
        Err(e) => ApodState::RequestFailed(format!("API request failed: {:#}", e)),
        Ok(payload) => match payload.error_message() {
            Some(message) => ApodState::ApiError(message.to_string()),
            None => ApodState::Displayed(ApodEntry::from(&payload)),
        },
    }
}

use std::time::Duration;

use futures_util::future::BoxFuture;

/// Default LINDAT translation service endpoint.
pub const LINDAT_URL: &str = "https://lindat.mff.cuni.cz/services/translation/api/v2";

/// Why a lookup produced no translation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("translation request failed: {0}")]
    Transport(String),
    #[error("translation service error {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected translation response: {0}")]
    Decode(String),
    #[error("translation timed out after {0:?}")]
    Timeout(Duration),
}

impl From<reqwest::Error> for LookupError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

/// One outgoing lookup, stamped with its sequence id at dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub text: String,
    pub from_language: String,
    pub to_language: String,
    pub sequence_id: u64,
}

/// A successful answer, echoing the id of the request it answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResponse {
    pub text: String,
    pub sequence_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupFailure {
    pub sequence_id: u64,
    pub error: LookupError,
}

pub type LookupOutcome = Result<LookupResponse, LookupFailure>;

/// Asynchronous translation backend.
pub trait Lookup: Send + Sync {
    fn lookup(&self, text: &str, from: &str, to: &str)
        -> BoxFuture<'static, Result<String, LookupError>>;
}

/// Run `request` against `lookup`, giving up after `timeout`.
///
/// Expiry does not abort anything upstream; the answer is simply dropped.
pub async fn resolve(lookup: &dyn Lookup, request: LookupRequest, timeout: Duration) -> LookupOutcome {
    let sequence_id = request.sequence_id;
    let pending = lookup.lookup(&request.text, &request.from_language, &request.to_language);

    let result = match tokio::time::timeout(timeout, pending).await {
        Ok(result) => result,
        Err(_) => Err(LookupError::Timeout(timeout)),
    };

    result
        .map(|text| LookupResponse { text, sequence_id })
        .map_err(|error| LookupFailure { sequence_id, error })
}

/// Client for the LINDAT/CLARIAH-CZ machine translation service.
pub struct LindatTranslator {
    client: reqwest::Client,
    base_url: String,
}

impl LindatTranslator {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Lookup for LindatTranslator {
    fn lookup(&self, text: &str, from: &str, to: &str)
        -> BoxFuture<'static, Result<String, LookupError>> {
        let client = self.client.clone();
        let url = format!("{}/languages/", self.base_url);
        let text = text.to_string();
        let query = [("src", from.to_string()), ("tgt", to.to_string())];

        Box::pin(async move {
            if text.trim().is_empty() {
                log::debug!("Blank source text, skipping translation request");
                return Ok(String::new());
            }

            let resp = client
                .post(&url)
                .query(&query)
                .header(reqwest::header::ACCEPT, "application/json")
                .form(&[("input_text", text.as_str())])
                .send()
                .await?;

            if !resp.status().is_success() {
                let status = resp.status().as_u16();
                let body = resp.text().await.unwrap_or_default();
                return Err(LookupError::Status { status, body });
            }

            // The service answers with one string per translated segment.
            let segments: Vec<String> = resp.json().await?;
            Ok(segments.concat().trim().to_string())
        })
    }
}

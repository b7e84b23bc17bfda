use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

/// Client for a PostgREST-style insert endpoint (`POST {base_url}/rest/v1/{table}`).
#[derive(Debug)]
pub struct StoreClient {
    pub http_client: Client,
    pub url: reqwest::Url,
    api_key: SecretString,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// The store rejected the row with `409 Conflict`, the email is already on the list.
    Duplicate,
}

#[derive(Serialize)]
struct SignupRow<'a> {
    email: &'a str,
}

impl StoreClient {
    pub fn new<S: AsRef<str>>(
        base_url: S,
        api_key: SecretString,
        table: &str,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        let endpoint = format!(
            "{}/rest/v1/{table}",
            base_url.as_ref().trim_end_matches('/')
        );
        let url = reqwest::Url::parse(&endpoint).map_err(|e| Error::UrlParsing(e.to_string()))?;

        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(StoreClient {
            http_client,
            url,
            api_key,
        })
    }

    pub async fn insert_signup(&self, email: &str) -> Result<InsertOutcome> {
        let api_key = self.api_key.expose_secret();

        let resp = self
            .http_client
            .post(self.url.clone())
            .header("apikey", api_key)
            .bearer_auth(api_key)
            .header("Prefer", "return=minimal")
            .json(&SignupRow { email })
            .send()
            .await?;

        match resp.status() {
            status if status.is_success() => Ok(InsertOutcome::Inserted),
            StatusCode::CONFLICT => Ok(InsertOutcome::Duplicate),
            status => {
                let body = resp.text().await.unwrap_or_default();
                Err(Error::UnexpectedStatus { status, body })
            }
        }
    }
}

// ###################################
// ->   ERROR & RESULT
// ###################################
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse the store url: {0}")]
    UrlParsing(String),
    #[error("store responded with {status}: {body}")]
    UnexpectedStatus { status: StatusCode, body: String },
    #[error("request to the store failed: {0}")]
    Reqwest(#[from] reqwest::Error),
}

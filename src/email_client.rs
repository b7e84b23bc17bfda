use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Client for a Resend-style email-delivery API (`POST {base_url}/emails`).
#[derive(Debug)]
pub struct EmailClient {
    pub http_client: Client,
    pub url: reqwest::Url,
    pub sender: String,
    auth_token: SecretString,
}

/// A single message to deliver. At least one of `html` and `text` should be set.
#[derive(Debug)]
pub struct EmailMessage<'a> {
    pub to: &'a str,
    pub subject: &'a str,
    pub html: Option<&'a str>,
    pub text: Option<&'a str>,
}

/// What the provider reported back for an accepted message.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SentEmail {
    pub id: Option<String>,
}

impl EmailClient {
    pub fn new<S: AsRef<str>>(
        url: S,
        sender: String,
        auth_token: SecretString,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        let url =
            reqwest::Url::parse(url.as_ref()).map_err(|e| Error::UrlParsing(e.to_string()))?;

        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(EmailClient {
            http_client,
            url,
            sender,
            auth_token,
        })
    }

    /// Sends `message` from the configured sender.
    ///
    /// A 2xx with a JSON body counts as delivered; the message id is picked from it when present.
    /// A 2xx whose body is not JSON is `Error::UnreadableResponse`.
    /// A non-2xx response becomes `Error::Rejected` carrying the provider's `message` field.
    pub async fn send_email(&self, message: &EmailMessage<'_>) -> Result<SentEmail> {
        let url = self
            .url
            .join("emails")
            .map_err(|e| Error::UrlParsing(e.to_string()))?;

        let email_content = EmailContent {
            from: &self.sender,
            to: message.to,
            subject: message.subject,
            html: message.html,
            text: message.text,
        };

        let resp = self
            .http_client
            .post(url)
            .bearer_auth(self.auth_token.expose_secret())
            .json(&email_content)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ProviderError>(&body)
                .ok()
                .and_then(|er| er.message)
                .unwrap_or_else(|| "Failed to send email".to_string());
            tracing::error!(
                "{:<20} - provider rejected the message, status: {status}, body: {body}",
                "email client"
            );
            return Err(Error::Rejected { status, message });
        }

        let accepted: ProviderSuccess = serde_json::from_str(&body).map_err(|er| {
            tracing::error!(
                "{:<20} - provider answered {status} with a non-JSON body: {body}",
                "email client"
            );
            Error::UnreadableResponse(er.to_string())
        })?;

        Ok(SentEmail { id: accepted.id })
    }
}

#[derive(Serialize)]
pub struct EmailContent<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub subject: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<&'a str>,
}

#[derive(Deserialize)]
struct ProviderSuccess {
    id: Option<String>,
}

#[derive(Deserialize)]
struct ProviderError {
    message: Option<String>,
}

// ###################################
// ->   ERROR & RESULT
// ###################################
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse the email provider url: {0}")]
    UrlParsing(String),
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
    #[error("email provider returned an unreadable response: {0}")]
    UnreadableResponse(String),
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
}

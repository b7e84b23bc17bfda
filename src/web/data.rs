//! Request and response payloads of the waitlist route, and their parsing.

use derive_more::Display;
use serde::Serialize;
use serde_json::Value;

use crate::web::Error;

// ###################################
// ->   STRUCTS
// ###################################
/// A signup accepted for processing. Lives for one request only.
#[derive(Debug, Clone)]
pub struct SignupRequest {
    pub email: SignupEmail,
}

/// The address a visitor submitted: a non-empty string, kept exactly as sent.
/// Format checks (whitespace included) are left to the email provider.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub struct SignupEmail(String);

impl AsRef<str> for SignupEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SignupEmail {
    pub fn parse<S>(value: S) -> Result<Self, Error>
    where
        S: AsRef<str>,
    {
        let value = value.as_ref();

        if value.is_empty() {
            return Err(Error::EmailMissing);
        }

        Ok(SignupEmail(value.to_owned()))
    }
}

impl SignupRequest {
    /// Parses a raw request body.
    ///
    /// Anything that is not JSON is an `InvalidJson` error. Valid JSON without a usable
    /// `email` string (including non-objects and `null`) is `EmailMissing`.
    pub fn from_json_bytes(body: &[u8]) -> Result<Self, Error> {
        let value: Value =
            serde_json::from_slice(body).map_err(|er| Error::InvalidJson(er.to_string()))?;

        let email = value
            .get("email")
            .and_then(Value::as_str)
            .ok_or(Error::EmailMissing)?;

        Ok(SignupRequest {
            email: SignupEmail::parse(email)?,
        })
    }
}

/// Body of a successful signup.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SignupSuccess {
    pub success: bool,
    pub message: &'static str,
}

impl Default for SignupSuccess {
    fn default() -> Self {
        SignupSuccess {
            success: true,
            message: "Successfully joined waitlist",
        }
    }
}

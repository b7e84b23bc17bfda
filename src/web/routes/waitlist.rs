use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{Method, StatusCode},
    Json,
};
use chrono::{SecondsFormat, Utc};
use tracing::{error, info, warn};

use crate::{
    email_client::EmailMessage,
    store_client::{InsertOutcome, StoreClient},
    web::{
        data::{SignupEmail, SignupRequest, SignupSuccess},
        Error, Result,
    },
    AppState,
};

/// `OPTIONS /api/waitlist`: the CORS headers are added by the route's middleware.
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub async fn method_not_allowed(method: Method) -> Error {
    Error::MethodNotAllowed(method)
}

/// `POST /api/waitlist`
///
/// Records the address in the store when one is configured, then sends the welcome email.
/// Only the welcome email decides the outcome; the store insert and the operator notice are
/// best-effort and can only fail into the logs.
#[tracing::instrument(name = "Waitlist signup", skip_all)]
pub async fn signup(
    State(app_state): State<AppState>,
    body: core::result::Result<Bytes, BytesRejection>,
) -> Result<Json<SignupSuccess>> {
    let body = body.map_err(|er| Error::InvalidJson(er.body_text()))?;
    let SignupRequest { email } = SignupRequest::from_json_bytes(&body)?;
    info!("{:<20} - Processing signup for email: {email}", "waitlist");

    if let Some(store_client) = &app_state.store_client {
        record_signup(store_client, &email).await;
    }

    send_welcome_email(&app_state, &email).await?;

    if let Some(notify_addr) = &app_state.notify_addr {
        notify_operator(&app_state, notify_addr, &email).await;
    }

    Ok(Json(SignupSuccess::default()))
}

/// Inserts the signup into the store. Every outcome ends here: a duplicate is expected,
/// any other failure is logged and dropped.
#[tracing::instrument(name = "Recording signup", skip_all)]
async fn record_signup(store_client: &StoreClient, email: &SignupEmail) {
    match store_client.insert_signup(email.as_ref()).await {
        Ok(InsertOutcome::Inserted) => info!("{:<20} - Signup stored", "waitlist"),
        Ok(InsertOutcome::Duplicate) => {
            info!("{:<20} - Email already exists in waitlist (duplicate)", "waitlist")
        }
        Err(er) => error!("{:<20} - Store insert failed: {er}", "waitlist"),
    }
}

#[tracing::instrument(name = "Sending welcome email", skip_all)]
async fn send_welcome_email(app_state: &AppState, email: &SignupEmail) -> Result<()> {
    let Some(email_client) = &app_state.email_client else {
        error!(
            "{:<20} - No email provider credential configured (RESEND_API_KEY)",
            "waitlist"
        );
        return Err(Error::EmailServiceNotConfigured);
    };

    let html = app_state
        .templ_mgr
        .render_welcome(&app_state.product_name, &app_state.site_url)?;

    let sent = email_client
        .send_email(&EmailMessage {
            to: email.as_ref(),
            subject: &app_state.welcome_subject,
            html: Some(&html),
            text: None,
        })
        .await?;

    match sent.id {
        Some(id) => info!("{:<20} - Email sent successfully: {id}", "waitlist"),
        None => warn!(
            "{:<20} - Provider accepted the email but returned no message id",
            "waitlist"
        ),
    }

    Ok(())
}

/// Sends the plain-text signup notice to the operator inbox. Failures are only logged.
#[tracing::instrument(name = "Notifying operator", skip_all)]
async fn notify_operator(app_state: &AppState, notify_addr: &str, email: &SignupEmail) {
    let Some(email_client) = &app_state.email_client else {
        return;
    };

    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let text = match app_state.templ_mgr.render_signup_notice(
        &app_state.product_name,
        email.as_ref(),
        &timestamp,
    ) {
        Ok(text) => text,
        Err(er) => {
            error!("{:<20} - Rendering the signup notice failed: {er}", "waitlist");
            return;
        }
    };

    let subject = format!("New {} Waitlist Signup", app_state.product_name);
    let res = email_client
        .send_email(&EmailMessage {
            to: notify_addr,
            subject: &subject,
            html: None,
            text: Some(&text),
        })
        .await;

    if let Err(er) = res {
        error!("{:<20} - Sending the signup notice failed: {er}", "waitlist");
    }
}

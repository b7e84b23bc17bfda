use std::time::Duration;

use anyhow::Result;
use fake::{faker::internet::en::SafeEmail, Fake};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use wiremock::{
    matchers::{any, body_partial_json, header, method, path},
    Mock, ResponseTemplate,
};

use crate::helpers::TestApp;

/// Asserts the CORS and content-type headers every waitlist response carries.
fn assert_waitlist_headers(res: &reqwest::Response) {
    let headers = res.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-allow-methods"], "POST, OPTIONS");
    assert_eq!(headers["access-control-allow-headers"], "Content-Type, Accept");
    assert_eq!(headers["content-type"], "application/json");
}

async fn mount_email_ok(app: &TestApp, times: u64) {
    Mock::given(path("/emails"))
        .and(method("POST"))
        .and(header("Authorization", "Bearer re_test_key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "msg_1" })))
        .expect(times)
        .mount(&app.email_server)
        .await;
}

async fn mount_store(app: &TestApp, status: u16, times: u64) {
    Mock::given(path("/rest/v1/waitlist_signups"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(status))
        .expect(times)
        .mount(&app.store_server)
        .await;
}

async fn expect_no_upstream_calls(app: &TestApp) {
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&app.store_server)
        .await;
}

#[tokio::test]
async fn waitlist_options_returns_204_with_cors_headers() -> Result<()> {
    let app = TestApp::spawn().await?;
    expect_no_upstream_calls(&app).await;

    let res = app.request_waitlist(Method::OPTIONS).await?;

    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_waitlist_headers(&res);
    assert!(res.bytes().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn waitlist_other_methods_return_405_echoing_the_method() -> Result<()> {
    let app = TestApp::spawn().await?;
    expect_no_upstream_calls(&app).await;

    let methods = [
        Method::GET,
        Method::PUT,
        Method::DELETE,
        Method::PATCH,
        Method::from_bytes(b"PURGE")?,
    ];

    for m in methods {
        let res = app.request_waitlist(m.clone()).await?;

        assert_eq!(
            res.status(),
            StatusCode::METHOD_NOT_ALLOWED,
            "Wrong response StatusCode for method: {m}"
        );
        assert_waitlist_headers(&res);

        let body: Value = res.json().await?;
        assert_eq!(
            body,
            json!({ "error": "Method not allowed", "method": m.as_str() })
        );
    }

    // HEAD responses carry no body, only the status can be checked.
    let res = app.request_waitlist(Method::HEAD).await?;
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);

    Ok(())
}

#[tokio::test]
async fn waitlist_invalid_json_returns_400() -> Result<()> {
    let app = TestApp::spawn().await?;
    expect_no_upstream_calls(&app).await;

    for body in ["invalid-json-string", "{", "", r#"{"email": "a@b.com""#] {
        let res = app.post_waitlist_raw(body).await?;

        assert_eq!(
            res.status(),
            StatusCode::BAD_REQUEST,
            "Wrong response StatusCode for body: {body:?}"
        );
        assert_waitlist_headers(&res);

        let body: Value = res.json().await?;
        assert_eq!(body["error"], "Invalid JSON in request body");
        assert!(body["details"].is_string());
    }

    Ok(())
}

#[tokio::test]
async fn waitlist_missing_email_returns_400() -> Result<()> {
    let app = TestApp::spawn().await?;
    expect_no_upstream_calls(&app).await;

    let cases = [
        (json!({}), "Empty json"),
        (json!({ "email": "" }), "Empty email"),
        (json!({ "email": null }), "Null email"),
        (json!({ "name": "Ursula" }), "Missing email"),
        (json!(["a@b.com"]), "Not an object"),
    ];

    for (body, description) in cases {
        let res = app.post_waitlist(&body).await?;

        assert_eq!(
            res.status(),
            StatusCode::BAD_REQUEST,
            "The API did not return a 400 BAD REQUEST the payload was {description}."
        );

        let body: Value = res.json().await?;
        assert_eq!(body, json!({ "error": "Email is required" }));
    }

    Ok(())
}

#[tokio::test]
async fn waitlist_valid_email_returns_200() -> Result<()> {
    let app = TestApp::spawn().await?;

    Mock::given(path("/emails"))
        .and(method("POST"))
        .and(header("Authorization", "Bearer re_test_key"))
        .and(body_partial_json(json!({
            "from": "NomadCrew <welcome@nomadcrew.uk>",
            "to": "a@b.com",
            "subject": "Welcome to NomadCrew Waitlist!",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "msg_1" })))
        .expect(1)
        .mount(&app.email_server)
        .await;

    Mock::given(path("/rest/v1/waitlist_signups"))
        .and(method("POST"))
        .and(header("apikey", "anon_test_key"))
        .and(body_partial_json(json!({ "email": "a@b.com" })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&app.store_server)
        .await;

    let res = app.post_waitlist(&json!({ "email": "a@b.com" })).await?;

    assert_eq!(res.status(), StatusCode::OK);
    assert_waitlist_headers(&res);
    assert!(res.headers().contains_key("x-request-id"));

    let body: Value = res.json().await?;
    assert_eq!(
        body,
        json!({ "success": true, "message": "Successfully joined waitlist" })
    );

    Ok(())
}

#[tokio::test]
async fn waitlist_accepts_body_without_content_type() -> Result<()> {
    let app = TestApp::spawn().await?;
    mount_email_ok(&app, 1).await;
    mount_store(&app, 201, 1).await;

    let res = app
        .http_client
        .post(app.waitlist_url())
        .body(r#"{"email":"a@b.com"}"#)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn waitlist_provider_failure_returns_500() -> Result<()> {
    let app = TestApp::spawn().await?;
    mount_store(&app, 201, 1).await;

    Mock::given(path("/emails"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({ "statusCode": 403, "message": "API key is invalid" })),
        )
        .expect(1)
        .mount(&app.email_server)
        .await;

    let res = app.post_waitlist(&json!({ "email": "a@b.com" })).await?;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_waitlist_headers(&res);

    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Failed to send confirmation email");
    assert_eq!(body["details"], "API key is invalid");
    assert!(body.get("success").is_none());

    Ok(())
}

#[tokio::test]
async fn waitlist_provider_non_json_success_returns_500() -> Result<()> {
    let app = TestApp::spawn().await?;
    mount_store(&app, 201, 1).await;

    Mock::given(path("/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_string("queued"))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let res = app.post_waitlist(&json!({ "email": "a@b.com" })).await?;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_waitlist_headers(&res);

    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Failed to send confirmation email");
    assert!(body["details"].is_string());

    Ok(())
}

#[tokio::test]
async fn waitlist_whitespace_email_is_passed_to_the_provider() -> Result<()> {
    let app = TestApp::spawn().await?;
    mount_store(&app, 201, 1).await;

    Mock::given(path("/emails"))
        .and(body_partial_json(json!({ "to": "   " })))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({ "message": "Invalid `to` field." })),
        )
        .expect(1)
        .mount(&app.email_server)
        .await;

    let res = app.post_waitlist(&json!({ "email": "   " })).await?;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Failed to send confirmation email");
    assert_eq!(body["details"], "Invalid `to` field.");

    Ok(())
}

#[tokio::test]
async fn waitlist_provider_timeout_returns_500() -> Result<()> {
    let app = TestApp::spawn().await?;
    mount_store(&app, 201, 1).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let res = app.post_waitlist(&json!({ "email": "a@b.com" })).await?;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Failed to send confirmation email");
    assert!(body["details"].is_string());

    Ok(())
}

#[tokio::test]
async fn waitlist_same_email_twice_is_never_a_client_error() -> Result<()> {
    let app = TestApp::spawn().await?;
    let email: String = SafeEmail().fake();

    mount_email_ok(&app, 2).await;
    // The first insert succeeds, every later one is a duplicate.
    Mock::given(path("/rest/v1/waitlist_signups"))
        .respond_with(ResponseTemplate::new(201))
        .up_to_n_times(1)
        .expect(1)
        .mount(&app.store_server)
        .await;
    mount_store(&app, 409, 1).await;

    for _ in 0..2 {
        let res = app.post_waitlist(&json!({ "email": &email })).await?;
        assert_eq!(res.status(), StatusCode::OK);

        let body: Value = res.json().await?;
        assert_eq!(body["success"], true);
    }

    Ok(())
}

#[tokio::test]
async fn waitlist_store_failure_does_not_fail_the_signup() -> Result<()> {
    let app = TestApp::spawn().await?;
    mount_email_ok(&app, 1).await;
    mount_store(&app, 500, 1).await;

    let res = app.post_waitlist(&json!({ "email": "a@b.com" })).await?;

    assert_eq!(res.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn waitlist_unreachable_store_does_not_fail_the_signup() -> Result<()> {
    let app = TestApp::spawn_with(|config| {
        // Nothing listens on port 1.
        config.store_config.url = Some("http://127.0.0.1:1".to_string());
    })
    .await?;
    mount_email_ok(&app, 1).await;

    let res = app.post_waitlist(&json!({ "email": "a@b.com" })).await?;

    assert_eq!(res.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn waitlist_without_store_config_skips_the_insert() -> Result<()> {
    let app = TestApp::spawn_with(|config| {
        config.store_config.api_key = None;
    })
    .await?;
    mount_email_ok(&app, 1).await;
    mount_store(&app, 201, 0).await;

    let res = app.post_waitlist(&json!({ "email": "a@b.com" })).await?;

    assert_eq!(res.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn waitlist_missing_email_credential_returns_500_before_sending() -> Result<()> {
    let app = TestApp::spawn_with(|config| {
        config.email_config.auth_token = None;
    })
    .await?;
    // The store insert still runs first.
    mount_store(&app, 201, 1).await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let res = app.post_waitlist(&json!({ "email": "a@b.com" })).await?;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_waitlist_headers(&res);

    let body: Value = res.json().await?;
    assert_eq!(
        body,
        json!({
            "error": "Server configuration error",
            "details": "Email service not properly configured"
        })
    );

    Ok(())
}

#[tokio::test]
async fn waitlist_sends_operator_notice_when_configured() -> Result<()> {
    let app = TestApp::spawn_with(|config| {
        config.email_config.notify_addr = Some("admin@nomadcrew.uk".to_string());
    })
    .await?;
    mount_store(&app, 201, 1).await;

    Mock::given(path("/emails"))
        .and(body_partial_json(json!({ "to": "a@b.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "msg_1" })))
        .expect(1)
        .mount(&app.email_server)
        .await;

    Mock::given(path("/emails"))
        .and(body_partial_json(json!({
            "to": "admin@nomadcrew.uk",
            "subject": "New NomadCrew Waitlist Signup",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "msg_2" })))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let res = app.post_waitlist(&json!({ "email": "a@b.com" })).await?;

    assert_eq!(res.status(), StatusCode::OK);

    let requests = app.email_server.received_requests().await.unwrap_or_default();
    let notice = requests
        .iter()
        .filter_map(|req| serde_json::from_slice::<Value>(&req.body).ok())
        .find(|body| body["to"] == "admin@nomadcrew.uk");
    let notice_text = notice
        .as_ref()
        .and_then(|body| body["text"].as_str())
        .unwrap_or_default();
    assert!(notice_text.contains("Email: a@b.com"));

    Ok(())
}

#[tokio::test]
async fn waitlist_operator_notice_failure_does_not_fail_the_signup() -> Result<()> {
    let app = TestApp::spawn_with(|config| {
        config.email_config.notify_addr = Some("admin@nomadcrew.uk".to_string());
    })
    .await?;
    mount_store(&app, 201, 1).await;

    Mock::given(path("/emails"))
        .and(body_partial_json(json!({ "to": "a@b.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "msg_1" })))
        .expect(1)
        .mount(&app.email_server)
        .await;

    Mock::given(path("/emails"))
        .and(body_partial_json(json!({ "to": "admin@nomadcrew.uk" })))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let res = app.post_waitlist(&json!({ "email": "a@b.com" })).await?;

    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    assert_eq!(body["success"], true);

    Ok(())
}

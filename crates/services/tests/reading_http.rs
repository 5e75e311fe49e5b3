use serde_json::json;
use services::reading_service::{NOT_CONFIGURED_FEEDBACK, RETRY_FEEDBACK};
use services::{ReadingAttempt, ReadingConfig, ReadingError, ReadingService};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/models/gemini-1.5-flash:generateContent";

fn attempt() -> ReadingAttempt<'static> {
    ReadingAttempt {
        audio_base64: "UklGRg==",
        expected_text: "Con mèo trèo cây cau",
        mime_type: Some("audio/webm"),
    }
}

fn service(server: &MockServer) -> ReadingService {
    ReadingService::new(Some(ReadingConfig {
        base_url: server.uri(),
        api_key: "test-key".into(),
        model: "gemini-1.5-flash".into(),
    }))
}

fn reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [
            { "content": { "parts": [ { "text": text } ] } }
        ]
    })
}

#[tokio::test]
async fn assessment_is_parsed_from_model_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply(
            "```json\n{\"transcription\": \"con mèo trèo cây cau\", \"feedback\": \"Con giỏi quá!\", \"accuracy\": 92}\n```",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let result = service(&server).analyze(&attempt()).await;
    assert_eq!(result.transcription, "con mèo trèo cây cau");
    assert_eq!(result.feedback, "Con giỏi quá!");
    assert_eq!(result.accuracy, 92);
}

#[tokio::test]
async fn upstream_errors_become_retry_feedback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let svc = service(&server);
    assert!(matches!(
        svc.try_analyze(&attempt()).await,
        Err(ReadingError::HttpStatus(status)) if status.as_u16() == 503
    ));

    let result = svc.analyze(&attempt()).await;
    assert_eq!(result.feedback, RETRY_FEEDBACK);
    assert_eq!(result.accuracy, 0);
    assert!(result.transcription.is_empty());
}

#[tokio::test]
async fn non_json_reply_becomes_retry_feedback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("Con đọc hay lắm")))
        .mount(&server)
        .await;

    let result = service(&server).analyze(&attempt()).await;
    assert_eq!(result.feedback, RETRY_FEEDBACK);
    assert_eq!(result.accuracy, 0);
}

#[tokio::test]
async fn empty_candidates_are_an_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    assert!(matches!(
        service(&server).try_analyze(&attempt()).await,
        Err(ReadingError::EmptyResponse)
    ));
}

#[tokio::test]
async fn unconfigured_service_explains_missing_key() {
    let svc = ReadingService::new(None);
    assert!(!svc.enabled());
    let result = svc.analyze(&attempt()).await;
    assert_eq!(result.feedback, NOT_CONFIGURED_FEEDBACK);
}

use condenser_engine::{
    ApiConfig, CompletionClient, CompletionError, CompletionRequest, OpenAiClient,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> OpenAiClient {
    OpenAiClient::new(ApiConfig::new("sk-test").with_base_url(server.uri()))
}

fn request() -> CompletionRequest {
    CompletionRequest {
        system_prompt: "```\nsome transcript\n```".to_string(),
        user_prompt: "tldr;".to_string(),
        assistant_prompt: String::new(),
    }
}

fn chat_response(content: Option<&str>) -> serde_json::Value {
    let message = content.map(|text| json!({"role": "assistant", "content": text}));
    json!({
        "id": "cmpl-abc123",
        "object": "chat.completion",
        "created": 1,
        "model": "gpt-3.5-turbo",
        "choices": [{
            "index": 0,
            "message": message,
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 42, "completion_tokens": 7, "total_tokens": 49}
    })
}

#[tokio::test]
async fn sends_fixed_sampling_configuration_and_bearer_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-3.5-turbo",
            "temperature": 0.7,
            "top_p": 0.9,
            "frequency_penalty": 0.5,
            "presence_penalty": 0.0
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(Some("short"))))
        .expect(1)
        .mount(&server)
        .await;

    let completion = client_for(&server).complete(&request()).await.unwrap();

    assert_eq!(completion.id, "cmpl-abc123");
    assert_eq!(completion.text.as_deref(), Some("short"));
    assert_eq!(completion.finish_reason.as_deref(), Some("stop"));
    assert_eq!(completion.usage.prompt_tokens, 42);
    assert_eq!(completion.usage.total_tokens, 49);
}

#[tokio::test]
async fn sends_system_user_and_assistant_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [
                {"role": "system", "content": "sys"},
                {"role": "user", "content": "usr"},
                {"role": "assistant", "content": "go on"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(Some("ok"))))
        .expect(1)
        .mount(&server)
        .await;

    let request = CompletionRequest {
        system_prompt: "sys".to_string(),
        user_prompt: "usr".to_string(),
        assistant_prompt: "go on".to_string(),
    };
    client_for(&server).complete(&request).await.unwrap();
}

#[tokio::test]
async fn error_status_is_surfaced_with_the_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let err = client_for(&server).complete(&request()).await.unwrap_err();
    assert_eq!(
        err,
        CompletionError::Http {
            status: 429,
            body: "rate limited".to_string()
        }
    );
}

#[tokio::test]
async fn missing_message_comes_back_as_none_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(None)))
        .mount(&server)
        .await;

    let completion = client_for(&server).complete(&request()).await.unwrap();
    assert_eq!(completion.id, "cmpl-abc123");
    assert!(completion.text.is_none());
}

#[tokio::test]
async fn missing_usage_defaults_to_zero() {
    let server = MockServer::start().await;
    let body = json!({
        "id": "cmpl-nousage",
        "object": "chat.completion",
        "created": 1,
        "model": "gpt-3.5-turbo",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": "hi"},
            "finish_reason": "stop"
        }]
    });
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let completion = client_for(&server).complete(&request()).await.unwrap();
    assert_eq!(completion.usage.total_tokens, 0);
}

#[tokio::test]
async fn unparseable_body_is_a_malformed_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client_for(&server).complete(&request()).await.unwrap_err();
    assert!(matches!(err, CompletionError::Malformed(_)));
}

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::trace::TraceLayer;

use super::admin;
use super::health;
use super::state::AppState;
use super::types::ApiError;
use super::v1;

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Prometheus scrape endpoint
        .route("/metrics", get(prometheus_metrics))
        // OpenAI-compatible v1 API
        .nest("/v1", v1::create_v1_router())
        // Admin API
        .nest("/admin", admin::create_admin_router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn prometheus_metrics(State(state): State<AppState>) -> Response {
    match &state.prometheus {
        Some(prometheus) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            prometheus.render(),
        )
            .into_response(),
        None => ApiError::not_found("Metrics exporter is disabled").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::domain::cache::{KvBackend, MockKvBackend};
    use crate::domain::embedding::{MockSemanticProvider, ProviderKind, ProviderRegistry};
    use crate::domain::semantic::{EmbeddingStore, SemanticEngine, ThresholdConfig};
    use crate::domain::DomainError;
    use crate::infrastructure::cache::{InMemoryBackend, KvEmbeddingStore, ResponseCache};
    use crate::infrastructure::observability::CacheMetrics;
    use crate::infrastructure::services::PromptCacheService;
    use crate::infrastructure::upstream::UpstreamClient;

    const UNUSED_UPSTREAM: &str = "http://127.0.0.1:9";

    type EmbedFn = fn(&str) -> Result<Vec<f32>, DomainError>;

    /// Anything mentioning rust lands on one axis, everything else on the other
    fn topic_embedding(text: &str) -> Result<Vec<f32>, DomainError> {
        if text.to_lowercase().contains("rust") {
            Ok(vec![1.0, 0.0])
        } else {
            Ok(vec![0.0, 1.0])
        }
    }

    fn failing_embedding(_: &str) -> Result<Vec<f32>, DomainError> {
        Err(DomainError::provider("openai", "unreachable"))
    }

    fn provider(kind: ProviderKind, embed: EmbedFn) -> Arc<MockSemanticProvider> {
        let mut provider = MockSemanticProvider::new();
        provider.expect_kind().return_const(kind);
        provider.expect_embed().returning(move |text: &str| embed(text));
        Arc::new(provider)
    }

    fn test_state(upstream_url: &str, embed: EmbedFn, backend: Arc<dyn KvBackend>) -> AppState {
        let embeddings = KvEmbeddingStore::new(backend.clone());
        let store: Arc<dyn EmbeddingStore> = Arc::new(embeddings.clone());
        let registry = ProviderRegistry::new()
            .with_provider(ProviderKind::OpenAi, provider(ProviderKind::OpenAi, embed))
            .with_provider(ProviderKind::Mistral, provider(ProviderKind::Mistral, embed));
        let engine = Arc::new(
            SemanticEngine::new(registry, "openai", store.clone(), ThresholdConfig::default())
                .unwrap(),
        );
        let metrics = Arc::new(CacheMetrics::new(store));
        let responses = ResponseCache::new(backend.clone()).with_metrics(metrics.clone());
        let service = Arc::new(PromptCacheService::new(engine, responses, embeddings, metrics));
        let upstream = Arc::new(UpstreamClient::with_client(
            reqwest::Client::new(),
            upstream_url,
            "",
        ));

        AppState::new(service, upstream, backend)
    }

    fn app(upstream_url: &str) -> Router {
        create_router_with_state(test_state(
            upstream_url,
            topic_embedding,
            Arc::new(InMemoryBackend::new()),
        ))
    }

    fn chat_request(prompt: &str) -> Request<Body> {
        let body = json!({
            "model": "gpt-4o-mini",
            "messages": [{"role": "user", "content": prompt}]
        });

        Request::builder()
            .method("POST")
            .uri("/v1/chat/completions")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn put_provider(name: &str) -> Request<Body> {
        Request::builder()
            .method("PUT")
            .uri("/admin/provider")
            .header("content-type", "application/json")
            .body(Body::from(json!({ "provider": name }).to_string()))
            .unwrap()
    }

    fn cache_status(response: &Response) -> &str {
        response
            .headers()
            .get("x-prompt-cache")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn upstream_answering(status: u16, body: Value, expected_calls: u64) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .expect(expected_calls)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_health_and_live() {
        let app = app(UNUSED_UPSTREAM);

        let response = app.clone().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "healthy");

        let response = app.oneshot(get("/live")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ready_reports_provider_and_storage() {
        let response = app(UNUSED_UPSTREAM).oneshot(get("/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["provider"], "openai");
        assert_eq!(body["checks"][0]["name"], "storage");
        assert_eq!(body["checks"][0]["status"], "healthy");
    }

    #[tokio::test]
    async fn test_ready_unavailable_when_backend_fails() {
        let backend = Arc::new(MockKvBackend::new().with_error("connection refused"));
        let app = create_router_with_state(test_state(UNUSED_UPSTREAM, topic_embedding, backend));

        let response = app.oneshot(get("/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["status"], "unhealthy");
    }

    #[tokio::test]
    async fn test_chat_without_user_prompt_is_rejected() {
        let app = app(UNUSED_UPSTREAM);
        let request = Request::builder()
            .method("POST")
            .uri("/v1/chat/completions")
            .body(Body::from(
                json!({"messages": [{"role": "system", "content": "hi"}]}).to_string(),
            ))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"]["message"],
            "No user prompt found"
        );
    }

    #[tokio::test]
    async fn test_chat_with_image_only_last_turn_is_rejected() {
        let body = json!({
            "messages": [
                {"role": "user", "content": "What is Rust?"},
                {"role": "assistant", "content": "A language"},
                {"role": "user", "content": [
                    {"type": "image_url", "image_url": {"url": "https://example.com/a.png"}}
                ]}
            ]
        });
        let request = Request::builder()
            .method("POST")
            .uri("/v1/chat/completions")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app(UNUSED_UPSTREAM).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_chat_with_invalid_json_is_rejected() {
        let request = Request::builder()
            .method("POST")
            .uri("/v1/chat/completions")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app(UNUSED_UPSTREAM).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_miss_is_forwarded_then_similar_prompt_hits() {
        let completion = json!({"id": "chatcmpl-1", "choices": [{"message": {"content": "A language"}}]});
        let server = upstream_answering(200, completion.clone(), 1).await;
        let app = app(&server.uri());

        let response = app.clone().oneshot(chat_request("What is Rust?")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(cache_status(&response), "miss");
        assert_eq!(body_json(response).await, completion);

        let response = app
            .clone()
            .oneshot(chat_request("Tell me about the Rust language"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(cache_status(&response), "hit");
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );
        assert_eq!(body_json(response).await, completion);

        let metrics = body_json(app.oneshot(get("/admin/metrics")).await.unwrap()).await;
        assert_eq!(metrics["cache_hits"], 1);
        assert_eq!(metrics["cache_misses"], 1);
        assert_eq!(metrics["stored_vectors_count"], 1);
        assert_eq!(metrics["hit_rate"], 0.5);
    }

    #[tokio::test]
    async fn test_unrelated_prompt_is_forwarded() {
        let server = upstream_answering(200, json!({"id": "chatcmpl-2"}), 2).await;
        let app = app(&server.uri());

        let first = app.clone().oneshot(chat_request("What is Rust?")).await.unwrap();
        assert_eq!(cache_status(&first), "miss");

        let second = app.oneshot(chat_request("Will it rain today?")).await.unwrap();
        assert_eq!(cache_status(&second), "miss");
    }

    #[tokio::test]
    async fn test_upstream_error_is_relayed_and_not_cached() {
        let error = json!({"error": {"message": "rate limited"}});
        let server = upstream_answering(429, error.clone(), 2).await;
        let app = app(&server.uri());

        for _ in 0..2 {
            let response = app.clone().oneshot(chat_request("What is Rust?")).await.unwrap();
            assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
            assert_eq!(cache_status(&response), "miss");
            assert_eq!(body_json(response).await, error);
        }
    }

    #[tokio::test]
    async fn test_engine_failure_falls_back_to_upstream() {
        let server = upstream_answering(200, json!({"id": "chatcmpl-3"}), 1).await;
        let app = create_router_with_state(test_state(
            &server.uri(),
            failing_embedding,
            Arc::new(InMemoryBackend::new()),
        ));

        let response = app.oneshot(chat_request("What is Rust?")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(cache_status(&response), "miss");
        assert_eq!(body_json(response).await["id"], "chatcmpl-3");
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_bad_gateway() {
        let response = app("http://127.0.0.1:1")
            .oneshot(chat_request("What is Rust?"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_provider_get_and_swap() {
        let app = app(UNUSED_UPSTREAM);

        let body = body_json(app.clone().oneshot(get("/admin/provider")).await.unwrap()).await;
        assert_eq!(body["provider"], "openai");
        assert_eq!(body["available"], json!(["openai", "mistral"]));

        let response = app.clone().oneshot(put_provider("mistral")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["provider"], "mistral");

        let body = body_json(app.oneshot(get("/admin/provider")).await.unwrap()).await;
        assert_eq!(body["provider"], "mistral");
    }

    #[tokio::test]
    async fn test_unknown_provider_is_rejected_and_current_kept() {
        let app = app(UNUSED_UPSTREAM);

        let response = app.clone().oneshot(put_provider("cohere")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["param"], "provider");

        let response = app.clone().oneshot(put_provider("claude")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(app.oneshot(get("/admin/provider")).await.unwrap()).await;
        assert_eq!(body["provider"], "openai");
    }

    #[tokio::test]
    async fn test_prometheus_endpoint_disabled() {
        let response = app(UNUSED_UPSTREAM).oneshot(get("/metrics")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

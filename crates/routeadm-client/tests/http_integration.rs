use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use routeadm_api::models::{Egress, Route};
use routeadm_api::{BatchDeleteReport, QueryParams, ResourceId, StandardResult};
use routeadm_client::{
    ClientConfig, EgressFilter, EgressService, HttpClient, MemoryStore, RestResource,
    SessionStore, SignInRedirect,
};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct CountingRedirect(AtomicUsize);

impl SignInRedirect for CountingRedirect {
    fn redirect(&self, _sign_in_path: &str) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

fn client_for(server: &MockServer, store: Arc<MemoryStore>) -> HttpClient {
    let config = ClientConfig::new(server.uri()).unwrap();
    HttpClient::new(config, store)
}

#[tokio::test]
async fn get_status_wrapped_list() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/routes"))
        .and(query_param("page", "2"))
        .and(query_param("pageSize", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": {"success": true, "message": "ok"},
            "data": [{"id": 21, "pattern": "*.example.com", "egress": "hk-1"}],
            "pagination": {"page": 2, "pageSize": 20, "total": 35, "totalPages": 2}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, Arc::new(MemoryStore::new()));
    let routes: RestResource<Route> = RestResource::new(client, "routes");
    let result = routes.list(&QueryParams::new().with_paging(2, 20)).await;

    assert!(result.success);
    assert_eq!(result.data.as_ref().map(Vec::len), Some(1));
    let pagination = result.pagination.unwrap();
    assert_eq!(pagination.current(), 2);
    assert_eq!(pagination.total_pages(), 2);
    assert_eq!(result.total, Some(35));
}

#[tokio::test]
async fn bearer_credential_is_injected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/routes"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": []})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryStore::new());
    store.set("token", "secret-token").unwrap();
    let client = client_for(&mock_server, store);

    let result: StandardResult<Vec<Route>> = client.get("/v1/routes", &QueryParams::new()).await;
    assert!(result.success);
}

#[tokio::test]
async fn auth_endpoints_carry_no_credential() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": {"success": true},
            "data": {"token": "new"}
        })))
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryStore::new());
    store.set("token", "stale").unwrap();
    let client = client_for(&mock_server, store);

    let result: StandardResult<Value> = client
        .post("/v1/auth/login", &json!({"username": "ops", "password": "pw"}))
        .await;
    assert!(result.success);

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn unauthorized_clears_session_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/routes"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status": {"success": false, "message": "token expired", "errorCode": "TOKEN_EXPIRED"}
        })))
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryStore::new());
    store.set("token", "abc").unwrap();
    store.set("user", "{}").unwrap();
    store.set("oidc_nonce", "n").unwrap();
    store.set("language", "en").unwrap();

    let redirect = Arc::new(CountingRedirect::default());
    let client = HttpClient::with_redirect(
        ClientConfig::new(mock_server.uri()).unwrap(),
        store.clone(),
        redirect.clone(),
    );

    let first: StandardResult<Vec<Route>> = client.get("/v1/routes", &QueryParams::new()).await;
    assert!(!first.success);
    assert_eq!(first.error_code.as_deref(), Some("UNAUTHORIZED"));
    assert_eq!(first.message.as_deref(), Some("token expired"));
    assert_eq!(store.keys(), vec!["language".to_string()]);

    let second: StandardResult<Vec<Route>> = client.get("/v1/routes", &QueryParams::new()).await;
    assert_eq!(second.error_code.as_deref(), Some("UNAUTHORIZED"));
    assert_eq!(redirect.0.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unauthorized_without_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/routes/3"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, Arc::new(MemoryStore::new()));
    let result: StandardResult<Value> = client.delete("/v1/routes/3").await;
    assert_eq!(result.error_code.as_deref(), Some("UNAUTHORIZED"));
    assert!(result.message.is_some());
}

#[tokio::test]
async fn server_error_with_plain_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/routes"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, Arc::new(MemoryStore::new()));
    let result: StandardResult<Vec<Route>> = client.get("/v1/routes", &QueryParams::new()).await;

    assert!(!result.success);
    assert_eq!(result.error_code.as_deref(), Some("HTTP_500"));
    assert_eq!(
        result.message.as_deref(),
        Some("HTTP 500: Internal Server Error")
    );
}

#[tokio::test]
async fn business_failure_keeps_backend_code() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/routes"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "success": false,
            "message": "pattern already routed",
            "errorCode": "ROUTE_CONFLICT"
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, Arc::new(MemoryStore::new()));
    let routes: RestResource<Route> = RestResource::new(client, "routes");
    let result = routes.create(&Route::new("*.example.com", "hk-1")).await;

    assert!(!result.success);
    assert!(result.data.is_none());
    assert_eq!(result.error_code.as_deref(), Some("ROUTE_CONFLICT"));
    assert_eq!(result.message.as_deref(), Some("pattern already routed"));
}

#[tokio::test]
async fn error_status_without_code_gets_http_code() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v1/routes/9"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({"success": false, "message": "priority out of range"})),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, Arc::new(MemoryStore::new()));
    let routes: RestResource<Route> = RestResource::new(client, "routes");
    let result = routes
        .update(&ResourceId::from(9_i64), &Route::new("a.com", "x").with_priority(900))
        .await;

    assert_eq!(result.error_code.as_deref(), Some("HTTP_422"));
    assert_eq!(result.message.as_deref(), Some("priority out of range"));
}

#[tokio::test]
async fn timeout_is_network_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/routes"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "data": []}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let config = ClientConfig::new(mock_server.uri())
        .unwrap()
        .with_timeout(Duration::from_millis(200));
    let client = HttpClient::new(config, Arc::new(MemoryStore::new()));

    let started = Instant::now();
    let result: StandardResult<Vec<Route>> = client.get("/v1/routes", &QueryParams::new()).await;

    assert!(!result.success);
    assert_eq!(result.error_code.as_deref(), Some("NETWORK_ERROR"));
    assert!(started.elapsed() < Duration::from_millis(1500));
}

#[tokio::test]
async fn connection_refused_is_network_error() {
    let config = ClientConfig::new("http://127.0.0.1:9").unwrap();
    let client = HttpClient::new(config, Arc::new(MemoryStore::new()));

    let result: StandardResult<Vec<Route>> = client.get("/v1/routes", &QueryParams::new()).await;
    assert!(!result.success);
    assert_eq!(result.error_code.as_deref(), Some("NETWORK_ERROR"));
}

#[tokio::test]
async fn no_content_delete_succeeds() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/routes/4"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, Arc::new(MemoryStore::new()));
    let routes: RestResource<Route> = RestResource::new(client, "routes");
    let result = routes.delete(&ResourceId::from(4_i64)).await;
    assert!(result.success);
}

#[tokio::test]
async fn batch_delete_posts_ids() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/routes/batch-delete"))
        .and(body_json(json!({"ids": [1, 2, 3]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": {"success": true},
            "data": {"successCount": 3, "failureCount": 0}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, Arc::new(MemoryStore::new()));
    let routes: RestResource<Route> = RestResource::new(client, "routes");
    let ids: Vec<ResourceId> = (1..=3_i64).map(ResourceId::from).collect();
    let result = routes.batch_delete(&ids).await;

    assert!(result.success);
    assert_eq!(
        result.data,
        Some(BatchDeleteReport {
            success_count: Some(3),
            failure_count: Some(0),
            failures: vec![],
        })
    );
}

#[tokio::test]
async fn egress_list_uses_legacy_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/egress"))
        .and(query_param("pageNo", "3"))
        .and(query_param("size", "5"))
        .and(query_param("keyword", "tokyo"))
        .and(query_param("region", "ap"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": {"success": true},
            "data": {"items": [{"id": 1, "name": "tokyo-1", "address": "10.1.0.1:1080"}], "total": 11}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, Arc::new(MemoryStore::new()));
    let service = EgressService::new(client);
    let filter = EgressFilter {
        page_no: 3,
        size: 5,
        keyword: Some("tokyo".into()),
        extra: QueryParams::new().with("region", "ap"),
        ..Default::default()
    };
    let result = service.get_egress_list(&filter).await;

    assert!(result.success);
    let page = result.data.unwrap();
    assert_eq!(page.total, 11);
    assert_eq!(page.items[0], {
        let mut egress = Egress::new("tokyo-1", "10.1.0.1:1080");
        egress.id = Some(ResourceId::from(1_i64));
        egress
    });
}

#[tokio::test]
async fn base_url_update_redirects_traffic() {
    let old_server = MockServer::start().await;
    let new_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/routes"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": []})),
        )
        .expect(1)
        .mount(&new_server)
        .await;

    let client = client_for(&old_server, Arc::new(MemoryStore::new()));
    client.update_base_url(new_server.uri()).unwrap();

    let result: StandardResult<Vec<Route>> = client.get("/v1/routes", &QueryParams::new()).await;
    assert!(result.success);
    assert!(old_server.received_requests().await.unwrap().is_empty());
}

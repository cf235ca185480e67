use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use marquee::app::{build_router, cors_layer, AppState};
use marquee::tmdb::{ProxyError, TmdbApi};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt;

type Call = (String, Vec<(String, String)>);

#[derive(Default)]
struct FakeTmdb {
    responses: HashMap<String, Value>,
    failures: HashMap<String, (u16, String)>,
    missing_key: bool,
    calls: Mutex<Vec<Call>>,
}

impl FakeTmdb {
    fn respond(mut self, key: &str, body: Value) -> Self {
        self.responses.insert(key.to_string(), body);
        self
    }

    fn fail(mut self, key: &str, status: u16, body: &str) -> Self {
        self.failures
            .insert(key.to_string(), (status, body.to_string()));
        self
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

/// Discover calls are told apart by genre so both can be scripted.
fn route_key(path: &str, params: &[(&str, &str)]) -> String {
    match params.iter().find(|(k, _)| *k == "with_genres") {
        Some((_, genre)) => format!("{path}?with_genres={genre}"),
        None => path.to_string(),
    }
}

#[async_trait::async_trait]
impl TmdbApi for FakeTmdb {
    async fn call(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, ProxyError> {
        self.calls.lock().unwrap().push((
            path.to_string(),
            params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ));
        if self.missing_key {
            return Err(ProxyError::Config);
        }
        let key = route_key(path, params);
        if let Some((status, body)) = self.failures.get(&key) {
            return Err(ProxyError::Upstream {
                status: *status,
                body: body.clone(),
            });
        }
        Ok(self
            .responses
            .get(&key)
            .cloned()
            .unwrap_or_else(|| json!({ "results": [] })))
    }
}

fn app(fake: Arc<FakeTmdb>) -> Router {
    build_router(AppState { tmdb: fake })
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let res = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn movies(ids: &[i64]) -> Value {
    json!({
        "page": 1,
        "results": ids.iter().map(|id| json!({ "id": id, "title": format!("Movie {id}") })).collect::<Vec<_>>()
    })
}

#[tokio::test]
async fn health_reports_ok() {
    let (status, body) = get(app(Arc::new(FakeTmdb::default())), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));
}

#[tokio::test]
async fn home_returns_four_named_rows() {
    let fake = Arc::new(
        FakeTmdb::default()
            .respond("/trending/movie/week", movies(&[1, 2]))
            .respond("/movie/top_rated", movies(&[3]))
            .respond("/discover/movie?with_genres=28", movies(&[4]))
            .respond("/discover/movie?with_genres=35", json!({ "page": 1 })),
    );
    let (status, body) = get(app(fake.clone()), "/api/home").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["trending"].as_array().unwrap().len(), 2);
    assert_eq!(body["topRated"][0]["id"], 3);
    assert_eq!(body["action"][0]["title"], "Movie 4");
    assert_eq!(body["comedy"], json!([]));
    assert_eq!(fake.call_count(), 4);

    let calls = fake.calls.lock().unwrap();
    let discover: Vec<&Call> = calls.iter().filter(|(p, _)| p == "/discover/movie").collect();
    assert_eq!(discover.len(), 2);
    for (_, params) in discover {
        assert!(params.contains(&("sort_by".to_string(), "popularity.desc".to_string())));
    }
}

#[tokio::test]
async fn home_fails_whole_when_one_call_fails() {
    let fake = Arc::new(
        FakeTmdb::default()
            .respond("/trending/movie/week", movies(&[1]))
            .respond("/movie/top_rated", movies(&[2]))
            .respond("/discover/movie?with_genres=28", movies(&[3]))
            .fail("/discover/movie?with_genres=35", 503, "upstream down"),
    );
    let (status, body) = get(app(fake), "/api/home").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to load home");
    assert_eq!(body["detail"], "TMDB error 503: upstream down");
    let keys: Vec<&String> = body.as_object().unwrap().keys().collect();
    assert_eq!(keys.len(), 2);
    assert!(body.get("trending").is_none());
}

#[tokio::test]
async fn home_without_credential_reports_config_error() {
    let fake = Arc::new(FakeTmdb {
        missing_key: true,
        ..FakeTmdb::default()
    });
    let (status, body) = get(app(fake), "/api/home").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to load home");
    assert_eq!(body["detail"], "TMDB_API_KEY is not configured");
}

#[tokio::test]
async fn blank_search_skips_provider() {
    let fake = Arc::new(FakeTmdb::default());
    for uri in ["/api/search?q=", "/api/search?q=%20%20%20", "/api/search"] {
        let (status, body) = get(app(fake.clone()), uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "results": [] }));
    }
    assert_eq!(fake.call_count(), 0);
}

#[tokio::test]
async fn search_trims_query_and_disables_adult_results() {
    let fake = Arc::new(FakeTmdb::default().respond("/search/movie", movies(&[42])));
    let (status, body) = get(app(fake.clone()), "/api/search?q=%20alien%20").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["id"], 42);
    let calls = fake.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (path, params) = &calls[0];
    assert_eq!(path, "/search/movie");
    assert_eq!(
        params,
        &vec![
            ("query".to_string(), "alien".to_string()),
            ("include_adult".to_string(), "false".to_string()),
        ]
    );
}

#[tokio::test]
async fn search_failure_maps_to_500() {
    let fake = Arc::new(FakeTmdb::default().fail("/search/movie", 401, "bad key"));
    let (status, body) = get(app(fake), "/api/search?q=alien").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "error": "Search failed", "detail": "TMDB error 401: bad key" })
    );
}

#[tokio::test]
async fn movie_detail_is_passed_through() {
    let detail = json!({ "id": 550, "title": "Fight Club", "runtime": 139 });
    let fake = Arc::new(FakeTmdb::default().respond("/movie/550", detail.clone()));
    let (status, body) = get(app(fake), "/api/movie/550").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, detail);
}

#[tokio::test]
async fn malformed_movie_id_surfaces_provider_error() {
    let fake = Arc::new(FakeTmdb::default().fail(
        "/movie/not-a-number",
        404,
        "{\"status_message\":\"The resource you requested could not be found.\"}",
    ));
    let (status, body) = get(app(fake), "/api/movie/not-a-number").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Movie failed");
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("could not be found"));
}

#[tokio::test]
async fn trailer_route_applies_selector() {
    let videos = json!({
        "id": 550,
        "results": [
            { "site": "Vimeo", "type": "Trailer", "official": true, "key": "vimeo" },
            { "site": "YouTube", "type": "Trailer", "official": false, "key": "fan" },
            { "site": "YouTube", "type": "Trailer", "official": true, "key": "studio" }
        ]
    });
    let fake = Arc::new(FakeTmdb::default().respond("/movie/550/videos", videos));
    let (status, body) = get(app(fake), "/api/movie/550/trailer").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "key": "studio" }));
}

#[tokio::test]
async fn trailer_key_is_null_without_youtube_videos() {
    let fake = Arc::new(FakeTmdb::default().respond("/movie/7/videos", json!({ "results": [] })));
    let (status, body) = get(app(fake), "/api/movie/7/trailer").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "key": null }));
}

#[tokio::test]
async fn trailer_failure_maps_to_500() {
    let fake = Arc::new(FakeTmdb::default().fail("/movie/7/videos", 500, "boom"));
    let (status, body) = get(app(fake), "/api/movie/7/trailer").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Trailer failed");
}

#[tokio::test]
async fn gateway_keeps_serving_after_a_failure() {
    let fake = Arc::new(
        FakeTmdb::default()
            .fail("/search/movie", 500, "boom")
            .respond("/movie/1", json!({ "id": 1 })),
    );
    let (status, _) = get(app(fake.clone()), "/api/search?q=x").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let (status, body) = get(app(fake), "/api/movie/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);
}

#[tokio::test]
async fn cors_allows_only_the_configured_origin() {
    let router = app(Arc::new(FakeTmdb::default()))
        .layer(cors_layer("http://localhost:5173").unwrap());

    let allowed = router
        .clone()
        .oneshot(
            Request::get("/api/health")
                .header("origin", "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        allowed
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:5173")
    );

    let other = router
        .oneshot(
            Request::get("/api/health")
                .header("origin", "https://elsewhere.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(other.headers().get("access-control-allow-origin").is_none());
}

#[test]
fn cors_rejects_unusable_origin() {
    assert!(cors_layer("http://bad\norigin").is_err());
}

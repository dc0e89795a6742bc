//! Cache Module Tests
//!
//! ## Test Scopes
//! - **Codec**: The cached value format and its failure modes.
//! - **MemoryCache**: Round-trips, expiry and the entry bound.
//! - **Gateway**: Key derivation and error absorption.
//! - **RemoteCache**: The HTTP protocol, exercised against an in-process key-value stub.
//! - **RedisCache**: Round-trip against a live server (`REDIS_URL`), ignored by default.

#[cfg(test)]
mod tests {
    use crate::cache::redis_cache::{DEFAULT_CONNECT_TIMEOUT, RedisCache};
    use crate::cache::remote::{DEFAULT_REQUEST_TIMEOUT, request_timeout_within};
    use crate::cache::{ResultCache, ttl_whole_secs};
    use crate::cache::gateway::{
        CacheGateway, CacheSettings, DEFAULT_KEY_PREFIX, decode_results, encode_results,
    };
    use crate::cache::memory::MemoryCache;
    use crate::cache::protocol::{GetResponse, PutRequest, PutResponse};
    use crate::cache::remote::RemoteCache;
    use crate::search::types::SearchHit;
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use dashmap::DashMap;
    use std::sync::Arc;
    use std::time::Duration;

    fn hit(url: &str, title: &str) -> SearchHit {
        SearchHit {
            url: url.to_string(),
            title: title.to_string(),
            description: format!("About {}", title),
            topics: vec!["rust".to_string(), "web".to_string()],
        }
    }

    // ============================================================
    // CODEC TESTS
    // ============================================================

    #[test]
    fn test_encode_results_shape() {
        let raw = encode_results(&[hit("/blog/a", "A")]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(value["results"][0]["url"], "/blog/a");
        assert_eq!(value["results"][0]["title"], "A");
        assert_eq!(value["results"][0]["topics"][1], "web");
    }

    #[test]
    fn test_decode_results_preserves_order() {
        let hits = vec![hit("/b", "B"), hit("/a", "A"), hit("/c", "C")];

        let decoded = decode_results(&encode_results(&hits).unwrap()).unwrap();
        assert_eq!(decoded, hits);
    }

    #[test]
    fn test_encode_empty_results() {
        let raw = encode_results(&[]).unwrap();

        assert_eq!(raw, r#"{"results":[]}"#);
        assert!(decode_results(&raw).unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_foreign_values() {
        assert!(decode_results("not json").is_err());
        assert!(decode_results(r#"[{"url":"/a"}]"#).is_err());
        assert!(decode_results(r#"{"results":"oops"}"#).is_err());
    }

    // ============================================================
    // MEMORY CACHE TESTS
    // ============================================================

    #[tokio::test]
    async fn test_memory_set_then_get() {
        let cache = MemoryCache::new();

        cache.set("k", "v".to_string(), Duration::from_secs(60)).await.unwrap();

        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(cache.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_overwrite() {
        let cache = MemoryCache::new();

        cache.set("k", "one".to_string(), Duration::from_secs(60)).await.unwrap();
        cache.set("k", "two".to_string(), Duration::from_secs(60)).await.unwrap();

        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("two"));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_memory_entry_expires() {
        let cache = MemoryCache::new();

        cache.set("k", "v".to_string(), Duration::from_millis(20)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(cache.is_empty(), "expired entry is removed on read");
    }

    #[tokio::test]
    async fn test_memory_zero_ttl_is_never_served() {
        let cache = MemoryCache::new();

        cache.set("k", "v".to_string(), Duration::ZERO).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_purge_expired() {
        let cache = MemoryCache::new();

        cache.set("short", "v".to_string(), Duration::from_millis(10)).await.unwrap();
        cache.set("long", "v".to_string(), Duration::from_secs(60)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_memory_bounded() {
        let cache = MemoryCache::with_capacity(3);

        for i in 0..10 {
            cache
                .set(&format!("k{}", i), "v".to_string(), Duration::from_secs(60))
                .await
                .unwrap();
            assert!(cache.len() <= 3);
        }

        assert_eq!(cache.get("k9").await.unwrap().as_deref(), Some("v"));
    }

    // ============================================================
    // GATEWAY TESTS
    // ============================================================

    #[test]
    fn test_gateway_key_derivation() {
        let gateway = CacheGateway::new(Arc::new(MemoryCache::new()), CacheSettings::default());

        assert_eq!(gateway.key_for("World"), format!("{}World", DEFAULT_KEY_PREFIX));
        assert_eq!(gateway.key_for(" World "), "search: World ");
        assert_ne!(gateway.key_for("World"), gateway.key_for("world"));
    }

    #[test]
    fn test_gateway_custom_prefix() {
        let settings = CacheSettings {
            key_prefix: "blog:v2:".to_string(),
            ..CacheSettings::default()
        };
        let gateway = CacheGateway::new(Arc::new(MemoryCache::new()), settings);

        assert_eq!(gateway.key_for("rust"), "blog:v2:rust");
    }

    #[tokio::test]
    async fn test_gateway_round_trip() {
        let gateway = CacheGateway::new(Arc::new(MemoryCache::new()), CacheSettings::default());
        let hits = vec![hit("/a", "A"), hit("/b", "B")];

        assert_eq!(gateway.lookup("q").await, None);
        assert!(gateway.populate("q", &hits).await);
        assert_eq!(gateway.lookup("q").await, Some(hits));
    }

    #[tokio::test]
    async fn test_gateway_unreadable_entry_is_miss() {
        let backend = Arc::new(MemoryCache::new());
        backend
            .set("search:q", "{\"results\": 42}".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        let gateway = CacheGateway::new(backend, CacheSettings::default());

        assert_eq!(gateway.lookup("q").await, None);
    }

    #[tokio::test]
    async fn test_gateway_applies_ttl() {
        let settings = CacheSettings {
            ttl: Duration::from_millis(20),
            ..CacheSettings::default()
        };
        let gateway = CacheGateway::new(Arc::new(MemoryCache::new()), settings);

        assert!(gateway.populate("q", &[hit("/a", "A")]).await);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(gateway.lookup("q").await, None);
    }

    #[test]
    fn test_ttl_whole_secs_rounds_up() {
        assert_eq!(ttl_whole_secs(Duration::from_secs(3600)), 3600);
        assert_eq!(ttl_whole_secs(Duration::from_millis(1500)), 2);
        assert_eq!(ttl_whole_secs(Duration::from_millis(300)), 1);
        assert_eq!(ttl_whole_secs(Duration::from_nanos(1)), 1);
        assert_eq!(ttl_whole_secs(Duration::ZERO), 1);
    }

    // ============================================================
    // REMOTE CACHE TESTS
    // ============================================================

    type Store = Arc<DashMap<String, String>>;

    async fn stub_get(
        State(store): State<Store>,
        Path(key): Path<String>,
    ) -> (StatusCode, Json<GetResponse>) {
        match store.get(&key) {
            Some(value) => (
                StatusCode::OK,
                Json(GetResponse {
                    value_json: Some(value.clone()),
                }),
            ),
            None => (StatusCode::NOT_FOUND, Json(GetResponse { value_json: None })),
        }
    }

    async fn stub_put(
        State(store): State<Store>,
        Json(req): Json<PutRequest>,
    ) -> (StatusCode, Json<PutResponse>) {
        assert!(!req.op_id.is_empty());
        assert_eq!(req.ttl_secs, 3600);
        store.insert(req.key, req.value_json);
        (StatusCode::OK, Json(PutResponse { success: true }))
    }

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn spawn_kv_stub() -> (String, Store) {
        let store: Store = Arc::new(DashMap::new());
        let router = Router::new()
            .route("/get/:key", get(stub_get))
            .route("/put", post(stub_put))
            .with_state(store.clone());
        (spawn_stub(router).await, store)
    }

    async fn spawn_ttl_recording_stub() -> (String, Arc<DashMap<String, u64>>) {
        let ttls: Arc<DashMap<String, u64>> = Arc::new(DashMap::new());
        let router = Router::new()
            .route(
                "/put",
                post(
                    |State(ttls): State<Arc<DashMap<String, u64>>>,
                     Json(req): Json<PutRequest>| async move {
                        ttls.insert(req.key, req.ttl_secs);
                        Json(PutResponse { success: true })
                    },
                ),
            )
            .with_state(ttls.clone());
        (spawn_stub(router).await, ttls)
    }

    async fn spawn_failing_stub() -> String {
        let router = Router::new()
            .route("/get/:key", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
            .route("/put", post(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
        spawn_stub(router).await
    }

    #[test]
    fn test_remote_rejects_bad_urls() {
        assert!(RemoteCache::new("not a url", Duration::from_millis(100)).is_err());
        assert!(RemoteCache::new("redis://localhost:6379", Duration::from_millis(100)).is_err());
        assert!(RemoteCache::new("http://localhost:6379", Duration::from_millis(100)).is_ok());
    }

    #[tokio::test]
    async fn test_remote_round_trip() {
        let (base, store) = spawn_kv_stub().await;
        let cache = RemoteCache::new(&base, Duration::from_millis(500)).unwrap();

        assert_eq!(cache.get("search:World").await.unwrap(), None);

        cache
            .set("search:World", "payload".to_string(), Duration::from_secs(3600))
            .await
            .unwrap();

        assert_eq!(store.get("search:World").map(|v| v.clone()).as_deref(), Some("payload"));
        assert_eq!(cache.get("search:World").await.unwrap().as_deref(), Some("payload"));
    }

    #[tokio::test]
    async fn test_remote_sub_second_ttl_is_never_zero() {
        let (base, ttls) = spawn_ttl_recording_stub().await;
        let cache = RemoteCache::new(&base, Duration::from_millis(500)).unwrap();

        cache
            .set("short", "v".to_string(), Duration::from_millis(400))
            .await
            .unwrap();
        cache
            .set("longer", "v".to_string(), Duration::from_millis(2100))
            .await
            .unwrap();

        assert_eq!(ttls.get("short").map(|t| *t), Some(1));
        assert_eq!(ttls.get("longer").map(|t| *t), Some(3));
    }

    #[test]
    fn test_request_timeout_leaves_room_for_retry() {
        let budget = Duration::from_millis(250);
        let per_request = request_timeout_within(budget);

        assert!(per_request > Duration::ZERO);
        // Two attempts plus the worst-case first backoff (25ms + <25ms jitter).
        assert!(per_request * 2 + Duration::from_millis(50) <= budget);
        assert_eq!(request_timeout_within(Duration::from_secs(10)), DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(request_timeout_within(Duration::from_millis(10)), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_remote_encodes_awkward_keys() {
        let (base, _store) = spawn_kv_stub().await;
        let cache = RemoteCache::new(&base, Duration::from_millis(500)).unwrap();
        let key = "search:what is a/b? #1 100%";

        cache
            .set(key, "v".to_string(), Duration::from_secs(3600))
            .await
            .unwrap();

        assert_eq!(cache.get(key).await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_remote_ping() {
        let (base, _store) = spawn_kv_stub().await;
        let cache = RemoteCache::new(&base, Duration::from_millis(500)).unwrap();
        assert!(cache.ping().await.is_ok());

        let failing_url = spawn_failing_stub().await;
        let failing = RemoteCache::new(&failing_url, Duration::from_millis(500)).unwrap();
        assert!(failing.ping().await.is_err());
    }

    #[tokio::test]
    async fn test_remote_server_errors_surface_as_errors() {
        let failing_url = spawn_failing_stub().await;
        let cache = RemoteCache::new(&failing_url, Duration::from_millis(500)).unwrap();

        assert!(cache.get("k").await.is_err());
        assert!(cache.set("k", "v".to_string(), Duration::from_secs(1)).await.is_err());
    }

    #[tokio::test]
    async fn test_remote_unreachable_is_error() {
        // Bind and immediately drop a listener to get a port nobody answers on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = format!("http://{}", addr);
        let cache = RemoteCache::new(&url, Duration::from_millis(200)).unwrap();
        assert!(cache.get("k").await.is_err());
        assert!(cache.ping().await.is_err());
    }

    #[tokio::test]
    async fn test_gateway_over_failing_remote_degrades() {
        let failing_url = spawn_failing_stub().await;
        let cache = RemoteCache::new(&failing_url, Duration::from_millis(500)).unwrap();
        let gateway = CacheGateway::new(Arc::new(cache), CacheSettings::default());

        assert_eq!(gateway.lookup("q").await, None);
        assert!(!gateway.populate("q", &[hit("/a", "A")]).await);
    }

    #[tokio::test]
    async fn test_gateway_over_remote_round_trip() {
        let (base, _store) = spawn_kv_stub().await;
        let cache = RemoteCache::new(&base, Duration::from_millis(500)).unwrap();
        let gateway = CacheGateway::new(
            Arc::new(cache),
            CacheSettings {
                timeout: Duration::from_secs(2),
                ..CacheSettings::default()
            },
        );
        let hits = vec![hit("/a", "A")];

        assert!(gateway.populate("rust & go", &hits).await);
        assert_eq!(gateway.lookup("rust & go").await, Some(hits));
    }

    // ============================================================
    // REDIS CACHE TESTS
    // ============================================================

    fn redis_url() -> String {
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())
    }

    #[tokio::test]
    async fn test_redis_rejects_bad_urls() {
        let timeout = Duration::from_millis(200);
        assert!(RedisCache::connect("not a url", timeout).await.is_err());
        assert!(RedisCache::connect("http://localhost:6379", timeout).await.is_err());
    }

    #[tokio::test]
    #[ignore = "needs a Redis server at REDIS_URL"]
    async fn test_redis_round_trip() {
        let cache = RedisCache::connect(&redis_url(), DEFAULT_CONNECT_TIMEOUT).await.unwrap();
        let key = format!("search:test-{}", uuid::Uuid::new_v4());

        assert_eq!(cache.get(&key).await.unwrap(), None);

        cache
            .set(&key, "payload".to_string(), Duration::from_millis(1500))
            .await
            .unwrap();
        assert_eq!(cache.get(&key).await.unwrap().as_deref(), Some("payload"));

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(cache.get(&key).await.unwrap(), None);
    }

    #[tokio::test]
    #[ignore = "needs a Redis server at REDIS_URL"]
    async fn test_gateway_over_redis_round_trip() {
        let cache = RedisCache::connect(&redis_url(), DEFAULT_CONNECT_TIMEOUT).await.unwrap();
        let gateway = CacheGateway::new(Arc::new(cache), CacheSettings::default());
        let query = format!("rust {}", uuid::Uuid::new_v4());
        let hits = vec![hit("/a", "A")];

        assert!(gateway.populate(&query, &hits).await);
        assert_eq!(gateway.lookup(&query).await, Some(hits));
    }
}

//! Integration tests for the Garden Guide backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::config::{Config, LogFormat};
use crate::db::{init_database, Repository};
use crate::resolver::PlantResolver;
use crate::species::{HttpSpeciesClient, SpeciesClient};
use crate::storage::{FileStore, KeyValueStore, LocalPlantCache};
use crate::{create_router, AppState};

const SPECIES_KEY: &str = "test-species-key";

/// Stand-in for the species API. Knows two plants and fails on "explode".
async fn fake_species(
    State(hits): State<Arc<AtomicUsize>>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    hits.fetch_add(1, Ordering::SeqCst);

    if params.get("key").map(String::as_str) != Some(SPECIES_KEY) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "bad key" })));
    }

    let query = params.get("q").cloned().unwrap_or_default().to_lowercase();
    if query.contains("explode") {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({})));
    }
    if query.contains("xanadu") {
        return (
            StatusCode::OK,
            Json(json!({
                "data": [
                    {
                        "id": 4242,
                        "common_name": "Xanadu Plant",
                        "default_image": { "medium_url": "https://img.test/xanadu.jpg" },
                        "care_level": "Medium",
                        "watering": "Frequent",
                        "sunlight": ["part shade", "full sun"],
                        "hardiness": { "min": "9", "max": "11" }
                    },
                    { "common_name": "Second Candidate" }
                ]
            })),
        );
    }
    if query.contains("weiss") {
        return (
            StatusCode::OK,
            Json(json!({ "data": [{ "common_name": "Édelweiss", "watering": "Minimum" }] })),
        );
    }
    (StatusCode::OK, Json(json!({ "data": [] })))
}

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    species_hits: Arc<AtomicUsize>,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_psk(Some("test-api-key".to_string())).await
    }

    async fn with_psk(psk: Option<String>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");
        let store_dir = temp_dir.path().join("store");

        // Fake species API
        let species_hits = Arc::new(AtomicUsize::new(0));
        let species_app = Router::new()
            .route("/species-list", get(fake_species))
            .with_state(species_hits.clone());
        let species_listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind species API");
        let species_url = format!(
            "http://{}/species-list",
            species_listener.local_addr().unwrap()
        );
        tokio::spawn(async move {
            axum::serve(species_listener, species_app).await.unwrap();
        });

        let config = Config {
            api_psk: psk.clone(),
            db_path: db_path.clone(),
            store_dir: store_dir.clone(),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            log_format: LogFormat::Text,
            species_api_url: species_url,
            species_api_key: Some(SPECIES_KEY.to_string()),
        };

        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let repo = Arc::new(Repository::new(pool));
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&store_dir));
        let cache = LocalPlantCache::with_catalog(store);
        let species: Arc<dyn SpeciesClient> = Arc::new(HttpSpeciesClient::new(
            config.species_api_url.clone(),
            config.species_api_key.clone(),
        ));
        let resolver = PlantResolver::new(Some(repo.clone()), cache.clone(), species);

        let state = AppState {
            repo,
            cache,
            resolver,
            config: Arc::new(config),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for servers to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let mut client_builder = Client::builder();
        if let Some(key) = psk {
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert("x-api-key", key.parse().unwrap());
            client_builder = client_builder.default_headers(headers);
        }

        TestFixture {
            client: client_builder.build().unwrap(),
            base_url,
            species_hits,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn species_hits(&self) -> usize {
        self.species_hits.load(Ordering::SeqCst)
    }

    async fn get_json(&self, path: &str) -> (StatusCode, Value) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        let status = StatusCode::from_u16(resp.status().as_u16()).unwrap();
        (status, resp.json().await.unwrap())
    }

    async fn resolve(&self, query: &str) -> Value {
        let resp = self
            .client
            .get(self.url("/api/plants"))
            .query(&[("q", query)])
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["success"], true);
        body["data"].clone()
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_auth_missing_and_invalid_key() {
    let fixture = TestFixture::new().await;
    let anonymous = Client::new();

    let resp = anonymous
        .get(fixture.url("/api/plants"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let resp = anonymous
        .get(fixture.url("/api/plants"))
        .header("x-api-key", "wrong-key")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = anonymous
        .get(fixture.url("/api/plants"))
        .bearer_auth("test-api-key")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_auth_disabled_without_psk() {
    let fixture = TestFixture::with_psk(None).await;

    let resp = Client::new()
        .get(fixture.url("/api/reminders"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_empty_query_lists_bundled_catalog() {
    let fixture = TestFixture::new().await;

    let data = fixture.resolve("").await;
    assert_eq!(data["tier"], "local");
    let plants = data["plants"].as_array().unwrap();
    assert_eq!(plants.len(), crate::storage::bundled_plants().len());
    assert!(plants.iter().any(|p| p["name"] == "Monstera Deliciosa"));
    assert_eq!(fixture.species_hits(), 0);
}

#[tokio::test]
async fn test_cache_hit_does_not_call_species_api() {
    let fixture = TestFixture::new().await;

    let data = fixture.resolve("monstera").await;
    assert_eq!(data["tier"], "local");
    let plants = data["plants"].as_array().unwrap();
    assert_eq!(plants.len(), 1);
    assert_eq!(plants[0]["name"], "Monstera Deliciosa");
    assert_eq!(plants[0]["isExternal"], false);
    assert!(data.get("notice").is_none());

    let data = fixture.resolve("SNAKE PLANT").await;
    assert_eq!(data["plants"][0]["name"], "Snake Plant");

    assert_eq!(fixture.species_hits(), 0);
}

#[tokio::test]
async fn test_external_lookup_is_written_back() {
    let fixture = TestFixture::new().await;

    let first = fixture.resolve("Xanadu Plant Nobody Has").await;
    assert_eq!(first["tier"], "external");
    assert_eq!(first["notice"]["kind"], "success");
    let plants = first["plants"].as_array().unwrap();
    assert_eq!(plants.len(), 1);
    let plant = &plants[0];
    assert_eq!(plant["name"], "Xanadu Plant");
    assert_eq!(plant["isExternal"], true);
    assert_eq!(plant["image"], "https://img.test/xanadu.jpg");
    assert_eq!(plant["difficulty"], "Medium");
    assert_eq!(
        plant["water"],
        "Keep soil moist, water when top inch of soil is dry"
    );
    assert_eq!(plant["light"], "Partial sun");
    assert_eq!(plant["temperature"], "9 - 11");
    assert_eq!(fixture.species_hits(), 1);

    let second = fixture.resolve("Xanadu Plant Nobody Has").await;
    assert_eq!(second["tier"], "hosted");
    assert_eq!(second["plants"], first["plants"]);
    assert_eq!(fixture.species_hits(), 1);

    // The written-back guide is reachable by its hosted ID
    let id = plant["id"].as_i64().unwrap();
    let (status, body) = fixture.get_json(&format!("/api/plants/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Xanadu Plant");

    // Once stored, the empty query lists the hosted table
    let all = fixture.resolve("").await;
    assert_eq!(all["tier"], "hosted");
    assert_eq!(all["plants"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_non_ascii_guide_is_found_in_any_case() {
    let fixture = TestFixture::new().await;

    let first = fixture.resolve("édelweiss").await;
    assert_eq!(first["tier"], "external");
    assert_eq!(first["plants"][0]["name"], "Édelweiss");

    let second = fixture.resolve("ÉDELWEISS").await;
    assert_eq!(second["tier"], "hosted");
    assert_eq!(second["plants"], first["plants"]);
    assert_eq!(fixture.species_hits(), 1);
}

#[tokio::test]
async fn test_species_failures_return_empty_results() {
    let fixture = TestFixture::new().await;

    let data = fixture.resolve("explode").await;
    assert_eq!(data["tier"], "none");
    assert!(data["plants"].as_array().unwrap().is_empty());
    assert_eq!(data["notice"]["kind"], "error");

    let data = fixture.resolve("Plant Nobody Knows").await;
    assert_eq!(data["tier"], "none");
    assert!(data["plants"].as_array().unwrap().is_empty());

    assert_eq!(fixture.species_hits(), 2);
}

#[tokio::test]
async fn test_get_plant_falls_back_to_catalog() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.get_json("/api/plants/-1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Monstera Deliciosa");
    assert!(!body["data"]["steps"].as_array().unwrap().is_empty());

    // The first database row does not shadow a curated guide
    let resolved = fixture.resolve("xanadu plant").await;
    let hosted_id = resolved["plants"][0]["id"].as_i64().unwrap();
    assert!(hosted_id > 0);

    let (_, body) = fixture
        .get_json(&format!("/api/plants/{}", hosted_id))
        .await;
    assert_eq!(body["data"]["name"], "Xanadu Plant");

    let (status, body) = fixture.get_json("/api/plants/-1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Monstera Deliciosa");

    let (status, body) = fixture.get_json("/api/plants/987654").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_delete_guide() {
    let fixture = TestFixture::new().await;

    fixture.resolve("xanadu plant").await;

    let resp = fixture
        .client
        .delete(fixture.url("/api/plants/guides/xanadu%20plant"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Gone from every tier, so the species API is asked again
    let data = fixture.resolve("xanadu plant").await;
    assert_eq!(data["tier"], "external");
    assert_eq!(fixture.species_hits(), 2);

    let resp = fixture
        .client
        .delete(fixture.url("/api/plants/guides/Aloe%20Vera"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let resp = fixture
        .client
        .delete(fixture.url("/api/plants/guides/Nothing%20Here"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_reminder_crud() {
    let fixture = TestFixture::new().await;

    // Create reminder
    let create_resp = fixture
        .client
        .post(fixture.url("/api/reminders"))
        .json(&json!({
            "plantId": 1,
            "plantName": "Monstera Deliciosa",
            "task": "water",
            "frequency": "weekly",
            "notes": "Bottom water"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(create_resp.status(), 200);
    let create_body: Value = create_resp.json().await.unwrap();
    let reminder = &create_body["data"];
    assert_eq!(reminder["enabled"], true);
    assert_eq!(reminder["task"], "water");
    let reminder_id = reminder["id"].as_str().unwrap().to_string();

    let created_at: DateTime<Utc> = reminder["createdAt"].as_str().unwrap().parse().unwrap();
    let next_due: DateTime<Utc> = reminder["nextDue"].as_str().unwrap().parse().unwrap();
    assert_eq!(next_due - created_at, Duration::days(7));

    // Unknown frequency is accepted and due immediately
    let resp = fixture
        .client
        .post(fixture.url("/api/reminders"))
        .json(&json!({
            "plantId": 2,
            "plantName": "Snake Plant",
            "task": "fertilize",
            "frequency": "whenever"
        }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["nextDue"], body["data"]["createdAt"]);

    // List, filtered by plant
    let (_, body) = fixture.get_json("/api/reminders?plantId=1").await;
    let listed = body["data"].as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], reminder_id.as_str());

    let (_, body) = fixture.get_json("/api/reminders").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    // Toggle
    let toggle_resp = fixture
        .client
        .put(fixture.url(&format!("/api/reminders/{}/toggle", reminder_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(toggle_resp.status(), 200);
    let toggle_body: Value = toggle_resp.json().await.unwrap();
    assert_eq!(toggle_body["data"]["enabled"], false);
    assert_eq!(toggle_body["data"]["nextDue"], reminder["nextDue"]);

    // Delete
    let delete_resp = fixture
        .client
        .delete(fixture.url(&format!("/api/reminders/{}", reminder_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(delete_resp.status(), 200);

    let delete_again = fixture
        .client
        .delete(fixture.url(&format!("/api/reminders/{}", reminder_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(delete_again.status(), 404);
}

#[tokio::test]
async fn test_reminder_validation() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/reminders"))
        .json(&json!({
            "plantId": 1,
            "plantName": "   ",
            "task": "prune",
            "frequency": "monthly"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let resp = fixture
        .client
        .put(fixture.url("/api/reminders/missing/toggle"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

//! HttpStore and LookupClient against an in-process board server.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use mealboard_core::{
    DocumentStore, FetchOutcome, HttpStore, LookupClient, SaveOutcome, StoreError, SyncEngine,
    SyncOptions, SyncStatus, VersionTag,
};
use serde_json::{json, Value};
use tokio::sync::Mutex;

#[derive(Default)]
struct Stored {
    body: Value,
    revision: u64,
}

impl Stored {
    fn etag(&self) -> String {
        format!("\"{}\"", self.revision)
    }
}

type Shared = Arc<Mutex<Stored>>;

async fn get_data(State(stored): State<Shared>, headers: HeaderMap) -> Response {
    let stored = stored.lock().await;
    let etag = stored.etag();
    let known = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok());
    if known == Some(etag.as_str()) {
        return StatusCode::NOT_MODIFIED.into_response();
    }
    ([(header::ETAG, etag)], Json(stored.body.clone())).into_response()
}

async fn post_data(
    State(stored): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut stored = stored.lock().await;
    let expected = headers.get(header::IF_MATCH).and_then(|v| v.to_str().ok());
    if let Some(expected) = expected {
        if expected != stored.etag() {
            return (StatusCode::CONFLICT, Json(json!({"error": "conflict"}))).into_response();
        }
    }
    stored.body = body;
    stored.revision += 1;
    let etag = stored.etag();
    (
        [(header::ETAG, etag)],
        Json(json!({"status": "success"})),
    )
        .into_response()
}

async fn recipe(Json(body): Json<Value>) -> Json<Value> {
    let dish = body["dish_name"].as_str().unwrap_or_default().to_string();
    Json(json!({
        "url": format!("https://rezepte.example/{}", dish.to_lowercase()),
        "ingredients": ["1 Gans", "500g Rotkohl"],
        "instructions": ["Braten"],
        "calories": 850
    }))
}

async fn suggest(Json(body): Json<Value>) -> Json<Value> {
    let query = body["query"].as_str().unwrap_or_default();
    Json(json!({ "suggestions": [format!("{}braten", query), format!("{}suppe", query)] }))
}

async fn categorize(Json(body): Json<Value>) -> Json<Value> {
    let items = body["items"].clone();
    Json(json!({ "Vorratsschrank": items }))
}

async fn spawn_server(initial: Value) -> (String, Shared) {
    let stored: Shared = Arc::new(Mutex::new(Stored {
        body: initial,
        revision: 1,
    }));
    let app = Router::new()
        .route("/api/data", get(get_data).post(post_data))
        .route("/api/ai/recipe", post(recipe))
        .route("/api/ai/suggest", post(suggest))
        .route("/api/ai/categorize", post(categorize))
        .with_state(stored.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), stored)
}

async fn fetch_tagged(store: &HttpStore) -> (mealboard_core::Document, VersionTag) {
    match store.fetch(None).await.unwrap() {
        FetchOutcome::Fetched {
            document,
            tag: Some(tag),
        } => (document, tag),
        other => panic!("expected a tagged document, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_empty_store() {
    let (url, _) = spawn_server(json!({})).await;
    let store = HttpStore::new(url).unwrap();

    let (document, tag) = fetch_tagged(&store).await;
    assert!(document.is_empty());
    assert_eq!(tag.as_str(), "\"1\"");
}

#[tokio::test]
async fn test_fetch_not_modified() {
    let (url, _) = spawn_server(json!({})).await;
    let store = HttpStore::new(url).unwrap();
    let (_, tag) = fetch_tagged(&store).await;

    let outcome = store.fetch(Some(&tag)).await.unwrap();
    assert!(matches!(outcome, FetchOutcome::NotModified));
}

#[tokio::test]
async fn test_fetch_legacy_slot_map() {
    let (url, _) = spawn_server(json!({
        "2025-12-24_abendessen": {"date": "2025-12-24", "type": "Abendessen", "proposals": []}
    }))
    .await;
    let store = HttpStore::new(url).unwrap();

    let (document, _) = fetch_tagged(&store).await;
    assert_eq!(document.slots.len(), 1);
}

#[tokio::test]
async fn test_save_with_stale_tag_conflicts() {
    let (url, stored) = spawn_server(json!({})).await;
    let store = HttpStore::new(url).unwrap();
    let (mut document, tag) = fetch_tagged(&store).await;

    document.add_grocery("Brot");
    let outcome = store.save(&document, Some(&tag)).await.unwrap();
    let new_tag = match outcome {
        SaveOutcome::Saved { tag: Some(tag) } => tag,
        other => panic!("expected save, got {:?}", other),
    };
    assert_ne!(new_tag, tag);
    assert_eq!(stored.lock().await.body["groceries"][0], "Brot");

    document.add_grocery("Milch");
    let outcome = store.save(&document, Some(&tag)).await.unwrap();
    assert_eq!(outcome, SaveOutcome::Conflict);
}

#[tokio::test]
async fn test_unreachable_server() {
    let store = HttpStore::new("http://127.0.0.1:1").unwrap();
    let result = store.fetch(None).await;
    assert!(matches!(result, Err(StoreError::Connection(_))));
}

#[tokio::test]
async fn test_two_engines_converge() {
    let (url, _) = spawn_server(json!({})).await;
    let options = SyncOptions::default();
    let alice = SyncEngine::new(HttpStore::new(url.clone()).unwrap(), options);
    let bob = SyncEngine::new(HttpStore::new(url).unwrap(), options);
    alice.poll_once().await.unwrap();
    bob.poll_once().await.unwrap();

    alice.update(|doc| doc.add_grocery("Brot")).unwrap();
    bob.update(|doc| doc.add_grocery("Milch")).unwrap();
    alice.save_now().await.unwrap();
    // Bob's tag is stale now; the save goes through after one merge.
    bob.save_now().await.unwrap();
    alice.poll_once().await.unwrap();

    assert_eq!(bob.status(), SyncStatus::Saved);
    let texts = |engine: &SyncEngine<HttpStore>| {
        let mut texts: Vec<String> = engine
            .snapshot()
            .groceries
            .iter()
            .map(|g| g.text().to_string())
            .collect();
        texts.sort();
        texts
    };
    assert_eq!(texts(&alice), vec!["Brot", "Milch"]);
    assert_eq!(texts(&alice), texts(&bob));
}

#[tokio::test]
async fn test_lookup_endpoints() {
    let (url, _) = spawn_server(json!({})).await;
    let lookup = LookupClient::new(url).unwrap();

    let recipe = lookup.recipe("Gans").await.unwrap();
    assert_eq!(recipe.url.as_deref(), Some("https://rezepte.example/gans"));
    assert_eq!(recipe.calories, Some(850.0));
    assert!(recipe.has_ingredients());

    let suggestions = lookup.suggest("Gänse").await.unwrap();
    assert_eq!(suggestions, vec!["Gänsebraten", "Gänsesuppe"]);

    let items = vec!["500 g Mehl".to_string()];
    let categories = lookup.categorize(&items).await.unwrap();
    assert_eq!(categories["Vorratsschrank"], items);
}

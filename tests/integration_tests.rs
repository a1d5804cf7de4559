//! Integration tests for Quill

use async_trait::async_trait;
use quill::{
    App, Author, BlogStore, FetchPolicy, Post, RemoteConfig, RemoteDataService, RemoteError,
    StoreConfig, User,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> StoreConfig {
    StoreConfig::new(RemoteConfig::new(server.uri().parse().unwrap()))
}

#[tokio::test]
async fn create_post_appends_server_entity() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "p4",
            "title": "X",
            "body": "Y",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = BlogStore::from_config(&config_for(&server)).unwrap();
    let view = store.get_state();
    let seeded: Vec<String> = view.read(|state| state.posts().ids().to_vec());

    store.create_post(&Post::draft("X", "Y")).await.unwrap();

    // The view taken before the call reflects the new post.
    view.read(|state| {
        let mut expected = seeded.clone();
        expected.push("p4".to_string());
        assert_eq!(state.posts().ids(), expected.as_slice());
        let post = state.posts().get("p4").unwrap();
        assert_eq!(post.title, "X");
        assert_eq!(post.body, "Y");
        assert!(!state.posts().is_loaded());
    });
}

#[tokio::test]
async fn fetch_posts_replaces_seed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "p9", "title": "Fetched" },
        ])))
        .mount(&server)
        .await;

    let store = BlogStore::from_config(&config_for(&server)).unwrap();
    store.fetch_posts().await.unwrap();

    let state = store.get_state().snapshot();
    assert_eq!(state.posts().ids(), ["p9"]);
    assert_eq!(state.posts().len(), 1);
    assert!(state.posts().is_loaded());
    for stale in ["1", "2", "3"] {
        assert!(!state.posts().contains(stale), "{stale} survived the fetch");
    }
    assert_eq!(state.posts().iter().count(), 1);
}

#[tokio::test]
async fn fetch_posts_merges_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "2", "title": "Renamed" },
            { "id": "p9", "title": "Fetched" },
        ])))
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.fetch_policy = FetchPolicy::MergeById;
    let store = BlogStore::from_config(&config).unwrap();
    store.fetch_posts().await.unwrap();

    let state = store.get_state().snapshot();
    assert_eq!(state.posts().ids(), ["1", "2", "3", "p9"]);
    assert_eq!(state.posts().get("2").unwrap().title, "Renamed");
    assert!(state.posts().is_loaded());
}

#[tokio::test]
async fn failed_user_create_keeps_current_user() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u1",
            "username": "ann",
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(422).set_body_string("username taken"))
        .mount(&server)
        .await;

    let store = BlogStore::from_config(&config_for(&server)).unwrap();
    store.create_user(&User::draft("ann", "pw")).await.unwrap();

    let err = store
        .create_user(&User::draft("ann", "pw"))
        .await
        .unwrap_err();

    assert!(matches!(err, RemoteError::Status { ref body, .. } if body == "username taken"));
    let state = store.get_state().snapshot();
    assert_eq!(state.authors().current_user_id(), Some("u1"));
    assert_eq!(state.authors().ids(), ["u1"]);
}

#[tokio::test]
async fn failed_fetch_leaves_posts_alone() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let store = BlogStore::from_config(&config_for(&server)).unwrap();
    let before = store.get_state().snapshot();

    assert!(store.fetch_posts().await.is_err());
    assert_eq!(store.get_state().snapshot(), before);
}

#[test]
fn use_store_without_install_fails() {
    let err = App::scope(quill::use_store).unwrap_err();

    assert_eq!(err.key(), quill::STORE_KEY.name());
}

#[test]
fn use_store_finds_installed_store() {
    let store = BlogStore::seeded(Arc::new(quill::InMemoryDataService::new()));
    let app = App::new();
    store.install(&app);

    let found = App::mount(app, quill::use_store).unwrap();
    assert_eq!(found.get_state().snapshot(), store.get_state().snapshot());
}

/// Holds each `create_post` call until the test releases it by title.
#[derive(Default)]
struct GatedService {
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
}

impl GatedService {
    fn gate(&self, title: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(title.to_string(), rx);
        tx
    }
}

#[async_trait]
impl RemoteDataService for GatedService {
    async fn create_post(&self, draft: &Post) -> Result<Post, RemoteError> {
        let gate = self.gates.lock().unwrap().remove(&draft.title);
        if let Some(gate) = gate {
            gate.await
                .map_err(|_| RemoteError::Unavailable("gate dropped".to_string()))?;
        }
        let mut post = draft.clone();
        post.id = format!("id-{}", draft.title);
        Ok(post)
    }

    async fn create_user(&self, _draft: &User) -> Result<Author, RemoteError> {
        Err(RemoteError::Unavailable("not used".to_string()))
    }

    async fn fetch_posts(&self) -> Result<Vec<Post>, RemoteError> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn concurrent_creates_apply_in_response_order() {
    let remote = Arc::new(GatedService::default());
    let release_first = remote.gate("first");
    let release_second = remote.gate("second");
    let store = BlogStore::new(Default::default(), remote);

    let first = Post::draft("first", "");
    let second = Post::draft("second", "");
    let (a, b, _) = tokio::join!(
        store.create_post(&first),
        store.create_post(&second),
        async {
            release_second.send(()).unwrap();
            while !store
                .get_state()
                .read(|state| state.posts().contains("id-second"))
            {
                tokio::task::yield_now().await;
            }
            release_first.send(()).unwrap();
        }
    );
    a.unwrap();
    b.unwrap();

    let state = store.get_state().snapshot();
    assert_eq!(state.posts().ids(), ["id-second", "id-first"]);
}

//! Blog store walkthrough
//!
//! Uses the HTTP API when `QUILL_API_URL` is set, an in-memory API otherwise.
//! Set `RUST_LOG=quill=debug` to see what the store does.

use std::sync::Arc;

use quill::{App, BlogStore, ConfigError, InMemoryDataService, Post, StoreConfig, User};
use tracing_subscriber::EnvFilter;

fn build_store() -> quill::Result<BlogStore> {
    match StoreConfig::from_env() {
        Ok(config) => Ok(BlogStore::from_config(&config)?),
        Err(ConfigError::MissingEnvVar(_)) => {
            let remote = InMemoryDataService::with_posts(quill::mocks::seed_posts());
            Ok(BlogStore::seeded(Arc::new(remote)))
        }
        Err(e) => Err(e.into()),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> quill::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Blog Store Example ===\n");

    let app = App::new();
    app.use_plugin(&build_store()?);

    // Components look the store up instead of receiving it.
    let store = App::mount(app, quill::use_store)?;

    store
        .subscribe(|state| {
            println!(
                "State updated! {} posts, {} authors",
                state.posts().len(),
                state.authors().len()
            );
        })
        .detach();

    println!("Signing up...");
    store.create_user(&User::draft("ann", "correct horse")).await?;
    if let Some(author) = store.current_user() {
        println!("Signed in as {} ({})", author.username, author.id);
    }

    println!("\nWriting a post...");
    let author_id = store.current_user().map(|author| author.id);
    let mut draft = Post::draft("Hello", "First post from the store example");
    draft.author_id = author_id;
    store.create_post(&draft).await?;

    println!("\nLoading posts...");
    store.ensure_posts_loaded().await?;

    let state = store.get_state();
    state.read(|state| {
        println!("\nTimeline:");
        for post in state.posts().iter() {
            println!("  [{}] {} ({})", post.id, post.title, post.created.format("%Y-%m-%d"));
        }
    });

    Ok(())
}

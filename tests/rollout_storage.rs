use std::sync::Arc;

use codepush_native::{
    ClientConfig, ClientOptions, ConfigBuilder, PreferenceStore, RolloutStorage,
    ServiceDefaults, SqlitePreferences, DEFAULT_NAMESPACE,
};
use serde_json::json;

#[tokio::test]
async fn rollout_item_lifecycle_over_sqlite() {
    let prefs = SqlitePreferences::in_memory(DEFAULT_NAMESPACE).await.unwrap();
    let storage = RolloutStorage::spawn(Arc::new(prefs.clone()));

    assert!(storage.get_item("rollout").await.unwrap().is_none());

    storage.set_item("rollout", "50");
    assert_eq!(storage.get_item("rollout").await.unwrap().as_deref(), Some("50"));

    storage.remove_item("rollout");
    assert!(storage.get_item("rollout").await.unwrap().is_none());
    assert!(prefs.keys().await.unwrap().is_empty());
}

#[tokio::test]
async fn bridge_writes_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.db");

    {
        let prefs = SqlitePreferences::open(&path, DEFAULT_NAMESPACE).await.unwrap();
        let storage = RolloutStorage::spawn(Arc::new(prefs.clone()));

        storage
            .invoke("setItem", &[json!("rollout"), json!("75")])
            .unwrap();
        // Reading back drains the queue before the pool closes.
        let pending = storage.invoke("getItem", &[json!("rollout")]).unwrap().unwrap();
        assert_eq!(pending.await.unwrap().as_deref(), Some("75"));
        prefs.close().await;
    }

    let prefs = SqlitePreferences::open(&path, DEFAULT_NAMESPACE).await.unwrap();
    assert_eq!(prefs.get("rollout").await.unwrap().as_deref(), Some("75"));
    prefs.close().await;
}

#[test]
fn builder_and_options_agree() {
    let defaults = ServiceDefaults::new("https://updates.example.com/");

    let built = ConfigBuilder::new(&defaults)
        .set_is_debug_mode(false)
        .set_is_debug_mode(true)
        .build();

    let options = ClientOptions::from_json(r#"{"debugMode": true}"#).unwrap();
    let from_options = ClientConfig::from_options(options, &defaults);

    assert_eq!(built, from_options);
    assert_eq!(built.server_url(), "https://updates.example.com/");
    assert_eq!(built.public_key_resource_id(), None);
}

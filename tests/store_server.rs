//! HttpStore and the editor against a live dev store server.

use cueline::core::event_bus::EventBus;
use cueline::core::playback::PlaybackState;
use cueline::core::workers::InlineRunner;
use cueline::editor::{EditorCommand, SaveDecision};
use cueline::entities::{
    Interaction, InteractionConfig, InteractionId, InteractionKind, InteractionPatch, TipConfig,
};
use cueline::server::{StoreRegistry, StoreServer, demo_interactions};
use cueline::sync::{HttpStore, InteractionStore, StoreError, SyncPipeline};
use cueline::Editor;
use std::sync::Arc;
use std::time::Duration;

fn tip(title: &str, t: f64) -> Interaction {
    Interaction::draft(
        InteractionConfig::Tip(TipConfig {
            body: "Remember to take notes".into(),
        }),
        t,
        title,
    )
}

fn start(webinar: &str, items: Vec<Interaction>) -> (StoreServer, HttpStore) {
    let registry = Arc::new(StoreRegistry::new());
    registry.seed(webinar, items);
    let server = StoreServer::start("127.0.0.1:0", registry).unwrap();
    let store = HttpStore::new(&server.base_url(), webinar, Duration::from_secs(5)).unwrap();
    (server, store)
}

#[test]
fn test_http_store_crud() {
    let (_server, store) = start("w1", vec![tip("late", 120.0), tip("early", 10.0)]);

    let listed = store.list().unwrap();
    let titles: Vec<_> = listed.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["early", "late"]);

    let created = store.create(&tip("middle", 60.0)).unwrap();
    let id = created.id.clone().unwrap();
    assert_eq!(created.title, "middle");
    assert_eq!(created.kind(), InteractionKind::Tip);

    let moved = store.patch(&id, &InteractionPatch::trigger_time(75.0)).unwrap();
    assert_eq!(moved.trigger_time, 75.0);
    let disabled = store.patch(&id, &InteractionPatch::enabled(false)).unwrap();
    assert!(!disabled.enabled);
    assert_eq!(disabled.trigger_time, 75.0);

    let mut edited = disabled.clone();
    edited.title = "renamed".into();
    assert_eq!(store.update(&id, &edited).unwrap().title, "renamed");

    store.delete(&id).unwrap();
    assert_eq!(store.list().unwrap().len(), 2);
}

#[test]
fn test_http_store_missing_id_is_404() {
    let (_server, store) = start("w2", vec![]);
    let ghost = InteractionId::from("999");
    match store.delete(&ghost) {
        Err(StoreError::Http { status, .. }) => assert_eq!(status, 404),
        other => panic!("expected 404, got {:?}", other),
    }
    assert!(matches!(
        store.patch(&ghost, &InteractionPatch::enabled(true)),
        Err(StoreError::Http { status: 404, .. })
    ));
}

#[test]
fn test_webinars_are_isolated() {
    let registry = Arc::new(StoreRegistry::new());
    registry.seed("a", vec![tip("only in a", 5.0)]);
    let server = StoreServer::start("127.0.0.1:0", Arc::clone(&registry)).unwrap();
    let a = HttpStore::new(&server.base_url(), "a", Duration::from_secs(5)).unwrap();
    let b = HttpStore::new(&server.base_url(), "b", Duration::from_secs(5)).unwrap();
    assert_eq!(a.list().unwrap().len(), 1);
    assert!(b.list().unwrap().is_empty());
    assert_eq!(registry.webinars(), vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn test_unreachable_server_is_transport_error() {
    let addr = {
        let server = StoreServer::start("127.0.0.1:0", Arc::new(StoreRegistry::new())).unwrap();
        server.base_url()
    };
    // Server dropped above; the port is closed now
    let store = HttpStore::new(&addr, "w", Duration::from_millis(500)).unwrap();
    assert!(matches!(store.list(), Err(StoreError::Transport(_))));
}

#[test]
fn test_editor_over_http() {
    let (server, store) = start("demo", demo_interactions());
    let pipeline = SyncPipeline::new(Arc::new(store), Arc::new(InlineRunner));
    let mut editor = Editor::new(pipeline, PlaybackState::with_duration(1800.0), EventBus::new());
    editor.sync();
    assert_eq!(editor.list().len(), 3);

    // Add a tip at 2:00
    editor.seek(120.0);
    editor.execute(EditorCommand::AddAtPlayhead);
    editor.choose_type(InteractionKind::Tip);
    editor.update_draft(|d| d.title = "Slides are in the chat".into());
    assert!(matches!(editor.save_form(), SaveDecision::Create(_)));
    editor.sync();
    assert_eq!(editor.list().len(), 4);
    let created = editor.selection().selected.clone().unwrap();

    // Toggle it off, then delete it
    assert_eq!(editor.toggle_enabled(&created), Some(false));
    editor.sync();
    editor.execute(EditorCommand::RequestDelete);
    editor.execute(EditorCommand::ConfirmDelete);
    editor.sync();
    assert_eq!(editor.list().len(), 3);

    // A second client sees the same state
    let check = HttpStore::new(&server.base_url(), "demo", Duration::from_secs(5)).unwrap();
    let remote = check.list().unwrap();
    assert_eq!(remote.len(), 3);
    assert!(remote.iter().all(|i| i.id.as_ref() != Some(&created)));
    assert!(editor.notifications().iter().all(|t| !t.message.starts_with("Failed")));
}

use std::sync::Arc;
use std::thread;

use pretty_assertions::assert_eq;
use session_store::{
    Conversation, FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, Message, SessionStore,
    ACTIVE_KEY, SESSIONS_KEY, UNTITLED_TITLE,
};

fn memory_backend() -> Arc<MemoryKeyValueStore> {
    Arc::new(MemoryKeyValueStore::new())
}

fn conversation_with(messages: &[(&str, bool)]) -> Conversation {
    let mut conversation = Conversation::new();
    for (text, is_user) in messages {
        if *is_user {
            conversation.messages.push(Message::user(*text, Vec::new()));
        } else {
            let mut reply = Message::assistant();
            reply.text = (*text).to_string();
            conversation.messages.push(reply);
        }
    }
    conversation
}

fn ids(store: &SessionStore, query: &str) -> Vec<String> {
    store
        .search(query)
        .into_iter()
        .map(|summary| summary.id)
        .collect()
}

#[test]
fn load_from_empty_backend_is_empty() {
    let store = SessionStore::load(memory_backend());
    assert!(store.is_empty());
    assert_eq!(store.active(), None);
}

#[test]
fn load_treats_corrupt_index_as_empty_history() {
    let backend = memory_backend();
    backend
        .set(SESSIONS_KEY, "{ this is not json")
        .expect("raw write should succeed");
    backend
        .set(ACTIVE_KEY, "dangling")
        .expect("raw write should succeed");

    let store = SessionStore::load(backend);
    assert!(store.is_empty());
    assert_eq!(store.active(), None);
}

#[test]
fn load_treats_wrong_shape_as_empty_history() {
    let backend = memory_backend();
    backend
        .set(SESSIONS_KEY, r#"{"sessions": []}"#)
        .expect("raw write should succeed");

    assert!(SessionStore::load(backend).is_empty());
}

#[test]
fn load_keeps_first_record_for_duplicate_ids() {
    let backend = memory_backend();
    backend
        .set(
            SESSIONS_KEY,
            r#"[
                {"id": "a", "title": "first", "messages": [], "updated_at": 2},
                {"id": "a", "title": "second", "messages": [], "updated_at": 1}
            ]"#,
        )
        .expect("raw write should succeed");

    let store = SessionStore::load(backend);
    assert_eq!(store.len(), 1);
    assert_eq!(store.get("a").map(|c| c.title), Some("first".to_string()));
}

#[test]
fn upsert_orders_index_newest_first() {
    let store = SessionStore::load(memory_backend());
    let first = store
        .upsert(&conversation_with(&[("one", true)]))
        .expect("upsert should persist");
    let second = store
        .upsert(&conversation_with(&[("two", true)]))
        .expect("upsert should persist");

    assert_eq!(ids(&store, ""), vec![second.id.clone(), first.id.clone()]);

    let mut touched = first.clone();
    touched.messages.push(Message::user("again", Vec::new()));
    let touched = store.upsert(&touched).expect("upsert should persist");

    assert!(touched.updated_at > second.updated_at);
    assert_eq!(ids(&store, ""), vec![first.id, second.id]);
}

#[test]
fn updated_at_strictly_increases_per_mutation() {
    let store = SessionStore::load(memory_backend());
    let mut conversation = conversation_with(&[("hello", true)]);
    let mut last = 0;
    for _ in 0..20 {
        conversation = store.upsert(&conversation).expect("upsert should persist");
        assert!(conversation.updated_at > last);
        last = conversation.updated_at;
    }
}

#[test]
fn upsert_is_a_total_replace() {
    let store = SessionStore::load(memory_backend());
    let stored = store
        .upsert(&conversation_with(&[("a", true), ("b", false), ("c", true)]))
        .expect("upsert should persist");

    let mut shorter = stored.clone();
    shorter.messages.truncate(1);
    store.upsert(&shorter).expect("upsert should persist");

    assert_eq!(store.get(&stored.id).map(|c| c.messages.len()), Some(1));
}

#[test]
fn title_is_frozen_after_first_user_message() {
    let store = SessionStore::load(memory_backend());
    let mut conversation = Conversation::new();
    conversation = store.upsert(&conversation).expect("upsert should persist");
    assert_eq!(conversation.title, "");
    assert_eq!(store.list()[0].title, UNTITLED_TITLE);

    conversation
        .messages
        .push(Message::user("Say hello to the store", Vec::new()));
    conversation = store.upsert(&conversation).expect("upsert should persist");
    assert_eq!(conversation.title, "Say hello to the store");

    conversation.messages.insert(
        0,
        Message::user("A different opener that would change it", Vec::new()),
    );
    conversation.title = String::new();
    conversation = store.upsert(&conversation).expect("upsert should persist");
    assert_eq!(conversation.title, "Say hello to the store");
}

#[test]
fn placeholder_title_gives_way_to_first_user_message() {
    let store = SessionStore::load(memory_backend());
    let mut conversation = Conversation::new();
    conversation.title = "New Chat".to_string();

    conversation = store.upsert(&conversation).expect("upsert should persist");
    assert_eq!(conversation.title, "");
    assert_eq!(store.list()[0].title, UNTITLED_TITLE);

    conversation.title = "New Chat".to_string();
    conversation
        .messages
        .push(Message::user("Say hello", Vec::new()));
    conversation = store.upsert(&conversation).expect("upsert should persist");
    assert_eq!(conversation.title, "Say hello");

    conversation.title = "Renamed by caller".to_string();
    conversation = store.upsert(&conversation).expect("upsert should persist");
    assert_eq!(conversation.title, "Say hello");
}

#[test]
fn search_matches_title_or_any_message_case_insensitively() {
    let store = SessionStore::load(memory_backend());
    let titled = store
        .upsert(&conversation_with(&[("Say hello", true)]))
        .expect("upsert should persist");
    let body = store
        .upsert(&conversation_with(&[
            ("Unrelated opener", true),
            ("some reply", false),
            ("Hello world", true),
        ]))
        .expect("upsert should persist");
    store
        .upsert(&conversation_with(&[("nothing to see", true)]))
        .expect("upsert should persist");

    assert_eq!(ids(&store, "hello"), vec![body.id.clone(), titled.id.clone()]);
    assert_eq!(ids(&store, "HELLO"), vec![body.id, titled.id]);
    assert_eq!(store.search("").len(), 3);
    assert!(store.search("absent").is_empty());
}

#[test]
fn active_pointer_survives_reload() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let backend = Arc::new(FileKeyValueStore::open(dir.path()).expect("store should open"));

    let stored = {
        let store = SessionStore::load(backend.clone());
        let stored = store
            .upsert(&conversation_with(&[("resume me", true), ("ok", false)]))
            .expect("upsert should persist");
        store
            .set_active(Some(&stored.id))
            .expect("active pointer should persist");
        stored
    };

    let reloaded = SessionStore::load(backend);
    assert_eq!(reloaded.active(), Some(stored.id.clone()));
    assert_eq!(reloaded.get(&stored.id), Some(stored));
}

#[test]
fn remove_deletes_and_clears_active_pointer() {
    let backend = memory_backend();
    let store = SessionStore::load(backend.clone());
    let keep = store
        .upsert(&conversation_with(&[("keep", true)]))
        .expect("upsert should persist");
    let drop = store
        .upsert(&conversation_with(&[("drop", true)]))
        .expect("upsert should persist");
    store.set_active(Some(&drop.id)).expect("set active");

    assert!(store.remove(&drop.id).expect("remove should persist"));
    assert!(!store.remove(&drop.id).expect("second remove is a no-op"));
    assert_eq!(store.active(), None);
    assert_eq!(ids(&store, ""), vec![keep.id.clone()]);

    let reloaded = SessionStore::load(backend);
    assert_eq!(reloaded.active(), None);
    assert_eq!(ids(&reloaded, ""), vec![keep.id]);
}

#[test]
fn remove_keeps_unrelated_active_pointer() {
    let store = SessionStore::load(memory_backend());
    let active = store
        .upsert(&conversation_with(&[("active", true)]))
        .expect("upsert should persist");
    let other = store
        .upsert(&conversation_with(&[("other", true)]))
        .expect("upsert should persist");
    store.set_active(Some(&active.id)).expect("set active");

    store.remove(&other.id).expect("remove should persist");
    assert_eq!(store.active(), Some(active.id));
}

#[test]
fn resolve_id_accepts_unique_prefixes_only() {
    let backend = memory_backend();
    backend
        .set(
            SESSIONS_KEY,
            r#"[
                {"id": "abc-1", "messages": [], "updated_at": 2},
                {"id": "abd-2", "messages": [], "updated_at": 1}
            ]"#,
        )
        .expect("raw write should succeed");
    let store = SessionStore::load(backend);

    assert_eq!(store.resolve_id("abc"), Some("abc-1".to_string()));
    assert_eq!(store.resolve_id("abd-2"), Some("abd-2".to_string()));
    assert_eq!(store.resolve_id("ab"), None);
    assert_eq!(store.resolve_id(""), None);
}

#[test]
fn concurrent_upserts_serialize_without_losing_records() {
    let backend = memory_backend();
    let store = Arc::new(SessionStore::load(backend.clone()));

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for turn in 0..10 {
                    let text = format!("worker {worker} turn {turn}");
                    store
                        .upsert(&conversation_with(&[(text.as_str(), true)]))
                        .expect("upsert should persist");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker should finish");
    }

    let summaries = store.list();
    assert_eq!(summaries.len(), 80);
    assert!(summaries
        .windows(2)
        .all(|pair| pair[0].updated_at > pair[1].updated_at));

    let reloaded = SessionStore::load(backend);
    assert_eq!(reloaded.len(), 80);
}

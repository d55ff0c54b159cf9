mod support;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use chat_client::controller::{TurnUpdate, ABANDONED_REASON};
use chat_client::ChatError;
use generation_provider::GenerationEvent;
use pretty_assertions::assert_eq;
use session_store::SessionStore;

use support::{cancel_signal, controller_with, memory_backend, mock, submit_collect};

#[test]
fn events_for_other_requests_are_ignored_while_a_stream_is_live() {
    let backend = memory_backend();
    let mut controller = controller_with(&backend, mock(&["unused"]));

    let turn = controller
        .begin_turn("hello", Vec::new(), cancel_signal())
        .expect("turn should start");
    let live = turn.request.request_id;
    let stale = live + 100;

    assert_eq!(
        controller.apply_event(GenerationEvent::Started { request_id: live }),
        TurnUpdate::Started
    );
    assert_eq!(
        controller.apply_event(GenerationEvent::Chunk {
            request_id: live,
            text: "live output".to_string(),
        }),
        TurnUpdate::Streaming
    );

    let snapshot = controller.conversation().clone();
    for event in [
        GenerationEvent::Chunk {
            request_id: stale,
            text: "stale chunk".to_string(),
        },
        GenerationEvent::Finished { request_id: stale },
        GenerationEvent::Failed {
            request_id: stale,
            error: "stale error".to_string(),
        },
        GenerationEvent::Cancelled { request_id: stale },
    ] {
        assert_eq!(controller.apply_event(event), TurnUpdate::Ignored);
    }
    assert_eq!(controller.conversation(), &snapshot);
    assert!(controller.is_streaming());

    assert_eq!(
        controller.apply_event(GenerationEvent::Finished { request_id: live }),
        TurnUpdate::Finished
    );
    assert_eq!(controller.conversation().messages[1].text, "live output");
}

#[test]
fn second_turn_is_rejected_while_a_reply_streams() {
    let backend = memory_backend();
    let mut controller = controller_with(&backend, mock(&["unused"]));

    controller
        .begin_turn("first", Vec::new(), cancel_signal())
        .expect("turn should start");
    let second = controller.begin_turn("second", Vec::new(), cancel_signal());

    assert_eq!(second.map(|_| ()), Err(ChatError::StreamInFlight));
    assert_eq!(controller.conversation().messages.len(), 2);
}

#[test]
fn opening_another_conversation_abandons_the_live_stream() {
    let backend = memory_backend();
    let mut controller = controller_with(&backend, mock(&["earlier reply"]));
    submit_collect(&mut controller, "earlier conversation");
    let earlier_id = controller.conversation().id.clone();

    controller.new_conversation();
    let cancel = cancel_signal();
    let turn = controller
        .begin_turn("streaming question", Vec::new(), Arc::clone(&cancel))
        .expect("turn should start");
    let request_id = turn.request.request_id;
    let streaming_id = controller.conversation().id.clone();
    controller.apply_event(GenerationEvent::Chunk {
        request_id,
        text: "half an answer".to_string(),
    });

    controller
        .open_conversation(&earlier_id[..8])
        .expect("earlier conversation should open");

    assert!(cancel.load(Ordering::SeqCst));
    assert!(!controller.is_streaming());
    assert_eq!(controller.conversation().id, earlier_id);

    let abandoned = SessionStore::load(Arc::clone(&backend))
        .get(&streaming_id)
        .expect("abandoned conversation should be stored");
    assert_eq!(
        abandoned.messages[1].text,
        format!("half an answer\n\n{ABANDONED_REASON}")
    );
    assert!(abandoned.messages[1].failed);

    let before = controller.conversation().clone();
    assert_eq!(
        controller.apply_event(GenerationEvent::Chunk {
            request_id,
            text: " late".to_string(),
        }),
        TurnUpdate::Ignored
    );
    assert_eq!(
        controller.apply_event(GenerationEvent::Finished { request_id }),
        TurnUpdate::Ignored
    );
    assert_eq!(controller.conversation(), &before);
}

#[test]
fn new_conversation_abandons_an_empty_reply() {
    let backend = memory_backend();
    let mut controller = controller_with(&backend, mock(&["unused"]));

    controller
        .begin_turn("hello", Vec::new(), cancel_signal())
        .expect("turn should start");
    let streaming_id = controller.conversation().id.clone();

    controller.new_conversation();

    assert!(controller.conversation().messages.is_empty());
    assert_ne!(controller.conversation().id, streaming_id);

    let store = SessionStore::load(Arc::clone(&backend));
    assert_eq!(store.active(), None);
    let abandoned = store
        .get(&streaming_id)
        .expect("abandoned conversation should be stored");
    assert_eq!(abandoned.messages[1].text, ABANDONED_REASON);
}

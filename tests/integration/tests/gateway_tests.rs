//! End-to-end gateway tests over a loopback socket
//!
//! Each test stands up a `TestNode`, drives a real `Gateway` session
//! against it, and asserts on the store and the events that reach
//! listeners. REST traffic goes through `MockTransport`, so every
//! network-shaped path runs without leaving the process.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use ampere_cache::Store;
use ampere_core::{MessageAuthor, Ulid};
use ampere_gateway::{Event, EventDispatcher, Gateway, GatewayError, GatewayOptions, GatewayState};

use integration_tests::fixtures::{
    channel_update_frame, member, member_join_frame, member_leave_frame, message,
    message_delete_frame, message_frame, message_update_frame, ready_frame, server, text_channel,
    user,
};
use integration_tests::helpers::{MockTransport, TestNode};

const WAIT: Duration = Duration::from_secs(5);

fn id(n: u128) -> Ulid {
    Ulid::from_u128(n)
}

/// Two users, one server, one text channel, both users members
fn standard_ready() -> serde_json::Value {
    ready_frame(
        &[user(1, "ada"), user(2, "grace")],
        &[server(20, 1, &[30])],
        &[text_channel(30, 20, "general")],
        &[member(20, 1), member(20, 2)],
    )
}

/// A gateway session running against a loopback node
struct Session {
    store: Arc<Store>,
    dispatcher: Arc<EventDispatcher>,
    gateway: Arc<Gateway>,
    driver: JoinHandle<Result<(), GatewayError>>,
}

impl Session {
    fn start(node: &TestNode, transport: MockTransport, message_limit: usize) -> Self {
        Self::start_with(node, transport, message_limit, Duration::from_secs(30))
    }

    fn start_with(
        node: &TestNode,
        transport: MockTransport,
        message_limit: usize,
        heartbeat: Duration,
    ) -> Self {
        let store = Arc::new(Store::new(Arc::new(transport.clone()), message_limit));
        let dispatcher = Arc::new(EventDispatcher::new());
        let gateway = Arc::new(Gateway::new(
            "token",
            Arc::new(transport),
            store.clone(),
            dispatcher.clone(),
            GatewayOptions {
                url: Some(node.url.clone()),
                heartbeat,
                lanes: 4,
            },
        ));
        let driver = tokio::spawn({
            let gateway = gateway.clone();
            async move { gateway.run().await }
        });
        Self {
            store,
            dispatcher,
            gateway,
            driver,
        }
    }

    async fn wait_live(&self) {
        let mut states = self.gateway.subscribe_state();
        let live = async {
            while *states.borrow_and_update() != GatewayState::Live {
                states.changed().await.expect("gateway dropped");
            }
        };
        tokio::time::timeout(WAIT, live)
            .await
            .expect("session never went live");
    }

    async fn shutdown(self) {
        self.gateway.stop();
        let outcome = tokio::time::timeout(WAIT, self.driver)
            .await
            .expect("session never stopped")
            .expect("session task panicked");
        assert!(outcome.is_ok(), "session ended with {outcome:?}");
    }
}

/// Forward every dispatch of one event into a channel the test can await
fn capture(dispatcher: &EventDispatcher, event: &str) -> mpsc::UnboundedReceiver<Event> {
    let (tx, rx) = mpsc::unbounded_channel();
    dispatcher.on(event, move |event| {
        let tx = tx.clone();
        async move {
            let _ = tx.send(event);
            Ok(())
        }
    });
    rx
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<Event>) -> Event {
    tokio::time::timeout(WAIT, rx.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("dispatcher dropped")
}

/// Poll the node until the client has sent `count` frames with the tag
async fn wait_for_sent(node: &TestNode, tag: &str, count: usize) {
    let reached = async {
        loop {
            if node.sent_tags().iter().filter(|t| *t == tag).count() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    };
    tokio::time::timeout(WAIT, reached)
        .await
        .unwrap_or_else(|_| panic!("client never sent {count} {tag} frame(s)"));
}

// ============================================================================
// Session lifecycle
// ============================================================================

#[tokio::test]
async fn test_session_goes_live_and_stops_cleanly() {
    let node = TestNode::start().await;
    let session = Session::start(&node, MockTransport::default(), 100);
    let mut ready = capture(&session.dispatcher, "ready");

    node.send(standard_ready());
    assert!(matches!(next_event(&mut ready).await, Event::Ready));
    assert_eq!(session.gateway.state(), GatewayState::Live);

    // The snapshot landed before the ready event fired.
    assert_eq!(session.store.user_count(), 2);
    assert_eq!(session.store.server_count(), 1);
    assert_eq!(session.store.channel_count(), 1);
    assert!(session.store.get_member(id(20), id(2)).is_ok());

    let tags = node.sent_tags();
    assert_eq!(tags.first().map(String::as_str), Some("Authenticate"));

    session.gateway.stop();
    let outcome = tokio::time::timeout(WAIT, session.driver)
        .await
        .expect("session never stopped")
        .expect("session task panicked");
    assert!(outcome.is_ok());
    assert_eq!(session.gateway.state(), GatewayState::Disconnected);
}

#[tokio::test]
async fn test_rejected_session_surfaces_a_typed_error() {
    let node = TestNode::start_rejecting().await;
    let transport = MockTransport::default();
    let store = Arc::new(Store::new(Arc::new(transport.clone()), 100));
    let dispatcher = Arc::new(EventDispatcher::new());
    let gateway = Gateway::new(
        "bad-token",
        Arc::new(transport),
        store,
        dispatcher,
        GatewayOptions {
            url: Some(node.url.clone()),
            ..Default::default()
        },
    );

    let err = tokio::time::timeout(WAIT, gateway.run())
        .await
        .expect("run never returned")
        .unwrap_err();

    assert!(matches!(err, GatewayError::Rejected(_)));
    assert_eq!(err.code(), "SESSION_REJECTED");
    assert_eq!(gateway.state(), GatewayState::Disconnected);
}

#[tokio::test]
async fn test_heartbeat_pings_flow_to_the_node() {
    let node = TestNode::start().await;
    let session = Session::start_with(
        &node,
        MockTransport::default(),
        100,
        Duration::from_millis(50),
    );

    node.send(standard_ready());
    session.wait_live().await;

    wait_for_sent(&node, "Ping", 2).await;
    session.shutdown().await;
}

// ============================================================================
// Frame handling
// ============================================================================

#[tokio::test]
async fn test_message_lifecycle_resolves_member_author() {
    let node = TestNode::start().await;
    let transport = MockTransport::default();
    let session = Session::start(&node, transport.clone(), 100);
    session.store.set_self_id(id(1));

    let mut created = capture(&session.dispatcher, "message");
    let mut updated = capture(&session.dispatcher, "message_update");
    let mut deleted = capture(&session.dispatcher, "message_delete");

    node.send(standard_ready());
    session.wait_live().await;

    node.send(message_frame(&message(40, 30, 2, "hello")));
    let Event::Message(cached) = next_event(&mut created).await else {
        panic!("expected a message event");
    };
    {
        let message = cached.read();
        assert_eq!(message.content, "hello");
        assert_eq!(message.channel_id, id(30));
        match &message.author {
            MessageAuthor::Member(member) => {
                let member = member.read();
                assert_eq!(member.server_id, id(20));
                assert_eq!(member.user_id, id(2));
                assert_eq!(member.display_name(), "grace");
            }
            other => panic!("author resolved to {other:?}"),
        }
    }

    node.send(message_update_frame(40, 30, "hello, world"));
    let Event::MessageUpdate { old, message } = next_event(&mut updated).await else {
        panic!("expected a message_update event");
    };
    assert_eq!(old.content, "hello");
    assert_eq!(message.read().content, "hello, world");

    node.send(message_delete_frame(40, 30));
    let Event::MessageDelete { message } = next_event(&mut deleted).await else {
        panic!("expected a message_delete event");
    };
    // The orphan stays readable after eviction.
    assert_eq!(message.read().content, "hello, world");
    assert!(session.store.get_message(id(40)).is_err());
    assert_eq!(session.store.message_count(), 0);

    // Everything resolved from the snapshot; no REST traffic.
    assert_eq!(transport.user_calls.load(Ordering::SeqCst), 0);
    assert_eq!(transport.server_calls.load(Ordering::SeqCst), 0);
    assert_eq!(transport.channel_calls.load(Ordering::SeqCst), 0);

    session.shutdown().await;
}

#[tokio::test]
async fn test_self_leave_removes_the_server_without_member_leave() {
    let node = TestNode::start().await;
    let session = Session::start(&node, MockTransport::default(), 100);
    session.store.set_self_id(id(1));

    let mut removed = capture(&session.dispatcher, "server_removed");
    let mut left = capture(&session.dispatcher, "member_leave");

    node.send(standard_ready());
    session.wait_live().await;

    node.send(member_leave_frame(20, 1));
    let Event::ServerRemoved { server } = next_event(&mut removed).await else {
        panic!("expected a server_removed event");
    };
    assert_eq!(server.read().id, id(20));
    assert!(left.try_recv().is_err());

    // The whole graph went with the server.
    assert!(session.store.get_server(id(20)).is_err());
    assert!(session.store.get_channel(id(30)).is_err());
    assert!(session.store.get_member(id(20), id(2)).is_err());

    session.shutdown().await;
}

#[tokio::test]
async fn test_member_join_pulls_the_user_over_rest() {
    let node = TestNode::start().await;
    let transport = MockTransport::default();
    transport.put_user(user(3, "lin"));
    let session = Session::start(&node, transport.clone(), 100);
    session.store.set_self_id(id(1));

    let mut joined = capture(&session.dispatcher, "member_join");

    node.send(standard_ready());
    session.wait_live().await;

    node.send(member_join_frame(20, 3));
    let Event::MemberJoin(joined_member) = next_event(&mut joined).await else {
        panic!("expected a member_join event");
    };
    {
        let member = joined_member.read();
        assert_eq!(member.server_id, id(20));
        assert_eq!(member.user_id, id(3));
        assert_eq!(member.display_name(), "lin");
    }

    // The server was already cached; only the user needed a fetch.
    assert_eq!(transport.user_calls.load(Ordering::SeqCst), 1);
    assert_eq!(transport.server_calls.load(Ordering::SeqCst), 0);
    assert!(session.store.get_user(id(3)).is_ok());

    session.shutdown().await;
}

#[tokio::test]
async fn test_channel_rename_carries_both_snapshots() {
    let node = TestNode::start().await;
    let session = Session::start(&node, MockTransport::default(), 100);

    let mut renamed = capture(&session.dispatcher, "channel_update");

    node.send(standard_ready());
    session.wait_live().await;

    node.send(channel_update_frame(30, json!({ "name": "war-room" }), &[]));
    let Event::ChannelUpdate { old, channel } = next_event(&mut renamed).await else {
        panic!("expected a channel_update event");
    };
    assert_eq!(old.name.as_deref(), Some("general"));
    assert_eq!(channel.read().name.as_deref(), Some("war-room"));

    session.shutdown().await;
}

// ============================================================================
// Ordering and bounds
// ============================================================================

#[tokio::test]
async fn test_back_to_back_frames_apply_in_submission_order() {
    let node = TestNode::start().await;
    let session = Session::start(&node, MockTransport::default(), 100);

    let mut created = capture(&session.dispatcher, "message");
    let mut updated = capture(&session.dispatcher, "message_update");

    node.send(standard_ready());
    session.wait_live().await;

    // No waiting between frames: the create and every edit race down
    // the same socket and must still land in submission order.
    node.send(message_frame(&message(40, 30, 2, "draft")));
    for revision in 1..=5 {
        node.send(message_update_frame(40, 30, &format!("revision {revision}")));
    }

    assert!(matches!(next_event(&mut created).await, Event::Message(_)));
    let mut history = Vec::new();
    for _ in 0..5 {
        let Event::MessageUpdate { old, .. } = next_event(&mut updated).await else {
            panic!("expected a message_update event");
        };
        history.push(old.content);
    }
    assert_eq!(
        history,
        ["draft", "revision 1", "revision 2", "revision 3", "revision 4"]
    );
    assert_eq!(
        session.store.get_message(id(40)).unwrap().read().content,
        "revision 5"
    );

    session.shutdown().await;
}

#[tokio::test]
async fn test_message_cache_keeps_newest_at_limit() {
    let node = TestNode::start().await;
    let session = Session::start(&node, MockTransport::default(), 3);

    let mut created = capture(&session.dispatcher, "message");

    node.send(standard_ready());
    session.wait_live().await;

    for n in 41..=45 {
        node.send(message_frame(&message(n, 30, 2, &format!("note {n}"))));
    }
    for _ in 0..5 {
        next_event(&mut created).await;
    }

    assert_eq!(session.store.message_count(), 3);
    assert!(session.store.get_message(id(41)).is_err());
    assert!(session.store.get_message(id(42)).is_err());
    for n in 43..=45 {
        assert!(session.store.get_message(id(n)).is_ok());
    }

    session.shutdown().await;
}

// ============================================================================
// Outbound frames
// ============================================================================

#[tokio::test]
async fn test_typing_indicators_reach_the_wire() {
    let node = TestNode::start().await;
    let session = Session::start(&node, MockTransport::default(), 100);

    node.send(standard_ready());
    session.wait_live().await;

    session.gateway.begin_typing(id(30)).await.unwrap();
    wait_for_sent(&node, "BeginTyping", 1).await;

    session.gateway.end_typing(id(30)).await.unwrap();
    wait_for_sent(&node, "EndTyping", 1).await;

    session.shutdown().await;
}

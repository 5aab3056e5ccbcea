use confab_core::{Address, PeerId, SignalKind, SignalMessage, SignalPayload, Topology};
use confab_room::{LinkState, RelayEvent};

use crate::integration::init_tracing;
use crate::utils::{Harness, TransportCall, ready_from};

#[tokio::test]
async fn test_late_answer_after_departure_is_discarded() {
    init_tracing();

    let host_id = PeerId::new();
    let student = PeerId::new();
    let mut host = Harness::new(Topology::HubSpoke, host_id, &[host_id]);

    let _ = host.relay(RelayEvent::MemberJoined(student)).await;
    let _ = host.deliver(&ready_from(student)).await;
    assert_eq!(host.link(&student).unwrap().state, LinkState::Offering);

    host.complete_next_step().await;
    assert_eq!(host.channel.messages_of(SignalKind::Offer).await.len(), 1);

    let _ = host.relay(RelayEvent::MemberRemoved(student)).await;
    assert!(host.link(&student).is_none());
    assert_eq!(host.observer.detached(&student).await, 1);

    let answer = SignalMessage::new(
        student,
        Address::Peer(host_id),
        SignalPayload::Answer { sdp: "late".into() },
    );
    let _ = host.deliver(&answer).await;

    assert!(host.orchestrator.table().is_empty());
    let transport = host.factory.transports_for(&student).await.remove(0);
    let calls = transport.calls().await;
    assert!(calls.contains(&TransportCall::Close));
    assert!(!calls.iter().any(|c| matches!(c, TransportCall::SetRemote(_))));
}

#[tokio::test]
async fn test_step_finishing_after_departure_is_dropped() {
    init_tracing();

    let host_id = PeerId::new();
    let student = PeerId::new();
    let mut host = Harness::new(Topology::HubSpoke, host_id, &[host_id]);

    let _ = host.relay(RelayEvent::MemberJoined(student)).await;
    let _ = host.deliver(&ready_from(student)).await;

    // Leave while the offer is still being produced.
    let _ = host.relay(RelayEvent::MemberRemoved(student)).await;
    let outcome = host.next_step().await;
    assert!(outcome.is_ok());
    host.feed_step(outcome).await;

    assert!(host.orchestrator.table().is_empty());
    assert!(host.channel.messages_of(SignalKind::Offer).await.is_empty());
    let transport = host.factory.transports_for(&student).await.remove(0);
    assert!(transport.is_closed().await);
}

use confab_core::{
    Address, IceCandidate, PeerId, SignalKind, SignalMessage, SignalPayload, Topology,
};
use confab_room::{LinkState, RelayEvent};

use crate::integration::init_tracing;
use crate::utils::{Harness, MockTransportFactory, ready_from};

#[tokio::test]
async fn test_failed_offer_dispatch_is_a_warning() {
    init_tracing();

    let host_id = PeerId::new();
    let student = PeerId::new();
    let mut host = Harness::new(Topology::HubSpoke, host_id, &[host_id]);

    let _ = host.relay(RelayEvent::MemberJoined(student)).await;
    let _ = host.deliver(&ready_from(student)).await;

    host.channel.fail_triggers(true);
    host.complete_next_step().await;

    let link = host.link(&student).expect("link must survive a relay failure");
    assert_eq!(link.state, LinkState::Offering);
    assert!(link.has_transport);

    let warnings = host.observer.warnings().await;
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("client-offer"), "{}", warnings[0]);
    assert!(host.observer.failures().await.is_empty());
}

#[tokio::test]
async fn test_failed_answer_dispatch_stops_holding_candidates() {
    init_tracing();

    let host_id = PeerId::new();
    let me = PeerId::new();
    let mut student = Harness::with_factory(
        Topology::HubSpoke,
        me,
        &[host_id, me],
        MockTransportFactory::new().with_candidates(2),
    );

    let offer = SignalMessage::new(
        host_id,
        Address::Peer(me),
        SignalPayload::Offer { sdp: "offer".into() },
    );
    let _ = student.deliver(&offer).await;

    // Gathered candidates reach the loop before the answer is ready to go.
    let outcome = student.next_step().await;
    student.pump().await;
    student.channel.fail_triggers(true);
    student.feed_step(outcome).await;

    let link = student.link(&host_id).unwrap();
    assert_eq!(link.state, LinkState::Connected);
    let warnings = student.observer.warnings().await;
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("client-answer"), "{}", warnings[0]);

    student.channel.fail_triggers(false);
    let transport = student.factory.transports_for(&host_id).await.remove(0);
    transport.sink().candidate(IceCandidate::new("late")).await;
    student.pump().await;

    let sent = student.channel.messages_of(SignalKind::IceCandidate).await;
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].payload,
        SignalPayload::IceCandidate(IceCandidate::new("late"))
    );
}

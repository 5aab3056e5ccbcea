use confab_core::Topology;
use confab_room::RelayEvent;

use crate::integration::init_tracing;
use crate::utils::{Cluster, TransportCall};

#[tokio::test]
async fn test_duplicate_leave_notifications() {
    init_tracing();

    let mut cluster = Cluster::new(Topology::HubSpoke);
    let host = cluster.join().await;
    let student = cluster.join().await;
    cluster.run_until_idle().await;
    assert!(cluster.get(&host).link(&student).is_some());

    let harness = cluster.members.iter_mut().find(|h| h.me == host).unwrap();
    let _ = harness.relay(RelayEvent::MemberRemoved(student)).await;
    let once = harness.orchestrator.links();
    let _ = harness.relay(RelayEvent::MemberRemoved(student)).await;
    let twice = harness.orchestrator.links();

    assert!(once.is_empty());
    assert_eq!(once, twice);
    assert_eq!(harness.observer.detached(&student).await, 1);

    let transport = harness.factory.transports_for(&student).await.remove(0);
    let closes = transport
        .calls()
        .await
        .iter()
        .filter(|c| **c == TransportCall::Close)
        .count();
    assert_eq!(closes, 1);
}

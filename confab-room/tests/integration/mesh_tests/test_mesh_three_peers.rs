use confab_core::{LinkRole, Topology};
use confab_room::LinkState;

use crate::integration::init_tracing;
use crate::utils::{Cluster, MockTransportFactory};

#[tokio::test]
async fn test_every_pair_negotiates_once() {
    init_tracing();

    let factory = MockTransportFactory::new();
    let mut cluster = Cluster::with_factory(Topology::Mesh, factory.clone());
    let first = cluster.join().await;
    let second = cluster.join().await;
    let third = cluster.join().await;
    cluster.run_until_idle().await;

    for harness in &cluster.members {
        let links = harness.orchestrator.links();
        assert_eq!(links.len(), 2);
        assert!(links.iter().all(|l| l.state == LinkState::Connected));
    }
    assert_eq!(factory.offers_created().await, 3);

    // The earlier joiner of each pair offers.
    assert_eq!(cluster.get(&first).link(&second).unwrap().role, LinkRole::Initiator);
    assert_eq!(cluster.get(&first).link(&third).unwrap().role, LinkRole::Initiator);
    assert_eq!(cluster.get(&second).link(&third).unwrap().role, LinkRole::Initiator);
    assert_eq!(cluster.get(&third).link(&first).unwrap().role, LinkRole::Responder);
}

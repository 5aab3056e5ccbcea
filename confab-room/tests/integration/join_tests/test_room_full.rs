use confab_core::{RoomName, Topology};
use confab_room::{MemoryRelay, NoopObserver, RoomError, join_room};
use std::sync::Arc;

use crate::integration::{config, init_tracing, join};
use crate::utils::{MockMediaSource, MockTransportFactory, ROOM};

#[tokio::test]
async fn test_third_participant_is_turned_away() {
    init_tracing();

    let relay = MemoryRelay::new();
    let factory = MockTransportFactory::new();
    let a = join(
        &relay,
        config("ada", Topology::Mesh).with_capacity(2),
        &factory,
        Arc::new(NoopObserver),
    )
    .await;
    let b = join(
        &relay,
        config("bob", Topology::Mesh).with_capacity(2),
        &factory,
        Arc::new(NoopObserver),
    )
    .await;

    let result = join_room(
        config("cyd", Topology::Mesh).with_capacity(2),
        &relay,
        &MockMediaSource::new(),
        Arc::new(factory.clone()),
        Arc::new(NoopObserver),
    )
    .await;

    match result {
        Err(RoomError::RoomFull {
            capacity, count, ..
        }) => {
            assert_eq!(capacity, 2);
            assert_eq!(count, 3);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("third participant joined a full room"),
    }
    assert_eq!(relay.members(&RoomName::from(ROOM)), vec![a.me(), b.me()]);

    a.leave().await.unwrap();
    b.leave().await.unwrap();
}

//! Integration tests for replacing the native router

mod common;

use std::sync::Arc;

use common::*;
use navroute_router::{GetRouteSignature, NativeRouterClient, RouteRefreshRequestData, RouterFailureType};
use tokio_test::assert_ok;

fn same_client(a: &Arc<dyn NativeRouterClient>, b: &Arc<MockRouterClient>) -> bool {
    Arc::as_ptr(a) as *const u8 == Arc::as_ptr(b) as *const u8
}

#[tokio::test]
async fn test_reset_router_swaps_slot() {
    init_tracing();
    let first = MockRouterClient::deferred();
    let second = MockRouterClient::deferred();
    let handle = start_registry(first.clone());
    assert!(same_client(&handle.router(), &first));

    assert_ok!(handle.reset_router(second.clone()).await);

    assert!(same_client(&handle.router(), &second));
    assert_eq!(first.cancel_all_calls(), 1);
    assert_eq!(second.cancel_all_calls(), 0);
}

#[tokio::test]
async fn test_late_response_from_replaced_router() {
    init_tracing();
    let first = MockRouterClient::deferred();
    let second = MockRouterClient::deferred();
    let handle = start_registry(first.clone());
    let (callback, mut events) = route_callback();

    let id = handle
        .get_route(route_options(), GetRouteSignature::default(), callback)
        .await;
    assert_ok!(handle.reset_router(second.clone()).await);
    assert_eq!(assert_ok!(handle.pending_counts().await).routes, 1);

    first.complete_route(id, Ok(directions_body(&new_uuid())));

    match next_event(&mut events).await {
        RouteEvent::Failure(failures) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].failure_type, RouterFailureType::RouterRecreationError);
            assert!(failures[0].is_retryable);
        }
        other => panic!("unexpected event: {:?}", other),
    }
    assert_eq!(assert_ok!(handle.pending_counts().await).routes, 0);
}

#[tokio::test]
async fn test_late_refresh_from_replaced_router() {
    init_tracing();
    let first = MockRouterClient::deferred();
    let second = MockRouterClient::deferred();
    let handle = start_registry(first.clone());
    let (callback, mut events) = refresh_callback();
    let route = parsed_route(&new_uuid());

    let id = handle
        .get_route_refresh(&route, RouteRefreshRequestData::default(), callback)
        .await;
    assert_ok!(handle.reset_router(second.clone()).await);

    first.complete_refresh(id, Ok(refresh_body(60)));

    match next_event(&mut events).await {
        RefreshEvent::Failure(error) => {
            let failure = error.failure.unwrap();
            assert_eq!(failure.failure_type, RouterFailureType::RouterRecreationError);
            assert!(failure.is_retryable);
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn test_reused_id_cancels_displaced_request() {
    init_tracing();
    let first = MockRouterClient::deferred();
    let second = MockRouterClient::deferred();
    let handle = start_registry(first.clone());
    let (old_callback, mut old_events) = route_callback();
    let (new_callback, mut new_events) = route_callback();

    let old_id = handle
        .get_route(route_options(), GetRouteSignature::default(), old_callback)
        .await;
    assert_ok!(handle.reset_router(second.clone()).await);
    let new_id = handle
        .get_route(route_options(), GetRouteSignature::default(), new_callback)
        .await;
    assert_eq!(old_id, new_id);

    assert!(matches!(next_event(&mut old_events).await, RouteEvent::Canceled(_)));
    assert_eq!(assert_ok!(handle.pending_counts().await).routes, 1);

    // The old router no longer owns the entry
    first.complete_route(old_id, Ok(directions_body(&new_uuid())));
    assert_no_event(&mut old_events).await;
    assert_no_event(&mut new_events).await;

    second.complete_route(new_id, Ok(directions_body(&new_uuid())));
    assert!(matches!(next_event(&mut new_events).await, RouteEvent::Ready(..)));
    assert_no_event(&mut old_events).await;
}

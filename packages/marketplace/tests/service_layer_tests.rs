//! Integration tests for the remote-call wrapper.
//!
//! One remote invocation per operation (three for the status listing), no
//! retries, and every failure wrapped with its domain and operation.

mod common;

use std::sync::Arc;

use crate::common::{init_tracing, tutoring, web_development};
use marketplace_core::common::{FailureKind, Operation, RemoteError, Status};
use marketplace_core::domains::service_types::{ServiceTypes, ServiceTypesService};
use marketplace_core::domains::moderation::{Domain, EntityService};
use marketplace_core::kernel::{InMemoryRuntime, ZomeFunctions};

fn setup() -> (Arc<InMemoryRuntime>, ServiceTypesService) {
    init_tracing();
    let runtime = Arc::new(InMemoryRuntime::marketplace());
    let service = ServiceTypesService::new(runtime.clone());
    (runtime, service)
}

#[tokio::test]
async fn each_operation_is_one_remote_call() {
    let (runtime, service) = setup();

    let created = service.create(&web_development()).await.unwrap();
    assert_eq!(runtime.calls().len(), 1);
    assert_eq!(runtime.calls()[0].zome, "service_types");
    assert_eq!(runtime.calls()[0].fn_name, "create_service_type");

    let original = created.action_hash;
    service.get(&original).await.unwrap();
    service.get_latest(&original).await.unwrap();
    service
        .update(&original, &original, &tutoring())
        .await
        .unwrap();
    service.reject(&original).await.unwrap();
    service.approve(&original).await.unwrap();
    service.status_history(&original).await.unwrap();
    service.delete(&original).await.unwrap();

    let names: Vec<_> = runtime.calls().into_iter().map(|call| call.fn_name).collect();
    assert_eq!(
        names,
        vec![
            "create_service_type",
            "get_service_type",
            "get_latest_service_type_record",
            "update_service_type",
            "reject_service_type",
            "approve_service_type",
            "get_service_type_status_history",
            "delete_service_type",
        ]
    );
}

#[tokio::test]
async fn list_by_status_issues_three_calls() {
    let (runtime, service) = setup();
    service.create(&web_development()).await.unwrap();
    service.suggest(&tutoring()).await.unwrap();
    runtime.clear_calls();

    let partitions = service.list_by_status().await.unwrap();

    assert_eq!(partitions.approved.len(), 1);
    assert_eq!(partitions.pending.len(), 1);
    assert!(partitions.rejected.is_empty());
    assert_eq!(runtime.calls().len(), 3);
    for status in Status::ALL {
        assert_eq!(
            runtime.call_count(ServiceTypes::functions().list(status)),
            1
        );
    }
}

#[tokio::test]
async fn get_latest_follows_the_update_chain() {
    let (_runtime, service) = setup();
    let created = service.create(&web_development()).await.unwrap();
    let original = created.action_hash;

    let first = service.update(&original, &original, &tutoring()).await.unwrap();
    let second = service
        .update(&original, &first.action_hash, &web_development())
        .await
        .unwrap();

    let latest = service.get_latest(&original).await.unwrap().unwrap();
    assert_eq!(latest.action_hash, second.action_hash);
    assert_eq!(latest.original_action_hash, original);
    assert_eq!(latest.entry, web_development());

    let exact = service.get(&first.action_hash).await.unwrap().unwrap();
    assert_eq!(exact.entry, tutoring());
}

#[tokio::test]
async fn not_connected_is_a_connection_failure() {
    let (runtime, service) = setup();
    runtime.set_connected(false);
    assert!(!service.is_connected());

    let err = service.create(&web_development()).await.unwrap_err();

    assert_eq!(err.domain, "service_type");
    assert_eq!(err.operation, Operation::Create);
    assert_eq!(err.source, RemoteError::NotConnected);
    assert_eq!(err.kind(), FailureKind::Connection);
}

#[tokio::test]
async fn failures_are_not_retried() {
    let (runtime, service) = setup();
    let created = service.create(&web_development()).await.unwrap();
    runtime.fail_next("update_service_type", "source chain head moved");

    let err = service
        .update(&created.action_hash, &created.action_hash, &tutoring())
        .await
        .unwrap_err();

    assert_eq!(err.operation, Operation::Update);
    assert_eq!(err.kind(), FailureKind::Update);
    assert_eq!(
        err.to_string(),
        "service_type: failed to update: Error while calling the update_service_type \
         function of the service_types zome: source chain head moved"
    );
    assert_eq!(runtime.call_count("update_service_type"), 1);
}

#[tokio::test]
async fn remote_validation_failure_is_wrapped() {
    let (_runtime, service) = setup();
    let mut invalid = tutoring();
    invalid.description.clear();

    let err = service.suggest(&invalid).await.unwrap_err();

    assert_eq!(err.kind(), FailureKind::Creation);
    assert!(matches!(err.source, RemoteError::InvalidEntry(_)));
}

#[tokio::test]
async fn undecodable_response_is_a_decode_error() {
    let runtime = Arc::new(InMemoryRuntime::marketplace());
    let writer = ServiceTypesService::new(runtime.clone());
    let created = writer.create(&tutoring()).await.unwrap();

    let mut functions = ZomeFunctions::for_entity("service_type", "service_types");
    functions.get_latest = functions.status_history.clone();
    let misconfigured = EntityService::<ServiceTypes>::with_functions(runtime, functions);

    let err = misconfigured
        .get_latest(&created.action_hash)
        .await
        .unwrap_err();

    assert_eq!(err.operation, Operation::GetLatest);
    assert!(matches!(err.source, RemoteError::Decode(_)));
}

#[tokio::test]
async fn missing_records_are_none() {
    let (_runtime, service) = setup();
    let missing = marketplace_core::common::ActionHash::digest(&[b"nothing here"]);

    assert_eq!(service.get(&missing).await.unwrap(), None);
    assert_eq!(service.get_latest(&missing).await.unwrap(), None);

    let err = service.approve(&missing).await.unwrap_err();
    assert!(matches!(err.source, RemoteError::RecordNotFound(_)));
    assert_eq!(err.kind(), FailureKind::StatusTransition);
}

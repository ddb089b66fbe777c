//! Integration tests for the mediums of exchange store.

mod common;

use crate::common::{euro, pay_it_forward, time_bank, TestHarness};
use marketplace_core::common::{Status, StoreError};
use marketplace_core::domains::mediums_of_exchange::{ExchangeType, MediumOfExchange};

#[tokio::test]
async fn submissions_never_carry_a_resource_spec() {
    let ctx = TestHarness::new();
    let store = ctx.mediums();

    let mut submitted = euro();
    submitted.resource_spec_hrea_id = Some("hrea:resource-spec:1".to_string());
    let entity = store.suggest(submitted).await.unwrap();

    assert_eq!(entity.entry.resource_spec_hrea_id, None);
    let sent = &ctx.runtime.calls()[0].payload;
    assert!(sent["entry"]["resource_spec_hrea_id"].is_null());
    assert_eq!(sent["entry"]["exchange_type"], "currency");
}

#[tokio::test]
async fn code_is_required() {
    let ctx = TestHarness::new();

    let err = ctx
        .mediums()
        .create(MediumOfExchange::new("", "Nameless", ExchangeType::Base))
        .await
        .unwrap_err();

    match err {
        StoreError::Validation { domain, message } => {
            assert_eq!(domain, "medium_of_exchange");
            assert_eq!(message, "MediumOfExchange code cannot be empty");
        }
        other => panic!("expected validation error, got {:?}", other),
    }
    assert!(ctx.runtime.calls().is_empty());
}

#[tokio::test]
async fn moderation_flow_across_domains() {
    let ctx = TestHarness::new();
    let mediums = ctx.mediums();

    let eur = mediums.create(euro()).await.unwrap();
    let pif = mediums.suggest(pay_it_forward()).await.unwrap();
    let time = mediums.suggest(time_bank()).await.unwrap();

    mediums.approve(&pif.original()).await.unwrap();
    mediums.reject(&time.original()).await.unwrap();

    let approved: Vec<_> = mediums.approved().into_iter().map(|m| m.entry.code).collect();
    assert_eq!(approved, vec!["EUR", "PAY_IT_FORWARD"]);
    assert_eq!(mediums.rejected()[0].original(), time.original());
    assert!(mediums.pending().is_empty());
    assert_eq!(mediums.status_of(&eur.original()), Some(Status::Approved));

    // Service types are a separate store on the same runtime
    assert!(ctx.service_types().entities().is_empty());
    assert!(ctx.service_types().get_all_by_status().await.unwrap().is_empty());
}

#[tokio::test]
async fn status_history_is_oldest_first() {
    let ctx = TestHarness::new();
    let store = ctx.mediums();
    let entity = store.suggest(time_bank()).await.unwrap();

    store.approve(&entity.original()).await.unwrap();
    store.reject(&entity.original()).await.unwrap();

    let history = store.status_history(&entity.original()).await.unwrap();
    let statuses: Vec<_> = history.iter().map(|change| change.status).collect();
    assert_eq!(
        statuses,
        vec![Status::Pending, Status::Approved, Status::Rejected]
    );
    assert!(history
        .windows(2)
        .all(|pair| pair[0].changed_at <= pair[1].changed_at));
    assert!(history
        .iter()
        .all(|change| change.changed_by == ctx.runtime.agent()));
}

#[tokio::test]
async fn listing_rebuilds_state_for_a_new_client() {
    let ctx = TestHarness::new();
    let eur = ctx.mediums().create(euro()).await.unwrap();
    let time = ctx.mediums().suggest(time_bank()).await.unwrap();

    let other = ctx.second_client();
    let snapshot = other.mediums().get_all_by_status().await.unwrap();

    assert_eq!(snapshot.approved.len(), 1);
    assert_eq!(snapshot.approved[0].original(), eur.original());
    assert_eq!(snapshot.pending[0].original(), time.original());
    assert_eq!(snapshot.pending[0].entry.exchange_type, ExchangeType::Base);
}

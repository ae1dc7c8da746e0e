use crate::api::FetchError;
use crate::domain::{FilterKey, SortKey};
use crate::errors::SearchError;
use crate::search::{Mode, SearchPhase, ViewState};
use crate::tests::utils::{lead, orchestrator, page, FakeBackend, TestOrchestrator};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Duration;

/// Issues an Austin query, then a Dallas query before the first one answers,
/// and applies replies in arrival order. Returns (seq, applied) per reply.
async fn race(orch: &mut TestOrchestrator) -> Vec<(u64, bool)> {
    let mut inflight = FuturesUnordered::new();

    orch.set_filter(FilterKey::City, "Austin");
    let austin = orch.begin_listing();
    inflight.push(austin.send(orch.api_handle()));

    orch.set_filter(FilterKey::City, "Dallas");
    let dallas = orch.begin_listing();
    inflight.push(dallas.send(orch.api_handle()));

    let mut applied = Vec::new();
    while let Some(reply) = inflight.next().await {
        let seq = reply.seq;
        applied.push((seq, orch.apply_listing(reply).unwrap()));
    }
    applied
}

fn script_race(api: &Arc<FakeBackend>, austin_delay: u64, dallas_delay: u64) {
    api.on_city(
        "Austin",
        Duration::from_millis(austin_delay),
        Ok(page(vec![lead("1 Congress Ave", "Austin", "78701")], 40)),
    );
    api.on_city(
        "Dallas",
        Duration::from_millis(dallas_delay),
        Ok(page(
            vec![
                lead("1 Elm St", "Dallas", "75201"),
                lead("2 Elm St", "Dallas", "75201"),
            ],
            60,
        )),
    );
}

#[tokio::test(start_paused = true)]
async fn slow_stale_reply_does_not_overwrite_newer_results() {
    let api = FakeBackend::new();
    script_race(&api, 300, 50);
    let mut orch = orchestrator(&api);

    let applied = race(&mut orch).await;

    // Dallas lands first and is applied; the late Austin reply is dropped.
    assert_eq!(applied, vec![(2, true), (1, false)]);
    assert_eq!(orch.state().results.len(), 2);
    assert_eq!(orch.state().results[0].text("City"), Some("Dallas".into()));
    assert_eq!(orch.state().total, Some(60));
}

#[tokio::test(start_paused = true)]
async fn early_stale_reply_is_ignored_too() {
    let api = FakeBackend::new();
    script_race(&api, 10, 200);
    let mut orch = orchestrator(&api);

    let applied = race(&mut orch).await;

    assert_eq!(applied, vec![(1, false), (2, true)]);
    assert_eq!(orch.state().total, Some(60));
    // Nothing from Austin ever reached the screen.
    assert!(orch
        .presenter()
        .frames
        .iter()
        .all(|f| f.total != Some(40)));
}

#[tokio::test(start_paused = true)]
async fn listing_shows_page_and_total() {
    let api = FakeBackend::new();
    api.on_city(
        "Tyler",
        Duration::ZERO,
        Ok(page(vec![lead("1 A St", "Tyler", "75701")], 120)),
    );
    let mut orch = orchestrator(&api);
    orch.set_filter(FilterKey::City, "Tyler");
    orch.set_page(2);

    orch.refresh_listing().await.unwrap();

    let state = orch.state();
    assert_eq!(state.mode, Mode::Listing);
    assert_eq!(state.view, ViewState::Results);
    assert_eq!(state.phase, SearchPhase::Results);
    assert!(!state.loading);

    let last = orch.presenter().last();
    assert_eq!(last.page, 2);
    assert_eq!(last.page_count, Some(5));
    assert_eq!(last.total, Some(120));
}

#[tokio::test(start_paused = true)]
async fn page_changes_move_the_offset_and_filter_changes_reset_it() {
    let api = FakeBackend::new();
    let mut orch = orchestrator(&api);

    orch.set_filter(FilterKey::MinValue, "100000");
    orch.set_page(3);
    orch.refresh_listing().await.unwrap();

    orch.set_filter(FilterKey::State, "TX");
    orch.refresh_listing().await.unwrap();

    orch.set_page(2);
    orch.set_sort_selector("est_equity_desc").unwrap();
    orch.refresh_listing().await.unwrap();

    let requests = api.leads_requests();
    assert_eq!(requests.len(), 3);

    assert_eq!(requests[0].offset, 50);
    assert_eq!(requests[0].limit, 25);
    assert_eq!(requests[0].sort_by, None);

    assert_eq!(requests[1].offset, 0);
    assert_eq!(requests[1].filters.len(), 2);

    assert_eq!(requests[2].offset, 0);
    assert_eq!(requests[2].sort_by, Some(SortKey::EstEquityDesc));
}

#[tokio::test(start_paused = true)]
async fn blank_filter_values_are_not_sent() {
    let api = FakeBackend::new();
    let mut orch = orchestrator(&api);

    orch.set_filter(FilterKey::City, "  ");
    orch.set_filter(FilterKey::MinValue, "100000");
    orch.refresh_listing().await.unwrap();

    let request = &api.leads_requests()[0];
    assert_eq!(request.filters.len(), 1);
    assert_eq!(
        request.filters.get(&FilterKey::MinValue).map(String::as_str),
        Some("100000")
    );
}

#[tokio::test(start_paused = true)]
async fn unknown_sort_selector_is_rejected() {
    let api = FakeBackend::new();
    let mut orch = orchestrator(&api);

    let err = orch.set_sort_selector("cheapest_first").unwrap_err();
    assert!(matches!(err, SearchError::Validation(_)));
    assert_eq!(orch.controls().sort(), None);
}

#[tokio::test(start_paused = true)]
async fn listing_error_is_shown() {
    let api = FakeBackend::new();
    api.on_city(
        "Reno",
        Duration::ZERO,
        Err(FetchError::Http {
            status: 500,
            message: "db down".into(),
        }),
    );
    let mut orch = orchestrator(&api);
    orch.set_filter(FilterKey::City, "Reno");

    let err = orch.refresh_listing().await.unwrap_err();

    assert_eq!(
        err,
        SearchError::Http {
            status: 500,
            message: "db down".into()
        }
    );
    assert_eq!(orch.state().phase, SearchPhase::Error);
    assert_eq!(orch.state().error.as_deref(), Some("API Error: 500 - db down"));
    assert!(!orch.state().loading);
}

#[tokio::test(start_paused = true)]
async fn reply_arriving_after_going_home_is_dropped() {
    let api = FakeBackend::new();
    api.on_city(
        "Tyler",
        Duration::from_millis(100),
        Ok(page(vec![lead("1 A St", "Tyler", "75701")], 1)),
    );
    let mut orch = orchestrator(&api);
    orch.set_filter(FilterKey::City, "Tyler");

    let ticket = orch.begin_listing();
    orch.back_to_home();
    let reply = ticket.send(orch.api_handle()).await;

    assert!(!orch.apply_listing(reply).unwrap());
    assert_eq!(orch.state().view, ViewState::Home);
    assert!(orch.state().results.is_empty());
    assert!(orch.controls().inputs().is_empty());
}

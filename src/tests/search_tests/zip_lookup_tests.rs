use crate::api::models::{ScrapeReply, StatusReport};
use crate::api::FetchError;
use crate::errors::SearchError;
use crate::search::{Mode, SearchPhase, ViewState};
use crate::tests::utils::{completed, failed, in_progress, lead, orchestrator, Call, FakeBackend};

#[tokio::test(start_paused = true)]
async fn empty_query_is_rejected_without_backend_calls() {
    let api = FakeBackend::new();
    let mut orch = orchestrator(&api);

    orch.set_query("   ");
    let err = orch.search().await.unwrap_err();

    assert_eq!(err, SearchError::Validation("Please enter a zip code".into()));
    assert!(api.calls().is_empty());
    assert_eq!(orch.state().phase, SearchPhase::Error);
    assert_eq!(orch.state().error.as_deref(), Some("Please enter a zip code"));
    assert_eq!(orch.state().view, ViewState::Home);
}

#[tokio::test(start_paused = true)]
async fn cached_zip_is_fetched_without_polling() {
    let api = FakeBackend::new();
    api.set_status(StatusReport {
        cached: true,
        ..StatusReport::default()
    });
    let rows = vec![
        lead("1 Elm St", "Austin", "78701"),
        lead("2 Oak Ave", "Austin", "78701"),
    ];
    api.push_scrape(Ok(ScrapeReply::Leads(rows.clone())));

    let mut orch = orchestrator(&api);
    orch.set_query(" 78701 ");
    orch.search().await.unwrap();

    assert_eq!(
        api.calls(),
        vec![Call::Status("78701".into()), Call::Scrape("78701".into())]
    );
    assert_eq!(api.progress_calls(), 0);
    assert_eq!(orch.state().results, rows);
    assert_eq!(orch.state().total, Some(2));
    assert_eq!(orch.state().view, ViewState::Results);
    assert_eq!(orch.state().mode, Mode::ZipLookup);
    assert!(!orch.state().loading);
    assert_eq!(
        orch.presenter().phases(),
        vec![
            SearchPhase::CheckingStatus,
            SearchPhase::FetchingCached,
            SearchPhase::Results
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn running_scrape_is_followed_without_starting_another() {
    let api = FakeBackend::new();
    api.set_status(StatusReport {
        is_scraping: true,
        scraping_progress: Some("Page 2 of 9".into()),
        ..StatusReport::default()
    });
    api.push_progress(Ok(in_progress("Page 3 of 9")));
    api.push_progress(Ok(completed(vec![lead("5 Pine Rd", "Waco", "76701")])));

    let mut orch = orchestrator(&api);
    orch.set_query("76701");
    orch.search().await.unwrap();

    assert_eq!(api.scrape_calls(), 0);
    assert_eq!(api.progress_calls(), 2);
    assert_eq!(orch.state().results.len(), 1);
    assert_eq!(
        orch.presenter().progress_messages(),
        vec!["Page 2 of 9".to_string(), "Page 3 of 9".to_string()]
    );
    assert_eq!(orch.state().progress, None);
}

#[tokio::test(start_paused = true)]
async fn running_scrape_without_progress_text_gets_a_default_message() {
    let api = FakeBackend::new();
    api.set_status(StatusReport {
        is_scraping: true,
        scraping_progress: Some("  ".into()),
        ..StatusReport::default()
    });
    api.push_progress(Ok(completed(vec![])));

    let mut orch = orchestrator(&api);
    orch.set_query("76701");
    orch.search().await.unwrap();

    assert_eq!(
        orch.presenter().progress_messages(),
        vec!["Scraping in progress...".to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn absent_zip_starts_a_scrape_and_polls_until_complete() {
    let api = FakeBackend::new();
    api.push_scrape(Ok(ScrapeReply::Started));
    api.push_progress(Ok(in_progress("Page 1 of 3")));
    api.push_progress(Ok(in_progress("Page 2 of 3")));
    let rows = vec![
        lead("9 Main St", "Austin", "78702"),
        lead("10 Main St", "Austin", "78702"),
        lead("11 Main St", "Austin", "78702"),
    ];
    api.push_progress(Ok(completed(rows.clone())));

    let mut orch = orchestrator(&api);
    orch.set_query("78702");
    orch.search().await.unwrap();

    assert_eq!(api.status_calls(), 1);
    assert_eq!(api.scrape_calls(), 1);
    assert_eq!(api.progress_calls(), 3);
    assert_eq!(orch.state().results, rows);
    assert_eq!(orch.state().phase, SearchPhase::Results);
    assert_eq!(
        orch.presenter().progress_messages(),
        vec![
            "Scraping leads for 78702...".to_string(),
            "Page 1 of 3".to_string(),
            "Page 2 of 3".to_string(),
        ]
    );
    assert_eq!(
        orch.presenter().phases(),
        vec![
            SearchPhase::CheckingStatus,
            SearchPhase::Scraping,
            SearchPhase::Results
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn scrape_that_returns_rows_directly_skips_polling() {
    let api = FakeBackend::new();
    api.push_scrape(Ok(ScrapeReply::Leads(vec![lead("1 A St", "Tyler", "75701")])));

    let mut orch = orchestrator(&api);
    orch.set_query("75701");
    orch.search().await.unwrap();

    assert_eq!(api.progress_calls(), 0);
    assert_eq!(orch.state().results.len(), 1);
    assert_eq!(orch.state().view, ViewState::Results);
}

#[tokio::test(start_paused = true)]
async fn failed_status_probe_falls_through_to_scrape() {
    let api = FakeBackend::new();
    api.fail_status(FetchError::Network("connection refused".into()));
    api.push_scrape(Ok(ScrapeReply::Leads(vec![lead("1 A St", "Tyler", "75701")])));

    let mut orch = orchestrator(&api);
    orch.set_query("75701");
    orch.search().await.unwrap();

    assert_eq!(api.scrape_calls(), 1);
    assert_eq!(orch.state().error, None);
    assert_eq!(orch.state().results.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn unrecognized_scrape_reply_is_an_error() {
    let api = FakeBackend::new();
    api.push_scrape(Ok(ScrapeReply::Unrecognized("scrape status 'queued'".into())));

    let mut orch = orchestrator(&api);
    orch.set_query("75701");
    let err = orch.search().await.unwrap_err();

    assert!(matches!(err, SearchError::UnexpectedResponse(_)));
    assert_eq!(orch.state().phase, SearchPhase::Error);
    assert!(orch.state().results.is_empty());
    assert!(!orch.state().loading);
}

#[tokio::test(start_paused = true)]
async fn backend_error_message_reaches_the_operator() {
    let api = FakeBackend::new();
    api.push_scrape(Err(FetchError::Http {
        status: 422,
        message: "Invalid zip".into(),
    }));

    let mut orch = orchestrator(&api);
    orch.set_query("00000");
    orch.search().await.unwrap_err();

    assert_eq!(
        orch.state().error.as_deref(),
        Some("API Error: 422 - Invalid zip")
    );
    assert_eq!(
        orch.presenter().last().error.as_deref(),
        Some("API Error: 422 - Invalid zip")
    );
}

#[tokio::test(start_paused = true)]
async fn unreachable_backend_shows_network_error() {
    let api = FakeBackend::new();
    api.push_scrape(Err(FetchError::Network("dns failure".into())));

    let mut orch = orchestrator(&api);
    orch.set_query("75701");
    let err = orch.search().await.unwrap_err();

    assert_eq!(err, SearchError::Network);
    assert_eq!(
        orch.state().error.as_deref(),
        Some("Network error: Unable to reach the API")
    );
}

#[tokio::test(start_paused = true)]
async fn job_error_carries_the_backend_reason() {
    let api = FakeBackend::new();
    api.push_scrape(Ok(ScrapeReply::Started));
    api.push_progress(Ok(in_progress("Page 1 of 4")));
    api.push_progress(Ok(failed("Upstream blocked")));

    let mut orch = orchestrator(&api);
    orch.set_query("75701");
    let err = orch.search().await.unwrap_err();

    assert_eq!(err, SearchError::Job("Upstream blocked".into()));
    assert_eq!(
        orch.state().error.as_deref(),
        Some("Scrape failed: Upstream blocked")
    );
    assert_eq!(orch.state().progress, None);
}

#[tokio::test(start_paused = true)]
async fn failed_poll_stops_the_job() {
    let api = FakeBackend::new();
    api.push_scrape(Ok(ScrapeReply::Started));
    api.push_progress(Err(FetchError::Http {
        status: 503,
        message: "busy".into(),
    }));

    let mut orch = orchestrator(&api);
    orch.set_query("75701");
    let err = orch.search().await.unwrap_err();

    assert!(matches!(err, SearchError::ProgressCheck(_)));
    assert_eq!(api.progress_calls(), 1);
    assert!(orch
        .state()
        .error
        .as_deref()
        .unwrap()
        .starts_with("Error checking scrape progress:"));
}

#[tokio::test(start_paused = true)]
async fn a_new_search_replaces_previous_results() {
    let api = FakeBackend::new();
    api.push_scrape(Ok(ScrapeReply::Leads(vec![
        lead("1 A St", "Tyler", "75701"),
        lead("2 A St", "Tyler", "75701"),
    ])));
    api.push_scrape(Err(FetchError::Http {
        status: 500,
        message: "boom".into(),
    }));
    api.push_scrape(Ok(ScrapeReply::Leads(vec![lead("3 B St", "Waco", "76701")])));

    let mut orch = orchestrator(&api);
    orch.set_query("75701");
    orch.search().await.unwrap();
    assert_eq!(orch.state().results.len(), 2);

    orch.set_query("76701");
    orch.search().await.unwrap_err();
    assert!(orch.state().error.is_some());

    orch.search().await.unwrap();
    assert_eq!(orch.state().results.len(), 1);
    assert_eq!(orch.state().error, None);
}

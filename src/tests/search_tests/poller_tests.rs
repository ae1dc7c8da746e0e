use crate::api::models::{JobState, ProgressReport};
use crate::api::FetchError;
use crate::config::PollerConfig;
use crate::errors::SearchError;
use crate::search::ProgressPoller;
use crate::tests::utils::{completed, failed, in_progress, lead, Call, FakeBackend};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

fn quick_poller(max_attempts: u32) -> ProgressPoller {
    ProgressPoller::new(PollerConfig {
        interval: Duration::from_secs(1),
        max_attempts,
    })
}

#[tokio::test(start_paused = true)]
async fn polls_on_the_interval_until_completed() {
    let api = FakeBackend::new();
    api.push_progress(Ok(in_progress("Page 1 of 3")));
    api.push_progress(Ok(in_progress("Page 2 of 3")));
    api.push_progress(Ok(completed(vec![lead("1 A St", "Tyler", "75701")])));

    let poller = ProgressPoller::default();
    let cancel = CancellationToken::new();
    let mut seen = Vec::new();
    let start = Instant::now();

    let rows = poller
        .run(&*api, "75701", "Starting...".into(), &cancel, |job| {
            seen.push((job.attempts_made, job.last_message.clone()));
        })
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(api.progress_calls(), 3);
    assert_eq!(
        seen,
        vec![
            (0, "Starting...".to_string()),
            (1, "Page 1 of 3".to_string()),
            (2, "Page 2 of 3".to_string()),
        ]
    );

    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(9), "{elapsed:?}");
    assert!(elapsed < Duration::from_secs(10), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn gives_up_after_the_attempt_ceiling() {
    let api = FakeBackend::new();
    api.keep_progress(in_progress("still going"));

    let poller = ProgressPoller::default();
    let cancel = CancellationToken::new();

    let err = poller
        .run(&*api, "75701", "Starting...".into(), &cancel, |_| {})
        .await
        .unwrap_err();

    assert_eq!(err, SearchError::Timeout { attempts: 1000 });
    assert_eq!(api.progress_calls(), 1000);
}

#[tokio::test(start_paused = true)]
async fn completes_on_the_last_allowed_attempt() {
    let api = FakeBackend::new();
    api.push_progress(Ok(in_progress("1")));
    api.push_progress(Ok(in_progress("2")));
    api.push_progress(Ok(completed(vec![])));

    let rows = quick_poller(3)
        .run(&*api, "75701", String::new(), &CancellationToken::new(), |_| {})
        .await
        .unwrap();

    assert!(rows.is_empty());
    assert_eq!(api.progress_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn cancelled_before_first_poll_makes_no_requests() {
    let api = FakeBackend::new();
    api.keep_progress(in_progress("still going"));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = quick_poller(10)
        .run(&*api, "75701", "Starting...".into(), &cancel, |_| {})
        .await
        .unwrap_err();

    assert_eq!(err, SearchError::Cancelled);
    assert_eq!(api.progress_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn cancel_mid_job_stops_polling() {
    let api = FakeBackend::new();
    api.keep_progress(in_progress("still going"));
    let cancel = CancellationToken::new();
    let poller = quick_poller(100);

    let canceller = {
        let cancel = cancel.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(3500)).await;
            cancel.cancel();
        }
    };

    let (result, ()) = tokio::join!(
        poller.run(&*api, "75701", String::new(), &cancel, |_| {}),
        canceller
    );

    assert_eq!(result.unwrap_err(), SearchError::Cancelled);
    assert_eq!(api.progress_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn completed_without_result_yields_no_rows() {
    let api = FakeBackend::new();
    api.push_progress(Ok(ProgressReport {
        status: JobState::Completed,
        message: String::new(),
        result: None,
    }));

    let rows = quick_poller(5)
        .run(&*api, "75701", String::new(), &CancellationToken::new(), |_| {})
        .await
        .unwrap();

    assert!(rows.is_empty());
}

#[tokio::test(start_paused = true)]
async fn job_error_without_message_is_unknown() {
    let api = FakeBackend::new();
    api.push_progress(Ok(in_progress("Page 4 of 9")));
    api.push_progress(Ok(failed("")));

    let err = quick_poller(5)
        .run(&*api, "75701", String::new(), &CancellationToken::new(), |_| {})
        .await
        .unwrap_err();

    assert_eq!(err, SearchError::Job("Unknown error".into()));
}

#[tokio::test(start_paused = true)]
async fn blank_progress_message_keeps_the_previous_one() {
    let api = FakeBackend::new();
    api.push_progress(Ok(in_progress("Page 1 of 2")));
    api.push_progress(Ok(in_progress("   ")));
    api.push_progress(Ok(completed(vec![])));

    let mut seen = Vec::new();
    quick_poller(5)
        .run(&*api, "75701", "Starting...".into(), &CancellationToken::new(), |job| {
            seen.push(job.last_message.clone());
        })
        .await
        .unwrap();

    assert_eq!(seen, vec!["Starting...", "Page 1 of 2", "Page 1 of 2"]);
}

#[tokio::test(start_paused = true)]
async fn unreadable_progress_reply_is_an_unexpected_response() {
    let api = FakeBackend::new();
    api.push_progress(Ok(in_progress("Page 1 of 2")));
    api.push_progress(Err(FetchError::Malformed("unknown variant `queued`".into())));

    let err = quick_poller(5)
        .run(&*api, "75701", String::new(), &CancellationToken::new(), |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::UnexpectedResponse(_)), "{err:?}");
    assert_eq!(api.progress_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn failed_poll_request_is_a_progress_check_error() {
    let api = FakeBackend::new();
    api.push_progress(Err(FetchError::Network("connection reset".into())));

    let err = quick_poller(5)
        .run(&*api, "75701", String::new(), &CancellationToken::new(), |_| {})
        .await
        .unwrap_err();

    assert_eq!(
        err,
        SearchError::ProgressCheck("network error: connection reset".into())
    );
}

#[tokio::test(start_paused = true)]
async fn job_carries_its_zip_key() {
    let api = FakeBackend::new();
    api.push_progress(Ok(in_progress("Page 1 of 2")));
    api.push_progress(Ok(completed(vec![])));

    let mut keys = Vec::new();
    quick_poller(5)
        .run(&*api, "75701", String::new(), &CancellationToken::new(), |job| {
            keys.push(job.key.clone());
        })
        .await
        .unwrap();

    assert_eq!(keys, vec!["75701", "75701"]);
    assert!(api
        .calls()
        .iter()
        .all(|c| *c == Call::Progress("75701".into())));
}

//! Report generator tests with scripted models.
//!
//! Tests verify:
//! - A successful model reply is used wholesale
//! - Every model failure (error, timeout, malformed, cancelled) falls back
//!   to the rule-based report, without retries
//! - The artificial delay applies only to the fallback path
//! - Published state never stays Generating
//! - Cancel and reset issued before a ticketed run still apply

use phantom_shared::report::{synthesize, ReportSource};
use phantom_shared::{ReportData, Session, SessionSnapshot};
use phantomd::model::{ScriptedModel, ScriptedReply};
use phantomd::{ReportGenerator, ReportModel, ReportState};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn demo_snapshot() -> SessionSnapshot {
    let mut session = Session::new();
    session.load_demo();
    session.snapshot()
}

fn model_report() -> ReportData {
    ReportData {
        location: "Head".to_string(),
        quality: "throbbing".to_string(),
        intensity: "Moderate".to_string(),
        recommendation: "Follow up".to_string(),
        summary: "Model summary".to_string(),
    }
}

fn generator(model: Arc<ScriptedModel>, timeout: Duration) -> ReportGenerator {
    let model: Arc<dyn ReportModel> = model;
    ReportGenerator::new(Some(model), timeout, Duration::ZERO)
}

// ============================================================================
// Model path
// ============================================================================

#[tokio::test]
async fn test_model_reply_used_wholesale() {
    let model = Arc::new(ScriptedModel::new(vec![ScriptedReply::Report(model_report())]));
    let generator = generator(Arc::clone(&model), Duration::from_secs(5));

    let generated = generator.generate(&demo_snapshot()).await;
    assert_eq!(generated.source, ReportSource::Model);
    assert_eq!(generated.report, model_report());
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn test_raw_model_text_is_parsed() {
    let raw = "Sure!\n```json\n{\"location\":\"Head\",\"quality\":\"throbbing\",\"intensity\":\"Moderate\",\"recommendation\":\"Follow up\",\"summary\":\"Model summary\"}\n```";
    let model = Arc::new(ScriptedModel::new(vec![ScriptedReply::Raw(raw.to_string())]));
    let generated = generator(model, Duration::from_secs(5))
        .generate(&demo_snapshot())
        .await;
    assert_eq!(generated.source, ReportSource::Model);
    assert_eq!(generated.report, model_report());
}

// ============================================================================
// Fallback path
// ============================================================================

#[tokio::test]
async fn test_model_error_falls_back_without_retry() {
    let model = Arc::new(ScriptedModel::new(vec![
        ScriptedReply::Fail("connection refused".to_string()),
        ScriptedReply::Report(model_report()),
    ]));
    let snapshot = demo_snapshot();
    let generated = generator(Arc::clone(&model), Duration::from_secs(5))
        .generate(&snapshot)
        .await;

    assert_eq!(generated.source, ReportSource::Fallback);
    assert_eq!(generated.report, synthesize(&snapshot));
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn test_model_timeout_falls_back() {
    let model = Arc::new(ScriptedModel::new(vec![ScriptedReply::Hang]));
    let snapshot = demo_snapshot();
    let generated = generator(model, Duration::from_millis(50))
        .generate(&snapshot)
        .await;

    assert_eq!(generated.source, ReportSource::Fallback);
    assert_eq!(generated.report, synthesize(&snapshot));
}

#[tokio::test]
async fn test_malformed_reply_falls_back() {
    let model = Arc::new(ScriptedModel::new(vec![ScriptedReply::Raw(
        "{\"location\": \"Head\"}".to_string(),
    )]));
    let generated = generator(model, Duration::from_secs(5))
        .generate(&demo_snapshot())
        .await;
    assert_eq!(generated.source, ReportSource::Fallback);
}

#[tokio::test]
async fn test_blank_field_falls_back() {
    let mut blank = model_report();
    blank.summary = "   ".to_string();
    let model = Arc::new(ScriptedModel::new(vec![ScriptedReply::Report(blank)]));
    let generated = generator(model, Duration::from_secs(5))
        .generate(&demo_snapshot())
        .await;
    assert_eq!(generated.source, ReportSource::Fallback);
}

#[tokio::test]
async fn test_empty_session_without_model() {
    let generated = ReportGenerator::deterministic()
        .generate(&Session::new().snapshot())
        .await;
    assert_eq!(generated.source, ReportSource::Fallback);
    assert_eq!(generated.report.intensity, "Mild (0%)");
    assert_eq!(generated.report.location, "");
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn test_cancel_falls_back() {
    let model = Arc::new(ScriptedModel::new(vec![ScriptedReply::Hang]));
    let generator = generator(model, Duration::from_secs(30));
    let snapshot = demo_snapshot();

    let task = {
        let generator = generator.clone();
        let snapshot = snapshot.clone();
        tokio::spawn(async move { generator.generate(&snapshot).await })
    };
    tokio::time::sleep(Duration::from_millis(30)).await;
    generator.cancel();

    let generated = tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("cancelled generation should finish promptly")
        .unwrap();
    assert_eq!(generated.source, ReportSource::Fallback);
    assert_eq!(generated.report, synthesize(&snapshot));
    assert!(generator.state().is_ready());
}

#[tokio::test]
async fn test_cancel_between_begin_and_run_skips_model() {
    let model = Arc::new(ScriptedModel::new(vec![ScriptedReply::Hang]));
    let generator = generator(Arc::clone(&model), Duration::from_secs(30));
    let snapshot = demo_snapshot();

    let ticket = generator.begin();
    assert_eq!(generator.state(), ReportState::Generating);
    generator.cancel();

    let generated = tokio::time::timeout(Duration::from_secs(1), generator.run(ticket, &snapshot))
        .await
        .expect("cancel before run should not be lost");
    assert_eq!(generated.source, ReportSource::Fallback);
    assert_eq!(model.calls(), 0);
    assert!(generator.state().is_ready());
}

#[tokio::test]
async fn test_reset_between_begin_and_run_stays_idle() {
    let generator = ReportGenerator::deterministic();
    let snapshot = demo_snapshot();

    let ticket = generator.begin();
    generator.reset();
    let generated = generator.run(ticket, &snapshot).await;
    assert_eq!(generated.report, synthesize(&snapshot));
    assert_eq!(generator.state(), ReportState::Idle);
}

#[tokio::test]
async fn test_dropped_generation_publishes_fallback() {
    let model = Arc::new(ScriptedModel::new(vec![ScriptedReply::Hang]));
    let generator = generator(model, Duration::from_secs(30));
    let snapshot = demo_snapshot();

    let result = tokio::time::timeout(Duration::from_millis(30), generator.generate(&snapshot)).await;
    assert!(result.is_err());

    match generator.state() {
        ReportState::Ready(generated) => {
            assert_eq!(generated.source, ReportSource::Fallback);
            assert_eq!(generated.report, synthesize(&snapshot));
        }
        other => panic!("expected Ready, got {:?}", other),
    }
}

#[tokio::test]
async fn test_reset_during_generation_stays_idle() {
    let model = Arc::new(ScriptedModel::new(vec![ScriptedReply::Hang]));
    let generator = generator(model, Duration::from_secs(30));
    let snapshot = demo_snapshot();

    let task = {
        let generator = generator.clone();
        tokio::spawn(async move { generator.generate(&snapshot).await })
    };
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(generator.state(), ReportState::Generating);

    generator.reset();
    let generated = task.await.unwrap();
    assert_eq!(generated.source, ReportSource::Fallback);
    assert_eq!(generator.state(), ReportState::Idle);
}

// ============================================================================
// Timing and state
// ============================================================================

#[tokio::test]
async fn test_fallback_delay_only_on_fallback_path() {
    let delay = Duration::from_millis(150);

    let model: Arc<dyn ReportModel> =
        Arc::new(ScriptedModel::new(vec![ScriptedReply::Report(model_report())]));
    let with_model = ReportGenerator::new(Some(model), Duration::from_secs(5), delay);
    let start = Instant::now();
    with_model.generate(&demo_snapshot()).await;
    assert!(start.elapsed() < delay);

    let without_model = ReportGenerator::new(None, Duration::from_secs(5), delay);
    let start = Instant::now();
    without_model.generate(&demo_snapshot()).await;
    assert!(start.elapsed() >= delay);
}

#[tokio::test]
async fn test_state_transitions() {
    let model = Arc::new(
        ScriptedModel::new(vec![ScriptedReply::Report(model_report())])
            .with_delay(Duration::from_millis(50)),
    );
    let generator = generator(model, Duration::from_secs(5));
    let mut rx = generator.subscribe();
    assert_eq!(*rx.borrow(), ReportState::Idle);

    let task = {
        let generator = generator.clone();
        tokio::spawn(async move { generator.generate(&demo_snapshot()).await })
    };

    rx.changed().await.unwrap();
    assert_eq!(*rx.borrow_and_update(), ReportState::Generating);

    let generated = task.await.unwrap();
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().report(), Some(&generated));
}

#[tokio::test]
async fn test_generation_is_repeatable() {
    let generator = ReportGenerator::deterministic();
    let snapshot = demo_snapshot();
    let first = generator.generate(&snapshot).await;
    let second = generator.generate(&snapshot).await;
    assert_eq!(first.report, second.report);
}

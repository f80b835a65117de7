//! Report generator: external model first, rule-based report otherwise.
//!
//! The model path is bounded by a timeout and can be cancelled; every
//! failure resolves to `synthesize`. Callers that spawn the work take a
//! `ReportTicket` with `begin` first, so resets and cancels issued before
//! the task runs are not lost. Progress is published on a watch
//! channel as Idle -> Generating -> Ready. A generation that is dropped
//! mid-flight still publishes the rule-based report, so observers never see
//! `Generating` forever.

use crate::model::ReportModel;
use chrono::{DateTime, Utc};
use phantom_shared::report::{synthesize, ReportSource};
use phantom_shared::{ReportData, SessionSnapshot};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

/// A finished report plus where it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedReport {
    pub report: ReportData,
    pub source: ReportSource,
    pub generated_at: DateTime<Utc>,
}

impl GeneratedReport {
    fn new(report: ReportData, source: ReportSource) -> Self {
        Self {
            report,
            source,
            generated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ReportState {
    #[default]
    Idle,
    Generating,
    Ready(GeneratedReport),
}

impl ReportState {
    pub fn is_ready(&self) -> bool {
        matches!(self, ReportState::Ready(_))
    }

    pub fn report(&self) -> Option<&GeneratedReport> {
        match self {
            ReportState::Ready(generated) => Some(generated),
            _ => None,
        }
    }
}

/// Claim on one generation, taken before the work is spawned.
///
/// Carries the reset epoch it belongs to and the cancel count it started
/// from, so a reset or cancel issued between `begin` and `run` still applies.
#[derive(Debug)]
pub struct ReportTicket {
    epoch: u64,
    cancel_base: u64,
    cancel_rx: watch::Receiver<u64>,
}

impl ReportTicket {
    pub fn is_cancelled(&self) -> bool {
        *self.cancel_rx.borrow() != self.cancel_base
    }

    async fn cancelled(&mut self) {
        let base = self.cancel_base;
        let closed = self.cancel_rx.wait_for(|count| *count != base).await.is_err();
        if closed {
            // Generator gone, nothing left to cancel us
            std::future::pending::<()>().await;
        }
    }
}

#[derive(Clone)]
pub struct ReportGenerator {
    model: Option<Arc<dyn ReportModel>>,
    model_timeout: Duration,
    fallback_delay: Duration,
    /// Counts cancels; a ticket is cancelled once this moves past its base
    cancel_tx: Arc<watch::Sender<u64>>,
    /// Bumped by `reset`; stale generations stop publishing
    epoch: Arc<AtomicU64>,
    state_tx: Arc<watch::Sender<ReportState>>,
}

impl ReportGenerator {
    pub fn new(
        model: Option<Arc<dyn ReportModel>>,
        model_timeout: Duration,
        fallback_delay: Duration,
    ) -> Self {
        let (state_tx, _) = watch::channel(ReportState::Idle);
        let (cancel_tx, _) = watch::channel(0);
        Self {
            model,
            model_timeout,
            fallback_delay,
            cancel_tx: Arc::new(cancel_tx),
            epoch: Arc::new(AtomicU64::new(0)),
            state_tx: Arc::new(state_tx),
        }
    }

    /// Rule-based only, no artificial delay
    pub fn deterministic() -> Self {
        Self::new(None, Duration::ZERO, Duration::ZERO)
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<ReportState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> ReportState {
        self.state_tx.borrow().clone()
    }

    /// Abort every generation begun so far; they use the rule-based report
    pub fn cancel(&self) {
        self.cancel_tx.send_modify(|count| *count = count.wrapping_add(1));
    }

    /// Forget any report. In-flight generations finish but do not publish.
    pub fn reset(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.cancel();
        self.state_tx.send_replace(ReportState::Idle);
    }

    /// Start a generation: pin the epoch and publish `Generating` now
    pub fn begin(&self) -> ReportTicket {
        let cancel_rx = self.cancel_tx.subscribe();
        let cancel_base = *cancel_rx.borrow();
        let epoch = self.epoch.load(Ordering::SeqCst);
        self.publish(epoch, ReportState::Generating);
        ReportTicket {
            epoch,
            cancel_base,
            cancel_rx,
        }
    }

    /// Generate a report for `snapshot`
    pub async fn generate(&self, snapshot: &SessionSnapshot) -> GeneratedReport {
        self.run(self.begin(), snapshot).await
    }

    /// Finish the generation claimed by `ticket`
    pub async fn run(
        &self,
        mut ticket: ReportTicket,
        snapshot: &SessionSnapshot,
    ) -> GeneratedReport {
        let epoch = ticket.epoch;
        let mut guard = FallbackGuard {
            generator: self,
            snapshot,
            epoch,
            armed: true,
        };

        let generated = match self.try_model(&mut ticket, snapshot).await {
            Some(report) => GeneratedReport::new(report, ReportSource::Model),
            None => {
                if !self.fallback_delay.is_zero() {
                    tokio::time::sleep(self.fallback_delay).await;
                }
                GeneratedReport::new(synthesize(snapshot), ReportSource::Fallback)
            }
        };

        guard.armed = false;
        self.publish(epoch, ReportState::Ready(generated.clone()));
        info!("Report ready ({})", generated.source);
        generated
    }

    async fn try_model(
        &self,
        ticket: &mut ReportTicket,
        snapshot: &SessionSnapshot,
    ) -> Option<ReportData> {
        let model = self.model.as_ref()?;
        if ticket.is_cancelled() {
            info!("Report generation cancelled before the model call, using rule-based report");
            return None;
        }
        let prompt = snapshot.build_prompt();
        let call = tokio::time::timeout(self.model_timeout, model.generate(&prompt));

        tokio::select! {
            result = call => match result {
                Ok(Ok(report)) => match report.validate() {
                    Ok(()) => Some(report),
                    Err(e) => {
                        warn!("Report model {} returned {}, using rule-based report", model.name(), e);
                        None
                    }
                },
                Ok(Err(e)) => {
                    warn!("Report model {} failed: {}, using rule-based report", model.name(), e);
                    None
                }
                Err(_) => {
                    warn!(
                        "Report model {} timed out after {:?}, using rule-based report",
                        model.name(),
                        self.model_timeout
                    );
                    None
                }
            },
            _ = ticket.cancelled() => {
                info!("Report generation cancelled, using rule-based report");
                None
            }
        }
    }

    /// Publish unless a reset happened since `epoch` was read
    fn publish(&self, epoch: u64, state: ReportState) {
        self.state_tx.send_if_modified(|current| {
            if self.epoch.load(Ordering::SeqCst) != epoch {
                return false;
            }
            *current = state;
            true
        });
    }
}

/// Publishes the rule-based report if `generate` is dropped before finishing
struct FallbackGuard<'a> {
    generator: &'a ReportGenerator,
    snapshot: &'a SessionSnapshot,
    epoch: u64,
    armed: bool,
}

impl Drop for FallbackGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("Report generation abandoned, publishing rule-based report");
            let generated = GeneratedReport::new(synthesize(self.snapshot), ReportSource::Fallback);
            self.generator.publish(self.epoch, ReportState::Ready(generated));
        }
    }
}

//! Tracking sessions
//!
//! A session owns everything live tracking needs for one subject: the
//! position watch, the activity tracker, the emission timer, and the record
//! emitter. Exactly one watch and one timer exist per session, and both are
//! cancelled on every exit path; stopping (or dropping) the handle tears the
//! whole session down and discards the accumulated metrics.

use crate::activity::{ActivityTracker, TimeAttribution};
use crate::emitter::{RecordEmitter, TrackingSink};
use crate::encoder::RecordEncoder;
use crate::error::TrackError;
use crate::health;
use crate::source::PositionSource;
use crate::types::{PositionSample, RecordSource, SessionSummary};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Cadence of automatic record emission
pub const EMIT_INTERVAL: Duration = Duration::from_secs(30);

/// Configuration for one tracking session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub subject_id: String,
    pub source: RecordSource,
    pub emit_interval: Duration,
    pub attribution: TimeAttribution,
}

impl SessionConfig {
    pub fn new(subject_id: impl Into<String>, source: RecordSource) -> Self {
        Self {
            subject_id: subject_id.into(),
            source,
            emit_interval: EMIT_INTERVAL,
            attribution: TimeAttribution::default(),
        }
    }

    pub fn with_emit_interval(mut self, interval: Duration) -> Self {
        self.emit_interval = interval;
        self
    }

    pub fn with_attribution(mut self, attribution: TimeAttribution) -> Self {
        self.attribution = attribution;
        self
    }
}

enum SessionCommand {
    RecordNow,
}

/// Owner handle for a running tracking session.
///
/// Dropping the handle also stops the session: the task observes the closed
/// shutdown channel and tears down its watch and timer.
pub struct SessionHandle {
    session_id: Uuid,
    shutdown: watch::Sender<bool>,
    commands: mpsc::Sender<SessionCommand>,
    task: JoinHandle<Result<SessionSummary, TrackError>>,
}

impl SessionHandle {
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Queue a manual capture of the current position and metrics.
    ///
    /// Returns false once the session has already ended. A session without a
    /// position yet ignores the request, matching the disabled record button
    /// on the tracking surfaces.
    pub async fn record_now(&self) -> bool {
        self.commands.send(SessionCommand::RecordNow).await.is_ok()
    }

    /// Stop tracking and wait for the session to wind down.
    ///
    /// Cancels the position watch and the emission timer, and returns the
    /// final summary (or the position failure that already ended the
    /// session).
    pub async fn stop(self) -> Result<SessionSummary, TrackError> {
        let _ = self.shutdown.send(true);
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(TrackError::Session(e.to_string())),
        }
    }
}

/// Start live tracking for one subject.
pub fn spawn<Src, Snk>(config: SessionConfig, source: Src, sink: Snk) -> SessionHandle
where
    Src: PositionSource + Send + 'static,
    Snk: TrackingSink + Send + 'static,
{
    let session_id = Uuid::new_v4();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (command_tx, command_rx) = mpsc::channel(4);

    let task = tokio::spawn(run(session_id, config, source, sink, shutdown_rx, command_rx));

    SessionHandle {
        session_id,
        shutdown: shutdown_tx,
        commands: command_tx,
        task,
    }
}

async fn run<Src, Snk>(
    session_id: Uuid,
    config: SessionConfig,
    mut source: Src,
    sink: Snk,
    mut shutdown: watch::Receiver<bool>,
    mut commands: mpsc::Receiver<SessionCommand>,
) -> Result<SessionSummary, TrackError>
where
    Src: PositionSource + Send + 'static,
    Snk: TrackingSink + Send + 'static,
{
    let mut tracker = ActivityTracker::with_attribution(config.attribution);
    let encoder = RecordEncoder::new(config.subject_id.clone(), config.source);
    let mut emitter = RecordEmitter::new(sink);

    let mut ticker = tokio::time::interval(config.emit_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // interval fires immediately; the cadence starts one period from now
    ticker.tick().await;

    let mut current: Option<PositionSample> = None;
    let mut commands_open = true;
    let mut samples_seen = 0u64;
    let mut records_emitted = 0u64;

    info!(
        %session_id,
        subject = %config.subject_id,
        source = config.source.as_str(),
        "tracking session started"
    );

    loop {
        tokio::select! {
            // Ok or closed-channel Err both mean the owner is done with us
            _ = shutdown.changed() => break,

            fix = source.next_fix() => match fix {
                Some(Ok(sample)) => {
                    samples_seen += 1;
                    tracker.update(&sample);
                    current = Some(sample);
                }
                Some(Err(kind)) => {
                    warn!(%session_id, error = %kind, "position source failed, stopping tracking");
                    return Err(TrackError::Position(kind));
                }
                None => {
                    debug!(%session_id, "position watch ended");
                    break;
                }
            },

            _ = ticker.tick() => {
                if let Some(position) = current {
                    let record = encoder.auto_record(&position, tracker.metrics());
                    let outcome = emitter.emit(record).await;
                    records_emitted += outcome.delivered;
                }
            }

            command = commands.recv(), if commands_open => match command {
                Some(SessionCommand::RecordNow) => {
                    if let Some(position) = current {
                        let record = encoder.manual_record(&position, tracker.metrics());
                        let outcome = emitter.emit(record).await;
                        records_emitted += outcome.delivered;
                    }
                }
                None => commands_open = false,
            },
        }
    }

    let metrics = tracker.snapshot();
    let health = health::derive_health_label(&metrics);
    let (_sink, parked) = emitter.into_parts();

    info!(
        %session_id,
        samples = samples_seen,
        emitted = records_emitted,
        buffered = parked.len(),
        "tracking session stopped"
    );

    Ok(SessionSummary {
        session_id,
        subject_id: config.subject_id,
        source: config.source,
        samples_seen,
        records_emitted,
        records_buffered: parked.len() as u64,
        metrics,
        health,
    })
}

//! Record emission
//!
//! The emitter wraps a [`TrackingSink`] with the delivery policy the tracking
//! loop relies on: a bounded per-attempt timeout, a short exponential-backoff
//! retry, and a dead-letter buffer so that transient persistence failures
//! never halt tracking and are retried on the next emission.

use crate::error::SinkError;
use crate::types::TrackingRecord;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

/// Attempts per record before it is parked in the dead-letter buffer
pub const MAX_SUBMIT_ATTEMPTS: u32 = 3;

/// Upper bound on a single sink submission
pub const SUBMIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Backoff before the second attempt; doubled for each further attempt
pub const BACKOFF_BASE: Duration = Duration::from_secs(1);

/// Maximum parked records; oldest dropped first when full
pub const DEAD_LETTER_CAPACITY: usize = 32;

/// Destination for tracking records.
///
/// Implementations persist the record and may fan out a notification to the
/// party interested in the subject; both concerns stay behind this trait.
pub trait TrackingSink {
    fn submit(
        &mut self,
        record: &TrackingRecord,
    ) -> impl Future<Output = Result<(), SinkError>> + Send;
}

/// Outcome of one emission pass, including any dead-letter drainage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitOutcome {
    /// Records delivered to the sink during this pass
    pub delivered: u64,
    /// Records left in the dead-letter buffer after this pass
    pub buffered: u64,
}

/// Best-effort record emitter with retry and dead-letter buffering.
#[derive(Debug)]
pub struct RecordEmitter<S: TrackingSink> {
    sink: S,
    dead_letter: VecDeque<TrackingRecord>,
}

impl<S: TrackingSink> RecordEmitter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            dead_letter: VecDeque::new(),
        }
    }

    /// Submit a record, draining previously parked records first.
    ///
    /// Failures are logged, never returned: a record that exhausts its
    /// attempts is parked and retried on the next pass.
    pub async fn emit(&mut self, record: TrackingRecord) -> EmitOutcome {
        let mut delivered = 0u64;

        // One attempt each for parked records; failures go back in order.
        for _ in 0..self.dead_letter.len() {
            let parked = match self.dead_letter.pop_front() {
                Some(r) => r,
                None => break,
            };
            match self.submit_once(&parked).await {
                Ok(()) => {
                    debug!(subject = %parked.subject_id, "delivered parked tracking record");
                    delivered += 1;
                }
                Err(err) => {
                    warn!(subject = %parked.subject_id, %err, "parked record still undeliverable");
                    self.dead_letter.push_back(parked);
                }
            }
        }

        if self.submit_with_retry(&record).await {
            delivered += 1;
        } else {
            self.park(record);
        }

        EmitOutcome {
            delivered,
            buffered: self.dead_letter.len() as u64,
        }
    }

    /// Records currently parked for retry
    pub fn dead_letter_len(&self) -> usize {
        self.dead_letter.len()
    }

    /// Consume the emitter, returning the sink and any undelivered records
    pub fn into_parts(self) -> (S, Vec<TrackingRecord>) {
        (self.sink, self.dead_letter.into())
    }

    async fn submit_with_retry(&mut self, record: &TrackingRecord) -> bool {
        let mut backoff = BACKOFF_BASE;
        for attempt in 1..=MAX_SUBMIT_ATTEMPTS {
            match self.submit_once(record).await {
                Ok(()) => return true,
                Err(err) => {
                    warn!(
                        subject = %record.subject_id,
                        attempt,
                        %err,
                        "tracking record submission failed"
                    );
                    if attempt < MAX_SUBMIT_ATTEMPTS {
                        tokio::time::sleep(backoff).await;
                        backoff *= 2;
                    }
                }
            }
        }
        false
    }

    async fn submit_once(&mut self, record: &TrackingRecord) -> Result<(), SinkError> {
        match tokio::time::timeout(SUBMIT_TIMEOUT, self.sink.submit(record)).await {
            Ok(result) => result,
            Err(_) => Err(SinkError::Timeout),
        }
    }

    fn park(&mut self, record: TrackingRecord) {
        self.dead_letter.push_back(record);
        while self.dead_letter.len() > DEAD_LETTER_CAPACITY {
            self.dead_letter.pop_front();
        }
    }
}

/// In-memory sink for tests and examples.
///
/// Clones share one record store, so a handle kept outside a session can
/// observe what the session delivered.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<TrackingRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything submitted so far
    pub fn records(&self) -> Vec<TrackingRecord> {
        self.records.lock().expect("sink store poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("sink store poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TrackingSink for MemorySink {
    async fn submit(&mut self, record: &TrackingRecord) -> Result<(), SinkError> {
        self.records
            .lock()
            .expect("sink store poisoned")
            .push(record.clone());
        Ok(())
    }
}

//! Position sources
//!
//! A [`PositionSource`] is the engine's inbound boundary: it yields raw
//! position samples asynchronously, reports one of the three recognized
//! failure conditions, or ends. The channel-backed source bridges whatever
//! actually watches a location provider (platform geolocation, a replay file,
//! a test) into a tracking session.

use crate::error::PositionErrorKind;
use crate::types::PositionSample;
use std::future::Future;
use tokio::sync::mpsc;

/// Default buffer depth for the channel-backed source
pub const DEFAULT_CHANNEL_DEPTH: usize = 16;

/// Asynchronous supplier of position samples.
///
/// `None` means the watch ended cleanly; an error stops the session and is
/// surfaced to the operator rather than retried indefinitely.
pub trait PositionSource {
    fn next_fix(
        &mut self,
    ) -> impl Future<Output = Option<Result<PositionSample, PositionErrorKind>>> + Send;
}

/// Create a connected feed/source pair.
///
/// The [`PositionFeed`] side is held by whatever produces samples; dropping
/// it ends the stream, which a session treats as a clean stop.
pub fn channel_source(depth: usize) -> (PositionFeed, ChannelSource) {
    let (tx, rx) = mpsc::channel(depth.max(1));
    (PositionFeed { tx }, ChannelSource { rx })
}

/// Producer half of a channel-backed position source.
#[derive(Debug, Clone)]
pub struct PositionFeed {
    tx: mpsc::Sender<Result<PositionSample, PositionErrorKind>>,
}

impl PositionFeed {
    /// Deliver one sample; returns false once the session has gone away.
    pub async fn send(&self, sample: PositionSample) -> bool {
        self.tx.send(Ok(sample)).await.is_ok()
    }

    /// Report a position failure; the receiving session will stop.
    pub async fn fail(&self, kind: PositionErrorKind) -> bool {
        self.tx.send(Err(kind)).await.is_ok()
    }
}

/// Consumer half of a channel-backed position source.
#[derive(Debug)]
pub struct ChannelSource {
    rx: mpsc::Receiver<Result<PositionSample, PositionErrorKind>>,
}

impl PositionSource for ChannelSource {
    async fn next_fix(&mut self) -> Option<Result<PositionSample, PositionErrorKind>> {
        self.rx.recv().await
    }
}

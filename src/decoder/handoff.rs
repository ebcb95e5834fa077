//! Hand-off policy: how decoded pictures reach the consumer
//!
//! In synchronous mode the consumer runs inline on the decoding thread and
//! reads the decoder's frame buffer in place. In cross-context mode each
//! picture is deep-copied and sent over a channel, so the decoder can reuse its
//! buffer while the consumer works on another thread.

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;
use tracing::{debug, trace, warn};

use super::picture::{Geometry, OwnedPicture};
use super::publish::{deliver, DeliveryKind, FrameSink};
use crate::codec::FrameBuffer;

/// Where the consumer runs, fixed when the host is built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffMode {
    Synchronous,
    CrossContext,
}

/// Outcome of one input, as seen by the consumer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery<P> {
    Picture(P),
    /// Flush/sync marker
    Sync,
    /// Decode produced no picture
    Failed,
}

impl<P> Delivery<P> {
    pub fn kind(&self) -> DeliveryKind {
        match self {
            Delivery::Picture(_) => DeliveryKind::Picture,
            Delivery::Sync => DeliveryKind::Sync,
            Delivery::Failed => DeliveryKind::Failed,
        }
    }

    pub fn picture(&self) -> Option<&P> {
        match self {
            Delivery::Picture(picture) => Some(picture),
            _ => None,
        }
    }
}

/// Decoder-side end of a hand-off
pub trait Handoff {
    const MODE: HandoffMode;

    /// Pass one outcome to the consumer
    ///
    /// Returns whether a publishable picture was handed over: published, for
    /// synchronous mode, or queued for the consumer, for cross-context mode.
    fn hand_off<F: FrameBuffer + ?Sized>(&mut self, delivery: Delivery<&F>) -> bool;
}

/// Synchronous hand-off: runs the sink inline, no copy
#[derive(Debug)]
pub struct Inline<S> {
    sink: S,
}

impl<S: FrameSink> Inline<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

impl<S: FrameSink> Handoff for Inline<S> {
    const MODE: HandoffMode = HandoffMode::Synchronous;

    fn hand_off<F: FrameBuffer + ?Sized>(&mut self, delivery: Delivery<&F>) -> bool {
        deliver(delivery.kind(), delivery.picture().copied(), &mut self.sink)
    }
}

/// Cross-context hand-off: duplicates each picture and queues it
#[derive(Debug, Clone)]
pub struct FrameSender {
    sender: Sender<Delivery<OwnedPicture>>,
}

impl Handoff for FrameSender {
    const MODE: HandoffMode = HandoffMode::CrossContext;

    fn hand_off<F: FrameBuffer + ?Sized>(&mut self, delivery: Delivery<&F>) -> bool {
        let mut publishable = false;
        let owned = match delivery {
            Delivery::Picture(frame) => {
                publishable = Geometry::of(frame).is_some();
                if !publishable {
                    debug!(format = ?frame.pixel_format(), "picture not publishable, planes not copied");
                }
                Delivery::Picture(OwnedPicture::duplicate(frame))
            }
            Delivery::Sync => Delivery::Sync,
            Delivery::Failed => Delivery::Failed,
        };

        match self.sender.send(owned) {
            Ok(()) => publishable,
            Err(err) => {
                warn!(kind = ?err.0.kind(), "frame receiver dropped, delivery discarded");
                false
            }
        }
    }
}

/// Consumer-side end of a cross-context hand-off
#[derive(Debug)]
pub struct FrameReceiver {
    receiver: Receiver<Delivery<OwnedPicture>>,
}

/// Error type for the consumer side
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HandoffError {
    #[error("Decoder side of the hand-off is gone")]
    Disconnected,
}

pub type HandoffResult<T> = Result<T, HandoffError>;

impl FrameReceiver {
    /// Block for the next delivery and run both sink stages on it
    ///
    /// Returns whether a picture was published.
    pub fn publish_next<S: FrameSink + ?Sized>(&self, sink: &mut S) -> HandoffResult<bool> {
        let delivery = self
            .receiver
            .recv()
            .map_err(|_| HandoffError::Disconnected)?;
        Ok(Self::publish(delivery, sink))
    }

    /// Like [`publish_next`](Self::publish_next), but returns None if nothing is queued
    pub fn try_publish_next<S: FrameSink + ?Sized>(
        &self,
        sink: &mut S,
    ) -> HandoffResult<Option<bool>> {
        match self.receiver.try_recv() {
            Ok(delivery) => Ok(Some(Self::publish(delivery, sink))),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(HandoffError::Disconnected),
        }
    }

    /// Wait up to `timeout` for the next delivery
    pub fn publish_next_timeout<S: FrameSink + ?Sized>(
        &self,
        sink: &mut S,
        timeout: Duration,
    ) -> HandoffResult<Option<bool>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(delivery) => Ok(Some(Self::publish(delivery, sink))),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(HandoffError::Disconnected),
        }
    }

    /// Take the next delivery without publishing it
    pub fn recv(&self) -> HandoffResult<Delivery<OwnedPicture>> {
        self.receiver.recv().map_err(|_| HandoffError::Disconnected)
    }

    /// Deliveries queued and not yet consumed
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    fn publish<S: FrameSink + ?Sized>(delivery: Delivery<OwnedPicture>, sink: &mut S) -> bool {
        trace!(kind = ?delivery.kind(), "publishing handed-off delivery");
        deliver(delivery.kind(), delivery.picture(), sink)
    }
}

/// Unbounded cross-context hand-off; the decoder never waits on the consumer
pub fn unbounded() -> (FrameSender, FrameReceiver) {
    let (sender, receiver) = channel::unbounded();
    (FrameSender { sender }, FrameReceiver { receiver })
}

/// Bounded cross-context hand-off; the decoder blocks once `capacity` pictures are queued
pub fn bounded(capacity: usize) -> (FrameSender, FrameReceiver) {
    let (sender, receiver) = channel::bounded(capacity);
    (FrameSender { sender }, FrameReceiver { receiver })
}

//! Frame publisher: the two-stage consumer contract

use tracing::{debug, trace};

use super::picture::PictureView;
use crate::codec::FrameBuffer;

/// What stage one reports to the consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryKind {
    /// A decoded picture follows
    Picture,
    /// Flush/sync marker; no picture was expected
    Sync,
    /// The decode call produced no picture
    Failed,
}

impl DeliveryKind {
    pub fn is_sync(self) -> bool {
        self == DeliveryKind::Sync
    }
}

/// Consumer of decoded pictures
pub trait FrameSink {
    /// Stage one: accept or decline the delivery before any pixels are touched
    fn deliver(&mut self, kind: DeliveryKind) -> bool {
        let _ = kind;
        true
    }

    /// Stage two: consume the planes; returns whether the frame was taken
    ///
    /// The planes are only valid for the duration of this call.
    fn frame(&mut self, picture: &PictureView<'_>) -> bool;

    /// Stage two when there is nothing to show
    fn no_frame(&mut self);
}

impl<S: FrameSink + ?Sized> FrameSink for &mut S {
    fn deliver(&mut self, kind: DeliveryKind) -> bool {
        (**self).deliver(kind)
    }

    fn frame(&mut self, picture: &PictureView<'_>) -> bool {
        (**self).frame(picture)
    }

    fn no_frame(&mut self) {
        (**self).no_frame()
    }
}

/// Publish `frame` to `sink`; returns whether a picture reached the consumer
///
/// An absent frame takes the "no frame" path. Unsupported pixel formats are
/// dropped without calling the sink at all.
pub fn publish<F, S>(frame: Option<&F>, sink: &mut S) -> bool
where
    F: FrameBuffer + ?Sized,
    S: FrameSink + ?Sized,
{
    let Some(frame) = frame else {
        sink.no_frame();
        return false;
    };

    let Some(view) = PictureView::new(frame) else {
        debug!(
            format = ?frame.pixel_format(),
            width = frame.width(),
            height = frame.height(),
            "picture not publishable, dropped"
        );
        return false;
    };

    let accepted = sink.frame(&view);
    trace!(
        width = view.geometry.width,
        height = view.geometry.height,
        accepted,
        "published picture"
    );
    accepted
}

/// Run both stages: announce `kind`, then publish if the consumer accepted
pub fn deliver<F, S>(kind: DeliveryKind, frame: Option<&F>, sink: &mut S) -> bool
where
    F: FrameBuffer + ?Sized,
    S: FrameSink + ?Sized,
{
    if !sink.deliver(kind) {
        trace!(?kind, "delivery declined");
        return false;
    }
    publish(frame, sink)
}

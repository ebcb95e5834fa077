//! Decoder: codec-context lifecycle and the packet-in/frame-out loop
//!
//! A [`Decoder`] owns the codec context plus one packet holder and one frame
//! holder, all reused across calls. The picture returned by
//! [`Decoder::decode`] borrows the frame holder, so it cannot outlive the next
//! mutating call.

pub mod handoff;
pub mod picture;
pub mod publish;

use std::ops::Deref;

use tracing::{debug, info, trace, warn};

use crate::codec::{
    CodecError, CodecLibrary, CodecResult, CodecStream, DecoderConfig, FrameBuffer, PacketBuffer,
};

pub use handoff::{
    Delivery, FrameReceiver, FrameSender, Handoff, HandoffError, HandoffMode, Inline,
};
pub use picture::{Geometry, OwnedPicture, PictureView, Rect};
pub use publish::{deliver, publish, DeliveryKind, FrameSink};

/// Decode error type
#[derive(Debug, Clone, thiserror::Error)]
pub enum DecodeError {
    #[error("Decoder initialization failed: {0}")]
    Initialization(#[source] CodecError),

    #[error("Decoder is not initialized")]
    NotInitialized,

    #[error("Invalid decode input: empty access unit")]
    InvalidInput,

    #[error("Codec rejected access unit: {0}")]
    Submission(#[source] CodecError),

    #[error("No picture available yet")]
    NoPictureYet,

    #[error("Failed to receive decoded picture: {0}")]
    Receive(#[source] CodecError),
}

impl DecodeError {
    /// The codec only needs more input; nothing went wrong
    pub fn is_no_picture(&self) -> bool {
        matches!(self, DecodeError::NoPictureYet)
    }
}

pub type DecodeResult<T> = Result<T, DecodeError>;

/// Running counters for one decoder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderStats {
    /// Access units submitted to the codec
    pub packets: u64,
    /// Pictures received from the codec
    pub pictures: u64,
    /// Decode calls that produced no picture
    pub failures: u64,
    /// Successful and failed resets, initialization included
    pub resets: u64,
}

/// Native codec state, present between a successful reset and teardown
///
/// Fields drop in declaration order: frame, packet, then context.
struct CodecState<L: CodecLibrary> {
    frame: L::Frame,
    packet: L::Packet,
    context: L::Context,
    has_picture: bool,
}

/// Packet binding that is released on every exit path
struct BoundPacket<'a, P: PacketBuffer> {
    packet: &'a mut P,
}

impl<'a, P: PacketBuffer> BoundPacket<'a, P> {
    fn attach(packet: &'a mut P, data: &'a [u8]) -> CodecResult<Self> {
        packet.attach(data)?;
        Ok(Self { packet })
    }
}

impl<P: PacketBuffer> Deref for BoundPacket<'_, P> {
    type Target = P;

    fn deref(&self) -> &P {
        self.packet
    }
}

impl<P: PacketBuffer> Drop for BoundPacket<'_, P> {
    fn drop(&mut self) {
        self.packet.release();
    }
}

/// Single-stream video decoder over a [`CodecLibrary`]
///
/// Not internally synchronized: callers serialize `decode`, `reset` and
/// `teardown` themselves (the `&mut self` receivers enforce this).
pub struct Decoder<L: CodecLibrary> {
    library: L,
    config: DecoderConfig,
    state: Option<CodecState<L>>,
    stats: DecoderStats,
}

impl<L: CodecLibrary> Decoder<L> {
    /// Create a decoder for `config.codec_name` and open the codec
    ///
    /// The codec name is fixed for the decoder's lifetime.
    pub fn new(library: L, config: DecoderConfig) -> DecodeResult<Self> {
        config.validate().map_err(DecodeError::Initialization)?;

        let mut decoder = Self {
            library,
            config,
            state: None,
            stats: DecoderStats::default(),
        };
        decoder.reset().map_err(DecodeError::Initialization)?;

        info!(codec = %decoder.config.codec_name, "decoder initialized");
        Ok(decoder)
    }

    /// Release all codec state and reopen the codec from scratch
    ///
    /// On failure the decoder holds no codec state; allocations made during
    /// this call are released before returning.
    pub fn reset(&mut self) -> CodecResult<()> {
        self.release();
        self.stats.resets += 1;

        match self.open_state() {
            Ok(state) => {
                self.state = Some(state);
                info!(codec = %self.config.codec_name, "decoder reset");
                Ok(())
            }
            Err(e) => {
                warn!(codec = %self.config.codec_name, error = %e, "decoder reset failed");
                Err(e)
            }
        }
    }

    fn open_state(&self) -> CodecResult<CodecState<L>> {
        let codec = self.library.find_decoder(&self.config.codec_name)?;
        debug!(?codec, "found decoder");

        let context = self.library.alloc_context(codec, &self.config)?;
        debug!(
            low_delay = self.config.low_delay,
            thread_type = ?self.config.thread_type,
            "allocated codec context"
        );

        let packet = self.library.alloc_packet()?;
        debug!("allocated packet");

        let frame = self.library.alloc_frame()?;
        debug!("allocated frame");

        let mut state = CodecState::<L> {
            frame,
            packet,
            context,
            has_picture: false,
        };
        state.context.open()?;
        debug!("opened codec");

        Ok(state)
    }

    /// Release codec state, if any
    fn release(&mut self) {
        if self.state.take().is_some() {
            debug!(codec = %self.config.codec_name, "released codec state");
        }
    }

    /// Release everything; safe to call repeatedly
    pub fn teardown(&mut self) {
        self.release();
    }

    /// Submit one access unit and drain every picture it yields
    ///
    /// Returns the last picture decoded. Its planes are owned by the decoder and
    /// are overwritten by the next call.
    pub fn decode(&mut self, data: &[u8]) -> DecodeResult<&L::Frame> {
        if data.is_empty() {
            warn!("illegal decode parameter: empty access unit");
            return Err(DecodeError::InvalidInput);
        }

        let Some(state) = self.state.as_mut() else {
            warn!("decode called without an open codec");
            return Err(DecodeError::NotInitialized);
        };
        let CodecState {
            frame,
            packet,
            context,
            has_picture,
        } = state;

        trace!(codec = %self.config.codec_name, len = data.len(), "decode");
        let packet = match BoundPacket::attach(packet, data) {
            Ok(packet) => packet,
            Err(e) => {
                self.stats.failures += 1;
                return Err(DecodeError::Submission(e));
            }
        };

        self.stats.packets += 1;
        if let Err(e) = context.send_packet(&packet) {
            warn!(error = %e, "send_packet failed");
            self.stats.failures += 1;
            return Err(DecodeError::Submission(e));
        }

        let mut decoded = 0u64;
        let drained = loop {
            match context.receive_frame(frame) {
                Ok(true) => {
                    decoded += 1;
                    trace!(
                        width = frame.width(),
                        height = frame.height(),
                        format = ?frame.pixel_format(),
                        "received picture"
                    );
                }
                Ok(false) => break Ok(()),
                Err(e) => {
                    warn!(error = %e, "receive_frame failed");
                    break Err(e);
                }
            }
        };
        drop(packet);

        if decoded > 0 {
            self.stats.pictures += decoded;
            *has_picture = true;
            return Ok(&*frame);
        }

        self.stats.failures += 1;
        match drained {
            Ok(()) => {
                debug!("codec needs more input");
                Err(DecodeError::NoPictureYet)
            }
            Err(e) => Err(DecodeError::Receive(e)),
        }
    }

    /// Most recent picture, until the next decode or reset overwrites it
    pub fn picture(&self) -> Option<&L::Frame> {
        self.state
            .as_ref()
            .filter(|state| state.has_picture)
            .map(|state| &state.frame)
    }

    /// Whether the codec is open
    pub fn is_open(&self) -> bool {
        self.state.is_some()
    }

    pub fn codec_name(&self) -> &str {
        &self.config.codec_name
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn stats(&self) -> DecoderStats {
        self.stats
    }
}

impl<L: CodecLibrary> Drop for Decoder<L> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<L: CodecLibrary> std::fmt::Debug for Decoder<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decoder")
            .field("codec", &self.config.codec_name)
            .field("open", &self.is_open())
            .field("stats", &self.stats)
            .finish()
    }
}

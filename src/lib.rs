#![deny(clippy::all)]

//! Single-stream video decoder adapter
//!
//! Feeds compressed access units to a codec through its send/receive API and
//! publishes each decoded planar YUV picture to a consumer, either inline or
//! on another thread.

// FFmpeg C bindings (hand-written, no bindgen)
#[cfg(feature = "ffmpeg")]
pub mod ffi;

// Codec contract and the libavcodec backend (RAII)
pub mod codec;

// Decode loop, picture publishing and hand-off
pub mod decoder;

// Host entry points
pub mod host;

pub use codec::{
    available_parallelism, CodecError, CodecLibrary, DecoderConfig, FrameBuffer, PixelFormat,
    Plane, ThreadType,
};
#[cfg(feature = "ffmpeg")]
pub use codec::Ffmpeg;
pub use decoder::{
    DecodeError, Decoder, DecoderStats, Delivery, DeliveryKind, FrameReceiver, FrameSink,
    Geometry, HandoffMode, OwnedPicture, PictureView, Rect,
};
pub use host::DecoderHost;

//! Codec boundary: the stream-processing contract the decoder drives
//!
//! The decoder never looks inside the codec. It sees a library that can look
//! up a decoder by name and hand out a context, a packet holder and a frame
//! holder, and a context that accepts packets and yields frames. With the
//! `ffmpeg` feature these are RAII wrappers around libavcodec structures.

#[cfg(feature = "ffmpeg")]
pub mod context;
#[cfg(feature = "ffmpeg")]
pub mod frame;
#[cfg(feature = "ffmpeg")]
pub mod library;
#[cfg(feature = "ffmpeg")]
pub mod packet;
pub mod threads;

#[cfg(test)]
pub(crate) mod testing;

#[cfg(feature = "ffmpeg")]
pub use context::CodecContext;
#[cfg(feature = "ffmpeg")]
pub use frame::Frame;
#[cfg(feature = "ffmpeg")]
pub use library::Ffmpeg;
#[cfg(feature = "ffmpeg")]
pub use packet::Packet;
pub use threads::{available_parallelism, thread_count_for, MAX_THREADS};

/// Longest codec name the decoder accepts (the identifier is a fixed 128-byte slot)
pub const MAX_CODEC_NAME_LEN: usize = 127;

/// How the codec may split work across its internal worker threads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadType {
    /// Decode several frames at once (adds output latency)
    Frame,
    /// Decode slices of a single frame in parallel
    Slice,
}

/// Decoder configuration
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Codec name passed to the decoder lookup (e.g., "vp9")
    pub codec_name: String,
    /// Output pictures as soon as possible, without reordering delay
    pub low_delay: bool,
    /// Internal threading model
    pub thread_type: ThreadType,
    /// Number of threads (0 for the core-count heuristic)
    pub thread_count: u32,
}

impl DecoderConfig {
    /// Configuration for the given codec with default settings
    pub fn new(codec_name: impl Into<String>) -> Self {
        Self {
            codec_name: codec_name.into(),
            ..Self::default()
        }
    }

    /// Check that the codec name fits the fixed identifier slot
    pub fn validate(&self) -> CodecResult<()> {
        if self.codec_name.is_empty() {
            return Err(CodecError::InvalidConfig("Codec name is empty".into()));
        }
        if self.codec_name.len() > MAX_CODEC_NAME_LEN {
            return Err(CodecError::InvalidConfig(format!(
                "Codec name longer than {} bytes",
                MAX_CODEC_NAME_LEN
            )));
        }
        if self.codec_name.contains('\0') {
            return Err(CodecError::InvalidConfig("Codec name contains NUL".into()));
        }
        Ok(())
    }

    /// Thread count actually requested from the codec
    pub fn effective_thread_count(&self) -> u32 {
        match self.thread_count {
            0 => available_parallelism(),
            n => n.min(MAX_THREADS),
        }
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            codec_name: "vp9".to_string(),
            low_delay: true,
            thread_type: ThreadType::Slice,
            thread_count: 0, // Auto
        }
    }
}

/// Codec error type
#[derive(Debug, Clone, thiserror::Error)]
pub enum CodecError {
    #[error("Codec error {code}: {message}")]
    Codec { code: i32, message: String },

    #[error("Codec not found: {0}")]
    CodecNotFound(String),

    #[error("Failed to allocate {0}")]
    AllocationFailed(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Packet of {0} bytes exceeds the codec's size limit")]
    PacketTooLarge(usize),
}

#[cfg(feature = "ffmpeg")]
impl From<crate::ffi::FFmpegError> for CodecError {
    fn from(err: crate::ffi::FFmpegError) -> Self {
        CodecError::Codec {
            code: err.code,
            message: err.message,
        }
    }
}

pub type CodecResult<T> = Result<T, CodecError>;

/// Pixel layout of a decoded picture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Planar YUV, chroma subsampled 2x2
    Yuv420p,
    /// Planar YUV, full resolution chroma
    Yuv444p,
    /// Anything else, with the codec's raw format tag
    Unsupported(i32),
}

impl PixelFormat {
    /// Rows stored in plane `index` of a picture `height` luma rows tall
    ///
    /// Odd heights are rounded up to even. None for unsupported formats and
    /// for planes the format doesn't have.
    pub fn plane_rows(self, index: usize, height: u32) -> Option<usize> {
        let height = height as usize;
        let even = height + (height & 1);
        match (self, index) {
            (PixelFormat::Yuv420p | PixelFormat::Yuv444p, 0) => Some(even),
            (PixelFormat::Yuv420p, 1 | 2) => Some(even / 2),
            (PixelFormat::Yuv444p, 1 | 2) => Some(even),
            _ => None,
        }
    }
}

/// One pixel plane borrowed from a frame buffer
#[derive(Debug, Clone, Copy)]
pub struct Plane<'a> {
    /// Plane bytes, `stride` bytes per row
    pub data: &'a [u8],
    /// Bytes per row, including padding
    pub stride: usize,
}

/// Picture storage the codec decodes into
pub trait FrameBuffer {
    /// Luma width in pixels
    fn width(&self) -> u32;

    /// Luma height in pixels, as reported by the codec
    fn height(&self) -> u32;

    fn pixel_format(&self) -> PixelFormat;

    /// Plane `index` (0 = Y, 1 = U, 2 = V), or None if absent
    fn plane(&self, index: usize) -> Option<Plane<'_>>;
}

/// Reusable holder for one compressed access unit
pub trait PacketBuffer {
    /// Point the holder at caller-owned bytes, without copying
    fn attach(&mut self, data: &[u8]) -> CodecResult<()>;

    /// Drop the binding; the holder itself stays allocated
    fn release(&mut self);
}

/// An allocated codec context: packets in, frames out
pub trait CodecStream {
    type Packet: PacketBuffer;
    type Frame: FrameBuffer;

    /// Open the codec with the configuration applied at allocation
    fn open(&mut self) -> CodecResult<()>;

    /// Submit one access unit
    fn send_packet(&mut self, packet: &Self::Packet) -> CodecResult<()>;

    /// Fetch the next decoded picture into `frame`
    ///
    /// Returns Ok(false) when the codec needs more input first. Every other
    /// non-success, end of stream included, is an error.
    fn receive_frame(&mut self, frame: &mut Self::Frame) -> CodecResult<bool>;
}

/// Entry point into a codec implementation
pub trait CodecLibrary {
    /// Looked-up codec descriptor
    type Codec: Copy + std::fmt::Debug;
    type Packet: PacketBuffer;
    type Frame: FrameBuffer;
    type Context: CodecStream<Packet = Self::Packet, Frame = Self::Frame>;

    fn find_decoder(&self, name: &str) -> CodecResult<Self::Codec>;

    /// Allocate a context for `codec` and apply `config` to it (not yet opened)
    fn alloc_context(&self, codec: Self::Codec, config: &DecoderConfig)
        -> CodecResult<Self::Context>;

    fn alloc_packet(&self) -> CodecResult<Self::Packet>;

    fn alloc_frame(&self) -> CodecResult<Self::Frame>;
}

//! Core FFmpeg type definitions
//!
//! All FFmpeg structs are opaque (zero-sized) to avoid version-specific layout dependencies.
//! Field access is done via the thin C accessor library in accessors.c

use std::marker::PhantomData;
use std::os::raw::c_int;

// ============================================================================
// Pixel Formats
// ============================================================================

/// Raw `AVPixelFormat` values the decoder cares about
pub mod pix_fmt {
    use std::os::raw::c_int;

    pub const NONE: c_int = -1;
    pub const YUV420P: c_int = 0;
    pub const YUV444P: c_int = 5;
}

// ============================================================================
// Opaque FFmpeg Structures
// ============================================================================

/// Opaque AVCodec structure (codec descriptor, owned by libavcodec)
#[repr(C)]
pub struct AVCodec {
    _opaque: [u8; 0],
    _marker: PhantomData<(*mut u8, std::marker::PhantomPinned)>,
}

/// Opaque AVCodecContext structure (decoder instance)
#[repr(C)]
pub struct AVCodecContext {
    _opaque: [u8; 0],
    _marker: PhantomData<(*mut u8, std::marker::PhantomPinned)>,
}

/// Opaque AVFrame structure (uncompressed video data)
#[repr(C)]
pub struct AVFrame {
    _opaque: [u8; 0],
    _marker: PhantomData<(*mut u8, std::marker::PhantomPinned)>,
}

/// Opaque AVPacket structure (compressed data)
#[repr(C)]
pub struct AVPacket {
    _opaque: [u8; 0],
    _marker: PhantomData<(*mut u8, std::marker::PhantomPinned)>,
}

/// Opaque AVDictionary structure (key-value options)
#[repr(C)]
pub struct AVDictionary {
    _opaque: [u8; 0],
    _marker: PhantomData<(*mut u8, std::marker::PhantomPinned)>,
}

// ============================================================================
// Constants
// ============================================================================

/// Decode more than one frame at once
pub const FF_THREAD_FRAME: c_int = 1;

/// Decode more than one part of a single frame at once
pub const FF_THREAD_SLICE: c_int = 2;

pub mod codec_flag {
    use std::os::raw::c_int;

    /// Force low delay (no output reordering)
    pub const LOW_DELAY: c_int = 1 << 19;
}

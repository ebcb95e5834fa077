//! Hand-written FFmpeg C bindings (no bindgen)
//!
//! Only the decoding surface of libavcodec/libavutil is declared here.
//! All FFmpeg structs are opaque - we access fields via the thin C accessor library.

pub mod accessors;
pub mod avcodec;
pub mod avutil;
pub mod error;
pub mod types;

pub use error::{check_error, check_error_except_eagain, FFmpegError, FFmpegResult};
pub use types::*;

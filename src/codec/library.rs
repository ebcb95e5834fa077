//! libavcodec as a [`CodecLibrary`]

use crate::ffi::{
    avcodec::avcodec_find_decoder_by_name,
    avutil::{av_log_set_level, log_level},
    AVCodec,
};
use std::ffi::CString;
use std::ptr::NonNull;

use super::{CodecContext, CodecError, CodecLibrary, CodecResult, DecoderConfig, Frame, Packet};

/// Static codec descriptor returned by libavcodec's registry
#[derive(Debug, Clone, Copy)]
pub struct CodecRef(NonNull<AVCodec>);

impl CodecRef {
    #[inline]
    pub fn as_ptr(&self) -> *const AVCodec {
        self.0.as_ptr()
    }
}

/// FFmpeg's libavcodec
#[derive(Debug, Clone, Copy, Default)]
pub struct Ffmpeg;

impl Ffmpeg {
    /// Handle to libavcodec with its log level synced to tracing
    pub fn new() -> Self {
        let ffmpeg = Self;
        ffmpeg.sync_log_level();
        ffmpeg
    }

    /// Match libav's own stderr logging to the active tracing level
    pub fn sync_log_level(&self) {
        use tracing::Level;

        let level = match tracing::level_filters::LevelFilter::current().into_level() {
            None => log_level::QUIET,
            Some(level) if level == Level::ERROR => log_level::ERROR,
            Some(level) if level == Level::WARN => log_level::WARNING,
            Some(level) if level == Level::INFO => log_level::INFO,
            Some(level) if level == Level::DEBUG => log_level::DEBUG,
            Some(_) => log_level::TRACE,
        };
        unsafe { av_log_set_level(level) }
    }
}

impl CodecLibrary for Ffmpeg {
    type Codec = CodecRef;
    type Packet = Packet;
    type Frame = Frame;
    type Context = CodecContext;

    fn find_decoder(&self, name: &str) -> CodecResult<CodecRef> {
        let c_name =
            CString::new(name).map_err(|_| CodecError::InvalidConfig("Invalid codec name".into()))?;
        let codec = unsafe { avcodec_find_decoder_by_name(c_name.as_ptr()) };
        NonNull::new(codec as *mut AVCodec)
            .map(CodecRef)
            .ok_or_else(|| CodecError::CodecNotFound(name.to_string()))
    }

    fn alloc_context(&self, codec: CodecRef, config: &DecoderConfig) -> CodecResult<CodecContext> {
        let mut ctx = CodecContext::new_decoder(codec)?;
        ctx.configure_decoder(config)?;
        Ok(ctx)
    }

    fn alloc_packet(&self) -> CodecResult<Packet> {
        Packet::new()
    }

    fn alloc_frame(&self) -> CodecResult<Frame> {
        Frame::new()
    }
}

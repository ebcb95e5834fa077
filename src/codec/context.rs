//! Safe wrapper around FFmpeg AVCodecContext
//!
//! Provides decoding functionality with RAII cleanup.

use crate::ffi::{
    self,
    accessors::{
        ffctx_get_flags, ffctx_get_thread_count, ffctx_set_flags, ffctx_set_thread_count,
        ffctx_set_thread_type,
    },
    avcodec::{
        avcodec_alloc_context3, avcodec_free_context, avcodec_open2, avcodec_receive_frame,
        avcodec_send_packet,
    },
    codec_flag, AVCodec, AVCodecContext, FF_THREAD_FRAME, FF_THREAD_SLICE,
};
use std::ptr::NonNull;

use super::{
    library::CodecRef, CodecError, CodecResult, CodecStream, DecoderConfig, Frame, Packet,
    ThreadType,
};

/// Safe wrapper around a decoder AVCodecContext
pub struct CodecContext {
    ptr: NonNull<AVCodecContext>,
    codec: *const AVCodec,
    /// Receives pictures so a failed receive never clobbers the caller's frame
    scratch: Frame,
}

impl CodecContext {
    /// Allocate a decoder context for a looked-up codec
    pub fn new_decoder(codec: CodecRef) -> CodecResult<Self> {
        let scratch = Frame::new()?;
        let codec = codec.as_ptr();
        let ptr = unsafe { avcodec_alloc_context3(codec) };
        NonNull::new(ptr)
            .map(|ptr| Self {
                ptr,
                codec,
                scratch,
            })
            .ok_or(CodecError::AllocationFailed("AVCodecContext"))
    }

    /// Configure the decoder with the given settings
    pub fn configure_decoder(&mut self, config: &DecoderConfig) -> CodecResult<()> {
        unsafe {
            let ctx = self.ptr.as_ptr();

            if config.low_delay {
                ffctx_set_flags(ctx, ffctx_get_flags(ctx) | codec_flag::LOW_DELAY);
            }

            let thread_type = match config.thread_type {
                ThreadType::Frame => FF_THREAD_FRAME,
                ThreadType::Slice => FF_THREAD_SLICE,
            };
            ffctx_set_thread_type(ctx, thread_type);
            ffctx_set_thread_count(ctx, config.effective_thread_count() as i32);
        }

        Ok(())
    }

    /// Get raw pointer (for FFmpeg API calls)
    #[inline]
    pub fn as_ptr(&self) -> *const AVCodecContext {
        self.ptr.as_ptr()
    }

    /// Get mutable raw pointer
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut AVCodecContext {
        self.ptr.as_ptr()
    }

    /// Whether low-delay output is enabled
    pub fn is_low_delay(&self) -> bool {
        unsafe { ffctx_get_flags(self.as_ptr()) & codec_flag::LOW_DELAY != 0 }
    }

    /// Configured worker thread count
    pub fn thread_count(&self) -> i32 {
        unsafe { ffctx_get_thread_count(self.as_ptr()) }
    }
}

impl CodecStream for CodecContext {
    type Packet = Packet;
    type Frame = Frame;

    /// Open the codec (must be called after configuration)
    fn open(&mut self) -> CodecResult<()> {
        let ret = unsafe { avcodec_open2(self.ptr.as_ptr(), self.codec, std::ptr::null_mut()) };
        ffi::check_error(ret)?;
        Ok(())
    }

    fn send_packet(&mut self, packet: &Packet) -> CodecResult<()> {
        let ret = unsafe { avcodec_send_packet(self.ptr.as_ptr(), packet.as_ptr()) };
        ffi::check_error(ret)?;
        Ok(())
    }

    fn receive_frame(&mut self, frame: &mut Frame) -> CodecResult<bool> {
        let ret = unsafe { avcodec_receive_frame(self.ptr.as_ptr(), self.scratch.as_mut_ptr()) };
        match ffi::check_error_except_eagain(ret)? {
            Some(_) => {
                frame.take_from(&mut self.scratch);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl Drop for CodecContext {
    fn drop(&mut self) {
        unsafe {
            let mut ptr = self.ptr.as_ptr();
            avcodec_free_context(&mut ptr);
        }
    }
}

// CodecContext is NOT Sync - FFmpeg contexts are not thread-safe
unsafe impl Send for CodecContext {}

impl std::fmt::Debug for CodecContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecContext")
            .field("low_delay", &self.is_low_delay())
            .field("thread_count", &self.thread_count())
            .finish()
    }
}

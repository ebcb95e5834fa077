//! Safe wrapper around FFmpeg AVFrame
//!
//! Provides RAII-based memory management and safe access to frame data.

use crate::ffi::{
    accessors::{
        ffframe_data_const, ffframe_get_format, ffframe_get_height, ffframe_get_width,
        ffframe_linesize,
    },
    avutil::{av_frame_alloc, av_frame_free, av_frame_move_ref, av_frame_unref},
    pix_fmt, AVFrame,
};
use std::ptr::NonNull;

use super::{CodecError, FrameBuffer, PixelFormat, Plane};

/// Safe wrapper around AVFrame with RAII cleanup
pub struct Frame {
    ptr: NonNull<AVFrame>,
}

impl Frame {
    /// Allocate a new empty frame
    pub fn new() -> Result<Self, CodecError> {
        let ptr = unsafe { av_frame_alloc() };
        NonNull::new(ptr)
            .map(|ptr| Self { ptr })
            .ok_or(CodecError::AllocationFailed("AVFrame"))
    }

    /// Get the raw pointer (for FFmpeg API calls)
    #[inline]
    pub fn as_ptr(&self) -> *const AVFrame {
        self.ptr.as_ptr()
    }

    /// Get the mutable raw pointer (for FFmpeg API calls)
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut AVFrame {
        self.ptr.as_ptr()
    }

    /// Raw FFmpeg pixel format
    #[inline]
    pub fn raw_format(&self) -> i32 {
        unsafe { ffframe_get_format(self.as_ptr()) }
    }

    /// Get line size (stride) for a plane
    #[inline]
    pub fn linesize(&self, plane: usize) -> i32 {
        unsafe { ffframe_linesize(self.as_ptr(), plane as i32) }
    }

    /// Unreference the frame data (but keep the frame structure)
    pub fn unref(&mut self) {
        unsafe { av_frame_unref(self.as_mut_ptr()) }
    }

    /// Replace this frame's contents with `src`'s, leaving `src` empty
    pub fn take_from(&mut self, src: &mut Frame) {
        unsafe {
            av_frame_unref(self.as_mut_ptr());
            av_frame_move_ref(self.as_mut_ptr(), src.as_mut_ptr());
        }
    }
}

impl FrameBuffer for Frame {
    #[inline]
    fn width(&self) -> u32 {
        unsafe { ffframe_get_width(self.as_ptr()).max(0) as u32 }
    }

    #[inline]
    fn height(&self) -> u32 {
        unsafe { ffframe_get_height(self.as_ptr()).max(0) as u32 }
    }

    fn pixel_format(&self) -> PixelFormat {
        match self.raw_format() {
            pix_fmt::YUV420P => PixelFormat::Yuv420p,
            pix_fmt::YUV444P => PixelFormat::Yuv444p,
            other => PixelFormat::Unsupported(other),
        }
    }

    /// Only formats with known plane geometry expose their planes
    ///
    /// Decoder buffers are allocated with aligned dimensions, so rounding the
    /// luma height up to even stays inside the allocation.
    fn plane(&self, index: usize) -> Option<Plane<'_>> {
        let rows = self.pixel_format().plane_rows(index, self.height())?;
        let ptr = unsafe { ffframe_data_const(self.as_ptr(), index as i32) };
        if ptr.is_null() {
            return None;
        }

        // Negative strides (bottom-up images) are never produced by the decoders we drive
        let linesize = self.linesize(index);
        if linesize <= 0 {
            return None;
        }

        let stride = linesize as usize;
        let size = stride * rows;
        Some(Plane {
            data: unsafe { std::slice::from_raw_parts(ptr, size) },
            stride,
        })
    }
}

impl Drop for Frame {
    fn drop(&mut self) {
        unsafe {
            let mut ptr = self.ptr.as_ptr();
            av_frame_free(&mut ptr);
        }
    }
}

// Frame data can be sent between threads
unsafe impl Send for Frame {}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("format", &self.pixel_format())
            .finish()
    }
}

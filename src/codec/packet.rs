//! Safe wrapper around FFmpeg AVPacket
//!
//! The decoder keeps one packet for its whole life and points it at the
//! caller's bytes for the duration of a single decode call.

use crate::ffi::{
    accessors::{ffpkt_data, ffpkt_set_data, ffpkt_size},
    avcodec::{av_packet_alloc, av_packet_free, av_packet_unref},
    AVPacket,
};
use std::os::raw::c_int;
use std::ptr::NonNull;

use super::{CodecError, CodecResult, PacketBuffer};

/// Safe wrapper around AVPacket with RAII cleanup
pub struct Packet {
    ptr: NonNull<AVPacket>,
}

impl Packet {
    /// Allocate a new empty packet
    pub fn new() -> Result<Self, CodecError> {
        let ptr = unsafe { av_packet_alloc() };
        NonNull::new(ptr)
            .map(|ptr| Self { ptr })
            .ok_or(CodecError::AllocationFailed("AVPacket"))
    }

    /// Get the raw pointer (for FFmpeg API calls)
    #[inline]
    pub fn as_ptr(&self) -> *const AVPacket {
        self.ptr.as_ptr()
    }

    /// Get the mutable raw pointer (for FFmpeg API calls)
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut AVPacket {
        self.ptr.as_ptr()
    }

    /// Get packet size in bytes
    #[inline]
    pub fn size(&self) -> i32 {
        unsafe { ffpkt_size(self.as_ptr()) }
    }

    /// Check if packet has data
    #[inline]
    pub fn is_empty(&self) -> bool {
        unsafe { ffpkt_data(self.as_ptr()).is_null() } || self.size() == 0
    }

    /// Unreference the packet data
    pub fn unref(&mut self) {
        unsafe { av_packet_unref(self.as_mut_ptr()) }
    }
}

impl PacketBuffer for Packet {
    fn attach(&mut self, data: &[u8]) -> CodecResult<()> {
        let size = c_int::try_from(data.len()).map_err(|_| CodecError::PacketTooLarge(data.len()))?;
        // No AVBufferRef is attached, so avcodec_send_packet copies the bytes
        // before returning and never writes through this pointer.
        unsafe { ffpkt_set_data(self.as_mut_ptr(), data.as_ptr() as *mut u8, size) }
        Ok(())
    }

    fn release(&mut self) {
        self.unref();
    }
}

impl Drop for Packet {
    fn drop(&mut self) {
        unsafe {
            let mut ptr = self.ptr.as_ptr();
            av_packet_free(&mut ptr);
        }
    }
}

// Packet data can be sent between threads
unsafe impl Send for Packet {}

impl std::fmt::Debug for Packet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Packet").field("size", &self.size()).finish()
    }
}

//! Rust declarations for C accessor functions
//!
//! These functions provide access to FFmpeg struct fields via the thin C accessor library.

use super::types::*;
use std::os::raw::c_int;

unsafe extern "C" {
  // ========================================================================
  // AVCodecContext
  // ========================================================================

  pub fn ffctx_get_flags(ctx: *const AVCodecContext) -> c_int;
  pub fn ffctx_set_flags(ctx: *mut AVCodecContext, flags: c_int);
  pub fn ffctx_set_thread_count(ctx: *mut AVCodecContext, thread_count: c_int);
  pub fn ffctx_set_thread_type(ctx: *mut AVCodecContext, thread_type: c_int);
  pub fn ffctx_get_thread_count(ctx: *const AVCodecContext) -> c_int;

  // ========================================================================
  // AVFrame Getters
  // ========================================================================

  pub fn ffframe_get_width(frame: *const AVFrame) -> c_int;
  pub fn ffframe_get_height(frame: *const AVFrame) -> c_int;
  pub fn ffframe_get_format(frame: *const AVFrame) -> c_int;
  pub fn ffframe_data_const(frame: *const AVFrame, plane: c_int) -> *const u8;
  pub fn ffframe_linesize(frame: *const AVFrame, plane: c_int) -> c_int;

  // ========================================================================
  // AVPacket
  // ========================================================================

  pub fn ffpkt_data(pkt: *const AVPacket) -> *const u8;
  pub fn ffpkt_size(pkt: *const AVPacket) -> c_int;

  /// Point the packet at caller-owned bytes without taking a reference
  pub fn ffpkt_set_data(pkt: *mut AVPacket, data: *mut u8, size: c_int);
}

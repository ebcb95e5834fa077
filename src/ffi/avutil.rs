//! libavutil function declarations
//!
//! Provides frame management, error strings and logging control.

use super::types::*;
use std::os::raw::{c_char, c_int};

unsafe extern "C" {
  // ========================================================================
  // Frame Management
  // ========================================================================

  /// Allocate an AVFrame and set its fields to default values
  pub fn av_frame_alloc() -> *mut AVFrame;

  /// Free the frame and any dynamically allocated objects in it
  pub fn av_frame_free(frame: *mut *mut AVFrame);

  /// Unreference all buffers referenced by frame and reset to defaults
  pub fn av_frame_unref(frame: *mut AVFrame);

  /// Move everything contained in src to dst and reset src
  pub fn av_frame_move_ref(dst: *mut AVFrame, src: *mut AVFrame);

  // ========================================================================
  // Error Handling
  // ========================================================================

  /// Put a description of the AVERROR code errnum in errbuf
  pub fn av_strerror(errnum: c_int, errbuf: *mut c_char, errbuf_size: usize) -> c_int;

  // ========================================================================
  // Logging
  // ========================================================================

  /// Set the logging level
  pub fn av_log_set_level(level: c_int);
}

// ============================================================================
// Logging Levels
// ============================================================================

pub mod log_level {
  use std::os::raw::c_int;

  pub const QUIET: c_int = -8;
  pub const ERROR: c_int = 16;
  pub const WARNING: c_int = 24;
  pub const INFO: c_int = 32;
  pub const DEBUG: c_int = 48;
  pub const TRACE: c_int = 56;
}

//! FFmpeg error handling
//!
//! Provides error codes, error conversion, and result types.

use std::ffi::CStr;
use std::fmt;
use std::os::raw::c_int;

// ============================================================================
// FFmpeg Error Codes
// ============================================================================

/// End of file / stream reached
pub const AVERROR_EOF: c_int = fferrtag(b'E', b'O', b'F', b' ');

/// Invalid data found
pub const AVERROR_INVALIDDATA: c_int = fferrtag(b'I', b'N', b'D', b'A');

// POSIX error codes (negated) - platform specific
// Note: FFmpeg negates errno values, so we need platform-specific values

/// Resource temporarily unavailable (try again)
/// Linux: EAGAIN = 11, macOS: EAGAIN = 35
#[cfg(target_os = "macos")]
pub const AVERROR_EAGAIN: c_int = -35;

#[cfg(not(target_os = "macos"))]
pub const AVERROR_EAGAIN: c_int = -11;

/// Create FFmpeg error tag from 4 bytes
const fn fferrtag(a: u8, b: u8, c: u8, d: u8) -> c_int {
  -((a as c_int) | ((b as c_int) << 8) | ((c as c_int) << 16) | ((d as c_int) << 24))
}

// ============================================================================
// FFmpeg Error Type
// ============================================================================

/// FFmpeg error with code and message
#[derive(Clone)]
pub struct FFmpegError {
  /// Error code (negative)
  pub code: c_int,
  /// Human-readable message
  pub message: String,
}

impl FFmpegError {
  /// Create error from FFmpeg error code
  pub fn from_code(code: c_int) -> Self {
    Self {
      code,
      message: get_error_message(code),
    }
  }
}

impl fmt::Debug for FFmpegError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FFmpegError")
      .field("code", &self.code)
      .field("message", &self.message)
      .finish()
  }
}

impl fmt::Display for FFmpegError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "FFmpeg error {}: {}", self.code, self.message)
  }
}

impl std::error::Error for FFmpegError {}

/// Result type for FFmpeg operations
pub type FFmpegResult<T> = Result<T, FFmpegError>;

// ============================================================================
// Error Checking
// ============================================================================

/// Check FFmpeg return code and convert to Result
///
/// Returns Ok with the value if >= 0, Err with FFmpegError if < 0
#[inline]
pub fn check_error(ret: c_int) -> FFmpegResult<c_int> {
  if ret < 0 {
    Err(FFmpegError::from_code(ret))
  } else {
    Ok(ret)
  }
}

/// Check FFmpeg return code, ignoring EAGAIN
///
/// Returns Ok(Some(value)) if >= 0, Ok(None) if EAGAIN, Err otherwise.
/// EOF is deliberately an error here: a drained decoder is not "not yet".
#[inline]
pub fn check_error_except_eagain(ret: c_int) -> FFmpegResult<Option<c_int>> {
  if ret >= 0 {
    Ok(Some(ret))
  } else if ret == AVERROR_EAGAIN {
    Ok(None)
  } else {
    Err(FFmpegError::from_code(ret))
  }
}

/// Get error message for an FFmpeg error code
pub fn get_error_message(code: c_int) -> String {
  let mut buf = [0 as std::os::raw::c_char; 256];
  unsafe {
    super::avutil::av_strerror(code, buf.as_mut_ptr(), buf.len());
    CStr::from_ptr(buf.as_ptr()).to_string_lossy().into_owned()
  }
}

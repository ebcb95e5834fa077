//! Build script for ffvideo-decoder
//!
//! Does nothing unless the `ffmpeg` feature is enabled. Then it compiles the C
//! accessor library with `cc` and links libavcodec and libavutil statically.

use std::env;
use std::path::{Path, PathBuf};

/// The decoding half of FFmpeg, in link order
const FFMPEG_LIBS: [&str; 2] = ["avcodec", "avutil"];

/// External decoders FFmpeg may have been configured with
///
/// The native vp8/vp9/av1 decoders need none of these; they are linked only
/// when present so a `--enable-libvpx`/`--enable-libdav1d` build resolves.
const OPTIONAL_DECODER_LIBS: [&str; 2] = ["vpx", "dav1d"];

fn main() {
  println!("cargo:rerun-if-changed=build.rs");
  println!("cargo:rerun-if-env-changed=FFMPEG_DIR");
  println!("cargo:rerun-if-env-changed=LIBRARY_PATH");

  // The codec-agnostic core builds without any native library
  if env::var_os("CARGO_FEATURE_FFMPEG").is_none() {
    return;
  }

  let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
  let ffmpeg_dir = find_ffmpeg_dir(&target_os);

  compile_accessors(&ffmpeg_dir);
  link_ffmpeg(&ffmpeg_dir.join("lib"));
  link_system_libraries(&target_os);
}

/// FFMPEG_DIR, then pkg-config, then the usual prefixes
fn find_ffmpeg_dir(target_os: &str) -> PathBuf {
  if let Ok(dir) = env::var("FFMPEG_DIR") {
    return PathBuf::from(dir);
  }

  #[cfg(unix)]
  {
    if let Ok(output) = std::process::Command::new("pkg-config")
      .args(["--variable=prefix", "libavcodec"])
      .output()
    {
      if output.status.success() {
        let prefix = PathBuf::from(String::from_utf8_lossy(&output.stdout).trim());
        if prefix.exists() {
          return prefix;
        }
      }
    }
  }

  let prefixes: &[&str] = match target_os {
    "macos" => &["/opt/homebrew", "/usr/local", "/opt/local"],
    "linux" => &["/usr", "/usr/local", "/opt/ffmpeg"],
    "windows" => &["C:\\ffmpeg"],
    _ => &[],
  };
  for prefix in prefixes {
    let prefix = PathBuf::from(prefix);
    if prefix.join("include/libavcodec/avcodec.h").exists() {
      return prefix;
    }
  }

  println!("cargo:warning=FFmpeg not found. Set FFMPEG_DIR to an FFmpeg install with static libraries.");
  PathBuf::from("/usr/local")
}

fn compile_accessors(ffmpeg_dir: &Path) {
  cc::Build::new()
    .file("src/ffi/accessors.c")
    .include(ffmpeg_dir.join("include"))
    .warnings(true)
    .extra_warnings(true)
    .compile("ffvideo_accessors");

  println!("cargo:rerun-if-changed=src/ffi/accessors.c");
}

/// Link the FFmpeg archives by full path so a shared copy can never be picked up
fn link_ffmpeg(lib_dir: &Path) {
  for lib in FFMPEG_LIBS {
    let archive = lib_dir.join(format!("lib{}.a", lib));
    if !archive.exists() {
      panic!(
        "lib{}.a not found in {}. Set FFMPEG_DIR to an FFmpeg install with static libraries.",
        lib,
        lib_dir.display()
      );
    }
    println!("cargo:rustc-link-arg={}", archive.display());
  }

  let search_paths = library_search_paths(lib_dir);
  for lib in OPTIONAL_DECODER_LIBS {
    let name = format!("lib{}.a", lib);
    if let Some(archive) = search_paths.iter().map(|dir| dir.join(&name)).find(|p| p.exists()) {
      println!("cargo:rustc-link-arg={}", archive.display());
    }
  }
}

fn library_search_paths(ffmpeg_lib_dir: &Path) -> Vec<PathBuf> {
  let mut paths = vec![ffmpeg_lib_dir.to_path_buf()];
  if let Ok(library_path) = env::var("LIBRARY_PATH") {
    paths.extend(env::split_paths(&library_path));
  }
  if let Ok(brew_prefix) = env::var("HOMEBREW_PREFIX") {
    paths.push(PathBuf::from(brew_prefix).join("lib"));
  }
  paths.push(PathBuf::from("/usr/local/lib"));
  paths.push(PathBuf::from("/usr/lib"));
  paths
}

/// System libraries static libavutil/libavcodec depend on
fn link_system_libraries(target_os: &str) {
  let libs: &[&str] = match target_os {
    "macos" => &["z", "iconv", "framework=CoreFoundation"],
    "linux" => &["z", "m", "pthread"],
    // av_get_random_seed uses BCryptGenRandom
    "windows" => &["bcrypt"],
    _ => {
      println!("cargo:warning=Unknown target OS: {}", target_os);
      &[]
    }
  };
  for lib in libs {
    println!("cargo:rustc-link-lib={}", lib);
  }
}

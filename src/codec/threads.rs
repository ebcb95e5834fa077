//! Core-count heuristic for the codec's slice threads

/// Upper bound on codec worker threads (enough for UHD tiled decoding)
pub const MAX_THREADS: u32 = 8;

/// Assumed core count when the platform reports none
const FALLBACK_CORES: u32 = 2;

/// Number of worker threads the codec context may use
///
/// Always 1 on targets without thread support.
pub fn available_parallelism() -> u32 {
    if cfg!(all(target_family = "wasm", not(target_feature = "atomics"))) {
        return 1;
    }
    thread_count_for(num_cpus::get())
}

/// Apply the floor and cap to a reported logical core count
///
/// Some sandboxed runtimes report zero cores; at least two fast cores are
/// assumed in that case.
pub fn thread_count_for(cores: usize) -> u32 {
    match u32::try_from(cores) {
        Ok(0) => FALLBACK_CORES,
        Ok(n) => n.min(MAX_THREADS),
        Err(_) => MAX_THREADS,
    }
}

//! This module contains various utility functions and helper macros used
//! throughout the varpopdb crate.
//!
//! Key functionalities include:
//!
//! - The global worker pool ([`THREAD_POOL`]) used by the parallel index
//!   builders, sized by the `VARPOP_NUM_THREADS` environment variable.
//! - Logger initialisation for binaries and tests ([`init_logger`]).
//! - Rate-limited warnings ([`warn_once`]), so that one recurring data
//!   problem produces a single log line per kind during whole-population
//!   scans instead of one line per variant.
//! - Macros for common struct operations (getter functions, builder-style
//!   `with_*` methods).

use std::sync::Mutex;

use hashbrown::HashSet;
use log::{
    debug,
    warn,
    LevelFilter,
};
use once_cell::sync::Lazy;
use rayon::{
    ThreadPool,
    ThreadPoolBuilder,
};

/// Upper bound on the number of worker threads used for index builds.
pub const MAX_THREADS: usize = 32;

/// Environment variable overriding the size of [`THREAD_POOL`].
pub const NUM_THREADS_ENV: &str = "VARPOP_NUM_THREADS";

pub static THREAD_POOL: Lazy<ThreadPool> = Lazy::new(|| {
    let num_threads: Option<usize> = std::env::var(NUM_THREADS_ENV)
        .ok()
        .and_then(|str| str.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .map(|n| n.min(MAX_THREADS));
    let num_threads = num_threads.unwrap_or_else(default_threads);
    debug!("Creating index thread pool with {} threads", num_threads);
    ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|idx| format!("varpop-worker-{}", idx))
        .build()
        .expect("Failed to create thread pool")
});

/// Hardware concurrency capped at [`MAX_THREADS`].
pub fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .clamp(1, MAX_THREADS)
}

pub fn n_threads() -> usize {
    THREAD_POOL.current_num_threads()
}

/// Initialises `pretty_env_logger`. `RUST_LOG` takes precedence over the
/// verbosity flag. Calling this more than once is harmless.
pub fn init_logger(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    }
    else {
        LevelFilter::Info
    };
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(level);
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }
    // Another logger may already be installed (e.g. by a test harness).
    let _ = builder.try_init();
}

static WARNED_KINDS: Lazy<Mutex<HashSet<String>>> =
    Lazy::new(|| Mutex::new(HashSet::new()));

/// Logs `message` at warn level the first time `kind` is seen.
///
/// Returns `true` if the warning was emitted.
pub fn warn_once(
    kind: &str,
    message: impl AsRef<str>,
) -> bool {
    let first = match WARNED_KINDS.lock() {
        Ok(mut guard) => guard.insert(kind.to_string()),
        Err(poisoned) => poisoned.into_inner().insert(kind.to_string()),
    };
    if first {
        warn!(
            "{} (further '{}' warnings suppressed)",
            message.as_ref(),
            kind
        );
    }
    first
}

#[macro_export]
macro_rules! getter_fn {
    ($field_name: ident, $field_type: ty) => {
        #[cfg_attr(coverage_nightly, coverage(off))]
        pub fn $field_name(&self) -> &$field_type {
            &self.$field_name
        }
    };
}
pub use getter_fn;

#[macro_export]
macro_rules! with_field_fn {
    ($field_name: ident, $field_type: ty) => {
        paste::paste! {
            #[cfg_attr(coverage_nightly, coverage(off))]
            pub fn [<with_$field_name>](mut self, value: $field_type) -> Self {
                self.$field_name = value;
                self
            }
        }
    };
}
pub use with_field_fn;

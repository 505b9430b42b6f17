//! Runtime configuration.
//!
//! Defaults suit a typical desktop CPU. Every field can be overridden through
//! `QBLAS_*` environment variables; values that fail to parse are logged and
//! ignored so that a typo never prevents the library from starting.

use std::env;

pub const ENV_GEMM_MC: &str = "QBLAS_GEMM_MC";
pub const ENV_GEMM_NC: &str = "QBLAS_GEMM_NC";
pub const ENV_GEMM_KC: &str = "QBLAS_GEMM_KC";
pub const ENV_PARALLEL_THRESHOLD: &str = "QBLAS_PARALLEL_THRESHOLD";
pub const ENV_THREADS: &str = "QBLAS_THREADS";
pub const ENV_DISABLE_IMAGES: &str = "QBLAS_DISABLE_IMAGES";

/// Tunables read once by `setup()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// GEMM row block (rows of packed A). `None` derives it from the device.
    pub gemm_mc: Option<usize>,
    /// GEMM column block (columns of packed B).
    pub gemm_nc: Option<usize>,
    /// GEMM depth block.
    pub gemm_kc: Option<usize>,
    /// Output elements below which kernels stay single-threaded.
    pub parallel_threshold: usize,
    /// Threads per parallel region, `0` for one per core.
    pub max_threads: usize,
    /// Allow the image-backed GEMM path when a scratch image is registered.
    pub images_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemm_mc: None,
            gemm_nc: None,
            gemm_kc: None,
            parallel_threshold: 256 * 256,
            max_threads: 0,
            images_enabled: true,
        }
    }
}

impl Config {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();

        if let Some(v) = block_size(&lookup, ENV_GEMM_MC) {
            cfg.gemm_mc = Some(v);
        }
        if let Some(v) = block_size(&lookup, ENV_GEMM_NC) {
            cfg.gemm_nc = Some(v);
        }
        if let Some(v) = block_size(&lookup, ENV_GEMM_KC) {
            cfg.gemm_kc = Some(v);
        }
        if let Some(v) = lookup(ENV_PARALLEL_THRESHOLD).and_then(|v| parse_usize(ENV_PARALLEL_THRESHOLD, &v)) {
            cfg.parallel_threshold = v;
        }
        if let Some(v) = lookup(ENV_THREADS).and_then(|v| parse_usize(ENV_THREADS, &v)) {
            cfg.max_threads = v;
        }
        if let Some(v) = lookup(ENV_DISABLE_IMAGES).and_then(|v| parse_bool(ENV_DISABLE_IMAGES, &v)) {
            cfg.images_enabled = !v;
        }

        cfg
    }
}

fn block_size(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<usize> {
    let v = parse_usize(key, &lookup(key)?)?;
    if v == 0 {
        tracing::warn!(key, "block size must be positive; ignoring");
        return None;
    }
    Some(v)
}

fn parse_usize(key: &str, raw: &str) -> Option<usize> {
    match raw.trim().parse::<usize>() {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(key, value = raw, error = %e, "ignoring invalid configuration value");
            None
        }
    }
}

fn parse_bool(key: &str, raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => {
            tracing::warn!(key, value = raw, "ignoring invalid boolean configuration value");
            None
        }
    }
}

//! Size constants shared by the upload pipeline.

pub const KIB: u64 = 1024;
pub const MIB: u64 = 1024 * KIB;
pub const GIB: u64 = 1024 * MIB;

/// Absolute ceiling for a single upload. Larger payloads are rejected before any I/O.
pub const MAX_UPLOAD_BYTES: u64 = 6 * GIB;

/// Payloads strictly larger than this are staged to disk and streamed.
pub const STREAMING_THRESHOLD_BYTES: u64 = GIB;

/// Payloads strictly smaller than this may be retried on the secondary network.
pub const FALLBACK_CEILING_BYTES: u64 = 500 * MIB;

/// Content type used when the filename extension is missing or unknown.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Number of atomic units in one ether (wei per ETH).
pub const ATOMIC_UNITS_PER_ETHER: u128 = 1_000_000_000_000_000_000;

/// Default request timeout for storage network calls (30 minutes).
pub const NETWORK_TIMEOUT_SECS: u64 = 30 * 60;

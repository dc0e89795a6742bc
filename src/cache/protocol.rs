//! Key-Value Cache Network Protocol
//!
//! Endpoints and DTOs spoken by `RemoteCache`. Values travel as JSON strings so the store
//! never needs to understand what it holds.

use serde::{Deserialize, Serialize};

/// Read endpoint; the key is appended as the final path segment.
pub const ENDPOINT_GET: &str = "get";
/// Write endpoint.
pub const ENDPOINT_PUT: &str = "put";

/// Write request.
#[derive(Debug, Serialize, Deserialize)]
pub struct PutRequest {
    /// Unique operation ID (UUID) so the store can drop retried duplicates.
    pub op_id: String,
    pub key: String,
    /// The value, already serialized as a JSON string.
    pub value_json: String,
    /// Seconds until the store may evict the entry.
    pub ttl_secs: u64,
}

/// Read response. `None` means the key does not exist.
#[derive(Debug, Serialize, Deserialize)]
pub struct GetResponse {
    pub value_json: Option<String>,
}

/// Write acknowledgment.
#[derive(Debug, Serialize, Deserialize)]
pub struct PutResponse {
    pub success: bool,
}

//! Random identifiers for stored records.

/// Prefix for ticket identifiers.
pub const TICKET_PREFIX: &str = "tkt";
/// Prefix for requisition identifiers.
pub const REQUISITION_PREFIX: &str = "req";
/// Prefix for stop-clock interval identifiers.
pub const STOP_PREFIX: &str = "stop";

/// Generate an identifier of the form `<prefix>_<16 hex chars>`.
pub fn generate(prefix: &str) -> String {
    format!("{}_{:016x}", prefix, rand::random::<u64>())
}

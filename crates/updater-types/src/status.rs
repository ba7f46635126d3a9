//! Classification of replica response codes.

/// Status reported for a delivery that never produced a response
/// (connect failure, timeout, protocol error).
pub const SYNTHETIC_FAILURE_STATUS: u16 = 500;

/// Returns `true` if a replica's answer lets the record be retired.
///
/// Any 2xx counts, and so does 404: the replica has no such container, so
/// there is nothing for it to update.
pub fn is_acceptable(status: u16) -> bool {
    (200..300).contains(&status) || status == 404
}

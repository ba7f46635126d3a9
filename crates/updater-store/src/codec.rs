//! Record encoding.
//!
//! Records are bincode-encoded [`UpdateRecord`]s. Decoding is a tagged
//! result: anything that is not a complete, valid record comes back as a
//! reason string and the caller routes it to quarantine.

use bincode::Options;
use updater_types::UpdateRecord;

use crate::error::{StoreError, StoreResult};

/// Upper bound on an encoded record. Bounds allocation when a corrupt
/// length prefix claims a huge string.
pub const MAX_RECORD_BYTES: u64 = 1024 * 1024;

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_limit(MAX_RECORD_BYTES)
}

pub fn encode_record(record: &UpdateRecord) -> StoreResult<Vec<u8>> {
    options()
        .serialize(record)
        .map_err(|e| StoreError::Serialization(e.to_string()))
}

pub fn decode_record(bytes: &[u8]) -> Result<UpdateRecord, String> {
    let record: UpdateRecord = options().deserialize(bytes).map_err(|e| e.to_string())?;
    record.validate().map_err(|e| e.to_string())?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use updater_types::{ObjectPath, Operation};

    fn record() -> UpdateRecord {
        let mut headers = BTreeMap::new();
        headers.insert("X-Timestamp".into(), "1700000000.00000".into());
        UpdateRecord::new(ObjectPath::new("a", "c", "o"), Operation::Delete, headers)
    }

    #[test]
    fn decode_accepts_encoded_record() {
        let bytes = encode_record(&record()).unwrap();
        assert_eq!(decode_record(&bytes).unwrap(), record());
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode_record(b"").is_err());
        assert!(decode_record(b"\xff\xff\xff\xff not a record").is_err());
    }

    #[test]
    fn decode_rejects_truncated_record() {
        let bytes = encode_record(&record()).unwrap();
        assert!(decode_record(&bytes[..bytes.len() - 3]).is_err());
    }

    #[test]
    fn decode_rejects_trailing_bytes() {
        let mut bytes = encode_record(&record()).unwrap();
        bytes.extend_from_slice(b"junk");
        assert!(decode_record(&bytes).is_err());
    }

    #[test]
    fn decode_rejects_invalid_record() {
        let mut r = record();
        r.account.clear();
        let bytes = encode_record(&r).unwrap();
        let reason = decode_record(&bytes).unwrap_err();
        assert!(reason.contains("account"));
    }
}

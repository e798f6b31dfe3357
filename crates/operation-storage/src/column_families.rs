//! RocksDB column family definitions.

/// Operation records: operation_id → OperationRecord
pub const CF_OPERATIONS: &str = "operations";

/// Get all column family names
pub fn all_column_families() -> Vec<&'static str> {
    vec![CF_OPERATIONS]
}

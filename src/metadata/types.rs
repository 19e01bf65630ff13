//! Database type name to host (Rust) type mapping

use std::collections::HashMap;

/// A Rust type that a database column maps to in generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostType {
    Bool,
    U8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Decimal,
    String,
    Bytes,
    Uuid,
    Date,
    Time,
    DateTime,
    DateTimeOffset,
}

impl HostType {
    /// Type path emitted into generated code.
    pub fn rust_name(&self) -> &'static str {
        match self {
            HostType::Bool => "bool",
            HostType::U8 => "u8",
            HostType::I16 => "i16",
            HostType::I32 => "i32",
            HostType::I64 => "i64",
            HostType::F32 => "f32",
            HostType::F64 => "f64",
            HostType::Decimal => "rust_decimal::Decimal",
            HostType::String => "String",
            HostType::Bytes => "Vec<u8>",
            HostType::Uuid => "uuid::Uuid",
            HostType::Date => "chrono::NaiveDate",
            HostType::Time => "chrono::NaiveTime",
            HostType::DateTime => "chrono::NaiveDateTime",
            HostType::DateTimeOffset => "chrono::DateTime<chrono::FixedOffset>",
        }
    }
}

/// Default SQL Server type map, keyed by lowercase catalog type name.
pub fn sql_server_type_mappings() -> HashMap<String, HostType> {
    let entries: &[(&str, HostType)] = &[
        ("bit", HostType::Bool),
        ("tinyint", HostType::U8),
        ("smallint", HostType::I16),
        ("int", HostType::I32),
        ("bigint", HostType::I64),
        ("real", HostType::F32),
        ("float", HostType::F64),
        ("decimal", HostType::Decimal),
        ("numeric", HostType::Decimal),
        ("money", HostType::Decimal),
        ("smallmoney", HostType::Decimal),
        ("char", HostType::String),
        ("varchar", HostType::String),
        ("text", HostType::String),
        ("nchar", HostType::String),
        ("nvarchar", HostType::String),
        ("ntext", HostType::String),
        ("xml", HostType::String),
        ("sysname", HostType::String),
        ("binary", HostType::Bytes),
        ("varbinary", HostType::Bytes),
        ("image", HostType::Bytes),
        ("rowversion", HostType::Bytes),
        ("timestamp", HostType::Bytes),
        ("uniqueidentifier", HostType::Uuid),
        ("date", HostType::Date),
        ("time", HostType::Time),
        ("smalldatetime", HostType::DateTime),
        ("datetime", HostType::DateTime),
        ("datetime2", HostType::DateTime),
        ("datetimeoffset", HostType::DateTimeOffset),
    ];
    entries
        .iter()
        .map(|(name, host)| (name.to_string(), *host))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_mappings() {
        let mappings = sql_server_type_mappings();
        assert_eq!(mappings["int"], HostType::I32);
        assert_eq!(mappings["nvarchar"], HostType::String);
        assert_eq!(mappings["uniqueidentifier"], HostType::Uuid);
        assert_eq!(mappings["datetime2"], HostType::DateTime);
    }

    #[test]
    fn test_rust_names() {
        assert_eq!(HostType::I64.rust_name(), "i64");
        assert_eq!(HostType::Decimal.rust_name(), "rust_decimal::Decimal");
        assert_eq!(HostType::Bytes.rust_name(), "Vec<u8>");
    }
}

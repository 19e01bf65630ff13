//! Name-matching predicates used for include/exclude filtering
//!
//! Patterns accept a table or column under any of its usual spellings:
//! bare name, bracket-quoted name, schema-qualified and bracket-qualified
//! forms. `*` matches anything.

use regex::Regex;

use crate::error::{Result, SchemagenError};

use super::item::MetadataItem;
use super::model::{Column, Table};

/// Token that matches any name.
pub const MATCH_ANY: &str = "*";

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Whether `name` designates this table: `*`, `Name`, `[Name]`,
/// `Schema.Name` or `[Schema].[Name]`, case-insensitive.
pub fn table_name_matches(table: &Table, name: &str) -> bool {
    name == MATCH_ANY
        || eq_ignore_case(name, table.name())
        || eq_ignore_case(name, &format!("[{}]", table.name()))
        || eq_ignore_case(name, &format!("{}.{}", table.schema_name(), table.name()))
        || eq_ignore_case(name, table.fully_qualified_name())
}

/// Whether `name` designates this column, from bare `Name` up to the
/// fully qualified `[Schema].[Table].[Column]` form, case-insensitive.
pub fn column_name_matches(column: &Column, name: &str) -> bool {
    name == MATCH_ANY
        || eq_ignore_case(name, column.name())
        || eq_ignore_case(name, &format!("[{}]", column.name()))
        || eq_ignore_case(
            name,
            &format!("{}.{}", column.table_name(), column.name()),
        )
        || eq_ignore_case(
            name,
            &format!("[{}].[{}]", column.table_name(), column.name()),
        )
        || eq_ignore_case(
            name,
            &format!(
                "{}.{}.{}",
                column.schema_name(),
                column.table_name(),
                column.name()
            ),
        )
        || eq_ignore_case(name, column.fully_qualified_name())
}

/// Regex variant of the table predicate.
///
/// The pattern is tested against all four name forms; an empty or missing
/// pattern yields `on_none`.
pub fn table_matches_regex(table: &Table, pattern: Option<&str>, on_none: bool) -> Result<bool> {
    let Some(pattern) = pattern.filter(|p| !p.trim().is_empty()) else {
        return Ok(on_none);
    };
    let regex = Regex::new(pattern).map_err(|err| {
        SchemagenError::Config(format!("invalid table pattern '{pattern}': {err}"))
    })?;
    Ok(regex.is_match(table.name())
        || regex.is_match(&format!("[{}]", table.name()))
        || regex.is_match(&format!("{}.{}", table.schema_name(), table.name()))
        || regex.is_match(table.fully_qualified_name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::model::{ColumnFacets, Column};

    fn order_table() -> Table {
        Table::new("Order", "dbo")
    }

    #[test]
    fn test_table_name_forms() {
        let table = order_table();
        assert!(table_name_matches(&table, "*"));
        assert!(table_name_matches(&table, "order"));
        assert!(table_name_matches(&table, "[Order]"));
        assert!(table_name_matches(&table, "DBO.ORDER"));
        assert!(table_name_matches(&table, "[dbo].[Order]"));
        assert!(!table_name_matches(&table, "Orders"));
        assert!(!table_name_matches(&table, "archive.Order"));
    }

    #[test]
    fn test_column_name_forms() {
        let column = Column::new("CustomerId", "dbo", "Order", 2, ColumnFacets::default());
        assert!(column_name_matches(&column, "customerid"));
        assert!(column_name_matches(&column, "[CustomerId]"));
        assert!(column_name_matches(&column, "Order.CustomerId"));
        assert!(column_name_matches(&column, "dbo.Order.CustomerId"));
        assert!(column_name_matches(&column, "[dbo].[Order].[CustomerId]"));
        assert!(!column_name_matches(&column, "Id"));
    }

    #[test]
    fn test_regex_matching() {
        let table = order_table();
        assert!(table_matches_regex(&table, Some("^Ord"), false).unwrap());
        assert!(table_matches_regex(&table, Some(r"dbo\.\w+"), false).unwrap());
        assert!(!table_matches_regex(&table, Some("^Customer"), true).unwrap());
        // Empty pattern falls back to the caller's default.
        assert!(table_matches_regex(&table, None, true).unwrap());
        assert!(!table_matches_regex(&table, Some("  "), false).unwrap());
        assert!(table_matches_regex(&table, Some("[unclosed"), false).is_err());
    }
}

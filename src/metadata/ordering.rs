//! Dependency ordering of tables for seed and cleanup scripts
//!
//! Produces an order in which every referenced table precedes its
//! referencers, so inserts can run top to bottom without violating
//! foreign keys. The sort is a repeated pairwise compare-and-swap rather
//! than a graph traversal: tables with no relationship keep their input
//! order, which keeps generated scripts stable across runs.

use std::cmp::Ordering;

use crate::error::{Result, SchemagenError};

use super::item::MetadataItem;
use super::model::Table;

/// Passes after which the relation is considered cyclic.
const MAX_SORT_PASSES: usize = 100;

/// Sort tables so that referenced tables come before referencing ones.
///
/// Only foreign keys between members of the slice constrain the order; a
/// key pointing at an excluded table is ignored. Fails with
/// [`SchemagenError::CyclicDependency`] when the tables reference each
/// other cyclically and no such order exists.
pub fn sort_by_dependency(tables: &mut [&Table]) -> Result<()> {
    let mut passes = 0;
    loop {
        let mut sorted = true;
        passes += 1;
        if passes > MAX_SORT_PASSES {
            return Err(cyclic(tables));
        }

        for i in 0..tables.len().saturating_sub(1) {
            for j in (i + 1)..tables.len() {
                match compare(tables[i], tables[j])? {
                    Ordering::Greater => {
                        tables.swap(i, j);
                        sorted = false;
                    }
                    Ordering::Less | Ordering::Equal => {}
                }
            }
        }

        if sorted {
            return Ok(());
        }
    }
}

/// Three-way dependency comparison between two tables.
///
/// `Less`: `source` is referenced by `target` and must come first.
/// `Greater`: `source` references `target` and must come after.
/// `Equal`: no relationship, order preserved.
/// A pair referencing each other can never be linearized and errors out
/// immediately instead of letting the sort run into its pass ceiling.
fn compare(source: &Table, target: &Table) -> Result<Ordering> {
    let source_first = references(target, source);
    let target_first = references(source, target);
    match (source_first, target_first) {
        (true, true) => Err(SchemagenError::CyclicDependency {
            tables: vec![
                source.fully_qualified_name().to_string(),
                target.fully_qualified_name().to_string(),
            ],
        }),
        (true, false) => Ok(Ordering::Less),
        (false, true) => Ok(Ordering::Greater),
        (false, false) => Ok(Ordering::Equal),
    }
}

/// Whether `from` holds a foreign key that points at `to`.
fn references(from: &Table, to: &Table) -> bool {
    from.foreign_keys()
        .iter()
        .any(|fk| fk.target_table() == to.fully_qualified_name())
        || to.incoming_foreign_keys()
            .iter()
            .any(|fk| fk.parent_table() == from.fully_qualified_name())
}

fn cyclic(tables: &[&Table]) -> SchemagenError {
    SchemagenError::CyclicDependency {
        tables: tables
            .iter()
            .map(|t| t.fully_qualified_name().to_string())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::database::{ColumnRow, DatabaseMetadata, ForeignKeyRow, TableRow};
    use crate::metadata::model::ColumnFacets;
    use crate::metadata::types::sql_server_type_mappings;

    fn build_db(tables: &[&str], edges: &[(&str, &str)]) -> DatabaseMetadata {
        let mut db = DatabaseMetadata::new("SortDb", sql_server_type_mappings());
        for name in tables {
            db.add_table(TableRow {
                schema: "dbo".to_string(),
                name: name.to_string(),
                ..TableRow::default()
            })
            .unwrap();
            db.add_column(ColumnRow {
                schema: "dbo".to_string(),
                table: name.to_string(),
                name: "Id".to_string(),
                facets: ColumnFacets {
                    data_type: "int".to_string(),
                    is_key: true,
                    ..ColumnFacets::default()
                },
                ..ColumnRow::default()
            })
            .unwrap();
        }
        for (from, to) in edges {
            db.add_column(ColumnRow {
                schema: "dbo".to_string(),
                table: from.to_string(),
                name: format!("{to}Id"),
                facets: ColumnFacets {
                    data_type: "int".to_string(),
                    ..ColumnFacets::default()
                },
                ..ColumnRow::default()
            })
            .unwrap();
            db.add_foreign_key(ForeignKeyRow {
                name: format!("FK_{from}_{to}"),
                parent_schema: "dbo".to_string(),
                parent_table: from.to_string(),
                parent_column: format!("{to}Id"),
                target_schema: "dbo".to_string(),
                target_table: to.to_string(),
                target_column: "Id".to_string(),
                ..ForeignKeyRow::default()
            })
            .unwrap();
        }
        db
    }

    fn select<'a>(db: &'a DatabaseMetadata, names: &[&str]) -> Vec<&'a Table> {
        names
            .iter()
            .map(|name| db.find::<Table>(&format!("[dbo].[{name}]")).unwrap())
            .collect()
    }

    #[test]
    fn test_chain_sorts_referenced_first() {
        // A references B, B references C: whatever the input order, the
        // result must be C, B, A.
        let db = build_db(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
        for input in [["A", "B", "C"], ["B", "A", "C"], ["C", "A", "B"]] {
            let mut tables = select(&db, &input);
            sort_by_dependency(&mut tables).unwrap();
            let names: Vec<&str> = tables.iter().map(|t| t.name()).collect();
            assert_eq!(names, vec!["C", "B", "A"]);
        }
    }

    #[test]
    fn test_unrelated_tables_keep_input_order() {
        let db = build_db(&["M", "K", "Z"], &[]);
        let mut tables = select(&db, &["M", "K", "Z"]);
        sort_by_dependency(&mut tables).unwrap();
        let names: Vec<&str> = tables.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["M", "K", "Z"]);
    }

    #[test]
    fn test_edge_to_excluded_table_is_ignored() {
        // B references X, but X is not part of the working set.
        let db = build_db(&["A", "B", "X"], &[("B", "X"), ("A", "B")]);
        let mut tables = select(&db, &["A", "B"]);
        sort_by_dependency(&mut tables).unwrap();
        let names: Vec<&str> = tables.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_mutual_references_are_cyclic() {
        let db = build_db(&["A", "B"], &[("A", "B"), ("B", "A")]);
        let mut tables = select(&db, &["A", "B"]);
        let err = sort_by_dependency(&mut tables).unwrap_err();
        assert!(matches!(err, SchemagenError::CyclicDependency { .. }));
    }

    #[test]
    fn test_three_cycle_is_detected() {
        let db = build_db(&["A", "B", "C"], &[("A", "B"), ("B", "C"), ("C", "A")]);
        let mut tables = select(&db, &["A", "B", "C"]);
        let err = sort_by_dependency(&mut tables).unwrap_err();
        match err {
            SchemagenError::CyclicDependency { tables } => {
                assert!(!tables.is_empty());
            }
            other => panic!("expected CyclicDependency, got {other:?}"),
        }
    }
}

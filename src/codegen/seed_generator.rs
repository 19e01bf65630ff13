//! Seed script generator: dependency-ordered insert scaffolding

use std::fs;

use tracing::info;

use crate::config::SeedOptions;
use crate::error::Result;
use crate::metadata::{
    sort_by_dependency, table_name_matches, Column, DatabaseMetadata, MetadataItem, Table,
};

/// Generate a seed script for the configured tables.
///
/// Tables are ordered so that referenced rows can be inserted before the
/// rows referencing them; the footer clears the same tables in reverse
/// order. Fails when the selected tables reference each other cyclically.
pub fn generate_seed(db: &DatabaseMetadata, options: &SeedOptions) -> Result<()> {
    let mut tables: Vec<&Table> = Vec::new();
    for schema in db.schemas() {
        for table in schema.tables() {
            let selected = options
                .tables
                .iter()
                .any(|pattern| table_name_matches(table, pattern));
            if selected {
                tables.push(table);
            }
        }
    }

    sort_by_dependency(&mut tables)?;

    let mut script = String::new();
    script.push_str(&format!("-- Seed data for {}\n", db.name()));
    script.push_str("-- Insert sections run in dependency order: referenced tables first.\n\n");
    for table in &tables {
        script.push_str(&insert_section(table));
        script.push('\n');
    }

    script.push_str("-- Cleanup, in reverse dependency order:\n");
    for table in tables.iter().rev() {
        script.push_str(&format!("-- DELETE FROM {};\n", table.fully_qualified_name()));
    }

    if let Some(parent) = options.output_file.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(&options.output_file, script)?;

    info!(
        "seed script for {} tables written to {}",
        tables.len(),
        options.output_file.display()
    );
    Ok(())
}

/// Insert scaffold for one table: column list, identity guards, key note.
fn insert_section(table: &Table) -> String {
    let columns: Vec<&Column> = table
        .columns()
        .iter()
        .filter(|column| !column.is_computed())
        .collect();
    let column_list = columns
        .iter()
        .map(|column| format!("[{}]", column.name()))
        .collect::<Vec<_>>()
        .join(", ");
    let key_list = table
        .key_columns()
        .map(|column| format!("[{}]", column.name()))
        .collect::<Vec<_>>()
        .join(", ");
    let has_identity = columns.iter().any(|column| column.is_identity());

    let fqn = table.fully_qualified_name();
    let mut section = String::new();
    section.push_str(&format!("-- {fqn} (key: {key_list})\n"));
    if has_identity {
        section.push_str(&format!("SET IDENTITY_INSERT {fqn} ON;\n"));
    }
    section.push_str(&format!("-- INSERT INTO {fqn} ({column_list}) VALUES\n"));
    section.push_str("--     (...);\n");
    if has_identity {
        section.push_str(&format!("SET IDENTITY_INSERT {fqn} OFF;\n"));
    }
    section
}

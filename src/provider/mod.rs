//! Metadata provider: builds the graph from a schema source and caches it

mod sql_schema;

pub use sql_schema::{parse_schema, SchemaRows};

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use tracing::{debug, info};

use crate::error::Result;
use crate::metadata::{sql_server_type_mappings, DatabaseMetadata};

/// Build a metadata graph directly from a DDL string.
///
/// Rows are applied in dependency order: tables, columns, foreign keys,
/// triggers, index columns.
pub fn build_metadata(database_name: &str, ddl: &str) -> Result<DatabaseMetadata> {
    let rows = parse_schema(ddl)?;
    let mut db = DatabaseMetadata::new(database_name, sql_server_type_mappings());
    for row in rows.tables {
        db.add_table(row)?;
    }
    for row in rows.columns {
        db.add_column(row)?;
    }
    for row in rows.foreign_keys {
        db.add_foreign_key(row)?;
    }
    for row in rows.triggers {
        db.add_trigger(row)?;
    }
    for row in rows.index_columns {
        db.add_index_column(row)?;
    }
    Ok(db)
}

/// Loads the metadata graph from a DDL schema file and caches it for the
/// rest of the run; [`reload`](Self::reload) discards the cache so the
/// next access rebuilds from the source.
#[derive(Debug)]
pub struct MetadataProvider {
    database_name: String,
    schema_file: PathBuf,
    cached: Option<DatabaseMetadata>,
}

impl MetadataProvider {
    pub fn new(database_name: impl Into<String>, schema_file: impl Into<PathBuf>) -> Self {
        Self {
            database_name: database_name.into(),
            schema_file: schema_file.into(),
            cached: None,
        }
    }

    /// The cached graph, loading it on first access.
    pub fn metadata(&mut self) -> Result<&DatabaseMetadata> {
        if self.cached.is_none() {
            self.cached = Some(self.load()?);
        }
        match &self.cached {
            Some(db) => Ok(db),
            None => unreachable!("metadata cache populated above"),
        }
    }

    /// Mutable access to the cached graph, for tasks that filter tables
    /// or write annotations.
    pub fn metadata_mut(&mut self) -> Result<&mut DatabaseMetadata> {
        if self.cached.is_none() {
            self.cached = Some(self.load()?);
        }
        match &mut self.cached {
            Some(db) => Ok(db),
            None => unreachable!("metadata cache populated above"),
        }
    }

    /// Discard the cached graph; the next access rebuilds from the source.
    pub fn reload(&mut self) {
        debug!("metadata cache cleared");
        self.cached = None;
    }

    fn load(&self) -> Result<DatabaseMetadata> {
        let started = Instant::now();
        info!("loading schema from {}", self.schema_file.display());
        let ddl = fs::read_to_string(&self.schema_file)?;
        let db = build_metadata(&self.database_name, &ddl)?;
        info!(
            "database metadata loaded in {} ms",
            started.elapsed().as_millis()
        );
        Ok(db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Table;
    use std::io::Write;

    const DDL: &str = r#"
        CREATE TABLE [dbo].[Customer] (
            [Id] INT NOT NULL PRIMARY KEY,
            [Name] NVARCHAR(200) NOT NULL
        );
        CREATE TABLE [dbo].[Order] (
            [Id] INT NOT NULL PRIMARY KEY,
            [CustomerId] INT NOT NULL,
            CONSTRAINT [FK_Order_Customer] FOREIGN KEY ([CustomerId])
                REFERENCES [dbo].[Customer] ([Id])
        );
    "#;

    #[test]
    fn test_build_metadata_wires_the_graph() {
        let db = build_metadata("Shop", DDL).unwrap();
        assert_eq!(db.name(), "Shop");

        let order: &Table = db.find("[dbo].[Order]").unwrap();
        assert_eq!(order.foreign_keys().len(), 1);
        let customer: &Table = db.find("[dbo].[Customer]").unwrap();
        assert_eq!(customer.incoming_foreign_keys().len(), 1);
    }

    #[test]
    fn test_provider_caches_until_reload() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DDL.as_bytes()).unwrap();

        let mut provider = MetadataProvider::new("Shop", file.path());
        {
            let db = provider.metadata_mut().unwrap();
            assert!(db.remove_table("[dbo].[Order]"));
        }
        // The mutation sticks while the cache is warm.
        assert!(provider
            .metadata()
            .unwrap()
            .find::<Table>("[dbo].[Order]")
            .is_none());

        provider.reload();
        assert!(provider
            .metadata()
            .unwrap()
            .find::<Table>("[dbo].[Order]")
            .is_some());
    }

    #[test]
    fn test_missing_schema_file_errors() {
        let mut provider = MetadataProvider::new("Shop", "/nonexistent/schema.sql");
        assert!(provider.metadata().is_err());
    }
}

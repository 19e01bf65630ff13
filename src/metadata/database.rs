//! Root of the metadata graph: global item index, construction feed and
//! the cascading removal engine

use std::collections::{HashMap, HashSet};

use crate::error::{Result, SchemagenError};

use super::collection::MetadataCollection;
use super::item::{bracket, ItemRef, MetadataBag, MetadataItem};
use super::model::{
    Column, ColumnFacets, ColumnRef, DatabaseIndex, ForeignKey, ForeignKeyAction, ForeignKeyRef,
    IndexRef, Schema, Table, Trigger,
};
use super::types::HostType;

/// Path to an item inside the ownership tree, stored in the root index.
#[derive(Debug, Clone)]
enum ItemLocator {
    Schema {
        schema: String,
    },
    Table {
        schema: String,
        table: String,
    },
    Column {
        schema: String,
        table: String,
        column: String,
    },
    ForeignKey {
        schema: String,
        table: String,
        name: String,
    },
    Index {
        schema: String,
        table: String,
        name: String,
    },
    Trigger {
        schema: String,
        table: String,
        name: String,
    },
}

/// Raw table record from the construction feed.
#[derive(Debug, Clone, Default)]
pub struct TableRow {
    pub schema: String,
    pub name: String,
    pub metadata: MetadataBag,
}

/// Raw column record from the construction feed.
#[derive(Debug, Clone, Default)]
pub struct ColumnRow {
    pub schema: String,
    pub table: String,
    pub name: String,
    pub facets: ColumnFacets,
    pub metadata: MetadataBag,
}

/// Raw foreign key record: one per column pair of the constraint.
#[derive(Debug, Clone, Default)]
pub struct ForeignKeyRow {
    pub name: String,
    pub parent_schema: String,
    pub parent_table: String,
    pub parent_column: String,
    pub target_schema: String,
    pub target_table: String,
    pub target_column: String,
    pub update_action: ForeignKeyAction,
    pub delete_action: ForeignKeyAction,
    pub metadata: MetadataBag,
}

/// Raw trigger record from the construction feed.
#[derive(Debug, Clone, Default)]
pub struct TriggerRow {
    pub schema: String,
    pub table: String,
    pub name: String,
    pub metadata: MetadataBag,
}

/// Raw index-column record: one per column of the index.
#[derive(Debug, Clone, Default)]
pub struct IndexColumnRow {
    pub schema: String,
    pub table: String,
    pub column: String,
    pub index_name: String,
    pub is_unique: bool,
    pub is_clustered: bool,
    pub is_included: bool,
    pub metadata: MetadataBag,
}

/// The root of one database's metadata graph.
///
/// Owns the schema collection, the flat fully-qualified-name index used
/// for global lookup, and the immutable database-type to host-type map.
/// All structural mutation goes through this type so that bidirectional
/// wiring and cascade cleanup stay consistent; single-threaded use only.
#[derive(Debug)]
pub struct DatabaseMetadata {
    name: String,
    schemas: MetadataCollection<Schema>,
    items_index: HashMap<String, ItemLocator>,
    type_mappings: HashMap<String, HostType>,
    in_remove: HashSet<String>,
}

impl DatabaseMetadata {
    pub fn new(name: impl Into<String>, type_mappings: HashMap<String, HostType>) -> Self {
        Self {
            name: name.into(),
            schemas: MetadataCollection::new(),
            items_index: HashMap::new(),
            type_mappings,
            in_remove: HashSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schemas(&self) -> &MetadataCollection<Schema> {
        &self.schemas
    }

    /// Database type name (lowercase) to host type, fixed at construction.
    pub fn type_mappings(&self) -> &HashMap<String, HostType> {
        &self.type_mappings
    }

    /// Host type for a column, or an error naming the unmapped type.
    pub fn host_type(&self, column: &Column) -> Result<HostType> {
        self.type_mappings
            .get(&column.data_type().to_lowercase())
            .copied()
            .ok_or_else(|| SchemagenError::UnmappedDataType {
                column: column.fully_qualified_name().to_string(),
                data_type: column.data_type().to_string(),
            })
    }

    /// Look up a live item by fully qualified name, typed.
    ///
    /// Returns `None` when nothing is registered under the name or the
    /// registered item is of a different kind.
    pub fn find<T: Locate>(&self, fully_qualified_name: &str) -> Option<&T> {
        T::locate(self, fully_qualified_name)
    }

    /// Mutable variant of [`find`](Self::find); gives generators write
    /// access to an item's annotation bag.
    pub fn find_mut<T: Locate>(&mut self, fully_qualified_name: &str) -> Option<&mut T> {
        T::locate_mut(self, fully_qualified_name)
    }

    /// Look up a live item by fully qualified name, type-erased.
    pub fn find_item(&self, fully_qualified_name: &str) -> Option<ItemRef<'_>> {
        match self.items_index.get(fully_qualified_name)? {
            ItemLocator::Schema { schema } => self.schemas.get(schema).map(ItemRef::Schema),
            ItemLocator::Table { schema, table } => {
                self.table_opt(schema, table).map(ItemRef::Table)
            }
            ItemLocator::Column {
                schema,
                table,
                column,
            } => self
                .table_opt(schema, table)
                .and_then(|t| t.columns().get(column))
                .map(ItemRef::Column),
            ItemLocator::ForeignKey {
                schema,
                table,
                name,
            } => self
                .table_opt(schema, table)
                .and_then(|t| t.foreign_keys().get(name))
                .map(ItemRef::ForeignKey),
            ItemLocator::Index {
                schema,
                table,
                name,
            } => self
                .table_opt(schema, table)
                .and_then(|t| t.indexes().get(name))
                .map(ItemRef::Index),
            ItemLocator::Trigger {
                schema,
                table,
                name,
            } => self
                .table_opt(schema, table)
                .and_then(|t| t.triggers().get(name))
                .map(ItemRef::Trigger),
        }
    }

    /// Register an item in the root index. Idempotent: an existing entry
    /// under the same name is kept.
    fn register(&mut self, fully_qualified_name: &str, locator: ItemLocator) {
        self.items_index
            .entry(fully_qualified_name.to_string())
            .or_insert(locator);
    }

    /// Drop an item from the root index; no-op when absent.
    fn deregister(&mut self, fully_qualified_name: &str) {
        self.items_index.remove(fully_qualified_name);
    }

    /// Add the schema if it is not present yet.
    pub fn ensure_schema(&mut self, name: &str) -> Result<()> {
        if self.schemas.contains_key(name) {
            return Ok(());
        }
        let schema = Schema::new(name);
        let fqn = schema.fully_qualified_name().to_string();
        self.schemas.add(schema)?;
        self.register(
            &fqn,
            ItemLocator::Schema {
                schema: name.to_string(),
            },
        );
        Ok(())
    }

    pub fn add_table(&mut self, row: TableRow) -> Result<()> {
        self.ensure_schema(&row.schema)?;
        let table = Table::new(&row.name, &row.schema).with_metadata(row.metadata);
        let fqn = table.fully_qualified_name().to_string();
        let schema = self
            .schemas
            .get_mut(&row.schema)
            .ok_or_else(|| SchemagenError::ItemNotFound(bracket(&row.schema)))?;
        schema.tables_mut().add(table)?;
        self.register(
            &fqn,
            ItemLocator::Table {
                schema: row.schema,
                table: row.name,
            },
        );
        Ok(())
    }

    /// Add a column to its table; the ordinal is the 1-based load position.
    ///
    /// A feed row naming an unknown schema or table is an error, not a
    /// skip: it means the feed arrived out of order.
    pub fn add_column(&mut self, row: ColumnRow) -> Result<()> {
        let table = self.table_mut(&row.schema, &row.table)?;
        let ordinal = table.columns().len() as u32 + 1;
        let column =
            Column::new(&row.name, &row.schema, &row.table, ordinal, row.facets)
                .with_metadata(row.metadata);
        let fqn = column.fully_qualified_name().to_string();
        table.columns_mut().add(column)?;
        self.register(
            &fqn,
            ItemLocator::Column {
                schema: row.schema,
                table: row.table,
                column: row.name,
            },
        );
        Ok(())
    }

    /// Add one column pair of a foreign key, creating the key on first use.
    ///
    /// Wiring performed per pair: the from column gains its outgoing
    /// back-reference, the target table and target column gain incoming
    /// handles. From/to columns are appended together, so the pairing
    /// invariant holds after every call.
    pub fn add_foreign_key(&mut self, row: ForeignKeyRow) -> Result<()> {
        let parent_fqn = format!(
            "{}.{}",
            bracket(&row.parent_schema),
            bracket(&row.parent_table)
        );
        let target_fqn = format!(
            "{}.{}",
            bracket(&row.target_schema),
            bracket(&row.target_table)
        );

        // Both endpoints must already be loaded.
        let parent = self.table_checked(&row.parent_schema, &row.parent_table)?;
        if !parent.columns().contains_key(&row.parent_column) {
            return Err(SchemagenError::ItemNotFound(format!(
                "{parent_fqn}.{}",
                bracket(&row.parent_column)
            )));
        }
        let target = self.table_checked(&row.target_schema, &row.target_table)?;
        if !target.columns().contains_key(&row.target_column) {
            return Err(SchemagenError::ItemNotFound(format!(
                "{target_fqn}.{}",
                bracket(&row.target_column)
            )));
        }

        let fk_fqn = format!("{parent_fqn}.{}", bracket(&row.name));

        {
            let parent = self.table_mut(&row.parent_schema, &row.parent_table)?;
            if !parent.foreign_keys().contains_key(&row.name) {
                let fk = ForeignKey::new(
                    &row.name,
                    &parent_fqn,
                    &target_fqn,
                    row.update_action,
                    row.delete_action,
                )
                .with_metadata(row.metadata);
                parent.foreign_keys_mut().add(fk)?;
            }
        }
        self.register(
            &fk_fqn,
            ItemLocator::ForeignKey {
                schema: row.parent_schema.clone(),
                table: row.parent_table.clone(),
                name: row.name.clone(),
            },
        );

        let fk_ref = ForeignKeyRef::new(&row.name, &fk_fqn, &parent_fqn, &target_fqn);

        {
            let parent = self.table_mut(&row.parent_schema, &row.parent_table)?;
            let from_ref = ColumnRef::new(
                &row.parent_column,
                &format!("{parent_fqn}.{}", bracket(&row.parent_column)),
            );
            let to_ref = ColumnRef::new(
                &row.target_column,
                &format!("{target_fqn}.{}", bracket(&row.target_column)),
            );
            let fk = parent
                .foreign_keys_mut()
                .get_mut(&row.name)
                .ok_or_else(|| SchemagenError::ItemNotFound(fk_fqn.clone()))?;
            fk.from_columns_mut().add(from_ref)?;
            fk.to_columns_mut().add(to_ref)?;
            if let Some(column) = parent.columns_mut().get_mut(&row.parent_column) {
                column.set_foreign_key(Some(fk_ref.clone()));
            }
        }

        {
            let target = self.table_mut(&row.target_schema, &row.target_table)?;
            if !target.incoming_foreign_keys().contains_key(&row.name) {
                target.incoming_foreign_keys_mut().add(fk_ref.clone())?;
            }
            if let Some(column) = target.columns_mut().get_mut(&row.target_column) {
                if !column.incoming_foreign_keys().contains_key(&row.name) {
                    column.incoming_foreign_keys_mut().add(fk_ref)?;
                }
            }
        }
        Ok(())
    }

    pub fn add_trigger(&mut self, row: TriggerRow) -> Result<()> {
        let table_fqn = format!("{}.{}", bracket(&row.schema), bracket(&row.table));
        let table = self.table_mut(&row.schema, &row.table)?;
        let trigger = Trigger::new(&row.name, &table_fqn).with_metadata(row.metadata);
        let fqn = trigger.fully_qualified_name().to_string();
        table.triggers_mut().add(trigger)?;
        self.register(
            &fqn,
            ItemLocator::Trigger {
                schema: row.schema,
                table: row.table,
                name: row.name,
            },
        );
        Ok(())
    }

    /// Add one column of an index, creating the index on first use and
    /// registering the index handle on the column's key or include list.
    pub fn add_index_column(&mut self, row: IndexColumnRow) -> Result<()> {
        let table_fqn = format!("{}.{}", bracket(&row.schema), bracket(&row.table));
        let index_fqn = format!("{table_fqn}.{}", bracket(&row.index_name));
        {
            let table = self.table_mut(&row.schema, &row.table)?;
            if !table.columns().contains_key(&row.column) {
                return Err(SchemagenError::ItemNotFound(format!(
                    "{table_fqn}.{}",
                    bracket(&row.column)
                )));
            }
            if !table.indexes().contains_key(&row.index_name) {
                let index =
                    DatabaseIndex::new(&row.index_name, &table_fqn, row.is_unique, row.is_clustered)
                        .with_metadata(row.metadata);
                table.indexes_mut().add(index)?;
            }
            let column_ref = ColumnRef::new(
                &row.column,
                &format!("{table_fqn}.{}", bracket(&row.column)),
            );
            let index = table
                .indexes_mut()
                .get_mut(&row.index_name)
                .ok_or_else(|| SchemagenError::ItemNotFound(index_fqn.clone()))?;
            if row.is_included {
                index.included_columns_mut().add(column_ref)?;
            } else {
                index.columns_mut().add(column_ref)?;
            }
            let index_ref = IndexRef::new(&row.index_name, &index_fqn);
            if let Some(column) = table.columns_mut().get_mut(&row.column) {
                let registry = if row.is_included {
                    column.index_includes_mut()
                } else {
                    column.indexes_mut()
                };
                if !registry.contains_key(&row.index_name) {
                    registry.add(index_ref)?;
                }
            }
        }
        self.register(
            &index_fqn,
            ItemLocator::Index {
                schema: row.schema,
                table: row.table,
                name: row.index_name,
            },
        );
        Ok(())
    }

    /// Remove a foreign key, detaching it from both endpoints.
    ///
    /// Returns false when the key is unknown or its removal is already in
    /// progress (re-entrant calls are silent no-ops).
    pub fn remove_foreign_key(&mut self, fully_qualified_name: &str) -> bool {
        if self.in_remove.contains(fully_qualified_name) {
            return false;
        }
        let Some(ItemLocator::ForeignKey {
            schema,
            table,
            name,
        }) = self.items_index.get(fully_qualified_name).cloned()
        else {
            return false;
        };
        self.in_remove.insert(fully_qualified_name.to_string());

        let removed = self
            .table_mut_opt(&schema, &table)
            .and_then(|t| t.foreign_keys_mut().remove(&name));

        let mut detached = false;
        if let Some(fk) = removed {
            if let Some(parent) = self.table_mut_opt(&schema, &table) {
                for column_ref in fk.from_columns() {
                    if let Some(column) = parent.columns_mut().get_mut(column_ref.name()) {
                        let points_here = column
                            .foreign_key()
                            .is_some_and(|f| f.fully_qualified_name() == fully_qualified_name);
                        if points_here {
                            column.set_foreign_key(None);
                        }
                    }
                }
            }
            if let Some((target_schema, target_table)) = self.locate_table(fk.target_table()) {
                if let Some(target) = self.table_mut_opt(&target_schema, &target_table) {
                    target.incoming_foreign_keys_mut().remove(&name);
                    for column_ref in fk.to_columns() {
                        if let Some(column) = target.columns_mut().get_mut(column_ref.name()) {
                            column.incoming_foreign_keys_mut().remove(&name);
                        }
                    }
                }
            }
            self.deregister(fully_qualified_name);
            detached = true;
        }

        self.in_remove.remove(fully_qualified_name);
        detached
    }

    /// Remove a table, cascading to every foreign key that touches it.
    ///
    /// After this returns true, no schema, table or column anywhere in the
    /// graph retains a reference to the table or to any of its keys, and
    /// the table's whole subtree is gone from the root index.
    pub fn remove_table(&mut self, fully_qualified_name: &str) -> bool {
        if self.in_remove.contains(fully_qualified_name) {
            return false;
        }
        let Some(ItemLocator::Table { schema, table }) =
            self.items_index.get(fully_qualified_name).cloned()
        else {
            return false;
        };
        self.in_remove.insert(fully_qualified_name.to_string());

        // Snapshot the key edges first; the cascade mutates the
        // collections being walked.
        let mut edges: Vec<String> = Vec::new();
        if let Some(t) = self.table_opt(&schema, &table) {
            edges.extend(
                t.foreign_keys()
                    .iter()
                    .map(|fk| fk.fully_qualified_name().to_string()),
            );
            edges.extend(
                t.incoming_foreign_keys()
                    .iter()
                    .map(|fk| fk.fully_qualified_name().to_string()),
            );
        }
        for edge in &edges {
            self.remove_foreign_key(edge);
        }

        let removed = self
            .schemas
            .get_mut(&schema)
            .and_then(|s| s.tables_mut().remove(&table));
        let detached = removed.is_some();
        if let Some(t) = removed {
            self.deregister_table_subtree(&t);
        }
        self.deregister(fully_qualified_name);

        self.in_remove.remove(fully_qualified_name);
        detached
    }

    /// Remove a column, cascading to every foreign key that uses it and
    /// stripping it from the indexes it participates in.
    pub fn remove_column(&mut self, fully_qualified_name: &str) -> bool {
        if self.in_remove.contains(fully_qualified_name) {
            return false;
        }
        let Some(ItemLocator::Column {
            schema,
            table,
            column,
        }) = self.items_index.get(fully_qualified_name).cloned()
        else {
            return false;
        };
        self.in_remove.insert(fully_qualified_name.to_string());

        let mut edges: Vec<String> = Vec::new();
        let mut key_indexes: Vec<String> = Vec::new();
        let mut include_indexes: Vec<String> = Vec::new();
        if let Some(col) = self
            .table_opt(&schema, &table)
            .and_then(|t| t.columns().get(&column))
        {
            if let Some(fk) = col.foreign_key() {
                edges.push(fk.fully_qualified_name().to_string());
            }
            edges.extend(
                col.incoming_foreign_keys()
                    .iter()
                    .map(|fk| fk.fully_qualified_name().to_string()),
            );
            key_indexes.extend(col.indexes().keys().map(String::from));
            include_indexes.extend(col.index_includes().keys().map(String::from));
        }
        for edge in &edges {
            self.remove_foreign_key(edge);
        }

        let mut detached = false;
        if let Some(t) = self.table_mut_opt(&schema, &table) {
            for index_name in &key_indexes {
                if let Some(index) = t.indexes_mut().get_mut(index_name) {
                    index.columns_mut().remove(&column);
                }
            }
            for index_name in &include_indexes {
                if let Some(index) = t.indexes_mut().get_mut(index_name) {
                    index.included_columns_mut().remove(&column);
                }
            }
            detached = t.columns_mut().remove(&column).is_some();
        }
        self.deregister(fully_qualified_name);

        self.in_remove.remove(fully_qualified_name);
        detached
    }

    /// Remove an index from its table and the root index.
    ///
    /// Column-side index handles are left in place; they no longer resolve
    /// through the root index. Columns scrub their own handle lists when
    /// they are removed themselves.
    pub fn remove_index(&mut self, fully_qualified_name: &str) -> bool {
        if self.in_remove.contains(fully_qualified_name) {
            return false;
        }
        let Some(ItemLocator::Index {
            schema,
            table,
            name,
        }) = self.items_index.get(fully_qualified_name).cloned()
        else {
            return false;
        };
        self.in_remove.insert(fully_qualified_name.to_string());

        let detached = self
            .table_mut_opt(&schema, &table)
            .and_then(|t| t.indexes_mut().remove(&name))
            .is_some();
        self.deregister(fully_qualified_name);

        self.in_remove.remove(fully_qualified_name);
        detached
    }

    pub fn remove_trigger(&mut self, fully_qualified_name: &str) -> bool {
        if self.in_remove.contains(fully_qualified_name) {
            return false;
        }
        let Some(ItemLocator::Trigger {
            schema,
            table,
            name,
        }) = self.items_index.get(fully_qualified_name).cloned()
        else {
            return false;
        };
        self.in_remove.insert(fully_qualified_name.to_string());

        let detached = self
            .table_mut_opt(&schema, &table)
            .and_then(|t| t.triggers_mut().remove(&name))
            .is_some();
        self.deregister(fully_qualified_name);

        self.in_remove.remove(fully_qualified_name);
        detached
    }

    /// Remove a schema and, cascading, every table it contains.
    pub fn remove_schema(&mut self, name: &str) -> bool {
        let fqn = bracket(name);
        if self.in_remove.contains(&fqn) {
            return false;
        }
        if !self.schemas.contains_key(name) {
            return false;
        }
        self.in_remove.insert(fqn.clone());

        let tables: Vec<String> = self
            .schemas
            .get(name)
            .map(|s| {
                s.tables()
                    .iter()
                    .map(|t| t.fully_qualified_name().to_string())
                    .collect()
            })
            .unwrap_or_default();
        for table in &tables {
            self.remove_table(table);
        }

        let detached = self.schemas.remove(name).is_some();
        self.deregister(&fqn);

        self.in_remove.remove(&fqn);
        detached
    }

    fn table_opt(&self, schema: &str, table: &str) -> Option<&Table> {
        self.schemas.get(schema)?.tables().get(table)
    }

    fn table_mut_opt(&mut self, schema: &str, table: &str) -> Option<&mut Table> {
        self.schemas.get_mut(schema)?.tables_mut().get_mut(table)
    }

    fn table_checked(&self, schema: &str, table: &str) -> Result<&Table> {
        self.table_opt(schema, table).ok_or_else(|| {
            SchemagenError::ItemNotFound(format!("{}.{}", bracket(schema), bracket(table)))
        })
    }

    fn table_mut(&mut self, schema: &str, table: &str) -> Result<&mut Table> {
        // Formats the error eagerly to keep the borrow short.
        let missing =
            SchemagenError::ItemNotFound(format!("{}.{}", bracket(schema), bracket(table)));
        self.table_mut_opt(schema, table).ok_or(missing)
    }

    fn locate_table(&self, table_fqn: &str) -> Option<(String, String)> {
        match self.items_index.get(table_fqn) {
            Some(ItemLocator::Table { schema, table }) => Some((schema.clone(), table.clone())),
            _ => None,
        }
    }

    fn deregister_table_subtree(&mut self, table: &Table) {
        let mut doomed: Vec<String> = Vec::new();
        doomed.extend(
            table
                .columns()
                .iter()
                .map(|c| c.fully_qualified_name().to_string()),
        );
        doomed.extend(
            table
                .triggers()
                .iter()
                .map(|t| t.fully_qualified_name().to_string()),
        );
        doomed.extend(
            table
                .indexes()
                .iter()
                .map(|i| i.fully_qualified_name().to_string()),
        );
        doomed.extend(
            table
                .foreign_keys()
                .iter()
                .map(|fk| fk.fully_qualified_name().to_string()),
        );
        for fqn in doomed {
            self.items_index.remove(&fqn);
        }
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Schema {}
    impl Sealed for super::Table {}
    impl Sealed for super::Column {}
    impl Sealed for super::ForeignKey {}
    impl Sealed for super::DatabaseIndex {}
    impl Sealed for super::Trigger {}
}

/// Entity types that can be resolved through the root index.
///
/// Implemented by the six graph entities only; use through
/// [`DatabaseMetadata::find`] and [`DatabaseMetadata::find_mut`].
pub trait Locate: sealed::Sealed + Sized {
    #[doc(hidden)]
    fn locate<'a>(db: &'a DatabaseMetadata, fqn: &str) -> Option<&'a Self>;

    #[doc(hidden)]
    fn locate_mut<'a>(db: &'a mut DatabaseMetadata, fqn: &str) -> Option<&'a mut Self>;
}

impl Locate for Schema {
    fn locate<'a>(db: &'a DatabaseMetadata, fqn: &str) -> Option<&'a Self> {
        match db.items_index.get(fqn)? {
            ItemLocator::Schema { schema } => db.schemas.get(schema),
            _ => None,
        }
    }

    fn locate_mut<'a>(db: &'a mut DatabaseMetadata, fqn: &str) -> Option<&'a mut Self> {
        let locator = db.items_index.get(fqn)?.clone();
        match locator {
            ItemLocator::Schema { schema } => db.schemas.get_mut(&schema),
            _ => None,
        }
    }
}

impl Locate for Table {
    fn locate<'a>(db: &'a DatabaseMetadata, fqn: &str) -> Option<&'a Self> {
        match db.items_index.get(fqn)? {
            ItemLocator::Table { schema, table } => db.table_opt(schema, table),
            _ => None,
        }
    }

    fn locate_mut<'a>(db: &'a mut DatabaseMetadata, fqn: &str) -> Option<&'a mut Self> {
        let locator = db.items_index.get(fqn)?.clone();
        match locator {
            ItemLocator::Table { schema, table } => db.table_mut_opt(&schema, &table),
            _ => None,
        }
    }
}

impl Locate for Column {
    fn locate<'a>(db: &'a DatabaseMetadata, fqn: &str) -> Option<&'a Self> {
        match db.items_index.get(fqn)? {
            ItemLocator::Column {
                schema,
                table,
                column,
            } => db.table_opt(schema, table)?.columns().get(column),
            _ => None,
        }
    }

    fn locate_mut<'a>(db: &'a mut DatabaseMetadata, fqn: &str) -> Option<&'a mut Self> {
        let locator = db.items_index.get(fqn)?.clone();
        match locator {
            ItemLocator::Column {
                schema,
                table,
                column,
            } => db
                .table_mut_opt(&schema, &table)?
                .columns_mut()
                .get_mut(&column),
            _ => None,
        }
    }
}

impl Locate for ForeignKey {
    fn locate<'a>(db: &'a DatabaseMetadata, fqn: &str) -> Option<&'a Self> {
        match db.items_index.get(fqn)? {
            ItemLocator::ForeignKey {
                schema,
                table,
                name,
            } => db.table_opt(schema, table)?.foreign_keys().get(name),
            _ => None,
        }
    }

    fn locate_mut<'a>(db: &'a mut DatabaseMetadata, fqn: &str) -> Option<&'a mut Self> {
        let locator = db.items_index.get(fqn)?.clone();
        match locator {
            ItemLocator::ForeignKey {
                schema,
                table,
                name,
            } => db
                .table_mut_opt(&schema, &table)?
                .foreign_keys_mut()
                .get_mut(&name),
            _ => None,
        }
    }
}

impl Locate for DatabaseIndex {
    fn locate<'a>(db: &'a DatabaseMetadata, fqn: &str) -> Option<&'a Self> {
        match db.items_index.get(fqn)? {
            ItemLocator::Index {
                schema,
                table,
                name,
            } => db.table_opt(schema, table)?.indexes().get(name),
            _ => None,
        }
    }

    fn locate_mut<'a>(db: &'a mut DatabaseMetadata, fqn: &str) -> Option<&'a mut Self> {
        let locator = db.items_index.get(fqn)?.clone();
        match locator {
            ItemLocator::Index {
                schema,
                table,
                name,
            } => db
                .table_mut_opt(&schema, &table)?
                .indexes_mut()
                .get_mut(&name),
            _ => None,
        }
    }
}

impl Locate for Trigger {
    fn locate<'a>(db: &'a DatabaseMetadata, fqn: &str) -> Option<&'a Self> {
        match db.items_index.get(fqn)? {
            ItemLocator::Trigger {
                schema,
                table,
                name,
            } => db.table_opt(schema, table)?.triggers().get(name),
            _ => None,
        }
    }

    fn locate_mut<'a>(db: &'a mut DatabaseMetadata, fqn: &str) -> Option<&'a mut Self> {
        let locator = db.items_index.get(fqn)?.clone();
        match locator {
            ItemLocator::Trigger {
                schema,
                table,
                name,
            } => db
                .table_mut_opt(&schema, &table)?
                .triggers_mut()
                .get_mut(&name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::types::sql_server_type_mappings;

    fn empty_db() -> DatabaseMetadata {
        DatabaseMetadata::new("TestDb", sql_server_type_mappings())
    }

    fn int_column(schema: &str, table: &str, name: &str, is_key: bool) -> ColumnRow {
        ColumnRow {
            schema: schema.to_string(),
            table: table.to_string(),
            name: name.to_string(),
            facets: ColumnFacets {
                data_type: "int".to_string(),
                is_key,
                ..ColumnFacets::default()
            },
            ..ColumnRow::default()
        }
    }

    fn table_row(schema: &str, name: &str) -> TableRow {
        TableRow {
            schema: schema.to_string(),
            name: name.to_string(),
            ..TableRow::default()
        }
    }

    fn fk_row(
        name: &str,
        parent: (&str, &str, &str),
        target: (&str, &str, &str),
    ) -> ForeignKeyRow {
        ForeignKeyRow {
            name: name.to_string(),
            parent_schema: parent.0.to_string(),
            parent_table: parent.1.to_string(),
            parent_column: parent.2.to_string(),
            target_schema: target.0.to_string(),
            target_table: target.1.to_string(),
            target_column: target.2.to_string(),
            ..ForeignKeyRow::default()
        }
    }

    /// Customer(Id) <- Order(Id, CustomerId)
    fn customer_order_db() -> DatabaseMetadata {
        let mut db = empty_db();
        db.add_table(table_row("dbo", "Customer")).unwrap();
        db.add_table(table_row("dbo", "Order")).unwrap();
        db.add_column(int_column("dbo", "Customer", "Id", true)).unwrap();
        db.add_column(int_column("dbo", "Order", "Id", true)).unwrap();
        db.add_column(int_column("dbo", "Order", "CustomerId", false))
            .unwrap();
        db.add_foreign_key(fk_row(
            "FK_Order_Customer",
            ("dbo", "Order", "CustomerId"),
            ("dbo", "Customer", "Id"),
        ))
        .unwrap();
        db
    }

    #[test]
    fn test_foreign_key_wiring() {
        let db = customer_order_db();
        let order: &Table = db.find("[dbo].[Order]").unwrap();
        let customer: &Table = db.find("[dbo].[Customer]").unwrap();

        assert_eq!(order.foreign_keys().len(), 1);
        assert_eq!(customer.incoming_foreign_keys().len(), 1);

        let fk = &order.foreign_keys()["FK_Order_Customer"];
        assert_eq!(fk.parent_table(), "[dbo].[Order]");
        assert_eq!(fk.target_table(), "[dbo].[Customer]");
        assert_eq!(fk.from_columns().len(), fk.to_columns().len());

        let customer_id = order.columns().get("CustomerId").unwrap();
        assert_eq!(
            customer_id.foreign_key().unwrap().name(),
            "FK_Order_Customer"
        );
        let target_id = customer.columns().get("Id").unwrap();
        assert_eq!(target_id.incoming_foreign_keys().len(), 1);
    }

    #[test]
    fn test_find_by_fully_qualified_name() {
        let db = customer_order_db();
        let column: &Column = db.find("[dbo].[Order].[CustomerId]").unwrap();
        assert_eq!(column.ordinal(), 2);
        // Wrong type for a registered name resolves to nothing.
        assert!(db.find::<Table>("[dbo].[Order].[CustomerId]").is_none());
        assert!(db.find::<Table>("[dbo].[Ghost]").is_none());
    }

    #[test]
    fn test_add_to_index_is_idempotent() {
        let mut db = customer_order_db();
        // Re-registering an existing name keeps the first entry.
        db.register(
            "[dbo].[Customer]",
            ItemLocator::Table {
                schema: "dbo".to_string(),
                table: "Nonsense".to_string(),
            },
        );
        assert!(db.find::<Table>("[dbo].[Customer]").is_some());
    }

    #[test]
    fn test_column_feed_row_for_unknown_table_errors() {
        let mut db = empty_db();
        let err = db
            .add_column(int_column("dbo", "Missing", "Id", false))
            .unwrap_err();
        assert!(matches!(err, SchemagenError::ItemNotFound(_)));
    }

    #[test]
    fn test_remove_table_cascades_both_directions() {
        let mut db = customer_order_db();
        assert!(db.remove_table("[dbo].[Customer]"));

        let dbo: &Schema = db.find("[dbo]").unwrap();
        assert!(!dbo.tables().contains_key("Customer"));

        let order: &Table = db.find("[dbo].[Order]").unwrap();
        assert_eq!(order.foreign_keys().len(), 0);
        let customer_id = order.columns().get("CustomerId").unwrap();
        assert!(customer_id.foreign_key().is_none());

        // The key and the whole Customer subtree are gone from the index.
        assert!(db
            .find::<ForeignKey>("[dbo].[Order].[FK_Order_Customer]")
            .is_none());
        assert!(db.find_item("[dbo].[Customer].[Id]").is_none());
    }

    #[test]
    fn test_removal_is_idempotent_and_reentrant_safe() {
        // Mutual references: A -> B and B -> A.
        let mut db = empty_db();
        db.add_table(table_row("dbo", "A")).unwrap();
        db.add_table(table_row("dbo", "B")).unwrap();
        db.add_column(int_column("dbo", "A", "Id", true)).unwrap();
        db.add_column(int_column("dbo", "A", "BId", false)).unwrap();
        db.add_column(int_column("dbo", "B", "Id", true)).unwrap();
        db.add_column(int_column("dbo", "B", "AId", false)).unwrap();
        db.add_foreign_key(fk_row("FK_A_B", ("dbo", "A", "BId"), ("dbo", "B", "Id")))
            .unwrap();
        db.add_foreign_key(fk_row("FK_B_A", ("dbo", "B", "AId"), ("dbo", "A", "Id")))
            .unwrap();

        assert!(db.remove_table("[dbo].[A]"));
        assert!(!db.remove_table("[dbo].[A]"));

        let b: &Table = db.find("[dbo].[B]").unwrap();
        assert_eq!(b.foreign_keys().len(), 0);
        assert_eq!(b.incoming_foreign_keys().len(), 0);
        assert!(db.find::<ForeignKey>("[dbo].[A].[FK_A_B]").is_none());
        assert!(db.find::<ForeignKey>("[dbo].[B].[FK_B_A]").is_none());
    }

    #[test]
    fn test_remove_column_strips_index_membership() {
        let mut db = customer_order_db();
        db.add_index_column(IndexColumnRow {
            schema: "dbo".to_string(),
            table: "Order".to_string(),
            column: "CustomerId".to_string(),
            index_name: "IX_Order_CustomerId".to_string(),
            ..IndexColumnRow::default()
        })
        .unwrap();

        assert!(db.remove_column("[dbo].[Order].[CustomerId]"));

        let order: &Table = db.find("[dbo].[Order]").unwrap();
        assert!(!order.columns().contains_key("CustomerId"));
        let index = order.indexes().get("IX_Order_CustomerId").unwrap();
        assert_eq!(index.columns().len(), 0);
        // The column's outgoing key went with it.
        assert_eq!(order.foreign_keys().len(), 0);
        assert!(db.find_item("[dbo].[Order].[CustomerId]").is_none());
    }

    #[test]
    fn test_remove_index_leaves_column_handles_behind() {
        let mut db = customer_order_db();
        db.add_index_column(IndexColumnRow {
            schema: "dbo".to_string(),
            table: "Order".to_string(),
            column: "CustomerId".to_string(),
            index_name: "IX_Order_CustomerId".to_string(),
            ..IndexColumnRow::default()
        })
        .unwrap();

        assert!(db.remove_index("[dbo].[Order].[IX_Order_CustomerId]"));

        let order: &Table = db.find("[dbo].[Order]").unwrap();
        assert!(!order.indexes().contains_key("IX_Order_CustomerId"));
        // The column keeps its handle, which now resolves to nothing.
        let column = order.columns().get("CustomerId").unwrap();
        assert!(column.indexes().contains_key("IX_Order_CustomerId"));
        assert!(db
            .find_item("[dbo].[Order].[IX_Order_CustomerId]")
            .is_none());
    }

    #[test]
    fn test_remove_schema_cascades_through_tables() {
        let mut db = customer_order_db();
        assert!(db.remove_schema("dbo"));
        assert!(db.schemas().is_empty());
        assert!(db.find_item("[dbo]").is_none());
        assert!(db.find_item("[dbo].[Order]").is_none());
        assert!(db.find_item("[dbo].[Order].[Id]").is_none());
    }

    #[test]
    fn test_trigger_lifecycle() {
        let mut db = customer_order_db();
        db.add_trigger(TriggerRow {
            schema: "dbo".to_string(),
            table: "Order".to_string(),
            name: "TR_Order_Audit".to_string(),
            ..TriggerRow::default()
        })
        .unwrap();

        assert!(db
            .find::<Trigger>("[dbo].[Order].[TR_Order_Audit]")
            .is_some());
        assert!(db.remove_trigger("[dbo].[Order].[TR_Order_Audit]"));
        assert!(db
            .find::<Trigger>("[dbo].[Order].[TR_Order_Audit]")
            .is_none());
        let order: &Table = db.find("[dbo].[Order]").unwrap();
        assert!(order.triggers().is_empty());
    }
}

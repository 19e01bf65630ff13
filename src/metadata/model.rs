//! Schema graph entities: Schema, Table, Column, ForeignKey,
//! DatabaseIndex and Trigger
//!
//! Ownership runs strictly downward (database -> schema -> table ->
//! column/key/trigger/index). Every upward or sideways reference is a
//! non-owning, name-based handle so that removing an entity can never
//! leave a pointer to freed data; handles that outlive their target
//! simply stop resolving through the root index.

use super::collection::MetadataCollection;
use super::item::{bracket, MetadataBag, MetadataItem};

/// Referential action attached to a foreign key constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForeignKeyAction {
    #[default]
    NoAction,
    Cascade,
    SetNull,
    SetDefault,
}

impl ForeignKeyAction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ForeignKeyAction::NoAction => "NO ACTION",
            ForeignKeyAction::Cascade => "CASCADE",
            ForeignKeyAction::SetNull => "SET NULL",
            ForeignKeyAction::SetDefault => "SET DEFAULT",
        }
    }
}

macro_rules! impl_item_identity {
    ($ty:ty) => {
        impl MetadataItem for $ty {
            fn name(&self) -> &str {
                &self.name
            }

            fn fully_qualified_name(&self) -> &str {
                &self.fully_qualified_name
            }
        }

        // Structural identity: same concrete type, same simple name. Two
        // same-named items under different parents compare equal, matching
        // the original tool's behavior.
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.name == other.name
            }
        }

        impl Eq for $ty {}

        impl std::hash::Hash for $ty {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                self.name.hash(state);
            }
        }
    };
}

/// Non-owning handle to a column, by name and fully qualified name.
#[derive(Debug, Clone)]
pub struct ColumnRef {
    name: String,
    fully_qualified_name: String,
}

impl ColumnRef {
    pub(crate) fn new(name: &str, fully_qualified_name: &str) -> Self {
        Self {
            name: name.to_string(),
            fully_qualified_name: fully_qualified_name.to_string(),
        }
    }
}

impl_item_identity!(ColumnRef);

/// Non-owning handle to an index, by name and fully qualified name.
#[derive(Debug, Clone)]
pub struct IndexRef {
    name: String,
    fully_qualified_name: String,
}

impl IndexRef {
    pub(crate) fn new(name: &str, fully_qualified_name: &str) -> Self {
        Self {
            name: name.to_string(),
            fully_qualified_name: fully_qualified_name.to_string(),
        }
    }
}

impl_item_identity!(IndexRef);

/// Non-owning handle to a foreign key, carrying both endpoint tables so
/// that incoming-edge queries need no extra lookups.
#[derive(Debug, Clone)]
pub struct ForeignKeyRef {
    name: String,
    fully_qualified_name: String,
    parent_table: String,
    target_table: String,
}

impl ForeignKeyRef {
    pub(crate) fn new(
        name: &str,
        fully_qualified_name: &str,
        parent_table: &str,
        target_table: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            fully_qualified_name: fully_qualified_name.to_string(),
            parent_table: parent_table.to_string(),
            target_table: target_table.to_string(),
        }
    }

    /// Fully qualified name of the referencing ("from") table.
    pub fn parent_table(&self) -> &str {
        &self.parent_table
    }

    /// Fully qualified name of the referenced ("to") table.
    pub fn target_table(&self) -> &str {
        &self.target_table
    }
}

impl_item_identity!(ForeignKeyRef);

/// A database schema: a named container of tables.
#[derive(Debug)]
pub struct Schema {
    name: String,
    fully_qualified_name: String,
    tables: MetadataCollection<Table>,
    metadata: MetadataBag,
}

impl Schema {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fully_qualified_name: bracket(name),
            tables: MetadataCollection::new(),
            metadata: MetadataBag::new(),
        }
    }

    pub fn tables(&self) -> &MetadataCollection<Table> {
        &self.tables
    }

    pub(crate) fn tables_mut(&mut self) -> &mut MetadataCollection<Table> {
        &mut self.tables
    }

    pub fn metadata(&self) -> &MetadataBag {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut MetadataBag {
        &mut self.metadata
    }
}

impl_item_identity!(Schema);

/// A table with its columns, key constraints, triggers and indexes.
///
/// `foreign_keys` holds the outgoing keys this table declares (owned);
/// `incoming_foreign_keys` mirrors the keys of other tables that reference
/// this one, as handles maintained by the graph's wiring.
#[derive(Debug)]
pub struct Table {
    name: String,
    fully_qualified_name: String,
    schema_name: String,
    columns: MetadataCollection<Column>,
    foreign_keys: MetadataCollection<ForeignKey>,
    incoming_foreign_keys: MetadataCollection<ForeignKeyRef>,
    triggers: MetadataCollection<Trigger>,
    indexes: MetadataCollection<DatabaseIndex>,
    metadata: MetadataBag,
}

impl Table {
    pub(crate) fn new(name: &str, schema_name: &str) -> Self {
        Self {
            name: name.to_string(),
            fully_qualified_name: format!("{}.{}", bracket(schema_name), bracket(name)),
            schema_name: schema_name.to_string(),
            columns: MetadataCollection::new(),
            foreign_keys: MetadataCollection::new(),
            incoming_foreign_keys: MetadataCollection::new(),
            triggers: MetadataCollection::new(),
            indexes: MetadataCollection::new(),
            metadata: MetadataBag::new(),
        }
    }

    pub(crate) fn with_metadata(mut self, bag: MetadataBag) -> Self {
        self.metadata.extend(bag);
        self
    }

    /// Simple name of the owning schema.
    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    pub fn columns(&self) -> &MetadataCollection<Column> {
        &self.columns
    }

    /// Outgoing foreign keys declared by this table.
    pub fn foreign_keys(&self) -> &MetadataCollection<ForeignKey> {
        &self.foreign_keys
    }

    /// Foreign keys of other tables that reference this table.
    pub fn incoming_foreign_keys(&self) -> &MetadataCollection<ForeignKeyRef> {
        &self.incoming_foreign_keys
    }

    pub fn triggers(&self) -> &MetadataCollection<Trigger> {
        &self.triggers
    }

    pub fn indexes(&self) -> &MetadataCollection<DatabaseIndex> {
        &self.indexes
    }

    pub fn metadata(&self) -> &MetadataBag {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut MetadataBag {
        &mut self.metadata
    }

    /// Columns participating in the primary key, in ordinal order.
    pub fn key_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|column| column.is_key())
    }

    pub(crate) fn columns_mut(&mut self) -> &mut MetadataCollection<Column> {
        &mut self.columns
    }

    pub(crate) fn foreign_keys_mut(&mut self) -> &mut MetadataCollection<ForeignKey> {
        &mut self.foreign_keys
    }

    pub(crate) fn incoming_foreign_keys_mut(&mut self) -> &mut MetadataCollection<ForeignKeyRef> {
        &mut self.incoming_foreign_keys
    }

    pub(crate) fn triggers_mut(&mut self) -> &mut MetadataCollection<Trigger> {
        &mut self.triggers
    }

    pub(crate) fn indexes_mut(&mut self) -> &mut MetadataCollection<DatabaseIndex> {
        &mut self.indexes
    }
}

impl_item_identity!(Table);

/// A table column with its type facets and relationship handles.
#[derive(Debug)]
pub struct Column {
    name: String,
    fully_qualified_name: String,
    table_name: String,
    schema_name: String,
    ordinal: u32,
    data_type: String,
    precision: i32,
    scale: i32,
    max_length: i32,
    is_nullable: bool,
    is_key: bool,
    is_identity: bool,
    is_row_guid_col: bool,
    is_computed: bool,
    default_value: String,
    computed_definition: Option<String>,
    foreign_key: Option<ForeignKeyRef>,
    incoming_foreign_keys: MetadataCollection<ForeignKeyRef>,
    indexes: MetadataCollection<IndexRef>,
    index_includes: MetadataCollection<IndexRef>,
    metadata: MetadataBag,
}

/// Column facets as read from the schema source.
#[derive(Debug, Clone, Default)]
pub struct ColumnFacets {
    pub data_type: String,
    pub precision: i32,
    pub scale: i32,
    /// Maximum length; `-1` means unbounded (`MAX`).
    pub max_length: i32,
    pub is_nullable: bool,
    pub is_key: bool,
    pub is_identity: bool,
    pub is_row_guid_col: bool,
    pub is_computed: bool,
    pub default_value: String,
    pub computed_definition: Option<String>,
}

impl Column {
    pub(crate) fn new(name: &str, schema_name: &str, table_name: &str, ordinal: u32, facets: ColumnFacets) -> Self {
        Self {
            name: name.to_string(),
            fully_qualified_name: format!(
                "{}.{}.{}",
                bracket(schema_name),
                bracket(table_name),
                bracket(name)
            ),
            table_name: table_name.to_string(),
            schema_name: schema_name.to_string(),
            ordinal,
            data_type: facets.data_type,
            precision: facets.precision,
            scale: facets.scale,
            max_length: facets.max_length,
            is_nullable: facets.is_nullable,
            is_key: facets.is_key,
            is_identity: facets.is_identity,
            is_row_guid_col: facets.is_row_guid_col,
            is_computed: facets.is_computed,
            default_value: facets.default_value,
            computed_definition: facets.computed_definition,
            foreign_key: None,
            incoming_foreign_keys: MetadataCollection::new(),
            indexes: MetadataCollection::new(),
            index_includes: MetadataCollection::new(),
            metadata: MetadataBag::new(),
        }
    }

    pub(crate) fn with_metadata(mut self, bag: MetadataBag) -> Self {
        self.metadata.extend(bag);
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    /// 1-based position of the column within its table.
    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    /// Database type name, e.g. `nvarchar` or `int`.
    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    pub fn precision(&self) -> i32 {
        self.precision
    }

    pub fn scale(&self) -> i32 {
        self.scale
    }

    /// Maximum length; `-1` means unbounded (`MAX`).
    pub fn max_length(&self) -> i32 {
        self.max_length
    }

    pub fn is_nullable(&self) -> bool {
        self.is_nullable
    }

    pub fn is_key(&self) -> bool {
        self.is_key
    }

    pub fn is_identity(&self) -> bool {
        self.is_identity
    }

    pub fn is_row_guid_col(&self) -> bool {
        self.is_row_guid_col
    }

    pub fn is_computed(&self) -> bool {
        self.is_computed
    }

    /// Raw SQL default expression, or empty when none.
    pub fn default_value(&self) -> &str {
        &self.default_value
    }

    pub fn computed_definition(&self) -> Option<&str> {
        self.computed_definition.as_deref()
    }

    /// The at-most-one outgoing foreign key this column participates in as
    /// a "from" column.
    pub fn foreign_key(&self) -> Option<&ForeignKeyRef> {
        self.foreign_key.as_ref()
    }

    /// Foreign keys of other tables that reference this column.
    pub fn incoming_foreign_keys(&self) -> &MetadataCollection<ForeignKeyRef> {
        &self.incoming_foreign_keys
    }

    /// Indexes this column participates in as a key column.
    pub fn indexes(&self) -> &MetadataCollection<IndexRef> {
        &self.indexes
    }

    /// Indexes that carry this column as a non-key included column.
    pub fn index_includes(&self) -> &MetadataCollection<IndexRef> {
        &self.index_includes
    }

    pub fn metadata(&self) -> &MetadataBag {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut MetadataBag {
        &mut self.metadata
    }

    pub(crate) fn set_foreign_key(&mut self, foreign_key: Option<ForeignKeyRef>) {
        self.foreign_key = foreign_key;
    }

    pub(crate) fn incoming_foreign_keys_mut(&mut self) -> &mut MetadataCollection<ForeignKeyRef> {
        &mut self.incoming_foreign_keys
    }

    pub(crate) fn indexes_mut(&mut self) -> &mut MetadataCollection<IndexRef> {
        &mut self.indexes
    }

    pub(crate) fn index_includes_mut(&mut self) -> &mut MetadataCollection<IndexRef> {
        &mut self.index_includes
    }
}

impl_item_identity!(Column);

/// A foreign key constraint between two tables.
///
/// `from_columns` and `to_columns` are positionally paired: column *i* of
/// the from side references column *i* of the to side. Pairs are only ever
/// added together, so the two collections always have equal length.
#[derive(Debug)]
pub struct ForeignKey {
    name: String,
    fully_qualified_name: String,
    parent_table: String,
    target_table: String,
    from_columns: MetadataCollection<ColumnRef>,
    to_columns: MetadataCollection<ColumnRef>,
    update_action: ForeignKeyAction,
    delete_action: ForeignKeyAction,
    metadata: MetadataBag,
}

impl ForeignKey {
    pub(crate) fn new(
        name: &str,
        parent_table: &str,
        target_table: &str,
        update_action: ForeignKeyAction,
        delete_action: ForeignKeyAction,
    ) -> Self {
        Self {
            name: name.to_string(),
            fully_qualified_name: format!("{parent_table}.{}", bracket(name)),
            parent_table: parent_table.to_string(),
            target_table: target_table.to_string(),
            from_columns: MetadataCollection::new(),
            to_columns: MetadataCollection::new(),
            update_action,
            delete_action,
            metadata: MetadataBag::new(),
        }
    }

    pub(crate) fn with_metadata(mut self, bag: MetadataBag) -> Self {
        self.metadata.extend(bag);
        self
    }

    /// Fully qualified name of the referencing ("from") table.
    pub fn parent_table(&self) -> &str {
        &self.parent_table
    }

    /// Fully qualified name of the referenced ("to") table.
    pub fn target_table(&self) -> &str {
        &self.target_table
    }

    pub fn from_columns(&self) -> &MetadataCollection<ColumnRef> {
        &self.from_columns
    }

    pub fn to_columns(&self) -> &MetadataCollection<ColumnRef> {
        &self.to_columns
    }

    /// The positional column pairs of the constraint.
    pub fn column_pairs(&self) -> impl Iterator<Item = (&ColumnRef, &ColumnRef)> {
        self.from_columns.iter().zip(self.to_columns.iter())
    }

    pub fn update_action(&self) -> ForeignKeyAction {
        self.update_action
    }

    pub fn delete_action(&self) -> ForeignKeyAction {
        self.delete_action
    }

    pub fn metadata(&self) -> &MetadataBag {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut MetadataBag {
        &mut self.metadata
    }

    pub(crate) fn from_columns_mut(&mut self) -> &mut MetadataCollection<ColumnRef> {
        &mut self.from_columns
    }

    pub(crate) fn to_columns_mut(&mut self) -> &mut MetadataCollection<ColumnRef> {
        &mut self.to_columns
    }
}

impl_item_identity!(ForeignKey);

/// A table index with key columns and optional included columns.
#[derive(Debug)]
pub struct DatabaseIndex {
    name: String,
    fully_qualified_name: String,
    table: String,
    is_unique: bool,
    is_clustered: bool,
    columns: MetadataCollection<ColumnRef>,
    included_columns: MetadataCollection<ColumnRef>,
    metadata: MetadataBag,
}

impl DatabaseIndex {
    pub(crate) fn new(name: &str, table: &str, is_unique: bool, is_clustered: bool) -> Self {
        Self {
            name: name.to_string(),
            fully_qualified_name: format!("{table}.{}", bracket(name)),
            table: table.to_string(),
            is_unique,
            is_clustered,
            columns: MetadataCollection::new(),
            included_columns: MetadataCollection::new(),
            metadata: MetadataBag::new(),
        }
    }

    pub(crate) fn with_metadata(mut self, bag: MetadataBag) -> Self {
        self.metadata.extend(bag);
        self
    }

    /// Fully qualified name of the indexed table.
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn is_unique(&self) -> bool {
        self.is_unique
    }

    pub fn is_clustered(&self) -> bool {
        self.is_clustered
    }

    pub fn columns(&self) -> &MetadataCollection<ColumnRef> {
        &self.columns
    }

    pub fn included_columns(&self) -> &MetadataCollection<ColumnRef> {
        &self.included_columns
    }

    pub fn metadata(&self) -> &MetadataBag {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut MetadataBag {
        &mut self.metadata
    }

    pub(crate) fn columns_mut(&mut self) -> &mut MetadataCollection<ColumnRef> {
        &mut self.columns
    }

    pub(crate) fn included_columns_mut(&mut self) -> &mut MetadataCollection<ColumnRef> {
        &mut self.included_columns
    }
}

impl_item_identity!(DatabaseIndex);

/// A trigger attached to a table.
#[derive(Debug)]
pub struct Trigger {
    name: String,
    fully_qualified_name: String,
    table: String,
    metadata: MetadataBag,
}

impl Trigger {
    pub(crate) fn new(name: &str, table: &str) -> Self {
        Self {
            name: name.to_string(),
            fully_qualified_name: format!("{table}.{}", bracket(name)),
            table: table.to_string(),
            metadata: MetadataBag::new(),
        }
    }

    pub(crate) fn with_metadata(mut self, bag: MetadataBag) -> Self {
        self.metadata.extend(bag);
        self
    }

    /// Fully qualified name of the owning table.
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn metadata(&self) -> &MetadataBag {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut MetadataBag {
        &mut self.metadata
    }
}

impl_item_identity!(Trigger);

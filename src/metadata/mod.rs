//! In-memory schema metadata graph: entities, collections, root index,
//! name matching and dependency ordering

mod collection;
mod database;
mod item;
mod matching;
mod model;
mod ordering;
mod types;

pub use collection::MetadataCollection;
pub use database::{
    ColumnRow, DatabaseMetadata, ForeignKeyRow, IndexColumnRow, Locate, TableRow, TriggerRow,
};
pub use item::{FromItemRef, ItemRef, MetadataBag, MetadataItem};
pub use matching::{column_name_matches, table_matches_regex, table_name_matches, MATCH_ANY};
pub use model::{
    Column, ColumnFacets, ColumnRef, DatabaseIndex, ForeignKey, ForeignKeyAction, ForeignKeyRef,
    IndexRef, Schema, Table, Trigger,
};
pub use ordering::sort_by_dependency;
pub use types::{sql_server_type_mappings, HostType};

//! Identity contract shared by every schema graph entity

use std::collections::HashMap;

use super::model::{Column, DatabaseIndex, ForeignKey, Schema, Table, Trigger};

/// Free-form annotation storage carried by every metadata item.
///
/// Generators stash derived facts here (a computed struct name, exclusion
/// flags) without widening the entity contract; the core never depends on
/// specific keys.
pub type MetadataBag = HashMap<String, Option<String>>;

/// Identity shared by all schema graph entities and reference handles.
///
/// `name` is the simple name, unique within the owning collection;
/// `fully_qualified_name` is the bracket-quoted ancestor chain, globally
/// unique across the graph (e.g. `[dbo].[Order].[CustomerId]`).
pub trait MetadataItem {
    fn name(&self) -> &str;
    fn fully_qualified_name(&self) -> &str;
}

/// Bracket-quote a simple name, e.g. `Order` -> `[Order]`.
pub(crate) fn bracket(name: &str) -> String {
    format!("[{name}]")
}

/// A borrowed, type-erased view over any entity in the graph.
///
/// Used where an operation is polymorphic over the entity kind, most
/// notably template dispatch and ad-hoc index lookup.
#[derive(Clone, Copy)]
pub enum ItemRef<'a> {
    Schema(&'a Schema),
    Table(&'a Table),
    Column(&'a Column),
    ForeignKey(&'a ForeignKey),
    Index(&'a DatabaseIndex),
    Trigger(&'a Trigger),
}

impl<'a> ItemRef<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            ItemRef::Schema(s) => s.name(),
            ItemRef::Table(t) => t.name(),
            ItemRef::Column(c) => c.name(),
            ItemRef::ForeignKey(fk) => fk.name(),
            ItemRef::Index(i) => i.name(),
            ItemRef::Trigger(t) => t.name(),
        }
    }

    pub fn fully_qualified_name(&self) -> &'a str {
        match self {
            ItemRef::Schema(s) => s.fully_qualified_name(),
            ItemRef::Table(t) => t.fully_qualified_name(),
            ItemRef::Column(c) => c.fully_qualified_name(),
            ItemRef::ForeignKey(fk) => fk.fully_qualified_name(),
            ItemRef::Index(i) => i.fully_qualified_name(),
            ItemRef::Trigger(t) => t.fully_qualified_name(),
        }
    }

    pub fn metadata(&self) -> &'a MetadataBag {
        match self {
            ItemRef::Schema(s) => s.metadata(),
            ItemRef::Table(t) => t.metadata(),
            ItemRef::Column(c) => c.metadata(),
            ItemRef::ForeignKey(fk) => fk.metadata(),
            ItemRef::Index(i) => i.metadata(),
            ItemRef::Trigger(t) => t.metadata(),
        }
    }

    /// Human-readable entity kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            ItemRef::Schema(_) => "schema",
            ItemRef::Table(_) => "table",
            ItemRef::Column(_) => "column",
            ItemRef::ForeignKey(_) => "foreign key",
            ItemRef::Index(_) => "index",
            ItemRef::Trigger(_) => "trigger",
        }
    }
}

impl std::fmt::Debug for ItemRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind(), self.fully_qualified_name())
    }
}

/// Recovers a concrete entity reference from an [`ItemRef`].
///
/// Implemented by the six entity types; typed templates use it to downcast
/// the item they were dispatched with.
pub trait FromItemRef: Sized {
    /// Entity kind label used in mismatch diagnostics.
    const KIND: &'static str;

    fn from_item<'a>(item: ItemRef<'a>) -> Option<&'a Self>;
}

macro_rules! impl_from_item_ref {
    ($ty:ty, $variant:ident, $kind:literal) => {
        impl FromItemRef for $ty {
            const KIND: &'static str = $kind;

            fn from_item<'a>(item: ItemRef<'a>) -> Option<&'a Self> {
                match item {
                    ItemRef::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

impl_from_item_ref!(Schema, Schema, "schema");
impl_from_item_ref!(Table, Table, "table");
impl_from_item_ref!(Column, Column, "column");
impl_from_item_ref!(ForeignKey, ForeignKey, "foreign key");
impl_from_item_ref!(DatabaseIndex, Index, "index");
impl_from_item_ref!(Trigger, Trigger, "trigger");

//! Template dispatch: maps a template name to a pluggable handler
//!
//! Generators delegate pockets of decision making (what derives an entity
//! gets, what extra impls to append) to named templates, so that behavior
//! can be swapped per configuration without touching the generator.

use std::any::Any;
use std::collections::HashMap;

use tracing::warn;

use crate::error::{Result, SchemagenError};
use crate::metadata::{DatabaseMetadata, FromItemRef, ItemRef};

/// A type-erased template: renders a text fragment for a metadata item.
pub trait DbTemplate {
    /// Registration name; templates with an empty name are rejected.
    fn name(&self) -> &str;

    fn render(
        &self,
        item: ItemRef<'_>,
        db: &DatabaseMetadata,
        options: Option<&dyn Any>,
    ) -> Result<String>;
}

/// A template statically typed to one entity kind and an options type.
///
/// The blanket [`DbTemplate`] impl erases it for registration: the item is
/// downcast with a checked error, the options fall back to
/// `Options::default()` when absent or of an unexpected type.
pub trait EntityTemplate {
    const NAME: &'static str;

    type Item: FromItemRef;
    type Options: Default + 'static;

    fn render(&self, item: &Self::Item, db: &DatabaseMetadata, options: &Self::Options) -> String;
}

impl<T: EntityTemplate> DbTemplate for T {
    fn name(&self) -> &str {
        T::NAME
    }

    fn render(
        &self,
        item: ItemRef<'_>,
        db: &DatabaseMetadata,
        options: Option<&dyn Any>,
    ) -> Result<String> {
        let item = <T::Item as FromItemRef>::from_item(item).ok_or_else(|| {
            SchemagenError::TemplateInputMismatch {
                template: T::NAME.to_string(),
                expected: <T::Item as FromItemRef>::KIND,
            }
        })?;
        let fallback = T::Options::default();
        let options = options
            .and_then(|opts| opts.downcast_ref::<T::Options>())
            .unwrap_or(&fallback);
        Ok(EntityTemplate::render(self, item, db, options))
    }
}

/// Registry of templates, looked up by exact name.
pub struct TemplateEngine {
    templates: HashMap<String, Box<dyn DbTemplate>>,
}

impl TemplateEngine {
    /// Build the registry from the given templates.
    ///
    /// Templates without a name are logged and skipped rather than
    /// failing the run; they are simply unusable. When two templates
    /// share a name, the last registered wins.
    pub fn new(templates: Vec<Box<dyn DbTemplate>>) -> Self {
        let mut registry: HashMap<String, Box<dyn DbTemplate>> = HashMap::new();
        for template in templates {
            let name = template.name();
            if name.is_empty() {
                warn!("a template without a name was ignored");
                continue;
            }
            registry.insert(name.to_string(), template);
        }
        Self {
            templates: registry,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Run the named template for the given item.
    ///
    /// An empty name means "skip" and yields an empty string without
    /// dispatch; an unknown name is an error, since silently skipping a
    /// template would change the generated output's shape.
    pub fn run_template(
        &self,
        name: &str,
        item: ItemRef<'_>,
        db: &DatabaseMetadata,
        options: Option<&dyn Any>,
    ) -> Result<String> {
        if name.is_empty() {
            return Ok(String::new());
        }
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| SchemagenError::TemplateNotFound(name.to_string()))?;
        template.render(item, db, options)
    }
}

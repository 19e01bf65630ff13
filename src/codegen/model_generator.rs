//! Model generator: emits one Rust struct file per table from the graph

use std::fs;

use tracing::{debug, info};

use crate::config::ModelOptions;
use crate::error::{Result, SchemagenError};
use crate::metadata::{
    table_matches_regex, DatabaseMetadata, ItemRef, MetadataItem, Table,
};
use crate::templates::{EntityTemplate, TemplateEngine};

use super::naming::{escape_field_name, to_struct_name};

/// Annotation key under which the derived struct name is stashed on each
/// generated table, for templates and later generation phases.
pub const CLASS_NAME_KEY: &str = "class_name";

/// Generate struct files for the configured tables.
///
/// Runs in two passes: the first selects tables and writes the derived
/// struct name into each table's annotation bag, the second renders the
/// files (including the configured traits template's output).
pub fn generate_models(
    db: &mut DatabaseMetadata,
    engine: &TemplateEngine,
    options: &ModelOptions,
) -> Result<()> {
    fs::create_dir_all(&options.output_dir)?;

    let mut selected: Vec<String> = Vec::new();
    for schema in db.schemas() {
        for table in schema.tables() {
            let included =
                table_matches_regex(table, options.include_tables.as_deref(), true)?;
            let excluded =
                table_matches_regex(table, options.exclude_tables.as_deref(), false)?;
            if included && !excluded {
                selected.push(table.fully_qualified_name().to_string());
            }
        }
    }

    for fqn in &selected {
        if let Some(table) = db.find_mut::<Table>(fqn) {
            let class_name = to_struct_name(table.name());
            table
                .metadata_mut()
                .insert(CLASS_NAME_KEY.to_string(), Some(class_name));
        }
    }

    let mut mod_content = String::from("// Generated model structs\n\n");
    for fqn in &selected {
        let table = db
            .find::<Table>(fqn)
            .ok_or_else(|| SchemagenError::ItemNotFound(fqn.clone()))?;
        let code = render_table(table, db, engine, options)?;
        let file_name = heck::AsSnakeCase(table.name()).to_string();
        mod_content.push_str(&format!("mod {file_name};\npub use {file_name}::*;\n"));
        fs::write(options.output_dir.join(format!("{file_name}.rs")), code)?;
        debug!("generated model for {fqn}");
    }
    fs::write(options.output_dir.join("mod.rs"), mod_content)?;

    info!(
        "generated {} model structs in {}",
        selected.len(),
        options.output_dir.display()
    );
    Ok(())
}

/// Render the struct source for one table.
fn render_table(
    table: &Table,
    db: &DatabaseMetadata,
    engine: &TemplateEngine,
    options: &ModelOptions,
) -> Result<String> {
    let class_name = class_name_of(table);

    let mut code = String::new();
    code.push_str(&format!("//! Generated from {}\n\n", table.fully_qualified_name()));
    code.push_str(&format!("/// Row of `{}`\n", table.fully_qualified_name()));
    code.push_str("#[derive(Debug, Clone, PartialEq)]\n");
    code.push_str(&format!("pub struct {class_name} {{\n"));
    for column in table.columns() {
        let host = db.host_type(column)?;
        let mut field_type = host.rust_name().to_string();
        if column.is_nullable() {
            field_type = format!("Option<{field_type}>");
        }
        let field_name = escape_field_name(column.name());
        code.push_str(&format!("    pub {field_name}: {field_type},\n"));
    }
    code.push_str("}\n");

    let extra = engine.run_template(
        &options.traits_template,
        ItemRef::Table(table),
        db,
        None,
    )?;
    if !extra.is_empty() {
        code.push('\n');
        code.push_str(&extra);
        if !extra.ends_with('\n') {
            code.push('\n');
        }
    }

    Ok(code)
}

/// Struct name for a table: the stashed annotation, or derived fresh.
fn class_name_of(table: &Table) -> String {
    table
        .metadata()
        .get(CLASS_NAME_KEY)
        .and_then(|value| value.clone())
        .unwrap_or_else(|| to_struct_name(table.name()))
}

/// Options for [`TimestampsTemplate`]: the column names that mark a table
/// as carrying audit timestamps.
#[derive(Debug, Clone)]
pub struct TimestampsOptions {
    pub created_column: String,
    pub modified_column: String,
}

impl Default for TimestampsOptions {
    fn default() -> Self {
        Self {
            created_column: "CreatedAt".to_string(),
            modified_column: "ModifiedAt".to_string(),
        }
    }
}

/// Built-in `model-traits` template: appends an audit-column constant to
/// structs whose table carries both timestamp columns.
pub struct TimestampsTemplate;

impl EntityTemplate for TimestampsTemplate {
    const NAME: &'static str = "model-traits";

    type Item = Table;
    type Options = TimestampsOptions;

    fn render(
        &self,
        table: &Table,
        _db: &DatabaseMetadata,
        options: &TimestampsOptions,
    ) -> String {
        let tracked = table.columns().contains_key(&options.created_column)
            && table.columns().contains_key(&options.modified_column);
        if !tracked {
            return String::new();
        }
        let class_name = class_name_of(table);
        format!(
            "impl {class_name} {{\n    /// Column names carrying the row's audit timestamps.\n    pub const AUDIT_COLUMNS: (&'static str, &'static str) = (\"{}\", \"{}\");\n}}\n",
            options.created_column, options.modified_column
        )
    }
}

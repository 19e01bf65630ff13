//! T-SQL DDL to metadata feed rows, using sqlparser-rs

use sqlparser::ast::{
    ColumnOption, Expr, ForeignKeyConstraint, Ident, IndexColumn, IndexConstraint, ObjectName,
    PrimaryKeyConstraint, ReferentialAction, Statement, TableConstraint, UniqueConstraint,
};
use sqlparser::dialect::MsSqlDialect;
use sqlparser::parser::Parser;

use crate::error::Result;
use crate::metadata::{
    ColumnFacets, ColumnRow, ForeignKeyAction, ForeignKeyRow, IndexColumnRow, TableRow, TriggerRow,
};

/// Feed rows extracted from a DDL script, in load order.
#[derive(Debug, Default)]
pub struct SchemaRows {
    pub tables: Vec<TableRow>,
    pub columns: Vec<ColumnRow>,
    pub foreign_keys: Vec<ForeignKeyRow>,
    pub triggers: Vec<TriggerRow>,
    pub index_columns: Vec<IndexColumnRow>,
}

/// Parse a T-SQL schema script into feed rows.
pub fn parse_schema(sql: &str) -> Result<SchemaRows> {
    let dialect = MsSqlDialect {};
    let statements = Parser::parse_sql(&dialect, sql)?;

    let mut rows = SchemaRows::default();
    for statement in statements {
        match statement {
            Statement::CreateTable(create) => collect_table(&create, &mut rows),
            Statement::CreateIndex(create) => {
                let (schema, table) = split_object_name(&create.table_name);
                let index_name = create
                    .name
                    .as_ref()
                    .map(object_simple_name)
                    .unwrap_or_else(|| {
                        let first = create
                            .columns
                            .first()
                            .map(extract_index_column)
                            .unwrap_or_default();
                        format!("idx_{first}")
                    });
                for column in &create.columns {
                    rows.index_columns.push(IndexColumnRow {
                        schema: schema.clone(),
                        table: table.clone(),
                        column: extract_index_column(column),
                        index_name: index_name.clone(),
                        is_unique: create.unique,
                        is_clustered: false,
                        is_included: false,
                        ..IndexColumnRow::default()
                    });
                }
                for column in &create.include {
                    rows.index_columns.push(IndexColumnRow {
                        schema: schema.clone(),
                        table: table.clone(),
                        column: extract_ident(column),
                        index_name: index_name.clone(),
                        is_unique: create.unique,
                        is_clustered: false,
                        is_included: true,
                        ..IndexColumnRow::default()
                    });
                }
            }
            Statement::CreateTrigger(create_trigger) => {
                let (schema, table) = split_object_name(&create_trigger.table_name);
                rows.triggers.push(TriggerRow {
                    schema,
                    table,
                    name: object_simple_name(&create_trigger.name),
                    ..TriggerRow::default()
                });
            }
            _ => {}
        }
    }

    Ok(rows)
}

/// Collect a CREATE TABLE statement into table, column, index and foreign
/// key rows.
fn collect_table(create: &sqlparser::ast::CreateTable, rows: &mut SchemaRows) {
    let (schema, table) = split_object_name(&create.name);

    rows.tables.push(TableRow {
        schema: schema.clone(),
        name: table.clone(),
        ..TableRow::default()
    });

    let mut columns: Vec<ColumnRow> = Vec::new();

    for column_def in &create.columns {
        let name = extract_ident(&column_def.name);
        let rendered_type = column_def.data_type.to_string();
        let (data_type, precision, scale, max_length) = parse_type_facets(&rendered_type);

        let mut is_nullable = true;
        let mut is_key = false;
        let mut is_identity = false;
        let mut is_row_guid_col = false;
        let mut default_value = String::new();
        let mut unique = false;

        for option in &column_def.options {
            match &option.option {
                ColumnOption::NotNull => is_nullable = false,
                ColumnOption::Null => is_nullable = true,
                ColumnOption::Default(expr) => default_value = expr.to_string(),
                ColumnOption::PrimaryKey(_) => {
                    is_key = true;
                    is_nullable = false;
                }
                ColumnOption::Unique(_) => unique = true,
                other => {
                    // IDENTITY and ROWGUIDCOL surface either as typed
                    // options or as dialect-specific token runs depending
                    // on the statement shape; sniff the rendered form.
                    let rendered = other.to_string().to_uppercase();
                    if rendered.contains("IDENTITY") {
                        is_identity = true;
                    }
                    if rendered.contains("ROWGUIDCOL") {
                        is_row_guid_col = true;
                    }
                }
            }
        }

        if unique {
            rows.index_columns.push(IndexColumnRow {
                schema: schema.clone(),
                table: table.clone(),
                column: name.clone(),
                index_name: format!("{name}_unique"),
                is_unique: true,
                ..IndexColumnRow::default()
            });
        }

        columns.push(ColumnRow {
            schema: schema.clone(),
            table: table.clone(),
            name,
            facets: ColumnFacets {
                data_type,
                precision,
                scale,
                max_length,
                is_nullable,
                is_key,
                is_identity,
                is_row_guid_col,
                default_value,
                ..ColumnFacets::default()
            },
            ..ColumnRow::default()
        });
    }

    for constraint in &create.constraints {
        match constraint {
            TableConstraint::PrimaryKey(PrimaryKeyConstraint {
                columns: key_columns,
                ..
            }) => {
                for key_column in key_columns {
                    let column_name = extract_index_column(key_column);
                    if let Some(column) = columns.iter_mut().find(|c| c.name == column_name) {
                        column.facets.is_key = true;
                        column.facets.is_nullable = false;
                    }
                }
            }
            TableConstraint::Unique(UniqueConstraint {
                columns: unique_columns,
                name,
                ..
            }) => {
                let index_name = name.as_ref().map(extract_ident).unwrap_or_else(|| {
                    let first = unique_columns
                        .first()
                        .map(extract_index_column)
                        .unwrap_or_default();
                    format!("{first}_unique")
                });
                for column in unique_columns {
                    rows.index_columns.push(IndexColumnRow {
                        schema: schema.clone(),
                        table: table.clone(),
                        column: extract_index_column(column),
                        index_name: index_name.clone(),
                        is_unique: true,
                        ..IndexColumnRow::default()
                    });
                }
            }
            TableConstraint::Index(IndexConstraint {
                columns: index_columns,
                name,
                ..
            }) => {
                let index_name = name.as_ref().map(extract_ident).unwrap_or_else(|| {
                    let first = index_columns
                        .first()
                        .map(extract_index_column)
                        .unwrap_or_default();
                    format!("idx_{first}")
                });
                for column in index_columns {
                    rows.index_columns.push(IndexColumnRow {
                        schema: schema.clone(),
                        table: table.clone(),
                        column: extract_index_column(column),
                        index_name: index_name.clone(),
                        ..IndexColumnRow::default()
                    });
                }
            }
            TableConstraint::ForeignKey(ForeignKeyConstraint {
                name,
                columns: from_columns,
                foreign_table,
                referred_columns,
                on_delete,
                on_update,
                ..
            }) => {
                let (target_schema, target_table) = split_object_name(foreign_table);
                let fk_name = name
                    .as_ref()
                    .map(extract_ident)
                    .unwrap_or_else(|| format!("FK_{table}_{target_table}"));
                for (from, to) in from_columns.iter().zip(referred_columns.iter()) {
                    rows.foreign_keys.push(ForeignKeyRow {
                        name: fk_name.clone(),
                        parent_schema: schema.clone(),
                        parent_table: table.clone(),
                        parent_column: extract_ident(from),
                        target_schema: target_schema.clone(),
                        target_table: target_table.clone(),
                        target_column: extract_ident(to),
                        update_action: map_action(on_update.as_ref()),
                        delete_action: map_action(on_delete.as_ref()),
                        ..ForeignKeyRow::default()
                    });
                }
            }
            _ => {}
        }
    }

    rows.columns.extend(columns);
}

fn map_action(action: Option<&ReferentialAction>) -> ForeignKeyAction {
    match action {
        Some(ReferentialAction::Cascade) => ForeignKeyAction::Cascade,
        Some(ReferentialAction::SetNull) => ForeignKeyAction::SetNull,
        Some(ReferentialAction::SetDefault) => ForeignKeyAction::SetDefault,
        _ => ForeignKeyAction::NoAction,
    }
}

/// Split an object name into (schema, simple name); the schema defaults
/// to `dbo` when unqualified.
fn split_object_name(name: &ObjectName) -> (String, String) {
    let simple = name
        .0
        .last()
        .and_then(|part| part.as_ident())
        .map(|ident| ident.value.clone())
        .unwrap_or_default();
    let schema = if name.0.len() >= 2 {
        name.0[name.0.len() - 2]
            .as_ident()
            .map(|ident| ident.value.clone())
            .unwrap_or_else(|| "dbo".to_string())
    } else {
        "dbo".to_string()
    };
    (schema, simple)
}

fn object_simple_name(name: &ObjectName) -> String {
    name.0
        .last()
        .and_then(|part| part.as_ident())
        .map(|ident| ident.value.clone())
        .unwrap_or_default()
}

fn extract_ident(ident: &Ident) -> String {
    ident.value.clone()
}

fn extract_index_column(ic: &IndexColumn) -> String {
    match &ic.column.expr {
        Expr::Identifier(ident) => ident.value.clone(),
        other => other.to_string(),
    }
}

/// Pull type facets out of a rendered type such as `NVARCHAR(255)` or
/// `DECIMAL(18,2)`. Returns (base type lowercase, precision, scale,
/// max length); `MAX` becomes a max length of `-1`.
fn parse_type_facets(data_type: &str) -> (String, i32, i32, i32) {
    let trimmed = data_type.trim();
    let (base, arguments) = match trimmed.find('(') {
        Some(open) => {
            let close = trimmed.rfind(')').unwrap_or(trimmed.len());
            (&trimmed[..open], Some(&trimmed[open + 1..close]))
        }
        None => (trimmed, None),
    };
    let base = base.trim().to_lowercase();

    let mut precision = 0;
    let mut scale = 0;
    let mut max_length = 0;
    if let Some(arguments) = arguments {
        let parts: Vec<&str> = arguments.split(',').map(str::trim).collect();
        let char_like = matches!(
            base.as_str(),
            "char" | "varchar" | "nchar" | "nvarchar" | "binary" | "varbinary"
        );
        if parts.first().is_some_and(|p| p.eq_ignore_ascii_case("max")) {
            max_length = -1;
        } else if char_like {
            max_length = parts.first().and_then(|p| p.parse().ok()).unwrap_or(0);
        } else {
            precision = parts.first().and_then(|p| p.parse().ok()).unwrap_or(0);
            scale = parts.get(1).and_then(|p| p.parse().ok()).unwrap_or(0);
        }
    }

    (base, precision, scale, max_length)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_table() {
        let sql = r#"
            CREATE TABLE [dbo].[Customer] (
                [Id] INT NOT NULL PRIMARY KEY,
                [Name] NVARCHAR(200) NOT NULL,
                [Notes] NVARCHAR(MAX) NULL
            );
        "#;

        let rows = parse_schema(sql).unwrap();
        assert_eq!(rows.tables.len(), 1);
        assert_eq!(rows.tables[0].schema, "dbo");
        assert_eq!(rows.tables[0].name, "Customer");
        assert_eq!(rows.columns.len(), 3);

        let id = &rows.columns[0];
        assert!(id.facets.is_key);
        assert!(!id.facets.is_nullable);
        assert_eq!(id.facets.data_type, "int");

        let name = &rows.columns[1];
        assert_eq!(name.facets.data_type, "nvarchar");
        assert_eq!(name.facets.max_length, 200);

        let notes = &rows.columns[2];
        assert_eq!(notes.facets.max_length, -1);
        assert!(notes.facets.is_nullable);
    }

    #[test]
    fn test_unqualified_table_defaults_to_dbo() {
        let rows = parse_schema("CREATE TABLE Plain (Id INT NOT NULL);").unwrap();
        assert_eq!(rows.tables[0].schema, "dbo");
        assert_eq!(rows.tables[0].name, "Plain");
    }

    #[test]
    fn test_parse_foreign_key_pairs() {
        let sql = r#"
            CREATE TABLE [dbo].[Order] (
                [Id] INT NOT NULL PRIMARY KEY,
                [CustomerId] INT NOT NULL,
                CONSTRAINT [FK_Order_Customer] FOREIGN KEY ([CustomerId])
                    REFERENCES [dbo].[Customer] ([Id]) ON DELETE CASCADE
            );
        "#;

        let rows = parse_schema(sql).unwrap();
        assert_eq!(rows.foreign_keys.len(), 1);
        let fk = &rows.foreign_keys[0];
        assert_eq!(fk.name, "FK_Order_Customer");
        assert_eq!(fk.parent_column, "CustomerId");
        assert_eq!(fk.target_schema, "dbo");
        assert_eq!(fk.target_table, "Customer");
        assert_eq!(fk.target_column, "Id");
        assert_eq!(fk.delete_action, ForeignKeyAction::Cascade);
        assert_eq!(fk.update_action, ForeignKeyAction::NoAction);
    }

    #[test]
    fn test_composite_primary_key_marks_all_columns() {
        let sql = r#"
            CREATE TABLE [dbo].[OrderLine] (
                [OrderId] INT NOT NULL,
                [LineNo] INT NOT NULL,
                [Qty] INT NOT NULL,
                PRIMARY KEY ([OrderId], [LineNo])
            );
        "#;

        let rows = parse_schema(sql).unwrap();
        let keys: Vec<&str> = rows
            .columns
            .iter()
            .filter(|c| c.facets.is_key)
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(keys, vec!["OrderId", "LineNo"]);
    }

    #[test]
    fn test_decimal_facets() {
        let rows =
            parse_schema("CREATE TABLE T (Amount DECIMAL(18, 2) NOT NULL);").unwrap();
        let amount = &rows.columns[0];
        assert_eq!(amount.facets.data_type, "decimal");
        assert_eq!(amount.facets.precision, 18);
        assert_eq!(amount.facets.scale, 2);
    }

    #[test]
    fn test_identity_column_detected() {
        let rows =
            parse_schema("CREATE TABLE T (Id INT IDENTITY(1,1) NOT NULL PRIMARY KEY);").unwrap();
        assert!(rows.columns[0].facets.is_identity);
    }

    #[test]
    fn test_create_index_statement() {
        let sql = r#"
            CREATE TABLE [dbo].[Order] (Id INT NOT NULL, CustomerId INT NOT NULL);
            CREATE UNIQUE INDEX [IX_Order_CustomerId] ON [dbo].[Order] ([CustomerId]);
        "#;

        let rows = parse_schema(sql).unwrap();
        assert_eq!(rows.index_columns.len(), 1);
        let index_column = &rows.index_columns[0];
        assert_eq!(index_column.index_name, "IX_Order_CustomerId");
        assert_eq!(index_column.column, "CustomerId");
        assert!(index_column.is_unique);
        assert!(!index_column.is_included);
    }

    #[test]
    fn test_type_facets_parsing() {
        assert_eq!(parse_type_facets("INT"), ("int".to_string(), 0, 0, 0));
        assert_eq!(
            parse_type_facets("NVARCHAR(255)"),
            ("nvarchar".to_string(), 0, 0, 255)
        );
        assert_eq!(
            parse_type_facets("VARCHAR(MAX)"),
            ("varchar".to_string(), 0, 0, -1)
        );
        assert_eq!(
            parse_type_facets("DECIMAL(18,2)"),
            ("decimal".to_string(), 18, 2, 0)
        );
    }
}

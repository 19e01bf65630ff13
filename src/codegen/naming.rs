//! Naming utilities for code generation

use heck::{ToPascalCase, ToSnakeCase};

/// Convert a table name to a struct name (PascalCase)
pub fn to_struct_name(table_name: &str) -> String {
    table_name.to_pascal_case()
}

/// Convert a column name to a field name (snake_case)
pub fn to_field_name(column_name: &str) -> String {
    column_name.to_snake_case()
}

/// Check if a name is a Rust reserved keyword
pub fn is_rust_keyword(name: &str) -> bool {
    matches!(
        name,
        "as" | "async"
            | "await"
            | "break"
            | "const"
            | "continue"
            | "crate"
            | "dyn"
            | "else"
            | "enum"
            | "extern"
            | "false"
            | "fn"
            | "for"
            | "if"
            | "impl"
            | "in"
            | "let"
            | "loop"
            | "match"
            | "mod"
            | "move"
            | "mut"
            | "pub"
            | "ref"
            | "return"
            | "self"
            | "Self"
            | "static"
            | "struct"
            | "super"
            | "trait"
            | "true"
            | "type"
            | "unsafe"
            | "use"
            | "where"
            | "while"
            | "abstract"
            | "become"
            | "box"
            | "do"
            | "final"
            | "macro"
            | "override"
            | "priv"
            | "try"
            | "typeof"
            | "unsized"
            | "virtual"
            | "yield"
    )
}

/// Escape a field name if it's a Rust keyword
pub fn escape_field_name(name: &str) -> String {
    let snake = name.to_snake_case();
    if is_rust_keyword(&snake) {
        format!("r#{}", snake)
    } else {
        snake
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_struct_name() {
        assert_eq!(to_struct_name("Customer"), "Customer");
        assert_eq!(to_struct_name("order_line"), "OrderLine");
        assert_eq!(to_struct_name("OrderLine"), "OrderLine");
    }

    #[test]
    fn test_to_field_name() {
        assert_eq!(to_field_name("CustomerId"), "customer_id");
        assert_eq!(to_field_name("first_name"), "first_name");
        assert_eq!(to_field_name("CreatedAt"), "created_at");
    }

    #[test]
    fn test_escape_field_name() {
        assert_eq!(escape_field_name("Type"), "r#type");
        assert_eq!(escape_field_name("Name"), "name");
        assert_eq!(escape_field_name("Async"), "r#async");
    }
}

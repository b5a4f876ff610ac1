//! SQL text the forwarder generates: catalog queries and structured DML.
//!
//! Everything here produces one complete Postgres statement for the
//! Management API's `/database/query` endpoint. Identifiers are
//! double-quoted and literals single-quoted, with embedded quotes doubled.

use serde_json::{Map, Value};

/// Double-quote an identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Single-quote a string literal, doubling embedded quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Render a JSON argument value as a SQL literal. Objects and arrays are
/// embedded as their JSON text.
fn sql_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote_literal(s),
        other => quote_literal(&other.to_string()),
    }
}

/// Table listing across the given schemas. With no schemas, every
/// non-system schema is listed.
pub fn list_tables(schemas: &[String]) -> String {
    let filter = if schemas.is_empty() {
        "table_schema NOT IN ('pg_catalog', 'information_schema')".to_string()
    } else {
        let list = schemas
            .iter()
            .map(|schema| quote_literal(schema))
            .collect::<Vec<_>>()
            .join(", ");
        format!("table_schema IN ({list})")
    };
    format!(
        "SELECT table_schema, table_name, table_type \
         FROM information_schema.tables \
         WHERE {filter} \
         ORDER BY table_schema, table_name"
    )
}

/// Column description for one table, optionally schema-qualified.
pub fn describe_table(table: &str, schema: Option<&str>) -> String {
    let mut conditions = vec![format!("table_name = {}", quote_literal(table))];
    if let Some(schema) = schema {
        conditions.push(format!("table_schema = {}", quote_literal(schema)));
    }
    format!(
        "SELECT column_name, data_type, is_nullable, column_default \
         FROM information_schema.columns \
         WHERE {} \
         ORDER BY ordinal_position",
        conditions.join(" AND ")
    )
}

/// Available and installed extensions.
pub fn list_extensions() -> String {
    "SELECT name, default_version, installed_version, comment \
     FROM pg_available_extensions \
     ORDER BY name"
        .to_string()
}

/// INSERT built from structured arguments.
pub fn insert(table: &str, values: &Map<String, Value>) -> String {
    let columns = values
        .keys()
        .map(|column| quote_ident(column))
        .collect::<Vec<_>>()
        .join(", ");
    let literals = values
        .values()
        .map(sql_value)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({columns}) VALUES ({literals}) RETURNING *",
        quote_ident(table)
    )
}

/// UPDATE built from structured arguments; every filter is ANDed.
pub fn update(table: &str, values: &Map<String, Value>, filters: &Map<String, Value>) -> String {
    let assignments = values
        .iter()
        .map(|(column, value)| format!("{} = {}", quote_ident(column), sql_value(value)))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "UPDATE {} SET {assignments} WHERE {} RETURNING *",
        quote_ident(table),
        conditions(filters)
    )
}

/// DELETE built from structured arguments.
pub fn delete(table: &str, filters: &Map<String, Value>) -> String {
    format!(
        "DELETE FROM {} WHERE {} RETURNING *",
        quote_ident(table),
        conditions(filters)
    )
}

fn conditions(filters: &Map<String, Value>) -> String {
    if filters.is_empty() {
        // An absent filter must never become an unbounded statement.
        return "false".to_string();
    }
    filters
        .iter()
        .map(|(column, value)| match value {
            Value::Null => format!("{} IS NULL", quote_ident(column)),
            other => format!("{} = {}", quote_ident(column), sql_value(other)),
        })
        .collect::<Vec<_>>()
        .join(" AND ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    #[test]
    fn test_quoting_doubles_embedded_quotes() {
        assert_eq!(quote_ident(r#"odd"name"#), r#""odd""name""#);
        assert_eq!(quote_literal("O'Brien"), "'O''Brien'");
    }

    #[test]
    fn test_list_tables_defaults_to_non_system_schemas() {
        let sql = list_tables(&[]);
        assert!(sql.contains("NOT IN ('pg_catalog', 'information_schema')"));
        assert!(sql.ends_with("ORDER BY table_schema, table_name"));
    }

    #[test]
    fn test_list_tables_filters_named_schemas() {
        let sql = list_tables(&["public".to_string(), "analytics".to_string()]);
        assert!(sql.contains("table_schema IN ('public', 'analytics')"));
    }

    #[test]
    fn test_describe_table_with_and_without_schema() {
        let bare = describe_table("users", None);
        assert!(bare.contains("table_name = 'users'"));
        assert!(!bare.contains("table_schema"));

        let qualified = describe_table("users", Some("auth"));
        assert!(qualified.contains("table_name = 'users' AND table_schema = 'auth'"));
    }

    #[test]
    fn test_insert_statement_shape() {
        let sql = insert("users", &map(json!({"name": "O'Brien"})));
        assert_eq!(
            sql,
            r#"INSERT INTO "users" ("name") VALUES ('O''Brien') RETURNING *"#
        );
    }

    #[test]
    fn test_insert_columns_and_values_stay_paired() {
        let values = map(json!({"age": 42, "active": true, "name": "x"}));
        let sql = insert("users", &values);
        // Column order and value order come from the same map iteration.
        let columns: Vec<&str> = sql
            .split('(')
            .nth(1)
            .and_then(|s| s.split(')').next())
            .map(|s| s.split(", ").map(|c| c.trim_matches('"')).collect())
            .unwrap_or_default();
        assert_eq!(columns.len(), 3);
        for column in ["age", "active", "name"] {
            assert!(columns.contains(&column), "missing column {column}");
        }
    }

    #[test]
    fn test_update_statement_shape() {
        let sql = update(
            "users",
            &map(json!({"name": "new"})),
            &map(json!({"id": 7})),
        );
        assert_eq!(
            sql,
            r#"UPDATE "users" SET "name" = 'new' WHERE "id" = 7 RETURNING *"#
        );
    }

    #[test]
    fn test_delete_with_null_filter_uses_is_null() {
        let sql = delete("sessions", &map(json!({"ended_at": null})));
        assert_eq!(
            sql,
            r#"DELETE FROM "sessions" WHERE "ended_at" IS NULL RETURNING *"#
        );
    }

    #[test]
    fn test_empty_filters_never_touch_rows() {
        let sql = delete("users", &Map::new());
        assert_eq!(sql, r#"DELETE FROM "users" WHERE false RETURNING *"#);
    }
}

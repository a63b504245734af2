use serde::{Deserialize, Serialize};

/// One column as reported by the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub data_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn with_column(mut self, name: impl Into<String>, data_type: impl Into<String>) -> Self {
        self.columns.push(ColumnSchema {
            name: name.into(),
            data_type: data_type.into(),
        });
        self
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|column| column.name == name)
    }
}

/// Tables visible to the fallback planner, in the order the schema provider
/// listed them. The planner only relies on table names; columns are carried
/// for callers that want them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaSnapshot {
    tables: Vec<TableSchema>,
}

impl SchemaSnapshot {
    pub fn new(tables: Vec<TableSchema>) -> Self {
        Self { tables }
    }

    /// Snapshot with the given table names and no column detail.
    pub fn from_table_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tables: names.into_iter().map(TableSchema::new).collect(),
        }
    }

    pub fn push(&mut self, table: TableSchema) {
        self.tables.push(table);
    }

    pub fn tables(&self) -> &[TableSchema] {
        &self.tables
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|table| table.name.as_str())
    }

    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|table| table.name == name)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_column_order() {
        let table = TableSchema::new("products")
            .with_column("product_id", "integer")
            .with_column("name", "character varying");
        assert_eq!(table.columns[0].name, "product_id");
        assert_eq!(
            table.column("name").map(|c| c.data_type.as_str()),
            Some("character varying")
        );
    }

    #[test]
    fn snapshot_preserves_listing_order() {
        let schema = SchemaSnapshot::from_table_names(["orders", "customers", "products"]);
        assert_eq!(
            schema.table_names().collect::<Vec<_>>(),
            vec!["orders", "customers", "products"]
        );
        assert!(schema.table("customers").is_some());
        assert_eq!(schema.len(), 3);
    }

    #[test]
    fn snapshot_serializes_as_table_list() {
        let schema = SchemaSnapshot::new(vec![TableSchema::new("t").with_column("id", "integer")]);
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{"name": "t", "columns": [{"name": "id", "data_type": "integer"}]}])
        );
    }
}

//! Schema registry
//!
//! Validates table declarations and assigns wire indices.
//!
//! ## Validation order (first failure wins)
//! 1. table names: naming rule, no duplicates
//! 2. column names: naming rule, unique within their table
//! 3. column types: primitives or a well-formed table name
//! 4. foreign references: target exists and is declared earlier

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use super::column::{check_name, ColumnDef, ColumnKind, ColumnType};
use crate::error::{Result, RowWireError};

/// A table as declared by the caller, before validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDecl {
    pub name: String,
    pub columns: Vec<(String, ColumnType)>,
}

impl TableDecl {
    pub fn new<N, C>(name: impl Into<String>, columns: C) -> Self
    where
        N: Into<String>,
        C: IntoIterator<Item = (N, ColumnType)>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(|(n, t)| (n.into(), t)).collect(),
        }
    }
}

impl FromStr for TableDecl {
    type Err = RowWireError;

    /// Parse `Name(column: type, column: type)`
    fn from_str(s: &str) -> Result<Self> {
        let malformed = || RowWireError::InvalidSchema(format!("malformed table declaration: {:?}", s));

        let s = s.trim();
        let open = s.find('(').ok_or_else(malformed)?;
        let body = s[open + 1..].strip_suffix(')').ok_or_else(malformed)?;
        let name = s[..open].trim();

        let mut columns: Vec<(String, ColumnType)> = Vec::new();
        for part in body.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (column, kind) = part.split_once(':').ok_or_else(malformed)?;
            columns.push((column.trim().to_string(), kind.parse()?));
        }

        Ok(TableDecl::new(name, columns))
    }
}

/// A validated table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    name: String,
    index: u32,
    columns: Vec<ColumnDef>,
}

impl TableSchema {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 1-based wire identifier
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Look up a column by name, returning its 1-based wire index
    ///
    /// The primary key is not a declared column; callers handle `"id"`
    /// themselves.
    pub fn column(&self, name: &str) -> Option<(u32, &ColumnDef)> {
        self.columns
            .iter()
            .enumerate()
            .find(|(_, c)| c.name == name)
            .map(|(i, c)| (i as u32 + 1, c))
    }

    pub fn has_foreign_columns(&self) -> bool {
        self.columns.iter().any(|c| c.kind.is_foreign())
    }
}

/// Immutable set of validated tables
#[derive(Debug, Clone)]
pub struct Schema {
    tables: Vec<TableSchema>,
    by_name: HashMap<String, usize>,
}

impl Schema {
    /// Create a new schema builder
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Build directly from parsed declarations
    pub fn from_decls(decls: impl IntoIterator<Item = TableDecl>) -> Result<Self> {
        SchemaBuilder {
            decls: decls.into_iter().collect(),
        }
        .build()
    }

    pub fn get(&self, name: &str) -> Option<&TableSchema> {
        self.by_name.get(name).map(|&i| &self.tables[i])
    }

    /// Like [`Schema::get`] but reports `UnknownTable`
    pub fn table(&self, name: &str) -> Result<&TableSchema> {
        self.get(name)
            .ok_or_else(|| RowWireError::UnknownTable(name.to_string()))
    }

    pub fn table_by_index(&self, index: u32) -> Option<&TableSchema> {
        let slot = index.checked_sub(1)? as usize;
        self.tables.get(slot)
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableSchema> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Collects declarations in order; `build` validates them
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    decls: Vec<TableDecl>,
}

impl SchemaBuilder {
    /// Declare the next table
    pub fn table<N, C>(mut self, name: impl Into<String>, columns: C) -> Self
    where
        N: Into<String>,
        C: IntoIterator<Item = (N, ColumnType)>,
    {
        self.decls.push(TableDecl::new(name, columns));
        self
    }

    /// Declare the next table from a parsed declaration
    pub fn declare(mut self, decl: TableDecl) -> Self {
        self.decls.push(decl);
        self
    }

    pub fn build(self) -> Result<Schema> {
        // Pass 1: table names, indices follow declaration order
        let mut by_name = HashMap::with_capacity(self.decls.len());
        for (slot, decl) in self.decls.iter().enumerate() {
            check_name("table", &decl.name)?;
            if by_name.insert(decl.name.clone(), slot).is_some() {
                return Err(RowWireError::InvalidSchema(format!(
                    "duplicate table name {:?}",
                    decl.name
                )));
            }
        }

        // Pass 2: column names
        for decl in &self.decls {
            let mut seen = HashSet::with_capacity(decl.columns.len());
            for (column, _) in &decl.columns {
                check_name("column", column)?;
                if !seen.insert(column.as_str()) {
                    return Err(RowWireError::InvalidSchema(format!(
                        "duplicate column name {:?} in table {}",
                        column, decl.name
                    )));
                }
            }
        }

        // Pass 3 + 4: kinds and foreign ordering
        let mut tables = Vec::with_capacity(self.decls.len());
        for (slot, decl) in self.decls.iter().enumerate() {
            let index = slot as u32 + 1;
            let mut columns = Vec::with_capacity(decl.columns.len());

            for (column, declared) in &decl.columns {
                let kind = match declared {
                    ColumnType::Integer => ColumnKind::Integer,
                    ColumnType::Float => ColumnKind::Float,
                    ColumnType::String => ColumnKind::String,
                    ColumnType::Foreign(target) => {
                        resolve_foreign(&by_name, &decl.name, index, column, target)?
                    }
                };
                columns.push(ColumnDef::new(column.clone(), kind));
            }

            tracing::trace!("table {} registered at index {}", decl.name, index);
            tables.push(TableSchema {
                name: decl.name.clone(),
                index,
                columns,
            });
        }

        Ok(Schema { tables, by_name })
    }
}

fn resolve_foreign(
    by_name: &HashMap<String, usize>,
    table: &str,
    index: u32,
    column: &str,
    target: &str,
) -> Result<ColumnKind> {
    if check_name("referenced table", target).is_err() {
        return Err(RowWireError::InvalidSchema(format!(
            "column {}.{} has unsupported type {:?}",
            table, column, target
        )));
    }

    let target_slot = by_name
        .get(target)
        .ok_or_else(|| RowWireError::UnknownForeignTable {
            table: table.to_string(),
            column: column.to_string(),
            target: target.to_string(),
        })?;

    let target_index = *target_slot as u32 + 1;
    if target_index >= index {
        return Err(RowWireError::ForwardForeignReference {
            table: table.to_string(),
            column: column.to_string(),
            target: target.to_string(),
        });
    }

    Ok(ColumnKind::Foreign {
        table: target.to_string(),
        index: target_index,
    })
}

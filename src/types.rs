//! Core data model types.
//!
//! Loaders produce an in-memory [`RecordTable`] shaped by a user-provided [`Schema`] (a list of
//! typed [`Field`]s). Every query in [`crate::processing`] reads a `RecordTable` and returns a new
//! value; tables are never mutated after construction.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

/// Logical data type for a schema field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Utf8,
    /// Calendar date without a time component.
    Date,
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// A list of fields describing the expected shape of incoming data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// A single typed value in a [`RecordTable`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
    /// Calendar date.
    Date(NaiveDate),
}

impl Value {
    /// Numeric view of the value. Integers widen to `f64`; everything else is `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int64(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Utf8(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Int64(v) => serializer.serialize_i64(*v),
            Value::Float64(v) => serializer.serialize_f64(*v),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Utf8(s) => serializer.serialize_str(s),
            Value::Date(d) => serializer.collect_str(&d.format("%Y-%m-%d")),
        }
    }
}

/// Cell `idx` of `row`, or [`Value::Null`] when the row is shorter than the schema.
///
/// [`RecordTable::new`] does not check row width, so every column lookup goes through here.
pub fn cell(row: &[Value], idx: usize) -> &Value {
    static NULL: Value = Value::Null;
    row.get(idx).unwrap_or(&NULL)
}

/// Hashable projection of a [`Value`], used as a grouping key.
///
/// Floats are keyed by bit pattern, so `0.0` and `-0.0` land in different groups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyPart {
    Null,
    Int64(i64),
    Float64Bits(u64),
    Bool(bool),
    Utf8(String),
    Date(NaiveDate),
}

impl From<&Value> for KeyPart {
    fn from(v: &Value) -> Self {
        match v {
            Value::Null => KeyPart::Null,
            Value::Int64(x) => KeyPart::Int64(*x),
            Value::Float64(x) => KeyPart::Float64Bits(x.to_bits()),
            Value::Bool(x) => KeyPart::Bool(*x),
            Value::Utf8(s) => KeyPart::Utf8(s.clone()),
            Value::Date(d) => KeyPart::Date(*d),
        }
    }
}

/// One group produced by [`RecordTable::group_by`].
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// Key values, in the order of the grouping columns.
    pub key: Vec<Value>,
    /// Rows belonging to the group, in their original order.
    pub table: RecordTable,
}

/// Immutable in-memory table of observations.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordTable {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl RecordTable {
    /// Create a table from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// A table with the given schema and no rows.
    pub fn empty(schema: Schema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    /// Number of rows in the table.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Create a new table containing only rows that match `predicate`.
    ///
    /// The returned table preserves the original schema.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&[Value]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|row| predicate(row.as_slice()))
            .cloned()
            .collect();
        Self {
            schema: self.schema.clone(),
            rows,
        }
    }

    /// Keep only the named columns, in the order given.
    ///
    /// Returns `None` if any column is missing from the schema.
    pub fn project(&self, columns: &[&str]) -> Option<Self> {
        let idxs = columns
            .iter()
            .map(|c| self.schema.index_of(c))
            .collect::<Option<Vec<_>>>()?;
        let schema = Schema::new(idxs.iter().map(|&i| self.schema.fields[i].clone()).collect());
        let rows = self
            .rows
            .iter()
            .map(|row| idxs.iter().map(|&i| cell(row, i).clone()).collect())
            .collect();
        Some(Self { schema, rows })
    }

    /// Split rows into groups sharing the same values in `columns`.
    ///
    /// Groups come back in first-seen order; rows within a group keep their relative order.
    /// Returns `None` if any column is missing from the schema.
    pub fn group_by(&self, columns: &[&str]) -> Option<Vec<Group>> {
        let idxs = columns
            .iter()
            .map(|c| self.schema.index_of(c))
            .collect::<Option<Vec<_>>>()?;

        let mut slots: HashMap<Vec<KeyPart>, usize> = HashMap::new();
        let mut groups: Vec<Group> = Vec::new();
        for row in &self.rows {
            let key: Vec<KeyPart> = idxs.iter().map(|&i| KeyPart::from(cell(row, i))).collect();
            let slot = *slots.entry(key).or_insert_with(|| {
                groups.push(Group {
                    key: idxs.iter().map(|&i| cell(row, i).clone()).collect(),
                    table: Self::empty(self.schema.clone()),
                });
                groups.len() - 1
            });
            groups[slot].table.rows.push(row.clone());
        }
        Some(groups)
    }
}

//! Field schemas and type gating.
//!
//! A [`Schema`] maps dotted field names to declared types. When one is
//! configured, every `var` must name a declared field, operators check that
//! the field's type suits them, and literals compared against a field are
//! rendered for that field's type. Without a schema none of this happens.

use std::{collections::HashMap, fmt};

use serde::Deserialize;

use crate::error::{ErrorCode, TranspileError};

/// Declared type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
    Enum,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Object => "object",
            FieldType::Enum => "enum",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, FieldType::Integer | FieldType::Number)
    }

    /// Text-valued types: strings and enums.
    pub fn is_textual(self) -> bool {
        matches!(self, FieldType::String | FieldType::Enum)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The family of operators a field is used with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorCategory {
    /// `+ - * / % max min`
    Numeric,
    /// `cat substr`
    String,
    /// `map filter reduce all some none merge`
    Array,
    /// `> >= < <=`
    Ordering,
    /// `== === != !==`
    Equality,
}

impl OperatorCategory {
    /// Whether a field of type `field_type` may be used with this category.
    pub fn accepts(self, field_type: FieldType) -> bool {
        match self {
            OperatorCategory::Numeric => field_type.is_numeric(),
            OperatorCategory::String => field_type.is_numeric() || field_type.is_textual(),
            OperatorCategory::Array => field_type == FieldType::Array,
            OperatorCategory::Ordering => field_type.is_numeric() || field_type.is_textual(),
            OperatorCategory::Equality => true,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            OperatorCategory::Numeric => "numeric",
            OperatorCategory::String => "string",
            OperatorCategory::Array => "array",
            OperatorCategory::Ordering => "comparison",
            OperatorCategory::Equality => "equality",
        }
    }
}

/// One declared field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(rename = "allowedValues", alias = "allowed_values", default)]
    pub allowed_values: Vec<String>,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        FieldSchema {
            name: name.into(),
            field_type,
            allowed_values: Vec::new(),
        }
    }

    pub fn enumeration<I, S>(name: impl Into<String>, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldSchema {
            name: name.into(),
            field_type: FieldType::Enum,
            allowed_values: allowed.into_iter().map(Into::into).collect(),
        }
    }
}

/// Accepted schema document shapes.
#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaDocument {
    Fields(Vec<FieldSchema>),
    Wrapped { fields: Vec<FieldSchema> },
}

/// Immutable field-name to field-type mapping.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: HashMap<String, FieldSchema>,
    order: Vec<String>,
}

impl Schema {
    /// Builds a schema from declared fields.
    ///
    /// Fails with a validation error on duplicate names, empty names, or
    /// enum fields without allowed values.
    pub fn new(fields: Vec<FieldSchema>) -> Result<Self, TranspileError> {
        let mut schema = Schema::default();
        for field in fields {
            if field.name.is_empty() {
                return Err(TranspileError::new(
                    ErrorCode::Validation,
                    "invalid schema: field name must not be empty",
                ));
            }
            if field.field_type == FieldType::Enum && field.allowed_values.is_empty() {
                return Err(TranspileError::new(
                    ErrorCode::Validation,
                    format!(
                        "invalid schema: enum field '{}' must declare allowedValues",
                        field.name
                    ),
                ));
            }
            if schema.fields.contains_key(&field.name) {
                return Err(TranspileError::new(
                    ErrorCode::Validation,
                    format!("invalid schema: duplicate field '{}'", field.name),
                ));
            }
            schema.order.push(field.name.clone());
            schema.fields.insert(field.name.clone(), field);
        }
        Ok(schema)
    }

    /// Parses a schema document: either an array of fields or an object with
    /// a `fields` array.
    ///
    /// ```
    /// use jsonlogic_sql::schema::{FieldType, Schema};
    ///
    /// let schema = Schema::from_json(r#"[
    ///     {"name": "amount", "type": "integer"},
    ///     {"name": "status", "type": "enum", "allowedValues": ["active", "pending"]}
    /// ]"#).unwrap();
    /// assert_eq!(schema.lookup_type("amount"), Some(FieldType::Integer));
    /// ```
    pub fn from_json(json: &str) -> Result<Self, TranspileError> {
        let document: SchemaDocument = serde_json::from_str(json).map_err(|e| {
            TranspileError::new(ErrorCode::InvalidJson, "invalid schema document").with_cause(e)
        })?;
        Self::from_document(document)
    }

    /// Like [`from_json`](Self::from_json) for an already-decoded value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, TranspileError> {
        let document: SchemaDocument = serde_json::from_value(value).map_err(|e| {
            TranspileError::new(ErrorCode::InvalidJson, "invalid schema document").with_cause(e)
        })?;
        Self::from_document(document)
    }

    fn from_document(document: SchemaDocument) -> Result<Self, TranspileError> {
        match document {
            SchemaDocument::Fields(fields) | SchemaDocument::Wrapped { fields } => {
                Schema::new(fields)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.order.iter().filter_map(|name| self.fields.get(name))
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.get(name)
    }

    pub fn lookup_type(&self, name: &str) -> Option<FieldType> {
        self.fields.get(name).map(|f| f.field_type)
    }

    /// A field exists when it is declared, or when one of its dotted prefixes
    /// is declared as an `object` (its sub-fields are then untyped).
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name) || self.object_prefix(name).is_some()
    }

    fn object_prefix(&self, name: &str) -> Option<&FieldSchema> {
        name.match_indices('.')
            .map(|(i, _)| &name[..i])
            .filter_map(|prefix| self.fields.get(prefix))
            .find(|f| f.field_type == FieldType::Object)
    }

    /// Existence check: errors with `FieldNotInSchema` for unknown fields.
    pub fn validate_field(&self, name: &str) -> Result<(), TranspileError> {
        if self.has_field(name) {
            Ok(())
        } else {
            Err(TranspileError::new(
                ErrorCode::FieldNotInSchema,
                format!("field '{}' is not defined in the schema", name),
            ))
        }
    }

    /// Type check for a field used by an operator of `category`.
    ///
    /// Only declared fields are gated; untyped object sub-fields pass.
    pub fn check_compatible(
        &self,
        category: OperatorCategory,
        operator: &str,
        name: &str,
    ) -> Result<(), TranspileError> {
        match self.lookup_type(name) {
            Some(field_type) => check_compatible(category, operator, name, field_type),
            None => Ok(()),
        }
    }

    /// Errors with `InvalidEnumValue` when `name` is an enum field and `value`
    /// is not one of its allowed values. Non-enum fields always pass.
    pub fn validate_enum(&self, name: &str, value: &str) -> Result<(), TranspileError> {
        let Some(field) = self.fields.get(name) else {
            return Ok(());
        };
        if field.field_type != FieldType::Enum || field.allowed_values.iter().any(|v| v == value)
        {
            return Ok(());
        }
        Err(TranspileError::new(
            ErrorCode::InvalidEnumValue,
            format!(
                "invalid value '{}' for enum field '{}'; allowed values: [{}]",
                value,
                name,
                field.allowed_values.join(", ")
            ),
        ))
    }
}

/// Category compatibility for a single field.
pub fn check_compatible(
    category: OperatorCategory,
    operator: &str,
    name: &str,
    field_type: FieldType,
) -> Result<(), TranspileError> {
    if category.accepts(field_type) {
        return Ok(());
    }
    Err(TranspileError::new(
        ErrorCode::InvalidFieldType,
        format!(
            "field '{}' of type {} cannot be used with {} operator '{}'",
            name,
            field_type,
            category.describe(),
            operator
        ),
    )
    .with_operator(operator))
}

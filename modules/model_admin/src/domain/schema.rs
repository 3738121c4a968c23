//! Field metadata the query pipeline walks when validating and coercing
//! lookups. Relation targets are referenced by `app_label.model_name`.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use listing_core::ast::Value;
use listing_core::OrderBy;
use uuid::Uuid;

use crate::contract::model::Record;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Int,
    Text,
    Bool,
    Date,
    DateTime,
    Uuid,
    /// Many-to-one; the field holds the related pk.
    ForeignKey { to: String },
    /// The field holds a list of related pks.
    ManyToMany { to: String },
    /// Records of `from` whose `via` field points back at this record.
    Reverse { from: String, via: String },
}

impl FieldKind {
    pub fn is_relation(&self) -> bool {
        matches!(
            self,
            FieldKind::ForeignKey { .. } | FieldKind::ManyToMany { .. } | FieldKind::Reverse { .. }
        )
    }

    /// Label of the model on the far side of a relation.
    pub fn related_model(&self) -> Option<&str> {
        match self {
            FieldKind::ForeignKey { to } | FieldKind::ManyToMany { to } => Some(to),
            FieldKind::Reverse { from, .. } => Some(from),
            _ => None,
        }
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, FieldKind::Date | FieldKind::DateTime)
    }

    /// Convert a raw or already typed scalar into this kind. Nulls pass
    /// through; lists are coerced element-wise.
    pub fn coerce(&self, value: &Value) -> Result<Value, String> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::List(items) => items
                .iter()
                .map(|v| self.coerce(v))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            Value::Text(raw) => self.parse_text(raw),
            other if self.accepts(other) => Ok(other.clone()),
            other => Err(format!("'{other}' is not a valid {} value", self.name())),
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (FieldKind::Int, Value::Int(_))
                | (FieldKind::Bool, Value::Bool(_))
                | (FieldKind::Date, Value::Date(_))
                | (FieldKind::DateTime, Value::DateTime(_))
                | (FieldKind::Uuid, Value::Uuid(_))
        )
    }

    fn parse_text(&self, raw: &str) -> Result<Value, String> {
        let invalid = || format!("'{raw}' is not a valid {} value", self.name());
        match self {
            FieldKind::Text => Ok(Value::text(raw)),
            FieldKind::Int => raw.trim().parse().map(Value::Int).map_err(|_| invalid()),
            FieldKind::Bool => match raw.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(Value::Bool(true)),
                "0" | "false" | "no" | "off" => Ok(Value::Bool(false)),
                _ => Err(invalid()),
            },
            FieldKind::Date => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|_| invalid()),
            FieldKind::DateTime => parse_datetime(raw.trim()).map(Value::DateTime).ok_or_else(invalid),
            FieldKind::Uuid => Uuid::parse_str(raw.trim()).map(Value::Uuid).map_err(|_| invalid()),
            // relation values are coerced against the related pk kind by the caller
            FieldKind::ForeignKey { .. } | FieldKind::ManyToMany { .. } | FieldKind::Reverse { .. } => {
                Ok(Value::text(raw))
            }
        }
    }

    fn name(&self) -> &'static str {
        match self {
            FieldKind::Int => "integer",
            FieldKind::Text => "text",
            FieldKind::Bool => "boolean",
            FieldKind::Date => "date",
            FieldKind::DateTime => "datetime",
            FieldKind::Uuid => "uuid",
            FieldKind::ForeignKey { .. } => "foreign key",
            FieldKind::ManyToMany { .. } => "many-to-many",
            FieldKind::Reverse { .. } => "reverse relation",
        }
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM[:SS]` (taken as UTC) and bare dates
/// (midnight UTC).
fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub verbose_name: String,
    pub sortable: bool,
    pub required: bool,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        Self {
            verbose_name: name.replace('_', " "),
            sortable: !kind.is_relation() || matches!(kind, FieldKind::ForeignKey { .. }),
            name,
            kind,
            required: false,
        }
    }

    #[must_use]
    pub fn verbose(mut self, verbose_name: impl Into<String>) -> Self {
        self.verbose_name = verbose_name.into();
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSchema {
    pub app_label: String,
    pub model_name: String,
    pub verbose_name: String,
    pub verbose_name_plural: String,
    pub pk_field: String,
    fields: Vec<FieldSpec>,
    /// Default ordering used when the admin declares none.
    pub ordering: OrderBy,
    pub is_hierarchical: bool,
    /// Fields that keep siblings sorted; when set, insert position is not chosen by callers.
    pub node_order_by: Vec<String>,
    /// Field rendered as the record's display string.
    pub display_field: Option<String>,
}

impl ModelSchema {
    /// New schema with an integer primary key called `id`.
    pub fn new(app_label: impl Into<String>, model_name: impl Into<String>) -> Self {
        let model_name = model_name.into();
        let verbose_name = model_name.replace('_', " ");
        Self {
            app_label: app_label.into(),
            verbose_name_plural: format!("{verbose_name}s"),
            verbose_name,
            model_name,
            pk_field: "id".to_owned(),
            fields: vec![FieldSpec::new("id", FieldKind::Int)],
            ordering: OrderBy::empty(),
            is_hierarchical: false,
            node_order_by: Vec::new(),
            display_field: None,
        }
    }

    #[must_use]
    pub fn verbose_names(mut self, singular: impl Into<String>, plural: impl Into<String>) -> Self {
        self.verbose_name = singular.into();
        self.verbose_name_plural = plural.into();
        self
    }

    /// Replace the primary key field.
    #[must_use]
    pub fn pk(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        self.fields.retain(|f| f.name != self.pk_field);
        self.fields.insert(0, FieldSpec::new(name.clone(), kind));
        self.pk_field = name;
        self
    }

    #[must_use]
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.retain(|f| f.name != spec.name);
        self.fields.push(spec);
        self
    }

    #[must_use]
    pub fn ordering(mut self, ordering: OrderBy) -> Self {
        self.ordering = ordering;
        self
    }

    #[must_use]
    pub fn hierarchical(mut self) -> Self {
        self.is_hierarchical = true;
        self
    }

    #[must_use]
    pub fn node_order_by(mut self, fields: &[&str]) -> Self {
        self.node_order_by = fields.iter().map(|f| (*f).to_owned()).collect();
        self
    }

    #[must_use]
    pub fn display_field(mut self, field: impl Into<String>) -> Self {
        self.display_field = Some(field.into());
        self
    }

    pub fn label(&self) -> String {
        format!("{}.{}", self.app_label, self.model_name)
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Field by name; `pk` resolves to the primary key.
    pub fn get_field(&self, name: &str) -> Option<&FieldSpec> {
        let name = if name == "pk" { self.pk_field.as_str() } else { name };
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn pk_spec(&self) -> Option<&FieldSpec> {
        self.get_field(&self.pk_field)
    }

    pub fn is_pk(&self, name: &str) -> bool {
        name == "pk" || name == self.pk_field
    }

    /// Coerce a raw primary key into this model's pk kind.
    pub fn parse_pk(&self, raw: &str) -> Result<Value, String> {
        match self.pk_spec() {
            Some(spec) => spec.kind.coerce(&Value::text(raw)),
            None => Ok(Value::text(raw)),
        }
    }

    /// Display string of a record: the display field when declared, otherwise
    /// `"<Verbose name> object (<pk>)"`.
    pub fn display(&self, record: &Record) -> String {
        if let Some(v) = self.display_field.as_deref().and_then(|f| record.get(f)) {
            return v.to_string();
        }
        let mut chars = self.verbose_name.chars();
        let name = match chars.next() {
            Some(c) => c.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        format!("{name} object ({})", record.pk)
    }
}

/// All known schemas, keyed by label.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    models: HashMap<String, Arc<ModelSchema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, schema: ModelSchema) -> Arc<ModelSchema> {
        let schema = Arc::new(schema);
        self.models.insert(schema.label(), schema.clone());
        schema
    }

    pub fn get(&self, label: &str) -> Option<Arc<ModelSchema>> {
        self.models.get(label).cloned()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn coerce_scalars() {
        assert_eq!(FieldKind::Int.coerce(&Value::text("42")), Ok(Value::Int(42)));
        assert!(FieldKind::Int.coerce(&Value::text("4x")).is_err());
        assert_eq!(FieldKind::Bool.coerce(&Value::text("False")), Ok(Value::Bool(false)));
        assert_eq!(
            FieldKind::Date.coerce(&Value::text("2024-02-29")),
            Ok(Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()))
        );
        assert!(FieldKind::Date.coerce(&Value::text("2023-02-29")).is_err());
        assert_eq!(FieldKind::Text.coerce(&Value::Null), Ok(Value::Null));
    }

    #[test]
    fn coerce_lists_elementwise() {
        let raw = Value::List(vec![Value::text("1"), Value::text("2")]);
        assert_eq!(
            FieldKind::Int.coerce(&raw),
            Ok(Value::List(vec![Value::Int(1), Value::Int(2)]))
        );
        let bad = Value::List(vec![Value::text("1"), Value::text("x")]);
        assert!(FieldKind::Int.coerce(&bad).is_err());
    }

    #[test]
    fn datetime_accepts_several_forms() {
        for raw in ["2024-01-02T03:04:05Z", "2024-01-02 03:04:05", "2024-01-02 03:04", "2024-01-02"] {
            assert!(
                matches!(FieldKind::DateTime.coerce(&Value::text(raw)), Ok(Value::DateTime(_))),
                "{raw}"
            );
        }
    }

    #[test]
    fn typed_values_pass_through_only_for_matching_kind() {
        assert_eq!(FieldKind::Int.coerce(&Value::Int(3)), Ok(Value::Int(3)));
        assert!(FieldKind::Int.coerce(&Value::Bool(true)).is_err());
    }

    #[test]
    fn pk_alias_and_replacement() {
        let schema = ModelSchema::new("site", "page").pk("page_id", FieldKind::Uuid);
        assert_eq!(schema.pk_field, "page_id");
        assert!(schema.get_field("id").is_none());
        assert_eq!(schema.get_field("pk").map(|f| f.name.as_str()), Some("page_id"));
        assert!(schema.is_pk("pk"));
        assert!(schema.parse_pk("not-a-uuid").is_err());
    }

    #[test]
    fn default_display_string() {
        let schema = ModelSchema::new("blog", "article");
        let record = Record {
            pk: Value::Int(7),
            fields: BTreeMap::new(),
            node: None,
        };
        assert_eq!(schema.display(&record), "Article object (7)");

        let schema = schema
            .field(FieldSpec::new("title", FieldKind::Text))
            .display_field("title");
        let mut record = record;
        record.fields.insert("title".into(), Value::text("Hello"));
        assert_eq!(schema.display(&record), "Hello");
    }

    #[test]
    fn registry_keys_by_label() {
        let mut reg = SchemaRegistry::new();
        reg.register(ModelSchema::new("blog", "author"));
        assert!(reg.get("blog.author").is_some());
        assert!(reg.get("author").is_none());
    }
}

//! Per-model listing options.

use std::fmt;
use std::sync::Arc;

use listing_core::ast::Value;
use listing_core::OrderBy;

use crate::contract::model::Record;
use crate::domain::error::DomainError;
use crate::domain::filters::ListFilterSpec;
use crate::domain::lookups::LookupResolver;
use crate::domain::schema::ModelSchema;
use crate::domain::search::SearchField;

type ColumnFn = Arc<dyn Fn(&Record) -> Value + Send + Sync>;

#[derive(Clone)]
enum ColumnValue {
    Field,
    Display,
    Computed(ColumnFn),
}

/// One `list_display` entry.
#[derive(Clone)]
pub struct ListColumn {
    pub name: String,
    label: Option<String>,
    order_field: Option<String>,
    value: ColumnValue,
}

impl fmt::Debug for ListColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListColumn")
            .field("name", &self.name)
            .field("order_field", &self.order_field)
            .finish_non_exhaustive()
    }
}

impl ListColumn {
    /// Name of the column rendering the record's display string.
    pub const DISPLAY: &'static str = "__str__";

    pub fn field(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            order_field: None,
            value: ColumnValue::Field,
        }
    }

    pub fn display() -> Self {
        Self {
            name: Self::DISPLAY.to_owned(),
            label: None,
            order_field: None,
            value: ColumnValue::Display,
        }
    }

    pub fn computed(
        name: impl Into<String>,
        f: impl Fn(&Record) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            label: None,
            order_field: None,
            value: ColumnValue::Computed(Arc::new(f)),
        }
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sort this column by `token` (may carry a leading `-`).
    #[must_use]
    pub fn order_by(mut self, token: impl Into<String>) -> Self {
        self.order_field = Some(token.into());
        self
    }

    /// Ordering token used when this column is clicked, if it is orderable.
    pub fn ordering_field(&self, schema: &ModelSchema) -> Option<String> {
        if let Some(token) = &self.order_field {
            return Some(token.clone());
        }
        match self.value {
            ColumnValue::Field => schema
                .get_field(&self.name)
                .filter(|f| f.sortable)
                .map(|f| f.name.clone()),
            ColumnValue::Display | ColumnValue::Computed(_) => None,
        }
    }

    pub fn header(&self, schema: &ModelSchema) -> String {
        if let Some(label) = &self.label {
            return label.clone();
        }
        match self.value {
            ColumnValue::Display => schema.verbose_name.clone(),
            ColumnValue::Field => schema
                .get_field(&self.name)
                .map(|f| f.verbose_name.clone())
                .unwrap_or_else(|| self.name.replace('_', " ")),
            ColumnValue::Computed(_) => self.name.replace('_', " "),
        }
    }

    pub fn value(&self, schema: &ModelSchema, record: &Record) -> Value {
        match &self.value {
            ColumnValue::Field => record.get(&self.name).cloned().unwrap_or(Value::Null),
            ColumnValue::Display => Value::Text(schema.display(record)),
            ColumnValue::Computed(f) => f(record),
        }
    }
}

/// How one record type is listed.
#[derive(Debug, Clone)]
pub struct ModelAdmin {
    pub schema: Arc<ModelSchema>,
    pub list_display: Vec<ListColumn>,
    pub list_filter: Vec<ListFilterSpec>,
    pub search_fields: Vec<String>,
    /// Overrides the schema ordering when non-empty.
    pub ordering: OrderBy,
    pub list_per_page: Option<u64>,
    pub show_full_result_count: Option<bool>,
    pub inspect_view_enabled: Option<bool>,
    pub read_only: bool,
}

impl ModelAdmin {
    pub fn new(schema: Arc<ModelSchema>) -> Self {
        Self {
            schema,
            list_display: vec![ListColumn::display()],
            list_filter: Vec::new(),
            search_fields: Vec::new(),
            ordering: OrderBy::empty(),
            list_per_page: None,
            show_full_result_count: None,
            inspect_view_enabled: None,
            read_only: false,
        }
    }

    #[must_use]
    pub fn list_display(mut self, columns: Vec<ListColumn>) -> Self {
        self.list_display = columns;
        self
    }

    #[must_use]
    pub fn list_filter(mut self, specs: Vec<ListFilterSpec>) -> Self {
        self.list_filter = specs;
        self
    }

    #[must_use]
    pub fn search_fields(mut self, fields: &[&str]) -> Self {
        self.search_fields = fields.iter().map(|f| (*f).to_owned()).collect();
        self
    }

    #[must_use]
    pub fn ordering(mut self, ordering: OrderBy) -> Self {
        self.ordering = ordering;
        self
    }

    #[must_use]
    pub fn list_per_page(mut self, n: u64) -> Self {
        self.list_per_page = Some(n);
        self
    }

    #[must_use]
    pub fn show_full_result_count(mut self, on: bool) -> Self {
        self.show_full_result_count = Some(on);
        self
    }

    #[must_use]
    pub fn inspect_view_enabled(mut self, on: bool) -> Self {
        self.inspect_view_enabled = Some(on);
        self
    }

    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn label(&self) -> String {
        self.schema.label()
    }

    /// Reject options that name fields the schema does not have.
    pub fn validate(&self, resolver: &LookupResolver) -> Result<(), DomainError> {
        let label = self.schema.label();
        for col in &self.list_display {
            if matches!(col.value, ColumnValue::Field) && self.schema.get_field(&col.name).is_none() {
                return Err(DomainError::configuration(format!(
                    "list_display on {label} refers to unknown field '{}'",
                    col.name
                )));
            }
        }
        for decl in &self.search_fields {
            let field = SearchField::parse(decl);
            if resolver.field_at(&field.path).is_none() {
                return Err(DomainError::configuration(format!(
                    "search field '{decl}' on {label} does not resolve"
                )));
            }
        }
        for spec in &self.list_filter {
            spec.bind(resolver)?;
        }
        for key in self.ordering.keys() {
            if resolver.field_at(&key.field).is_none() {
                return Err(DomainError::configuration(format!(
                    "ordering on {label} refers to unknown field '{}'",
                    key.field
                )));
            }
        }
        Ok(())
    }
}

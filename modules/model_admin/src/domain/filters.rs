//! List filters and the stage that applies them to a query.

use std::collections::BTreeMap;
use std::sync::Arc;

use listing_core::ast::{Expr, Lookup};
use listing_core::LOOKUP_SEP;

use crate::contract::model::FilterSummary;
use crate::domain::error::DomainError;
use crate::domain::lookups::{field_path_of, LookupResolver, LookupValidator};
use crate::domain::repo::RecordQuery;
use crate::domain::schema::FieldKind;

/// A sidebar filter. It owns a set of query parameters and narrows the
/// query from the values it receives for them.
pub trait ListFilter: Send + Sync {
    fn title(&self) -> String;

    /// Query parameter names this filter consumes.
    fn expected_parameters(&self) -> Vec<String>;

    /// Field paths this filter makes filterable from the query string.
    /// Defaults to the expected parameters with their operators removed.
    fn allowed_lookups(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .expected_parameters()
            .iter()
            .map(|p| field_path_of(p))
            .collect();
        paths.dedup();
        paths
    }

    /// Whether the filtered path crosses a relation.
    fn crosses_relation(&self) -> bool {
        false
    }

    /// Narrow `query` using the parameters consumed from the request.
    /// `None` leaves the query unchanged.
    fn queryset(
        &self,
        resolver: &LookupResolver,
        used: &BTreeMap<String, String>,
        query: &RecordQuery,
    ) -> Result<Option<RecordQuery>, DomainError>;
}

#[derive(Clone)]
pub enum ListFilterSpec {
    /// Default filter for a field path, e.g. `status` or `author__country`.
    Field(String),
    Custom(Arc<dyn ListFilter>),
}

impl std::fmt::Debug for ListFilterSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListFilterSpec::Field(path) => f.debug_tuple("Field").field(path).finish(),
            ListFilterSpec::Custom(filter) => f.debug_tuple("Custom").field(&filter.title()).finish(),
        }
    }
}

impl ListFilterSpec {
    pub fn field(path: impl Into<String>) -> Self {
        ListFilterSpec::Field(path.into())
    }

    pub fn bind(&self, resolver: &LookupResolver) -> Result<Arc<dyn ListFilter>, DomainError> {
        match self {
            ListFilterSpec::Field(path) => {
                Ok(Arc::new(FieldListFilter::new(path, resolver)?) as Arc<dyn ListFilter>)
            }
            ListFilterSpec::Custom(filter) => Ok(filter.clone()),
        }
    }
}

/// Default filter for one field path. Relations take `exact`, `in` and
/// `isnull`; dates take a `gte`/`lt` window; other kinds take a plain or
/// `exact` value and `isnull`.
#[derive(Debug, Clone)]
pub struct FieldListFilter {
    path: String,
    title: String,
    params: Vec<String>,
    crosses_relation: bool,
}

impl FieldListFilter {
    pub fn new(path: &str, resolver: &LookupResolver) -> Result<Self, DomainError> {
        let field = resolver.field_at(path).ok_or_else(|| {
            DomainError::configuration(format!(
                "list filter '{path}' does not name a field of {}",
                resolver.schema().label()
            ))
        })?;
        let suffixes: &[&str] = match field.kind {
            FieldKind::ForeignKey { .. } | FieldKind::ManyToMany { .. } | FieldKind::Reverse { .. } => {
                &["exact", "in", "isnull"]
            }
            FieldKind::Date | FieldKind::DateTime => &["gte", "lt"],
            _ => &["", "exact", "isnull"],
        };
        let params = suffixes
            .iter()
            .map(|s| {
                if s.is_empty() {
                    path.to_owned()
                } else {
                    format!("{path}{LOOKUP_SEP}{s}")
                }
            })
            .collect();
        Ok(Self {
            path: path.to_owned(),
            title: field.verbose_name.clone(),
            params,
            crosses_relation: resolver.crosses_relation(path),
        })
    }
}

impl ListFilter for FieldListFilter {
    fn title(&self) -> String {
        self.title.clone()
    }

    fn expected_parameters(&self) -> Vec<String> {
        self.params.clone()
    }

    fn allowed_lookups(&self) -> Vec<String> {
        vec![self.path.clone()]
    }

    fn crosses_relation(&self) -> bool {
        self.crosses_relation
    }

    fn queryset(
        &self,
        resolver: &LookupResolver,
        used: &BTreeMap<String, String>,
        query: &RecordQuery,
    ) -> Result<Option<RecordQuery>, DomainError> {
        let exprs = resolve_all(resolver, used)?;
        if exprs.is_empty() {
            return Ok(None);
        }
        Ok(Some(query.clone().filter(Expr::all_of(exprs))))
    }
}

fn resolve_all(
    resolver: &LookupResolver,
    params: &BTreeMap<String, String>,
) -> Result<Vec<Expr>, DomainError> {
    let mut exprs = Vec::new();
    for (key, raw) in params {
        let lookup = Lookup::from_param(key, raw)
            .map_err(|e| DomainError::incorrect_lookup(format!("{key}: {e}")))?;
        if let Some(resolved) = resolver.resolve(&lookup)? {
            exprs.push(Expr::Lookup(resolved.lookup));
        }
    }
    Ok(exprs)
}

#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub query: RecordQuery,
    pub summaries: Vec<FilterSummary>,
    pub has_active_filters: bool,
    pub needs_distinct: bool,
}

/// Validate every lookup parameter, run the declared filters in order, then
/// apply what no filter consumed as an exact-match conjunction.
pub fn apply_filters(
    base: RecordQuery,
    params: &BTreeMap<String, String>,
    specs: &[ListFilterSpec],
    resolver: &LookupResolver,
) -> Result<FilterOutcome, DomainError> {
    let filters = specs
        .iter()
        .map(|spec| spec.bind(resolver))
        .collect::<Result<Vec<_>, _>>()?;

    let validator = LookupValidator::new(
        resolver.clone(),
        filters.iter().flat_map(|f| f.allowed_lookups()),
    );
    for (key, value) in params {
        validator.check(key, value)?;
    }

    let mut remaining = params.clone();
    let mut query = base;
    let mut summaries = Vec::with_capacity(filters.len());
    let mut has_active_filters = false;
    let mut needs_distinct = false;

    for filter in &filters {
        let used: BTreeMap<String, String> = filter
            .expected_parameters()
            .into_iter()
            .filter_map(|p| remaining.remove_entry(&p))
            .collect();
        if !used.is_empty() {
            has_active_filters = true;
            needs_distinct |= filter.crosses_relation();
        }
        if let Some(narrowed) = filter.queryset(resolver, &used, &query)? {
            query = narrowed;
        }
        summaries.push(FilterSummary {
            title: filter.title(),
            used_parameters: used,
        });
    }

    let mut exprs = Vec::new();
    for (key, raw) in &remaining {
        let lookup = Lookup::from_param(key, raw)
            .map_err(|e| DomainError::incorrect_lookup(format!("{key}: {e}")))?;
        if let Some(resolved) = resolver.resolve(&lookup)? {
            has_active_filters = true;
            needs_distinct |= resolved.crosses_relation;
            exprs.push(Expr::Lookup(resolved.lookup));
        }
    }
    if !exprs.is_empty() {
        query = query.filter(Expr::all_of(exprs));
    }

    Ok(FilterOutcome {
        query,
        summaries,
        has_active_filters,
        needs_distinct,
    })
}

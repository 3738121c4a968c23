//! Lookup path resolution against the schema registry.
//!
//! [`LookupValidator`] decides whether a query-string key may be applied at
//! all; [`LookupResolver`] turns an accepted [`Lookup`] into one whose path
//! uses canonical field names and whose value has the target field's kind.

use std::collections::BTreeSet;
use std::sync::Arc;

use listing_core::ast::{Lookup, LookupOp, Value};
use listing_core::{split_lookup, LOOKUP_SEP};
use regex::Regex;

use crate::domain::error::DomainError;
use crate::domain::schema::{FieldKind, FieldSpec, ModelSchema, SchemaRegistry};

/// A lookup ready for a store, plus whether its path crosses a relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLookup {
    pub lookup: Lookup,
    pub crosses_relation: bool,
}

#[derive(Debug, Clone)]
pub struct LookupResolver {
    schema: Arc<ModelSchema>,
    registry: Arc<SchemaRegistry>,
}

impl LookupResolver {
    pub fn new(schema: Arc<ModelSchema>, registry: Arc<SchemaRegistry>) -> Self {
        Self { schema, registry }
    }

    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    /// Path used for allow-list matching: relation segments up to and
    /// including the first non-relational field, with a trailing related pk
    /// dropped. Unknown segments end the walk.
    pub fn normalize(&self, segments: &[&str]) -> Vec<String> {
        let mut out = Vec::new();
        let mut model = self.schema.clone();
        let mut after_relation = false;
        for seg in segments {
            let Some(field) = model.get_field(seg).cloned() else {
                break;
            };
            if after_relation && model.is_pk(seg) {
                break;
            }
            out.push((*seg).to_owned());
            if !field.kind.is_relation() {
                break;
            }
            match self.related(&field) {
                Some(related) => {
                    model = related;
                    after_relation = true;
                }
                None => break,
            }
        }
        out
    }

    /// Whether walking `path` passes through any relation. Only the first
    /// segment can start a traversal.
    pub fn crosses_relation(&self, path: &str) -> bool {
        split_lookup(path)
            .first()
            .and_then(|seg| self.schema.get_field(seg))
            .is_some_and(|f| f.kind.is_relation())
    }

    /// Final field of a fully known path without operators.
    pub fn field_at(&self, path: &str) -> Option<FieldSpec> {
        let mut model = self.schema.clone();
        let segments = split_lookup(path);
        for (i, seg) in segments.iter().enumerate() {
            let field = model.get_field(seg)?.clone();
            if i + 1 == segments.len() {
                return Some(field);
            }
            model = self.related(&field)?;
        }
        None
    }

    /// Canonicalise and coerce a lookup. `Ok(None)` means the first segment
    /// names no field and the lookup should be ignored.
    pub fn resolve(&self, lookup: &Lookup) -> Result<Option<ResolvedLookup>, DomainError> {
        if lookup.path.is_empty() {
            return Ok(None);
        }
        let mut model = self.schema.clone();
        let mut path = Vec::with_capacity(lookup.path.len());
        let mut crosses_relation = false;
        let mut target = FieldKind::Text;
        for (i, seg) in lookup.path.iter().enumerate() {
            let last = i + 1 == lookup.path.len();
            let Some(field) = model.get_field(seg).cloned() else {
                if i == 0 {
                    return Ok(None);
                }
                return Err(DomainError::incorrect_lookup(format!(
                    "{} has no field named '{seg}'",
                    model.label()
                )));
            };
            path.push(field.name.clone());
            if field.kind.is_relation() {
                crosses_relation = true;
                let related = self.related(&field).ok_or_else(|| {
                    DomainError::configuration(format!(
                        "relation '{}' on {} points at an unregistered model",
                        field.name,
                        model.label()
                    ))
                })?;
                if last {
                    target = related
                        .pk_spec()
                        .map(|pk| pk.kind.clone())
                        .unwrap_or(FieldKind::Text);
                }
                model = related;
            } else {
                if !last {
                    return Err(DomainError::incorrect_lookup(format!(
                        "unsupported lookup '{}' for field '{}'",
                        lookup.path[i + 1],
                        field.name
                    )));
                }
                target = field.kind.clone();
            }
        }
        let value = coerce_for_op(lookup.op, &target, &lookup.value).map_err(|reason| {
            DomainError::incorrect_lookup(format!("{}: {reason}", lookup.key()))
        })?;
        Ok(Some(ResolvedLookup {
            lookup: Lookup {
                path,
                op: lookup.op,
                value,
            },
            crosses_relation,
        }))
    }

    fn related(&self, field: &FieldSpec) -> Option<Arc<ModelSchema>> {
        field
            .kind
            .related_model()
            .and_then(|label| self.registry.get(label))
    }
}

fn coerce_for_op(op: LookupOp, kind: &FieldKind, value: &Value) -> Result<Value, String> {
    match op {
        LookupOp::IsNull => match value {
            Value::Bool(_) => Ok(value.clone()),
            other => Err(format!("'{other}' is not a boolean")),
        },
        LookupOp::Regex | LookupOp::IRegex => {
            let pattern = value.to_string();
            Regex::new(&pattern).map_err(|e| format!("invalid pattern: {e}"))?;
            Ok(Value::Text(pattern))
        }
        op if op.is_text_match() => Ok(Value::Text(value.to_string())),
        op if op.is_date_part() => {
            if !kind.is_temporal() {
                return Err(format!("'{op}' needs a date or datetime field"));
            }
            FieldKind::Int.coerce(value)
        }
        LookupOp::In => match value {
            Value::List(_) => kind.coerce(value),
            single => kind.coerce(&Value::List(vec![single.clone()])),
        },
        LookupOp::Range => match value {
            Value::List(items) if items.len() == 2 => kind.coerce(value),
            _ => Err("range needs exactly two comma separated bounds".to_owned()),
        },
        _ => kind.coerce(value),
    }
}

fn pop_lookup_op(segments: &mut Vec<&str>) {
    if segments.len() > 1 && segments.last().is_some_and(|s| LookupOp::parse(s).is_some()) {
        segments.pop();
    }
}

/// `param` without its trailing lookup operator, e.g. `published__gte`
/// becomes `published`. A bare operator name is kept as a field name.
pub fn field_path_of(param: &str) -> String {
    let mut segments = split_lookup(param);
    pop_lookup_op(&mut segments);
    segments.join(LOOKUP_SEP)
}

/// Allow-list check for incoming lookup keys.
#[derive(Debug, Clone)]
pub struct LookupValidator {
    resolver: LookupResolver,
    allowed: BTreeSet<String>,
}

impl LookupValidator {
    pub fn new(resolver: LookupResolver, allowed: impl IntoIterator<Item = String>) -> Self {
        Self {
            resolver,
            allowed: allowed.into_iter().collect(),
        }
    }

    pub fn is_lookup_allowed(&self, lookup_path: &str, _value: &str) -> bool {
        let mut segments = split_lookup(lookup_path);
        pop_lookup_op(&mut segments);
        let normalized = self.resolver.normalize(&segments);
        normalized.is_empty() || self.allowed.contains(&normalized.join(LOOKUP_SEP))
    }

    pub fn check(&self, lookup_path: &str, value: &str) -> Result<(), DomainError> {
        if self.is_lookup_allowed(lookup_path, value) {
            Ok(())
        } else {
            Err(DomainError::disallowed_lookup(lookup_path))
        }
    }
}

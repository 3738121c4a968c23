//! Filter evaluation over in-memory rows.
//!
//! A record's match count stands in for the number of joined rows a SQL
//! store would produce: a multi-valued relation contributes one row per
//! related record that satisfies the lookup.

use std::collections::HashMap;

use anyhow::{anyhow, Context};
use chrono::Datelike;
use listing_core::ast::{Expr, Lookup, LookupOp, Value};
use listing_core::OrderKey;
use listing_core::{split_lookup, SortDir};
use regex::RegexBuilder;

use super::memory::Table;
use crate::contract::model::Record;
use crate::domain::schema::{FieldKind, ModelSchema, SchemaRegistry};

pub(super) struct Evaluator<'a> {
    pub registry: &'a SchemaRegistry,
    pub tables: &'a HashMap<String, Table>,
}

impl Evaluator<'_> {
    /// Values reached by following `path` from `record`, one per joined row.
    pub fn values(&self, schema: &ModelSchema, record: &Record, path: &[String]) -> Vec<Value> {
        let Some((head, rest)) = path.split_first() else {
            return vec![record.pk.clone()];
        };
        let Some(field) = schema.get_field(head) else {
            return Vec::new();
        };
        let raw = record.get(&field.name).cloned().unwrap_or(Value::Null);
        match &field.kind {
            FieldKind::ForeignKey { to } => {
                if rest.is_empty() {
                    return vec![raw];
                }
                if raw.is_null() {
                    return Vec::new();
                }
                self.follow(to, &[raw], rest)
            }
            FieldKind::ManyToMany { to } => {
                let pks = match raw {
                    Value::List(items) => items,
                    Value::Null => Vec::new(),
                    other => vec![other],
                };
                if rest.is_empty() {
                    return pks;
                }
                self.follow(to, &pks, rest)
            }
            FieldKind::Reverse { from, via } => {
                let (Some(related), Some(table)) = (self.registry.get(from), self.tables.get(from)) else {
                    return Vec::new();
                };
                let referrers = table.rows.iter().filter(|r| match r.get(via) {
                    Some(Value::List(items)) => items.contains(&record.pk),
                    Some(v) => *v == record.pk,
                    None => false,
                });
                if rest.is_empty() {
                    return referrers.map(|r| r.pk.clone()).collect();
                }
                referrers
                    .flat_map(|r| self.values(&related, r, rest))
                    .collect()
            }
            _ if rest.is_empty() => vec![raw],
            _ => Vec::new(),
        }
    }

    fn follow(&self, label: &str, pks: &[Value], rest: &[String]) -> Vec<Value> {
        let (Some(related), Some(table)) = (self.registry.get(label), self.tables.get(label)) else {
            return Vec::new();
        };
        pks.iter()
            .filter_map(|pk| table.get(pk))
            .flat_map(|r| self.values(&related, r, rest))
            .collect()
    }

    /// How many joined rows of `record` satisfy `expr`.
    pub fn count(&self, schema: &ModelSchema, record: &Record, expr: &Expr) -> anyhow::Result<usize> {
        match expr {
            Expr::Lookup(lookup) => self.count_lookup(schema, record, lookup),
            Expr::And(items) => items.iter().try_fold(1usize, |acc, e| {
                Ok(acc.saturating_mul(self.count(schema, record, e)?))
            }),
            Expr::Or(items) => items.iter().try_fold(0usize, |acc, e| {
                Ok(acc.max(self.count(schema, record, e)?))
            }),
            Expr::Not(inner) => Ok(usize::from(self.count(schema, record, inner)? == 0)),
        }
    }

    fn count_lookup(&self, schema: &ModelSchema, record: &Record, lookup: &Lookup) -> anyhow::Result<usize> {
        let values = self.values(schema, record, &lookup.path);
        if values.is_empty() {
            // an outer join with no partner still yields one all-null row
            return Ok(usize::from(matches(lookup.op, &Value::Null, &lookup.value)?));
        }
        let mut n = 0;
        for v in &values {
            if matches(lookup.op, v, &lookup.value)? {
                n += 1;
            }
        }
        Ok(n)
    }

    pub fn sort_key(&self, schema: &ModelSchema, record: &Record, key: &OrderKey) -> Value {
        let path: Vec<String> = split_lookup(&key.field).into_iter().map(str::to_owned).collect();
        self.values(schema, record, &path)
            .into_iter()
            .next()
            .unwrap_or(Value::Null)
    }

    pub fn compare(
        &self,
        schema: &ModelSchema,
        a: &Record,
        b: &Record,
        keys: &[OrderKey],
    ) -> std::cmp::Ordering {
        for key in keys {
            let ord = self.sort_key(schema, a, key).cmp(&self.sort_key(schema, b, key));
            let ord = match key.dir {
                SortDir::Asc => ord,
                SortDir::Desc => ord.reverse(),
            };
            if ord.is_ne() {
                return ord;
            }
        }
        std::cmp::Ordering::Equal
    }
}

fn lower(v: &Value) -> String {
    v.to_string().to_lowercase()
}

fn date_part(v: &Value, op: LookupOp) -> Option<i64> {
    let (y, m, d) = match v {
        Value::Date(d) => (d.year(), d.month(), d.day()),
        Value::DateTime(dt) => (dt.year(), dt.month(), dt.day()),
        _ => return None,
    };
    match op {
        LookupOp::Year => Some(i64::from(y)),
        LookupOp::Month => Some(i64::from(m)),
        LookupOp::Day => Some(i64::from(d)),
        _ => None,
    }
}

/// Compare one joined value against a lookup argument. Comparisons with
/// null are false except for `isnull` and `exact` against null.
fn matches(op: LookupOp, field: &Value, arg: &Value) -> anyhow::Result<bool> {
    match op {
        LookupOp::IsNull => return Ok(field.is_null() == arg.as_bool().unwrap_or(false)),
        LookupOp::Exact if arg.is_null() => return Ok(field.is_null()),
        _ if field.is_null() => return Ok(false),
        _ => {}
    }
    let ok = match op {
        LookupOp::Exact => field == arg,
        LookupOp::IExact => lower(field) == lower(arg),
        LookupOp::Contains => field.to_string().contains(&arg.to_string()),
        LookupOp::IContains | LookupOp::Search => lower(field).contains(&lower(arg)),
        LookupOp::StartsWith => field.to_string().starts_with(&arg.to_string()),
        LookupOp::IStartsWith => lower(field).starts_with(&lower(arg)),
        LookupOp::EndsWith => field.to_string().ends_with(&arg.to_string()),
        LookupOp::IEndsWith => lower(field).ends_with(&lower(arg)),
        LookupOp::Gt => field > arg,
        LookupOp::Gte => field >= arg,
        LookupOp::Lt => field < arg,
        LookupOp::Lte => field <= arg,
        LookupOp::In => match arg {
            Value::List(items) => items.contains(field),
            other => field == other,
        },
        LookupOp::Range => match arg {
            Value::List(items) if items.len() == 2 => &items[0] <= field && field <= &items[1],
            _ => return Err(anyhow!("range needs two bounds")),
        },
        LookupOp::Regex | LookupOp::IRegex => {
            let re = RegexBuilder::new(&arg.to_string())
                .case_insensitive(op == LookupOp::IRegex)
                .build()
                .context("invalid regex lookup")?;
            re.is_match(&field.to_string())
        }
        LookupOp::Year | LookupOp::Month | LookupOp::Day => {
            date_part(field, op).is_some_and(|part| Some(part) == arg.as_i64())
        }
        LookupOp::IsNull => field.is_null() == arg.as_bool().unwrap_or(false),
    };
    Ok(ok)
}

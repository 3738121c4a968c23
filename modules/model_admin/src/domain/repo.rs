use std::sync::Arc;

use listing_core::ast::{Expr, Value};
use listing_core::OrderBy;

use crate::contract::model::{NewRecord, Record};
use crate::domain::schema::ModelSchema;

/// A store-agnostic query: conjunctive filter steps, an ordering and a
/// distinct flag. Each filter step is one join scope, so a step that crosses
/// a multi-valued relation may yield a record more than once unless
/// `distinct` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordQuery {
    pub filters: Vec<Expr>,
    pub order: OrderBy,
    pub distinct: bool,
}

impl RecordQuery {
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn filter(mut self, expr: Expr) -> Self {
        self.filters.push(expr);
        self
    }

    #[must_use]
    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order = order;
        self
    }

    #[must_use]
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }
}

/// Repository port for one record type. Implementations receive values
/// already coerced to each field's kind.
pub trait RecordStore: Send + Sync {
    fn schema(&self) -> Arc<ModelSchema>;

    fn count(&self, query: &RecordQuery) -> anyhow::Result<u64>;

    fn fetch(&self, query: &RecordQuery, offset: u64, limit: u64) -> anyhow::Result<Vec<Record>>;

    fn get(&self, pk: &Value) -> anyhow::Result<Option<Record>>;

    fn insert(&self, record: NewRecord) -> anyhow::Result<Record>;
}

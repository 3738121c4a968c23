//! In-memory record store.
//!
//! Tables are keyed by model label and guarded by one `RwLock`; tree
//! attachment holds the write lock for the whole insert so depth, child
//! lists and child counts change together.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, bail};
use listing_core::ast::Value;
use parking_lot::RwLock;
use uuid::Uuid;

use super::eval::Evaluator;
use crate::contract::model::{NewRecord, Record, TreeNode};
use crate::domain::ports::SiblingPosition;
use crate::domain::repo::{RecordQuery, RecordStore};
use crate::domain::schema::{FieldKind, ModelSchema, SchemaRegistry};

#[derive(Debug, Default)]
pub(super) struct Table {
    pub(super) rows: Vec<Record>,
    index: HashMap<Value, usize>,
    last_id: i64,
    /// Ordered child pks per parent; `None` holds the roots.
    children: HashMap<Option<Value>, Vec<Value>>,
}

impl Table {
    pub(super) fn get(&self, pk: &Value) -> Option<&Record> {
        self.index.get(pk).and_then(|i| self.rows.get(*i))
    }

    fn get_mut(&mut self, pk: &Value) -> Option<&mut Record> {
        self.index.get(pk).and_then(|i| self.rows.get_mut(*i))
    }

    fn push(&mut self, record: Record) {
        if let Value::Int(id) = record.pk {
            self.last_id = self.last_id.max(id);
        }
        self.index.insert(record.pk.clone(), self.rows.len());
        self.rows.push(record);
    }

    /// Insertion order for flat tables, depth-first preorder for trees.
    fn ordered(&self, tree: bool) -> Vec<&Record> {
        if !tree {
            return self.rows.iter().collect();
        }
        let mut out = Vec::with_capacity(self.rows.len());
        let mut stack: Vec<&Value> = self
            .children
            .get(&None)
            .map(|roots| roots.iter().rev().collect())
            .unwrap_or_default();
        while let Some(pk) = stack.pop() {
            if let Some(record) = self.get(pk) {
                out.push(record);
            }
            if let Some(kids) = self.children.get(&Some(pk.clone())) {
                stack.extend(kids.iter().rev());
            }
        }
        out
    }

    /// `pk` followed by its ancestors up to the root.
    fn lineage(&self, pk: &Value) -> Vec<Value> {
        let mut out = Vec::new();
        let mut current = Some(pk.clone());
        while let Some(pk) = current {
            current = self
                .get(&pk)
                .and_then(|r| r.node.as_ref())
                .and_then(|n| n.parent.clone());
            out.push(pk);
        }
        out
    }
}

/// Where a tree record is attached.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Placement<'a> {
    Root,
    Child(&'a Value),
    Sibling(&'a Value, SiblingPosition),
}

pub struct MemoryDatabase {
    registry: Arc<SchemaRegistry>,
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryDatabase {
    pub fn new(registry: Arc<SchemaRegistry>) -> Arc<Self> {
        Arc::new(Self {
            registry,
            tables: RwLock::new(HashMap::new()),
        })
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    pub(crate) fn schema(&self, label: &str) -> anyhow::Result<Arc<ModelSchema>> {
        self.registry
            .get(label)
            .ok_or_else(|| anyhow!("unknown model '{label}'"))
    }

    /// Store view for one model.
    pub fn record_store(self: &Arc<Self>, label: &str) -> anyhow::Result<MemoryRecordStore> {
        Ok(MemoryRecordStore {
            db: self.clone(),
            schema: self.schema(label)?,
        })
    }

    /// Insert a record. Tree-backed types are appended as the last root.
    pub fn insert(&self, label: &str, record: NewRecord) -> anyhow::Result<Record> {
        let schema = self.schema(label)?;
        if schema.is_hierarchical {
            return self.attach(label, record, Placement::Root);
        }
        let mut tables = self.tables.write();
        let table = tables.entry(label.to_owned()).or_default();
        let record = build_record(&schema, table, record, None)?;
        table.push(record.clone());
        Ok(record)
    }

    pub fn get(&self, label: &str, pk: &Value) -> Option<Record> {
        self.tables.read().get(label).and_then(|t| t.get(pk)).cloned()
    }

    /// Matching records, each repeated once per joined row unless the query
    /// is distinct.
    pub fn query(&self, label: &str, query: &RecordQuery) -> anyhow::Result<Vec<Record>> {
        let schema = self.schema(label)?;
        let tables = self.tables.read();
        let Some(table) = tables.get(label) else {
            return Ok(Vec::new());
        };
        let eval = Evaluator {
            registry: &self.registry,
            tables: &*tables,
        };
        let mut hits: Vec<(&Record, usize)> = Vec::new();
        for record in table.ordered(schema.is_hierarchical) {
            let mut rows = 1usize;
            for expr in &query.filters {
                rows = rows.saturating_mul(eval.count(&schema, record, expr)?);
                if rows == 0 {
                    break;
                }
            }
            if rows == 0 {
                continue;
            }
            hits.push((record, if query.distinct { 1 } else { rows }));
        }
        if !query.order.is_empty() {
            hits.sort_by(|a, b| eval.compare(&schema, a.0, b.0, query.order.keys()));
        }
        Ok(hits
            .into_iter()
            .flat_map(|(record, rows)| std::iter::repeat(record.clone()).take(rows))
            .collect())
    }

    /// Primary keys of a tree-backed model in depth-first order.
    pub fn traversal(&self, label: &str) -> Vec<Value> {
        self.tables
            .read()
            .get(label)
            .map(|t| t.ordered(true).into_iter().map(|r| r.pk.clone()).collect())
            .unwrap_or_default()
    }

    pub(crate) fn tree_records(&self, label: &str) -> Vec<Record> {
        self.tables
            .read()
            .get(label)
            .map(|t| t.ordered(true).into_iter().cloned().collect())
            .unwrap_or_default()
    }

    pub(crate) fn lineage(&self, label: &str, pk: &Value) -> Vec<Value> {
        self.tables
            .read()
            .get(label)
            .map(|t| t.lineage(pk))
            .unwrap_or_default()
    }

    pub(crate) fn attach(&self, label: &str, record: NewRecord, at: Placement<'_>) -> anyhow::Result<Record> {
        let schema = self.schema(label)?;
        if !schema.is_hierarchical {
            bail!("{label} is not stored in a tree");
        }
        let mut tables = self.tables.write();
        let table = tables.entry(label.to_owned()).or_default();

        let (parent, depth) = match at {
            Placement::Root => (None, 1),
            Placement::Child(parent_pk) => {
                let parent = table
                    .get(parent_pk)
                    .ok_or_else(|| anyhow!("parent {parent_pk} of {label} not found"))?;
                let depth = parent.node.as_ref().map_or(1, |n| n.depth) + 1;
                (Some(parent_pk.clone()), depth)
            }
            Placement::Sibling(sibling_pk, _) => {
                let node = table
                    .get(sibling_pk)
                    .and_then(|s| s.node.as_ref())
                    .ok_or_else(|| anyhow!("sibling {sibling_pk} of {label} not found"))?;
                (node.parent.clone(), node.depth)
            }
        };

        let node = TreeNode {
            parent: parent.clone(),
            depth,
            numchild: 0,
            live: record.live,
            has_unpublished_changes: record.has_unpublished_changes,
            url: record.url.clone(),
        };
        let record = build_record(&schema, table, record, Some(node))?;

        let siblings = table.children.get(&parent).cloned().unwrap_or_default();
        let idx = if schema.node_order_by.is_empty() {
            let position_of = |pk: &Value| siblings.iter().position(|s| s == pk);
            match at {
                Placement::Sibling(pk, SiblingPosition::Left) => position_of(pk),
                Placement::Sibling(pk, SiblingPosition::Right) => position_of(pk).map(|i| i + 1),
                _ => None,
            }
            .unwrap_or(siblings.len())
        } else {
            let key = order_key(&schema, &record);
            siblings
                .iter()
                .position(|pk| table.get(pk).is_some_and(|r| order_key(&schema, r) > key))
                .unwrap_or(siblings.len())
        };
        table
            .children
            .entry(parent.clone())
            .or_default()
            .insert(idx, record.pk.clone());
        if let Some(node) = parent
            .as_ref()
            .and_then(|p| table.get_mut(p))
            .and_then(|r| r.node.as_mut())
        {
            node.numchild += 1;
        }
        table.push(record.clone());
        Ok(record)
    }
}

fn order_key(schema: &ModelSchema, record: &Record) -> Vec<Value> {
    schema
        .node_order_by
        .iter()
        .map(|f| record.get(f).cloned().unwrap_or(Value::Null))
        .collect()
}

/// Assign the pk (next integer or a fresh uuid when absent) and store it
/// among the fields.
fn build_record(
    schema: &ModelSchema,
    table: &Table,
    record: NewRecord,
    node: Option<TreeNode>,
) -> anyhow::Result<Record> {
    let mut fields = record.fields;
    let pk = match fields.get(&schema.pk_field) {
        Some(v) if !v.is_null() => v.clone(),
        _ => match schema.pk_spec().map(|f| &f.kind) {
            Some(FieldKind::Int) => Value::Int(table.last_id + 1),
            Some(FieldKind::Uuid) => Value::Uuid(Uuid::new_v4()),
            _ => bail!("{} needs an explicit primary key", schema.label()),
        },
    };
    if table.get(&pk).is_some() {
        bail!("duplicate primary key {pk} for {}", schema.label());
    }
    fields.insert(schema.pk_field.clone(), pk.clone());
    Ok(Record { pk, fields, node })
}

/// [`RecordStore`] over one table of a [`MemoryDatabase`].
#[derive(Clone)]
pub struct MemoryRecordStore {
    db: Arc<MemoryDatabase>,
    schema: Arc<ModelSchema>,
}

impl MemoryRecordStore {
    fn label(&self) -> String {
        self.schema.label()
    }
}

impl RecordStore for MemoryRecordStore {
    fn schema(&self) -> Arc<ModelSchema> {
        self.schema.clone()
    }

    fn count(&self, query: &RecordQuery) -> anyhow::Result<u64> {
        Ok(u64::try_from(self.db.query(&self.label(), query)?.len())?)
    }

    fn fetch(&self, query: &RecordQuery, offset: u64, limit: u64) -> anyhow::Result<Vec<Record>> {
        Ok(self
            .db
            .query(&self.label(), query)?
            .into_iter()
            .skip(usize::try_from(offset)?)
            .take(usize::try_from(limit)?)
            .collect())
    }

    fn get(&self, pk: &Value) -> anyhow::Result<Option<Record>> {
        Ok(self.db.get(&self.label(), pk))
    }

    fn insert(&self, record: NewRecord) -> anyhow::Result<Record> {
        self.db.insert(&self.label(), record)
    }
}

//! Tree operations and per-node permissions over the in-memory store.

use std::sync::Arc;

use anyhow::bail;

use super::auth::{GrantKind, NodeGrants};
use super::storage::memory::Placement;
use super::storage::MemoryDatabase;
use crate::contract::model::{NewRecord, Record, User};
use crate::domain::ports::{AttachmentPoint, HierarchicalStore, NodePermissions, SiblingPosition};
use crate::domain::schema::ModelSchema;

pub struct MemoryTree {
    db: Arc<MemoryDatabase>,
    schema: Arc<ModelSchema>,
    grants: NodeGrants,
}

impl MemoryTree {
    pub fn new(db: Arc<MemoryDatabase>, label: &str, grants: NodeGrants) -> anyhow::Result<Self> {
        let schema = db.schema(label)?;
        if !schema.is_hierarchical {
            bail!("{label} is not stored in a tree");
        }
        Ok(Self { db, schema, grants })
    }

    fn label(&self) -> String {
        self.schema.label()
    }
}

impl HierarchicalStore for MemoryTree {
    fn valid_attachment_points(
        &self,
        schema: &ModelSchema,
        user: &User,
    ) -> anyhow::Result<Vec<AttachmentPoint>> {
        if schema.label() != self.label() || !user.is_active {
            return Ok(Vec::new());
        }
        let mut points = Vec::new();
        if user.is_superuser || self.grants.has_tree_wide(&user.username, GrantKind::Add) {
            points.push(AttachmentPoint::Root);
        }
        for record in self.db.tree_records(&self.label()) {
            if self.permissions_for(user, &record)?.can_add_subpage {
                points.push(AttachmentPoint::Node(record));
            }
        }
        Ok(points)
    }

    fn parent_of(&self, node: &Record) -> anyhow::Result<Option<Record>> {
        Ok(node
            .node
            .as_ref()
            .and_then(|n| n.parent.as_ref())
            .and_then(|pk| self.db.get(&self.label(), pk)))
    }

    fn permissions_for(&self, user: &User, node: &Record) -> anyhow::Result<NodePermissions> {
        if !user.is_active {
            return Ok(NodePermissions::default());
        }
        if user.is_superuser {
            return Ok(NodePermissions {
                can_add_subpage: true,
                can_edit: true,
                can_delete: true,
                can_unpublish: true,
                can_publish_subpage: true,
            });
        }
        let lineage = self.db.lineage(&self.label(), &node.pk);
        let kinds = self.grants.kinds_for(&user.username, &lineage);
        let edit = kinds.contains(&GrantKind::Edit);
        let publish = kinds.contains(&GrantKind::Publish);
        Ok(NodePermissions {
            can_add_subpage: kinds.contains(&GrantKind::Add),
            can_edit: edit,
            // unpublished drafts may be removed by their editors
            can_delete: publish || (edit && !node.is_live()),
            can_unpublish: publish,
            can_publish_subpage: publish,
        })
    }

    fn attach_as_root(&self, record: NewRecord) -> anyhow::Result<Record> {
        self.db.attach(&self.label(), record, Placement::Root)
    }

    fn attach_as_child(&self, parent: &Record, record: NewRecord) -> anyhow::Result<Record> {
        self.db.attach(&self.label(), record, Placement::Child(&parent.pk))
    }

    fn attach_as_sibling(
        &self,
        sibling: &Record,
        record: NewRecord,
        pos: SiblingPosition,
    ) -> anyhow::Result<Record> {
        self.db
            .attach(&self.label(), record, Placement::Sibling(&sibling.pk, pos))
    }
}

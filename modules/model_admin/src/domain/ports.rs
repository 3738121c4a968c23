//! Outbound ports to the permission system and the tree store.

use crate::contract::model::{NewRecord, Record, User};
use crate::domain::schema::ModelSchema;

pub trait PermissionSystem: Send + Sync {
    /// `code` is `app_label.codename`, e.g. `blog.change_article`.
    fn user_has_permission(&self, user: &User, code: &str) -> bool;

    /// Whether `code` is defined at all, independent of any user.
    fn permission_exists(&self, _code: &str) -> bool {
        false
    }
}

/// Per-node capabilities of one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodePermissions {
    pub can_add_subpage: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_unpublish: bool,
    pub can_publish_subpage: bool,
}

impl NodePermissions {
    pub fn any(&self) -> bool {
        self.can_add_subpage
            || self.can_edit
            || self.can_delete
            || self.can_unpublish
            || self.can_publish_subpage
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentPoint {
    Root,
    Node(Record),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiblingPosition {
    Left,
    Right,
    Last,
}

pub trait HierarchicalStore: Send + Sync {
    /// Places under which `user` may create a record of this type.
    fn valid_attachment_points(
        &self,
        schema: &ModelSchema,
        user: &User,
    ) -> anyhow::Result<Vec<AttachmentPoint>>;

    fn parent_of(&self, node: &Record) -> anyhow::Result<Option<Record>>;

    fn permissions_for(&self, user: &User, node: &Record) -> anyhow::Result<NodePermissions>;

    fn attach_as_root(&self, record: NewRecord) -> anyhow::Result<Record>;

    fn attach_as_child(&self, parent: &Record, record: NewRecord) -> anyhow::Result<Record>;

    fn attach_as_sibling(
        &self,
        sibling: &Record,
        record: NewRecord,
        pos: SiblingPosition,
    ) -> anyhow::Result<Record>;
}

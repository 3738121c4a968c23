//! Which actions a user may take on a record type and on single records.

use std::sync::Arc;

use tracing::warn;

use crate::contract::model::{Record, User};
use crate::domain::error::DomainError;
use crate::domain::ports::{AttachmentPoint, HierarchicalStore, NodePermissions, PermissionSystem};
use crate::domain::schema::ModelSchema;

pub trait PermissionPolicy: Send + Sync {
    fn has_list_permission(&self, user: &User) -> bool;
    fn has_add_permission(&self, user: &User) -> bool;
    fn can_edit(&self, user: &User, record: &Record) -> bool;
    fn can_delete(&self, user: &User, record: &Record) -> bool;
    fn can_unpublish(&self, user: &User, record: &Record) -> bool;
    fn can_copy(&self, user: &User, record: &Record) -> bool;
    fn can_inspect(&self, user: &User, record: &Record) -> bool;

    /// Whether a new record may be placed directly under `record`.
    fn can_add_child(&self, user: &User, _record: &Record) -> bool {
        self.has_add_permission(user)
    }

    /// Whether a new record may be placed next to `record`.
    fn can_add_sibling(&self, user: &User, _record: &Record) -> bool {
        self.has_add_permission(user)
    }
}

fn codename(schema: &ModelSchema, action: &str) -> String {
    format!("{}.{action}_{}", schema.app_label, schema.model_name)
}

/// The add, change and delete codes of one model.
struct ModelCodes {
    add: String,
    change: String,
    delete: String,
}

impl ModelCodes {
    fn new(schema: &ModelSchema) -> Self {
        Self {
            add: codename(schema, "add"),
            change: codename(schema, "change"),
            delete: codename(schema, "delete"),
        }
    }

    fn any_held(&self, perms: &dyn PermissionSystem, user: &User) -> bool {
        [&self.add, &self.change, &self.delete]
            .into_iter()
            .any(|code| perms.user_has_permission(user, code))
    }
}

/// Model-wide permissions from the permission system.
pub struct FlatPolicy {
    perms: Arc<dyn PermissionSystem>,
    codes: ModelCodes,
    inspect_enabled: bool,
}

impl FlatPolicy {
    pub fn new(schema: &ModelSchema, perms: Arc<dyn PermissionSystem>, inspect_enabled: bool) -> Self {
        Self {
            perms,
            codes: ModelCodes::new(schema),
            inspect_enabled,
        }
    }

    fn has_any(&self, user: &User) -> bool {
        self.codes.any_held(self.perms.as_ref(), user)
    }
}

impl PermissionPolicy for FlatPolicy {
    fn has_list_permission(&self, user: &User) -> bool {
        self.has_any(user)
    }

    fn has_add_permission(&self, user: &User) -> bool {
        self.perms.user_has_permission(user, &self.codes.add)
    }

    fn can_edit(&self, user: &User, _record: &Record) -> bool {
        self.perms.user_has_permission(user, &self.codes.change)
    }

    fn can_delete(&self, user: &User, _record: &Record) -> bool {
        self.perms.user_has_permission(user, &self.codes.delete)
    }

    fn can_unpublish(&self, _user: &User, _record: &Record) -> bool {
        false
    }

    fn can_copy(&self, _user: &User, _record: &Record) -> bool {
        false
    }

    fn can_inspect(&self, user: &User, _record: &Record) -> bool {
        self.inspect_enabled && self.has_any(user)
    }
}

/// Per-node permissions from the tree store. Inspect stays model-wide,
/// like the flat policy.
pub struct HierarchicalPolicy {
    schema: Arc<ModelSchema>,
    tree: Arc<dyn HierarchicalStore>,
    perms: Arc<dyn PermissionSystem>,
    codes: ModelCodes,
    inspect_enabled: bool,
}

impl HierarchicalPolicy {
    pub fn new(
        schema: Arc<ModelSchema>,
        tree: Arc<dyn HierarchicalStore>,
        perms: Arc<dyn PermissionSystem>,
        inspect_enabled: bool,
    ) -> Self {
        Self {
            codes: ModelCodes::new(&schema),
            schema,
            tree,
            perms,
            inspect_enabled,
        }
    }

    /// Store failures deny the action.
    fn node_perms(&self, user: &User, record: &Record) -> NodePermissions {
        self.tree.permissions_for(user, record).unwrap_or_else(|e| {
            warn!(model = %self.schema.label(), pk = %record.pk, error = %e, "node permission lookup failed");
            NodePermissions::default()
        })
    }

    fn parent(&self, record: &Record) -> Option<Record> {
        self.tree.parent_of(record).unwrap_or_else(|e| {
            warn!(model = %self.schema.label(), pk = %record.pk, error = %e, "parent lookup failed");
            None
        })
    }

    fn attachment_points(&self, user: &User) -> Vec<AttachmentPoint> {
        self.tree
            .valid_attachment_points(&self.schema, user)
            .unwrap_or_else(|e| {
                warn!(model = %self.schema.label(), error = %e, "attachment point lookup failed");
                Vec::new()
            })
    }
}

impl PermissionPolicy for HierarchicalPolicy {
    fn has_list_permission(&self, _user: &User) -> bool {
        true
    }

    fn has_add_permission(&self, user: &User) -> bool {
        !self.attachment_points(user).is_empty()
    }

    fn can_edit(&self, user: &User, record: &Record) -> bool {
        self.node_perms(user, record).can_edit
    }

    fn can_delete(&self, user: &User, record: &Record) -> bool {
        !record.has_children() && self.node_perms(user, record).can_delete
    }

    fn can_unpublish(&self, user: &User, record: &Record) -> bool {
        record.is_live() && self.node_perms(user, record).can_unpublish
    }

    fn can_copy(&self, user: &User, record: &Record) -> bool {
        self.parent(record)
            .is_some_and(|parent| self.node_perms(user, &parent).can_publish_subpage)
    }

    fn can_inspect(&self, user: &User, _record: &Record) -> bool {
        self.inspect_enabled && self.codes.any_held(self.perms.as_ref(), user)
    }

    fn can_add_child(&self, user: &User, record: &Record) -> bool {
        self.node_perms(user, record).can_add_subpage
    }

    fn can_add_sibling(&self, user: &User, record: &Record) -> bool {
        match self.parent(record) {
            Some(parent) => self.node_perms(user, &parent).can_add_subpage,
            None => self
                .attachment_points(user)
                .contains(&AttachmentPoint::Root),
        }
    }
}

/// Wraps another policy and removes every mutating action. Inspect is always
/// available to anyone who may list.
pub struct ReadOnlyPolicy {
    inner: Arc<dyn PermissionPolicy>,
    perms: Arc<dyn PermissionSystem>,
    list_code: String,
}

impl ReadOnlyPolicy {
    pub fn new(
        schema: &ModelSchema,
        inner: Arc<dyn PermissionPolicy>,
        perms: Arc<dyn PermissionSystem>,
    ) -> Self {
        Self {
            inner,
            perms,
            list_code: codename(schema, "list"),
        }
    }
}

impl PermissionPolicy for ReadOnlyPolicy {
    fn has_list_permission(&self, user: &User) -> bool {
        if self.perms.permission_exists(&self.list_code) {
            self.perms.user_has_permission(user, &self.list_code)
        } else {
            self.inner.has_list_permission(user)
        }
    }

    fn has_add_permission(&self, _user: &User) -> bool {
        false
    }

    fn can_edit(&self, _user: &User, _record: &Record) -> bool {
        false
    }

    fn can_delete(&self, _user: &User, _record: &Record) -> bool {
        false
    }

    fn can_unpublish(&self, _user: &User, _record: &Record) -> bool {
        false
    }

    fn can_copy(&self, _user: &User, _record: &Record) -> bool {
        false
    }

    fn can_inspect(&self, user: &User, _record: &Record) -> bool {
        self.has_list_permission(user)
    }
}

/// Select the policy for a schema at configuration time.
pub fn policy_for(
    schema: &Arc<ModelSchema>,
    perms: Arc<dyn PermissionSystem>,
    tree: Option<Arc<dyn HierarchicalStore>>,
    inspect_enabled: bool,
    read_only: bool,
) -> Result<Arc<dyn PermissionPolicy>, DomainError> {
    let base: Arc<dyn PermissionPolicy> = if schema.is_hierarchical {
        let tree = tree.ok_or_else(|| {
            DomainError::configuration(format!(
                "{} is hierarchical but no tree store was provided",
                schema.label()
            ))
        })?;
        Arc::new(HierarchicalPolicy::new(schema.clone(), tree, perms.clone(), inspect_enabled))
    } else {
        Arc::new(FlatPolicy::new(schema, perms.clone(), inspect_enabled))
    };
    if read_only {
        Ok(Arc::new(ReadOnlyPolicy::new(schema, base, perms)))
    } else {
        Ok(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use listing_core::ast::Value;
    use std::collections::{BTreeMap, HashSet};

    struct Codes(HashSet<&'static str>);

    impl PermissionSystem for Codes {
        fn user_has_permission(&self, user: &User, code: &str) -> bool {
            user.is_active && (user.is_superuser || self.0.contains(code))
        }

        fn permission_exists(&self, code: &str) -> bool {
            code.ends_with("list_article")
        }
    }

    fn record() -> Record {
        Record {
            pk: Value::Int(1),
            fields: BTreeMap::new(),
            node: None,
        }
    }

    fn schema() -> ModelSchema {
        ModelSchema::new("blog", "article")
    }

    #[test]
    fn flat_policy_uses_model_codes() {
        let perms = Arc::new(Codes(["blog.change_article"].into()));
        let policy = FlatPolicy::new(&schema(), perms, true);
        let user = User::new("ed");
        assert!(policy.has_list_permission(&user));
        assert!(!policy.has_add_permission(&user));
        assert!(policy.can_edit(&user, &record()));
        assert!(!policy.can_delete(&user, &record()));
        assert!(!policy.can_copy(&user, &record()));
        assert!(!policy.can_unpublish(&user, &record()));
        assert!(policy.can_inspect(&user, &record()));
    }

    #[test]
    fn flat_inspect_needs_enabled_view() {
        let perms = Arc::new(Codes(["blog.add_article"].into()));
        let policy = FlatPolicy::new(&schema(), perms, false);
        assert!(!policy.can_inspect(&User::new("ed"), &record()));
    }

    #[test]
    fn inactive_users_get_nothing() {
        let perms = Arc::new(Codes(HashSet::new()));
        let policy = FlatPolicy::new(&schema(), perms, true);
        let user = User::superuser("root").deactivated();
        assert!(!policy.has_list_permission(&user));
    }

    #[test]
    fn read_only_blocks_mutations_and_prefers_list_code() {
        let perms: Arc<dyn PermissionSystem> = Arc::new(Codes(["blog.list_article"].into()));
        let inner: Arc<dyn PermissionPolicy> = Arc::new(FlatPolicy::new(&schema(), perms.clone(), false));
        let policy = ReadOnlyPolicy::new(&schema(), inner, perms);
        let viewer = User::new("viewer");
        assert!(policy.has_list_permission(&viewer));
        assert!(policy.can_inspect(&viewer, &record()));

        let root = User::superuser("root");
        assert!(!policy.has_add_permission(&root));
        assert!(!policy.can_edit(&root, &record()));
        assert!(!policy.can_delete(&root, &record()));
    }

    /// Grants every node capability to every user.
    struct OpenTree;

    impl HierarchicalStore for OpenTree {
        fn valid_attachment_points(
            &self,
            _schema: &ModelSchema,
            _user: &User,
        ) -> anyhow::Result<Vec<AttachmentPoint>> {
            Ok(vec![AttachmentPoint::Root])
        }

        fn parent_of(&self, _node: &Record) -> anyhow::Result<Option<Record>> {
            Ok(None)
        }

        fn permissions_for(&self, _user: &User, _node: &Record) -> anyhow::Result<NodePermissions> {
            Ok(NodePermissions {
                can_add_subpage: true,
                can_edit: true,
                can_delete: true,
                can_unpublish: true,
                can_publish_subpage: true,
            })
        }

        fn attach_as_root(&self, _record: crate::contract::model::NewRecord) -> anyhow::Result<Record> {
            anyhow::bail!("read only")
        }

        fn attach_as_child(
            &self,
            _parent: &Record,
            _record: crate::contract::model::NewRecord,
        ) -> anyhow::Result<Record> {
            anyhow::bail!("read only")
        }

        fn attach_as_sibling(
            &self,
            _sibling: &Record,
            _record: crate::contract::model::NewRecord,
            _pos: crate::domain::ports::SiblingPosition,
        ) -> anyhow::Result<Record> {
            anyhow::bail!("read only")
        }
    }

    #[test]
    fn hierarchical_inspect_follows_model_codes_not_node_grants() {
        let schema = Arc::new(ModelSchema::new("site", "page").hierarchical());
        let user = User::new("ed");

        let no_codes = Arc::new(Codes(HashSet::new()));
        let policy = HierarchicalPolicy::new(schema.clone(), Arc::new(OpenTree), no_codes, true);
        assert!(policy.can_edit(&user, &record()));
        assert!(!policy.can_inspect(&user, &record()));

        let change = Arc::new(Codes(["site.change_page"].into()));
        let policy = HierarchicalPolicy::new(schema.clone(), Arc::new(OpenTree), change.clone(), true);
        assert!(policy.can_inspect(&user, &record()));

        let disabled = HierarchicalPolicy::new(schema, Arc::new(OpenTree), change, false);
        assert!(!disabled.can_inspect(&user, &record()));
    }

    #[test]
    fn hierarchical_schema_requires_tree() {
        let schema = Arc::new(ModelSchema::new("site", "page").hierarchical());
        let perms = Arc::new(Codes(HashSet::new()));
        assert!(matches!(
            policy_for(&schema, perms, None, false, false),
            Err(DomainError::Configuration { .. })
        ));
    }
}

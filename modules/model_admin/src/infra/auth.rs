//! Static permission sources for embedding and tests.

use std::collections::{HashMap, HashSet};

use listing_core::ast::Value;

use crate::contract::model::User;
use crate::domain::ports::PermissionSystem;

/// Model-wide permission codes granted per username.
///
/// Active superusers hold every code; inactive users hold none.
#[derive(Debug, Clone, Default)]
pub struct StaticPermissions {
    grants: HashMap<String, HashSet<String>>,
    known: HashSet<String>,
}

impl StaticPermissions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `code` (e.g. `blog.add_article`) to `username`.
    #[must_use]
    pub fn grant(mut self, username: &str, code: &str) -> Self {
        self.known.insert(code.to_owned());
        self.grants
            .entry(username.to_owned())
            .or_default()
            .insert(code.to_owned());
        self
    }

    /// Declare a code that exists without granting it to anyone.
    #[must_use]
    pub fn define(mut self, code: &str) -> Self {
        self.known.insert(code.to_owned());
        self
    }
}

impl PermissionSystem for StaticPermissions {
    fn user_has_permission(&self, user: &User, code: &str) -> bool {
        if !user.is_active {
            return false;
        }
        user.is_superuser
            || self
                .grants
                .get(&user.username)
                .is_some_and(|codes| codes.contains(code))
    }

    fn permission_exists(&self, code: &str) -> bool {
        self.known.contains(code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrantKind {
    Add,
    Edit,
    Publish,
}

/// Per-node grants for tree-backed types. A grant on a node covers its
/// whole subtree; a grant with no node covers the entire tree.
#[derive(Debug, Clone, Default)]
pub struct NodeGrants {
    grants: HashMap<String, Vec<(Option<Value>, GrantKind)>>,
}

impl NodeGrants {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn grant(mut self, username: &str, scope: Option<Value>, kind: GrantKind) -> Self {
        self.grants
            .entry(username.to_owned())
            .or_default()
            .push((scope, kind));
        self
    }

    /// Kinds held over a node whose lineage (self first) is `lineage`.
    pub fn kinds_for(&self, username: &str, lineage: &[Value]) -> HashSet<GrantKind> {
        self.grants
            .get(username)
            .into_iter()
            .flatten()
            .filter(|(scope, _)| scope.as_ref().map_or(true, |pk| lineage.contains(pk)))
            .map(|(_, kind)| *kind)
            .collect()
    }

    pub fn has_tree_wide(&self, username: &str, kind: GrantKind) -> bool {
        self.grants
            .get(username)
            .is_some_and(|g| g.iter().any(|(scope, k)| scope.is_none() && *k == kind))
    }
}

/// Users known to the server, looked up by username.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: HashMap<String, User>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, user: User) -> Self {
        self.users.insert(user.username.clone(), user);
        self
    }

    pub fn get(&self, username: &str) -> Option<&User> {
        self.users.get(username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn superuser_and_inactive_users() {
        let perms = StaticPermissions::new().grant("ed", "blog.add_article");
        assert!(perms.user_has_permission(&User::superuser("root"), "anything.at_all"));
        assert!(perms.user_has_permission(&User::new("ed"), "blog.add_article"));
        assert!(!perms.user_has_permission(&User::new("ed"), "blog.delete_article"));
        assert!(!perms.user_has_permission(&User::new("ed").deactivated(), "blog.add_article"));
        assert!(!perms.user_has_permission(&User::superuser("root").deactivated(), "x.y"));
    }

    #[test]
    fn known_codes() {
        let perms = StaticPermissions::new()
            .define("blog.list_article")
            .grant("ed", "blog.add_article");
        assert!(perms.permission_exists("blog.list_article"));
        assert!(perms.permission_exists("blog.add_article"));
        assert!(!perms.permission_exists("blog.change_article"));
    }

    #[test]
    fn node_grants_cover_subtrees() {
        let grants = NodeGrants::new()
            .grant("ed", Some(Value::Int(2)), GrantKind::Edit)
            .grant("ed", None, GrantKind::Add);
        let under_two = [Value::Int(5), Value::Int(2), Value::Int(1)];
        let elsewhere = [Value::Int(3), Value::Int(1)];
        assert_eq!(
            grants.kinds_for("ed", &under_two),
            HashSet::from([GrantKind::Edit, GrantKind::Add])
        );
        assert_eq!(grants.kinds_for("ed", &elsewhere), HashSet::from([GrantKind::Add]));
        assert!(grants.has_tree_wide("ed", GrantKind::Add));
        assert!(!grants.has_tree_wide("ed", GrantKind::Edit));
        assert!(grants.kinds_for("nobody", &under_two).is_empty());
    }
}

use std::collections::BTreeMap;

use listing_core::ast::Value;
use listing_core::{PageInfo, SortDir};

/// The acting user as the permission model sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub is_active: bool,
    pub is_superuser: bool,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            is_active: true,
            is_superuser: false,
        }
    }

    pub fn superuser(username: impl Into<String>) -> Self {
        Self {
            is_superuser: true,
            ..Self::new(username)
        }
    }

    #[must_use]
    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }
}

/// Position and publication state of a record stored in a tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TreeNode {
    pub parent: Option<Value>,
    /// Roots have depth 1.
    pub depth: u32,
    pub numchild: u32,
    pub live: bool,
    pub has_unpublished_changes: bool,
    /// Public URL; `None` when the node is not reachable through any site.
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub pk: Value,
    pub fields: BTreeMap<String, Value>,
    pub node: Option<TreeNode>,
}

impl Record {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn has_children(&self) -> bool {
        self.node.as_ref().is_some_and(|n| n.numchild > 0)
    }

    pub fn is_live(&self) -> bool {
        self.node.as_ref().is_some_and(|n| n.live)
    }
}

/// Data for creating a record. Tree-backed types also take the publication
/// flags; flat types ignore them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewRecord {
    pub fields: BTreeMap<String, Value>,
    pub live: bool,
    pub has_unpublished_changes: bool,
    pub url: Option<String>,
}

impl NewRecord {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    #[must_use]
    pub fn published(mut self, url: Option<String>) -> Self {
        self.live = true;
        self.url = url;
        self
    }

    #[must_use]
    pub fn with_draft_changes(mut self) -> Self {
        self.has_unpublished_changes = true;
        self
    }
}

/// Presentation-ready description of one action link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionButton {
    pub url: String,
    pub label: String,
    pub classname: Vec<String>,
    pub title: String,
    pub target: Option<String>,
    pub disabled: bool,
}

impl ActionButton {
    pub fn class_attr(&self) -> String {
        self.classname.join(" ")
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classname.iter().any(|c| c == class)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnHeader {
    pub name: String,
    pub label: String,
    pub sortable: bool,
    pub sorted: Option<SortDir>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSummary {
    pub title: String,
    /// Parameters this filter consumed from the request.
    pub used_parameters: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub pk: Value,
    pub values: Vec<Value>,
    pub buttons: Vec<ActionButton>,
    pub status_button: Option<ActionButton>,
    pub tree_buttons: Vec<ActionButton>,
}

/// One page of a result list together with everything needed to render it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeList {
    pub model: String,
    pub verbose_name_plural: String,
    pub columns: Vec<ColumnHeader>,
    pub rows: Vec<ResultRow>,
    pub page: PageInfo,
    /// Matches after filters and search.
    pub result_count: u64,
    /// Unfiltered total; absent when full counts are disabled.
    pub full_result_count: Option<u64>,
    pub search_term: String,
    pub has_filters: bool,
    pub filters: Vec<FilterSummary>,
    pub ordering: Vec<String>,
    pub add_button: Option<ActionButton>,
}

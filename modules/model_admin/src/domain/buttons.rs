//! Action buttons for result-list rows and the list header.

use listing_core::ast::Value;

use crate::contract::model::{ActionButton, Record, User};
use crate::domain::permissions::PermissionPolicy;
use crate::domain::schema::ModelSchema;
use crate::domain::urls::AdminUrlHelper;

const DEFAULT_CLASSNAMES: &[&str] = &["button"];
const ADD_CLASSNAMES: &[&str] = &["bicolor", "icon", "icon-plus"];
const DELETE_CLASSNAMES: &[&str] = &["no"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonKind {
    Inspect,
    Edit,
    Copy,
    Unpublish,
    Delete,
}

impl ButtonKind {
    pub fn action(self) -> &'static str {
        match self {
            ButtonKind::Inspect => "inspect",
            ButtonKind::Edit => "edit",
            ButtonKind::Copy => "copy",
            ButtonKind::Unpublish => "unpublish",
            ButtonKind::Delete => "delete",
        }
    }

    fn label(self) -> &'static str {
        match self {
            ButtonKind::Inspect => "Inspect",
            ButtonKind::Edit => "Edit",
            ButtonKind::Copy => "Copy",
            ButtonKind::Unpublish => "Unpublish",
            ButtonKind::Delete => "Delete",
        }
    }

    fn classnames(self) -> &'static [&'static str] {
        match self {
            ButtonKind::Delete => DELETE_CLASSNAMES,
            _ => &[],
        }
    }
}

/// `button` + action classes + additions, minus exclusions. Each class
/// appears once, at its first position.
pub fn finalise_classname(action: &[&str], add: &[&str], exclude: &[&str]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for c in DEFAULT_CLASSNAMES.iter().chain(action).chain(add) {
        if !exclude.contains(c) && !out.iter().any(|seen| seen == c) {
            out.push((*c).to_owned());
        }
    }
    out
}

pub struct ButtonHelper<'a> {
    schema: &'a ModelSchema,
    policy: &'a dyn PermissionPolicy,
    urls: &'a AdminUrlHelper,
}

impl<'a> ButtonHelper<'a> {
    pub fn new(
        schema: &'a ModelSchema,
        policy: &'a dyn PermissionPolicy,
        urls: &'a AdminUrlHelper,
    ) -> Self {
        Self {
            schema,
            policy,
            urls,
        }
    }

    fn model_name(&self) -> &str {
        &self.schema.verbose_name
    }

    pub fn show_add_button(&self, user: &User) -> bool {
        self.policy.has_add_permission(user)
    }

    pub fn add_button(&self, add: &[&str], exclude: &[&str]) -> ActionButton {
        let url = if self.schema.is_hierarchical {
            self.urls.choose_parent_url()
        } else {
            self.urls.create_url()
        };
        ActionButton {
            url,
            label: format!("Add {}", self.model_name()),
            classname: finalise_classname(ADD_CLASSNAMES, add, exclude),
            title: format!("Add a new {}", self.model_name()),
            target: None,
            disabled: false,
        }
    }

    pub fn button(&self, kind: ButtonKind, pk: &Value, add: &[&str], exclude: &[&str]) -> ActionButton {
        let title = match kind {
            ButtonKind::Inspect => format!("View details for this {}", self.model_name()),
            other => format!("{} this {}", other.label(), self.model_name()),
        };
        ActionButton {
            url: self.urls.action_url(kind.action(), pk),
            label: kind.label().to_owned(),
            classname: finalise_classname(kind.classnames(), add, exclude),
            title,
            target: None,
            disabled: false,
        }
    }

    fn permitted(&self, kind: ButtonKind, user: &User, record: &Record) -> bool {
        match kind {
            ButtonKind::Inspect => self.policy.can_inspect(user, record),
            ButtonKind::Edit => self.policy.can_edit(user, record),
            ButtonKind::Copy => self.policy.can_copy(user, record),
            ButtonKind::Unpublish => self.policy.can_unpublish(user, record),
            ButtonKind::Delete => self.policy.can_delete(user, record),
        }
    }

    /// Buttons in inspect, edit, copy, unpublish, delete order. Copy and
    /// unpublish only exist for tree-backed types.
    pub fn buttons_for(
        &self,
        user: &User,
        record: &Record,
        exclude: &[ButtonKind],
        classnames_add: &[&str],
        classnames_exclude: &[&str],
    ) -> Vec<ActionButton> {
        let kinds: &[ButtonKind] = if self.schema.is_hierarchical {
            &[
                ButtonKind::Inspect,
                ButtonKind::Edit,
                ButtonKind::Copy,
                ButtonKind::Unpublish,
                ButtonKind::Delete,
            ]
        } else {
            &[ButtonKind::Inspect, ButtonKind::Edit, ButtonKind::Delete]
        };
        kinds
            .iter()
            .filter(|k| !exclude.contains(*k))
            .filter(|k| self.permitted(**k, user, record))
            .map(|k| self.button(*k, &record.pk, classnames_add, classnames_exclude))
            .collect()
    }

    /// Publication state of a tree-backed record.
    pub fn status_button(&self, record: &Record) -> Option<ActionButton> {
        let node = record.node.as_ref()?;
        let name = self.model_name();
        let button = if !node.live {
            ActionButton {
                url: self.urls.view_draft_url(&record.pk),
                label: "Draft".to_owned(),
                classname: finalise_classname(&[], &[], &[]),
                title: format!("View draft for this {name}"),
                target: Some("_blank".to_owned()),
                disabled: false,
            }
        } else if let Some(url) = &node.url {
            ActionButton {
                url: url.clone(),
                label: "Live".to_owned(),
                classname: finalise_classname(&[], &[], &[]),
                title: format!("View live version of this {name}"),
                target: Some("_blank".to_owned()),
                disabled: false,
            }
        } else {
            ActionButton {
                url: String::new(),
                label: "Live".to_owned(),
                classname: finalise_classname(&[], &[], &[]),
                title: format!(
                    "This {name} is published but does not exist within a configured Site, so cannot be viewed."
                ),
                target: None,
                disabled: true,
            }
        };
        Some(button)
    }

    /// Insert-relative-to-this-record buttons for tree-backed types.
    pub fn tree_buttons(&self, user: &User, record: &Record) -> Vec<ActionButton> {
        if !self.schema.is_hierarchical {
            return Vec::new();
        }
        let name = self.model_name();
        let pk = &record.pk;
        let child = self.policy.can_add_child(user, record).then(|| ActionButton {
            url: self.urls.add_child_url(pk),
            label: "Add child".to_owned(),
            classname: finalise_classname(&["icon-plus"], &[], &[]),
            title: format!("Add a new {name} below this one"),
            target: None,
            disabled: false,
        });
        if !self.policy.can_add_sibling(user, record) {
            return child.into_iter().collect();
        }
        if !self.schema.node_order_by.is_empty() {
            let sibling = ActionButton {
                url: self.urls.add_sibling_url(pk, None),
                label: "Add sibling".to_owned(),
                classname: finalise_classname(&["icon-plus"], &[], &[]),
                title: format!("Add a new {name} at the same level as this one"),
                target: None,
                disabled: false,
            };
            return child.into_iter().chain(Some(sibling)).collect();
        }
        let before = ActionButton {
            url: self.urls.add_sibling_url(pk, Some("left")),
            label: "Add before".to_owned(),
            classname: finalise_classname(&["icon-arrow-up-big"], &[], &[]),
            title: format!("Add a new {name} before this one, at the same level"),
            target: None,
            disabled: false,
        };
        let after = ActionButton {
            url: self.urls.add_sibling_url(pk, Some("right")),
            label: "Add after".to_owned(),
            classname: finalise_classname(&["icon-arrow-down-big"], &[], &[]),
            title: format!("Add a new {name} after this one, at the same level"),
            target: None,
            disabled: false,
        };
        [Some(before), Some(after), child].into_iter().flatten().collect()
    }
}

use std::collections::BTreeMap;

use listing_core::ast::Value;
use listing_core::{PageInfo, SortDir};
use modkit::ListingParams;
use serde::{Deserialize, Deserializer, Serialize};

use crate::contract::client::TreeParams;
use crate::contract::model::{
    ActionButton, ChangeList, ColumnHeader, FilterSummary, NewRecord, Record, ResultRow, TreeNode,
};
use crate::domain::changelist::PAGE_VAR;
use crate::domain::error::DomainError;

/// REST DTO for a stored record
#[derive(Debug, Clone, Serialize)]
pub struct RecordDto {
    pub pk: Value,
    pub fields: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<TreeNodeDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TreeNodeDto {
    pub parent: Option<Value>,
    pub depth: u32,
    pub numchild: u32,
    pub live: bool,
    pub has_unpublished_changes: bool,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionButtonDto {
    pub url: String,
    pub label: String,
    pub classname: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnDto {
    pub name: String,
    pub label: String,
    pub sortable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sorted: Option<SortDir>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterDto {
    pub title: String,
    pub used_parameters: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultRowDto {
    pub pk: Value,
    pub values: Vec<Value>,
    pub buttons: Vec<ActionButtonDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_button: Option<ActionButtonDto>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tree_buttons: Vec<ActionButtonDto>,
}

/// REST DTO for one page of a result list
#[derive(Debug, Clone, Serialize)]
pub struct ChangeListDto {
    pub model: String,
    pub verbose_name_plural: String,
    pub columns: Vec<ColumnDto>,
    pub results: Vec<ResultRowDto>,
    pub page: PageInfo,
    pub result_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_result_count: Option<u64>,
    pub search_term: String,
    pub has_filters: bool,
    pub filters: Vec<FilterDto>,
    pub ordering: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_button: Option<ActionButtonDto>,
    /// Link to the previous page, keeping every other parameter.
    pub previous: Option<String>,
    pub next: Option<String>,
}

impl ChangeListDto {
    pub fn new(list: ChangeList, index_url: &str, params: &ListingParams) -> Self {
        let page_link = |idx: u64| {
            format!(
                "{index_url}{}",
                params.with(PAGE_VAR, idx.to_string()).to_query_string()
            )
        };
        Self {
            previous: list.page.previous_index().map(page_link),
            next: list.page.next_index().map(page_link),
            model: list.model,
            verbose_name_plural: list.verbose_name_plural,
            columns: list.columns.into_iter().map(ColumnDto::from).collect(),
            results: list.rows.into_iter().map(ResultRowDto::from).collect(),
            page: list.page,
            result_count: list.result_count,
            full_result_count: list.full_result_count,
            search_term: list.search_term,
            has_filters: list.has_filters,
            filters: list.filters.into_iter().map(FilterDto::from).collect(),
            ordering: list.ordering,
            add_button: list.add_button.map(ActionButtonDto::from),
        }
    }
}

/// REST DTO for creating a record. Tree-backed types accept the placement
/// parameters; flat types reject them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateRecordReq {
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,
    #[serde(default, deserialize_with = "id_param")]
    pub parent_id: Option<String>,
    #[serde(default, deserialize_with = "id_param")]
    pub sibling_id: Option<String>,
    #[serde(default)]
    pub pos: Option<String>,
    #[serde(default)]
    pub live: bool,
    #[serde(default)]
    pub url: Option<String>,
}

impl CreateRecordReq {
    pub fn into_parts(self) -> Result<(NewRecord, TreeParams), DomainError> {
        let mut record = NewRecord::new();
        for (name, raw) in self.fields {
            let value =
                json_to_value(raw).map_err(|message| DomainError::validation(&name, message))?;
            record.fields.insert(name, value);
        }
        record.live = self.live;
        record.url = self.url;
        let tree = TreeParams {
            parent_id: self.parent_id,
            sibling_id: self.sibling_id,
            pos: self.pos,
        };
        Ok((record, tree))
    }
}

/// Ids may arrive as JSON strings or numbers.
fn id_param<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) => Ok(Some(s)),
        serde_json::Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number id, got {other}"
        ))),
    }
}

/// JSON input to a field value; strings are coerced later against the
/// field's kind.
pub fn json_to_value(raw: serde_json::Value) -> Result<Value, String> {
    Ok(match raw {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Text(n.to_string()),
        },
        serde_json::Value::String(s) => Value::Text(s),
        serde_json::Value::Array(items) => Value::List(
            items
                .into_iter()
                .map(json_to_value)
                .collect::<Result<_, _>>()?,
        ),
        serde_json::Value::Object(_) => return Err("nested objects are not supported".into()),
    })
}

// Conversion implementations between REST DTOs and contract models

impl From<Record> for RecordDto {
    fn from(r: Record) -> Self {
        Self {
            pk: r.pk,
            fields: r.fields,
            node: r.node.map(TreeNodeDto::from),
        }
    }
}

impl From<TreeNode> for TreeNodeDto {
    fn from(n: TreeNode) -> Self {
        Self {
            parent: n.parent,
            depth: n.depth,
            numchild: n.numchild,
            live: n.live,
            has_unpublished_changes: n.has_unpublished_changes,
            url: n.url,
        }
    }
}

impl From<ActionButton> for ActionButtonDto {
    fn from(b: ActionButton) -> Self {
        Self {
            classname: b.class_attr(),
            url: b.url,
            label: b.label,
            title: b.title,
            target: b.target,
            disabled: b.disabled,
        }
    }
}

impl From<ColumnHeader> for ColumnDto {
    fn from(c: ColumnHeader) -> Self {
        Self {
            name: c.name,
            label: c.label,
            sortable: c.sortable,
            sorted: c.sorted,
        }
    }
}

impl From<FilterSummary> for FilterDto {
    fn from(f: FilterSummary) -> Self {
        Self {
            title: f.title,
            used_parameters: f.used_parameters,
        }
    }
}

impl From<ResultRow> for ResultRowDto {
    fn from(r: ResultRow) -> Self {
        Self {
            pk: r.pk,
            values: r.values,
            buttons: r.buttons.into_iter().map(ActionButtonDto::from).collect(),
            status_button: r.status_button.map(ActionButtonDto::from),
            tree_buttons: r.tree_buttons.into_iter().map(ActionButtonDto::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_request_accepts_numeric_ids() {
        let req: CreateRecordReq = serde_json::from_value(json!({
            "fields": {"title": "Hello", "tags": [1, 2]},
            "sibling_id": 4,
            "pos": "left"
        }))
        .unwrap();
        let (record, tree) = req.into_parts().unwrap();
        assert_eq!(tree.sibling_id.as_deref(), Some("4"));
        assert_eq!(tree.pos.as_deref(), Some("left"));
        assert_eq!(
            record.fields.get("tags"),
            Some(&Value::List(vec![Value::Int(1), Value::Int(2)]))
        );
    }

    #[test]
    fn nested_objects_are_rejected() {
        let req: CreateRecordReq =
            serde_json::from_value(json!({"fields": {"author": {"id": 1}}})).unwrap();
        assert!(matches!(
            req.into_parts(),
            Err(DomainError::Validation { field, .. }) if field == "author"
        ));
    }

    #[test]
    fn page_links_keep_other_params() {
        let list = ChangeList {
            model: "blog.article".into(),
            verbose_name_plural: "articles".into(),
            columns: Vec::new(),
            rows: Vec::new(),
            page: PageInfo::new(2, 10, 35),
            result_count: 35,
            full_result_count: None,
            search_term: "rust".into(),
            has_filters: false,
            filters: Vec::new(),
            ordering: Vec::new(),
            add_button: None,
        };
        let params = ListingParams::new(vec![
            ("q".into(), "rust".into()),
            ("p".into(), "1".into()),
        ]);
        let dto = ChangeListDto::new(list, "/admin/blog/article/", &params);
        assert_eq!(dto.previous.as_deref(), Some("/admin/blog/article/?q=rust&p=0"));
        assert_eq!(dto.next.as_deref(), Some("/admin/blog/article/?q=rust&p=2"));
    }
}

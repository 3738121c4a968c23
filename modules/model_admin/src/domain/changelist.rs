//! Request state of a result list and assembly of its rows.

use std::collections::BTreeMap;

use crate::contract::model::{ColumnHeader, Record, ResultRow, User};
use crate::domain::admin::ListColumn;
use crate::domain::buttons::ButtonHelper;
use crate::domain::ordering::OrderingOutcome;
use crate::domain::schema::ModelSchema;

pub const PAGE_VAR: &str = "p";
pub const SEARCH_VAR: &str = "q";
pub const ORDER_VAR: &str = "o";
pub const ERROR_FLAG: &str = "e";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryState {
    pub params: Vec<(String, String)>,
    /// Zero-based, as received. Unparsable values read as 0.
    pub page: u64,
    pub search_term: String,
    pub order: Option<String>,
    pub error_flag: bool,
    /// Everything else; repeated keys keep the last value.
    pub lookup_params: BTreeMap<String, String>,
}

impl QueryState {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut state = QueryState {
            params: pairs.to_vec(),
            ..QueryState::default()
        };
        for (key, value) in pairs {
            match key.as_str() {
                PAGE_VAR => state.page = value.trim().parse().unwrap_or(0),
                SEARCH_VAR => state.search_term = value.clone(),
                ORDER_VAR => state.order = Some(value.clone()),
                ERROR_FLAG => state.error_flag = true,
                _ => {
                    state.lookup_params.insert(key.clone(), value.clone());
                }
            }
        }
        state
    }
}

pub fn column_headers(
    schema: &ModelSchema,
    list_display: &[ListColumn],
    ordering: &OrderingOutcome,
) -> Vec<ColumnHeader> {
    list_display
        .iter()
        .enumerate()
        .map(|(i, col)| ColumnHeader {
            name: col.name.clone(),
            label: col.header(schema),
            sortable: col.ordering_field(schema).is_some(),
            sorted: ordering.columns.get(&i).copied(),
        })
        .collect()
}

pub fn result_row(
    schema: &ModelSchema,
    list_display: &[ListColumn],
    buttons: &ButtonHelper<'_>,
    user: &User,
    record: &Record,
) -> ResultRow {
    ResultRow {
        pk: record.pk.clone(),
        values: list_display.iter().map(|c| c.value(schema, record)).collect(),
        buttons: buttons.buttons_for(user, record, &[], &[], &[]),
        status_button: buttons.status_button(record),
        tree_buttons: buttons.tree_buttons(user, record),
    }
}

use std::collections::BTreeMap;

use listing_core::{OrderBy, OrderKey, SortDir};

use crate::domain::admin::ListColumn;
use crate::domain::schema::ModelSchema;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderingOutcome {
    pub ordering: OrderBy,
    /// Sort state per `list_display` index, for header rendering.
    pub columns: BTreeMap<usize, SortDir>,
}

/// Parse one `[-]index` token of the `o` parameter.
fn parse_column_token(token: &str) -> Option<(usize, bool)> {
    let (desc, idx) = match token.rfind('-') {
        Some(i) => (true, &token[i + 1..]),
        None => (false, token),
    };
    idx.parse().ok().map(|idx| (idx, desc))
}

/// Final ordering for a result list.
///
/// Starts from the admin ordering (or the schema default), replaced by the
/// `o` parameter when given, then extended with `query_order`. The pk is
/// appended descending unless some key already names it, so paging is
/// deterministic.
pub fn resolve_ordering(
    order_param: Option<&str>,
    admin_ordering: &OrderBy,
    list_display: &[ListColumn],
    query_order: &OrderBy,
    schema: &ModelSchema,
) -> OrderingOutcome {
    let default = if admin_ordering.is_empty() {
        &schema.ordering
    } else {
        admin_ordering
    };

    let mut ordering = default.clone();
    let mut columns = BTreeMap::new();

    if let Some(param) = order_param {
        ordering = OrderBy::empty();
        for token in param.split('.') {
            let Some((idx, desc)) = parse_column_token(token) else {
                continue;
            };
            let Some(field) = list_display.get(idx).and_then(|c| c.ordering_field(schema)) else {
                continue;
            };
            let Ok(mut key) = OrderKey::parse(&field) else {
                continue;
            };
            if desc {
                key.dir = key.dir.reverse();
            }
            ordering.push(key);
            columns.insert(idx, if desc { SortDir::Desc } else { SortDir::Asc });
        }
    } else {
        for key in default.keys() {
            let hit = list_display
                .iter()
                .position(|c| c.ordering_field(schema).as_deref() == Some(key.field.as_str()));
            if let Some(idx) = hit {
                columns.insert(idx, key.dir);
            }
        }
    }

    ordering.extend(query_order);

    let pk = schema.pk_field.as_str();
    let ordering = OrderBy(
        ordering
            .0
            .into_iter()
            .map(|mut k| {
                if k.field == "pk" {
                    k.field = pk.to_owned();
                }
                k
            })
            .collect(),
    )
    .ensure_tiebreaker(pk, SortDir::Desc);

    OrderingOutcome { ordering, columns }
}

#[cfg(test)]
#[allow(clippy::module_inception)]
mod tests {
    use crate::ast::{Expr, Lookup, LookupOp, Value};
    use crate::{split_lookup, Error, OrderBy, OrderKey, PageInfo, SortDir};

    #[test]
    fn test_lookup_from_param_strips_trailing_operator() {
        let l = Lookup::from_param("author__name__icontains", "ann").unwrap();
        assert_eq!(l.path, vec!["author", "name"]);
        assert_eq!(l.op, LookupOp::IContains);
        assert_eq!(l.value, Value::text("ann"));
        assert_eq!(l.key(), "author__name__icontains");
    }

    #[test]
    fn test_lookup_from_param_defaults_to_exact() {
        let l = Lookup::from_param("status", "published").unwrap();
        assert_eq!(l.path, vec!["status"]);
        assert_eq!(l.op, LookupOp::Exact);
    }

    #[test]
    fn test_lookup_from_param_keeps_operator_name_used_as_field() {
        // A bare key that happens to spell an operator is a field name.
        let l = Lookup::from_param("year", "2020").unwrap();
        assert_eq!(l.path, vec!["year"]);
        assert_eq!(l.op, LookupOp::Exact);
    }

    #[test]
    fn test_lookup_from_param_unknown_suffix_stays_in_path() {
        let l = Lookup::from_param("title__bogus", "x").unwrap();
        assert_eq!(l.path, vec!["title", "bogus"]);
        assert_eq!(l.op, LookupOp::Exact);
    }

    #[test]
    fn test_lookup_from_param_in_splits_on_comma() {
        let l = Lookup::from_param("id__in", "1,2,3").unwrap();
        assert_eq!(
            l.value,
            Value::List(vec![Value::text("1"), Value::text("2"), Value::text("3")])
        );
    }

    #[test]
    fn test_lookup_from_param_isnull_literals() {
        for (raw, expected) in [("", false), ("0", false), ("False", false), ("1", true), ("true", true)] {
            let l = Lookup::from_param("parent__isnull", raw).unwrap();
            assert_eq!(l.value, Value::Bool(expected), "raw={raw:?}");
        }
        let err = Lookup::from_param("parent__isnull", "maybe").unwrap_err();
        assert!(matches!(err, Error::InvalidValue { op: "isnull", .. }));
    }

    #[test]
    fn test_lookup_from_param_rejects_empty_segments() {
        assert_eq!(Lookup::from_param("title____exact", "x"), Err(Error::EmptyLookup));
        assert_eq!(Lookup::from_param("", "x"), Err(Error::EmptyLookup));
    }

    #[test]
    fn test_lookup_op_parse_round_trip_names() {
        for op in LookupOp::ALL {
            assert_eq!(LookupOp::parse(op.as_str()), Some(op));
        }
        assert_eq!(LookupOp::parse("ne"), None);
        assert!("between".parse::<LookupOp>().is_err());
    }

    #[test]
    fn test_expr_helpers_collapse_single_element() {
        let e = Expr::all_of([Expr::lookup("title", LookupOp::Exact, "a")]);
        assert!(matches!(e, Expr::Lookup(_)));

        let e = Expr::any_of([
            Expr::lookup("title", LookupOp::IContains, "a"),
            Expr::lookup("body", LookupOp::IContains, "a"),
        ]);
        assert_eq!(e.lookups().len(), 2);
        assert!(matches!(e, Expr::Or(ref xs) if xs.len() == 2));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(
            Value::List(vec![Value::Int(1), Value::text("b")]).to_string(),
            "1,b"
        );
    }

    #[test]
    fn test_value_serializes_untagged() {
        let json = serde_json::to_value(Value::List(vec![Value::Int(1), Value::Null])).unwrap();
        assert_eq!(json, serde_json::json!([1, null]));
    }

    #[test]
    fn test_split_lookup() {
        assert_eq!(split_lookup("a__b__c"), vec!["a", "b", "c"]);
        assert_eq!(split_lookup("a"), vec!["a"]);
    }

    #[test]
    fn test_order_key_parse() {
        assert_eq!(OrderKey::parse("-title").unwrap(), OrderKey::desc("title"));
        assert_eq!(OrderKey::parse("title").unwrap(), OrderKey::asc("title"));
        assert_eq!(OrderKey::parse("+title").unwrap(), OrderKey::asc("title"));
        assert!(OrderKey::parse("-").is_err());
        assert!(OrderKey::parse("--title").is_err());
    }

    #[test]
    fn test_ensure_tiebreaker_appends_when_missing() {
        let order = OrderBy(vec![OrderKey::asc("title")]).ensure_tiebreaker("id", SortDir::Desc);
        assert_eq!(order.to_tokens(), vec!["title", "-id"]);
    }

    #[test]
    fn test_ensure_tiebreaker_keeps_existing_direction() {
        let order = OrderBy(vec![OrderKey::asc("id"), OrderKey::desc("title")])
            .ensure_tiebreaker("id", SortDir::Desc);
        assert_eq!(order.to_tokens(), vec!["id", "-title"]);
    }

    #[test]
    fn test_page_info_clamps_and_flags() {
        let info = PageInfo::new(2, 10, 25);
        assert_eq!(info.num_pages, 3);
        assert!(info.has_previous);
        assert!(info.has_next);
        assert_eq!(info.offset(), 10);
        assert_eq!(info.previous_index(), Some(0));
        assert_eq!(info.next_index(), Some(2));

        let empty = PageInfo::new(1, 10, 0);
        assert_eq!(empty.num_pages, 1);
        assert!(!empty.has_previous);
        assert!(!empty.has_next);
        assert_eq!(empty.next_index(), None);
    }
}

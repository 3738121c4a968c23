//! Record creation, including placement in the page tree.

mod common;

use chrono::NaiveDate;
use common::{admin, blog, editor, pages, reviewer, ARTICLE, PAGE};
use listing_core::ast::Value;
use model_admin::client::TreeParams;
use model_admin::contract::model::NewRecord;
use model_admin::domain::error::DomainError;

fn page(title: &str) -> NewRecord {
    NewRecord::new().with("title", title)
}

fn sibling(pk: &Value, pos: Option<&str>) -> TreeParams {
    TreeParams {
        sibling_id: Some(pk.to_string()),
        pos: pos.map(str::to_owned),
        ..TreeParams::default()
    }
}

fn child_of(pk: &Value) -> TreeParams {
    TreeParams {
        parent_id: Some(pk.to_string()),
        ..TreeParams::default()
    }
}

#[test]
fn left_sibling_lands_immediately_before() {
    let fx = pages();
    let p = &fx.pages;
    let created = fx
        .service
        .create(&admin(), page("contact"), sibling(&p.about, Some("left")))
        .unwrap();
    assert_eq!(
        fx.db.traversal(PAGE),
        vec![p.home.clone(), created.pk.clone(), p.about.clone(), p.news.clone(), p.launch.clone()]
    );
    assert_eq!(created.node.map(|n| n.depth), Some(2));
}

#[test]
fn right_and_last_siblings() {
    let fx = pages();
    let p = &fx.pages;
    let right = fx
        .service
        .create(&admin(), page("team"), sibling(&p.about, Some("right")))
        .unwrap();
    let last = fx
        .service
        .create(&admin(), page("jobs"), sibling(&p.about, None))
        .unwrap();
    assert_eq!(
        fx.db.traversal(PAGE),
        vec![
            p.home.clone(),
            p.about.clone(),
            right.pk,
            p.news.clone(),
            p.launch.clone(),
            last.pk
        ]
    );
}

#[test]
fn no_tree_params_inserts_a_root() {
    let fx = pages();
    let blank = TreeParams {
        parent_id: Some(String::new()),
        ..TreeParams::default()
    };
    for params in [TreeParams::default(), blank] {
        let created = fx.service.create(&admin(), page("landing"), params).unwrap();
        let node = created.node.expect("tree node");
        assert_eq!(node.parent, None);
        assert_eq!(node.depth, 1);
    }
    let traversal = fx.db.traversal(PAGE);
    assert_eq!(traversal.len(), 6);
    assert_eq!(traversal[0], fx.pages.home);
}

#[test]
fn children_go_last_under_their_parent() {
    let fx = pages();
    let created = fx
        .service
        .create(&editor(), page("follow-up"), child_of(&fx.pages.news))
        .unwrap();
    let node = created.node.clone().unwrap();
    assert_eq!(node.parent, Some(fx.pages.news.clone()));
    assert_eq!(node.depth, 3);
    assert_eq!(fx.db.traversal(PAGE).last(), Some(&created.pk));
    let news = fx.db.get(PAGE, &fx.pages.news).unwrap();
    assert_eq!(news.node.map(|n| n.numchild), Some(2));
}

#[test]
fn placement_requires_add_rights_at_the_target() {
    let fx = pages();
    let p = &fx.pages;
    let err = fx
        .service
        .create(&editor(), page("x"), child_of(&p.home))
        .unwrap_err();
    assert_eq!(err, DomainError::PermissionDenied);

    let err = fx
        .service
        .create(&editor(), page("x"), sibling(&p.news, Some("left")))
        .unwrap_err();
    assert_eq!(err, DomainError::PermissionDenied);

    let err = fx
        .service
        .create(&editor(), page("x"), TreeParams::default())
        .unwrap_err();
    assert_eq!(err, DomainError::PermissionDenied);

    fx.service
        .create(&editor(), page("x"), sibling(&p.launch, Some("right")))
        .unwrap();
}

#[test]
fn bad_anchors() {
    let fx = pages();
    let err = fx
        .service
        .create(&admin(), page("x"), child_of(&Value::Int(999)))
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));

    let bad = TreeParams {
        parent_id: Some("abc".into()),
        ..TreeParams::default()
    };
    let err = fx.service.create(&admin(), page("x"), bad).unwrap_err();
    assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "parent_id"));

    let both = TreeParams {
        parent_id: Some("1".into()),
        sibling_id: Some("2".into()),
        pos: None,
    };
    assert!(matches!(
        fx.service.create(&admin(), page("x"), both),
        Err(DomainError::Validation { .. })
    ));

    let err = fx
        .service
        .create(&admin(), page("x"), sibling(&fx.pages.about, Some("above")))
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "pos"));
}

#[test]
fn flat_records_are_coerced_and_stored() {
    let fx = blog();
    let record = NewRecord::new()
        .with("title", "Fresh")
        .with("published", "2024-03-01")
        .with("author", "2")
        .with("tags", "3");
    let created = fx
        .service
        .create(&editor(), record, TreeParams::default())
        .unwrap();
    assert_eq!(created.pk, Value::Int(14));
    assert_eq!(
        created.get("published"),
        Some(&Value::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()))
    );
    assert_eq!(created.get("author"), Some(&Value::Int(2)));
    assert_eq!(created.get("tags"), Some(&Value::List(vec![Value::Int(3)])));
    assert!(created.node.is_none());
    assert_eq!(fx.db.get(ARTICLE, &created.pk), Some(created));
}

#[test]
fn flat_records_reject_bad_input() {
    let fx = blog();
    let missing_title = fx
        .service
        .create(&editor(), NewRecord::new().with("status", "draft"), TreeParams::default())
        .unwrap_err();
    assert!(matches!(missing_title, DomainError::Validation { ref field, .. } if field == "title"));

    let bad_date = NewRecord::new().with("title", "t").with("published", "yesterday");
    assert!(matches!(
        fx.service.create(&editor(), bad_date, TreeParams::default()),
        Err(DomainError::Validation { .. })
    ));

    let unknown = NewRecord::new().with("title", "t").with("colour", "red");
    assert!(matches!(
        fx.service.create(&editor(), unknown, TreeParams::default()),
        Err(DomainError::Validation { .. })
    ));

    let placed = fx
        .service
        .create(&editor(), NewRecord::new().with("title", "t"), child_of(&Value::Int(1)))
        .unwrap_err();
    assert!(matches!(placed, DomainError::Validation { .. }));

    let denied = fx
        .service
        .create(&reviewer(), NewRecord::new().with("title", "t"), TreeParams::default())
        .unwrap_err();
    assert_eq!(denied, DomainError::PermissionDenied);
}

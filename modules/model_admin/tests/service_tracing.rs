//! The service layer emits spans and events for each operation.

mod common;

use common::{admin, blog, editor, pages, params};
use model_admin::client::TreeParams;
use model_admin::contract::model::NewRecord;
use tracing_test::traced_test;

#[traced_test]
#[test]
fn list_emits_spans() {
    let fx = blog();
    let result = fx.service.list(&editor(), &params(&[("status", "draft")]));
    assert!(result.is_ok());
    assert!(logs_contain("model_admin.service.list"));
    assert!(logs_contain("query resolved"));
}

#[traced_test]
#[test]
fn escalated_lookup_errors_are_logged() {
    let fx = blog();
    let result = fx
        .service
        .list(&editor(), &params(&[("author__exact", "abc"), ("e", "1")]));
    assert!(result.is_err());
    assert!(logs_contain("incorrect lookup parameters on error redirect"));
}

#[traced_test]
#[test]
fn create_emits_spans() {
    let fx = pages();
    let result = fx.service.create(
        &admin(),
        NewRecord::new().with("title", "contact"),
        TreeParams::default(),
    );
    assert!(result.is_ok());
    assert!(logs_contain("model_admin.service.create"));
    assert!(logs_contain("Successfully created record"));
}

#[traced_test]
#[test]
fn inspect_emits_spans() {
    let fx = blog();
    let result = fx.service.inspect(&editor(), "13");
    assert!(result.is_err());
    assert!(logs_contain("model_admin.service.inspect"));
}

//! Shared fixtures: a small blog (flat models) and a page tree.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use listing_core::ast::Value;
use model_admin::config::ModelAdminConfig;
use model_admin::contract::model::{NewRecord, User};
use model_admin::domain::admin::{ListColumn, ModelAdmin};
use model_admin::domain::filters::ListFilterSpec;
use model_admin::domain::ports::HierarchicalStore;
use model_admin::domain::schema::{FieldKind, FieldSpec, ModelSchema, SchemaRegistry};
use model_admin::domain::service::{Service, ServicePorts};
use model_admin::infra::auth::{GrantKind, NodeGrants, StaticPermissions};
use model_admin::infra::storage::MemoryDatabase;
use model_admin::infra::tree::MemoryTree;
use model_admin::AdminRegistry;

pub const ARTICLE: &str = "blog.article";
pub const PAGE: &str = "site.page";

pub fn schemas() -> Arc<SchemaRegistry> {
    let mut reg = SchemaRegistry::new();
    reg.register(
        ModelSchema::new("blog", "author")
            .field(FieldSpec::new("name", FieldKind::Text))
            .display_field("name"),
    );
    reg.register(
        ModelSchema::new("blog", "tag")
            .field(FieldSpec::new("name", FieldKind::Text))
            .display_field("name"),
    );
    reg.register(
        ModelSchema::new("blog", "article")
            .field(FieldSpec::new("title", FieldKind::Text).required())
            .field(FieldSpec::new("status", FieldKind::Text))
            .field(FieldSpec::new("published", FieldKind::Date))
            .field(FieldSpec::new("author", FieldKind::ForeignKey { to: "blog.author".into() }))
            .field(FieldSpec::new("tags", FieldKind::ManyToMany { to: "blog.tag".into() }))
            .display_field("title"),
    );
    reg.register(
        ModelSchema::new("site", "page")
            .field(FieldSpec::new("title", FieldKind::Text).required())
            .hierarchical()
            .display_field("title"),
    );
    Arc::new(reg)
}

pub fn article_admin(schemas: &SchemaRegistry) -> ModelAdmin {
    let schema = schemas.get(ARTICLE).expect("article schema");
    ModelAdmin::new(schema)
        .list_display(vec![
            ListColumn::field("title"),
            ListColumn::field("author"),
            ListColumn::field("status"),
            ListColumn::field("published"),
        ])
        .list_filter(vec![
            ListFilterSpec::field("status"),
            ListFilterSpec::field("author"),
            ListFilterSpec::field("tags"),
        ])
        .search_fields(&["title", "author__name", "=status"])
        .list_per_page(5)
}

pub fn page_admin(schemas: &SchemaRegistry) -> ModelAdmin {
    ModelAdmin::new(schemas.get(PAGE).expect("page schema"))
}

pub fn blog_permissions() -> StaticPermissions {
    StaticPermissions::new()
        .grant("editor", "blog.add_article")
        .grant("editor", "blog.change_article")
        .grant("reviewer", "blog.change_article")
        .grant("reviewer", "blog.delete_article")
}

pub fn editor() -> User {
    User::new("editor")
}

pub fn reviewer() -> User {
    User::new("reviewer")
}

pub fn admin() -> User {
    User::superuser("admin")
}

/// Primary keys of the seeded rows.
pub struct Seeded {
    pub ada: Value,
    pub brian: Value,
    pub rust: Value,
    pub python: Value,
    pub go: Value,
    /// "Rust in Action" by Ada, tagged rust and python.
    pub feature: Value,
}

/// Twelve numbered articles plus one feature article.
///
/// Article `i` is a draft when `i % 3 == 0`, written by Ada when `i` is odd,
/// tagged rust+go when `i % 4 == 0` and rust alone when `i % 4 == 1`.
pub fn seed_blog(db: &MemoryDatabase) -> Seeded {
    let insert = |label: &str, record: NewRecord| db.insert(label, record).expect("seed insert").pk;
    let ada = insert("blog.author", NewRecord::new().with("name", "Ada"));
    let brian = insert("blog.author", NewRecord::new().with("name", "Brian"));
    let rust = insert("blog.tag", NewRecord::new().with("name", "rust"));
    let python = insert("blog.tag", NewRecord::new().with("name", "python"));
    let go = insert("blog.tag", NewRecord::new().with("name", "go"));

    for i in 1..=12_u32 {
        let tags = match i % 4 {
            0 => Value::List(vec![rust.clone(), go.clone()]),
            1 => Value::List(vec![rust.clone()]),
            _ => Value::List(Vec::new()),
        };
        insert(
            ARTICLE,
            NewRecord::new()
                .with("title", format!("Article {i:02}"))
                .with("status", if i % 3 == 0 { "draft" } else { "published" })
                .with("published", NaiveDate::from_ymd_opt(2024, 1, i).expect("date"))
                .with("author", if i % 2 == 1 { ada.clone() } else { brian.clone() })
                .with("tags", tags),
        );
    }
    let feature = insert(
        ARTICLE,
        NewRecord::new()
            .with("title", "Rust in Action")
            .with("status", "published")
            .with("published", NaiveDate::from_ymd_opt(2024, 2, 1).expect("date"))
            .with("author", ada.clone())
            .with("tags", Value::List(vec![rust.clone(), python.clone()])),
    );
    Seeded {
        ada,
        brian,
        rust,
        python,
        go,
        feature,
    }
}

pub struct BlogFixture {
    pub db: Arc<MemoryDatabase>,
    pub service: Arc<Service>,
    pub seeded: Seeded,
}

pub fn blog_with(config: &ModelAdminConfig, admin: impl FnOnce(ModelAdmin) -> ModelAdmin) -> BlogFixture {
    let schemas = schemas();
    let db = MemoryDatabase::new(schemas.clone());
    let seeded = seed_blog(&db);
    let ports = ServicePorts {
        store: Arc::new(db.record_store(ARTICLE).expect("article store")),
        permissions: Arc::new(blog_permissions()),
        tree: None,
    };
    let service = Service::new(admin(article_admin(&schemas)), schemas, ports, config)
        .expect("article admin is valid");
    BlogFixture {
        db,
        service: Arc::new(service),
        seeded,
    }
}

pub fn blog() -> BlogFixture {
    blog_with(&ModelAdminConfig::default(), |admin| admin)
}

/// Pages: `home` (live) with children `about` (live) and `news` (draft),
/// and `news` holding one child `launch`.
pub struct PageTree {
    pub home: Value,
    pub about: Value,
    pub news: Value,
    pub launch: Value,
}

pub struct PagesFixture {
    pub db: Arc<MemoryDatabase>,
    pub tree: Arc<MemoryTree>,
    pub service: Arc<Service>,
    pub pages: PageTree,
}

/// `editor` may add and edit anywhere under `news`; `publisher` holds
/// publish rights over the whole tree.
pub fn page_grants(news: &Value) -> NodeGrants {
    NodeGrants::new()
        .grant("editor", Some(news.clone()), GrantKind::Add)
        .grant("editor", Some(news.clone()), GrantKind::Edit)
        .grant("publisher", None, GrantKind::Publish)
        .grant("publisher", None, GrantKind::Edit)
}

pub fn pages_with(config: &ModelAdminConfig) -> PagesFixture {
    let schemas = schemas();
    let db = MemoryDatabase::new(schemas.clone());
    let page = |title: &str| NewRecord::new().with("title", title);

    let home = db
        .insert(PAGE, page("home").published(Some("/".into())))
        .expect("home")
        .pk;
    let seed_tree = MemoryTree::new(db.clone(), PAGE, NodeGrants::new()).expect("page tree");
    let home_rec = db.get(PAGE, &home).expect("home record");
    let about = seed_tree
        .attach_as_child(&home_rec, page("about").published(Some("/about/".into())))
        .expect("about")
        .pk;
    let news_rec = seed_tree
        .attach_as_child(&home_rec, page("news"))
        .expect("news");
    let launch = seed_tree
        .attach_as_child(&news_rec, page("launch").published(Some("/news/launch/".into())))
        .expect("launch")
        .pk;

    let tree = Arc::new(MemoryTree::new(db.clone(), PAGE, page_grants(&news_rec.pk)).expect("page tree"));
    let ports = ServicePorts {
        store: Arc::new(db.record_store(PAGE).expect("page store")),
        permissions: Arc::new(StaticPermissions::new()),
        tree: Some(tree.clone()),
    };
    let service = Service::new(page_admin(&schemas), schemas, ports, config).expect("page admin is valid");
    PagesFixture {
        db,
        tree,
        service: Arc::new(service),
        pages: PageTree {
            home,
            about,
            news: news_rec.pk,
            launch,
        },
    }
}

pub fn pages() -> PagesFixture {
    pages_with(&ModelAdminConfig::default())
}

pub fn registry_for(services: &[&Arc<Service>]) -> AdminRegistry {
    let mut registry = AdminRegistry::new();
    for svc in services {
        registry
            .register(svc.as_ref().clone())
            .expect("unique admin");
    }
    registry
}

pub fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

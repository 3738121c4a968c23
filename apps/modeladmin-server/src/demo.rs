//! Sample models served by the binary: a small blog and a page tree.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use listing_core::ast::Value;
use listing_core::OrderBy;
use model_admin::contract::model::{NewRecord, User};
use model_admin::domain::admin::{ListColumn, ModelAdmin};
use model_admin::domain::filters::ListFilterSpec;
use model_admin::domain::ports::HierarchicalStore;
use model_admin::domain::schema::{FieldKind, FieldSpec, ModelSchema, SchemaRegistry};
use model_admin::domain::service::{Service, ServicePorts};
use model_admin::infra::auth::{GrantKind, NodeGrants, StaticPermissions, UserDirectory};
use model_admin::infra::storage::MemoryDatabase;
use model_admin::infra::tree::MemoryTree;
use model_admin::{AdminRegistry, ModelAdminConfig};

const AUTHOR: &str = "blog.author";
const TAG: &str = "blog.tag";
const ARTICLE: &str = "blog.article";
const PAGE: &str = "site.page";

pub struct Demo {
    pub registry: AdminRegistry,
    pub users: UserDirectory,
}

fn schemas() -> SchemaRegistry {
    let mut reg = SchemaRegistry::new();
    reg.register(
        ModelSchema::new("blog", "author")
            .field(FieldSpec::new("name", FieldKind::Text).required())
            .field(FieldSpec::new("email", FieldKind::Text))
            .display_field("name"),
    );
    reg.register(
        ModelSchema::new("blog", "tag")
            .field(FieldSpec::new("name", FieldKind::Text).required())
            .display_field("name"),
    );
    reg.register(
        ModelSchema::new("blog", "article")
            .field(FieldSpec::new("title", FieldKind::Text).required())
            .field(FieldSpec::new("status", FieldKind::Text))
            .field(FieldSpec::new("published", FieldKind::Date).verbose("publication date"))
            .field(FieldSpec::new("featured", FieldKind::Bool))
            .field(FieldSpec::new("author", FieldKind::ForeignKey { to: AUTHOR.into() }))
            .field(FieldSpec::new("tags", FieldKind::ManyToMany { to: TAG.into() }))
            .verbose_names("article", "articles")
            .display_field("title"),
    );
    reg.register(
        ModelSchema::new("site", "page")
            .field(FieldSpec::new("title", FieldKind::Text).required())
            .field(FieldSpec::new("slug", FieldKind::Text))
            .hierarchical()
            .display_field("title"),
    );
    reg
}

fn users() -> UserDirectory {
    UserDirectory::new()
        .with(User::superuser("admin"))
        .with(User::new("editor"))
        .with(User::new("reviewer"))
        .with(User::new("publisher"))
        .with(User::new("intern").deactivated())
}

fn seed_blog(db: &MemoryDatabase) -> Result<()> {
    let ada = db.insert(AUTHOR, NewRecord::new().with("name", "Ada Lovelace"))?.pk;
    let grace = db.insert(AUTHOR, NewRecord::new().with("name", "Grace Hopper"))?.pk;
    let rust = db.insert(TAG, NewRecord::new().with("name", "rust"))?.pk;
    let web = db.insert(TAG, NewRecord::new().with("name", "web"))?.pk;

    let posts = [
        ("Ownership explained", "published", (2024, 1, 8), &ada, vec![rust.clone()]),
        ("Routing with axum", "published", (2024, 2, 12), &grace, vec![rust.clone(), web.clone()]),
        ("Serving static sites", "draft", (2024, 3, 3), &grace, vec![web.clone()]),
        ("Lifetimes in practice", "published", (2024, 4, 21), &ada, vec![rust.clone()]),
        ("Release notes", "draft", (2024, 5, 2), &ada, Vec::new()),
    ];
    for (title, status, (y, m, d), author, tags) in posts {
        let date = NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| anyhow!("invalid seed date"))?;
        db.insert(
            ARTICLE,
            NewRecord::new()
                .with("title", title)
                .with("status", status)
                .with("published", date)
                .with("featured", tags.len() > 1)
                .with("author", author.clone())
                .with("tags", Value::List(tags)),
        )?;
    }
    Ok(())
}

/// Seeds `home > {about, news > launch}` and returns the pk of `news`.
fn seed_pages(db: &Arc<MemoryDatabase>) -> Result<Value> {
    let page = |title: &str, slug: &str| NewRecord::new().with("title", title).with("slug", slug);
    let seeder = MemoryTree::new(db.clone(), PAGE, NodeGrants::new())?;

    let home = seeder.attach_as_root(page("Home", "").published(Some("/".into())))?;
    seeder.attach_as_child(&home, page("About", "about").published(Some("/about/".into())))?;
    let news = seeder.attach_as_child(&home, page("News", "news"))?;
    seeder.attach_as_child(
        &news,
        page("Launch", "launch").published(Some("/news/launch/".into())),
    )?;
    Ok(news.pk)
}

fn article_admin(schemas: &SchemaRegistry) -> Result<ModelAdmin> {
    let schema = schemas.get(ARTICLE).context("article schema is registered")?;
    Ok(ModelAdmin::new(schema)
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
            ListFilterSpec::field("featured"),
        ])
        .search_fields(&["title", "author__name", "=status"])
        .ordering(OrderBy::from_tokens(["-published"])?))
}

fn author_admin(schemas: &SchemaRegistry) -> Result<ModelAdmin> {
    let schema = schemas.get(AUTHOR).context("author schema is registered")?;
    Ok(ModelAdmin::new(schema)
        .list_display(vec![ListColumn::field("name"), ListColumn::field("email")])
        .search_fields(&["name", "^email"])
        .inspect_view_enabled(true))
}

fn page_admin(schemas: &SchemaRegistry) -> Result<ModelAdmin> {
    let schema = schemas.get(PAGE).context("page schema is registered")?;
    Ok(ModelAdmin::new(schema).search_fields(&["title", "slug"]))
}

/// Builds the registry with seeded stores and the user directory.
pub fn build(config: &ModelAdminConfig) -> Result<Demo> {
    let schemas = Arc::new(schemas());
    let db = MemoryDatabase::new(schemas.clone());
    seed_blog(&db).context("seeding blog")?;
    let news = seed_pages(&db).context("seeding pages")?;

    let permissions = Arc::new(
        StaticPermissions::new()
            .grant("editor", "blog.add_article")
            .grant("editor", "blog.change_article")
            .grant("reviewer", "blog.change_article")
            .grant("reviewer", "blog.delete_article")
            .grant("reviewer", "blog.change_author"),
    );
    let grants = NodeGrants::new()
        .grant("editor", Some(news.clone()), GrantKind::Add)
        .grant("editor", Some(news), GrantKind::Edit)
        .grant("publisher", None, GrantKind::Publish)
        .grant("publisher", None, GrantKind::Edit);

    let flat = |label: &str| -> Result<ServicePorts> {
        Ok(ServicePorts {
            store: Arc::new(db.record_store(label)?),
            permissions: permissions.clone(),
            tree: None,
        })
    };
    let page_ports = ServicePorts {
        store: Arc::new(db.record_store(PAGE)?),
        permissions: permissions.clone(),
        tree: Some(Arc::new(MemoryTree::new(db.clone(), PAGE, grants)?)),
    };

    let mut registry = AdminRegistry::new();
    registry.register(Service::new(
        article_admin(&schemas)?,
        schemas.clone(),
        flat(ARTICLE)?,
        config,
    )?)?;
    registry.register(Service::new(
        author_admin(&schemas)?,
        schemas.clone(),
        flat(AUTHOR)?,
        config,
    )?)?;
    registry.register(Service::new(page_admin(&schemas)?, schemas, page_ports, config)?)?;
    registry.register_group("Blog", &[ARTICLE, AUTHOR])?;

    tracing::info!(admins = registry.len(), "sample admins registered");
    Ok(Demo {
        registry,
        users: users(),
    })
}

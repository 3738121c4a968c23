use std::sync::Arc;

use listing_core::ast::Value;
use tracing::{debug, info, instrument, warn};

use crate::config::ModelAdminConfig;
use crate::contract::client::TreeParams;
use crate::contract::model::{ActionButton, ChangeList, NewRecord, Record, User};
use crate::domain::admin::ModelAdmin;
use crate::domain::buttons::{ButtonHelper, ButtonKind};
use crate::domain::changelist::{column_headers, result_row, QueryState};
use crate::domain::error::DomainError;
use crate::domain::filters::apply_filters;
use crate::domain::lookups::LookupResolver;
use crate::domain::ordering::resolve_ordering;
use crate::domain::pagination::paginate;
use crate::domain::permissions::{policy_for, PermissionPolicy};
use crate::domain::ports::{AttachmentPoint, HierarchicalStore, PermissionSystem};
use crate::domain::repo::{RecordQuery, RecordStore};
use crate::domain::schema::{FieldKind, ModelSchema, SchemaRegistry};
use crate::domain::search::apply_search;
use crate::domain::tree::TreePosition;
use crate::domain::urls::AdminUrlHelper;

/// Configuration for the domain service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub list_per_page: u64,
    pub max_per_page: u64,
    pub show_full_result_count: bool,
    pub inspect_view_enabled: bool,
}

impl ServiceConfig {
    /// Module settings overridden by the admin's own options.
    pub fn resolve(config: &ModelAdminConfig, admin: &ModelAdmin) -> Self {
        let max_per_page = config.max_per_page.max(1);
        Self {
            list_per_page: admin
                .list_per_page
                .unwrap_or(config.list_per_page)
                .clamp(1, max_per_page),
            max_per_page,
            show_full_result_count: admin
                .show_full_result_count
                .unwrap_or(config.show_full_result_count),
            inspect_view_enabled: admin
                .inspect_view_enabled
                .unwrap_or(config.inspect_view_enabled),
        }
    }
}

/// Outbound dependencies of one admin.
#[derive(Clone)]
pub struct ServicePorts {
    pub store: Arc<dyn RecordStore>,
    pub permissions: Arc<dyn PermissionSystem>,
    pub tree: Option<Arc<dyn HierarchicalStore>>,
}

/// Domain service for one registered model admin.
/// Depends only on ports, not on infra types.
#[derive(Clone)]
pub struct Service {
    admin: Arc<ModelAdmin>,
    registry: Arc<SchemaRegistry>,
    store: Arc<dyn RecordStore>,
    tree: Option<Arc<dyn HierarchicalStore>>,
    policy: Arc<dyn PermissionPolicy>,
    urls: AdminUrlHelper,
    config: ServiceConfig,
}

impl Service {
    /// Validate the admin against its schema and select a permission policy.
    pub fn new(
        admin: ModelAdmin,
        registry: Arc<SchemaRegistry>,
        ports: ServicePorts,
        config: &ModelAdminConfig,
    ) -> Result<Self, DomainError> {
        let label = admin.label();
        if ports.store.schema().label() != label {
            return Err(DomainError::configuration(format!(
                "store for {} cannot back the {label} admin",
                ports.store.schema().label()
            )));
        }
        admin.validate(&LookupResolver::new(admin.schema.clone(), registry.clone()))?;
        let service_config = ServiceConfig::resolve(config, &admin);
        let policy = policy_for(
            &admin.schema,
            ports.permissions,
            ports.tree.clone(),
            service_config.inspect_view_enabled,
            admin.read_only,
        )?;
        Ok(Self {
            urls: AdminUrlHelper::new(config, &admin.schema),
            admin: Arc::new(admin),
            registry,
            store: ports.store,
            tree: ports.tree,
            policy,
            config: service_config,
        })
    }

    pub fn schema(&self) -> &ModelSchema {
        &self.admin.schema
    }

    pub fn label(&self) -> String {
        self.admin.label()
    }

    pub fn urls(&self) -> &AdminUrlHelper {
        &self.urls
    }

    pub fn policy(&self) -> &dyn PermissionPolicy {
        self.policy.as_ref()
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn buttons(&self) -> ButtonHelper<'_> {
        ButtonHelper::new(&self.admin.schema, self.policy.as_ref(), &self.urls)
    }

    fn resolver(&self) -> LookupResolver {
        LookupResolver::new(self.admin.schema.clone(), self.registry.clone())
    }

    pub fn buttons_for(&self, user: &User, record: &Record, exclude: &[ButtonKind]) -> Vec<ActionButton> {
        self.buttons().buttons_for(user, record, exclude, &[], &[])
    }

    /// Build one page of the result list.
    ///
    /// Bad lookup parameters surface as `IncorrectLookupParameters` so the
    /// caller can redirect with `e=1`; if the request already carries that
    /// flag the error becomes a configuration error instead.
    #[instrument(
        name = "model_admin.service.list",
        skip(self, user, params),
        fields(model = %self.label(), user = %user.username)
    )]
    pub fn list(&self, user: &User, params: &[(String, String)]) -> Result<ChangeList, DomainError> {
        let state = QueryState::from_pairs(params);
        match self.build_changelist(user, &state) {
            Err(DomainError::IncorrectLookupParameters { reason }) if state.error_flag => {
                warn!(%reason, "incorrect lookup parameters on error redirect");
                Err(DomainError::configuration(format!(
                    "incorrect lookup parameters persist after redirect: {reason}"
                )))
            }
            other => other,
        }
    }

    fn build_changelist(&self, user: &User, state: &QueryState) -> Result<ChangeList, DomainError> {
        if !self.policy.has_list_permission(user) {
            return Err(DomainError::PermissionDenied);
        }
        let schema = self.admin.schema.as_ref();
        let resolver = self.resolver();
        let base = RecordQuery::all();

        let filtered = apply_filters(
            base.clone(),
            &state.lookup_params,
            &self.admin.list_filter,
            &resolver,
        )?;
        let (query, search_distinct) = apply_search(
            filtered.query,
            &state.search_term,
            &self.admin.search_fields,
            &resolver,
        );
        let ordering = resolve_ordering(
            state.order.as_deref(),
            &self.admin.ordering,
            &self.admin.list_display,
            &query.order,
            schema,
        );
        let mut query = query.order_by(ordering.ordering.clone());
        if filtered.needs_distinct || search_distinct {
            query = query.distinct();
        }
        debug!(filters = query.filters.len(), distinct = query.distinct, order = %query.order, "query resolved");

        let page = paginate(self.store.as_ref(), &query, self.config.list_per_page, state.page)?;
        let full_result_count = if self.config.show_full_result_count {
            Some(self.store.count(&base)?)
        } else {
            None
        };

        let buttons = self.buttons();
        let rows = page
            .items
            .iter()
            .map(|record| result_row(schema, &self.admin.list_display, &buttons, user, record))
            .collect();

        Ok(ChangeList {
            model: schema.label(),
            verbose_name_plural: schema.verbose_name_plural.clone(),
            columns: column_headers(schema, &self.admin.list_display, &ordering),
            rows,
            result_count: page.page.total_count,
            page: page.page,
            full_result_count,
            search_term: state.search_term.clone(),
            has_filters: filtered.has_active_filters,
            filters: filtered.summaries,
            ordering: ordering.ordering.to_tokens(),
            add_button: buttons
                .show_add_button(user)
                .then(|| buttons.add_button(&[], &[])),
        })
    }

    /// Create a record; tree-backed types are placed according to `tree`.
    #[instrument(
        name = "model_admin.service.create",
        skip(self, user, record, tree),
        fields(model = %self.label(), user = %user.username)
    )]
    pub fn create(&self, user: &User, record: NewRecord, tree: TreeParams) -> Result<Record, DomainError> {
        info!("Creating record");
        if !self.policy.has_add_permission(user) {
            return Err(DomainError::PermissionDenied);
        }
        let record = self.validate_new(record)?;

        let created = if self.admin.schema.is_hierarchical {
            let store = self.tree.as_ref().ok_or_else(|| {
                DomainError::configuration(format!("{} has no tree store", self.label()))
            })?;
            let position = TreePosition::from_params(
                tree.parent_id.as_deref(),
                tree.sibling_id.as_deref(),
                tree.pos.as_deref(),
            )?;
            self.insert_in_tree(store.as_ref(), user, position, record)?
        } else {
            if !tree.is_empty() {
                return Err(DomainError::validation(
                    "parent_id",
                    "tree position parameters only apply to hierarchical models",
                ));
            }
            self.store.insert(record)?
        };

        info!(pk = %created.pk, "Successfully created record");
        Ok(created)
    }

    fn insert_in_tree(
        &self,
        tree: &dyn HierarchicalStore,
        user: &User,
        position: TreePosition,
        record: NewRecord,
    ) -> Result<Record, DomainError> {
        match position {
            TreePosition::Root => {
                let points = tree.valid_attachment_points(&self.admin.schema, user)?;
                if !points.contains(&AttachmentPoint::Root) {
                    return Err(DomainError::PermissionDenied);
                }
                Ok(tree.attach_as_root(record)?)
            }
            TreePosition::Child { parent } => {
                let parent = self.load_anchor("parent_id", &parent)?;
                if !tree.permissions_for(user, &parent)?.can_add_subpage {
                    return Err(DomainError::PermissionDenied);
                }
                Ok(tree.attach_as_child(&parent, record)?)
            }
            TreePosition::Sibling { sibling, pos } => {
                let sibling = self.load_anchor("sibling_id", &sibling)?;
                let allowed = match tree.parent_of(&sibling)? {
                    Some(parent) => tree.permissions_for(user, &parent)?.can_add_subpage,
                    None => tree
                        .valid_attachment_points(&self.admin.schema, user)?
                        .contains(&AttachmentPoint::Root),
                };
                if !allowed {
                    return Err(DomainError::PermissionDenied);
                }
                Ok(tree.attach_as_sibling(&sibling, record, pos)?)
            }
        }
    }

    fn load_anchor(&self, param: &str, raw: &str) -> Result<Record, DomainError> {
        let pk = self
            .admin
            .schema
            .parse_pk(raw)
            .map_err(|message| DomainError::validation(param, message))?;
        self.store
            .get(&pk)?
            .ok_or_else(|| DomainError::not_found(self.label(), raw))
    }

    /// Coerce field values to their kinds and check required fields.
    fn validate_new(&self, mut record: NewRecord) -> Result<NewRecord, DomainError> {
        let schema = self.admin.schema.as_ref();
        for (name, value) in record.fields.iter_mut() {
            let field = schema
                .get_field(name)
                .ok_or_else(|| DomainError::validation(name.clone(), "unknown field"))?;
            let kind = match &field.kind {
                FieldKind::Reverse { .. } => {
                    return Err(DomainError::validation(name.clone(), "reverse relations cannot be set"));
                }
                FieldKind::ForeignKey { to } | FieldKind::ManyToMany { to } => self
                    .registry
                    .get(to)
                    .and_then(|related| related.pk_spec().map(|pk| pk.kind.clone()))
                    .unwrap_or(FieldKind::Text),
                scalar => scalar.clone(),
            };
            let coerced = kind
                .coerce(value)
                .map_err(|message| DomainError::validation(name.clone(), message))?;
            if matches!(field.kind, FieldKind::ManyToMany { .. }) && !matches!(coerced, Value::List(_) | Value::Null) {
                *value = Value::List(vec![coerced]);
            } else {
                *value = coerced;
            }
        }
        for field in schema.fields().iter().filter(|f| f.required) {
            if record.fields.get(&field.name).map_or(true, Value::is_null) {
                return Err(DomainError::validation(field.name.clone(), "this field is required"));
            }
        }
        Ok(record)
    }

    /// A record the user may inspect. Missing and forbidden look the same.
    #[instrument(
        name = "model_admin.service.inspect",
        skip(self, user),
        fields(model = %self.label(), user = %user.username)
    )]
    pub fn inspect(&self, user: &User, pk: &str) -> Result<Record, DomainError> {
        debug!("Inspecting record");
        let pk = self
            .admin
            .schema
            .parse_pk(pk)
            .map_err(|_| DomainError::PermissionDenied)?;
        let record = self.store.get(&pk)?.ok_or(DomainError::PermissionDenied)?;
        if !self.policy.can_inspect(user, &record) {
            return Err(DomainError::PermissionDenied);
        }
        Ok(record)
    }
}

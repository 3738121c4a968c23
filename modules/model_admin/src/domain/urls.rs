use listing_core::ast::Value;

use crate::config::ModelAdminConfig;
use crate::domain::schema::ModelSchema;

/// Builds the URLs an admin links to.
///
/// Flat types keep every action under the admin's own index. Tree-backed
/// types send object actions other than inspect to the pages URL space and
/// pass the index back as `next`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUrlHelper {
    index: String,
    pages_prefix: String,
    hierarchical: bool,
}

impl AdminUrlHelper {
    pub fn new(config: &ModelAdminConfig, schema: &ModelSchema) -> Self {
        Self {
            index: format!(
                "{}/{}/{}/",
                config.url_prefix.trim_end_matches('/'),
                schema.app_label,
                schema.model_name
            ),
            pages_prefix: config.pages_url_prefix.trim_end_matches('/').to_owned(),
            hierarchical: schema.is_hierarchical,
        }
    }

    pub fn index_url(&self) -> &str {
        &self.index
    }

    pub fn create_url(&self) -> String {
        format!("{}create/", self.index)
    }

    pub fn choose_parent_url(&self) -> String {
        format!("{}choose_parent/", self.index)
    }

    /// Where a request with bad lookup parameters is sent back to.
    pub fn error_redirect_url(&self) -> String {
        format!("{}?e=1", self.index)
    }

    pub fn action_url(&self, action: &str, pk: &Value) -> String {
        let pk = urlencoding::encode(&pk.to_string()).into_owned();
        if self.hierarchical && action != "inspect" {
            format!(
                "{}/{pk}/{action}/?next={}",
                self.pages_prefix,
                urlencoding::encode(&self.index)
            )
        } else {
            format!("{}{action}/{pk}/", self.index)
        }
    }

    pub fn view_draft_url(&self, pk: &Value) -> String {
        format!(
            "{}/{}/view_draft/",
            self.pages_prefix,
            urlencoding::encode(&pk.to_string())
        )
    }

    pub fn add_child_url(&self, parent: &Value) -> String {
        format!(
            "{}?parent_id={}",
            self.create_url(),
            urlencoding::encode(&parent.to_string())
        )
    }

    pub fn add_sibling_url(&self, sibling: &Value, pos: Option<&str>) -> String {
        let mut url = format!(
            "{}?sibling_id={}",
            self.create_url(),
            urlencoding::encode(&sibling.to_string())
        );
        if let Some(pos) = pos {
            url.push_str("&pos=");
            url.push_str(pos);
        }
        url
    }
}

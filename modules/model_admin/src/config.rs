use serde::{Deserialize, Serialize};

/// Settings shared by every registered model admin. Per-admin options on
/// [`crate::domain::admin::ModelAdmin`] take precedence when set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelAdminConfig {
    #[serde(default = "default_list_per_page")]
    pub list_per_page: u64,
    #[serde(default = "default_max_per_page")]
    pub max_per_page: u64,
    #[serde(default = "default_show_full_result_count")]
    pub show_full_result_count: bool,
    #[serde(default)]
    pub inspect_view_enabled: bool,
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,
    #[serde(default = "default_pages_url_prefix")]
    pub pages_url_prefix: String,
}

impl Default for ModelAdminConfig {
    fn default() -> Self {
        Self {
            list_per_page: default_list_per_page(),
            max_per_page: default_max_per_page(),
            show_full_result_count: default_show_full_result_count(),
            inspect_view_enabled: false,
            url_prefix: default_url_prefix(),
            pages_url_prefix: default_pages_url_prefix(),
        }
    }
}

fn default_list_per_page() -> u64 {
    100
}

fn default_max_per_page() -> u64 {
    1000
}

fn default_show_full_result_count() -> bool {
    true
}

fn default_url_prefix() -> String {
    "/admin/modeladmin".to_owned()
}

fn default_pages_url_prefix() -> String {
    "/admin/pages".to_owned()
}

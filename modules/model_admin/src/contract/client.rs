use crate::contract::error::ModelAdminError;
use crate::contract::model::{ChangeList, NewRecord, Record, User};

/// Where a new record goes when its type is stored in a tree.
/// All fields empty means "as a root".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeParams {
    pub parent_id: Option<String>,
    pub sibling_id: Option<String>,
    pub pos: Option<String>,
}

impl TreeParams {
    pub fn is_empty(&self) -> bool {
        [&self.parent_id, &self.sibling_id, &self.pos]
            .into_iter()
            .all(|v| v.as_deref().map_or(true, |s| s.trim().is_empty()))
    }
}

/// Public API for other modules that need admin listings without HTTP.
/// `model` is the `app_label.model_name` label the admin was registered under.
pub trait ModelAdminApi: Send + Sync {
    fn changelist(
        &self,
        model: &str,
        user: &User,
        params: &[(String, String)],
    ) -> Result<ChangeList, ModelAdminError>;

    fn create(
        &self,
        model: &str,
        user: &User,
        record: NewRecord,
        tree: TreeParams,
    ) -> Result<Record, ModelAdminError>;

    fn inspect(&self, model: &str, user: &User, pk: &str) -> Result<Record, ModelAdminError>;
}

pub mod client;
pub mod error;
pub mod model;

pub use client::{ModelAdminApi, TreeParams};
pub use error::ModelAdminError;
pub use model::{ActionButton, ChangeList, NewRecord, Record, ResultRow, TreeNode, User};

//! Error catalog for the model admin REST surface.

use modkit::api::problem::{Problem, ProblemResponse};
use modkit_errors::{err_def, ErrDef};

err_def!(
    LOOKUP_DISALLOWED,
    400,
    "Disallowed Lookup",
    "model_admin.lookup.disallowed.v1"
);
err_def!(
    VALIDATION,
    400,
    "Validation Failed",
    "model_admin.record.validation.v1"
);
err_def!(
    UNAUTHENTICATED,
    401,
    "Unauthenticated",
    "model_admin.auth.unauthenticated.v1"
);
err_def!(
    PERMISSION_DENIED,
    403,
    "Permission Denied",
    "model_admin.auth.permission_denied.v1"
);
err_def!(
    NOT_FOUND,
    404,
    "Record Not Found",
    "model_admin.record.not_found.v1"
);
err_def!(
    CONFIGURATION,
    500,
    "Improperly Configured",
    "model_admin.admin.configuration.v1"
);
err_def!(
    INTERNAL_STORE,
    500,
    "Internal Error",
    "model_admin.internal.store.v1"
);

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    model_admin_lookup_disallowed_v1,
    model_admin_record_validation_v1,
    model_admin_auth_unauthenticated_v1,
    model_admin_auth_permission_denied_v1,
    model_admin_record_not_found_v1,
    model_admin_admin_configuration_v1,
    model_admin_internal_store_v1,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 7] = [
        ErrorCode::model_admin_lookup_disallowed_v1,
        ErrorCode::model_admin_record_validation_v1,
        ErrorCode::model_admin_auth_unauthenticated_v1,
        ErrorCode::model_admin_auth_permission_denied_v1,
        ErrorCode::model_admin_record_not_found_v1,
        ErrorCode::model_admin_admin_configuration_v1,
        ErrorCode::model_admin_internal_store_v1,
    ];

    pub const fn def(&self) -> ErrDef {
        match self {
            ErrorCode::model_admin_lookup_disallowed_v1 => LOOKUP_DISALLOWED,
            ErrorCode::model_admin_record_validation_v1 => VALIDATION,
            ErrorCode::model_admin_auth_unauthenticated_v1 => UNAUTHENTICATED,
            ErrorCode::model_admin_auth_permission_denied_v1 => PERMISSION_DENIED,
            ErrorCode::model_admin_record_not_found_v1 => NOT_FOUND,
            ErrorCode::model_admin_admin_configuration_v1 => CONFIGURATION,
            ErrorCode::model_admin_internal_store_v1 => INTERNAL_STORE,
        }
    }

    pub const fn status(&self) -> u16 {
        self.def().status
    }

    pub fn to_problem(&self, detail: impl Into<String>) -> Problem {
        self.def().to_problem(detail)
    }

    pub fn to_response(
        &self,
        detail: impl Into<String>,
        instance: &str,
        trace_id: Option<String>,
    ) -> ProblemResponse {
        self.def().to_response(detail, instance, trace_id)
    }
}

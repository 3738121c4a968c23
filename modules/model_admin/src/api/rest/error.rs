use modkit::api::problem::{ProblemResponse, ValidationError};
use tracing::error;

use crate::domain::error::DomainError;
use crate::errors::ErrorCode;

/// Map a domain error to an RFC 9457 problem response.
///
/// Incorrect lookup parameters on the list endpoint are answered with a
/// redirect by the handler and never reach this function from there.
pub fn map_domain_error(e: &DomainError, instance: &str, request_id: Option<String>) -> ProblemResponse {
    match e {
        DomainError::DisallowedLookup { .. } => ErrorCode::model_admin_lookup_disallowed_v1
            .to_response(e.to_string(), instance, request_id),
        DomainError::IncorrectLookupParameters { reason } => {
            ErrorCode::model_admin_record_validation_v1.to_response(reason.clone(), instance, request_id)
        }
        DomainError::Validation { field, message } => {
            let mut resp = ErrorCode::model_admin_record_validation_v1.to_response(
                e.to_string(),
                instance,
                request_id,
            );
            resp.0 = resp.0.with_errors(vec![ValidationError {
                detail: message.clone(),
                pointer: format!("/fields/{field}"),
            }]);
            resp
        }
        DomainError::PermissionDenied => ErrorCode::model_admin_auth_permission_denied_v1
            .to_response("You do not have permission to perform this action", instance, request_id),
        DomainError::NotFound { .. } => {
            ErrorCode::model_admin_record_not_found_v1.to_response(e.to_string(), instance, request_id)
        }
        DomainError::Configuration { message } => {
            error!(error = %message, "model admin is improperly configured");
            ErrorCode::model_admin_admin_configuration_v1.to_response(
                message.clone(),
                instance,
                request_id,
            )
        }
        DomainError::Store { message } => {
            error!(error = %message, "record store failure");
            ErrorCode::model_admin_internal_store_v1.to_response(
                "An internal error occurred",
                instance,
                request_id,
            )
        }
    }
}

// ============================================================================
// Domain error -> gRPC status table
// ============================================================================
//
// Every translation from a store/domain outcome to a protocol status happens
// here. Callers never see raw storage error text.
//
// ============================================================================

use msgstore_config::StorageFaultStatus;
use tonic::{Code, Status};

use crate::auth::AuthError;
use crate::store::StoreError;

/// RPC operations, used to pick a row of the mapping table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Send,
    Get,
    Update,
    Delete,
    List,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Send => "SendMessage",
            Operation::Get => "GetMessage",
            Operation::Update => "UpdateMessage",
            Operation::Delete => "DeleteMessage",
            Operation::List => "ListMessages",
        }
    }

    /// Short caller-facing text for a failed operation
    fn failure_message(&self) -> &'static str {
        match self {
            Operation::Send => "failed to create message",
            Operation::Get => "failed to get message",
            Operation::Update => "failed to update message",
            Operation::Delete => "failed to delete message",
            Operation::List => "failed to retrieve messages",
        }
    }
}

/// Explicit table of which code each error class produces.
///
/// `NoResults` on a listing is not in the table: the server answers it with
/// an empty success before consulting the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusMapping {
    pub not_found: Code,
    /// Storage faults on send/get/update/delete
    pub single_fault: Code,
    /// Storage faults on list
    pub list_fault: Code,
}

impl StatusMapping {
    /// The established mapping: faults report `Unauthenticated` except for
    /// listing, which reports `Internal`.
    pub const fn legacy() -> Self {
        Self {
            not_found: Code::PermissionDenied,
            single_fault: Code::Unauthenticated,
            list_fault: Code::Internal,
        }
    }

    /// Faults report `Internal` for every operation
    pub const fn uniform_internal() -> Self {
        Self {
            not_found: Code::PermissionDenied,
            single_fault: Code::Internal,
            list_fault: Code::Internal,
        }
    }

    pub fn code_for(&self, op: Operation, err: &StoreError) -> Code {
        match err {
            StoreError::NotFound | StoreError::NoResults => self.not_found,
            StoreError::Fault(_) if op == Operation::List => self.list_fault,
            StoreError::Fault(_) => self.single_fault,
        }
    }

    pub fn status_for(&self, op: Operation, err: &StoreError) -> Status {
        let code = self.code_for(op, err);
        match err {
            StoreError::Fault(detail) => {
                tracing::error!(
                    operation = op.as_str(),
                    error = %detail,
                    status = ?code,
                    "Storage fault"
                );
            }
            _ => {
                tracing::debug!(operation = op.as_str(), error = %err, status = ?code, "Request failed");
            }
        }

        let message = match err {
            StoreError::NotFound | StoreError::NoResults => "message not found",
            StoreError::Fault(_) => op.failure_message(),
        };
        Status::new(code, message)
    }
}

impl Default for StatusMapping {
    fn default() -> Self {
        Self::legacy()
    }
}

impl From<StorageFaultStatus> for StatusMapping {
    fn from(setting: StorageFaultStatus) -> Self {
        match setting {
            StorageFaultStatus::Legacy => Self::legacy(),
            StorageFaultStatus::Internal => Self::uniform_internal(),
        }
    }
}

/// Authentication failures always surface as `Unauthenticated`
pub fn auth_status(op: Operation, err: &AuthError) -> Status {
    tracing::warn!(operation = op.as_str(), error = %err, "Token rejected");
    Status::unauthenticated("invalid authentication token")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SINGLE_OPS: [Operation; 4] = [
        Operation::Send,
        Operation::Get,
        Operation::Update,
        Operation::Delete,
    ];

    fn fault() -> StoreError {
        StoreError::Fault("connection reset by peer".to_string())
    }

    #[test]
    fn test_legacy_mapping_is_asymmetric() {
        let mapping = StatusMapping::legacy();
        for op in SINGLE_OPS {
            assert_eq!(mapping.code_for(op, &fault()), Code::Unauthenticated);
            assert_eq!(
                mapping.code_for(op, &StoreError::NotFound),
                Code::PermissionDenied
            );
        }
        assert_eq!(mapping.code_for(Operation::List, &fault()), Code::Internal);
    }

    #[test]
    fn test_uniform_internal_mapping() {
        let mapping = StatusMapping::uniform_internal();
        for op in SINGLE_OPS {
            assert_eq!(mapping.code_for(op, &fault()), Code::Internal);
        }
        assert_eq!(
            mapping.code_for(Operation::Delete, &StoreError::NotFound),
            Code::PermissionDenied
        );
    }

    #[test]
    fn test_status_never_carries_storage_text() {
        let status = StatusMapping::legacy().status_for(Operation::Update, &fault());
        assert_eq!(status.message(), "failed to update message");
        assert!(!status.message().contains("connection"));

        let status = StatusMapping::legacy().status_for(Operation::Get, &StoreError::NotFound);
        assert_eq!(status.code(), Code::PermissionDenied);
        assert_eq!(status.message(), "message not found");
    }

    #[test]
    fn test_mapping_from_config_setting() {
        assert_eq!(
            StatusMapping::from(StorageFaultStatus::Legacy),
            StatusMapping::legacy()
        );
        assert_eq!(
            StatusMapping::from(StorageFaultStatus::Internal),
            StatusMapping::uniform_internal()
        );
        assert_eq!(StatusMapping::default(), StatusMapping::legacy());
    }

    #[test]
    fn test_auth_status() {
        let status = auth_status(Operation::List, &AuthError::Expired);
        assert_eq!(status.code(), Code::Unauthenticated);
    }
}

//! Authorization checks shared by the workflows
//!
//! The role gate runs before any store call; the ownership rule runs after the target
//! has been loaded and before anything is changed.

use crate::domain::{AuthContext, CompositeResource, FolioError, ResourceKind, Result};

/// Reject callers whose role may not write this kind
pub fn require_write_role(auth: &AuthContext, kind: ResourceKind, action: &str) -> Result<()> {
    if auth.has_any_role(kind.write_roles()) {
        return Ok(());
    }
    tracing::debug!(
        caller_id = %auth.caller_id,
        role = %auth.role,
        kind = %kind,
        action,
        "Role not allowed"
    );
    Err(FolioError::Forbidden(format!(
        "You are not authorized to {action} a {}",
        kind.label().to_lowercase()
    )))
}

/// Reject callers who are neither the creator nor the top elevated role
pub fn require_owner<R: CompositeResource>(
    auth: &AuthContext,
    resource: &R,
    action: &str,
) -> Result<()> {
    if auth.may_modify(resource.created_by()) {
        return Ok(());
    }
    tracing::debug!(
        caller_id = %auth.caller_id,
        resource_id = %resource.id(),
        action,
        "Caller does not own resource"
    );
    Err(FolioError::Forbidden(format!(
        "You are not authorized to {action} this {}",
        R::KIND.label().to_lowercase()
    )))
}

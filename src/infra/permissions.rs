use async_trait::async_trait;
use std::collections::HashSet;

use crate::domain::models::auth::{Actor, Capability};
use crate::domain::ports::PermissionChecker;
use crate::error::AppError;

/// Grants exactly the capabilities named in the actor's token claims.
/// Unknown claim strings are ignored rather than rejected, so tokens minted
/// by a newer auth service keep working here.
pub struct ClaimsPermissionChecker;

#[async_trait]
impl PermissionChecker for ClaimsPermissionChecker {
    async fn granted(
        &self,
        actor: &Actor,
        requested: &[Capability],
    ) -> Result<HashSet<Capability>, AppError> {
        let held: HashSet<Capability> = actor
            .caps
            .iter()
            .filter_map(|raw| raw.parse().ok())
            .collect();

        Ok(requested
            .iter()
            .copied()
            .filter(|cap| held.contains(cap))
            .collect())
    }
}

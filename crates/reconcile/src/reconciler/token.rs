//! Connector token requests

use super::Reconciler;
use crate::error::ReconcileError;
use crate::model::{ConflictPolicy, DesiredResource};
use crds::kinds::{APPLICATION, TOKEN_REQUEST};
use crds::{TokenRequest, TokenRequestSpec};
use resource_store::ResourceRef;
use tracing::{error, info};

/// Namespace token requests are created in
pub const TOKEN_NAMESPACE: &str = "default";

impl Reconciler {
    /// Request a fresh one-time connector URL for `application`
    ///
    /// Any previous TokenRequest of the application is deleted first so the
    /// returned URL is always newly issued.
    pub async fn create_token(&self, application: &str) -> Result<String, ReconcileError> {
        let app_ref = ResourceRef::cluster(APPLICATION, application)
            .map_err(|e| ReconcileError::invalid("application name", e))?;
        let token_ref = ResourceRef::namespaced(TOKEN_REQUEST, TOKEN_NAMESPACE, application)
            .map_err(|e| ReconcileError::invalid("token request", e))?;

        if !self.exists(&app_ref).await? {
            return Err(ReconcileError::ApplicationNotFound(application.to_string()));
        }

        if self.exists(&token_ref).await? {
            info!("[DELETE] Removing previous {}", token_ref);
            match self.store.delete(&token_ref).await {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {}
                Err(e) => {
                    error!("Failed to delete {}: {}", token_ref, e);
                    return Err(ReconcileError::from_store("delete", &token_ref, e));
                }
            }
        }

        let request = TokenRequest::new(application, TokenRequestSpec::default());
        let desired = DesiredResource::from_typed(token_ref.clone(), &request)?
            .conflict_policy(ConflictPolicy::Fail);
        self.reconcile(&desired).await?;

        let ready = self
            .wait_until_ready(&token_ref, &self.policies.token_request)
            .await?;
        let token: TokenRequest = ready.decode()?;
        token
            .url()
            .map(str::to_string)
            .ok_or_else(|| ReconcileError::Validation {
                resource: token_ref.to_string(),
                message: "status.url is not a string".to_string(),
            })
    }
}

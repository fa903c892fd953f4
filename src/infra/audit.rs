use crate::domain::{models::audit::AuditEvent, ports::AuditSink};
use crate::error::AppError;
use async_trait::async_trait;
use tracing::info;

/// Default sink: audit entries go to the structured log. Deployments that
/// need durable audit storage plug their own implementation into the port.
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, event: AuditEvent) -> Result<(), AppError> {
        info!(
            actor = %event.actor_id,
            action = ?event.action,
            object_type = event.object_type,
            object_id = %event.object_id,
            changes = %event.field_changes,
            context = event.context.as_deref().unwrap_or(""),
            "audit"
        );
        Ok(())
    }
}

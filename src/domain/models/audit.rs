use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuditAction {
    #[serde(rename = "CREATE")]
    Create,
    #[serde(rename = "UPDATE")]
    Update,
    #[serde(rename = "DELETE")]
    Delete,
    #[serde(rename = "IMPORT")]
    Import,
}

/// Emitted by the core through the `AuditSink` port; storage belongs to the
/// caller, not to this crate.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub actor_id: String,
    pub action: AuditAction,
    pub object_type: &'static str,
    pub object_id: String,
    pub field_changes: Value,
    pub context: Option<String>,
}

impl AuditEvent {
    pub fn new(
        actor_id: impl Into<String>,
        action: AuditAction,
        object_type: &'static str,
        object_id: impl Into<String>,
        field_changes: Value,
    ) -> Self {
        Self {
            actor_id: actor_id.into(),
            action,
            object_type,
            object_id: object_id.into(),
            field_changes,
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

//! Builder for admin log entries.
//!
//! Admin mutations write their log row in the same database transaction
//! as the change itself; this module only shapes the row.

use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::models::{AdminAction, NewAdminLog};

/// Builder for creating admin log entries with a fluent API.
#[derive(Debug, Clone)]
pub struct AdminLogBuilder {
    admin_id: Uuid,
    action: AdminAction,
    target_type: String,
    target_id: Option<Uuid>,
    details: Map<String, Value>,
}

impl AdminLogBuilder {
    pub fn new(admin_id: Uuid, action: AdminAction) -> Self {
        Self {
            admin_id,
            action,
            target_type: String::new(),
            target_id: None,
            details: Map::new(),
        }
    }

    /// Set the row being acted upon.
    pub fn on_target(mut self, target_type: impl Into<String>, target_id: Uuid) -> Self {
        self.target_type = target_type.into();
        self.target_id = Some(target_id);
        self
    }

    /// Set just the target type (fan-outs have no single row).
    pub fn on_target_type(mut self, target_type: impl Into<String>) -> Self {
        self.target_type = target_type.into();
        self
    }

    /// Add a detail value.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Add a detail value when present.
    pub fn with_optional_detail(
        self,
        key: impl Into<String>,
        value: Option<impl Into<Value>>,
    ) -> Self {
        match value {
            Some(value) => self.with_detail(key, value),
            None => self,
        }
    }

    pub fn build(self) -> NewAdminLog {
        NewAdminLog {
            admin_id: self.admin_id,
            action: self.action,
            target_type: self.target_type,
            target_id: self.target_id,
            details: Value::Object(self.details),
        }
    }
}

/// Convenience functions for common admin log patterns.
pub mod admin_log_helpers {
    use super::*;

    pub fn wave_validated(
        admin_id: Uuid,
        transaction_id: Uuid,
        prestataire_id: Uuid,
        plan_id: Uuid,
        days: i32,
    ) -> NewAdminLog {
        AdminLogBuilder::new(admin_id, AdminAction::ValidateWaveTransaction)
            .on_target("transaction_wave", transaction_id)
            .with_detail("prestataire_id", prestataire_id.to_string())
            .with_detail("plan_id", plan_id.to_string())
            .with_detail("duree_jours", days)
            .build()
    }

    pub fn wave_rejected(admin_id: Uuid, transaction_id: Uuid, motif: &str) -> NewAdminLog {
        AdminLogBuilder::new(admin_id, AdminAction::RejectWaveTransaction)
            .on_target("transaction_wave", transaction_id)
            .with_detail("motif_rejet", motif)
            .build()
    }

    pub fn avis_moderated(
        admin_id: Uuid,
        avis_id: Uuid,
        approve: bool,
        reason: Option<&str>,
    ) -> NewAdminLog {
        AdminLogBuilder::new(admin_id, AdminAction::ModerateAvis)
            .on_target("avis", avis_id)
            .with_detail("approve", approve)
            .with_optional_detail("reason", reason)
            .build()
    }

    pub fn fan_out(
        admin_id: Uuid,
        action: AdminAction,
        recipients: u64,
        titre: &str,
    ) -> NewAdminLog {
        AdminLogBuilder::new(admin_id, action)
            .on_target_type("notification")
            .with_detail("recipients", json!(recipients))
            .with_detail("titre", titre)
            .build()
    }
}

//! Admin action log models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Admin actions recorded in `admin_logs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminAction {
    ValidateWaveTransaction,
    RejectWaveTransaction,
    CreatePlan,
    UpdatePlan,
    ModerateAvis,
    DeleteAvis,
    BroadcastNotification,
    TargetedNotification,
    TemplateNotification,
}

impl AdminAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminAction::ValidateWaveTransaction => "validate_wave_transaction",
            AdminAction::RejectWaveTransaction => "reject_wave_transaction",
            AdminAction::CreatePlan => "create_plan",
            AdminAction::UpdatePlan => "update_plan",
            AdminAction::ModerateAvis => "moderate_avis",
            AdminAction::DeleteAvis => "delete_avis",
            AdminAction::BroadcastNotification => "broadcast_notification",
            AdminAction::TargetedNotification => "targeted_notification",
            AdminAction::TemplateNotification => "template_notification",
        }
    }
}

impl std::fmt::Display for AdminAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry ready to be inserted in `admin_logs`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAdminLog {
    pub admin_id: Uuid,
    pub action: AdminAction,
    pub target_type: String,
    pub target_id: Option<Uuid>,
    pub details: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_str_matches_serde() {
        for action in [
            AdminAction::ValidateWaveTransaction,
            AdminAction::ModerateAvis,
            AdminAction::TemplateNotification,
        ] {
            let json = serde_json::to_string(&action).unwrap();
            assert_eq!(json, format!("\"{}\"", action.as_str()));
        }
    }
}

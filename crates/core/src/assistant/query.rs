//! The closed set of questions the chat front end may ask.

use serde::{Deserialize, Serialize};
use stokvel_shared::types::{StokvelId, UserId};

/// Maximum rows returned by a payment history query.
pub const PAYMENT_HISTORY_LIMIT: u64 = 50;

/// A single typed query, tagged by `tool` on the wire.
///
/// ```json
/// {"tool": "simulate_emergency_withdrawal", "user_id": "...", "stokvel_id": "..."}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum AssistantQuery {
    /// Every stokvel.
    ListStokvels,
    /// One stokvel with enrollment and payment counts.
    GetStokvel {
        /// Stokvel to describe.
        stokvel_id: StokvelId,
    },
    /// Members enrolled in a stokvel.
    StokvelMembers {
        /// Stokvel to list.
        stokvel_id: StokvelId,
    },
    /// Stokvels a member belongs to.
    UserStokvels {
        /// Member to look up.
        user_id: UserId,
    },
    /// Latest payments, newest first, optionally filtered.
    PaymentHistory {
        /// Restrict to one member.
        #[serde(default)]
        user_id: Option<UserId>,
        /// Restrict to one stokvel.
        #[serde(default)]
        stokvel_id: Option<StokvelId>,
    },
    /// Membership and ledger totals.
    StokvelStatistics {
        /// Stokvel to summarize.
        stokvel_id: StokvelId,
    },
    /// What an emergency withdrawal would pay out. Never moves money.
    SimulateEmergencyWithdrawal {
        /// Member asking.
        user_id: UserId,
        /// Fund they would leave.
        stokvel_id: StokvelId,
    },
    /// Case-insensitive name search.
    SearchStokvels {
        /// Substring to match.
        term: String,
    },
}

impl AssistantQuery {
    /// Wire name of the tool.
    #[must_use]
    pub const fn tool_name(&self) -> &'static str {
        match self {
            Self::ListStokvels => "list_stokvels",
            Self::GetStokvel { .. } => "get_stokvel",
            Self::StokvelMembers { .. } => "stokvel_members",
            Self::UserStokvels { .. } => "user_stokvels",
            Self::PaymentHistory { .. } => "payment_history",
            Self::StokvelStatistics { .. } => "stokvel_statistics",
            Self::SimulateEmergencyWithdrawal { .. } => "simulate_emergency_withdrawal",
            Self::SearchStokvels { .. } => "search_stokvels",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_unit_tool() {
        let query: AssistantQuery = serde_json::from_value(json!({"tool": "list_stokvels"})).unwrap();
        assert_eq!(query, AssistantQuery::ListStokvels);
    }

    #[test]
    fn test_parse_simulation() {
        let user_id = UserId::new();
        let stokvel_id = StokvelId::new();
        let query: AssistantQuery = serde_json::from_value(json!({
            "tool": "simulate_emergency_withdrawal",
            "user_id": user_id,
            "stokvel_id": stokvel_id,
        }))
        .unwrap();

        assert_eq!(
            query,
            AssistantQuery::SimulateEmergencyWithdrawal {
                user_id,
                stokvel_id
            }
        );
        assert_eq!(query.tool_name(), "simulate_emergency_withdrawal");
    }

    #[test]
    fn test_payment_history_filters_are_optional() {
        let query: AssistantQuery =
            serde_json::from_value(json!({"tool": "payment_history"})).unwrap();
        assert_eq!(
            query,
            AssistantQuery::PaymentHistory {
                user_id: None,
                stokvel_id: None
            }
        );
    }

    #[test]
    fn test_unknown_tool_is_rejected() {
        let result: Result<AssistantQuery, _> =
            serde_json::from_value(json!({"tool": "transfer_funds", "amount": 100}));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_argument_is_rejected() {
        let result: Result<AssistantQuery, _> =
            serde_json::from_value(json!({"tool": "get_stokvel"}));
        assert!(result.is_err());
    }
}

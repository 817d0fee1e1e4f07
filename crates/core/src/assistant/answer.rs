//! Typed answers and their plain-text rendering.

use std::fmt::Write as _;

use rust_decimal::Decimal;
use serde::Serialize;

use super::directory::{
    MemberSummary, PaymentRecord, SearchHit, StatisticsReport, StokvelDetail, StokvelSummary,
    UserStokvel,
};
use crate::withdrawal::WithdrawalQuote;

/// The result of an [`AssistantQuery`](super::AssistantQuery).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum AssistantAnswer {
    /// `list_stokvels`.
    Stokvels(Vec<StokvelSummary>),
    /// `get_stokvel`; `None` when the ID is unknown.
    Stokvel(Option<StokvelDetail>),
    /// `stokvel_members`.
    Members(Vec<MemberSummary>),
    /// `user_stokvels`.
    Memberships(Vec<UserStokvel>),
    /// `payment_history`.
    Payments(Vec<PaymentRecord>),
    /// `stokvel_statistics`; `None` when the ID is unknown.
    Statistics(Option<StatisticsReport>),
    /// `simulate_emergency_withdrawal` succeeded.
    WithdrawalSimulation(WithdrawalQuote),
    /// `simulate_emergency_withdrawal` was refused.
    WithdrawalUnavailable {
        /// Human-readable reason.
        reason: String,
        /// Machine error code.
        code: String,
        /// Fund value when liquidity was the problem.
        available_amount: Option<i64>,
    },
    /// `search_stokvels`.
    SearchResults(Vec<SearchHit>),
}

impl AssistantAnswer {
    /// Renders a short sentence using only the figures in the answer.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Stokvels(list) if list.is_empty() => "There are no stokvels yet.".to_string(),
            Self::Stokvels(list) => format!(
                "There are {} stokvels: {}.",
                list.len(),
                join(list.iter().map(|s| s.name.as_str()))
            ),
            Self::Stokvel(None) | Self::Statistics(None) => {
                "No stokvel was found with that ID.".to_string()
            }
            Self::Stokvel(Some(detail)) => format!(
                "{} is saving for {} with {} of {} members enrolled, a net value of {} and {} payments recorded.",
                detail.stokvel.name,
                detail.stokvel.goal,
                detail.current_enrollments,
                detail.stokvel.number_people,
                detail.stokvel.net_value,
                detail.total_payments_made
            ),
            Self::Members(members) if members.is_empty() => {
                "Nobody is enrolled in that stokvel.".to_string()
            }
            Self::Members(members) => format!(
                "{} members are enrolled: {}.",
                members.len(),
                join(members.iter().map(|m| m.name.as_str()))
            ),
            Self::Memberships(list) if list.is_empty() => {
                "That member is not enrolled in any stokvel.".to_string()
            }
            Self::Memberships(list) => format!(
                "Enrolled in {} stokvels: {}.",
                list.len(),
                join(list.iter().map(|s| s.stokvel_name.as_str()))
            ),
            Self::Payments(payments) => describe_payments(payments),
            Self::Statistics(Some(report)) => {
                let stats = &report.statistics;
                format!(
                    "{} has {} members ({} admins), {} payments totalling {} with an average of {}, and a net value of {}.",
                    report.stokvel_name,
                    stats.member_count,
                    stats.admin_count,
                    stats.payment_count,
                    stats.total_payments,
                    stats.average_payment,
                    stats.net_value
                )
            }
            Self::WithdrawalSimulation(quote) => format!(
                "Your contributions total {}. An emergency withdrawal carries a {}% penalty of {}, so you would receive {}. This is a simulation; nothing has been withdrawn.",
                quote.total_contributions,
                percent(quote.penalty_rate),
                quote.penalty_amount,
                quote.withdrawal_amount
            ),
            Self::WithdrawalUnavailable { reason, .. } => {
                format!("An emergency withdrawal is not possible: {reason}.")
            }
            Self::SearchResults(hits) if hits.is_empty() => {
                "No stokvels match that name.".to_string()
            }
            Self::SearchResults(hits) => format!(
                "Found {} matching stokvels: {}.",
                hits.len(),
                join(hits.iter().map(|h| h.name.as_str()))
            ),
        }
    }
}

fn describe_payments(payments: &[PaymentRecord]) -> String {
    if payments.is_empty() {
        return "No payments were found.".to_string();
    }

    let current = payments.iter().filter(|p| p.status.is_current()).count();
    let mut text = format!(
        "Showing {} payments, {} of them made this month.",
        payments.len(),
        current
    );
    if let Some(latest) = payments.first() {
        let _ = write!(
            text,
            " The latest is {} from {} to {} on {}.",
            latest.amount,
            latest.user_name,
            latest.stokvel_name,
            latest.paid_at.date_naive()
        );
    }
    text
}

fn percent(rate: Decimal) -> Decimal {
    (rate * Decimal::ONE_HUNDRED).normalize()
}

fn join<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use stokvel_shared::types::{EnrollmentId, StokvelId, UserId};

    #[test]
    fn test_simulation_text_uses_quote_figures() {
        let answer = AssistantAnswer::WithdrawalSimulation(WithdrawalQuote {
            user_id: UserId::new(),
            stokvel_id: StokvelId::new(),
            enrollment_id: EnrollmentId::new(),
            total_contributions: dec!(1550),
            penalty_rate: dec!(0.10),
            penalty_amount: dec!(155.0),
            withdrawal_amount: dec!(1395.0),
            current_fund_value: 5000,
        });

        let text = answer.describe();
        assert!(text.contains("1550"));
        assert!(text.contains("10%"));
        assert!(text.contains("155.0"));
        assert!(text.contains("1395.0"));
        assert!(text.contains("simulation"));
    }

    #[test]
    fn test_unavailable_text_states_balance_once() {
        let answer = AssistantAnswer::WithdrawalUnavailable {
            reason: "insufficient funds in stokvel: 500 available".to_string(),
            code: "INSUFFICIENT_FUND_LIQUIDITY".to_string(),
            available_amount: Some(500),
        };
        let text = answer.describe();
        assert_eq!(
            text,
            "An emergency withdrawal is not possible: insufficient funds in stokvel: 500 available."
        );
        assert_eq!(text.matches("500").count(), 1);
    }

    #[test]
    fn test_empty_answers() {
        assert_eq!(
            AssistantAnswer::Stokvels(vec![]).describe(),
            "There are no stokvels yet."
        );
        assert_eq!(
            AssistantAnswer::Stokvel(None).describe(),
            "No stokvel was found with that ID."
        );
        assert_eq!(
            AssistantAnswer::Payments(vec![]).describe(),
            "No payments were found."
        );
    }

    #[test]
    fn test_serialized_shape() {
        let answer = AssistantAnswer::WithdrawalUnavailable {
            reason: "no contributions found for this member in this stokvel".to_string(),
            code: "NO_CONTRIBUTIONS".to_string(),
            available_amount: None,
        };
        let value = serde_json::to_value(&answer).unwrap();
        assert_eq!(value["kind"], "withdrawal_unavailable");
        assert_eq!(value["data"]["code"], "NO_CONTRIBUTIONS");
    }
}

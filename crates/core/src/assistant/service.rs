//! Dispatches assistant queries.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::answer::AssistantAnswer;
use super::directory::{DirectoryError, PaymentFilter, PaymentRecord, StokvelDirectory};
use super::query::{AssistantQuery, PAYMENT_HISTORY_LIMIT};
use crate::contribution::evaluate_payment_status;
use crate::withdrawal::{WithdrawalRequest, WithdrawalService, WithdrawalStore};

/// Answers [`AssistantQuery`] values from a directory and a withdrawal store.
#[derive(Debug, Default, Clone)]
pub struct AssistantService {
    withdrawals: WithdrawalService,
}

impl AssistantService {
    /// Creates a service that simulates withdrawals through `withdrawals`.
    #[must_use]
    pub const fn new(withdrawals: WithdrawalService) -> Self {
        Self { withdrawals }
    }

    /// Answers a query as of now.
    pub async fn answer<D, S>(
        &self,
        query: AssistantQuery,
        directory: &D,
        store: &S,
    ) -> Result<AssistantAnswer, DirectoryError>
    where
        D: StokvelDirectory + ?Sized,
        S: WithdrawalStore + ?Sized,
    {
        self.answer_at(query, directory, store, Utc::now()).await
    }

    /// Answers a query, deriving payment statuses against `now`.
    pub async fn answer_at<D, S>(
        &self,
        query: AssistantQuery,
        directory: &D,
        store: &S,
        now: DateTime<Utc>,
    ) -> Result<AssistantAnswer, DirectoryError>
    where
        D: StokvelDirectory + ?Sized,
        S: WithdrawalStore + ?Sized,
    {
        debug!(tool = query.tool_name(), "Answering assistant query");

        let answer = match query {
            AssistantQuery::ListStokvels => AssistantAnswer::Stokvels(directory.list_stokvels().await?),
            AssistantQuery::GetStokvel { stokvel_id } => {
                AssistantAnswer::Stokvel(directory.get_stokvel(stokvel_id).await?)
            }
            AssistantQuery::StokvelMembers { stokvel_id } => {
                AssistantAnswer::Members(directory.stokvel_members(stokvel_id).await?)
            }
            AssistantQuery::UserStokvels { user_id } => {
                AssistantAnswer::Memberships(directory.user_stokvels(user_id).await?)
            }
            AssistantQuery::PaymentHistory {
                user_id,
                stokvel_id,
            } => {
                let filter = PaymentFilter {
                    user_id,
                    stokvel_id,
                };
                let rows = directory.payment_history(filter, PAYMENT_HISTORY_LIMIT).await?;
                AssistantAnswer::Payments(
                    rows.into_iter()
                        .map(|row| {
                            let status = evaluate_payment_status(Some(&row.paid_at), &now);
                            PaymentRecord::from_row(row, status)
                        })
                        .collect(),
                )
            }
            AssistantQuery::StokvelStatistics { stokvel_id } => {
                AssistantAnswer::Statistics(directory.stokvel_statistics(stokvel_id).await?)
            }
            AssistantQuery::SimulateEmergencyWithdrawal {
                user_id,
                stokvel_id,
            } => {
                let request = WithdrawalRequest {
                    user_id,
                    stokvel_id,
                };
                match self.withdrawals.simulate(store, request).await {
                    Ok(quote) => AssistantAnswer::WithdrawalSimulation(quote),
                    Err(e) => AssistantAnswer::WithdrawalUnavailable {
                        reason: e.to_string(),
                        code: e.error_code().to_string(),
                        available_amount: e.available_amount(),
                    },
                }
            }
            AssistantQuery::SearchStokvels { term } => {
                AssistantAnswer::SearchResults(directory.search_stokvels(term.trim()).await?)
            }
        };

        Ok(answer)
    }
}

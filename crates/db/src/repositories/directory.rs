//! Read-only directory queries backing the assistant.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use stokvel_core::assistant::{
    DirectoryError, MemberSummary, PaymentFilter, PaymentRow, SearchHit, StatisticsReport,
    StokvelDetail, StokvelDirectory, StokvelSummary, UserStokvel,
};
use stokvel_core::stokvel::StokvelStatistics;
use stokvel_shared::types::{PaymentId, StokvelId, UserId};
use uuid::Uuid;

use crate::entities::{payments, stokvel_enrollments, stokvels, users};

#[allow(clippy::needless_pass_by_value)]
fn db_err(e: DbErr) -> DirectoryError {
    DirectoryError(e.to_string())
}

/// Converts a stokvel row into its listed form.
#[must_use]
pub fn summary(model: stokvels::Model) -> StokvelSummary {
    StokvelSummary {
        id: StokvelId::from(model.id),
        name: model.name,
        number_people: model.number_people,
        goal: model.goal,
        monthly_contribution: model.monthly_contribution,
        net_value: model.net_value,
        interest_rate: model.interest_rate,
        started_at: model.started_at,
        end_at: model.end_at,
    }
}

/// Escapes `LIKE` wildcards and lowercases a search term.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// [`StokvelDirectory`] over a `SeaORM` connection.
#[derive(Debug, Clone)]
pub struct DirectoryRepository {
    db: DatabaseConnection,
}

impl DirectoryRepository {
    /// Creates a new directory repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn enrollment_count(&self, stokvel_id: Uuid, admins_only: bool) -> Result<u64, DbErr> {
        let mut query = stokvel_enrollments::Entity::find()
            .filter(stokvel_enrollments::Column::StokvelId.eq(stokvel_id));
        if admins_only {
            query = query.filter(stokvel_enrollments::Column::IsAdmin.eq(true));
        }
        query.count(&self.db).await
    }

    async fn member_counts(&self, stokvel_ids: Vec<Uuid>) -> Result<HashMap<Uuid, u64>, DbErr> {
        let rows: Vec<(Uuid, i64)> = stokvel_enrollments::Entity::find()
            .filter(stokvel_enrollments::Column::StokvelId.is_in(stokvel_ids))
            .select_only()
            .column(stokvel_enrollments::Column::StokvelId)
            .column_as(Expr::col(stokvel_enrollments::Column::Id).count(), "members")
            .group_by(stokvel_enrollments::Column::StokvelId)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, n)| (id, u64::try_from(n).unwrap_or(0)))
            .collect())
    }
}

#[async_trait]
impl StokvelDirectory for DirectoryRepository {
    async fn list_stokvels(&self) -> Result<Vec<StokvelSummary>, DirectoryError> {
        let rows = stokvels::Entity::find()
            .order_by_asc(stokvels::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(rows.into_iter().map(summary).collect())
    }

    async fn get_stokvel(
        &self,
        stokvel_id: StokvelId,
    ) -> Result<Option<StokvelDetail>, DirectoryError> {
        let id = stokvel_id.into_inner();
        let Some(model) = stokvels::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        let current_enrollments = self.enrollment_count(id, false).await.map_err(db_err)?;
        let total_payments_made = payments::Entity::find()
            .filter(payments::Column::StokvelId.eq(id))
            .count(&self.db)
            .await
            .map_err(db_err)?;

        Ok(Some(StokvelDetail {
            stokvel: summary(model),
            current_enrollments,
            total_payments_made,
        }))
    }

    async fn stokvel_members(
        &self,
        stokvel_id: StokvelId,
    ) -> Result<Vec<MemberSummary>, DirectoryError> {
        let rows = stokvel_enrollments::Entity::find()
            .filter(stokvel_enrollments::Column::StokvelId.eq(stokvel_id.into_inner()))
            .order_by_asc(stokvel_enrollments::Column::EnrolledAt)
            .find_also_related(users::Entity)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .filter_map(|(enrollment, user)| {
                user.map(|u| MemberSummary {
                    user_id: UserId::from(u.id),
                    name: u.full_name(),
                    email: u.email,
                    is_admin: enrollment.is_admin,
                    enrolled_at: enrollment.enrolled_at,
                })
            })
            .collect())
    }

    async fn user_stokvels(&self, user_id: UserId) -> Result<Vec<UserStokvel>, DirectoryError> {
        let rows = stokvel_enrollments::Entity::find()
            .filter(stokvel_enrollments::Column::UserId.eq(user_id.into_inner()))
            .order_by_asc(stokvel_enrollments::Column::EnrolledAt)
            .find_also_related(stokvels::Entity)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .filter_map(|(enrollment, stokvel)| {
                stokvel.map(|s| UserStokvel {
                    stokvel_id: StokvelId::from(s.id),
                    stokvel_name: s.name,
                    monthly_contribution: s.monthly_contribution,
                    net_value: s.net_value,
                    is_admin: enrollment.is_admin,
                    enrolled_at: enrollment.enrolled_at,
                })
            })
            .collect())
    }

    async fn payment_history(
        &self,
        filter: PaymentFilter,
        limit: u64,
    ) -> Result<Vec<PaymentRow>, DirectoryError> {
        let mut query = payments::Entity::find();
        if let Some(user_id) = filter.user_id {
            query = query.filter(payments::Column::UserId.eq(user_id.into_inner()));
        }
        if let Some(stokvel_id) = filter.stokvel_id {
            query = query.filter(payments::Column::StokvelId.eq(stokvel_id.into_inner()));
        }

        let rows = query
            .order_by_desc(payments::Column::PaidAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        if rows.is_empty() {
            return Ok(vec![]);
        }

        let user_ids: Vec<Uuid> = rows.iter().map(|p| p.user_id).collect();
        let stokvel_ids: Vec<Uuid> = rows.iter().map(|p| p.stokvel_id).collect();

        let user_names: HashMap<Uuid, String> = users::Entity::find()
            .filter(users::Column::Id.is_in(user_ids))
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|u| (u.id, u.full_name()))
            .collect();

        let stokvel_names: HashMap<Uuid, String> = stokvels::Entity::find()
            .filter(stokvels::Column::Id.is_in(stokvel_ids))
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|s| (s.id, s.name))
            .collect();

        Ok(rows
            .into_iter()
            .map(|p| PaymentRow {
                payment_id: PaymentId::from(p.id),
                user_id: UserId::from(p.user_id),
                user_name: user_names
                    .get(&p.user_id)
                    .cloned()
                    .unwrap_or_else(|| "Unknown User".to_string()),
                stokvel_id: StokvelId::from(p.stokvel_id),
                stokvel_name: stokvel_names
                    .get(&p.stokvel_id)
                    .cloned()
                    .unwrap_or_else(|| "Unknown Stokvel".to_string()),
                amount: p.amount,
                paid_at: p.paid_at_local(),
            })
            .collect())
    }

    async fn stokvel_statistics(
        &self,
        stokvel_id: StokvelId,
    ) -> Result<Option<StatisticsReport>, DirectoryError> {
        let id = stokvel_id.into_inner();
        let Some(model) = stokvels::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        let member_count = self.enrollment_count(id, false).await.map_err(db_err)?;
        let admin_count = self.enrollment_count(id, true).await.map_err(db_err)?;

        let (payment_count, total): (i64, Option<Decimal>) = payments::Entity::find()
            .filter(payments::Column::StokvelId.eq(id))
            .select_only()
            .column_as(Expr::col(payments::Column::Id).count(), "payment_count")
            .column_as(Expr::col(payments::Column::Amount).sum(), "total")
            .into_tuple()
            .one(&self.db)
            .await
            .map_err(db_err)?
            .unwrap_or((0, None));

        Ok(Some(StatisticsReport {
            statistics: StokvelStatistics::from_totals(
                member_count,
                admin_count,
                model.net_value,
                u64::try_from(payment_count).unwrap_or_default(),
                total.unwrap_or(Decimal::ZERO),
            ),
            stokvel_name: model.name,
            goal: model.goal,
            target_monthly_contribution: model.monthly_contribution,
            interest_rate: model.interest_rate,
        }))
    }

    async fn search_stokvels(&self, term: &str) -> Result<Vec<SearchHit>, DirectoryError> {
        let rows = stokvels::Entity::find()
            .filter(Expr::expr(Func::lower(Expr::col(stokvels::Column::Name))).like(like_pattern(term)))
            .order_by_asc(stokvels::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let counts = self
            .member_counts(rows.iter().map(|s| s.id).collect())
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|s| SearchHit {
                member_count: counts.get(&s.id).copied().unwrap_or(0),
                id: StokvelId::from(s.id),
                name: s.name,
                goal: s.goal,
                monthly_contribution: s.monthly_contribution,
                net_value: s.net_value,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Burial"), "%burial%");
        assert_eq!(like_pattern("100%_club"), "%100\\%\\_club%");
    }
}

//! `SeaORM` Entity for payments table.
//!
//! `paid_at` is stored as an instant; `paid_offset_seconds` keeps the UTC
//! offset it was recorded in.

use chrono::{DateTime, FixedOffset};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub stokvel_id: Uuid,
    #[sea_orm(column_type = "Decimal(None)")]
    pub amount: Decimal,
    pub paid_at: DateTimeWithTimeZone,
    pub paid_offset_seconds: i32,
    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// The payment instant in the offset it was recorded in.
    #[must_use]
    pub fn paid_at_local(&self) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(self.paid_offset_seconds)
            .map_or(self.paid_at, |offset| self.paid_at.with_timezone(&offset))
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::stokvels::Entity",
        from = "Column::StokvelId",
        to = "super::stokvels::Column::Id"
    )]
    Stokvels,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::stokvels::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stokvels.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

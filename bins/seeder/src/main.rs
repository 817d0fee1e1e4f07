//! Database seeder for local development.
//!
//! Creates one demo stokvel with an admin and a contributing member whose
//! history matches the emergency withdrawal walkthrough: a 5000 fund and
//! contributions of 500, 750 and 300.
//!
//! Usage: cargo run --bin seeder

use anyhow::{Context, bail};
use chrono::{DateTime, FixedOffset, Months, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use stokvel_core::contribution::recorded_at;
use stokvel_core::stokvel::NewStokvel;
use stokvel_db::entities::{stokvels, users};
use stokvel_db::repositories::CreateUserInput;
use stokvel_db::{EnrollmentRepository, PaymentRepository, StokvelRepository, UserRepository};
use stokvel_shared::AppConfig;
use tracing::info;

const DEMO_STOKVEL: &str = "Emergency Test Stokvel";
const DEMO_PASSWORD: &str = "testpass123";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stokvel=info".into()),
        )
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    let db = stokvel_db::connect(&config.database.url, 2, 1)
        .await
        .context("failed to connect to database")?;

    if stokvels::Entity::find()
        .filter(stokvels::Column::Name.eq(DEMO_STOKVEL))
        .one(&db)
        .await?
        .is_some()
    {
        info!("Demo stokvel already exists, skipping");
        return Ok(());
    }

    let tz = config.contributions.timezone;
    let now = recorded_at(Utc::now(), tz);

    let stokvel = StokvelRepository::new(db.clone())
        .create(NewStokvel {
            name: DEMO_STOKVEL.to_string(),
            number_people: 5,
            goal: "Test emergency withdrawal".to_string(),
            monthly_contribution: dec!(1000),
            net_value: 5000,
            interest_rate: dec!(3),
            started_at: months_ago(now, 3)?,
            end_at: None,
        })
        .await?;

    let admin = seed_user(&db, "Nomsa", "Dlamini", "nomsa.dlamini@example.com").await?;
    let member = seed_user(&db, "John", "Doe", "john.doe@example.com").await?;

    let enrollments = EnrollmentRepository::new(db.clone());
    enrollments.enroll(admin.id, stokvel.id, true).await?;
    enrollments.enroll(member.id, stokvel.id, false).await?;

    let payments = PaymentRepository::new(db.clone());
    let history: [(Decimal, u32); 3] = [(dec!(500), 2), (dec!(750), 1), (dec!(300), 0)];
    for (amount, age) in history {
        payments
            .record(member.id, stokvel.id, amount, months_ago(now, age)?)
            .await?;
    }

    info!(
        stokvel_id = %stokvel.id,
        member_id = %member.id,
        "Seeded demo stokvel; simulate a withdrawal for the member to see 1550 / 155 / 1395"
    );
    Ok(())
}

fn months_ago(
    now: DateTime<FixedOffset>,
    months: u32,
) -> anyhow::Result<DateTime<FixedOffset>> {
    now.checked_sub_months(Months::new(months))
        .with_context(|| format!("cannot step back {months} months from {now}"))
}

async fn seed_user(
    db: &DatabaseConnection,
    name: &str,
    surname: &str,
    email: &str,
) -> anyhow::Result<users::Model> {
    let repo = UserRepository::new(db.clone());
    if repo.email_exists(email).await? {
        bail!("{email} is already registered; drop the database or run `migrator fresh`");
    }

    let user = repo
        .create(CreateUserInput {
            name: name.to_string(),
            surname: surname.to_string(),
            email: Some(email.to_string()),
            id_number: None,
            password: DEMO_PASSWORD.to_string(),
        })
        .await?;

    info!(user_id = %user.id, email, "Seeded member");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_months_ago_clamps_to_month_end() {
        let sast = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = sast.with_ymd_and_hms(2025, 3, 31, 9, 0, 0).unwrap();
        let earlier = months_ago(now, 1).unwrap();
        assert_eq!(earlier, sast.with_ymd_and_hms(2025, 2, 28, 9, 0, 0).unwrap());
    }
}

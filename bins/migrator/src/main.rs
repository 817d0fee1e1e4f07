//! Database migration runner.
//!
//! Usage:
//!   migrator up      - Apply pending migrations
//!   migrator down    - Roll back the last migration
//!   migrator status  - Show applied and pending migrations
//!   migrator fresh   - Drop every table and migrate from scratch

use sea_orm_migration::prelude::*;
use stokvel_db::migration::Migrator;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Reads DATABASE_URL and installs its own subscriber.
    cli::run_cli(Migrator).await;
}

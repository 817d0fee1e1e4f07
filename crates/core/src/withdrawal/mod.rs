//! Emergency withdrawal engine.
//!
//! A member may leave a fund mid-cycle by withdrawing their net position
//! minus a fixed penalty:
//! - `calculator` - pure penalty, liquidity and plan arithmetic
//! - `store` - the persistence boundary the engine reads and commits through
//! - `locks` - per-fund serialization
//! - `service` - simulation and execution

pub mod calculator;
pub mod error;
pub mod locks;
pub mod service;
pub mod store;
pub mod types;

#[cfg(test)]
mod calculator_props;

pub use calculator::{EMERGENCY_PENALTY_RATE, penalty_split};
pub use error::{StoreError, WithdrawalError};
pub use locks::{FundGuard, FundLocks};
pub use service::WithdrawalService;
pub use store::{WithdrawalStore, WithdrawalUnit};
pub use types::{
    Committed, EnrollmentRef, FundBalance, NewPayment, WithdrawalPlan, WithdrawalQuote,
    WithdrawalReceipt, WithdrawalRequest,
};

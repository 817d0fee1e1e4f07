//! Contribution-period accounting.
//!
//! A payment is "current" when it falls inside the calendar month that
//! contains the evaluation instant, measured in the payment's own offset.
//! Status is always derived from the payment date and never stored.

pub mod status;

#[cfg(test)]
mod status_props;

pub use status::{
    ContributionEntry, MemberStanding, MonthWindow, PaymentStatus, evaluate_payment_status,
    member_standing, recorded_at,
};

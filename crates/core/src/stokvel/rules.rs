//! Validation rules for stokvels, enrollments and contributions.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::StokvelError;

/// Input for creating a stokvel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStokvel {
    /// Display name.
    pub name: String,
    /// Target number of members.
    pub number_people: i32,
    /// What the group is saving towards.
    pub goal: String,
    /// Expected contribution per member per month.
    pub monthly_contribution: Decimal,
    /// Opening net value in whole currency units.
    pub net_value: i64,
    /// Interest rate as a percentage.
    pub interest_rate: Decimal,
    /// When the stokvel starts.
    pub started_at: DateTime<FixedOffset>,
    /// When the stokvel ends, if fixed.
    pub end_at: Option<DateTime<FixedOffset>>,
}

impl NewStokvel {
    /// Checks the stokvel definition.
    ///
    /// # Errors
    ///
    /// Returns the first rule the input breaks.
    pub fn validate(&self) -> Result<(), StokvelError> {
        if self.name.trim().is_empty() {
            return Err(StokvelError::EmptyName);
        }
        if self.number_people < 1 {
            return Err(StokvelError::InvalidGroupSize);
        }
        if self.monthly_contribution <= Decimal::ZERO {
            return Err(StokvelError::InvalidMonthlyContribution);
        }
        if self.net_value < 0 {
            return Err(StokvelError::NegativeNetValue);
        }
        if self.interest_rate < Decimal::ZERO {
            return Err(StokvelError::NegativeInterestRate);
        }
        if self.end_at.is_some_and(|end| end <= self.started_at) {
            return Err(StokvelError::EndBeforeStart);
        }
        Ok(())
    }
}

/// Checks whether one more member may join.
///
/// # Errors
///
/// `AlreadyEnrolled` takes precedence over `StokvelFull`.
pub fn check_enrollment(
    capacity: i32,
    current_members: u64,
    already_enrolled: bool,
) -> Result<(), StokvelError> {
    if already_enrolled {
        return Err(StokvelError::AlreadyEnrolled);
    }
    if current_members >= u64::try_from(capacity).unwrap_or(0) {
        return Err(StokvelError::StokvelFull { capacity });
    }
    Ok(())
}

/// Checks a contribution before it is appended to the ledger.
///
/// # Errors
///
/// Rejects zero or negative amounts and members who are not enrolled.
pub fn validate_contribution(amount: Decimal, enrolled: bool) -> Result<(), StokvelError> {
    if amount <= Decimal::ZERO {
        return Err(StokvelError::NonPositiveContribution);
    }
    if !enrolled {
        return Err(StokvelError::NotEnrolled);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn valid() -> NewStokvel {
        let offset = FixedOffset::east_opt(7200).unwrap();
        NewStokvel {
            name: "Emergency Test Stokvel".to_string(),
            number_people: 5,
            goal: "Year-end groceries".to_string(),
            monthly_contribution: dec!(1000),
            net_value: 5000,
            interest_rate: dec!(3),
            started_at: offset.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            end_at: None,
        }
    }

    #[test]
    fn test_valid_stokvel() {
        assert_eq!(valid().validate(), Ok(()));
    }

    #[rstest]
    #[case::blank_name(NewStokvel { name: "  ".into(), ..valid() }, StokvelError::EmptyName)]
    #[case::zero_people(NewStokvel { number_people: 0, ..valid() }, StokvelError::InvalidGroupSize)]
    #[case::zero_contribution(
        NewStokvel { monthly_contribution: Decimal::ZERO, ..valid() },
        StokvelError::InvalidMonthlyContribution
    )]
    #[case::negative_net(NewStokvel { net_value: -1, ..valid() }, StokvelError::NegativeNetValue)]
    #[case::negative_rate(
        NewStokvel { interest_rate: dec!(-0.5), ..valid() },
        StokvelError::NegativeInterestRate
    )]
    #[case::end_equals_start(
        NewStokvel { end_at: Some(valid().started_at), ..valid() },
        StokvelError::EndBeforeStart
    )]
    fn test_invalid_stokvel(#[case] input: NewStokvel, #[case] expected: StokvelError) {
        assert_eq!(input.validate(), Err(expected));
    }

    #[test]
    fn test_enrollment_rules() {
        assert_eq!(check_enrollment(5, 4, false), Ok(()));
        assert_eq!(
            check_enrollment(5, 5, false),
            Err(StokvelError::StokvelFull { capacity: 5 })
        );
        assert_eq!(check_enrollment(5, 5, true), Err(StokvelError::AlreadyEnrolled));
    }

    #[test]
    fn test_contribution_rules() {
        assert_eq!(validate_contribution(dec!(500), true), Ok(()));
        assert_eq!(
            validate_contribution(Decimal::ZERO, true),
            Err(StokvelError::NonPositiveContribution)
        );
        assert_eq!(
            validate_contribution(dec!(-1395), true),
            Err(StokvelError::NonPositiveContribution)
        );
        assert_eq!(validate_contribution(dec!(10), false), Err(StokvelError::NotEnrolled));
    }
}

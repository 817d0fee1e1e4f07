//! Payment status evaluation.

use chrono::{
    DateTime, Datelike, Days, FixedOffset, Months, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    TimeZone, Utc,
};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// Whether a payment satisfies the current contribution period.
///
/// Serialized as the integer `0` or `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    /// Payment is outside the current calendar month (or has no date).
    NotCurrent = 0,
    /// Payment falls inside the current calendar month.
    Current = 1,
}

impl PaymentStatus {
    /// Returns the integer form used by API consumers.
    #[must_use]
    pub const fn as_i16(self) -> i16 {
        self as i16
    }

    /// Returns true for [`PaymentStatus::Current`].
    #[must_use]
    pub const fn is_current(self) -> bool {
        matches!(self, Self::Current)
    }
}

impl Serialize for PaymentStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i16(self.as_i16())
    }
}

impl<'de> Deserialize<'de> for PaymentStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match i16::deserialize(deserializer)? {
            0 => Ok(Self::NotCurrent),
            1 => Ok(Self::Current),
            other => Err(de::Error::custom(format!(
                "payment status must be 0 or 1, got {other}"
            ))),
        }
    }
}

/// Half-open calendar month `[start, end)` in a fixed offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
    offset: FixedOffset,
}

impl MonthWindow {
    /// Returns the month containing `instant`, in the instant's own offset.
    #[must_use]
    pub fn containing<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        let offset = instant.offset().fix();
        let local_date = instant.naive_local().date();
        let first = first_of_month(local_date);
        // Months arithmetic rolls December over into January of the next year.
        let next = first + Months::new(1);

        Self {
            start: first.and_time(NaiveTime::MIN),
            end: next.and_time(NaiveTime::MIN),
            offset,
        }
    }

    /// Local wall-clock start of the month (inclusive).
    #[must_use]
    pub const fn start_local(&self) -> NaiveDateTime {
        self.start
    }

    /// Local wall-clock start of the next month (exclusive).
    #[must_use]
    pub const fn end_local(&self) -> NaiveDateTime {
        self.end
    }

    /// Offset the window boundaries are expressed in.
    #[must_use]
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Returns true if `instant` lies inside the window.
    ///
    /// `instant` is converted into the window's offset before comparing.
    #[must_use]
    pub fn contains<Tz: TimeZone>(&self, instant: &DateTime<Tz>) -> bool {
        let local = instant.with_timezone(&self.offset).naive_local();
        local >= self.start && local < self.end
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

/// Classifies a payment relative to `now`.
///
/// `now` is normalized into the payment's offset first, so the month window
/// is always computed in the payment's time zone. A missing payment date is
/// never current.
#[must_use]
pub fn evaluate_payment_status<Tz: TimeZone>(
    payment_date: Option<&DateTime<FixedOffset>>,
    now: &DateTime<Tz>,
) -> PaymentStatus {
    let Some(paid_at) = payment_date else {
        return PaymentStatus::NotCurrent;
    };

    let now_local = now.with_timezone(paid_at.offset());
    if MonthWindow::containing(&now_local).contains(paid_at) {
        PaymentStatus::Current
    } else {
        PaymentStatus::NotCurrent
    }
}

/// Timestamp for a payment recorded at `now` in the fund's bookkeeping zone.
#[must_use]
pub fn recorded_at(now: DateTime<Utc>, tz: Tz) -> DateTime<FixedOffset> {
    now.with_timezone(&tz).fixed_offset()
}

/// A single ledger row as seen by the standing calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContributionEntry {
    /// Signed amount; negative rows are withdrawal debits.
    pub amount: Decimal,
    /// When the payment was made.
    pub paid_at: DateTime<FixedOffset>,
}

/// A member's compliance with the monthly contribution obligation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberStanding {
    /// `Current` if any contribution landed in the current month.
    pub status: PaymentStatus,
    /// Most recent positive contribution, if any.
    pub last_contribution_at: Option<DateTime<FixedOffset>>,
    /// Sum of positive contributions made in the current month.
    pub contributed_this_period: Decimal,
}

/// Derives a member's standing for one fund from their ledger rows.
///
/// Withdrawal debits (non-positive amounts) never count toward compliance.
#[must_use]
pub fn member_standing<Tz: TimeZone>(
    entries: &[ContributionEntry],
    now: &DateTime<Tz>,
) -> MemberStanding {
    let mut standing = MemberStanding {
        status: PaymentStatus::NotCurrent,
        last_contribution_at: None,
        contributed_this_period: Decimal::ZERO,
    };

    for entry in entries.iter().filter(|e| e.amount > Decimal::ZERO) {
        if standing
            .last_contribution_at
            .is_none_or(|last| entry.paid_at > last)
        {
            standing.last_contribution_at = Some(entry.paid_at);
        }

        if evaluate_payment_status(Some(&entry.paid_at), now).is_current() {
            standing.status = PaymentStatus::Current;
            standing.contributed_this_period += entry.amount;
        }
    }

    standing
}

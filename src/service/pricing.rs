//! Pure money math for bookings: total resolution, advance splits, the
//! cancellation refund policy, and the platform commission. Everything is
//! integer cents; divisions round down.

use chrono::{DateTime, Utc};

use crate::{
    domain::{BookingStatus, CustomQuote, PaymentType, PricingType},
    error::{AppError, Result},
};

/// Resolution order: an approved custom quote wins, then the package price,
/// then the caller-supplied amount (which must be positive).
pub fn resolve_total_amount(
    pricing_type: PricingType,
    custom_quote: Option<&CustomQuote>,
    package_price_cents: Option<i64>,
    caller_amount_cents: Option<i64>,
) -> Result<i64> {
    if pricing_type == PricingType::CustomQuote {
        if let Some(quote) = custom_quote {
            if quote.approved {
                return Ok(quote.amount_cents);
            }
        }
    }

    if pricing_type == PricingType::Package {
        if let Some(price) = package_price_cents {
            return Ok(price);
        }
    }

    match caller_amount_cents {
        Some(amount) if amount > 0 => Ok(amount),
        Some(_) => Err(AppError::BadRequest(
            "Total amount must be greater than zero".to_string(),
        )),
        None => Err(AppError::BadRequest(
            "No price could be resolved for this booking".to_string(),
        )),
    }
}

pub fn amount_to_pay(total_cents: i64, payment_type: PaymentType, advance_percentage: i64) -> i64 {
    match payment_type {
        PaymentType::Full => total_cents,
        PaymentType::Advance => total_cents * advance_percentage / 100,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefundEligibility {
    Full,
    Half,
}

/// The cancellation-window policy, evaluated at cancel time.
///
/// Pending bookings and in-progress bookings whose start is still outside
/// the window refund in full; inside the window (or once work is under
/// review) the refund halves. Terminal bookings cannot be cancelled at all.
pub fn refund_eligibility(
    status: BookingStatus,
    hours_until_start: i64,
    window_hours: i64,
) -> Result<RefundEligibility> {
    match status {
        BookingStatus::Pending => Ok(RefundEligibility::Full),
        BookingStatus::InProgress => {
            if hours_until_start > window_hours {
                Ok(RefundEligibility::Full)
            } else {
                Ok(RefundEligibility::Half)
            }
        }
        BookingStatus::Review => Ok(RefundEligibility::Half),
        BookingStatus::Completed | BookingStatus::Cancelled => Err(AppError::BadRequest(format!(
            "Cannot cancel a booking that is already {}",
            status.as_str().to_lowercase()
        ))),
        BookingStatus::Declined => Ok(RefundEligibility::Full),
    }
}

pub fn refund_amount(eligibility: RefundEligibility, base_cents: i64) -> i64 {
    match eligibility {
        RefundEligibility::Full => base_cents,
        RefundEligibility::Half => base_cents / 2,
    }
}

/// Refund owed when a booking is cancelled now. The base is what the
/// customer actually paid; a booking with nothing collected refunds zero.
pub fn cancellation_refund(
    status: BookingStatus,
    estimated_start_date: DateTime<Utc>,
    now: DateTime<Utc>,
    window_hours: i64,
    amount_paid_cents: i64,
) -> Result<i64> {
    let hours_until_start = (estimated_start_date - now).num_hours();
    let eligibility = refund_eligibility(status, hours_until_start, window_hours)?;
    Ok(refund_amount(eligibility, amount_paid_cents))
}

pub fn platform_fee(amount_cents: i64, fee_percent: i64) -> i64 {
    amount_cents * fee_percent / 100
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn quote(amount_cents: i64, approved: bool) -> CustomQuote {
        CustomQuote {
            amount_cents,
            approved,
            requested_at: Utc::now(),
            approved_at: approved.then(Utc::now),
        }
    }

    #[test]
    fn approved_quote_wins_total_resolution() {
        let total = resolve_total_amount(
            PricingType::CustomQuote,
            Some(&quote(75_000, true)),
            Some(50_000),
            Some(10_000),
        )
        .unwrap();
        assert_eq!(total, 75_000);
    }

    #[test]
    fn unapproved_quote_falls_back_to_caller_amount() {
        let total = resolve_total_amount(
            PricingType::CustomQuote,
            Some(&quote(75_000, false)),
            None,
            Some(10_000),
        )
        .unwrap();
        assert_eq!(total, 10_000);
    }

    #[test]
    fn package_price_used_for_package_bookings() {
        let total =
            resolve_total_amount(PricingType::Package, None, Some(50_000), Some(99)).unwrap();
        assert_eq!(total, 50_000);
    }

    #[test]
    fn zero_caller_amount_rejected() {
        let err = resolve_total_amount(PricingType::Package, None, None, Some(0)).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn advance_payment_splits_by_percentage() {
        assert_eq!(amount_to_pay(100_000, PaymentType::Advance, 50), 50_000);
        assert_eq!(amount_to_pay(100_000, PaymentType::Full, 50), 100_000);
    }

    #[test]
    fn pending_booking_refunds_in_full() {
        let now = Utc::now();
        let refund =
            cancellation_refund(BookingStatus::Pending, now + Duration::hours(1), now, 24, 40_000)
                .unwrap();
        assert_eq!(refund, 40_000);
    }

    #[test]
    fn in_progress_outside_window_refunds_in_full() {
        let now = Utc::now();
        let refund = cancellation_refund(
            BookingStatus::InProgress,
            now + Duration::hours(48),
            now,
            24,
            40_000,
        )
        .unwrap();
        assert_eq!(refund, 40_000);
    }

    #[test]
    fn in_progress_inside_window_refunds_half() {
        let now = Utc::now();
        let refund = cancellation_refund(
            BookingStatus::InProgress,
            now + Duration::hours(2),
            now,
            24,
            40_000,
        )
        .unwrap();
        assert_eq!(refund, 20_000);
    }

    #[test]
    fn terminal_bookings_cannot_be_cancelled() {
        let now = Utc::now();
        for status in [BookingStatus::Completed, BookingStatus::Cancelled] {
            let err = cancellation_refund(status, now, now, 24, 40_000).unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)));
        }
    }

    #[test]
    fn nothing_paid_refunds_nothing() {
        let now = Utc::now();
        let refund =
            cancellation_refund(BookingStatus::Pending, now + Duration::hours(72), now, 24, 0)
                .unwrap();
        assert_eq!(refund, 0);
    }

    #[test]
    fn platform_fee_is_flat_percentage() {
        assert_eq!(platform_fee(100_000, 10), 10_000);
        assert_eq!(platform_fee(99, 10), 9);
    }
}

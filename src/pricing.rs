// Booking price calculator: nights, total price and guest count for a stay

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingError {
    #[error("Please select check-in and check-out dates.")]
    InvalidDates,

    #[error("Please enter valid numbers for adults and children.")]
    InvalidOccupancy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occupancy {
    pub adults: i32,
    pub children: i32,
}

impl Default for Occupancy {
    fn default() -> Self {
        Self {
            adults: 1,
            children: 0,
        }
    }
}

impl Occupancy {
    pub fn new(adults: i32, children: i32) -> Result<Self, PricingError> {
        let occupancy = Self { adults, children };
        occupancy.validate()?;
        Ok(occupancy)
    }

    /// Reads the guest counts as typed into the booking form.
    pub fn parse(adults: &str, children: &str) -> Result<Self, PricingError> {
        let adults = adults
            .trim()
            .parse::<i32>()
            .map_err(|_| PricingError::InvalidOccupancy)?;
        let children = children
            .trim()
            .parse::<i32>()
            .map_err(|_| PricingError::InvalidOccupancy)?;
        Self::new(adults, children)
    }

    pub fn validate(&self) -> Result<(), PricingError> {
        if self.adults < 1 || self.children < 0 {
            return Err(PricingError::InvalidOccupancy);
        }
        Ok(())
    }

    pub fn total_guests(&self) -> u32 {
        self.adults.max(0) as u32 + self.children.max(0) as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BookingQuote {
    pub nights: i64,
    pub total_price: f64,
    pub total_guests: u32,
}

/// Prices a stay.
///
/// Nights are counted as the absolute day difference plus one, so a same-day
/// range is one night and 2024-06-01..2024-06-03 is three. Guest count is not
/// checked against room capacity here.
pub fn compute_booking(
    price_per_night: f64,
    check_in: Option<NaiveDate>,
    check_out: Option<NaiveDate>,
    adults: i32,
    children: i32,
) -> Result<BookingQuote, PricingError> {
    let (check_in, check_out) = match (check_in, check_out) {
        (Some(check_in), Some(check_out)) => (check_in, check_out),
        _ => return Err(PricingError::InvalidDates),
    };
    let occupancy = Occupancy::new(adults, children)?;

    let nights = (check_out - check_in).num_days().abs() + 1;

    Ok(BookingQuote {
        nights,
        total_price: price_per_night * nights as f64,
        total_guests: occupancy.total_guests(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_reference_scenario() {
        let quote = compute_booking(200.0, date(2024, 6, 1), date(2024, 6, 3), 2, 1).unwrap();
        assert_eq!(quote.nights, 3);
        assert_eq!(quote.total_price, 600.0);
        assert_eq!(quote.total_guests, 3);
    }

    #[test]
    fn test_same_day_counts_one_night() {
        let quote = compute_booking(99.5, date(2024, 6, 1), date(2024, 6, 1), 1, 0).unwrap();
        assert_eq!(quote.nights, 1);
        assert_eq!(quote.total_price, 99.5);
    }

    #[test]
    fn test_reversed_dates_use_absolute_difference() {
        let quote = compute_booking(100.0, date(2024, 6, 5), date(2024, 6, 1), 1, 0).unwrap();
        assert_eq!(quote.nights, 5);
    }

    #[test]
    fn test_total_is_exact_product() {
        for price in [0.01, 89.99, 120.5, 1999.0] {
            for days in 0..30i64 {
                let check_in = date(2024, 1, 1).unwrap();
                let check_out = check_in + chrono::Duration::days(days);
                let quote =
                    compute_booking(price, Some(check_in), Some(check_out), 1, 0).unwrap();
                assert_eq!(quote.total_price, price * quote.nights as f64);
            }
        }
    }

    #[test_case(None, date(2024, 6, 3), 1, 0; "#1 missing check-in")]
    #[test_case(date(2024, 6, 1), None, 1, 0; "#2 missing check-out")]
    #[test_case(None, None, 0, -1; "#3 dates checked before occupancy")]
    fn test_invalid_dates(
        check_in: Option<NaiveDate>,
        check_out: Option<NaiveDate>,
        adults: i32,
        children: i32,
    ) {
        assert_eq!(
            compute_booking(150.0, check_in, check_out, adults, children),
            Err(PricingError::InvalidDates)
        );
    }

    #[test_case(0, 0; "#1 no adults")]
    #[test_case(0, 2; "#2 children only")]
    #[test_case(2, -1; "#3 negative children")]
    fn test_invalid_occupancy(adults: i32, children: i32) {
        assert_eq!(
            compute_booking(150.0, date(2024, 6, 1), date(2024, 6, 2), adults, children),
            Err(PricingError::InvalidOccupancy)
        );
    }

    #[test]
    fn test_minimum_occupancy_accepted() {
        let quote = compute_booking(150.0, date(2024, 6, 1), date(2024, 6, 2), 1, 0).unwrap();
        assert_eq!(quote.total_guests, 1);
    }

    #[test]
    fn test_large_party_not_capped() {
        let quote = compute_booking(10.0, date(2024, 6, 1), date(2024, 6, 2), 40, 25).unwrap();
        assert_eq!(quote.total_guests, 65);
    }

    #[test]
    fn test_occupancy_parse() {
        assert_eq!(Occupancy::parse(" 2 ", "0"), Ok(Occupancy { adults: 2, children: 0 }));
        assert_eq!(Occupancy::parse("two", "0"), Err(PricingError::InvalidOccupancy));
        assert_eq!(Occupancy::parse("1.5", "0"), Err(PricingError::InvalidOccupancy));
        assert_eq!(Occupancy::parse("1", ""), Err(PricingError::InvalidOccupancy));
        assert_eq!(Occupancy::parse("0", "1"), Err(PricingError::InvalidOccupancy));
    }
}

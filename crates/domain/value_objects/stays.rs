use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Half-open stay interval `[check_in, check_out)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayDates {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StayDatesError {
    #[error("check_out must be after check_in")]
    EmptyRange,
}

impl StayDates {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, StayDatesError> {
        if check_out <= check_in {
            return Err(StayDatesError::EmptyRange);
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    pub fn overlaps(&self, check_in: NaiveDate, check_out: NaiveDate) -> bool {
        ranges_overlap(self.check_in, self.check_out, check_in, check_out)
    }
}

/// `[a1, a2)` and `[b1, b2)` overlap iff `a1 < b2 && a2 > b1`.
pub fn ranges_overlap(a1: NaiveDate, a2: NaiveDate, b1: NaiveDate, b2: NaiveDate) -> bool {
    a1 < b2 && a2 > b1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    #[test]
    fn back_to_back_stays_do_not_overlap() {
        let first = StayDates::new(date(1), date(4)).unwrap();
        assert!(!first.overlaps(date(4), date(6)));
        assert!(!first.overlaps(NaiveDate::from_ymd_opt(2026, 2, 27).unwrap(), date(1)));
    }

    #[test]
    fn contained_and_straddling_stays_overlap() {
        let stay = StayDates::new(date(5), date(10)).unwrap();
        assert!(stay.overlaps(date(6), date(7)));
        assert!(stay.overlaps(date(1), date(6)));
        assert!(stay.overlaps(date(9), date(20)));
        assert!(stay.overlaps(date(1), date(20)));
    }

    #[test]
    fn empty_or_inverted_range_is_rejected() {
        assert_eq!(StayDates::new(date(3), date(3)), Err(StayDatesError::EmptyRange));
        assert_eq!(StayDates::new(date(4), date(3)), Err(StayDatesError::EmptyRange));
        assert_eq!(StayDates::new(date(3), date(4)).unwrap().nights(), 1);
    }
}

//! # Sale Numbers
//!
//! Human-readable sale numbers of the form `V-YYYYMMDD-NNNN`.
//!
//! The date part is the sale's creation day (UTC). The sequence part keeps
//! counting across days so numbers stay unique within a store even when two
//! sales share a date. It widens past four digits rather than wrapping.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};

/// Prefix shared by every sale number.
pub const SALE_NUMBER_PREFIX: &str = "V";

/// Issues sale numbers for one store.
#[derive(Debug, Default)]
pub struct SaleNumberGenerator {
    last: AtomicU64,
}

impl SaleNumberGenerator {
    /// Starts after `last_sequence`; the next number issued is `last_sequence + 1`.
    pub fn new(last_sequence: u64) -> Self {
        SaleNumberGenerator {
            last: AtomicU64::new(last_sequence),
        }
    }

    /// Seeds from the numbers a store has already issued.
    ///
    /// `last_issued` is the store's recorded high-water mark. The generator
    /// starts after the larger of it and the highest sequence in `existing`.
    pub fn from_existing<'a, I>(last_issued: u64, existing: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let highest = existing
            .into_iter()
            .filter_map(parse_sequence)
            .max()
            .unwrap_or(0);
        Self::new(highest.max(last_issued))
    }

    /// Issues the next number.
    pub fn next(&self, now: DateTime<Utc>) -> String {
        let seq = self.last.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{}-{}-{:04}", SALE_NUMBER_PREFIX, now.format("%Y%m%d"), seq)
    }

    /// Last sequence handed out.
    pub fn last_sequence(&self) -> u64 {
        self.last.load(Ordering::SeqCst)
    }
}

/// Extracts the sequence part of a sale number, if it has our shape.
pub fn parse_sequence(sale_number: &str) -> Option<u64> {
    let mut parts = sale_number.splitn(3, '-');
    let prefix = parts.next()?;
    let date = parts.next()?;
    let seq = parts.next()?;

    if prefix != SALE_NUMBER_PREFIX || date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    seq.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_and_sequence() {
        let generator = SaleNumberGenerator::new(0);
        let now = Utc.with_ymd_and_hms(2026, 3, 9, 14, 30, 0).unwrap();

        assert_eq!(generator.next(now), "V-20260309-0001");
        assert_eq!(generator.next(now), "V-20260309-0002");
        assert_eq!(generator.last_sequence(), 2);
    }

    #[test]
    fn test_sequence_widens() {
        let generator = SaleNumberGenerator::new(9999);
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(generator.next(now), "V-20260101-10000");
    }

    #[test]
    fn test_from_existing_never_reuses() {
        // Whichever of the mark and the surviving numbers is higher wins
        let existing = ["V-20260301-0002", "V-20260302-0007", "legacy-42"];
        let generator = SaleNumberGenerator::from_existing(3, existing);
        assert_eq!(generator.last_sequence(), 7);

        let generator = SaleNumberGenerator::from_existing(12, existing);
        assert_eq!(generator.last_sequence(), 12);
    }

    #[test]
    fn test_parse_sequence() {
        assert_eq!(parse_sequence("V-20260309-0042"), Some(42));
        assert_eq!(parse_sequence("X-20260309-0042"), None);
        assert_eq!(parse_sequence("V-2026-0042"), None);
        assert_eq!(parse_sequence("V-20260309-abc"), None);
    }
}

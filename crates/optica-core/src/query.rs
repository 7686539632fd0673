//! # Sale Query
//!
//! Filtering and dashboard totals over a store's sales.
//!
//! ## Filter Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  text        case-insensitive substring of                              │
//! │              sale_number OR client_name OR client_email                 │
//! │  status      exact match on the derived status                          │
//! │  date_range  created_at ≥ local midnight of the window's first day      │
//! │                today        → today                                     │
//! │                last_7_days  → today and the 6 days before               │
//! │                last_30_days → today and the 29 days before              │
//! │                all_time     → no bound                                  │
//! │                                                                         │
//! │  All set predicates must match (AND).                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! "Today" is the caller's calendar day, so `now` carries the caller's
//! timezone.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{PaymentStatus, Sale};

// =============================================================================
// Filter
// =============================================================================

/// Creation-date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum DateRange {
    #[serde(rename = "today")]
    Today,
    #[serde(rename = "last_7_days")]
    Last7Days,
    #[serde(rename = "last_30_days")]
    Last30Days,
    #[default]
    #[serde(rename = "all_time")]
    AllTime,
}

impl DateRange {
    /// Calendar days covered, counting today. `None` for all time.
    pub fn days(&self) -> Option<i64> {
        match self {
            DateRange::Today => Some(1),
            DateRange::Last7Days => Some(7),
            DateRange::Last30Days => Some(30),
            DateRange::AllTime => None,
        }
    }

    /// First instant inside the window.
    pub fn start<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<DateTime<Utc>> {
        self.days().map(|days| local_midnight(now, days - 1))
    }
}

/// Midnight `days_back` calendar days before `now`'s date, in `now`'s zone.
fn local_midnight<Tz: TimeZone>(now: &DateTime<Tz>, days_back: i64) -> DateTime<Utc> {
    let date = now.date_naive() - Duration::days(days_back);
    let midnight = date.and_time(NaiveTime::MIN);
    let tz = now.timezone();

    // A DST jump can skip midnight; fall back to the first valid instant after it
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

/// Listing predicate. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct SaleFilter {
    pub text: Option<String>,
    pub status: Option<PaymentStatus>,
    pub date_range: DateRange,
}

impl SaleFilter {
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn status(mut self, status: PaymentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn date_range(mut self, range: DateRange) -> Self {
        self.date_range = range;
        self
    }

    fn matches_text(&self, sale: &Sale) -> bool {
        let needle = match self.text.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_lowercase(),
            _ => return true,
        };

        let contains = |field: Option<&str>| {
            field
                .map(|f| f.to_lowercase().contains(&needle))
                .unwrap_or(false)
        };

        contains(Some(sale.sale_number.as_str()))
            || contains(sale.client_name.as_deref())
            || contains(sale.client_email.as_deref())
    }
}

/// Returns the sales matching `filter`, in their original order.
pub fn filter_sales<Tz: TimeZone>(sales: &[Sale], filter: &SaleFilter, now: &DateTime<Tz>) -> Vec<Sale> {
    let start = filter.date_range.start(now);

    sales
        .iter()
        .filter(|sale| filter.status.map_or(true, |s| sale.status() == s))
        .filter(|sale| start.map_or(true, |start| sale.created_at >= start))
        .filter(|sale| filter.matches_text(sale))
        .cloned()
        .collect()
}

/// Orders sales newest first, the way listings show them.
pub fn sort_newest_first(sales: &mut [Sale]) {
    sales.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.sale_number.cmp(&a.sale_number))
    });
}

// =============================================================================
// Aggregation
// =============================================================================

/// Sale counts per payment status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StatusCounts {
    pub unpaid: usize,
    pub partial: usize,
    pub paid: usize,
}

/// Dashboard totals for a set of sales.
///
/// `total_revenue` is money actually collected (Σ paid), not money billed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SalesSummary {
    pub count: usize,
    pub total_revenue: Money,
    pub total_billed: Money,
    pub total_paid: Money,
    pub total_outstanding: Money,
    pub by_status: StatusCounts,
}

/// Sums a set of sales, usually the output of [`filter_sales`].
pub fn aggregate(sales: &[Sale]) -> SalesSummary {
    let mut summary = SalesSummary::default();

    for sale in sales {
        summary.count += 1;
        summary.total_billed += sale.total();
        summary.total_paid += sale.paid_amount();
        summary.total_outstanding += sale.remaining_amount();

        match sale.status() {
            PaymentStatus::Unpaid => summary.by_status.unpaid += 1,
            PaymentStatus::Partial => summary.by_status.partial += 1,
            PaymentStatus::Paid => summary.by_status.paid += 1,
        }
    }
    summary.total_revenue = summary.total_paid;

    summary
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{build_sale, CartInput, CartItemInput};
    use crate::catalog::tests::product;
    use crate::catalog::InMemoryCatalog;
    use crate::ledger::{add_payment, PaymentInput};
    use crate::sale_number::SaleNumberGenerator;
    use crate::types::{PaymentMethod, ProductType, TaxRate};
    use chrono::FixedOffset;
    use rust_decimal_macros::dec;

    struct Fixture {
        catalog: InMemoryCatalog,
        numbers: SaleNumberGenerator,
    }

    impl Fixture {
        fn new() -> Self {
            let mut catalog = InMemoryCatalog::new();
            catalog.insert_product(product("frame-1", 100));
            Fixture {
                catalog,
                numbers: SaleNumberGenerator::new(0),
            }
        }

        fn sale(&mut self, at: DateTime<Utc>, client: Option<(&str, &str)>, paid: rust_decimal::Decimal) -> Sale {
            let cart = CartInput {
                store_id: "store-1".to_string(),
                created_by: "user-1".to_string(),
                items: vec![CartItemInput::new(
                    "frame-1",
                    "Frame",
                    ProductType::Product,
                    1,
                    Money::new(dec!(100)),
                )],
                initial_payment: Money::new(paid),
                client_name: client.map(|(n, _)| n.to_string()),
                client_email: client.map(|(_, e)| e.to_string()),
                ..Default::default()
            };
            build_sale(cart, TaxRate::zero(), at, &mut self.catalog, &self.numbers).unwrap()
        }
    }

    /// UTC−6, 10:00 local on 2026-03-09 (16:00 UTC).
    fn local_now() -> DateTime<FixedOffset> {
        let tz = FixedOffset::west_opt(6 * 3600).unwrap();
        tz.with_ymd_and_hms(2026, 3, 9, 10, 0, 0).unwrap()
    }

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_text_matches_number_name_email() {
        let mut f = Fixture::new();
        let sales = vec![
            f.sale(utc(2026, 3, 9, 12), Some(("Ana Ruiz", "ana@example.com")), dec!(0)),
            f.sale(utc(2026, 3, 9, 12), Some(("Luis Gómez", "lg@optica.mx")), dec!(0)),
            f.sale(utc(2026, 3, 9, 12), None, dec!(0)),
        ];
        let now = local_now();

        let hits = filter_sales(&sales, &SaleFilter::default().text("ana"), &now);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].client_label(), "Ana Ruiz");

        let hits = filter_sales(&sales, &SaleFilter::default().text("OPTICA.MX"), &now);
        assert_eq!(hits.len(), 1);

        let hits = filter_sales(&sales, &SaleFilter::default().text("v-20260309-0003"), &now);
        assert_eq!(hits.len(), 1);
        assert!(hits[0].is_walk_in());

        let hits = filter_sales(&sales, &SaleFilter::default().text("   "), &now);
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_status_filter() {
        let mut f = Fixture::new();
        let sales = vec![
            f.sale(utc(2026, 3, 9, 12), None, dec!(0)),
            f.sale(utc(2026, 3, 9, 12), None, dec!(40)),
            f.sale(utc(2026, 3, 9, 12), None, dec!(100)),
        ];

        let hits = filter_sales(
            &sales,
            &SaleFilter::default().status(PaymentStatus::Partial),
            &local_now(),
        );
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].paid_amount().amount(), dec!(40));
    }

    #[test]
    fn test_date_ranges_use_local_calendar_days() {
        let mut f = Fixture::new();
        let sales = vec![
            // 2026-03-09 01:00 local: today
            f.sale(utc(2026, 3, 9, 7), None, dec!(0)),
            // 2026-03-08 23:00 local: yesterday, although the UTC date is the 9th
            f.sale(utc(2026, 3, 9, 5), None, dec!(0)),
            // 2026-03-03 00:00 local: first day of the 7-day window
            f.sale(utc(2026, 3, 3, 6), None, dec!(0)),
            // 2026-03-02 23:00 local: outside 7 days
            f.sale(utc(2026, 3, 3, 5), None, dec!(0)),
            // 2026-01-15: outside 30 days
            f.sale(utc(2026, 1, 15, 18), None, dec!(0)),
        ];
        let now = local_now();
        let count = |range| filter_sales(&sales, &SaleFilter::default().date_range(range), &now).len();

        assert_eq!(count(DateRange::Today), 1);
        assert_eq!(count(DateRange::Last7Days), 3);
        assert_eq!(count(DateRange::Last30Days), 4);
        assert_eq!(count(DateRange::AllTime), 5);
    }

    #[test]
    fn test_predicates_combine() {
        let mut f = Fixture::new();
        let sales = vec![
            f.sale(utc(2026, 3, 9, 12), Some(("Ana", "ana@example.com")), dec!(100)),
            f.sale(utc(2026, 3, 9, 12), Some(("Ana", "ana@example.com")), dec!(0)),
            f.sale(utc(2026, 2, 1, 12), Some(("Ana", "ana@example.com")), dec!(100)),
        ];

        let filter = SaleFilter::default()
            .text("ana")
            .status(PaymentStatus::Paid)
            .date_range(DateRange::Today);
        assert_eq!(filter_sales(&sales, &filter, &local_now()).len(), 1);
    }

    #[test]
    fn test_aggregate_revenue_is_collected_cash() {
        let mut f = Fixture::new();
        let unpaid = f.sale(utc(2026, 3, 9, 12), None, dec!(0));
        let partial = f.sale(utc(2026, 3, 9, 12), None, dec!(30));
        let paid = f.sale(utc(2026, 3, 9, 12), None, dec!(100));
        let partial = add_payment(
            &partial,
            PaymentInput::new(Money::new(dec!(20)), PaymentMethod::Card),
            utc(2026, 3, 9, 13),
        )
        .unwrap();

        let summary = aggregate(&[unpaid, partial, paid]);

        assert_eq!(summary.count, 3);
        assert_eq!(summary.total_billed.amount(), dec!(300));
        assert_eq!(summary.total_revenue.amount(), dec!(150));
        assert_eq!(summary.total_paid, summary.total_revenue);
        assert_eq!(summary.total_outstanding.amount(), dec!(150));
        assert_eq!(
            summary.by_status,
            StatusCounts {
                unpaid: 1,
                partial: 1,
                paid: 1
            }
        );
    }

    #[test]
    fn test_aggregate_empty() {
        let summary = aggregate(&[]);
        assert_eq!(summary.count, 0);
        assert!(summary.total_revenue.is_zero());
    }

    #[test]
    fn test_sort_newest_first() {
        let mut f = Fixture::new();
        let older = f.sale(utc(2026, 3, 1, 12), None, dec!(0));
        let newer = f.sale(utc(2026, 3, 9, 12), None, dec!(0));
        let mut sales = vec![older.clone(), newer.clone()];

        sort_newest_first(&mut sales);

        assert_eq!(sales[0].id, newer.id);
        assert_eq!(sales[1].id, older.id);
    }

    #[test]
    fn test_date_range_wire_names() {
        assert_eq!(serde_json::to_string(&DateRange::Last7Days).unwrap(), "\"last_7_days\"");
        let range: DateRange = serde_json::from_str("\"last_30_days\"").unwrap();
        assert_eq!(range, DateRange::Last30Days);
    }
}

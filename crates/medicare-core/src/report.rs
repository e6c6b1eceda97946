//! # Report Projections
//!
//! Pure read-and-group over sales and catalog rows. Nothing is cached; every
//! request recomputes its table from the rows it is given.
//!
//! ## Report Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  kind               header                                  total row   │
//! │  ─────────────────  ──────────────────────────────────────  ─────────── │
//! │  sales              Medicine Name | Quantity Sold | Amount  "", Total,  │
//! │                                                             amount      │
//! │  inventory          Name | Manufacturer | Expiry Date |     Total, qty, │
//! │                     Price | Quantity | Stock Value          value       │
//! │  employee           Employee Name | Number of Transactions  Total, txns,│
//! │                     | Date | Amount Collected               amount      │
//! │  dispensed          Item Name | Initial Balance |           Total, sums │
//! │                     Sold Quantity | Remaining Quantity                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every cell is a string, ready for the table view and the PDF/Excel export
//! of the front end. Amount cells read `Tsh. 2500.00`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::Medicine;

/// Group name for sales recorded without an employee.
pub const UNATTRIBUTED: &str = "Unattributed";

// =============================================================================
// Report Kind
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum ReportKind {
    Sales,
    Inventory,
    EmployeeCollection,
    Dispensed,
}

impl ReportKind {
    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::Sales => "Sales Report",
            ReportKind::Inventory => "Inventory Report",
            ReportKind::EmployeeCollection => "Employee Collection Report",
            ReportKind::Dispensed => "Dispensed Medication Report",
        }
    }

    /// Whether the report reads sales rows (and so honours a date range).
    pub fn uses_sales(&self) -> bool {
        !matches!(self, ReportKind::Inventory)
    }
}

impl FromStr for ReportKind {
    type Err = ValidationError;

    /// Accepts `employee` as well as `employeeCollection`; the report picker
    /// of the front end sends the short form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "sales" => Ok(ReportKind::Sales),
            "inventory" => Ok(ReportKind::Inventory),
            "employee" | "employeeCollection" => Ok(ReportKind::EmployeeCollection),
            "dispensed" => Ok(ReportKind::Dispensed),
            _ => Err(ValidationError::NotAllowed {
                field: "type".to_string(),
                allowed: vec![
                    "sales".to_string(),
                    "inventory".to_string(),
                    "employeeCollection".to_string(),
                    "dispensed".to_string(),
                ],
            }),
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

// =============================================================================
// Date Range
// =============================================================================

/// Inclusive date range; an open side is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DateRange {
    #[ts(as = "Option<String>")]
    pub start: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self, ValidationError> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(ValidationError::InvalidFormat {
                    field: "startDate".to_string(),
                    reason: "must not be after endDate".to_string(),
                });
            }
        }
        Ok(DateRange { start, end })
    }

    pub fn unbounded() -> Self {
        DateRange::default()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }
}

/// Preset ranges from the report screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum RangePreset {
    Daily,
    Weekly,
    Monthly,
}

impl RangePreset {
    /// Resolves against `today`.
    ///
    /// - daily: today only
    /// - weekly: the seven days ending today
    /// - monthly: the first of the current month through today
    pub fn resolve(&self, today: NaiveDate) -> DateRange {
        let start = match self {
            RangePreset::Daily => today,
            RangePreset::Weekly => today - Duration::days(6),
            RangePreset::Monthly => today.with_day(1).unwrap_or(today),
        };
        DateRange {
            start: Some(start),
            end: Some(today),
        }
    }
}

impl FromStr for RangePreset {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "daily" => Ok(RangePreset::Daily),
            "weekly" => Ok(RangePreset::Weekly),
            "monthly" => Ok(RangePreset::Monthly),
            _ => Err(ValidationError::NotAllowed {
                field: "range".to_string(),
                allowed: vec![
                    "daily".to_string(),
                    "weekly".to_string(),
                    "monthly".to_string(),
                ],
            }),
        }
    }
}

// =============================================================================
// Inputs and Output
// =============================================================================

/// One sale row joined with the names a report needs.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleFact {
    pub sale_id: i64,
    pub medicine_id: i64,
    pub medicine_name: String,
    pub quantity: i64,
    pub total_price: Money,
    pub date: NaiveDate,
    pub employee_name: Option<String>,
    pub receipt_number: Option<String>,
}

/// A rendered report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReportTable {
    pub title: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub total: Vec<String>,
}

impl ReportTable {
    fn new(kind: ReportKind, header: &[&str]) -> Self {
        ReportTable {
            title: kind.title().to_string(),
            header: header.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
            total: Vec::new(),
        }
    }
}

// =============================================================================
// Builders
// =============================================================================

/// Dispatches to the builder for `kind`.
pub fn build_report(
    kind: ReportKind,
    medicines: &[Medicine],
    sales: &[SaleFact],
    range: DateRange,
    currency_prefix: &str,
) -> ReportTable {
    match kind {
        ReportKind::Sales => sales_report(sales, range, currency_prefix),
        ReportKind::Inventory => inventory_report(medicines, currency_prefix),
        ReportKind::EmployeeCollection => employee_collection_report(sales, range, currency_prefix),
        ReportKind::Dispensed => dispensed_report(medicines, sales, range),
    }
}

/// Quantity and amount per medicine sold in range, ordered by name.
pub fn sales_report(sales: &[SaleFact], range: DateRange, currency_prefix: &str) -> ReportTable {
    let mut table = ReportTable::new(
        ReportKind::Sales,
        &["Medicine Name", "Quantity Sold", "Amount"],
    );

    let mut by_name: BTreeMap<&str, (i64, Money)> = BTreeMap::new();
    for sale in sales.iter().filter(|s| range.contains(s.date)) {
        let entry = by_name
            .entry(sale.medicine_name.as_str())
            .or_insert((0, Money::zero()));
        entry.0 += sale.quantity;
        entry.1 += sale.total_price;
    }

    let mut total = Money::zero();
    for (name, (quantity, amount)) in by_name {
        table.rows.push(vec![
            name.to_string(),
            quantity.to_string(),
            amount.report_cell(currency_prefix),
        ]);
        total += amount;
    }

    table.total = vec![
        String::new(),
        "Total".to_string(),
        total.report_cell(currency_prefix),
    ];
    table
}

/// Stock on hand, one row per medicine in catalog order.
pub fn inventory_report(medicines: &[Medicine], currency_prefix: &str) -> ReportTable {
    let mut table = ReportTable::new(
        ReportKind::Inventory,
        &["Name", "Manufacturer", "Expiry Date", "Price", "Quantity", "Stock Value"],
    );

    let mut total_quantity = 0;
    let mut total_value = Money::zero();
    for medicine in medicines {
        let value = medicine.stock_value();
        table.rows.push(vec![
            medicine.name.clone(),
            medicine.manufacturer.clone(),
            medicine.expiry_date.to_string(),
            medicine.price.report_cell(currency_prefix),
            medicine.quantity.to_string(),
            value.report_cell(currency_prefix),
        ]);
        total_quantity += medicine.quantity;
        total_value += value;
    }

    table.total = vec![
        "Total".to_string(),
        String::new(),
        String::new(),
        String::new(),
        total_quantity.to_string(),
        total_value.report_cell(currency_prefix),
    ];
    table
}

/// Transactions and takings per (employee, date).
///
/// A transaction is one receipt; a sale with no receipt counts on its own.
pub fn employee_collection_report(
    sales: &[SaleFact],
    range: DateRange,
    currency_prefix: &str,
) -> ReportTable {
    let mut table = ReportTable::new(
        ReportKind::EmployeeCollection,
        &["Employee Name", "Number of Transactions", "Date", "Amount Collected"],
    );

    let mut groups: BTreeMap<(&str, NaiveDate), (BTreeSet<String>, Money)> = BTreeMap::new();
    for sale in sales.iter().filter(|s| range.contains(s.date)) {
        let employee = sale.employee_name.as_deref().unwrap_or(UNATTRIBUTED);
        let transaction = sale
            .receipt_number
            .clone()
            .unwrap_or_else(|| format!("sale-{}", sale.sale_id));

        let entry = groups
            .entry((employee, sale.date))
            .or_insert_with(|| (BTreeSet::new(), Money::zero()));
        entry.0.insert(transaction);
        entry.1 += sale.total_price;
    }

    let mut total_transactions = 0;
    let mut total_amount = Money::zero();
    for ((employee, date), (transactions, amount)) in groups {
        table.rows.push(vec![
            employee.to_string(),
            transactions.len().to_string(),
            date.to_string(),
            amount.report_cell(currency_prefix),
        ]);
        total_transactions += transactions.len();
        total_amount += amount;
    }

    table.total = vec![
        "Total".to_string(),
        total_transactions.to_string(),
        String::new(),
        total_amount.report_cell(currency_prefix),
    ];
    table
}

/// Opening balance, units sold in range and units left, per medicine.
///
/// The remaining quantity is the current stock; the initial balance is
/// reconstructed as remaining plus sold.
pub fn dispensed_report(medicines: &[Medicine], sales: &[SaleFact], range: DateRange) -> ReportTable {
    let mut table = ReportTable::new(
        ReportKind::Dispensed,
        &["Item Name", "Initial Balance", "Sold Quantity", "Remaining Quantity"],
    );

    let mut sold_by_id: BTreeMap<i64, i64> = BTreeMap::new();
    for sale in sales.iter().filter(|s| range.contains(s.date)) {
        *sold_by_id.entry(sale.medicine_id).or_insert(0) += sale.quantity;
    }

    let (mut total_initial, mut total_sold, mut total_remaining) = (0, 0, 0);
    for medicine in medicines {
        let sold = sold_by_id.get(&medicine.id).copied().unwrap_or(0);
        let remaining = medicine.quantity;
        let initial = remaining + sold;

        table.rows.push(vec![
            medicine.name.clone(),
            initial.to_string(),
            sold.to_string(),
            remaining.to_string(),
        ]);
        total_initial += initial;
        total_sold += sold;
        total_remaining += remaining;
    }

    table.total = vec![
        "Total".to_string(),
        total_initial.to_string(),
        total_sold.to_string(),
        total_remaining.to_string(),
    ];
    table
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn medicine(id: i64, name: &str, price_major: i64, quantity: i64) -> Medicine {
        let now = Utc::now();
        Medicine {
            id,
            name: name.to_string(),
            manufacturer: "ABC Pharma".to_string(),
            expiry_date: date(2025, 12, 31),
            price: Money::from_major_minor(price_major, 0),
            quantity,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    fn fact(
        sale_id: i64,
        medicine_id: i64,
        name: &str,
        quantity: i64,
        amount_major: i64,
        day: u32,
        employee: Option<&str>,
        receipt: Option<&str>,
    ) -> SaleFact {
        SaleFact {
            sale_id,
            medicine_id,
            medicine_name: name.to_string(),
            quantity,
            total_price: Money::from_major_minor(amount_major, 0),
            date: date(2025, 3, day),
            employee_name: employee.map(str::to_string),
            receipt_number: receipt.map(str::to_string),
        }
    }

    fn sample_sales() -> Vec<SaleFact> {
        vec![
            fact(1, 1, "Paracetamol", 5, 2500, 10, Some("Administrator"), Some("R1")),
            fact(2, 3, "Ibuprofen", 1, 800, 10, Some("Administrator"), Some("R1")),
            fact(3, 1, "Paracetamol", 2, 1000, 11, Some("Administrator"), Some("R2")),
            fact(4, 2, "Amoxicillin", 1, 1200, 12, None, None),
        ]
    }

    #[test]
    fn test_report_kind_parsing() {
        assert_eq!("sales".parse::<ReportKind>().unwrap(), ReportKind::Sales);
        assert_eq!(
            "employee".parse::<ReportKind>().unwrap(),
            ReportKind::EmployeeCollection
        );
        assert_eq!(
            "employeeCollection".parse::<ReportKind>().unwrap(),
            ReportKind::EmployeeCollection
        );
        assert!("profit".parse::<ReportKind>().is_err());
    }

    #[test]
    fn test_range_presets() {
        let today = date(2025, 3, 14);
        assert_eq!(
            RangePreset::Daily.resolve(today),
            DateRange { start: Some(today), end: Some(today) }
        );
        assert_eq!(RangePreset::Weekly.resolve(today).start, Some(date(2025, 3, 8)));
        assert_eq!(RangePreset::Monthly.resolve(today).start, Some(date(2025, 3, 1)));
    }

    #[test]
    fn test_date_range_bounds() {
        let range = DateRange::new(Some(date(2025, 3, 10)), Some(date(2025, 3, 11))).unwrap();
        assert!(range.contains(date(2025, 3, 10)));
        assert!(range.contains(date(2025, 3, 11)));
        assert!(!range.contains(date(2025, 3, 12)));
        assert!(DateRange::unbounded().contains(date(1999, 1, 1)));
        assert!(DateRange::new(Some(date(2025, 3, 12)), Some(date(2025, 3, 1))).is_err());
    }

    #[test]
    fn test_sales_report_groups_by_name() {
        let table = sales_report(&sample_sales(), DateRange::unbounded(), "Tsh.");

        assert_eq!(table.title, "Sales Report");
        assert_eq!(table.header, vec!["Medicine Name", "Quantity Sold", "Amount"]);
        assert_eq!(
            table.rows,
            vec![
                vec!["Amoxicillin", "1", "Tsh. 1200.00"],
                vec!["Ibuprofen", "1", "Tsh. 800.00"],
                vec!["Paracetamol", "7", "Tsh. 3500.00"],
            ]
        );
        assert_eq!(table.total, vec!["", "Total", "Tsh. 5500.00"]);
    }

    #[test]
    fn test_sales_report_honours_range() {
        let range = DateRange::new(Some(date(2025, 3, 11)), None).unwrap();
        let table = sales_report(&sample_sales(), range, "Tsh.");
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.total[2], "Tsh. 2200.00");
    }

    #[test]
    fn test_inventory_report() {
        let medicines = vec![
            medicine(1, "Paracetamol", 500, 100),
            medicine(2, "Amoxicillin", 1200, 50),
        ];
        let table = inventory_report(&medicines, "Tsh.");

        assert_eq!(table.header.len(), 6);
        assert_eq!(
            table.rows[0],
            vec!["Paracetamol", "ABC Pharma", "2025-12-31", "Tsh. 500.00", "100", "Tsh. 50000.00"]
        );
        assert_eq!(table.total, vec!["Total", "", "", "", "150", "Tsh. 110000.00"]);
    }

    #[test]
    fn test_employee_collection_counts_receipts() {
        let table = employee_collection_report(&sample_sales(), DateRange::unbounded(), "Tsh.");

        assert_eq!(
            table.rows,
            vec![
                vec!["Administrator", "1", "2025-03-10", "Tsh. 3300.00"],
                vec!["Administrator", "1", "2025-03-11", "Tsh. 1000.00"],
                vec!["Unattributed", "1", "2025-03-12", "Tsh. 1200.00"],
            ]
        );
        assert_eq!(table.total, vec!["Total", "3", "", "Tsh. 5500.00"]);
    }

    #[test]
    fn test_dispensed_report() {
        let medicines = vec![
            medicine(1, "Paracetamol", 500, 93),
            medicine(2, "Amoxicillin", 1200, 49),
            medicine(3, "Ibuprofen", 800, 75),
        ];
        let range = DateRange::new(Some(date(2025, 3, 10)), Some(date(2025, 3, 10))).unwrap();
        let table = dispensed_report(&medicines, &sample_sales(), range);

        assert_eq!(table.rows[0], vec!["Paracetamol", "98", "5", "93"]);
        assert_eq!(table.rows[1], vec!["Amoxicillin", "49", "0", "49"]);
        assert_eq!(table.rows[2], vec!["Ibuprofen", "76", "1", "75"]);
        assert_eq!(table.total, vec!["Total", "223", "6", "217"]);
    }

    #[test]
    fn test_build_report_dispatch() {
        let table = build_report(
            ReportKind::Dispensed,
            &[],
            &[],
            DateRange::unbounded(),
            "Tsh.",
        );
        assert_eq!(table.title, "Dispensed Medication Report");
        assert!(table.rows.is_empty());
        assert_eq!(table.total, vec!["Total", "0", "0", "0"]);
    }
}

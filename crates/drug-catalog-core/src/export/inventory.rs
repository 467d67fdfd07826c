//! Inventory report for printing and "save as".

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Category, Drug, ExpiryStatus};

/// Snapshot of the inventory on a given day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryReport {
    /// Day the expiry statuses were computed for
    pub generated_on: NaiveDate,
    pub expiring_window_days: u32,
    pub rows: Vec<InventoryRow>,
    /// Sum of units on hand
    pub total_quantity: u64,
    pub expired_count: usize,
    pub expiring_soon_count: usize,
}

/// One drug in the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryRow {
    pub id: u32,
    pub name: String,
    pub active_substance: String,
    pub manufacturer: String,
    pub form: String,
    pub dosage: String,
    pub prescription_type: String,
    /// Category name, empty when the id is unknown
    pub category: String,
    pub quantity: u32,
    pub expiry_date: NaiveDate,
    pub expiry_status: ExpiryStatus,
}

impl InventoryReport {
    pub fn build(drugs: &[Drug], categories: &[Category], today: NaiveDate, expiring_window_days: u32) -> Self {
        let rows: Vec<InventoryRow> = drugs
            .iter()
            .map(|drug| InventoryRow {
                id: drug.id,
                name: drug.name.clone(),
                active_substance: drug.active_substance.clone(),
                manufacturer: drug.manufacturer.clone(),
                form: drug.form.clone(),
                dosage: drug.dosage_label(),
                prescription_type: drug.prescription_type.clone(),
                category: categories
                    .iter()
                    .find(|c| c.id == drug.category_id)
                    .map(|c| c.name.clone())
                    .unwrap_or_default(),
                quantity: drug.quantity,
                expiry_date: drug.expiry_date,
                expiry_status: drug.expiry_status(today, expiring_window_days),
            })
            .collect();

        let count = |status: ExpiryStatus| rows.iter().filter(|r| r.expiry_status == status).count();

        Self {
            generated_on: today,
            expiring_window_days,
            total_quantity: rows.iter().map(|r| u64::from(r.quantity)).sum(),
            expired_count: count(ExpiryStatus::Expired),
            expiring_soon_count: count(ExpiryStatus::ExpiringSoon),
            rows,
        }
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV format.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();

        csv.push_str(
            "id,name,active_substance,manufacturer,form,dosage,prescription_type,category,quantity,expiry_date,expiry_status\n",
        );

        for row in &self.rows {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{},{},{},{}\n",
                row.id,
                escape_csv(&row.name),
                escape_csv(&row.active_substance),
                escape_csv(&row.manufacturer),
                escape_csv(&row.form),
                escape_csv(&row.dosage),
                escape_csv(&row.prescription_type),
                escape_csv(&row.category),
                row.quantity,
                row.expiry_date,
                row.expiry_status.as_str(),
            ));
        }

        csv
    }
}

/// Escape a string for CSV output.
pub(crate) fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

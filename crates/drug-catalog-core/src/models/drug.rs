//! Drug inventory models.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Category assigned to drugs that don't specify one ("Other").
pub const DEFAULT_CATEGORY_ID: u32 = 1;

/// A single drug record in the pharmacy inventory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Drug {
    /// Sequential identifier, assigned by the store
    pub id: u32,
    /// Trade name
    pub name: String,
    /// Active pharmaceutical ingredient
    pub active_substance: String,
    pub manufacturer: String,
    /// Dosage form (e.g., "Tablets", "Syrup")
    pub form: String,
    /// Strength per unit of the form
    pub dosage: f64,
    /// Unit of `dosage` (e.g., "mg", "ml")
    pub dosage_unit: String,
    /// "Prescription" or "Over-the-counter"
    pub prescription_type: String,
    /// Units on hand
    pub quantity: u32,
    pub expiry_date: NaiveDate,
    #[serde(default = "default_category_id")]
    pub category_id: u32,
    #[serde(default)]
    pub indications: Vec<String>,
    #[serde(default)]
    pub contraindications: Vec<String>,
}

fn default_category_id() -> u32 {
    DEFAULT_CATEGORY_ID
}

/// Where a drug stands relative to its expiry date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExpiryStatus {
    /// Expiry date is today or in the past
    Expired,
    /// Expires within the warning window
    ExpiringSoon,
    Valid,
}

impl ExpiryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpiryStatus::Expired => "expired",
            ExpiryStatus::ExpiringSoon => "expiring_soon",
            ExpiryStatus::Valid => "valid",
        }
    }
}

impl Drug {
    /// Create a new drug with required fields. The id is assigned on insert.
    pub fn new(name: String, active_substance: String, manufacturer: String, expiry_date: NaiveDate) -> Self {
        Self {
            id: 0,
            name,
            active_substance,
            manufacturer,
            form: String::new(),
            dosage: 0.0,
            dosage_unit: String::new(),
            prescription_type: String::new(),
            quantity: 0,
            expiry_date,
            category_id: DEFAULT_CATEGORY_ID,
            indications: Vec::new(),
            contraindications: Vec::new(),
        }
    }

    /// Expired means the expiry date has been reached.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiry_date <= today
    }

    /// True when the drug expires within `window_days` of `today` (expired drugs included).
    pub fn expires_within(&self, today: NaiveDate, window_days: u32) -> bool {
        match today.checked_add_days(Days::new(u64::from(window_days))) {
            Some(limit) => self.expiry_date <= limit,
            None => true,
        }
    }

    pub fn expiry_status(&self, today: NaiveDate, window_days: u32) -> ExpiryStatus {
        if self.is_expired(today) {
            ExpiryStatus::Expired
        } else if self.expires_within(today, window_days) {
            ExpiryStatus::ExpiringSoon
        } else {
            ExpiryStatus::Valid
        }
    }

    /// Dosage as shown in lists, e.g. "500 mg".
    pub fn dosage_label(&self) -> String {
        format!("{} {}", self.dosage, self.dosage_unit).trim().to_string()
    }

    /// Check the fields every stored drug must have.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("drug name is required".into());
        }
        if self.active_substance.trim().is_empty() {
            return Err("active substance is required".into());
        }
        if self.manufacturer.trim().is_empty() {
            return Err("manufacturer is required".into());
        }
        if self.dosage.is_nan() || self.dosage <= 0.0 {
            return Err(format!("dosage must be positive, got {}", self.dosage));
        }
        Ok(())
    }

    /// Stricter checks for a drug entering the inventory.
    pub fn validate_new(&self, today: NaiveDate) -> Result<(), String> {
        self.validate()?;
        if self.quantity == 0 {
            return Err("quantity must be positive".into());
        }
        if self.expiry_date <= today {
            return Err(format!("expiry date {} must be in the future", self.expiry_date));
        }
        Ok(())
    }

    /// Trim free-text fields and drop blank list entries.
    pub fn normalize(&mut self) {
        for field in [
            &mut self.name,
            &mut self.active_substance,
            &mut self.manufacturer,
            &mut self.form,
            &mut self.dosage_unit,
            &mut self.prescription_type,
        ] {
            *field = field.trim().to_string();
        }
        for list in [&mut self.indications, &mut self.contraindications] {
            *list = list
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
    }
}

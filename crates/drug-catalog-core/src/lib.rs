//! Drug Catalog Core Library
//!
//! Pharmacy inventory, expiry tracking, medication reminders and dosing
//! schedules for a single-workstation catalog, persisted as flat JSON files.
//!
//! # Architecture
//!
//! ```text
//!   UI timer ──► ReminderPoller ──► matching::is_due ──► notification
//!                                                           │
//!                                                   user confirms dose
//!                                                           │
//!   UI forms ──► Pharmacy ──► DrugStore / UserStore / ...   ▼
//!                    │          (Repository<T>)      deduct_stock
//!                    ▼
//!        drugs.json  users.json  categories.json  reminders.json  schedules.json
//! ```
//!
//! # Modules
//!
//! - [`config`]: Runtime configuration and data file locations
//! - [`models`]: Domain types (Drug, Category, User, MedicationReminder, MedicationSchedule)
//! - [`matching`]: Pure reminder, schedule and stock logic; no I/O
//! - [`store`]: JSON-file repositories
//! - [`dictionary`]: Reference data, category classifier, name autocomplete
//! - [`export`]: Inventory reports
//! - [`pharmacy`]: Service tying the stores together

pub mod config;
pub mod dictionary;
pub mod export;
pub mod matching;
pub mod models;
pub mod pharmacy;
pub mod store;

// Re-export commonly used types
pub use config::{Config, ConfigError, DataPaths};
pub use dictionary::{determine_category, DrugDictionary, Suggestion};
pub use export::InventoryReport;
pub use matching::{
    applies_on, estimate_supply, is_due, next_dose, next_due_instant, parse_dosage_amount, Clock, ManualClock,
    ReminderPoller, ScheduledDose, SupplyEstimate, SupplyTier, SystemClock,
};
pub use models::{
    Category, Drug, ExpiryStatus, MedicationReminder, MedicationSchedule, Rgb, ScheduleFrequency, User, UserRole,
};
pub use pharmacy::Pharmacy;
pub use store::{ImportMode, Registration, Repository, StockDeduction, StoreError, StoreResult};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing_subscriber::EnvFilter;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum DrugCatalogError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<StoreError> for DrugCatalogError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => DrugCatalogError::NotFound(e.to_string()),
            StoreError::Validation(_) | StoreError::Duplicate(_) | StoreError::Protected(_) => {
                DrugCatalogError::InvalidInput(e.to_string())
            }
            StoreError::UnknownUser(_) | StoreError::WrongPassword(_) => {
                DrugCatalogError::AuthenticationError(e.to_string())
            }
            _ => DrugCatalogError::StorageError(e.to_string()),
        }
    }
}

impl From<ConfigError> for DrugCatalogError {
    fn from(e: ConfigError) -> Self {
        DrugCatalogError::ConfigError(e.to_string())
    }
}

impl From<serde_json::Error> for DrugCatalogError {
    fn from(e: serde_json::Error) -> Self {
        DrugCatalogError::SerializationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for DrugCatalogError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        DrugCatalogError::StorageError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `filter`; without either the default filter is used.
/// Returns false if a subscriber was already installed.
#[uniffi::export]
pub fn init_logging(filter: Option<String>) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter.unwrap_or_else(config::default_log_filter)));
    let installed = tracing_subscriber::fmt().with_env_filter(filter).try_init().is_ok();
    if installed {
        tracing::info!("{} core v{}", config::APP_NAME, config::APP_VERSION);
    }
    installed
}

/// Open or create a catalog in `data_dir`. Environment overrides apply to everything else.
#[uniffi::export]
pub fn open_catalog(data_dir: String) -> Result<Arc<DrugCatalogCore>, DrugCatalogError> {
    let mut config = Config::from_env()?;
    config.data_dir = data_dir.into();
    DrugCatalogCore::open(config)
}

/// Open a catalog described by a JSON config file, then apply environment overrides.
#[uniffi::export]
pub fn open_catalog_with_config(config_path: String) -> Result<Arc<DrugCatalogCore>, DrugCatalogError> {
    let mut config = Config::load(&config_path)?;
    config.apply_overrides(|key| std::env::var(key).ok())?;
    DrugCatalogCore::open(config)
}

/// Create an in-memory catalog (for testing).
#[uniffi::export]
pub fn open_catalog_in_memory() -> Result<Arc<DrugCatalogCore>, DrugCatalogError> {
    let config = Config::default();
    let poller = ReminderPoller::system(config.reminder_catch_up_minutes);
    let pharmacy = Pharmacy::in_memory(config, now())?;
    Ok(DrugCatalogCore::wrap(pharmacy, poller))
}

/// Guess a category id from a drug name.
#[uniffi::export]
pub fn classify_drug_category(drug_name: String) -> u32 {
    determine_category(&drug_name)
}

fn now() -> NaiveDateTime {
    SystemClock.now()
}

fn today() -> NaiveDate {
    now().date()
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe catalog wrapper for FFI.
#[derive(uniffi::Object)]
pub struct DrugCatalogCore {
    pharmacy: Arc<Mutex<Pharmacy>>,
    poller: Mutex<ReminderPoller>,
}

impl DrugCatalogCore {
    fn open(config: Config) -> Result<Arc<Self>, DrugCatalogError> {
        let poller = ReminderPoller::system(config.reminder_catch_up_minutes);
        let pharmacy = Pharmacy::open(config, now())?;
        Ok(Self::wrap(pharmacy, poller))
    }

    fn wrap(pharmacy: Pharmacy, poller: ReminderPoller) -> Arc<Self> {
        Arc::new(Self {
            pharmacy: Arc::new(Mutex::new(pharmacy)),
            poller: Mutex::new(poller),
        })
    }
}

#[uniffi::export]
impl DrugCatalogCore {
    /// Re-read every data file.
    pub fn reload(&self) -> Result<(), DrugCatalogError> {
        let mut pharmacy = self.pharmacy.lock()?;
        pharmacy.reload()?;
        self.poller.lock()?.reset();
        Ok(())
    }

    // =========================================================================
    // Drug Operations
    // =========================================================================

    /// Add a drug; the returned record carries its assigned id.
    pub fn add_drug(&self, drug: FfiDrug) -> Result<FfiDrug, DrugCatalogError> {
        let drug: Drug = drug.try_into()?;
        let mut pharmacy = self.pharmacy.lock()?;
        let drug = pharmacy.add_drug(drug, today())?;
        Ok(drug.into())
    }

    pub fn update_drug(&self, drug: FfiDrug) -> Result<(), DrugCatalogError> {
        let drug: Drug = drug.try_into()?;
        let mut pharmacy = self.pharmacy.lock()?;
        pharmacy.update_drug(drug)?;
        Ok(())
    }

    pub fn delete_drug(&self, id: u32) -> Result<(), DrugCatalogError> {
        let mut pharmacy = self.pharmacy.lock()?;
        pharmacy.delete_drug(id)?;
        Ok(())
    }

    pub fn get_drug(&self, id: u32) -> Result<Option<FfiDrug>, DrugCatalogError> {
        let pharmacy = self.pharmacy.lock()?;
        Ok(pharmacy.drugs().get(id).cloned().map(Into::into))
    }

    pub fn list_drugs(&self) -> Result<Vec<FfiDrug>, DrugCatalogError> {
        let pharmacy = self.pharmacy.lock()?;
        Ok(pharmacy.drugs().list().iter().cloned().map(Into::into).collect())
    }

    /// Search by name or manufacturer.
    pub fn search_drugs(&self, query: String) -> Result<Vec<FfiDrug>, DrugCatalogError> {
        let pharmacy = self.pharmacy.lock()?;
        Ok(to_ffi_drugs(pharmacy.drugs().search(&query)))
    }

    pub fn drugs_by_manufacturer(&self, manufacturer: String) -> Result<Vec<FfiDrug>, DrugCatalogError> {
        let pharmacy = self.pharmacy.lock()?;
        Ok(to_ffi_drugs(pharmacy.drugs().by_manufacturer(&manufacturer)))
    }

    pub fn drugs_by_category(&self, category_id: u32) -> Result<Vec<FfiDrug>, DrugCatalogError> {
        let pharmacy = self.pharmacy.lock()?;
        Ok(to_ffi_drugs(pharmacy.drugs().by_category(category_id)))
    }

    /// Distinct manufacturers in the inventory.
    pub fn list_manufacturers(&self) -> Result<Vec<String>, DrugCatalogError> {
        let pharmacy = self.pharmacy.lock()?;
        Ok(pharmacy.drugs().manufacturers())
    }

    pub fn expired_drugs(&self) -> Result<Vec<FfiDrug>, DrugCatalogError> {
        let pharmacy = self.pharmacy.lock()?;
        Ok(to_ffi_drugs(pharmacy.drugs().expired(today())))
    }

    /// Drugs inside the configured expiry window, expired ones included.
    pub fn expiring_drugs(&self) -> Result<Vec<FfiDrug>, DrugCatalogError> {
        let pharmacy = self.pharmacy.lock()?;
        Ok(to_ffi_drugs(pharmacy.expiring_soon(today())))
    }

    pub fn drug_expiry_status(&self, id: u32) -> Result<Option<FfiExpiryStatus>, DrugCatalogError> {
        let pharmacy = self.pharmacy.lock()?;
        Ok(pharmacy.expiry_status(id, today()).map(Into::into))
    }

    /// Delete expired drugs; returns how many were removed.
    pub fn remove_expired_drugs(&self) -> Result<u32, DrugCatalogError> {
        let mut pharmacy = self.pharmacy.lock()?;
        Ok(pharmacy.remove_expired(today())?.len() as u32)
    }

    /// Import another drug file. `replace` discards the current inventory.
    pub fn import_drugs(&self, path: String, replace: bool) -> Result<u32, DrugCatalogError> {
        let mode = if replace { ImportMode::Replace } else { ImportMode::Append };
        let mut pharmacy = self.pharmacy.lock()?;
        let count = pharmacy.import_drugs(&path, mode)?;
        Ok(count as u32)
    }

    pub fn export_drugs(&self, path: String) -> Result<(), DrugCatalogError> {
        let pharmacy = self.pharmacy.lock()?;
        pharmacy.drugs().export_file(&path)?;
        Ok(())
    }

    /// Days of supply left at `dose` units taken `times_per_day`.
    pub fn estimate_supply(
        &self,
        drug_id: u32,
        dose: f64,
        times_per_day: f64,
    ) -> Result<FfiSupplyEstimate, DrugCatalogError> {
        let pharmacy = self.pharmacy.lock()?;
        let estimate = pharmacy.supply_estimate(drug_id, dose, times_per_day, today())?;
        Ok(estimate.into())
    }

    pub fn export_inventory_json(&self) -> Result<String, DrugCatalogError> {
        let pharmacy = self.pharmacy.lock()?;
        Ok(pharmacy.inventory_report(today()).to_json()?)
    }

    pub fn export_inventory_csv(&self) -> Result<String, DrugCatalogError> {
        let pharmacy = self.pharmacy.lock()?;
        Ok(pharmacy.inventory_report(today()).to_csv())
    }

    // =========================================================================
    // Categories & Dictionary
    // =========================================================================

    pub fn list_categories(&self) -> Result<Vec<FfiCategory>, DrugCatalogError> {
        let pharmacy = self.pharmacy.lock()?;
        Ok(pharmacy.categories().list().iter().map(Into::into).collect())
    }

    pub fn suggest_drug_names(&self, query: String, limit: u32) -> Result<Vec<FfiSuggestion>, DrugCatalogError> {
        let pharmacy = self.pharmacy.lock()?;
        Ok(pharmacy
            .suggest_drug_names(&query, limit as usize)
            .into_iter()
            .map(Into::into)
            .collect())
    }

    pub fn common_manufacturers(&self) -> Result<Vec<String>, DrugCatalogError> {
        let pharmacy = self.pharmacy.lock()?;
        Ok(pharmacy.dictionary().manufacturers().to_vec())
    }

    pub fn common_forms(&self) -> Result<Vec<String>, DrugCatalogError> {
        let pharmacy = self.pharmacy.lock()?;
        Ok(pharmacy.dictionary().forms().to_vec())
    }

    pub fn dosage_units(&self) -> Vec<String> {
        dictionary::DOSAGE_UNITS.iter().map(|s| s.to_string()).collect()
    }

    pub fn prescription_types(&self) -> Vec<String> {
        dictionary::PRESCRIPTION_TYPES.iter().map(|s| s.to_string()).collect()
    }

    // =========================================================================
    // User Operations
    // =========================================================================

    pub fn register_user(&self, registration: FfiRegistration) -> Result<FfiUser, DrugCatalogError> {
        let mut pharmacy = self.pharmacy.lock()?;
        let user = pharmacy.users_mut().register(registration.into(), now())?;
        Ok(user.into())
    }

    pub fn login(&self, username: String, password: String) -> Result<FfiUser, DrugCatalogError> {
        let mut pharmacy = self.pharmacy.lock()?;
        let user = pharmacy.users_mut().login(&username, &password, now())?;
        // A new session starts a fresh reminder guard
        self.poller.lock()?.reset();
        Ok(user.into())
    }

    pub fn user_exists(&self, username: String) -> Result<bool, DrugCatalogError> {
        let pharmacy = self.pharmacy.lock()?;
        Ok(pharmacy.users().user_exists(&username))
    }

    pub fn list_users(&self) -> Result<Vec<FfiUser>, DrugCatalogError> {
        let pharmacy = self.pharmacy.lock()?;
        Ok(pharmacy.users().list_active().into_iter().map(Into::into).collect())
    }

    pub fn get_user(&self, id: u32) -> Result<Option<FfiUser>, DrugCatalogError> {
        let pharmacy = self.pharmacy.lock()?;
        Ok(pharmacy.users().get_user(id).map(Into::into))
    }

    /// Update name, email, role and active flag.
    pub fn update_user(&self, user: FfiUser) -> Result<(), DrugCatalogError> {
        let mut pharmacy = self.pharmacy.lock()?;
        let mut stored = pharmacy
            .users()
            .get_user(user.id)
            .cloned()
            .ok_or_else(|| DrugCatalogError::NotFound(format!("user {}", user.id)))?;
        stored.full_name = user.full_name;
        stored.email = user.email;
        stored.role = user.role.into();
        stored.is_active = user.is_active;
        pharmacy.users_mut().update_user(&stored)?;
        Ok(())
    }

    pub fn delete_user(&self, id: u32) -> Result<(), DrugCatalogError> {
        let mut pharmacy = self.pharmacy.lock()?;
        pharmacy.users_mut().delete_user(id)?;
        Ok(())
    }

    pub fn change_password(&self, user_id: u32, new_password: String) -> Result<(), DrugCatalogError> {
        let mut pharmacy = self.pharmacy.lock()?;
        pharmacy.users_mut().change_password(user_id, &new_password)?;
        Ok(())
    }

    // =========================================================================
    // Reminder Operations
    // =========================================================================

    pub fn add_reminder(&self, user_id: u32, reminder: FfiReminder) -> Result<FfiReminder, DrugCatalogError> {
        let reminder: MedicationReminder = reminder.try_into()?;
        let mut pharmacy = self.pharmacy.lock()?;
        let reminder = pharmacy.reminders_mut().add(user_id, reminder)?;
        Ok(reminder.into())
    }

    pub fn update_reminder(&self, user_id: u32, reminder: FfiReminder) -> Result<(), DrugCatalogError> {
        let reminder: MedicationReminder = reminder.try_into()?;
        let mut pharmacy = self.pharmacy.lock()?;
        pharmacy.reminders_mut().update(user_id, &reminder)?;
        Ok(())
    }

    pub fn delete_reminder(&self, user_id: u32, reminder_id: u32) -> Result<(), DrugCatalogError> {
        let mut pharmacy = self.pharmacy.lock()?;
        pharmacy.reminders_mut().delete(user_id, reminder_id)?;
        Ok(())
    }

    /// Active reminders of a user.
    pub fn list_reminders(&self, user_id: u32) -> Result<Vec<FfiReminder>, DrugCatalogError> {
        let pharmacy = self.pharmacy.lock()?;
        Ok(pharmacy
            .reminders()
            .list_for_user(user_id)
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// Called from the UI timer: reminders of `user_id` that fired since the last poll.
    pub fn poll_due_reminders(&self, user_id: u32) -> Result<Vec<FfiReminder>, DrugCatalogError> {
        let pharmacy = self.pharmacy.lock()?;
        let reminders = user_reminders(&pharmacy, user_id);
        let mut poller = self.poller.lock()?;
        let due = poller.poll(&reminders);
        for reminder in &due {
            tracing::info!(user_id, reminder_id = reminder.id, drug = %reminder.drug_name, "Reminder fired");
        }
        Ok(due.into_iter().map(Into::into).collect())
    }

    /// Next instant any of the user's reminders fires, formatted `YYYY-MM-DDTHH:MM:SS`.
    pub fn next_reminder_at(&self, user_id: u32) -> Result<Option<String>, DrugCatalogError> {
        let pharmacy = self.pharmacy.lock()?;
        let reminders = user_reminders(&pharmacy, user_id);
        let poller = self.poller.lock()?;
        Ok(poller.next_due_instant(&reminders).map(format_datetime))
    }

    /// The user took the dose of a fired reminder: deduct it from stock.
    pub fn confirm_reminder_taken(
        &self,
        user_id: u32,
        reminder_id: u32,
    ) -> Result<FfiStockDeduction, DrugCatalogError> {
        let mut pharmacy = self.pharmacy.lock()?;
        Ok(pharmacy.confirm_reminder_taken(user_id, reminder_id)?.into())
    }

    // =========================================================================
    // Schedule Operations
    // =========================================================================

    pub fn add_schedule(&self, user_id: u32, schedule: FfiSchedule) -> Result<FfiSchedule, DrugCatalogError> {
        let mut pharmacy = self.pharmacy.lock()?;
        let schedule = schedule.into_schedule(now())?;
        let schedule = pharmacy.schedules_mut().add(user_id, schedule)?;
        Ok(schedule.into())
    }

    pub fn update_schedule(&self, schedule: FfiSchedule) -> Result<(), DrugCatalogError> {
        let mut pharmacy = self.pharmacy.lock()?;
        let schedule = schedule.into_schedule(now())?;
        pharmacy.schedules_mut().update(&schedule)?;
        Ok(())
    }

    pub fn delete_schedule(&self, schedule_id: u32) -> Result<(), DrugCatalogError> {
        let mut pharmacy = self.pharmacy.lock()?;
        pharmacy.schedules_mut().delete(schedule_id)?;
        Ok(())
    }

    pub fn get_schedule(&self, schedule_id: u32) -> Result<Option<FfiSchedule>, DrugCatalogError> {
        let pharmacy = self.pharmacy.lock()?;
        Ok(pharmacy.schedules().get(schedule_id).map(Into::into))
    }

    pub fn user_schedules(&self, user_id: u32) -> Result<Vec<FfiSchedule>, DrugCatalogError> {
        let pharmacy = self.pharmacy.lock()?;
        Ok(pharmacy
            .schedules()
            .user_schedules(user_id)
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// Active schedules covering today.
    pub fn active_schedules(&self, user_id: u32) -> Result<Vec<FfiSchedule>, DrugCatalogError> {
        let pharmacy = self.pharmacy.lock()?;
        Ok(pharmacy
            .schedules()
            .active_schedules(user_id, today())
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// Today's doses, ordered by time.
    pub fn todays_doses(&self, user_id: u32) -> Result<Vec<FfiScheduledDose>, DrugCatalogError> {
        let pharmacy = self.pharmacy.lock()?;
        Ok(pharmacy
            .schedules()
            .todays_schedules(user_id, today())
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// Doses from today through `days` days ahead, ordered by date then time.
    pub fn upcoming_doses(&self, user_id: u32, days: u32) -> Result<Vec<FfiScheduledDose>, DrugCatalogError> {
        let pharmacy = self.pharmacy.lock()?;
        Ok(pharmacy
            .schedules()
            .upcoming(user_id, today(), days)
            .into_iter()
            .map(Into::into)
            .collect())
    }

    pub fn mark_dose_taken(&self, schedule_id: u32) -> Result<(), DrugCatalogError> {
        let mut pharmacy = self.pharmacy.lock()?;
        pharmacy.schedules_mut().mark_taken(schedule_id, now())?;
        Ok(())
    }

    /// Next dose instant of a schedule, formatted `YYYY-MM-DDTHH:MM:SS`.
    pub fn next_dose_at(&self, schedule_id: u32) -> Result<Option<String>, DrugCatalogError> {
        let pharmacy = self.pharmacy.lock()?;
        let schedule = pharmacy
            .schedules()
            .get(schedule_id)
            .ok_or_else(|| DrugCatalogError::NotFound(format!("schedule {}", schedule_id)))?;
        Ok(next_dose(schedule, now()).map(format_datetime))
    }

    pub fn has_schedule_for_drug(&self, user_id: u32, drug_id: u32) -> Result<bool, DrugCatalogError> {
        let pharmacy = self.pharmacy.lock()?;
        Ok(pharmacy.schedules().has_schedule_for_drug(user_id, drug_id))
    }
}

fn user_reminders(pharmacy: &Pharmacy, user_id: u32) -> Vec<MedicationReminder> {
    pharmacy
        .reminders()
        .all_for_user(user_id)
        .into_iter()
        .cloned()
        .collect()
}

fn to_ffi_drugs(drugs: Vec<&Drug>) -> Vec<FfiDrug> {
    drugs.into_iter().cloned().map(Into::into).collect()
}

// =========================================================================
// Date and time formatting
// =========================================================================

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, DrugCatalogError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|e| DrugCatalogError::InvalidInput(format!("{} {:?}: {}", field, value, e)))
}

/// Accepts `HH:MM` or `HH:MM:SS`.
fn parse_time(field: &str, value: &str) -> Result<NaiveTime, DrugCatalogError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|e| DrugCatalogError::InvalidInput(format!("{} {:?}: {}", field, value, e)))
}

fn parse_datetime(field: &str, value: &str) -> Result<NaiveDateTime, DrugCatalogError> {
    NaiveDateTime::parse_from_str(value.trim(), DATETIME_FORMAT)
        .map_err(|e| DrugCatalogError::InvalidInput(format!("{} {:?}: {}", field, value, e)))
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

fn format_datetime(instant: NaiveDateTime) -> String {
    instant.format(DATETIME_FORMAT).to_string()
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe drug. `expiry_date` is `YYYY-MM-DD`.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDrug {
    pub id: u32,
    pub name: String,
    pub active_substance: String,
    pub manufacturer: String,
    pub form: String,
    pub dosage: f64,
    pub dosage_unit: String,
    pub prescription_type: String,
    pub quantity: u32,
    pub expiry_date: String,
    pub category_id: u32,
    pub indications: Vec<String>,
    pub contraindications: Vec<String>,
}

impl From<Drug> for FfiDrug {
    fn from(drug: Drug) -> Self {
        Self {
            id: drug.id,
            name: drug.name,
            active_substance: drug.active_substance,
            manufacturer: drug.manufacturer,
            form: drug.form,
            dosage: drug.dosage,
            dosage_unit: drug.dosage_unit,
            prescription_type: drug.prescription_type,
            quantity: drug.quantity,
            expiry_date: format_date(drug.expiry_date),
            category_id: drug.category_id,
            indications: drug.indications,
            contraindications: drug.contraindications,
        }
    }
}

impl TryFrom<FfiDrug> for Drug {
    type Error = DrugCatalogError;

    fn try_from(drug: FfiDrug) -> Result<Self, Self::Error> {
        Ok(Drug {
            id: drug.id,
            name: drug.name,
            active_substance: drug.active_substance,
            manufacturer: drug.manufacturer,
            form: drug.form,
            dosage: drug.dosage,
            dosage_unit: drug.dosage_unit,
            prescription_type: drug.prescription_type,
            quantity: drug.quantity,
            expiry_date: parse_date("expiry_date", &drug.expiry_date)?,
            category_id: drug.category_id,
            indications: drug.indications,
            contraindications: drug.contraindications,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiExpiryStatus {
    Expired,
    ExpiringSoon,
    Valid,
}

impl From<ExpiryStatus> for FfiExpiryStatus {
    fn from(status: ExpiryStatus) -> Self {
        match status {
            ExpiryStatus::Expired => FfiExpiryStatus::Expired,
            ExpiryStatus::ExpiringSoon => FfiExpiryStatus::ExpiringSoon,
            ExpiryStatus::Valid => FfiExpiryStatus::Valid,
        }
    }
}

/// FFI-safe category with its display color as `#RRGGBB`.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCategory {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub color_hex: String,
}

impl From<&Category> for FfiCategory {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            description: category.description.clone(),
            color_hex: category.color().to_hex(),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSuggestion {
    pub name: String,
    pub score: f64,
}

impl From<Suggestion> for FfiSuggestion {
    fn from(suggestion: Suggestion) -> Self {
        Self {
            name: suggestion.name,
            score: suggestion.score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiSupplyTier {
    Critical,
    Warning,
    Healthy,
}

impl From<SupplyTier> for FfiSupplyTier {
    fn from(tier: SupplyTier) -> Self {
        match tier {
            SupplyTier::Critical => FfiSupplyTier::Critical,
            SupplyTier::Warning => FfiSupplyTier::Warning,
            SupplyTier::Healthy => FfiSupplyTier::Healthy,
        }
    }
}

/// FFI-safe supply estimate. `days`, `tier` and `runs_out_on` are set only
/// when the stock lasts a computable number of days.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSupplyEstimate {
    pub empty_stock: bool,
    pub insufficient_input: bool,
    pub days: Option<u64>,
    pub tier: Option<FfiSupplyTier>,
    pub runs_out_on: Option<String>,
    pub color_hex: String,
}

impl From<SupplyEstimate> for FfiSupplyEstimate {
    fn from(estimate: SupplyEstimate) -> Self {
        let color_hex = estimate.color().to_hex();
        match estimate {
            SupplyEstimate::EmptyStock => Self {
                empty_stock: true,
                insufficient_input: false,
                days: None,
                tier: None,
                runs_out_on: None,
                color_hex,
            },
            SupplyEstimate::InsufficientInput => Self {
                empty_stock: false,
                insufficient_input: true,
                days: None,
                tier: None,
                runs_out_on: None,
                color_hex,
            },
            SupplyEstimate::Lasts {
                days,
                tier,
                runs_out_on,
            } => Self {
                empty_stock: false,
                insufficient_input: false,
                days: Some(days),
                tier: Some(tier.into()),
                runs_out_on: Some(format_date(runs_out_on)),
                color_hex,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum FfiStockDeduction {
    Deducted { drug_id: u32, amount: u32, remaining: u32 },
    InsufficientStock { drug_id: u32, available: u32, requested: u32 },
    NothingToDeduct,
    DrugNotFound,
}

impl From<StockDeduction> for FfiStockDeduction {
    fn from(outcome: StockDeduction) -> Self {
        match outcome {
            StockDeduction::Deducted {
                drug_id,
                amount,
                remaining,
            } => FfiStockDeduction::Deducted {
                drug_id,
                amount,
                remaining,
            },
            StockDeduction::InsufficientStock {
                drug_id,
                available,
                requested,
            } => FfiStockDeduction::InsufficientStock {
                drug_id,
                available,
                requested,
            },
            StockDeduction::NothingToDeduct => FfiStockDeduction::NothingToDeduct,
            StockDeduction::DrugNotFound => FfiStockDeduction::DrugNotFound,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiUserRole {
    Admin,
    Manager,
    User,
}

impl From<UserRole> for FfiUserRole {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Admin => FfiUserRole::Admin,
            UserRole::Manager => FfiUserRole::Manager,
            UserRole::User => FfiUserRole::User,
        }
    }
}

impl From<FfiUserRole> for UserRole {
    fn from(role: FfiUserRole) -> Self {
        match role {
            FfiUserRole::Admin => UserRole::Admin,
            FfiUserRole::Manager => UserRole::Manager,
            FfiUserRole::User => UserRole::User,
        }
    }
}

/// FFI-safe user. The password hash never crosses the boundary.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiUser {
    pub id: u32,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub role: FfiUserRole,
    pub created_at: String,
    pub last_login: String,
    pub is_active: bool,
}

impl From<&User> for FfiUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            role: user.role.into(),
            created_at: format_datetime(user.created_at),
            last_login: format_datetime(user.last_login),
            is_active: user.is_active,
        }
    }
}

impl From<User> for FfiUser {
    fn from(user: User) -> Self {
        FfiUser::from(&user)
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRegistration {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: String,
    pub role: FfiUserRole,
}

impl From<FfiRegistration> for Registration {
    fn from(reg: FfiRegistration) -> Self {
        Registration {
            username: reg.username,
            password: reg.password,
            full_name: reg.full_name,
            email: reg.email,
            role: reg.role.into(),
        }
    }
}

/// FFI-safe reminder. `reminder_time` is `HH:MM`; `days_of_week` has seven
/// entries starting with Monday.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiReminder {
    pub id: u32,
    pub user_id: u32,
    pub drug_id: u32,
    pub drug_name: String,
    pub dosage: String,
    pub reminder_time: String,
    pub days_of_week: Vec<bool>,
    pub is_active: bool,
    pub notes: String,
}

impl From<&MedicationReminder> for FfiReminder {
    fn from(reminder: &MedicationReminder) -> Self {
        Self {
            id: reminder.id,
            user_id: reminder.user_id,
            drug_id: reminder.drug_id,
            drug_name: reminder.drug_name.clone(),
            dosage: reminder.dosage.clone(),
            reminder_time: format_time(reminder.reminder_time),
            days_of_week: reminder.days_of_week.to_vec(),
            is_active: reminder.is_active,
            notes: reminder.notes.clone(),
        }
    }
}

impl From<MedicationReminder> for FfiReminder {
    fn from(reminder: MedicationReminder) -> Self {
        FfiReminder::from(&reminder)
    }
}

impl TryFrom<FfiReminder> for MedicationReminder {
    type Error = DrugCatalogError;

    fn try_from(reminder: FfiReminder) -> Result<Self, Self::Error> {
        let days_of_week: [bool; 7] = reminder.days_of_week.as_slice().try_into().map_err(|_| {
            DrugCatalogError::InvalidInput(format!(
                "days_of_week needs 7 entries, got {}",
                reminder.days_of_week.len()
            ))
        })?;
        Ok(MedicationReminder {
            id: reminder.id,
            user_id: reminder.user_id,
            drug_id: reminder.drug_id,
            drug_name: reminder.drug_name,
            dosage: reminder.dosage,
            reminder_time: parse_time("reminder_time", &reminder.reminder_time)?,
            days_of_week,
            is_active: reminder.is_active,
            notes: reminder.notes,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiScheduleFrequency {
    Daily,
    Weekly,
    Monthly,
    SpecificDays,
    Once,
}

impl From<ScheduleFrequency> for FfiScheduleFrequency {
    fn from(frequency: ScheduleFrequency) -> Self {
        match frequency {
            ScheduleFrequency::Daily => FfiScheduleFrequency::Daily,
            ScheduleFrequency::Weekly => FfiScheduleFrequency::Weekly,
            ScheduleFrequency::Monthly => FfiScheduleFrequency::Monthly,
            ScheduleFrequency::SpecificDays => FfiScheduleFrequency::SpecificDays,
            ScheduleFrequency::Once => FfiScheduleFrequency::Once,
        }
    }
}

impl From<FfiScheduleFrequency> for ScheduleFrequency {
    fn from(frequency: FfiScheduleFrequency) -> Self {
        match frequency {
            FfiScheduleFrequency::Daily => ScheduleFrequency::Daily,
            FfiScheduleFrequency::Weekly => ScheduleFrequency::Weekly,
            FfiScheduleFrequency::Monthly => ScheduleFrequency::Monthly,
            FfiScheduleFrequency::SpecificDays => ScheduleFrequency::SpecificDays,
            FfiScheduleFrequency::Once => ScheduleFrequency::Once,
        }
    }
}

/// FFI-safe schedule. `created_at` and `last_taken` are read-only on input.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSchedule {
    pub id: u32,
    pub user_id: u32,
    pub drug_id: u32,
    pub drug_name: String,
    pub start_date: String,
    pub end_date: String,
    pub time: String,
    pub dosage: f64,
    pub dosage_unit: String,
    pub frequency: FfiScheduleFrequency,
    /// Comma-separated weekday numbers, 1 = Monday
    pub days_of_week: String,
    pub is_active: bool,
    pub notes: String,
    pub created_at: String,
    pub last_taken: Option<String>,
}

impl FfiSchedule {
    fn into_schedule(self, now: NaiveDateTime) -> Result<MedicationSchedule, DrugCatalogError> {
        let created_at = parse_datetime("created_at", &self.created_at).unwrap_or(now);
        let last_taken = match self.last_taken.as_deref() {
            Some(value) => Some(parse_datetime("last_taken", value)?),
            None => None,
        };
        Ok(MedicationSchedule {
            id: self.id,
            user_id: self.user_id,
            drug_id: self.drug_id,
            drug_name: self.drug_name,
            start_date: parse_date("start_date", &self.start_date)?,
            end_date: parse_date("end_date", &self.end_date)?,
            time: parse_time("time", &self.time)?,
            dosage: self.dosage,
            dosage_unit: self.dosage_unit,
            frequency: self.frequency.into(),
            days_of_week: self.days_of_week,
            is_active: self.is_active,
            notes: self.notes,
            created_at,
            last_taken,
        })
    }
}

impl From<&MedicationSchedule> for FfiSchedule {
    fn from(schedule: &MedicationSchedule) -> Self {
        Self {
            id: schedule.id,
            user_id: schedule.user_id,
            drug_id: schedule.drug_id,
            drug_name: schedule.drug_name.clone(),
            start_date: format_date(schedule.start_date),
            end_date: format_date(schedule.end_date),
            time: format_time(schedule.time),
            dosage: schedule.dosage,
            dosage_unit: schedule.dosage_unit.clone(),
            frequency: schedule.frequency.into(),
            days_of_week: schedule.days_of_week.clone(),
            is_active: schedule.is_active,
            notes: schedule.notes.clone(),
            created_at: format_datetime(schedule.created_at),
            last_taken: schedule.last_taken.map(format_datetime),
        }
    }
}

impl From<MedicationSchedule> for FfiSchedule {
    fn from(schedule: MedicationSchedule) -> Self {
        FfiSchedule::from(&schedule)
    }
}

/// One projected dose.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiScheduledDose {
    pub schedule_id: u32,
    pub drug_id: u32,
    pub drug_name: String,
    pub date: String,
    pub time: String,
    pub dosage: f64,
    pub dosage_unit: String,
}

impl From<ScheduledDose> for FfiScheduledDose {
    fn from(dose: ScheduledDose) -> Self {
        Self {
            schedule_id: dose.schedule_id,
            drug_id: dose.drug_id,
            drug_name: dose.drug_name,
            date: format_date(dose.date),
            time: format_time(dose.time),
            dosage: dose.dosage,
            dosage_unit: dose.dosage_unit,
        }
    }
}

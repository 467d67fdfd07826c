//! The catalog service: every store behind one handle, plus the workflows
//! that span more than one store.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};

use crate::config::Config;
use crate::dictionary::{DrugDictionary, Suggestion};
use crate::export::InventoryReport;
use crate::matching::{estimate_supply, parse_dosage_amount, SupplyEstimate};
use crate::models::{Drug, ExpiryStatus, DEFAULT_CATEGORY_ID};
use crate::store::{
    read_list, CategoryStore, DrugStore, ImportMode, ReminderStore, ScheduleStore, StockDeduction, StoreError,
    StoreResult, UserStore,
};

/// All persisted state of one data directory.
#[derive(Debug)]
pub struct Pharmacy {
    config: Config,
    drugs: DrugStore,
    categories: CategoryStore,
    users: UserStore,
    reminders: ReminderStore,
    schedules: ScheduleStore,
    dictionary: DrugDictionary,
}

impl Pharmacy {
    /// Load every data file under `config.data_dir`, seeding defaults where empty.
    pub fn open(config: Config, now: NaiveDateTime) -> StoreResult<Self> {
        let paths = config.paths();
        let mut pharmacy = Self {
            drugs: DrugStore::open(&paths.drugs)?,
            categories: CategoryStore::open(&paths.categories)?,
            users: UserStore::open(&paths.users, now)?,
            reminders: ReminderStore::open(&paths.reminders)?,
            schedules: ScheduleStore::open(&paths.schedules)?,
            dictionary: DrugDictionary::new(),
            config,
        };
        tracing::info!(
            data_dir = %pharmacy.config.data_dir.display(),
            drugs = pharmacy.drugs.list().len(),
            "Opened drug catalog"
        );

        if pharmacy.config.auto_delete_expired {
            pharmacy.drugs.remove_expired(now.date())?;
        }
        Ok(pharmacy)
    }

    /// Unbacked catalog; nothing touches the filesystem.
    pub fn in_memory(config: Config, now: NaiveDateTime) -> StoreResult<Self> {
        Ok(Self {
            drugs: DrugStore::in_memory(),
            categories: CategoryStore::in_memory(),
            users: UserStore::in_memory(now)?,
            reminders: ReminderStore::in_memory(),
            schedules: ScheduleStore::in_memory(),
            dictionary: DrugDictionary::new(),
            config,
        })
    }

    /// Re-read every data file, dropping in-memory state.
    pub fn reload(&mut self) -> StoreResult<()> {
        self.drugs.reload()?;
        self.categories.reload()?;
        self.users.reload()?;
        self.reminders.reload()?;
        self.schedules.reload()?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn drugs(&self) -> &DrugStore {
        &self.drugs
    }

    pub fn categories(&self) -> &CategoryStore {
        &self.categories
    }

    pub fn users(&self) -> &UserStore {
        &self.users
    }

    pub fn users_mut(&mut self) -> &mut UserStore {
        &mut self.users
    }

    pub fn reminders(&self) -> &ReminderStore {
        &self.reminders
    }

    pub fn reminders_mut(&mut self) -> &mut ReminderStore {
        &mut self.reminders
    }

    pub fn schedules(&self) -> &ScheduleStore {
        &self.schedules
    }

    pub fn schedules_mut(&mut self) -> &mut ScheduleStore {
        &mut self.schedules
    }

    pub fn dictionary(&self) -> &DrugDictionary {
        &self.dictionary
    }

    // ------------------------------------------------------------------
    // Drugs
    // ------------------------------------------------------------------

    pub fn add_drug(&mut self, drug: Drug, today: NaiveDate) -> StoreResult<Drug> {
        self.check_category(drug.category_id)?;
        self.drugs.add(drug, today)
    }

    pub fn update_drug(&mut self, drug: Drug) -> StoreResult<()> {
        self.check_category(drug.category_id)?;
        self.drugs.update(drug)
    }

    pub fn delete_drug(&mut self, id: u32) -> StoreResult<Drug> {
        self.drugs.delete(id)
    }

    fn check_category(&self, category_id: u32) -> StoreResult<()> {
        if self.categories.exists(category_id) {
            Ok(())
        } else {
            Err(StoreError::Validation(format!("unknown category {}", category_id)))
        }
    }

    pub fn expiry_status(&self, drug_id: u32, today: NaiveDate) -> Option<ExpiryStatus> {
        self.drugs
            .get(drug_id)
            .map(|d| d.expiry_status(today, self.config.expiring_window_days))
    }

    /// Drugs inside the configured expiry window, expired ones included.
    pub fn expiring_soon(&self, today: NaiveDate) -> Vec<&Drug> {
        self.drugs.expiring_within(today, self.config.expiring_window_days)
    }

    pub fn remove_expired(&mut self, today: NaiveDate) -> StoreResult<Vec<Drug>> {
        self.drugs.remove_expired(today)
    }

    /// Import another drug file. Drugs with an unknown category fall back to "Other".
    pub fn import_drugs<P: AsRef<Path>>(&mut self, path: P, mode: ImportMode) -> StoreResult<usize> {
        let mut drugs: Vec<Drug> = read_list(path.as_ref())?;
        for drug in &mut drugs {
            if !self.categories.exists(drug.category_id) {
                drug.category_id = DEFAULT_CATEGORY_ID;
            }
        }
        self.drugs.import(drugs, mode)
    }

    /// How long a drug's stock lasts at `dose` units taken `times_per_day`.
    pub fn supply_estimate(
        &self,
        drug_id: u32,
        dose: f64,
        times_per_day: f64,
        today: NaiveDate,
    ) -> StoreResult<SupplyEstimate> {
        let drug = self
            .drugs
            .get(drug_id)
            .ok_or_else(|| StoreError::NotFound(format!("drug {}", drug_id)))?;
        Ok(estimate_supply(drug.quantity, dose, times_per_day, today))
    }

    pub fn inventory_report(&self, today: NaiveDate) -> InventoryReport {
        InventoryReport::build(
            self.drugs.list(),
            self.categories.list(),
            today,
            self.config.expiring_window_days,
        )
    }

    /// Autocomplete drug names from the dictionary and the current inventory.
    pub fn suggest_drug_names(&self, query: &str, limit: usize) -> Vec<Suggestion> {
        self.dictionary
            .suggest_names(query, self.drugs.list().iter().map(|d| d.name.as_str()), limit)
    }

    // ------------------------------------------------------------------
    // Reminders
    // ------------------------------------------------------------------

    /// The user confirmed taking the dose of a fired reminder: deduct it from stock.
    ///
    /// The drug is found by id, falling back to a case-insensitive name match.
    pub fn confirm_reminder_taken(&mut self, user_id: u32, reminder_id: u32) -> StoreResult<StockDeduction> {
        let reminder = self
            .reminders
            .get(reminder_id)
            .filter(|r| r.user_id == user_id)
            .ok_or_else(|| StoreError::NotFound(format!("reminder {} for user {}", reminder_id, user_id)))?;

        let drug_id = match self.drugs.get(reminder.drug_id) {
            Some(drug) => drug.id,
            None => match self.drugs.find_by_name(&reminder.drug_name) {
                Some(drug) => drug.id,
                None => {
                    tracing::warn!(reminder_id, drug = %reminder.drug_name, "Reminder drug not in inventory");
                    return Ok(StockDeduction::DrugNotFound);
                }
            },
        };

        let amount = parse_dosage_amount(&reminder.dosage);
        self.drugs.deduct_stock(drug_id, amount)
    }
}

//! Drug inventory store.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{read_list, write_list, Repository, StoreError, StoreResult};
use crate::models::Drug;

/// How imported drugs are merged into the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Discard the current inventory; imported drugs are renumbered from 1
    Replace,
    /// Keep the current inventory; imported drugs are numbered after the highest id
    Append,
}

/// Result of taking units out of stock.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StockDeduction {
    Deducted { drug_id: u32, amount: u32, remaining: u32 },
    /// Stock left untouched
    InsufficientStock { drug_id: u32, available: u32, requested: u32 },
    /// The dosage didn't parse to a positive amount
    NothingToDeduct,
    DrugNotFound,
}

/// The drug inventory.
#[derive(Debug)]
pub struct DrugStore {
    repo: Repository<Drug>,
}

impl DrugStore {
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Ok(Self {
            repo: Repository::open(path)?,
        })
    }

    pub fn in_memory() -> Self {
        Self {
            repo: Repository::in_memory(),
        }
    }

    pub fn repository(&self) -> &Repository<Drug> {
        &self.repo
    }

    pub fn reload(&mut self) -> StoreResult<()> {
        self.repo.reload()
    }

    pub fn list(&self) -> &[Drug] {
        self.repo.items()
    }

    pub fn get(&self, id: u32) -> Option<&Drug> {
        self.repo.get(id)
    }

    /// Validate and add a new drug, assigning its id.
    pub fn add(&mut self, mut drug: Drug, today: NaiveDate) -> StoreResult<Drug> {
        drug.normalize();
        drug.validate_new(today).map_err(StoreError::Validation)?;
        let drug = self.repo.insert(drug)?;
        tracing::info!(drug_id = drug.id, name = %drug.name, "Added drug");
        Ok(drug)
    }

    /// Replace the stored drug with the same id.
    pub fn update(&mut self, mut drug: Drug) -> StoreResult<()> {
        drug.normalize();
        drug.validate().map_err(StoreError::Validation)?;
        let id = drug.id;
        self.repo
            .modify(id, |existing| *existing = drug)?
            .ok_or_else(|| StoreError::NotFound(format!("drug {}", id)))
    }

    pub fn delete(&mut self, id: u32) -> StoreResult<Drug> {
        let removed = self
            .repo
            .remove(id)?
            .ok_or_else(|| StoreError::NotFound(format!("drug {}", id)))?;
        tracing::info!(drug_id = id, name = %removed.name, "Deleted drug");
        Ok(removed)
    }

    /// Case-insensitive substring match on name or manufacturer. A blank query matches everything.
    pub fn search(&self, query: &str) -> Vec<&Drug> {
        let query = query.trim().to_lowercase();
        self.list()
            .iter()
            .filter(|d| {
                query.is_empty()
                    || d.name.to_lowercase().contains(&query)
                    || d.manufacturer.to_lowercase().contains(&query)
            })
            .collect()
    }

    pub fn by_manufacturer(&self, manufacturer: &str) -> Vec<&Drug> {
        let wanted = manufacturer.trim().to_lowercase();
        self.list()
            .iter()
            .filter(|d| d.manufacturer.to_lowercase() == wanted)
            .collect()
    }

    /// Distinct manufacturers, sorted.
    pub fn manufacturers(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .list()
            .iter()
            .map(|d| d.manufacturer.clone())
            .filter(|m| !m.is_empty())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    pub fn by_category(&self, category_id: u32) -> Vec<&Drug> {
        self.list()
            .iter()
            .filter(|d| d.category_id == category_id)
            .collect()
    }

    /// First drug whose name matches, ignoring case.
    pub fn find_by_name(&self, name: &str) -> Option<&Drug> {
        let wanted = name.trim().to_lowercase();
        self.list().iter().find(|d| d.name.to_lowercase() == wanted)
    }

    pub fn expired(&self, today: NaiveDate) -> Vec<&Drug> {
        self.list().iter().filter(|d| d.is_expired(today)).collect()
    }

    /// Drugs expiring within `window_days`, already expired ones included.
    pub fn expiring_within(&self, today: NaiveDate, window_days: u32) -> Vec<&Drug> {
        self.list()
            .iter()
            .filter(|d| d.expires_within(today, window_days))
            .collect()
    }

    /// Delete every expired drug, returning what was removed.
    pub fn remove_expired(&mut self, today: NaiveDate) -> StoreResult<Vec<Drug>> {
        let removed = self.repo.remove_where(|d| d.is_expired(today))?;
        if !removed.is_empty() {
            tracing::info!(count = removed.len(), "Removed expired drugs");
        }
        Ok(removed)
    }

    /// Take `amount` units out of stock if enough are on hand.
    pub fn deduct_stock(&mut self, drug_id: u32, amount: u32) -> StoreResult<StockDeduction> {
        if amount == 0 {
            return Ok(StockDeduction::NothingToDeduct);
        }
        let Some(drug) = self.get(drug_id) else {
            return Ok(StockDeduction::DrugNotFound);
        };
        if drug.quantity < amount {
            tracing::warn!(drug_id, available = drug.quantity, requested = amount, "Insufficient stock");
            return Ok(StockDeduction::InsufficientStock {
                drug_id,
                available: drug.quantity,
                requested: amount,
            });
        }

        let remaining = self
            .repo
            .modify(drug_id, |d| {
                d.quantity -= amount;
                d.quantity
            })?
            .unwrap_or_default();
        tracing::info!(drug_id, amount, remaining, "Deducted stock");
        Ok(StockDeduction::Deducted {
            drug_id,
            amount,
            remaining,
        })
    }

    /// Merge drugs into the inventory, renumbering them. Returns the count imported.
    pub fn import(&mut self, drugs: Vec<Drug>, mode: ImportMode) -> StoreResult<usize> {
        let count = drugs.len();
        let (mut merged, first_id) = match mode {
            ImportMode::Replace => (Vec::with_capacity(count), 1),
            ImportMode::Append => (self.list().to_vec(), self.repo.next_id()),
        };

        merged.extend(drugs.into_iter().zip(first_id..).map(|(mut drug, id)| {
            drug.id = id;
            drug
        }));

        self.repo.replace_all(merged)?;
        tracing::info!(count, ?mode, "Imported drugs");
        Ok(count)
    }

    /// Import drugs from another drug file.
    pub fn import_file<P: AsRef<Path>>(&mut self, path: P, mode: ImportMode) -> StoreResult<usize> {
        let drugs: Vec<Drug> = read_list(path.as_ref())?;
        self.import(drugs, mode)
    }

    /// Write the inventory to an arbitrary file.
    pub fn export_file<P: AsRef<Path>>(&self, path: P) -> StoreResult<()> {
        write_list(path.as_ref(), self.list())
    }
}

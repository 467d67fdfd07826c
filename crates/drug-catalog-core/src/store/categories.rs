//! Category lookup store.

use std::path::Path;

use super::{Repository, StoreResult};
use crate::models::{category_color, Category, Rgb};

/// Drug categories, seeded with defaults when empty.
#[derive(Debug)]
pub struct CategoryStore {
    repo: Repository<Category>,
}

impl CategoryStore {
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let mut store = Self {
            repo: Repository::open(path)?,
        };
        store.seed_defaults()?;
        Ok(store)
    }

    pub fn in_memory() -> Self {
        Self {
            repo: Repository::in_memory(),
        }
        .with_defaults()
    }

    fn with_defaults(mut self) -> Self {
        if self.repo.is_empty() {
            // An unbacked repository can't fail to save
            let _ = self.repo.replace_all(Category::defaults());
        }
        self
    }

    fn seed_defaults(&mut self) -> StoreResult<()> {
        if self.repo.is_empty() {
            tracing::info!("Seeding default categories");
            self.repo.replace_all(Category::defaults())?;
        }
        Ok(())
    }

    /// Re-read the file, seeding defaults again if it was emptied.
    pub fn reload(&mut self) -> StoreResult<()> {
        self.repo.reload()?;
        self.seed_defaults()
    }

    pub fn list(&self) -> &[Category] {
        self.repo.items()
    }

    pub fn get(&self, id: u32) -> Option<&Category> {
        self.repo.get(id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Category> {
        let wanted = name.trim().to_lowercase();
        self.list().iter().find(|c| c.name.to_lowercase() == wanted)
    }

    pub fn exists(&self, id: u32) -> bool {
        self.get(id).is_some()
    }

    /// Display color for a category id.
    pub fn color(&self, id: u32) -> Rgb {
        category_color(id)
    }

    /// Category name, or an empty string for unknown ids.
    pub fn name_of(&self, id: u32) -> &str {
        self.get(id).map(|c| c.name.as_str()).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_seeds_defaults_on_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("categories.json");

        let store = CategoryStore::open(&path).unwrap();
        assert_eq!(store.list().len(), 9);
        assert!(path.exists());
    }

    #[test]
    fn test_keeps_existing_categories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("categories.json");
        crate::store::write_list(&path, &[Category::new(1, "Custom", "")]).unwrap();

        let store = CategoryStore::open(&path).unwrap();
        assert_eq!(store.list().len(), 1);
        assert_eq!(store.name_of(1), "Custom");
    }

    #[test]
    fn test_reload_picks_up_edits() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("categories.json");
        let mut store = CategoryStore::open(&path).unwrap();

        let mut edited = Category::defaults();
        edited.push(Category::new(10, "Dermatology", "Skin care"));
        crate::store::write_list(&path, &edited).unwrap();
        store.reload().unwrap();
        assert_eq!(store.name_of(10), "Dermatology");

        crate::store::write_list::<Category>(&path, &[]).unwrap();
        store.reload().unwrap();
        assert_eq!(store.list().len(), 9);
    }

    #[test]
    fn test_lookups() {
        let store = CategoryStore::in_memory();
        assert_eq!(store.get(3).unwrap().name, "Antibiotics");
        assert_eq!(store.find_by_name("vitamins").unwrap().id, 9);
        assert!(!store.exists(10));
        assert_eq!(store.name_of(10), "");
        assert_eq!(store.color(2), Rgb::LIGHT_BLUE);
    }
}

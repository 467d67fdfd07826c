//! Reference data for drug entry: common drug names, manufacturers, forms,
//! dosage units, plus a keyword category classifier and fuzzy autocomplete.

mod suggest;

pub use suggest::*;

use std::collections::BTreeMap;

use crate::models::DEFAULT_CATEGORY_ID;

pub const DOSAGE_UNITS: [&str; 5] = ["mg", "g", "ml", "UI", "%"];

pub const PRESCRIPTION_TYPES: [&str; 2] = ["Over-the-counter", "Prescription"];

pub const COMMON_DOSAGES: [&str; 11] = ["50", "100", "200", "250", "500", "1000", "1", "2.5", "5", "10", "20"];

pub const COMMON_QUANTITIES: [u32; 6] = [10, 20, 30, 50, 60, 100];

/// Category keyword rules, checked in order. Names are matched lowercased.
const CATEGORY_KEYWORDS: &[(u32, &[&str])] = &[
    (2, &["paracetamol", "ibuprofen", "analgin", "парацетамол", "ибупрофен"]),
    (3, &["amoxicillin", "azithromycin", "амоксициллин", "азитромицин"]),
    (4, &["aspirin", "amlodipine", "аспирин", "амлодипин"]),
    (5, &["omeprazole", "омепразол"]),
    (7, &["loratadine", "лоратадин"]),
    (8, &["glycine", "глицин"]),
    (9, &["vitamin", "ascorbic", "витамин", "аскорбиновая"]),
];

/// Lookup tables used to pre-fill the drug entry form.
#[derive(Debug, Clone)]
pub struct DrugDictionary {
    /// Drug name → indication
    drugs: BTreeMap<String, String>,
    manufacturers: Vec<String>,
    forms: Vec<String>,
}

impl Default for DrugDictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl DrugDictionary {
    pub fn new() -> Self {
        Self {
            drugs: Self::default_drugs(),
            manufacturers: to_strings(&[
                "Pharmstandard",
                "Veropharm",
                "Ozon",
                "Sintez",
                "Biochemist",
                "Bayer",
                "Teva",
                "Sandoz",
                "Pfizer",
            ]),
            forms: to_strings(&[
                "Tablets", "Capsules", "Solution", "Syrup", "Ointment", "Gel", "Ampoules", "Spray", "Dragee",
                "Powder",
            ]),
        }
    }

    fn default_drugs() -> BTreeMap<String, String> {
        [
            ("Paracetamol", "Antipyretic, analgesic"),
            ("Ibuprofen", "Anti-inflammatory, analgesic"),
            ("Analgin", "Analgesic"),
            ("Aspirin Cardio", "Antiplatelet"),
            ("Amlodipine", "Antihypertensive"),
            ("Omeprazole", "Proton pump inhibitor"),
            ("Loratadine", "Antihistamine"),
            ("Glycine", "Nootropic, sedative"),
            ("Ascorbic acid", "Vitamin C"),
            ("Azithromycin", "Antibiotic"),
            ("Amoxicillin", "Antibiotic"),
            ("Ketorol", "Analgesic"),
        ]
        .into_iter()
        .map(|(name, indication)| (name.to_string(), indication.to_string()))
        .collect()
    }

    /// Known drug names, sorted.
    pub fn drug_names(&self) -> impl Iterator<Item = &str> {
        self.drugs.keys().map(String::as_str)
    }

    /// Indication for a known drug name, ignoring case.
    pub fn indication(&self, name: &str) -> Option<&str> {
        let wanted = name.trim().to_lowercase();
        self.drugs
            .iter()
            .find(|(k, _)| k.to_lowercase() == wanted)
            .map(|(_, v)| v.as_str())
    }

    pub fn manufacturers(&self) -> &[String] {
        &self.manufacturers
    }

    pub fn forms(&self) -> &[String] {
        &self.forms
    }

    /// Autocomplete over the dictionary's drug names plus `extra` (typically the catalog's names).
    pub fn suggest_names<'a, I>(&'a self, query: &str, extra: I, limit: usize) -> Vec<Suggestion>
    where
        I: IntoIterator<Item = &'a str>,
    {
        suggest(query, self.drug_names().chain(extra), limit)
    }
}

/// Guess a category id from a drug name; unknown names fall into "Other".
pub fn determine_category(drug_name: &str) -> u32 {
    let name = drug_name.trim().to_lowercase();
    if name.is_empty() {
        return DEFAULT_CATEGORY_ID;
    }
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| name.contains(k)))
        .map_or(DEFAULT_CATEGORY_ID, |(id, _)| *id)
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determine_category() {
        assert_eq!(determine_category("Paracetamol 500"), 2);
        assert_eq!(determine_category("AMOXICILLIN"), 3);
        assert_eq!(determine_category("Aspirin Cardio"), 4);
        assert_eq!(determine_category("Omeprazole"), 5);
        assert_eq!(determine_category("Loratadine"), 7);
        assert_eq!(determine_category("Glycine"), 8);
        assert_eq!(determine_category("Vitamin D3"), 9);
        assert_eq!(determine_category("Аскорбиновая кислота"), 9);
        assert_eq!(determine_category("Ketorol"), 1);
        assert_eq!(determine_category("   "), 1);
    }

    #[test]
    fn test_dictionary_tables() {
        let dict = DrugDictionary::new();
        assert_eq!(dict.drug_names().count(), 12);
        assert_eq!(dict.indication("omeprazole"), Some("Proton pump inhibitor"));
        assert!(dict.indication("Unobtainium").is_none());
        assert!(dict.manufacturers().iter().any(|m| m == "Bayer"));
        assert_eq!(dict.forms().len(), 10);
    }

    #[test]
    fn test_suggest_names_includes_extra() {
        let dict = DrugDictionary::new();
        let names = dict.suggest_names("nurofen", ["Nurofen Forte"], 3);
        assert_eq!(names[0].name, "Nurofen Forte");
    }
}

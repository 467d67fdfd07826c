//! Save/load round trips through the JSON data directory.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use tempfile::TempDir;

use drug_catalog_core::config::Config;
use drug_catalog_core::models::{Category, Drug, MedicationReminder, MedicationSchedule, ScheduleFrequency, UserRole};
use drug_catalog_core::store::{
    write_list, DrugStore, Registration, ReminderStore, ScheduleStore, StockDeduction, StoreError, UserStore,
};
use drug_catalog_core::Pharmacy;

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 2)
        .unwrap()
        .and_hms_opt(10, 30, 0)
        .unwrap()
}

fn make_drug(name: &str) -> Drug {
    let mut drug = Drug::new(
        name.to_string(),
        format!("{} substance", name),
        "Sandoz".to_string(),
        NaiveDate::from_ymd_opt(2027, 6, 30).unwrap(),
    );
    drug.form = "Tablets".to_string();
    drug.dosage = 2.5;
    drug.dosage_unit = "mg".to_string();
    drug.prescription_type = "Prescription".to_string();
    drug.quantity = 28;
    drug.category_id = 4;
    drug.indications = vec!["Hypertension".to_string()];
    drug.contraindications = vec!["Pregnancy".to_string(), "Hypotension".to_string()];
    drug
}

#[test]
fn test_drugs_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("drugs.json");

    let mut store = DrugStore::open(&path).unwrap();
    store.add(make_drug("Amlodipine"), now().date()).unwrap();
    store.add(make_drug("Bisoprolol"), now().date()).unwrap();

    let reopened = DrugStore::open(&path).unwrap();
    assert_eq!(reopened.list(), store.list());
    assert_eq!(reopened.get(2).unwrap().contraindications.len(), 2);
}

#[test]
fn test_users_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("users.json");

    let mut store = UserStore::open(&path, now()).unwrap();
    store
        .register(
            Registration {
                username: "pharmacist".to_string(),
                password: "s3cret-pass".to_string(),
                full_name: "Olga Petrova".to_string(),
                email: "olga@example.com".to_string(),
                role: UserRole::Manager,
            },
            now(),
        )
        .unwrap();

    let mut reopened = UserStore::open(&path, now()).unwrap();
    let originals: Vec<_> = store.list_active().into_iter().cloned().collect();
    let loaded: Vec<_> = reopened.list_active().into_iter().cloned().collect();
    assert_eq!(loaded, originals);

    // The salted hash survives the trip
    let user = reopened.login("pharmacist", "s3cret-pass", now()).unwrap();
    assert_eq!(user.role, UserRole::Manager);
}

#[test]
fn test_reminders_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("reminders.json");

    let mut store = ReminderStore::open(&path).unwrap();
    let morning = MedicationReminder::new(0, 1, "Amlodipine", "1 tablet", NaiveTime::from_hms_opt(8, 15, 0).unwrap())
        .on_days(&[Weekday::Mon, Weekday::Thu, Weekday::Sun]);
    let evening = MedicationReminder::new(0, 2, "Bisoprolol", "0,5 tablet", NaiveTime::from_hms_opt(21, 0, 0).unwrap())
        .every_day();
    store.add(2, morning).unwrap();
    store.add(2, evening).unwrap();

    let reopened = ReminderStore::open(&path).unwrap();
    assert_eq!(reopened.all_for_user(2), store.all_for_user(2));
    assert!(reopened.get(1).unwrap().is_scheduled_on(Weekday::Sun));
}

#[test]
fn test_schedules_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("schedules.json");

    let mut store = ScheduleStore::open(&path).unwrap();
    let mut schedule = MedicationSchedule::new(0, 1, "Amlodipine", now().date(), now());
    schedule.frequency = ScheduleFrequency::SpecificDays;
    schedule.set_weekdays(&[Weekday::Tue, Weekday::Fri]);
    let schedule = store.add(3, schedule).unwrap();
    store.mark_taken(schedule.id, now()).unwrap();

    let reopened = ScheduleStore::open(&path).unwrap();
    assert_eq!(reopened.get(schedule.id), store.get(schedule.id));
    assert_eq!(reopened.get(schedule.id).unwrap().last_taken, Some(now()));
}

#[test]
fn test_pharmacy_data_directory_layout() {
    let dir = TempDir::new().unwrap();
    let data_dir = dir.path().join("catalog");
    let config = Config::with_data_dir(&data_dir);

    let mut pharmacy = Pharmacy::open(config.clone(), now()).unwrap();
    pharmacy.add_drug(make_drug("Amlodipine"), now().date()).unwrap();
    pharmacy
        .reminders_mut()
        .add(
            1,
            MedicationReminder::new(0, 1, "Amlodipine", "1", NaiveTime::from_hms_opt(9, 0, 0).unwrap()).every_day(),
        )
        .unwrap();

    let paths = config.paths();
    assert!(paths.drugs.exists());
    assert!(paths.users.exists());
    assert!(paths.categories.exists());
    assert!(paths.reminders.exists());
    // Nothing scheduled yet
    assert!(!paths.schedules.exists());

    let reopened = Pharmacy::open(config, now()).unwrap();
    assert_eq!(reopened.drugs().list(), pharmacy.drugs().list());
    assert_eq!(reopened.categories().list().len(), 9);
    assert_eq!(reopened.users().list_active().len(), 1);
}

#[test]
fn test_malformed_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("reminders.json");
    std::fs::write(&path, "[{\"id\": 1,").unwrap();

    let result = ReminderStore::open(&path);
    assert!(matches!(result, Err(StoreError::Parse { .. })));
}

#[test]
fn test_failed_save_keeps_stock() {
    let dir = TempDir::new().unwrap();
    let data_dir = dir.path().join("catalog");
    let config = Config::with_data_dir(&data_dir);

    let mut pharmacy = Pharmacy::open(config.clone(), now()).unwrap();
    pharmacy.add_drug(make_drug("Amlodipine"), now().date()).unwrap();
    let reminder = pharmacy
        .reminders_mut()
        .add(
            1,
            MedicationReminder::new(0, 1, "Amlodipine", "2 tablets", NaiveTime::from_hms_opt(9, 0, 0).unwrap())
                .every_day(),
        )
        .unwrap();

    // The data directory becomes unwritable
    std::fs::remove_dir_all(&data_dir).unwrap();
    std::fs::write(&data_dir, "").unwrap();

    let result = pharmacy.confirm_reminder_taken(1, reminder.id);
    assert!(matches!(result, Err(StoreError::Io { .. })));
    assert_eq!(pharmacy.drugs().get(1).unwrap().quantity, 28);

    // A retry once the disk is back deducts exactly once
    std::fs::remove_file(&data_dir).unwrap();
    assert_eq!(
        pharmacy.confirm_reminder_taken(1, reminder.id).unwrap(),
        StockDeduction::Deducted { drug_id: 1, amount: 2, remaining: 26 }
    );
    let reopened = DrugStore::open(config.paths().drugs).unwrap();
    assert_eq!(reopened.get(1).unwrap().quantity, 26);
}

#[test]
fn test_reload_rereads_categories() {
    let dir = TempDir::new().unwrap();
    let config = Config::with_data_dir(dir.path());
    let mut pharmacy = Pharmacy::open(config.clone(), now()).unwrap();
    assert!(!pharmacy.categories().exists(10));

    let mut categories = Category::defaults();
    categories.push(Category::new(10, "Dermatology", "Skin care"));
    write_list(&config.paths().categories, &categories).unwrap();

    pharmacy.reload().unwrap();
    assert_eq!(pharmacy.categories().name_of(10), "Dermatology");
}

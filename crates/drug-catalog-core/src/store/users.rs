//! User accounts store.

use std::path::Path;

use chrono::NaiveDateTime;

use super::{Repository, StoreError, StoreResult};
use crate::models::{validate_password, User, UserRole, ADMIN_USERNAME, MIN_PASSWORD_LEN};

/// Password of the seeded administrator account.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: String,
    pub role: UserRole,
}

/// User accounts, seeded with an administrator when empty.
#[derive(Debug)]
pub struct UserStore {
    repo: Repository<User>,
}

impl UserStore {
    pub fn open<P: AsRef<Path>>(path: P, now: NaiveDateTime) -> StoreResult<Self> {
        let mut store = Self {
            repo: Repository::open(path)?,
        };
        store.seed_admin(now)?;
        Ok(store)
    }

    pub fn in_memory(now: NaiveDateTime) -> StoreResult<Self> {
        let mut store = Self {
            repo: Repository::in_memory(),
        };
        store.seed_admin(now)?;
        Ok(store)
    }

    fn seed_admin(&mut self, now: NaiveDateTime) -> StoreResult<()> {
        if !self.repo.is_empty() {
            return Ok(());
        }
        let mut admin = User::new(ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD, UserRole::Admin, now);
        admin.full_name = "System Administrator".into();
        admin.email = "admin@drugcatalog.com".into();
        self.repo.insert(admin)?;
        tracing::info!("Created default administrator account");
        Ok(())
    }

    pub fn reload(&mut self) -> StoreResult<()> {
        self.repo.reload()
    }

    /// Any record with this username exists, active or not.
    pub fn user_exists(&self, username: &str) -> bool {
        self.repo.items().iter().any(|u| u.has_username(username))
    }

    pub fn register(&mut self, registration: Registration, now: NaiveDateTime) -> StoreResult<User> {
        let username = registration.username.trim();
        if username.is_empty() {
            return Err(StoreError::Validation("username is required".into()));
        }
        if self.user_exists(username) {
            return Err(StoreError::Duplicate(format!("username {}", username)));
        }
        if !validate_password(&registration.password) {
            return Err(StoreError::Validation(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let mut user = User::new(username, &registration.password, registration.role, now);
        user.full_name = registration.full_name.trim().to_string();
        user.email = registration.email.trim().to_string();

        let user = self.repo.insert(user)?;
        tracing::info!(user_id = user.id, username = %user.username, role = ?user.role, "Registered user");
        Ok(user)
    }

    /// Authenticate an active user and stamp the login time.
    pub fn login(&mut self, username: &str, password: &str, now: NaiveDateTime) -> StoreResult<User> {
        let user = self
            .repo
            .items()
            .iter()
            .find(|u| u.is_active && u.has_username(username))
            .ok_or_else(|| StoreError::UnknownUser(username.trim().to_string()))?;

        if !user.verify_password(password) {
            tracing::warn!(username = %user.username, "Failed login");
            return Err(StoreError::WrongPassword(user.username.clone()));
        }

        let id = user.id;
        let user = self
            .repo
            .modify(id, |u| {
                u.last_login = now;
                u.clone()
            })?
            .ok_or_else(|| StoreError::NotFound(format!("user {}", id)))?;
        tracing::info!(user_id = id, username = %user.username, "User logged in");
        Ok(user)
    }

    /// Active users.
    pub fn list_active(&self) -> Vec<&User> {
        self.repo.items().iter().filter(|u| u.is_active).collect()
    }

    /// Active user by id.
    pub fn get_user(&self, id: u32) -> Option<&User> {
        self.repo.get(id).filter(|u| u.is_active)
    }

    /// Update profile fields, role and active flag. Username and password are left alone.
    pub fn update_user(&mut self, user: &User) -> StoreResult<()> {
        let protected = self
            .repo
            .get(user.id)
            .is_some_and(|u| u.username == ADMIN_USERNAME);
        // The built-in administrator stays an active admin
        if protected && (!user.is_active || user.role != UserRole::Admin) {
            return Err(StoreError::Protected(ADMIN_USERNAME.into()));
        }

        self.repo
            .modify(user.id, |existing| {
                existing.full_name = user.full_name.trim().to_string();
                existing.email = user.email.trim().to_string();
                existing.role = user.role;
                existing.is_active = user.is_active;
            })?
            .ok_or_else(|| StoreError::NotFound(format!("user {}", user.id)))
    }

    /// Deactivate a user. The built-in administrator can't be deleted.
    pub fn delete_user(&mut self, id: u32) -> StoreResult<()> {
        let user = self
            .repo
            .get(id)
            .ok_or_else(|| StoreError::NotFound(format!("user {}", id)))?;
        if user.username == ADMIN_USERNAME {
            return Err(StoreError::Protected(ADMIN_USERNAME.into()));
        }

        self.repo.modify(id, |u| u.is_active = false)?;
        tracing::info!(user_id = id, "Deactivated user");
        Ok(())
    }

    pub fn change_password(&mut self, id: u32, new_password: &str) -> StoreResult<()> {
        if !validate_password(new_password) {
            return Err(StoreError::Validation(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        self.repo
            .modify(id, |u| u.set_password(new_password))?
            .ok_or_else(|| StoreError::NotFound(format!("user {}", id)))?;
        tracing::info!(user_id = id, "Password changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn registration(username: &str) -> Registration {
        Registration {
            username: username.into(),
            password: "password1".into(),
            full_name: "Test User".into(),
            email: "test@example.com".into(),
            role: UserRole::User,
        }
    }

    fn setup() -> UserStore {
        UserStore::in_memory(now()).unwrap()
    }

    #[test]
    fn test_default_admin() {
        let mut store = setup();
        assert_eq!(store.list_active().len(), 1);
        let admin = store.login("admin", DEFAULT_ADMIN_PASSWORD, now()).unwrap();
        assert!(admin.is_admin());
    }

    #[test]
    fn test_register_and_login() {
        let mut store = setup();
        let user = store.register(registration("alice"), now()).unwrap();
        assert_eq!(user.id, 2);

        let later = now() + chrono::Duration::hours(1);
        let logged_in = store.login(" ALICE ", "password1", later).unwrap();
        assert_eq!(logged_in.id, 2);
        assert_eq!(store.get_user(2).unwrap().last_login, later);
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let mut store = setup();
        store.register(registration("alice"), now()).unwrap();
        let result = store.register(registration("Alice"), now());
        assert!(matches!(result, Err(StoreError::Duplicate(_))));
    }

    #[test]
    fn test_weak_password_rejected() {
        let mut store = setup();
        let mut reg = registration("bob");
        reg.password = "12345".into();
        assert!(matches!(store.register(reg, now()), Err(StoreError::Validation(_))));
    }

    #[test]
    fn test_login_errors() {
        let mut store = setup();
        store.register(registration("alice"), now()).unwrap();

        assert!(matches!(store.login("nobody", "password1", now()), Err(StoreError::UnknownUser(_))));
        assert!(matches!(store.login("alice", "wrong-pass", now()), Err(StoreError::WrongPassword(_))));
    }

    #[test]
    fn test_delete_is_soft_and_admin_protected() {
        let mut store = setup();
        let alice = store.register(registration("alice"), now()).unwrap();

        store.delete_user(alice.id).unwrap();
        assert!(store.get_user(alice.id).is_none());
        assert!(matches!(store.login("alice", "password1", now()), Err(StoreError::UnknownUser(_))));
        // The username stays taken
        assert!(store.user_exists("alice"));

        assert!(matches!(store.delete_user(1), Err(StoreError::Protected(_))));
        assert!(matches!(store.delete_user(99), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_update_user() {
        let mut store = setup();
        let mut alice = store.register(registration("alice"), now()).unwrap();
        alice.full_name = "Alice Smith".into();
        alice.role = UserRole::Manager;
        store.update_user(&alice).unwrap();

        let stored = store.get_user(alice.id).unwrap();
        assert_eq!(stored.full_name, "Alice Smith");
        assert_eq!(stored.role, UserRole::Manager);

        let mut admin = store.get_user(1).unwrap().clone();
        admin.is_active = false;
        assert!(matches!(store.update_user(&admin), Err(StoreError::Protected(_))));

        let mut demoted = store.get_user(1).unwrap().clone();
        demoted.role = UserRole::User;
        assert!(matches!(store.update_user(&demoted), Err(StoreError::Protected(_))));
        assert!(store.get_user(1).unwrap().is_admin());

        // Profile edits on the admin are still fine
        let mut renamed = store.get_user(1).unwrap().clone();
        renamed.full_name = "Head Pharmacist".into();
        store.update_user(&renamed).unwrap();
        assert_eq!(store.get_user(1).unwrap().full_name, "Head Pharmacist");
    }

    #[test]
    fn test_cyrillic_usernames_ignore_case() {
        let mut store = setup();
        store.register(registration("Ольга"), now()).unwrap();

        assert!(store.user_exists("ОЛЬГА"));
        assert!(matches!(
            store.register(registration("ольга"), now()),
            Err(StoreError::Duplicate(_))
        ));
        assert_eq!(store.login("ольга", "password1", now()).unwrap().username, "Ольга");
    }

    #[test]
    fn test_change_password() {
        let mut store = setup();
        let alice = store.register(registration("alice"), now()).unwrap();

        assert!(store.change_password(alice.id, "short").is_err());
        store.change_password(alice.id, "new-password").unwrap();

        assert!(store.login("alice", "password1", now()).is_err());
        assert!(store.login("alice", "new-password", now()).is_ok());
    }
}

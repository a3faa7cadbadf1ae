use super::*;
use std::collections::HashMap;
use std::sync::Mutex;

// =========================================================
// Shared Mock Storage
// =========================================================

type Shelf = Arc<Mutex<HashMap<String, String>>>;

/// In-memory two-tier storage.
///
/// `reload()` simulates a page reload (both tiers survive), `new_tab()` a
/// new tab (only the durable tier is shared).
#[derive(Clone, Default)]
pub struct MemoryStorage {
    durable: Shelf,
    ephemeral: Shelf,
    unavailable: Arc<Mutex<bool>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        let storage = Self::default();
        storage.set_available(false);
        storage
    }

    pub fn set_available(&self, available: bool) {
        *self.unavailable.lock().unwrap() = !available;
    }

    pub fn new_tab(&self) -> Self {
        Self {
            durable: self.durable.clone(),
            ephemeral: Shelf::default(),
            unavailable: Arc::new(Mutex::new(false)),
        }
    }

    pub fn raw(&self, tier: Tier, key: &str) -> Option<String> {
        self.shelf(tier).lock().unwrap().get(key).cloned()
    }

    fn shelf(&self, tier: Tier) -> &Shelf {
        match tier {
            Tier::Durable => &self.durable,
            Tier::Ephemeral => &self.ephemeral,
        }
    }

    fn check(&self) -> Result<(), StorageError> {
        if *self.unavailable.lock().unwrap() {
            Err(StorageError::Unavailable("private browsing".into()))
        } else {
            Ok(())
        }
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, tier: Tier, key: &str) -> Result<Option<String>, StorageError> {
        self.check()?;
        Ok(self.raw(tier, key))
    }

    fn set(&self, tier: Tier, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        self.shelf(tier)
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, tier: Tier, key: &str) -> Result<(), StorageError> {
        self.check()?;
        self.shelf(tier).lock().unwrap().remove(key);
        Ok(())
    }
}

pub const KEY: &str = "carbonmart.session";

pub fn user(role: Role) -> User {
    User {
        id: "u-1".into(),
        email: "owner@example.com".into(),
        role,
    }
}

/// Builds an unsigned JWT whose payload carries `exp`.
pub fn jwt_with_exp(exp: i64) -> String {
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"u-1","exp":{}}}"#, exp));
    format!("eyJhbGciOiJIUzI1NiJ9.{}.c2ln", payload)
}

fn store(storage: &MemoryStorage) -> SessionStore<MemoryStorage> {
    SessionStore::new(storage.clone(), KEY)
}

// =========================================================
// Tests
// =========================================================

#[test]
fn login_is_visible_immediately() {
    let storage = MemoryStorage::new();
    let store = store(&storage);
    assert!(store.current_user().is_none());

    store.login(user(Role::EvOwner), "tok", false);

    let session = store.current_user().unwrap();
    assert_eq!(session.user.email, "owner@example.com");
    assert_eq!(session.persistence, Persistence::Session);
    assert!(store.is_authenticated());
}

#[test]
fn remembered_login_survives_reload() {
    let storage = MemoryStorage::new();
    store(&storage).login(user(Role::Company), "tok", true);

    let after_reload = store(&storage);
    let session = after_reload.current_user().unwrap();
    assert_eq!(session.user.email, "owner@example.com");
    assert_eq!(session.persistence, Persistence::Durable);
    assert!(storage.raw(Tier::Ephemeral, KEY).is_none());
}

#[test]
fn tab_login_is_isolated_from_new_tabs() {
    let storage = MemoryStorage::new();
    store(&storage).login(user(Role::User), "tok", false);

    // Same tab reload keeps it.
    assert!(store(&storage).current_user().is_some());
    // A new tab does not see it.
    assert!(store(&storage.new_tab()).current_user().is_none());
}

#[test]
fn login_replaces_other_tier() {
    let storage = MemoryStorage::new();
    let store = store(&storage);
    store.login(user(Role::User), "first", true);
    store.login(user(Role::User), "second", false);

    assert!(storage.raw(Tier::Durable, KEY).is_none());
    assert!(storage.raw(Tier::Ephemeral, KEY).is_some());
    assert_eq!(store.current_user().unwrap().token.expose(), "second");
}

#[test]
fn logout_clears_everything_and_is_idempotent() {
    let storage = MemoryStorage::new();
    let store = store(&storage);
    store.login(user(Role::Admin), "tok", true);

    store.logout();
    store.logout();

    assert!(store.current_user().is_none());
    assert!(storage.raw(Tier::Durable, KEY).is_none());
    assert!(storage.raw(Tier::Ephemeral, KEY).is_none());
}

#[test]
fn unavailable_storage_degrades_to_memory() {
    let storage = MemoryStorage::unavailable();
    let store = store(&storage);

    let session = store.login(user(Role::Cva), "tok", true);
    assert_eq!(store.current_user(), Some(session));

    store.logout();
    assert!(store.current_user().is_none());
}

#[test]
fn storage_failure_after_login_keeps_memory_copy() {
    let storage = MemoryStorage::new();
    let store = store(&storage);
    store.login(user(Role::Company), "tok", true);

    storage.set_available(false);
    assert!(store.current_user().is_some());
}

#[test]
fn logout_in_other_tab_is_observed() {
    let storage = MemoryStorage::new();
    let tab_a = store(&storage);
    let tab_b = store(&storage.new_tab());
    tab_a.login(user(Role::EvOwner), "tok", true);
    assert!(tab_b.current_user().is_some());

    tab_a.logout();
    assert!(tab_b.current_user().is_none());
}

#[test]
fn reload_rereads_storage() {
    let storage = MemoryStorage::new();
    let store = store(&storage);
    store.login(user(Role::EvOwner), "tok", true);

    let other = SessionStore::new(storage.clone(), KEY);
    other.login(
        User {
            email: "company@example.com".into(),
            ..user(Role::Company)
        },
        "tok2",
        true,
    );

    store.reload();
    assert_eq!(
        store.current_user().unwrap().user.email,
        "company@example.com"
    );
}

#[test]
fn corrupted_entry_is_anonymous() {
    let storage = MemoryStorage::new();
    storage.set(Tier::Durable, KEY, "{not json").unwrap();
    assert!(store(&storage).current_user().is_none());
}

#[test]
fn expired_jwt_clears_session() {
    let storage = MemoryStorage::new();
    let store = store(&storage);
    store.login(user(Role::User), jwt_with_exp(1_000_000_000), true);

    assert!(store.current_user().is_none());
    assert!(storage.raw(Tier::Durable, KEY).is_none());
}

#[test]
fn future_jwt_and_opaque_tokens_are_kept() {
    let storage = MemoryStorage::new();
    let store = store(&storage);
    store.login(user(Role::User), jwt_with_exp(4_000_000_000), true);
    assert!(store.current_user().is_some());

    store.login(user(Role::User), "opaque-token", true);
    assert!(store.current_user().is_some());
    assert!(BearerToken::from("opaque-token").expires_at().is_none());
}

#[test]
fn token_is_redacted_in_debug() {
    let storage = MemoryStorage::new();
    let session = store(&storage).login(user(Role::User), "super-secret", false);
    let printed = format!("{:?}", session);
    assert!(!printed.contains("super-secret"));
    assert!(printed.contains("BearerToken(***)"));
}

#[test]
fn role_wire_spelling_is_preserved() {
    let roles = [
        (Role::EvOwner, "\"EV_OWNER\""),
        (Role::Company, "\"COMPANY\""),
        (Role::Cva, "\"CVA\""),
        (Role::Admin, "\"Admin\""),
        (Role::User, "\"USER\""),
    ];
    for (role, wire) in roles {
        assert_eq!(serde_json::to_string(&role).unwrap(), wire);
        assert_eq!(serde_json::from_str::<Role>(wire).unwrap(), role);
    }
    assert_eq!(serde_json::from_str::<Role>("\"ADMIN\"").unwrap(), Role::Admin);
}

#[test]
fn numeric_user_id_is_accepted() {
    let user: User =
        serde_json::from_str(r#"{"id":17,"email":"a@b.co","role":"COMPANY"}"#).unwrap();
    assert_eq!(user.id, "17");
}

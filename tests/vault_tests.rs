//! Integration tests for the VaultSafe store and vault container.

use std::fs;

use vaultsafe::crypto::kdf::MIN_ITERATIONS;
use vaultsafe::crypto::KdfParams;
use vaultsafe::errors::VaultError;
use vaultsafe::vault::format::read_registry;
use vaultsafe::vault::Store;
use tempfile::TempDir;

/// Helper: a store on a registry file inside a fresh temp dir, with a
/// low PBKDF2 iteration count so tests stay fast.
fn store() -> (TempDir, Store) {
    let dir = TempDir::new().expect("create temp dir");
    let store = Store::new(dir.path().join("vault.json")).with_kdf_params(KdfParams {
        iterations: MIN_ITERATIONS,
    });
    (dir, store)
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[test]
fn fresh_store_has_no_users() {
    let (_dir, store) = store();
    assert!(store.list_users().is_empty());
    assert!(!store.path().exists());
}

#[test]
fn create_user_writes_registry_and_empty_vault() {
    let (_dir, store) = store();
    store.create_user("bob", b"secret").unwrap();

    assert_eq!(store.list_users(), vec!["bob".to_string()]);

    let vault = store.unlock_vault("bob", b"secret").unwrap();
    assert!(vault.is_empty());
    assert!(vault.list_sites().is_empty());
}

#[test]
fn duplicate_user_is_rejected_and_first_is_untouched() {
    let (_dir, store) = store();
    store.create_user("alice", b"pw").unwrap();

    let mut vault = store.unlock_vault("alice", b"pw").unwrap();
    vault.add_entry("github.com", "alice-gh", "a1").unwrap();
    store.save_vault("alice", b"pw", &vault).unwrap();
    let before = fs::read_to_string(store.path()).unwrap();

    let result = store.create_user("alice", b"pw2");
    assert!(matches!(result, Err(VaultError::UserAlreadyExists(ref u)) if u == "alice"));

    assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    let vault = store.unlock_vault("alice", b"pw").unwrap();
    assert_eq!(
        vault.reveal_entry("github.com", "alice-gh").unwrap().password,
        "a1"
    );
    assert!(store.unlock_vault("alice", b"pw2").is_err());
}

#[test]
fn users_are_listed_sorted_with_metadata() {
    let (_dir, store) = store();
    store.create_user("zoe", b"z").unwrap();
    store.create_user("adam", b"a").unwrap();

    assert_eq!(store.list_users(), vec!["adam", "zoe"]);

    let summaries = store.user_summaries();
    assert_eq!(summaries[0].username, "adam");
    assert!(summaries[0].created_at.is_some());
    assert_eq!(summaries[0].kdf_iterations, MIN_ITERATIONS);
}

#[test]
fn blank_username_is_rejected() {
    let (_dir, store) = store();
    assert!(matches!(
        store.create_user("  ", b"pw"),
        Err(VaultError::InvalidInput(_))
    ));
}

#[test]
fn every_user_gets_a_distinct_salt() {
    let (_dir, store) = store();
    store.create_user("a", b"same").unwrap();
    store.create_user("b", b"same").unwrap();

    let registry = read_registry(store.path());
    assert_ne!(registry["a"].salt, registry["b"].salt);
    assert_ne!(registry["a"].vault_data, registry["b"].vault_data);
}

// ---------------------------------------------------------------------------
// CRUD scenario
// ---------------------------------------------------------------------------

#[test]
fn add_save_and_reopen() {
    let (_dir, store) = store();
    store.create_user("bob", b"secret").unwrap();

    let mut vault = store.unlock_vault("bob", b"secret").unwrap();
    assert!(vault.is_empty());
    vault.add_entry("github.com", "bob-gh", "p@ss").unwrap();
    store.save_vault("bob", b"secret", &vault).unwrap();

    let vault = store.unlock_vault("bob", b"secret").unwrap();
    assert_eq!(vault.list_sites(), vec!["github.com"]);
    assert_eq!(vault.entry_count(), 1);

    let identities = vault.list_identities_at("github.com");
    assert_eq!(identities.len(), 1);
    assert_eq!(identities[0].username, "bob-gh");

    let cred = vault.reveal_entry("github.com", "bob-gh").unwrap();
    assert_eq!(cred.username, "bob-gh");
    assert_eq!(cred.password, "p@ss");
}

#[test]
fn multiple_identities_per_site_survive_reopen() {
    let (_dir, store) = store();
    store.create_user("bob", b"secret").unwrap();

    let mut vault = store.unlock_vault("bob", b"secret").unwrap();
    vault.add_entry("github.com", "work", "w").unwrap();
    vault.add_entry("github.com", "personal", "p").unwrap();
    vault.add_entry("example.org", "bob", "e").unwrap();
    store.save_vault("bob", b"secret", &vault).unwrap();

    let vault = store.unlock_vault("bob", b"secret").unwrap();
    assert_eq!(vault.list_sites(), vec!["example.org", "github.com"]);
    let names: Vec<_> = vault
        .list_identities_at("github.com")
        .into_iter()
        .map(|i| i.username)
        .collect();
    assert_eq!(names, vec!["work", "personal"]);
    assert_eq!(vault.reveal_entry("github.com", "personal").unwrap().password, "p");
}

#[test]
fn update_and_delete_persist() {
    let (_dir, store) = store();
    store.create_user("bob", b"secret").unwrap();

    let mut vault = store.unlock_vault("bob", b"secret").unwrap();
    vault.add_entry("github.com", "bob-gh", "old").unwrap();
    vault.add_entry("gitlab.com", "bob-gl", "x").unwrap();
    store.save_vault("bob", b"secret", &vault).unwrap();

    let mut vault = store.unlock_vault("bob", b"secret").unwrap();
    vault
        .update_entry("github.com", "bob-gh", "bob-gh", "new")
        .unwrap();
    vault.delete_entry("gitlab.com", "bob-gl").unwrap();
    store.save_vault("bob", b"secret", &vault).unwrap();

    let vault = store.unlock_vault("bob", b"secret").unwrap();
    assert_eq!(vault.list_sites(), vec!["github.com"]);
    assert_eq!(vault.reveal_entry("github.com", "bob-gh").unwrap().password, "new");
}

#[test]
fn deleting_only_entry_drops_site_after_reopen() {
    let (_dir, store) = store();
    store.create_user("bob", b"secret").unwrap();

    let mut vault = store.unlock_vault("bob", b"secret").unwrap();
    vault.add_entry("github.com", "bob-gh", "p@ss").unwrap();
    vault.delete_entry("github.com", "bob-gh").unwrap();
    assert!(!vault.list_sites().contains(&"github.com"));
    store.save_vault("bob", b"secret", &vault).unwrap();

    let vault = store.unlock_vault("bob", b"secret").unwrap();
    assert!(vault.list_sites().is_empty());
}

#[test]
fn users_do_not_see_each_other() {
    let (_dir, store) = store();
    store.create_user("alice", b"a").unwrap();
    store.create_user("bob", b"b").unwrap();

    let mut vault = store.unlock_vault("alice", b"a").unwrap();
    vault.add_entry("github.com", "alice-gh", "1").unwrap();
    store.save_vault("alice", b"a", &vault).unwrap();

    assert!(store.unlock_vault("bob", b"b").unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Failure modes
// ---------------------------------------------------------------------------

#[test]
fn wrong_password_fails_and_leaves_file_alone() {
    let (_dir, store) = store();
    store.create_user("bob", b"secret").unwrap();
    let before = fs::read(store.path()).unwrap();

    let result = store.unlock_vault("bob", b"wrong");
    assert!(matches!(result, Err(VaultError::AuthenticationFailed)));

    assert_eq!(fs::read(store.path()).unwrap(), before);
}

#[test]
fn unknown_user_is_reported() {
    let (_dir, store) = store();
    assert!(matches!(
        store.unlock_vault("ghost", b"pw"),
        Err(VaultError::UserNotFound(_))
    ));

    store.create_user("bob", b"secret").unwrap();
    let vault = store.unlock_vault("bob", b"secret").unwrap();
    assert!(matches!(
        store.save_vault("ghost", b"secret", &vault),
        Err(VaultError::UserNotFound(_))
    ));
}

#[test]
fn save_with_different_password_is_refused() {
    let (_dir, store) = store();
    store.create_user("bob", b"secret").unwrap();
    let before = fs::read(store.path()).unwrap();

    let mut vault = store.unlock_vault("bob", b"secret").unwrap();
    vault.add_entry("github.com", "bob-gh", "p@ss").unwrap();

    let result = store.save_vault("bob", b"not-secret", &vault);
    assert!(matches!(result, Err(VaultError::AuthenticationFailed)));
    assert_eq!(fs::read(store.path()).unwrap(), before);
}

#[test]
fn saving_uses_a_fresh_nonce() {
    let (_dir, store) = store();
    store.create_user("bob", b"secret").unwrap();
    let first = read_registry(store.path())["bob"].vault_data.clone();

    let vault = store.unlock_vault("bob", b"secret").unwrap();
    store.save_vault("bob", b"secret", &vault).unwrap();
    let second = read_registry(store.path())["bob"].vault_data.clone();

    assert_ne!(first, second, "re-saving identical content must change the blob");
    // Salt is fixed for the life of the user.
    assert_eq!(
        read_registry(store.path())["bob"].salt.len(),
        24,
        "16-byte salt in base64"
    );
}

#[test]
fn tampered_blob_looks_like_wrong_password() {
    let (_dir, store) = store();
    store.create_user("bob", b"secret").unwrap();

    // Flip one character deep inside the encoded ciphertext, keeping it
    // valid base64 and valid JSON.
    let mut registry: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
    let blob = registry["bob"]["vault_data"].as_str().unwrap().to_string();
    let inner = base64_decode(&blob);
    let mut envelope: serde_json::Value = serde_json::from_slice(&inner).unwrap();
    let mut ct = base64_decode(envelope["ciphertext"].as_str().unwrap());
    ct[0] ^= 0x80;
    envelope["ciphertext"] = base64_encode(&ct).into();
    registry["bob"]["vault_data"] =
        base64_encode(&serde_json::to_vec(&envelope).unwrap()).into();
    fs::write(store.path(), serde_json::to_string(&registry).unwrap()).unwrap();

    assert!(matches!(
        store.unlock_vault("bob", b"secret"),
        Err(VaultError::AuthenticationFailed)
    ));
}

#[test]
fn malformed_blob_is_a_decode_error() {
    let (_dir, store) = store();
    store.create_user("bob", b"secret").unwrap();

    let mut registry: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
    registry["bob"]["vault_data"] = "%%% not base64 %%%".into();
    fs::write(store.path(), serde_json::to_string(&registry).unwrap()).unwrap();

    let err = store.unlock_vault("bob", b"secret").unwrap_err();
    assert!(matches!(err, VaultError::Decode(_)));
    assert_eq!(
        err.user_message(),
        VaultError::AuthenticationFailed.user_message()
    );
}

#[test]
fn damaged_kdf_header_looks_like_wrong_password() {
    let (_dir, store) = store();
    store.create_user("bob", b"secret").unwrap();
    let wrong = store.unlock_vault("bob", b"nope").unwrap_err().user_message();

    edit_user(&store, "bob", |bob| bob["kdf_iterations"] = 5.into());
    let err = store.unlock_vault("bob", b"secret").unwrap_err();
    assert!(matches!(err, VaultError::AuthenticationFailed));
    assert_eq!(err.user_message(), wrong);

    edit_user(&store, "bob", |bob| {
        bob["kdf_iterations"] = u32::MAX.into();
    });
    assert!(matches!(
        store.unlock_vault("bob", b"secret"),
        Err(VaultError::AuthenticationFailed)
    ));

    edit_user(&store, "bob", |bob| {
        bob["kdf_iterations"] = MIN_ITERATIONS.into();
        bob["salt"] = base64_encode(&[1u8; 8]).into();
    });
    assert!(matches!(
        store.unlock_vault("bob", b"secret"),
        Err(VaultError::AuthenticationFailed)
    ));
}

#[test]
fn existing_users_keep_their_stored_iteration_count() {
    let (_dir, store) = store();
    store.create_user("bob", b"secret").unwrap();

    let retuned = Store::new(store.path()).with_kdf_params(KdfParams {
        iterations: MIN_ITERATIONS + 1,
    });
    let mut vault = retuned.unlock_vault("bob", b"secret").unwrap();
    vault.add_entry("github.com", "bob-gh", "pw1").unwrap();
    retuned.save_vault("bob", b"secret", &vault).unwrap();

    let reopened = retuned.unlock_vault("bob", b"secret").unwrap();
    assert_eq!(
        reopened.reveal_entry("github.com", "bob-gh").unwrap().password,
        "pw1"
    );
    assert_eq!(
        read_registry(store.path())["bob"].kdf_iterations,
        MIN_ITERATIONS
    );

    // New users still pick up the store's own setting.
    retuned.create_user("carol", b"pw").unwrap();
    assert_eq!(
        read_registry(store.path())["carol"].kdf_iterations,
        MIN_ITERATIONS + 1
    );
}

#[test]
fn record_without_iteration_count_opens_at_default() {
    let dir = TempDir::new().unwrap();
    let store = Store::new(dir.path().join("vault.json"));
    store.create_user("bob", b"secret").unwrap();

    edit_user(&store, "bob", |bob| {
        bob.as_object_mut().unwrap().remove("kdf_iterations");
    });

    let mut vault = store.unlock_vault("bob", b"secret").unwrap();
    vault.add_entry("github.com", "bob-gh", "pw1").unwrap();
    store.save_vault("bob", b"secret", &vault).unwrap();
    assert!(store
        .unlock_vault("bob", b"secret")
        .unwrap()
        .reveal_entry("github.com", "bob-gh")
        .is_ok());
}

#[test]
fn unparsable_registry_counts_as_empty() {
    let (_dir, store) = store();
    fs::write(store.path(), "definitely not json").unwrap();

    assert!(store.list_users().is_empty());
    store.create_user("bob", b"secret").unwrap();
    assert_eq!(store.list_users(), vec!["bob"]);
}

#[test]
fn registry_file_has_documented_shape() {
    let (_dir, store) = store();
    store.create_user("bob", b"secret").unwrap();

    let registry: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
    let bob = &registry["bob"];
    assert!(bob["salt"].is_string());
    assert_eq!(bob["kdf_iterations"], MIN_ITERATIONS);
    assert!(bob["created_at"].is_string());

    let envelope: serde_json::Value =
        serde_json::from_slice(&base64_decode(bob["vault_data"].as_str().unwrap())).unwrap();
    assert_eq!(base64_decode(envelope["iv"].as_str().unwrap()).len(), 12);
    assert!(envelope["ciphertext"].is_string());
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Rewrite one user's record in the registry file as raw JSON.
fn edit_user(store: &Store, user: &str, f: impl FnOnce(&mut serde_json::Value)) {
    let mut registry: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
    f(&mut registry[user]);
    fs::write(store.path(), serde_json::to_string(&registry).unwrap()).unwrap();
}

fn base64_decode(s: &str) -> Vec<u8> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.decode(s).unwrap()
}

fn base64_encode(data: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(data)
}

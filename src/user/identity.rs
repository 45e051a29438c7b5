//! Nickname sign-in backed by the local store
//!
//! Identity here is a convenience, not a security boundary: the signed-in
//! user is whatever the local store says it is.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::simulation::{StageError, StageResult};
use crate::storage::{LocalStore, USER_KEY};
use crate::user::User;

/// Longest nickname accepted at sign-in
pub const MAX_NICKNAME_CHARS: usize = 32;

/// Restore the signed-in user, discarding an unreadable record
pub fn current_user(store: &mut LocalStore) -> StageResult<Option<User>> {
    store.get_json(USER_KEY)
}

/// Sign in with a nickname, creating and persisting a new anonymous user
pub fn sign_in(store: &mut LocalStore, nickname: &str, now: DateTime<Utc>) -> StageResult<User> {
    let nickname = nickname.trim();
    if nickname.is_empty() {
        return Err(StageError::invalid_input("nickname must not be empty"));
    }
    if nickname.chars().count() > MAX_NICKNAME_CHARS {
        return Err(StageError::invalid_input(format!(
            "nickname must be at most {} characters",
            MAX_NICKNAME_CHARS
        )));
    }

    let user = User::new(nickname, now);
    store.set_json(USER_KEY, &user)?;

    info!(user_id = %user.id, nickname = %user.nickname, "Signed in");
    Ok(user)
}

/// Restore the stored user or sign in with the nickname when none is stored
pub fn sign_in_or_restore(
    store: &mut LocalStore,
    nickname: &str,
    now: DateTime<Utc>,
) -> StageResult<User> {
    match current_user(store)? {
        Some(user) if user.nickname == nickname.trim() => Ok(user),
        _ => sign_in(store, nickname, now),
    }
}

/// Forget the signed-in user
pub fn sign_out(store: &mut LocalStore) -> StageResult<()> {
    if store.remove(USER_KEY)?.is_some() {
        info!("Signed out");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_persists_user() {
        let mut store = LocalStore::in_memory();
        let user = sign_in(&mut store, "  SoapboxSally ", Utc::now()).unwrap();
        assert_eq!(user.nickname, "SoapboxSally");

        let restored = current_user(&mut store).unwrap().unwrap();
        assert_eq!(restored, user);
    }

    #[test]
    fn test_sign_in_rejects_blank_nickname() {
        let mut store = LocalStore::in_memory();
        assert!(matches!(sign_in(&mut store, "   ", Utc::now()), Err(StageError::InvalidInput(_))));
    }

    #[test]
    fn test_sign_out_clears_user() {
        let mut store = LocalStore::in_memory();
        sign_in(&mut store, "VentViper", Utc::now()).unwrap();
        sign_out(&mut store).unwrap();
        assert!(current_user(&mut store).unwrap().is_none());

        // Signing out twice is harmless
        sign_out(&mut store).unwrap();
    }

    #[test]
    fn test_corrupt_user_record_is_dropped() {
        let mut store = LocalStore::in_memory();
        store.set(USER_KEY, "{\"id\": 5}").unwrap();
        assert!(current_user(&mut store).unwrap().is_none());
        assert!(store.get(USER_KEY).is_none());
    }

    #[test]
    fn test_restore_keeps_identity_for_same_nickname() {
        let mut store = LocalStore::in_memory();
        let first = sign_in_or_restore(&mut store, "BoldBob", Utc::now()).unwrap();
        let second = sign_in_or_restore(&mut store, "BoldBob", Utc::now()).unwrap();
        assert_eq!(first.id, second.id);

        let third = sign_in_or_restore(&mut store, "WildWill", Utc::now()).unwrap();
        assert_ne!(first.id, third.id);
    }
}

use sentinel_domain::{DuplicateKey, NewUser, User, UserChanges, UserDraft, UserRole, UserStatus};
use tracing::info;

use crate::commands::input::{normalize_text, parse_enum, patch_text, required_text};
use crate::{AppError, AppState};

pub async fn create_user(state: &AppState, draft: UserDraft) -> Result<User, AppError> {
    let user = validate_new_user(draft)?;
    ensure_unique(state, None, Some(&user.username), Some(&user.email)).await?;
    let created = state
        .user_repo
        .insert_user(user)
        .await
        .map_err(store_error)?;
    state.metrics.record_mutation();
    info!(user = %created.id, role = created.role.as_str(), "user created");
    Ok(created)
}

pub async fn update_user(state: &AppState, id: &str, draft: UserDraft) -> Result<User, AppError> {
    let changes = validate_user_changes(draft)?;
    let id = id.trim();
    if state
        .user_repo
        .fetch_user(id)
        .await
        .map_err(AppError::Internal)?
        .is_none()
    {
        return Err(AppError::NotFound(format!("user {id}")));
    }
    ensure_unique(
        state,
        Some(id),
        changes.username.as_deref(),
        changes.email.as_deref(),
    )
    .await?;
    let updated = state
        .user_repo
        .update_user(id, &changes)
        .await
        .map_err(store_error)?
        .ok_or_else(|| AppError::NotFound(format!("user {id}")))?;
    state.metrics.record_mutation();
    info!(user = %updated.id, status = updated.status.as_str(), "user updated");
    Ok(updated)
}

/// The lookup in `ensure_unique` can race a concurrent write; the store has the final say.
fn store_error(err: anyhow::Error) -> AppError {
    match err.downcast_ref::<DuplicateKey>() {
        Some(duplicate) => AppError::Conflict(duplicate.to_string()),
        None => AppError::Internal(err),
    }
}

async fn ensure_unique(
    state: &AppState,
    own_id: Option<&str>,
    username: Option<&str>,
    email: Option<&str>,
) -> Result<(), AppError> {
    if let Some(username) = username {
        let existing = state
            .user_repo
            .fetch_user_by_username(username)
            .await
            .map_err(AppError::Internal)?;
        if existing.is_some_and(|user| Some(user.id.as_str()) != own_id) {
            return Err(AppError::Conflict(format!("username '{username}' is taken")));
        }
    }
    if let Some(email) = email {
        let existing = state
            .user_repo
            .fetch_user_by_email(email)
            .await
            .map_err(AppError::Internal)?;
        if existing.is_some_and(|user| Some(user.id.as_str()) != own_id) {
            return Err(AppError::Conflict(format!("email '{email}' is taken")));
        }
    }
    Ok(())
}

fn validate_email(email: String) -> Result<String, AppError> {
    let well_formed = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
    if !well_formed {
        return Err(AppError::BadRequest(format!("invalid email '{email}'")));
    }
    Ok(email)
}

pub fn validate_new_user(draft: UserDraft) -> Result<NewUser, AppError> {
    Ok(NewUser {
        username: required_text("username", draft.username)?,
        email: validate_email(required_text("email", draft.email)?)?,
        first_name: normalize_text(draft.first_name),
        last_name: normalize_text(draft.last_name),
        role: parse_enum::<UserRole>(draft.role)?.unwrap_or_default(),
        status: parse_enum::<UserStatus>(draft.status)?.unwrap_or_default(),
        profile_image_url: normalize_text(draft.profile_image_url),
    })
}

pub fn validate_user_changes(draft: UserDraft) -> Result<UserChanges, AppError> {
    let changes = UserChanges {
        username: patch_text("username", draft.username)?,
        email: patch_text("email", draft.email)?
            .map(validate_email)
            .transpose()?,
        first_name: normalize_text(draft.first_name),
        last_name: normalize_text(draft.last_name),
        role: parse_enum::<UserRole>(draft.role)?,
        status: parse_enum::<UserStatus>(draft.status)?,
        profile_image_url: normalize_text(draft.profile_image_url),
    };
    if changes.is_empty() {
        return Err(AppError::BadRequest(
            "user update must change at least one field".to_string(),
        ));
    }
    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_defaults_to_active_operator() {
        let draft = UserDraft {
            username: Some("NEW_OPERATIVE".to_string()),
            email: Some("new@cybersentinel.dev".to_string()),
            ..UserDraft::default()
        };
        let user = validate_new_user(draft).expect("valid");
        assert_eq!(user.role, UserRole::Operator);
        assert_eq!(user.status, UserStatus::Active);
    }

    #[test]
    fn email_without_at_is_rejected() {
        let draft = UserDraft {
            username: Some("x".to_string()),
            email: Some("not-an-email".to_string()),
            ..UserDraft::default()
        };
        assert!(validate_new_user(draft).is_err());
    }

    #[test]
    fn duplicate_key_from_the_store_is_a_conflict() {
        let err = store_error(DuplicateKey::new("email", "neo@zion.io").into());
        assert!(matches!(err, AppError::Conflict(ref message) if message == "email 'neo@zion.io' is taken"));
        assert!(matches!(store_error(anyhow::anyhow!("socket closed")), AppError::Internal(_)));
    }

    #[test]
    fn suspension_is_a_valid_change() {
        let draft = UserDraft {
            status: Some("suspended".to_string()),
            ..UserDraft::default()
        };
        let changes = validate_user_changes(draft).expect("valid");
        assert_eq!(changes.status, Some(UserStatus::Suspended));
    }
}

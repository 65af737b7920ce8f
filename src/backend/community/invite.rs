/**
 * Invite-Code Issuance
 *
 * Invite codes are 8-character alphanumeric tokens, unique across all
 * communities. A code is generated lazily (the first time one is needed),
 * checked for uniqueness by lookup, and re-drawn on collision. The retry
 * loop is capped; exhausting it fails deterministically rather than
 * spinning. The unique index on the column backstops the lookup race.
 */

use rand::Rng;
use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::community::db;
use crate::backend::error::ApiError;

/// Length of every invite code
pub const INVITE_CODE_LENGTH: usize = 8;

/// Collision retries before giving up
const MAX_ATTEMPTS: usize = 32;

/// Draw a random 8-character code from `[A-Za-z0-9]`
pub fn generate_code() -> String {
    rand::rng()
        .sample_iter(rand::distr::Alphanumeric)
        .take(INVITE_CODE_LENGTH)
        .map(char::from)
        .collect()
}

/// Issue the invite code for a community
///
/// Returns the existing code when one was already issued; otherwise draws
/// codes until one is free and persists it.
///
/// # Errors
///
/// * `404` - unknown community
/// * `502` - the retry cap was exhausted without finding a free code
pub async fn issue_invite_code(pool: &PgPool, community_id: Uuid) -> Result<String, ApiError> {
    let community = db::get_community(pool, community_id)
        .await?
        .ok_or(ApiError::NotFound("community"))?;

    if let Some(code) = community.invite_code {
        return Ok(code);
    }

    for _ in 0..MAX_ATTEMPTS {
        let code = generate_code();
        if db::find_by_invite_code(pool, &code).await?.is_some() {
            tracing::debug!("[Invite] Code collision, redrawing");
            continue;
        }
        db::set_invite_code(pool, community_id, &code).await?;
        tracing::info!("[Invite] Issued code for community {}", community_id);
        return Ok(code);
    }

    tracing::error!(
        "[Invite] Exhausted {} attempts issuing a code for community {}",
        MAX_ATTEMPTS,
        community_id
    );
    Err(ApiError::upstream("could not issue a unique invite code"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_length() {
        assert_eq!(generate_code().len(), INVITE_CODE_LENGTH);
    }

    #[test]
    fn test_code_alphabet() {
        for _ in 0..100 {
            let code = generate_code();
            assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_codes_are_not_constant() {
        let codes: std::collections::HashSet<String> =
            (0..50).map(|_| generate_code()).collect();
        // 62^8 possibilities; 50 draws colliding en masse means the RNG is broken
        assert!(codes.len() > 1);
    }
}

/**
 * Reaction Toggle
 *
 * The like/dislike state machine for a (post, user) pair. Three states:
 * neutral, liked, disliked. Invoking "like" from liked returns to neutral
 * (idempotent toggle-off); from neutral or disliked it moves to liked,
 * clearing any dislike. Symmetric for "dislike". At most one of the two
 * membership sets ever contains the user.
 *
 * The transition itself is a pure function; applying it is a single
 * row-level upsert or delete, so concurrent toggles resolve through the
 * store's per-row atomicity.
 */

use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::error::ApiError;
use crate::backend::post::db;

/// The reaction being invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionKind {
    Like,
    Dislike,
}

impl ReactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionKind::Like => "like",
            ReactionKind::Dislike => "dislike",
        }
    }
}

/// A user's reaction state on a post
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionState {
    Neutral,
    Liked,
    Disliked,
}

impl ReactionState {
    /// Interpret the stored reaction row
    pub fn from_stored(stored: Option<&str>) -> Self {
        match stored {
            Some("like") => ReactionState::Liked,
            Some("dislike") => ReactionState::Disliked,
            _ => ReactionState::Neutral,
        }
    }

    /// Database representation; None means no row
    pub fn as_stored(&self) -> Option<&'static str> {
        match self {
            ReactionState::Neutral => None,
            ReactionState::Liked => Some("like"),
            ReactionState::Disliked => Some("dislike"),
        }
    }
}

/// The toggle transition
///
/// Invoking the reaction the user already holds clears it; anything else
/// moves to the invoked reaction, displacing the opposite one.
pub fn toggle(current: ReactionState, invoked: ReactionKind) -> ReactionState {
    match (current, invoked) {
        (ReactionState::Liked, ReactionKind::Like) => ReactionState::Neutral,
        (_, ReactionKind::Like) => ReactionState::Liked,
        (ReactionState::Disliked, ReactionKind::Dislike) => ReactionState::Neutral,
        (_, ReactionKind::Dislike) => ReactionState::Disliked,
    }
}

/// Apply a toggle for one user on one post
///
/// Reads the current state, computes the transition, and applies it as one
/// upsert or delete.
pub async fn toggle_reaction(
    pool: &PgPool,
    post_id: Uuid,
    user_id: Uuid,
    invoked: ReactionKind,
) -> Result<ReactionState, ApiError> {
    let stored = db::get_reaction(pool, post_id, user_id).await?;
    let next = toggle(ReactionState::from_stored(stored.as_deref()), invoked);

    match next.as_stored() {
        Some(reaction) => db::upsert_reaction(pool, post_id, user_id, reaction).await?,
        None => db::clear_reaction(pool, post_id, user_id).await?,
    }

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_from_neutral() {
        assert_eq!(
            toggle(ReactionState::Neutral, ReactionKind::Like),
            ReactionState::Liked
        );
    }

    #[test]
    fn test_like_twice_is_neutral() {
        let after_first = toggle(ReactionState::Neutral, ReactionKind::Like);
        let after_second = toggle(after_first, ReactionKind::Like);
        assert_eq!(after_second, ReactionState::Neutral);
    }

    #[test]
    fn test_like_displaces_dislike() {
        assert_eq!(
            toggle(ReactionState::Disliked, ReactionKind::Like),
            ReactionState::Liked
        );
    }

    #[test]
    fn test_dislike_displaces_like() {
        assert_eq!(
            toggle(ReactionState::Liked, ReactionKind::Dislike),
            ReactionState::Disliked
        );
    }

    #[test]
    fn test_dislike_twice_is_neutral() {
        let after_first = toggle(ReactionState::Neutral, ReactionKind::Dislike);
        let after_second = toggle(after_first, ReactionKind::Dislike);
        assert_eq!(after_second, ReactionState::Neutral);
    }

    #[test]
    fn test_stored_roundtrip() {
        for state in [
            ReactionState::Neutral,
            ReactionState::Liked,
            ReactionState::Disliked,
        ] {
            assert_eq!(ReactionState::from_stored(state.as_stored()), state);
        }
    }

    #[test]
    fn test_every_state_holds_at_most_one_membership() {
        // as_stored maps each state to at most one set; a state can never
        // serialize into both
        assert_eq!(ReactionState::Liked.as_stored(), Some("like"));
        assert_eq!(ReactionState::Disliked.as_stored(), Some("dislike"));
        assert_eq!(ReactionState::Neutral.as_stored(), None);
    }
}

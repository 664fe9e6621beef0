//! Tile authorization.
//!
//! # Purpose
//! Decides, entry by entry, whether an [`Identity`] may see a registry tile,
//! and filters a [`Registry`] down to the visible tiles.
//!
//! # Key invariants
//! - `display = false` hides an entry for everyone, including `everyone` groups.
//! - Matching is exact string equality; empty identifiers and groups never match.
//! - Output preserves registry order and never contains rejected entries.
use crate::identity::Identity;
use crate::registry::Registry;
use crate::types::ApplicationEntry;

/// Outcome of evaluating one registry entry for one identity.
///
/// Rules are checked in order and the first match wins: hidden entries are
/// never shown, then `everyone`, then group overlap, then user identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Hidden,
    Everyone,
    GroupMatch(String),
    UserMatch(String),
    Denied,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(
            self,
            Decision::Everyone | Decision::GroupMatch(_) | Decision::UserMatch(_)
        )
    }
}

pub fn evaluate(entry: &ApplicationEntry, identity: &Identity) -> Decision {
    if !entry.is_displayed() {
        return Decision::Hidden;
    }
    if entry.is_for_everyone() {
        return Decision::Everyone;
    }
    if let Some(group) = entry
        .authorized_groups
        .iter()
        .find(|group| identity.groups.contains(group.as_str()))
    {
        return Decision::GroupMatch(group.clone());
    }
    if let Some(user) = identity
        .identifiers()
        .find(|id| entry.authorized_users.contains(*id))
    {
        return Decision::UserMatch(user.to_string());
    }
    Decision::Denied
}

/// Entries the identity may see, borrowed from the registry in registry order.
pub fn authorize<'a>(registry: &'a Registry, identity: &Identity) -> Vec<&'a ApplicationEntry> {
    registry
        .entries()
        .iter()
        .filter(|entry| evaluate(entry, identity).is_allowed())
        .collect()
}

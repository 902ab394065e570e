//! Online characters
//!
//! A client picks a character name after connecting. The lowercase name is the
//! character id, which is what vehicle records store as their owner.

use std::collections::HashMap;

use bevy::prelude::*;
use lightyear::prelude::PeerId;
use paint_shop_shared::NameRejectionReason;

const RESERVED: &[&str] = &["server", "admin", "system", "moderator", "mod", "bot", "console"];

/// Which character each connected peer plays
#[derive(Resource, Default, Debug)]
pub struct Characters {
    peer_to_id: HashMap<PeerId, String>,
    id_to_peer: HashMap<String, PeerId>,
}

impl Characters {
    /// Check name rules (length 3-16, alphanumeric/underscore/hyphen, not reserved)
    pub fn validate_name(name: &str) -> Result<(), NameRejectionReason> {
        let trimmed = name.trim();

        if trimmed.len() < 3 {
            return Err(NameRejectionReason::TooShort);
        }
        if trimmed.len() > 16 {
            return Err(NameRejectionReason::TooLong);
        }

        if !trimmed.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
            return Err(NameRejectionReason::InvalidCharacters);
        }

        let lower = trimmed.to_lowercase();
        if RESERVED.contains(&lower.as_str()) {
            return Err(NameRejectionReason::Reserved);
        }

        Ok(())
    }

    pub fn character_id(name: &str) -> String {
        name.trim().to_lowercase()
    }

    pub fn is_online(&self, character_id: &str) -> bool {
        self.id_to_peer.contains_key(character_id)
    }

    pub fn get(&self, peer: PeerId) -> Option<&str> {
        self.peer_to_id.get(&peer).map(String::as_str)
    }

    /// Validate `name` and bind it to `peer`. Returns the character id.
    pub fn claim(&mut self, peer: PeerId, name: &str) -> Result<String, NameRejectionReason> {
        Self::validate_name(name)?;

        let id = Self::character_id(name);
        if self.is_online(&id) {
            return Err(NameRejectionReason::AlreadyOnline);
        }

        self.peer_to_id.insert(peer, id.clone());
        self.id_to_peer.insert(id.clone(), peer);
        Ok(id)
    }

    /// Free the peer's character. Returns its id.
    pub fn release(&mut self, peer: PeerId) -> Option<String> {
        let id = self.peer_to_id.remove(&peer)?;
        self.id_to_peer.remove(&id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert_eq!(Characters::validate_name("ab"), Err(NameRejectionReason::TooShort));
        assert_eq!(
            Characters::validate_name("a_very_long_name_indeed"),
            Err(NameRejectionReason::TooLong)
        );
        assert_eq!(
            Characters::validate_name("bad name"),
            Err(NameRejectionReason::InvalidCharacters)
        );
        assert_eq!(Characters::validate_name("Admin"), Err(NameRejectionReason::Reserved));
        assert_eq!(Characters::validate_name("  Alice-1 "), Ok(()));
    }

    #[test]
    fn test_claim_and_release() {
        let mut characters = Characters::default();
        let alice = PeerId::Netcode(1);

        assert_eq!(characters.claim(alice, "Alice"), Ok("alice".to_string()));
        assert_eq!(characters.get(alice), Some("alice"));
        assert_eq!(
            characters.claim(PeerId::Netcode(2), "ALICE"),
            Err(NameRejectionReason::AlreadyOnline)
        );

        assert_eq!(characters.release(alice), Some("alice".to_string()));
        assert!(!characters.is_online("alice"));
        assert_eq!(characters.release(alice), None);
        assert!(characters.claim(PeerId::Netcode(2), "alice").is_ok());
    }
}

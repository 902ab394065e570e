//! Player-related constants and helpers

use lightyear::prelude::PeerId;

/// Player movement speed (units per second)
pub const PLAYER_SPEED: f32 = 8.0;

/// Spawn position for new characters
pub const SPAWN_POSITION: [f32; 3] = [0.0, 0.0, 0.0];

/// Collapse a peer id into the numeric form stored in `VehicleDriver`.
pub fn peer_id_to_u64(peer_id: PeerId) -> u64 {
    match peer_id {
        PeerId::Netcode(id) => id,
        PeerId::Steam(id) => id,
        PeerId::Local(id) => id,
        PeerId::Entity(id) => id,
        PeerId::Raw(addr) => {
            // Hash the socket address to a u64
            use std::hash::{Hash, Hasher};
            let mut hasher = std::collections::hash_map::DefaultHasher::new();
            addr.hash(&mut hasher);
            hasher.finish()
        }
        PeerId::Server => 0,
    }
}

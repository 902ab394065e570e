//! Player components shared between server and client

use bevy::prelude::*;
use lightyear::prelude::*;
use serde::{Deserialize, Serialize};

/// Marker component for player entities
#[derive(Component, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Player {
    pub client_id: PeerId,
}

#[derive(Component, Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct PlayerPosition(pub Vec3);

#[derive(Component, Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct PlayerRotation(pub f32);

/// Character a player is playing as. The id is what vehicle records name as owner.
/// Server-side only; never replicated.
#[derive(Component, Clone, Debug, PartialEq)]
pub struct Character {
    pub id: String,
    pub display_name: String,
}

//! Paint shop definitions and the replicated markers clients draw for them.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Map blip sprite/colour used for every paint shop
pub const PAINT_SHOP_BLIP_SPRITE: u32 = 72;
pub const PAINT_SHOP_BLIP_COLOR: u32 = 48;

/// Name of the client-side action a temporary interaction triggers
pub const PAINT_SHOP_OPEN_EVENT: &str = "paint-shop:open";

/// Player-facing strings
pub mod locale {
    pub const PAINT_SHOP_LABEL: &str = "Paint Shop";
    pub const MUST_BE_IN_A_VEHICLE: &str = "You must be in a vehicle.";
    pub const CANNOT_BE_MODIFIED: &str = "This vehicle cannot be modified.";
    pub const OPEN_MENU: &str = "Paint Vehicle Press shift + E";
}

/// Static shop definition as written in the server config.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PaintShopDefinition {
    /// Derived from content when omitted
    #[serde(default)]
    pub uid: Option<String>,
    pub cost: u32,
    /// Zone outline; the first vertex anchors the blip and the zone height
    pub vertices: Vec<[f32; 3]>,
}

impl PaintShopDefinition {
    /// Lowercase hex SHA-256 over cost and vertices. Identical content, identical id.
    pub fn content_uid(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.cost.to_le_bytes());
        hasher.update((self.vertices.len() as u64).to_le_bytes());
        for vertex in &self.vertices {
            for axis in vertex {
                hasher.update(axis.to_le_bytes());
            }
        }
        hasher
            .finalize()
            .iter()
            .map(|byte| format!("{:02x}", byte))
            .collect()
    }

    /// Explicit uid, or the content-derived one.
    pub fn resolved_uid(&self) -> String {
        self.uid.clone().unwrap_or_else(|| self.content_uid())
    }

    pub fn world_vertices(&self) -> Vec<Vec3> {
        self.vertices.iter().map(|v| Vec3::from_array(*v)).collect()
    }
}

/// Key for the blip and interaction entries of a shop
pub fn marker_uid(shop_uid: &str) -> String {
    format!("paint-shop-{}", shop_uid)
}

/// A registered paint shop (lives on the zone entity)
#[derive(Component, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PaintShop {
    pub uid: String,
    pub cost: u32,
}

/// Map marker shown on the client minimap
#[derive(Component, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MapBlip {
    pub uid: String,
    pub label: String,
    pub sprite: u32,
    pub color: u32,
    pub scale: f32,
    pub short_range: bool,
    pub position: Vec3,
}

/// World-space interaction prompt
#[derive(Component, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct InteractionPoint {
    pub uid: String,
    pub position: Vec3,
    pub description: String,
}

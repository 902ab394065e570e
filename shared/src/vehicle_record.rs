//! Vehicle persistence - serializable vehicle record
//!
//! The saved document of an owned vehicle. Attached to the live vehicle entity as a
//! component and written back to disk through the server's vehicle store.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::paint::VehicleColor;
use crate::vehicle::VehicleType;

/// Current record version for migration support
pub const RECORD_VERSION: u32 = 1;

/// Presence marks a vehicle that accepts cosmetic modification
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct Tuning;

/// Persisted paint. `None` means "never set".
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct PaintState {
    pub primary_color: Option<VehicleColor>,
    pub secondary_color: Option<VehicleColor>,
    pub pearl_color: Option<u8>,
    pub primary_finish: Option<u8>,
    pub secondary_finish: Option<u8>,
}

#[derive(Component, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct VehicleRecord {
    /// Record format version
    pub version: u32,
    /// Stable id (also the file name)
    pub id: String,
    /// Owning character id
    pub owner: String,
    pub vehicle_type: VehicleType,
    /// Last saved world position [x, y, z]
    pub position: [f32; 3],
    pub heading: f32,
    pub tuning: Option<Tuning>,
    pub state: PaintState,
}

impl VehicleRecord {
    pub fn new(
        id: impl Into<String>,
        owner: impl Into<String>,
        vehicle_type: VehicleType,
        position: [f32; 3],
    ) -> Self {
        Self {
            version: RECORD_VERSION,
            id: id.into(),
            owner: owner.into(),
            vehicle_type,
            position,
            heading: 0.0,
            tuning: None,
            state: PaintState::default(),
        }
    }
}

//! Vehicle paint types
//!
//! A colour slot on a vehicle holds either an index into the fixed game palette
//! or a custom RGB value. `LivePaint` is what clients render; the persisted
//! counterpart lives in `VehicleRecord::state`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Finish codes written to the index slots when a custom colour is shown.
pub mod finish {
    pub const NORMAL: u8 = 0;
    pub const METALLIC: u8 = 1;
    pub const PEARL: u8 = 2;
    pub const MATTE: u8 = 3;
    pub const METAL: u8 = 4;
    pub const CHROME: u8 = 5;
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// A colour as stored or requested: palette index or custom RGB.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum VehicleColor {
    Palette(u8),
    Custom(Rgb),
}

impl VehicleColor {
    pub fn as_rgb(&self) -> Option<Rgb> {
        match self {
            VehicleColor::Custom(rgb) => Some(*rgb),
            VehicleColor::Palette(_) => None,
        }
    }
}

impl From<Rgb> for VehicleColor {
    fn from(rgb: Rgb) -> Self {
        VehicleColor::Custom(rgb)
    }
}

/// Render-side paint slots of a live vehicle (server-authoritative, replicated)
#[derive(Component, Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct LivePaint {
    /// Palette index, or finish code while a custom colour is shown
    pub primary_color: u8,
    pub secondary_color: u8,
    pub custom_primary: Option<Rgb>,
    pub custom_secondary: Option<Rgb>,
    pub pearl_color: u8,
}

impl LivePaint {
    /// Palette colours replace any custom colour in the slot.
    pub fn set_primary(&mut self, color: VehicleColor) {
        match color {
            VehicleColor::Palette(index) => {
                self.primary_color = index;
                self.custom_primary = None;
            }
            VehicleColor::Custom(rgb) => self.custom_primary = Some(rgb),
        }
    }

    pub fn set_secondary(&mut self, color: VehicleColor) {
        match color {
            VehicleColor::Palette(index) => {
                self.secondary_color = index;
                self.custom_secondary = None;
            }
            VehicleColor::Custom(rgb) => self.custom_secondary = Some(rgb),
        }
    }
}

//! Server configuration loaded from a RON file.

use std::path::{Path, PathBuf};

use bevy::prelude::*;
use paint_shop_shared::{PaintShopDefinition, VehicleType};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "assets/paint_shop.ron";
pub const CONFIG_PATH_ENV: &str = "PAINT_SHOP_CONFIG";
pub const DATA_DIR_ENV: &str = "PAINT_SHOP_DATA_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// A vehicle that should exist in the world
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct VehicleSeed {
    pub id: String,
    /// Owning character id
    pub owner: String,
    #[serde(default)]
    pub vehicle_type: VehicleType,
    pub position: [f32; 3],
    /// Temporary vehicles are never saved and can't be painted
    #[serde(default)]
    pub temporary: bool,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub storage_dir: String,
    pub shops: Vec<PaintShopDefinition>,
    pub vehicles: Vec<VehicleSeed>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            storage_dir: "data/vehicles".to_string(),
            shops: vec![
                PaintShopDefinition {
                    uid: Some("harbor".to_string()),
                    cost: 250,
                    vertices: vec![
                        [20.0, 0.0, 20.0],
                        [32.0, 0.0, 20.0],
                        [32.0, 0.0, 30.0],
                        [20.0, 0.0, 30.0],
                    ],
                },
                PaintShopDefinition {
                    uid: None,
                    cost: 400,
                    vertices: vec![
                        [-40.0, 0.0, -10.0],
                        [-28.0, 0.0, -10.0],
                        [-28.0, 0.0, 4.0],
                        [-34.0, 0.0, 8.0],
                        [-40.0, 0.0, 4.0],
                    ],
                },
            ],
            vehicles: vec![
                VehicleSeed {
                    id: "starter-car".to_string(),
                    owner: "driver".to_string(),
                    vehicle_type: VehicleType::Car,
                    position: [6.0, 0.0, 6.0],
                    temporary: false,
                },
                VehicleSeed {
                    id: "rental-bike".to_string(),
                    owner: "server".to_string(),
                    vehicle_type: VehicleType::Motorbike,
                    position: [10.0, 0.0, 4.0],
                    temporary: true,
                },
            ],
        }
    }
}

impl ServerConfig {
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron(&text)
    }

    /// Load from `$PAINT_SHOP_CONFIG` or the default path. Falls back to built-in defaults.
    pub fn load() -> Self {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        if !path.exists() {
            warn!("Config {:?} not found, using built-in defaults", path);
            return Self::default();
        }

        match Self::load_from_path(&path) {
            Ok(config) => {
                info!(
                    "Loaded config {:?}: {} shop(s), {} vehicle seed(s)",
                    path,
                    config.shops.len(),
                    config.vehicles.len()
                );
                config
            }
            Err(e) => {
                error!("Invalid config {:?}: {} - using built-in defaults", path, e);
                Self::default()
            }
        }
    }

    /// `$PAINT_SHOP_DATA_DIR` overrides the configured directory
    pub fn storage_dir(&self) -> PathBuf {
        std::env::var(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(&self.storage_dir))
    }
}

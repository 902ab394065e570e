//! Paint shop registry
//!
//! Registers shop definitions: derives missing ids, refuses duplicates and spawns the
//! shop entity (blip, interaction prompt, zone) with the zone callbacks bound.

use bevy::prelude::*;
use paint_shop_shared::{
    locale, marker_uid, InteractionPoint, MapBlip, PaintShop, PaintShopDefinition, PolygonZone,
    PAINT_SHOP_BLIP_COLOR, PAINT_SHOP_BLIP_SPRITE, ZONE_HALF_HEIGHT,
};
use thiserror::Error;

use super::handlers::{on_zone_entered, on_zone_left};
use super::PaintShopSettings;
use crate::zones::ZoneOccupants;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("shop with {0} is a duplicate")]
    Duplicate(String),
    #[error("shop {0} has no vertices")]
    NoVertices(String),
}

#[derive(Debug, Clone)]
pub struct RegisteredShop {
    pub uid: String,
    pub cost: u32,
    pub entity: Entity,
}

#[derive(Resource, Default, Debug)]
pub struct PaintShopRegistry {
    shops: Vec<RegisteredShop>,
}

impl PaintShopRegistry {
    pub fn contains(&self, uid: &str) -> bool {
        self.shops.iter().any(|shop| shop.uid == uid)
    }

    pub fn get(&self, uid: &str) -> Option<&RegisteredShop> {
        self.shops.iter().find(|shop| shop.uid == uid)
    }

    pub fn len(&self) -> usize {
        self.shops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shops.is_empty()
    }
}

/// Register a paint shop. Returns the final shop id.
pub fn register_paint_shop(
    commands: &mut Commands,
    registry: &mut PaintShopRegistry,
    definition: &PaintShopDefinition,
) -> Result<String, RegistryError> {
    let uid = definition.resolved_uid();

    if registry.contains(&uid) {
        let err = RegistryError::Duplicate(uid);
        error!("{}", err);
        return Err(err);
    }

    let vertices = definition.world_vertices();
    let Some(zone) = PolygonZone::from_vertices(&vertices, ZONE_HALF_HEIGHT) else {
        let err = RegistryError::NoVertices(uid);
        error!("{}", err);
        return Err(err);
    };
    let anchor = vertices[0];
    let marker = marker_uid(&uid);

    let entity = commands
        .spawn((
            PaintShop {
                uid: uid.clone(),
                cost: definition.cost,
            },
            MapBlip {
                uid: marker.clone(),
                label: locale::PAINT_SHOP_LABEL.to_string(),
                sprite: PAINT_SHOP_BLIP_SPRITE,
                color: PAINT_SHOP_BLIP_COLOR,
                scale: 1.0,
                short_range: true,
                position: anchor,
            },
            InteractionPoint {
                uid: marker,
                position: anchor,
                description: locale::OPEN_MENU.to_string(),
            },
            zone,
            ZoneOccupants::default(),
        ))
        .observe(on_zone_entered)
        .observe(on_zone_left)
        .id();

    registry.shops.push(RegisteredShop {
        uid: uid.clone(),
        cost: definition.cost,
        entity,
    });

    Ok(uid)
}

/// Startup: register every configured shop. Failures are logged and skipped.
pub fn register_configured_shops(
    mut commands: Commands,
    mut registry: ResMut<PaintShopRegistry>,
    settings: Res<PaintShopSettings>,
) {
    for definition in &settings.shops {
        if let Ok(uid) = register_paint_shop(&mut commands, &mut registry, definition) {
            info!("Registered paint shop {} (cost {})", uid, definition.cost);
        }
    }
    info!("{} paint shop(s) registered", registry.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(cost: u32) -> PaintShopDefinition {
        PaintShopDefinition {
            uid: None,
            cost,
            vertices: vec![[0.0, 2.0, 0.0], [8.0, 2.0, 0.0], [8.0, 2.0, 8.0], [0.0, 2.0, 8.0]],
        }
    }

    fn register(
        world: &mut World,
        registry: &mut PaintShopRegistry,
        def: &PaintShopDefinition,
    ) -> Result<String, RegistryError> {
        let result = {
            let mut commands = world.commands();
            register_paint_shop(&mut commands, registry, def)
        };
        world.flush();
        result
    }

    #[test]
    fn test_register_spawns_shop_entity() {
        let mut world = World::new();
        let mut registry = PaintShopRegistry::default();

        let uid = register(&mut world, &mut registry, &definition(100)).unwrap();
        let shop = registry.get(&uid).unwrap();

        let blip = world.get::<MapBlip>(shop.entity).unwrap();
        assert_eq!(blip.uid, format!("paint-shop-{}", uid));
        assert_eq!(blip.sprite, 72);
        assert_eq!(blip.color, 48);
        assert_eq!(blip.position, Vec3::new(0.0, 2.0, 0.0));

        let zone = world.get::<PolygonZone>(shop.entity).unwrap();
        assert_eq!(zone.min_y, -0.5);
        assert_eq!(zone.max_y, 4.5);

        assert_eq!(world.get::<PaintShop>(shop.entity).unwrap().cost, 100);
        assert!(world.get::<InteractionPoint>(shop.entity).is_some());
    }

    #[test]
    fn test_distinct_content_distinct_ids() {
        let mut world = World::new();
        let mut registry = PaintShopRegistry::default();

        let a = register(&mut world, &mut registry, &definition(100)).unwrap();
        let b = register(&mut world, &mut registry, &definition(200)).unwrap();

        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_identical_content_is_rejected() {
        let mut world = World::new();
        let mut registry = PaintShopRegistry::default();

        let uid = register(&mut world, &mut registry, &definition(100)).unwrap();
        let entities_before = world.entities().len();

        let err = register(&mut world, &mut registry, &definition(100)).unwrap_err();
        assert_eq!(err, RegistryError::Duplicate(uid));
        assert_eq!(registry.len(), 1);
        assert_eq!(world.entities().len(), entities_before);
    }

    #[test]
    fn test_explicit_uid_collision() {
        let mut world = World::new();
        let mut registry = PaintShopRegistry::default();

        let mut first = definition(100);
        first.uid = Some("docks".to_string());
        let mut second = definition(999);
        second.uid = Some("docks".to_string());

        assert_eq!(register(&mut world, &mut registry, &first).unwrap(), "docks");
        assert!(register(&mut world, &mut registry, &second).is_err());
        assert_eq!(registry.get("docks").unwrap().cost, 100);
    }

    #[test]
    fn test_shop_without_vertices() {
        let mut world = World::new();
        let mut registry = PaintShopRegistry::default();
        let mut empty = definition(100);
        empty.vertices.clear();

        assert!(matches!(
            register(&mut world, &mut registry, &empty),
            Err(RegistryError::NoVertices(_))
        ));
        assert!(registry.is_empty());
    }
}

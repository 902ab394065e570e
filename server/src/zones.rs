//! Zone enter/leave detection
//!
//! Every tick each `PolygonZone` is tested against player and vehicle positions.
//! Transitions trigger `ZoneEntered` / `ZoneLeft` on the zone entity, so features
//! bind to a zone with `EntityCommands::observe`.

use std::collections::HashSet;

use bevy::prelude::*;
use paint_shop_shared::{PlayerPosition, PolygonZone, VehicleState};

#[derive(EntityEvent, Debug, Clone)]
pub struct ZoneEntered {
    /// The zone
    pub entity: Entity,
    /// Player or vehicle that crossed into it
    pub actor: Entity,
}

#[derive(EntityEvent, Debug, Clone)]
pub struct ZoneLeft {
    pub entity: Entity,
    pub actor: Entity,
}

/// Actors currently inside a zone
#[derive(Component, Debug, Default)]
pub struct ZoneOccupants(pub HashSet<Entity>);

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ZoneSet;

pub struct ZonePlugin;

impl Plugin for ZonePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, detect_zone_transitions.in_set(ZoneSet));
    }
}

pub fn detect_zone_transitions(
    mut commands: Commands,
    mut zones: Query<(Entity, &PolygonZone, &mut ZoneOccupants)>,
    players: Query<(Entity, &PlayerPosition)>,
    vehicles: Query<(Entity, &VehicleState)>,
) {
    for (zone_entity, zone, mut occupants) in zones.iter_mut() {
        let actors = players
            .iter()
            .map(|(entity, pos)| (entity, pos.0))
            .chain(vehicles.iter().map(|(entity, state)| (entity, state.position)));

        let mut inside = HashSet::new();
        for (actor, position) in actors {
            if !zone.contains(position) {
                continue;
            }
            inside.insert(actor);
            if !occupants.0.contains(&actor) {
                commands.trigger(ZoneEntered { entity: zone_entity, actor });
            }
        }

        for &actor in occupants.0.difference(&inside) {
            // Despawned actors just drop out
            if players.contains(actor) || vehicles.contains(actor) {
                commands.trigger(ZoneLeft { entity: zone_entity, actor });
            }
        }

        occupants.0 = inside;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paint_shop_shared::ZONE_HALF_HEIGHT;

    #[derive(Resource, Default)]
    struct Transitions(Vec<(&'static str, Entity)>);

    fn setup() -> (App, Entity) {
        let mut app = App::new();
        app.add_plugins(ZonePlugin);
        app.init_resource::<Transitions>();

        let zone = PolygonZone::from_vertices(
            &[
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(10.0, 0.0, 0.0),
                Vec3::new(10.0, 0.0, 10.0),
                Vec3::new(0.0, 0.0, 10.0),
            ],
            ZONE_HALF_HEIGHT,
        )
        .unwrap();

        let zone_entity = app
            .world_mut()
            .spawn((zone, ZoneOccupants::default()))
            .observe(|enter: On<ZoneEntered>, mut log: ResMut<Transitions>| {
                log.0.push(("enter", enter.actor));
            })
            .observe(|leave: On<ZoneLeft>, mut log: ResMut<Transitions>| {
                log.0.push(("leave", leave.actor));
            })
            .id();

        (app, zone_entity)
    }

    fn tick(app: &mut App) {
        app.world_mut().run_schedule(FixedUpdate);
    }

    #[test]
    fn test_enter_and_leave() {
        let (mut app, _) = setup();
        let player = app.world_mut().spawn(PlayerPosition(Vec3::new(-5.0, 0.0, 5.0))).id();

        tick(&mut app);
        assert!(app.world().resource::<Transitions>().0.is_empty());

        app.world_mut().get_mut::<PlayerPosition>(player).unwrap().0 = Vec3::new(5.0, 0.0, 5.0);
        tick(&mut app);
        // Staying inside doesn't re-trigger
        tick(&mut app);
        assert_eq!(app.world().resource::<Transitions>().0, vec![("enter", player)]);

        app.world_mut().get_mut::<PlayerPosition>(player).unwrap().0 = Vec3::new(5.0, 0.0, 50.0);
        tick(&mut app);
        assert_eq!(
            app.world().resource::<Transitions>().0,
            vec![("enter", player), ("leave", player)]
        );
    }

    #[test]
    fn test_vehicles_are_actors() {
        let (mut app, zone) = setup();
        let vehicle = app
            .world_mut()
            .spawn(VehicleState { position: Vec3::new(2.0, 1.0, 2.0), ..default() })
            .id();

        tick(&mut app);

        assert_eq!(app.world().resource::<Transitions>().0, vec![("enter", vehicle)]);
        assert!(app.world().get::<ZoneOccupants>(zone).unwrap().0.contains(&vehicle));
    }

    #[test]
    fn test_despawned_actor_leaves_silently() {
        let (mut app, zone) = setup();
        let player = app.world_mut().spawn(PlayerPosition(Vec3::new(5.0, 0.0, 5.0))).id();
        tick(&mut app);

        app.world_mut().despawn(player);
        tick(&mut app);

        assert_eq!(app.world().resource::<Transitions>().0, vec![("enter", player)]);
        assert!(app.world().get::<ZoneOccupants>(zone).unwrap().0.is_empty());
    }
}

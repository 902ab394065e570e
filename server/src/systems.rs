//! Server-side host systems: connections, characters, vehicles and movement
//!
//! Updated for Lightyear 0.25

use bevy::prelude::*;
use lightyear::prelude::*;
use lightyear::prelude::server::*;
use std::collections::{HashMap, HashSet};

use paint_shop_shared::{
    can_interact_with_vehicle, peer_id_to_u64, step_vehicle, vehicle_def, Character,
    CharacterResult, InVehicle, LivePaint, PaintShopClientMessage, PaintShopServerMessage, Player,
    PlayerInput, PlayerPosition, PlayerRotation, ReliableChannel, SubmitCharacter,
    TemporaryVehicle, Vehicle, VehicleDriver, VehicleRecord, VehicleState, VehicleType,
    FIXED_TIMESTEP_HZ, PLAYER_SPEED, SPAWN_POSITION,
};

use crate::characters::Characters;
use crate::config::VehicleSeed;
use crate::paint_shop::paint::discard_preview;
use crate::paint_shop::PaintShopSessions;
use crate::persistence::VehicleStore;

/// Stores the latest input for each connected client.
/// We use PeerId in Lightyear 0.25
#[derive(Resource, Default)]
pub struct ClientInputs {
    pub latest: HashMap<PeerId, PlayerInput>,
    /// Interact went down since the last vehicle interaction pass
    interact_pressed: HashSet<PeerId>,
}

impl ClientInputs {
    pub fn record(&mut self, peer: PeerId, input: PlayerInput) {
        let held = self.latest.get(&peer).is_some_and(|previous| previous.interact);
        if input.interact && !held {
            self.interact_pressed.insert(peer);
        }
        self.latest.insert(peer, input);
    }

    pub fn take_interact(&mut self, peer: PeerId) -> bool {
        self.interact_pressed.remove(&peer)
    }

    pub fn remove(&mut self, peer: PeerId) {
        self.latest.remove(&peer);
        self.interact_pressed.remove(&peer);
    }
}

/// Vehicles listed in the config
#[derive(Resource, Clone, Debug, Default)]
pub struct VehicleSeeds(pub Vec<VehicleSeed>);

/// Handle new client connections - setup message channels
/// In Lightyear 0.25, we query for newly added ClientOf + Connected entities
/// Player spawning happens in handle_character_submission after the name is validated
pub fn handle_connections(
    mut commands: Commands,
    new_clients: Query<(Entity, &RemoteId), (Added<Connected>, With<ClientOf>)>,
) {
    for (client_entity, remote_id) in new_clients.iter() {
        info!("Client connected: {:?} - awaiting character", remote_id.0);

        // Lightyear 0.25 requires these on the connection entity (the one with
        // `ClientOf` + `Connected`). Without them, no replication or messages.
        commands.entity(client_entity).insert((
            // Replication out: server -> this client
            ReplicationSender::new(
                paint_shop_shared::protocol::tick_duration(),
                SendUpdatesMode::SinceLastAck,
                false,
            ),
            // Client -> Server
            MessageReceiver::<PlayerInput>::default(),
            MessageReceiver::<SubmitCharacter>::default(),
            MessageReceiver::<PaintShopClientMessage>::default(),
            // Server -> Client
            MessageSender::<CharacterResult>::default(),
            MessageSender::<PaintShopServerMessage>::default(),
        ));
    }
}

/// Validate submitted character names and spawn the player entity
pub fn handle_character_submission(
    mut commands: Commands,
    mut characters: ResMut<Characters>,
    mut client_links: Query<
        (
            Entity,
            &RemoteId,
            &mut MessageReceiver<SubmitCharacter>,
            &mut MessageSender<CharacterResult>,
        ),
        With<ClientOf>,
    >,
) {
    for (client_entity, remote_id, mut receiver, mut sender) in client_links.iter_mut() {
        let peer_id = remote_id.0;

        for submission in receiver.receive() {
            // One character per connection
            if characters.get(peer_id).is_some() {
                continue;
            }

            let name = submission.name.trim().to_string();
            let character_id = match characters.claim(peer_id, &name) {
                Ok(id) => id,
                Err(reason) => {
                    warn!("Name '{}' from {:?} rejected: {:?}", name, peer_id, reason);
                    sender.send::<ReliableChannel>(CharacterResult::Rejected { reason });
                    continue;
                }
            };

            commands.spawn((
                Player { client_id: peer_id },
                PlayerPosition(Vec3::from_array(SPAWN_POSITION)),
                PlayerRotation(0.0),
                Character {
                    id: character_id.clone(),
                    display_name: name.clone(),
                },
                Replicate::new(ReplicationMode::SingleServer(NetworkTarget::All)),
                ControlledBy {
                    owner: client_entity,
                    lifetime: Lifetime::default(),
                },
            ));

            sender.send::<ReliableChannel>(CharacterResult::Accepted {
                character_id: character_id.clone(),
            });
            info!("Player '{}' ({}) spawned for {:?}", name, character_id, peer_id);
        }
    }
}

/// Free everything the server tracks for a peer when its link drops.
/// This is an observer that triggers when a client gets Disconnected component added
pub fn handle_disconnections(
    trigger: On<Add, Disconnected>,
    client_entities: Query<&RemoteId>,
    players: Query<(&Player, Option<&InVehicle>)>,
    mut vehicles: Query<(&mut VehicleDriver, Option<&VehicleRecord>, &mut LivePaint)>,
    mut characters: ResMut<Characters>,
    mut sessions: ResMut<PaintShopSessions>,
    mut inputs: ResMut<ClientInputs>,
) {
    let client_entity = trigger.entity;

    let Ok(remote_id) = client_entities.get(client_entity) else {
        warn!("Disconnect trigger for entity {:?} but no RemoteId found", client_entity);
        return;
    };
    let peer_id = remote_id.0;

    // Leave the vehicle driverless; the player entity goes with the link
    let seat = players
        .iter()
        .find(|(player, _)| player.client_id == peer_id)
        .and_then(|(_, in_vehicle)| in_vehicle);
    if let Some(seat) = seat {
        if let Ok((mut driver, _, _)) = vehicles.get_mut(seat.vehicle_entity) {
            if driver.is_driven_by(peer_id_to_u64(peer_id)) {
                driver.driver_id = None;
            }
        }
    }

    // Nobody is left to buy an open preview
    let preview = sessions.leave(peer_id).and_then(|session| session.preview);
    if let Some(vehicle) = preview {
        if let Ok((_, record, mut live)) = vehicles.get_mut(vehicle) {
            discard_preview(record, &mut live);
        }
    }
    inputs.remove(peer_id);
    match characters.release(peer_id) {
        Some(id) => info!("Client {:?} disconnected, freed character '{}'", peer_id, id),
        None => info!("Client {:?} disconnected before picking a character", peer_id),
    }
}

/// Receive input messages from clients
/// In Lightyear 0.25, we read from MessageReceiver components
pub fn receive_client_input(
    mut inputs: ResMut<ClientInputs>,
    mut client_links: Query<(&RemoteId, &mut MessageReceiver<PlayerInput>), With<ClientOf>>,
) {
    for (remote_id, mut receiver) in client_links.iter_mut() {
        for input in receiver.receive() {
            inputs.record(remote_id.0, input);
        }
    }
}

/// Enter/exit vehicles on an interact press. The first player in drives; later ones ride along.
pub fn handle_vehicle_interactions(
    mut commands: Commands,
    mut inputs: ResMut<ClientInputs>,
    mut store: ResMut<VehicleStore>,
    mut sessions: ResMut<PaintShopSessions>,
    players: Query<(Entity, &Player, &PlayerPosition, Option<&InVehicle>)>,
    mut vehicles: Query<(
        Entity,
        &mut VehicleDriver,
        &VehicleState,
        Option<&VehicleRecord>,
        &mut LivePaint,
    )>,
) {
    for (player_entity, player, player_pos, in_vehicle) in players.iter() {
        if !inputs.take_interact(player.client_id) {
            continue;
        }
        let driver_id = peer_id_to_u64(player.client_id);

        if let Some(seat) = in_vehicle {
            commands.entity(player_entity).remove::<InVehicle>();

            // Getting out drops any preview
            if let Some(previewed) = sessions.take_preview(player.client_id) {
                if let Ok((_, _, _, record, mut live)) = vehicles.get_mut(previewed) {
                    discard_preview(record, &mut live);
                }
            }

            if let Ok((_, mut driver, _, record, _)) = vehicles.get_mut(seat.vehicle_entity) {
                if driver.is_driven_by(driver_id) {
                    driver.driver_id = None;
                    // Remember where it was parked
                    if let Some(record) = record {
                        if let Err(e) = store.save(record) {
                            error!("Failed to save vehicle {}: {}", record.id, e);
                        }
                    }
                }
            }
            info!("Player {:?} exited vehicle", player.client_id);
            continue;
        }

        let nearby = vehicles
            .iter_mut()
            .find(|(_, _, state, _, _)| can_interact_with_vehicle(player_pos.0, state));
        let Some((vehicle_entity, mut driver, _, _, _)) = nearby else {
            continue;
        };

        commands.entity(player_entity).insert(InVehicle { vehicle_entity });
        if driver.driver_id.is_none() {
            driver.driver_id = Some(driver_id);
            info!("Player {:?} entered vehicle as driver", player.client_id);
        } else {
            info!("Player {:?} entered vehicle as passenger", player.client_id);
        }
    }
}

/// Drive every vehicle that has a driver with that driver's latest input
pub fn simulate_vehicles(
    inputs: Res<ClientInputs>,
    mut vehicles: Query<(&Vehicle, &VehicleDriver, &mut VehicleState)>,
) {
    let dt = (1.0 / FIXED_TIMESTEP_HZ) as f32;

    for (vehicle, driver, mut state) in vehicles.iter_mut() {
        let Some(driver_id) = driver.driver_id else {
            continue;
        };
        let vehicle_input = inputs
            .latest
            .iter()
            .find(|(peer, _)| peer_id_to_u64(**peer) == driver_id)
            .and_then(|(_, input)| input.vehicle_input.clone())
            .unwrap_or_default();

        step_vehicle(&mut state, &vehicle_def(vehicle.vehicle_type), &vehicle_input, dt);
    }
}

/// Walk players on foot; seated players ride with their vehicle
pub fn simulate_players(
    inputs: Res<ClientInputs>,
    mut players: Query<(&Player, &mut PlayerPosition, &mut PlayerRotation, Option<&InVehicle>)>,
    vehicles: Query<&VehicleState>,
) {
    let dt = (1.0 / FIXED_TIMESTEP_HZ) as f32;

    for (player, mut pos, mut rot, in_vehicle) in players.iter_mut() {
        if let Some(seat) = in_vehicle {
            if let Ok(state) = vehicles.get(seat.vehicle_entity) {
                pos.0 = state.position;
                rot.0 = state.heading;
            }
            continue;
        }

        let Some(input) = inputs.latest.get(&player.client_id) else {
            continue;
        };

        let forward = Vec3::new(input.yaw.sin(), 0.0, input.yaw.cos());
        let right = Vec3::new(forward.z, 0.0, -forward.x);
        let mut direction = Vec3::ZERO;
        if input.forward {
            direction += forward;
        }
        if input.backward {
            direction -= forward;
        }
        if input.right {
            direction += right;
        }
        if input.left {
            direction -= right;
        }

        pos.0 += direction.normalize_or_zero() * PLAYER_SPEED * dt;
        rot.0 = input.yaw;
    }
}

/// Keep the in-memory record's position current
pub fn sync_record_positions(
    mut vehicles: Query<(&VehicleState, &mut VehicleRecord), Changed<VehicleState>>,
) {
    for (state, mut record) in vehicles.iter_mut() {
        record.position = state.position.to_array();
        record.heading = state.heading;
    }
}

/// Spawn saved vehicles plus any configured seed the store doesn't know yet
pub fn spawn_vehicles(
    mut commands: Commands,
    mut store: ResMut<VehicleStore>,
    seeds: Res<VehicleSeeds>,
) {
    let mut records = store.load_all().unwrap_or_else(|e| {
        error!("Failed to load vehicle records: {}", e);
        Vec::new()
    });

    for seed in &seeds.0 {
        if seed.temporary {
            commands.spawn((
                vehicle_bundle(seed.vehicle_type, Vec3::from_array(seed.position), 0.0),
                TemporaryVehicle,
            ));
            info!("Spawned temporary vehicle {}", seed.id);
            continue;
        }
        if records.iter().any(|record| record.id == seed.id) {
            continue;
        }

        let record = VehicleRecord::new(&seed.id, &seed.owner, seed.vehicle_type, seed.position);
        if let Err(e) = store.save(&record) {
            error!("Failed to save new vehicle {}: {}", record.id, e);
        }
        records.push(record);
    }

    for record in records {
        info!("Spawned vehicle {} owned by '{}'", record.id, record.owner);
        commands.spawn((
            vehicle_bundle(record.vehicle_type, Vec3::from_array(record.position), record.heading),
            record,
        ));
    }
}

fn vehicle_bundle(
    vehicle_type: VehicleType,
    position: Vec3,
    heading: f32,
) -> (Vehicle, VehicleState, VehicleDriver, LivePaint) {
    (
        Vehicle { vehicle_type },
        VehicleState {
            position,
            heading,
            ..default()
        },
        VehicleDriver::default(),
        LivePaint::default(),
    )
}

//! Paint Shop Server - Headless Bevy app hosting players, vehicles and paint shops
//!
//! Updated for Lightyear 0.25 / Bevy 0.17

mod characters;
mod config;
mod network;
mod paint_shop;
mod persistence;
mod systems;
mod zones;

use bevy::prelude::*;
use bevy::app::ScheduleRunnerPlugin;
use lightyear::prelude::*;
use lightyear::prelude::server::*;
// UDP/Netcode types re-exported through prelude::server (when features enabled)
use paint_shop_shared::{
    protocol::*, ProtocolPlugin, PRIVATE_KEY, PROTOCOL_ID, SERVER_PORT, get_server_bind_addr,
};
use std::net::SocketAddr;

use characters::Characters;
use config::ServerConfig;
use network::PaintShopNetworkPlugin;
use paint_shop::PaintShopPlugin;
use persistence::{FileVehicleStore, VehicleStore};
use systems::{ClientInputs, VehicleSeeds};
use zones::ZoneSet;

/// Marker for our server entity
#[derive(Component)]
struct GameServer;

/// Spawn the server entity with all required networking components
fn spawn_server(mut commands: Commands) {
    let bind_addr = get_server_bind_addr();
    let server_addr: SocketAddr = match format!("{}:{}", bind_addr, SERVER_PORT).parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Invalid server bind address {}:{}: {}", bind_addr, SERVER_PORT, e);
            return;
        }
    };

    info!("Spawning server entity, binding to {:?}", server_addr);

    // Spawn server entity with UDP + Netcode
    commands.spawn((
        GameServer,
        Server::default(),
        ServerUdpIo::default(),
        LocalAddr(server_addr),
        NetcodeServer::new(NetcodeConfig {
            protocol_id: PROTOCOL_ID,
            private_key: PRIVATE_KEY,
            ..default()
        }),
    ));
}

/// Start the server after it's spawned
fn start_server(
    mut commands: Commands,
    server_query: Query<Entity, (With<GameServer>, Without<Started>, Without<Starting>)>,
) {
    for server_entity in server_query.iter() {
        info!("Starting server...");
        // In Bevy 0.17 + Lightyear 0.25, trigger an EntityEvent
        commands.trigger(Start { entity: server_entity });
    }
}

/// Check if server is started (run condition)
fn server_is_started(server_query: Query<(), (With<GameServer>, With<Started>)>) -> bool {
    !server_query.is_empty()
}

fn open_vehicle_store(config: &ServerConfig) -> VehicleStore {
    match FileVehicleStore::new(config.storage_dir()) {
        Ok(store) => VehicleStore::new(store),
        Err(e) => {
            error!("Vehicle storage unavailable ({}) - purchases will not survive a restart", e);
            VehicleStore::in_memory()
        }
    }
}

fn main() {
    let mut app = App::new();

    // Headless plugins (no rendering)
    // IMPORTANT: run the main loop at the same rate as our fixed tick.
    //
    // If the headless app runs "as fast as possible", Bevy will clear `MessageReceiver` buffers
    // every frame (in `Last`), but our gameplay systems read messages in `FixedUpdate`.
    // When frames >> fixed ticks, paint shop requests get cleared before `FixedUpdate` runs.
    app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(tick_duration())));
    app.add_plugins(bevy::log::LogPlugin::default());
    app.add_plugins(bevy::state::app::StatesPlugin);

    // Logging is up; config and storage report through it
    let config = ServerConfig::load();
    app.insert_resource(open_vehicle_store(&config));
    app.insert_resource(VehicleSeeds(config.vehicles.clone()));

    app.init_resource::<ClientInputs>();
    app.init_resource::<Characters>();

    // Lightyear server plugins (tick_duration = 60Hz)
    app.add_plugins(ServerPlugins {
        tick_duration: tick_duration(),
    });

    // Protocol plugin (component/message registration)
    app.add_plugins(ProtocolPlugin);

    // Paint shops and their network bridge
    app.add_plugins(PaintShopPlugin {
        shops: config.shops.clone(),
    });
    app.add_plugins(PaintShopNetworkPlugin);

    app.add_systems(Startup, (spawn_server, systems::spawn_vehicles));
    app.add_observer(systems::handle_disconnections);

    // Start server after spawning
    app.add_systems(Update, start_server);
    app.add_systems(Update, network::replicate_world_entities.run_if(server_is_started));

    // Fixed tick: connections and inputs, then movement, then zones and paint shops.
    app.add_systems(
        FixedUpdate,
        (
            systems::handle_connections,
            systems::handle_character_submission,
            systems::receive_client_input,
            systems::handle_vehicle_interactions,
            systems::simulate_vehicles,
            systems::simulate_players,
            systems::sync_record_positions,
        )
            .chain()
            .before(ZoneSet)
            .run_if(server_is_started),
    );

    info!("Starting paint shop server on port {}", SERVER_PORT);
    app.run();
}

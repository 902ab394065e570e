//! Lightyear network protocol definition
//!
//! Lightyear 0.25 - merged entity model

use bevy::prelude::*;
use lightyear::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::components::{Player, PlayerPosition, PlayerRotation};
use crate::paint::{LivePaint, Rgb, VehicleColor};
use crate::shop::{InteractionPoint, MapBlip, PaintShop};
use crate::vehicle::{Vehicle, VehicleDriver, VehicleInput, VehicleState};

// --- Input (for server-authoritative movement) ---

/// Player input sent from client to server each tick
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
pub struct PlayerInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    /// Player's facing direction (yaw) for movement calculation
    pub yaw: f32,
    /// If in a vehicle, this contains the vehicle input
    pub vehicle_input: Option<VehicleInput>,
    /// Enter/exit vehicle (acted on when the key goes down)
    pub interact: bool,
}

// --- Characters ---

/// Client -> Server: pick the character to play as
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct SubmitCharacter {
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
pub enum NameRejectionReason {
    TooShort,
    TooLong,
    InvalidCharacters,
    Reserved,
    AlreadyOnline,
}

/// Server -> Client: answer to `SubmitCharacter`
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub enum CharacterResult {
    Accepted { character_id: String },
    Rejected { reason: NameRejectionReason },
}

// --- Paint shop ---

/// Cosmetic preview while the shop UI is open. Never persisted.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct PreviewPaint {
    pub color: VehicleColor,
    pub color2: VehicleColor,
    pub finish1: u8,
    pub finish2: u8,
    /// Negative leaves the pearl slot alone
    pub pearl: i16,
}

impl PreviewPaint {
    pub fn palette(primary: u8, secondary: u8) -> Self {
        Self {
            color: VehicleColor::Palette(primary),
            color2: VehicleColor::Palette(secondary),
            finish1: 0,
            finish2: 0,
            pearl: -1,
        }
    }
}

/// Commit paint to the vehicle record. Each field is applied only when present.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
pub struct PurchasePaint {
    pub color: Option<VehicleColor>,
    pub color2: Option<VehicleColor>,
    pub finish1: Option<u8>,
    pub finish2: Option<u8>,
    pub pearl: Option<u8>,
}

/// Current paint of the vehicle, sent when the shop UI opens
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct PaintShopSync {
    pub color: Rgb,
    pub color2: Rgb,
    pub pearl: u8,
    pub finish1: u8,
    pub finish2: u8,
}

/// Client -> Server paint shop traffic. One enum so a client's requests keep their order.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub enum PaintShopClientMessage {
    Open,
    Preview(PreviewPaint),
    Purchase(PurchasePaint),
    Close,
}

/// Server -> Client paint shop traffic
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub enum PaintShopServerMessage {
    Sync(PaintShopSync),
    /// One-line toast
    Notification { text: String },
    PlaySound { name: String, volume: f32 },
    /// `Some(event)` offers an interaction that fires `event`; `None` clears it
    TemporaryInteraction { event: Option<String> },
    RemoveInteractionText { uid: String },
}

// --- Channels ---
// In Lightyear 0.25, Channel trait is auto-implemented for all Send + Sync + 'static types

/// Reliable channel for important messages
pub struct ReliableChannel;

/// Unreliable channel for frequent input (lowest latency)
pub struct InputChannel;

// --- Protocol Plugin ---

pub struct ProtocolPlugin;

impl Plugin for ProtocolPlugin {
    fn build(&self, app: &mut App) {
        // === PLAYER COMPONENTS ===
        app.register_component::<Player>()
            .add_prediction();

        app.register_component::<PlayerPosition>()
            .add_prediction();

        app.register_component::<PlayerRotation>()
            .add_prediction();

        // === VEHICLE COMPONENTS ===
        app.register_component::<Vehicle>()
            .add_prediction();

        app.register_component::<VehicleState>()
            .add_prediction();

        app.register_component::<VehicleDriver>()
            .add_prediction();

        // Paint only changes on shop actions; no prediction needed
        app.register_component::<LivePaint>();

        // === PAINT SHOP MARKERS ===
        app.register_component::<PaintShop>();
        app.register_component::<MapBlip>();
        app.register_component::<InteractionPoint>();

        // === MESSAGES ===

        // Client -> Server
        app.register_message::<SubmitCharacter>()
            .add_direction(NetworkDirection::ClientToServer);
        app.register_message::<PlayerInput>()
            .add_direction(NetworkDirection::ClientToServer);
        app.register_message::<PaintShopClientMessage>()
            .add_direction(NetworkDirection::ClientToServer);

        // Server -> Client
        app.register_message::<CharacterResult>()
            .add_direction(NetworkDirection::ServerToClient);
        app.register_message::<PaintShopServerMessage>()
            .add_direction(NetworkDirection::ServerToClient);

        // === CHANNELS ===

        app.add_channel::<ReliableChannel>(ChannelSettings {
            mode: ChannelMode::OrderedReliable(ReliableSettings::default()),
            ..default()
        })
        // Characters and every paint shop message
        .add_direction(NetworkDirection::Bidirectional);

        app.add_channel::<InputChannel>(ChannelSettings {
            mode: ChannelMode::UnorderedUnreliable,
            ..default()
        })
        // High-frequency input: client -> server only
        .add_direction(NetworkDirection::ClientToServer);
    }
}

// --- Network Configuration ---

pub const SERVER_PORT: u16 = 5000;
pub const PROTOCOL_ID: u64 = 0x5041_494E_5453_4850;

/// Address the server binds to
pub fn get_server_bind_addr() -> &'static str {
    "0.0.0.0"
}

/// Shared private key for local development (use proper key management in production!)
pub const PRIVATE_KEY: [u8; 32] = [
    0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08,
    0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f, 0x10,
    0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18,
    0x19, 0x1a, 0x1b, 0x1c, 0x1d, 0x1e, 0x1f, 0x20,
];

/// Fixed timestep for game logic (60 Hz)
pub const FIXED_TIMESTEP_HZ: f64 = 60.0;

/// Tick duration for lightyear plugins
pub fn tick_duration() -> Duration {
    Duration::from_secs_f64(1.0 / FIXED_TIMESTEP_HZ)
}

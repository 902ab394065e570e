//! Vehicle components and a simple kinematic drive step.
//!
//! The paint shop only needs vehicles to exist, have a driver and move in and out
//! of zones, so there is no suspension or terrain model here.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

// =============================================================================
// VEHICLE TUNING CONSTANTS
// =============================================================================

pub mod motorbike {
    pub const ACCELERATION: f32 = 14.0;     // m/s^2
    pub const BRAKE: f32 = 30.0;            // m/s^2
    pub const MAX_SPEED: f32 = 45.0;        // m/s (~162 km/h)
    pub const MAX_REVERSE_SPEED: f32 = 8.0;
    pub const DRAG: f32 = 0.25;
    pub const STEERING_RATE: f32 = 2.5;     // rad/s at full speed
}

pub mod car {
    pub const ACCELERATION: f32 = 9.0;
    pub const BRAKE: f32 = 24.0;
    pub const MAX_SPEED: f32 = 42.0;
    pub const MAX_REVERSE_SPEED: f32 = 10.0;
    pub const DRAG: f32 = 0.35;
    pub const STEERING_RATE: f32 = 1.6;
}

/// Drive values for a vehicle type.
#[derive(Clone, Copy, Debug)]
pub struct VehicleDef {
    pub acceleration: f32,
    pub brake: f32,
    pub max_speed: f32,
    pub max_reverse_speed: f32,
    pub drag: f32,
    pub steering_rate: f32,
}

pub fn vehicle_def(vehicle_type: VehicleType) -> VehicleDef {
    match vehicle_type {
        VehicleType::Motorbike => VehicleDef {
            acceleration: motorbike::ACCELERATION,
            brake: motorbike::BRAKE,
            max_speed: motorbike::MAX_SPEED,
            max_reverse_speed: motorbike::MAX_REVERSE_SPEED,
            drag: motorbike::DRAG,
            steering_rate: motorbike::STEERING_RATE,
        },
        VehicleType::Car => VehicleDef {
            acceleration: car::ACCELERATION,
            brake: car::BRAKE,
            max_speed: car::MAX_SPEED,
            max_reverse_speed: car::MAX_REVERSE_SPEED,
            drag: car::DRAG,
            steering_rate: car::STEERING_RATE,
        },
    }
}

// =============================================================================
// COMPONENTS
// =============================================================================

#[derive(Component, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Vehicle {
    pub vehicle_type: VehicleType,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Default)]
pub enum VehicleType {
    #[default]
    Motorbike,
    Car,
}

#[derive(Component, Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct VehicleState {
    pub position: Vec3,
    pub velocity: Vec3,
    pub heading: f32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct VehicleInput {
    pub throttle: f32,
    pub brake: f32,
    pub steer: f32,
}

#[derive(Component, Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct VehicleDriver {
    pub driver_id: Option<u64>,
}

impl VehicleDriver {
    pub fn is_driven_by(&self, driver_id: u64) -> bool {
        self.driver_id == Some(driver_id)
    }
}

/// Set on a player while seated in a vehicle (driver or passenger)
#[derive(Component, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct InVehicle {
    pub vehicle_entity: Entity,
}

/// Rental / spawned-for-a-job vehicles: never persisted, never modified
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct TemporaryVehicle;

pub fn can_interact_with_vehicle(player_pos: Vec3, vehicle_state: &VehicleState) -> bool {
    let dist = (player_pos - vehicle_state.position).length();
    dist < 3.0
}

/// Advance a vehicle one tick on flat ground.
pub fn step_vehicle(state: &mut VehicleState, def: &VehicleDef, input: &VehicleInput, dt: f32) {
    let forward = Vec3::new(state.heading.sin(), 0.0, state.heading.cos());
    let mut speed = state.velocity.dot(forward);

    speed += input.throttle.clamp(-1.0, 1.0) * def.acceleration * dt;

    if input.brake > 0.0 {
        let decel = (def.brake * input.brake.min(1.0) * dt).min(speed.abs());
        speed -= speed.signum() * decel;
    }

    speed -= speed * def.drag * dt;
    speed = speed.clamp(-def.max_reverse_speed, def.max_speed);

    // Steering authority scales with speed so a parked vehicle can't spin in place
    let speed_factor = (speed / def.max_speed).clamp(-1.0, 1.0);
    state.heading += input.steer.clamp(-1.0, 1.0) * def.steering_rate * speed_factor * dt;

    let forward = Vec3::new(state.heading.sin(), 0.0, state.heading.cos());
    state.velocity = forward * speed;
    state.position += state.velocity * dt;
}

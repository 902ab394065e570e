//! Vehicle paint shop
//!
//! A driver of an owned vehicle can preview and buy paint while inside a shop zone.
//! Requests arrive as `PaintShopRequest` messages (see `network.rs` for the Lightyear
//! bridge) and replies leave as `PaintShopNotice` messages.

use std::collections::HashMap;

use bevy::prelude::*;
use lightyear::prelude::PeerId;
use paint_shop_shared::{PaintShopClientMessage, PaintShopDefinition, PaintShopServerMessage};

use crate::zones::{ZonePlugin, ZoneSet};

pub mod access;
pub mod handlers;
pub mod paint;
pub mod registry;

pub use handlers::{handle_paint_shop_requests, restore_paint_on_spawn};
pub use registry::PaintShopRegistry;

/// One player's visit to a shop
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    /// Vehicle currently showing this player's unpurchased preview
    pub preview: Option<Entity>,
}

/// Players currently inside a shop zone with the shop usable. Absent means outside.
#[derive(Resource, Default, Debug)]
pub struct PaintShopSessions {
    inside: HashMap<PeerId, Session>,
}

impl PaintShopSessions {
    /// Returns false if the player already had a session
    pub fn enter(&mut self, peer: PeerId) -> bool {
        if self.inside.contains_key(&peer) {
            return false;
        }
        self.inside.insert(peer, Session::default());
        true
    }

    /// Ends the session, handing back what it left on the vehicle
    pub fn leave(&mut self, peer: PeerId) -> Option<Session> {
        self.inside.remove(&peer)
    }

    pub fn is_inside(&self, peer: PeerId) -> bool {
        self.inside.contains_key(&peer)
    }

    /// No-op without a session
    pub fn mark_preview(&mut self, peer: PeerId, vehicle: Entity) {
        if let Some(session) = self.inside.get_mut(&peer) {
            session.preview = Some(vehicle);
        }
    }

    pub fn previewed(&self, peer: PeerId) -> Option<Entity> {
        self.inside.get(&peer)?.preview
    }

    /// Forget the previewed vehicle but keep the session
    pub fn take_preview(&mut self, peer: PeerId) -> Option<Entity> {
        self.inside.get_mut(&peer)?.preview.take()
    }
}

/// A client request, tagged with the sender
#[derive(Message, Debug, Clone)]
pub struct PaintShopRequest {
    pub peer: PeerId,
    pub message: PaintShopClientMessage,
}

/// Outgoing message for one client
#[derive(Message, Debug, Clone)]
pub struct PaintShopNotice {
    pub peer: PeerId,
    pub message: PaintShopServerMessage,
}

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaintShopSet {
    /// Network -> `PaintShopRequest`
    Receive,
    Handle,
    /// `PaintShopNotice` -> network
    Send,
}

/// Shops to register at startup
#[derive(Resource, Clone, Debug, Default)]
pub struct PaintShopSettings {
    pub shops: Vec<PaintShopDefinition>,
}

/// Requires a `VehicleStore` resource.
pub struct PaintShopPlugin {
    pub shops: Vec<PaintShopDefinition>,
}

impl Plugin for PaintShopPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<ZonePlugin>() {
            app.add_plugins(ZonePlugin);
        }

        app.insert_resource(PaintShopSettings {
            shops: self.shops.clone(),
        })
        .init_resource::<PaintShopRegistry>()
        .init_resource::<PaintShopSessions>()
        .add_message::<PaintShopRequest>()
        .add_message::<PaintShopNotice>();

        // Zone callbacks fire before this tick's requests are handled
        app.configure_sets(
            FixedUpdate,
            (
                ZoneSet,
                PaintShopSet::Receive,
                PaintShopSet::Handle,
                PaintShopSet::Send,
            )
                .chain(),
        );

        app.add_systems(Startup, registry::register_configured_shops);
        app.add_systems(
            FixedUpdate,
            (restore_paint_on_spawn, handle_paint_shop_requests)
                .chain()
                .in_set(PaintShopSet::Handle),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sessions() {
        let mut sessions = PaintShopSessions::default();
        let peer = PeerId::Netcode(1);

        assert!(!sessions.is_inside(peer));
        assert!(sessions.enter(peer));
        assert!(!sessions.enter(peer));
        assert!(sessions.is_inside(peer));
        assert!(!sessions.is_inside(PeerId::Netcode(2)));

        assert_eq!(sessions.leave(peer), Some(Session::default()));
        assert_eq!(sessions.leave(peer), None);
        assert!(!sessions.is_inside(peer));
    }

    #[test]
    fn test_session_tracks_previewed_vehicle() {
        let mut sessions = PaintShopSessions::default();
        let peer = PeerId::Netcode(1);
        let car = Entity::from_raw_u32(7).unwrap();

        // Outside a shop there is nothing to track
        sessions.mark_preview(peer, car);
        assert_eq!(sessions.previewed(peer), None);

        sessions.enter(peer);
        sessions.mark_preview(peer, car);
        assert_eq!(sessions.previewed(peer), Some(car));
        // Entering again keeps the preview
        assert!(!sessions.enter(peer));
        assert_eq!(sessions.take_preview(peer), Some(car));
        assert_eq!(sessions.take_preview(peer), None);
        assert!(sessions.is_inside(peer));

        sessions.mark_preview(peer, car);
        assert_eq!(sessions.leave(peer), Some(Session { preview: Some(car) }));
    }
}

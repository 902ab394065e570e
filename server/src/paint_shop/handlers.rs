//! Zone callbacks and client request handlers for the paint shop.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use lightyear::prelude::PeerId;
use paint_shop_shared::{
    marker_uid, peer_id_to_u64, Character, InVehicle, LivePaint, PaintShop,
    PaintShopClientMessage, PaintShopServerMessage, Player, PreviewPaint, PurchasePaint,
    TemporaryVehicle, VehicleDriver, VehicleRecord, PAINT_SHOP_OPEN_EVENT,
};

use super::access::{
    check_open, check_preview, check_purchase, check_zone_entry, Access, SeatedVehicle, ShopActor,
};
use super::paint::{
    apply_preview, commit_purchase, discard_preview, restore_persisted_paint, sync_payload,
};
use super::{PaintShopNotice, PaintShopRequest, PaintShopSessions};
use crate::persistence::VehicleStore;
use crate::zones::{ZoneEntered, ZoneLeft};

const ENTER_SOUND: &str = "shop_enter";
const ENTER_SOUND_VOLUME: f32 = 0.5;

/// Everything the paint shop reads or writes
#[derive(SystemParam)]
pub struct PaintShopWorld<'w, 's> {
    shops: Query<'w, 's, &'static PaintShop>,
    players: Query<
        'w,
        's,
        (
            Entity,
            &'static Player,
            &'static Character,
            Option<&'static InVehicle>,
        ),
    >,
    vehicles: Query<
        'w,
        's,
        (
            &'static VehicleDriver,
            Has<TemporaryVehicle>,
            Option<&'static mut VehicleRecord>,
            &'static mut LivePaint,
        ),
    >,
    sessions: ResMut<'w, PaintShopSessions>,
    store: ResMut<'w, VehicleStore>,
    notices: MessageWriter<'w, PaintShopNotice>,
}

/// Result of running a check against a player
struct Evaluation {
    peer: PeerId,
    /// Seated vehicle, if it exists
    vehicle: Option<Entity>,
    access: Access,
}

impl PaintShopWorld<'_, '_> {
    fn send(&mut self, peer: PeerId, message: PaintShopServerMessage) {
        self.notices.write(PaintShopNotice { peer, message });
    }

    fn player_for(&self, peer: PeerId) -> Option<Entity> {
        self.players
            .iter()
            .find(|(_, player, _, _)| player.client_id == peer)
            .map(|(entity, ..)| entity)
    }

    /// `None` when `player` isn't a player entity
    fn evaluate(&self, player: Entity, check: fn(&ShopActor) -> Access) -> Option<Evaluation> {
        let (_, player, character, in_vehicle) = self.players.get(player).ok()?;
        let peer = player.client_id;

        let seated = in_vehicle.and_then(|seat| {
            self.vehicles
                .get(seat.vehicle_entity)
                .ok()
                .map(|(driver, temporary, record, _)| {
                    let vehicle = SeatedVehicle {
                        driver_id: driver.driver_id,
                        temporary,
                        owner: record.map(|record| record.owner.as_str()),
                    };
                    (seat.vehicle_entity, vehicle)
                })
        });

        let actor = ShopActor {
            driver_id: peer_id_to_u64(peer),
            character_id: &character.id,
            in_shop: self.sessions.is_inside(peer),
            vehicle: seated.map(|(_, vehicle)| vehicle),
        };

        Some(Evaluation {
            peer,
            vehicle: seated.map(|(entity, _)| entity),
            access: check(&actor),
        })
    }

    /// Authorized vehicle for a request, or `None` (logged, nothing sent)
    fn authorize(
        &self,
        peer: PeerId,
        action: &str,
        check: fn(&ShopActor) -> Access,
    ) -> Option<Entity> {
        let eval = self.evaluate(self.player_for(peer)?, check)?;
        match eval.access {
            Access::Allowed => eval.vehicle,
            Access::Denied(reason) => {
                debug!("Paint shop {} refused for {:?}: {:?}", action, peer, reason);
                None
            }
        }
    }

    fn seated_vehicle(&self, player: Entity) -> Option<Entity> {
        let (_, _, _, in_vehicle) = self.players.get(player).ok()?;
        let vehicle = in_vehicle?.vehicle_entity;
        self.vehicles.contains(vehicle).then_some(vehicle)
    }

    fn restore(&mut self, vehicle: Entity) {
        if let Ok((_, _, record, mut live)) = self.vehicles.get_mut(vehicle) {
            discard_preview(record.as_deref(), &mut live);
        }
    }

    pub fn enter(&mut self, shop: Entity, actor: Entity) {
        let Some(eval) = self.evaluate(actor, check_zone_entry) else {
            return;
        };
        let peer = eval.peer;

        if let Access::Denied(reason) = eval.access {
            debug!("Paint shop entry refused for {:?}: {:?}", peer, reason);
            if let Some(text) = reason.notification() {
                self.send(peer, PaintShopServerMessage::Notification { text: text.to_string() });
            }
            return;
        }

        self.sessions.enter(peer);
        if let Ok(shop) = self.shops.get(shop) {
            info!("{:?} entered paint shop {}", peer, shop.uid);
        }

        self.send(
            peer,
            PaintShopServerMessage::PlaySound {
                name: ENTER_SOUND.to_string(),
                volume: ENTER_SOUND_VOLUME,
            },
        );
        self.send(
            peer,
            PaintShopServerMessage::TemporaryInteraction {
                event: Some(PAINT_SHOP_OPEN_EVENT.to_string()),
            },
        );
    }

    pub fn leave(&mut self, shop: Entity, actor: Entity) {
        let Ok((_, player, _, _)) = self.players.get(actor) else {
            return;
        };
        let peer = player.client_id;

        // The client drops its menu on leave, so an open preview goes too
        if let Some(session) = self.sessions.leave(peer) {
            info!("{:?} left paint shop", peer);
            if let Some(vehicle) = session.preview {
                self.restore(vehicle);
            }
        }

        if let Ok(shop) = self.shops.get(shop) {
            let uid = marker_uid(&shop.uid);
            self.send(peer, PaintShopServerMessage::RemoveInteractionText { uid });
        }
        self.send(peer, PaintShopServerMessage::TemporaryInteraction { event: None });
    }

    pub fn open(&mut self, peer: PeerId) {
        let Some(vehicle) = self.authorize(peer, "open", check_open) else {
            return;
        };
        let Ok((_, _, Some(record), _)) = self.vehicles.get(vehicle) else {
            return;
        };

        let sync = sync_payload(&record);
        self.send(peer, PaintShopServerMessage::Sync(sync));
    }

    pub fn preview(&mut self, peer: PeerId, preview: &PreviewPaint) {
        let Some(vehicle) = self.authorize(peer, "preview", check_preview) else {
            return;
        };
        if let Ok((_, _, _, mut live)) = self.vehicles.get_mut(vehicle) {
            apply_preview(&mut live, preview);
            self.sessions.mark_preview(peer, vehicle);
        }
    }

    pub fn purchase(&mut self, peer: PeerId, purchase: &PurchasePaint) {
        let Some(vehicle) = self.authorize(peer, "purchase", check_purchase) else {
            return;
        };
        let Ok((_, _, Some(mut record), mut live)) = self.vehicles.get_mut(vehicle) else {
            return;
        };

        if !commit_purchase(&mut record, purchase) {
            debug!("Empty paint purchase from {:?}", peer);
            return;
        }
        restore_persisted_paint(&record, &mut live);

        match self.store.save(&record) {
            Ok(()) => info!("{:?} bought paint for vehicle {}", peer, record.id),
            Err(e) => error!("Failed to save paint for vehicle {}: {}", record.id, e),
        }
    }

    pub fn close(&mut self, peer: PeerId) {
        let seated = self
            .player_for(peer)
            .and_then(|player| self.seated_vehicle(player));
        let Some(vehicle) = self.sessions.previewed(peer).or(seated) else {
            return;
        };

        self.restore(vehicle);
        self.sessions.leave(peer);
    }
}

pub fn on_zone_entered(enter: On<ZoneEntered>, mut shop: PaintShopWorld) {
    shop.enter(enter.entity, enter.actor);
}

pub fn on_zone_left(leave: On<ZoneLeft>, mut shop: PaintShopWorld) {
    shop.leave(leave.entity, leave.actor);
}

/// Drain client requests in arrival order
pub fn handle_paint_shop_requests(
    mut requests: MessageReader<PaintShopRequest>,
    mut shop: PaintShopWorld,
) {
    for request in requests.read() {
        match &request.message {
            PaintShopClientMessage::Open => shop.open(request.peer),
            PaintShopClientMessage::Preview(preview) => shop.preview(request.peer, preview),
            PaintShopClientMessage::Purchase(purchase) => shop.purchase(request.peer, purchase),
            PaintShopClientMessage::Close => shop.close(request.peer),
        }
    }
}

/// Vehicles spawn with factory paint; put the purchased paint on them.
pub fn restore_paint_on_spawn(
    mut vehicles: Query<(&VehicleRecord, &mut LivePaint), Added<VehicleRecord>>,
) {
    for (record, mut live) in vehicles.iter_mut() {
        restore_persisted_paint(record, &mut live);
    }
}

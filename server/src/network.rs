//! Lightyear bridge for the paint shop
//!
//! Client link messages become `PaintShopRequest`s; `PaintShopNotice`s go out on the
//! matching link. Shop and vehicle entities get replicated once the server runs.

use bevy::prelude::*;
use lightyear::prelude::*;
use lightyear::prelude::server::*;
use paint_shop_shared::{
    PaintShop, PaintShopClientMessage, PaintShopServerMessage, ReliableChannel, Vehicle,
};

use crate::paint_shop::{PaintShopNotice, PaintShopRequest, PaintShopSet};

pub struct PaintShopNetworkPlugin;

impl Plugin for PaintShopNetworkPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (
                receive_paint_shop_messages.in_set(PaintShopSet::Receive),
                send_paint_shop_messages.in_set(PaintShopSet::Send),
            ),
        );
    }
}

/// Read every client link's paint shop traffic, in arrival order
pub fn receive_paint_shop_messages(
    mut client_links: Query<
        (&RemoteId, &mut MessageReceiver<PaintShopClientMessage>),
        With<ClientOf>,
    >,
    mut requests: MessageWriter<PaintShopRequest>,
) {
    for (remote_id, mut receiver) in client_links.iter_mut() {
        for message in receiver.receive() {
            requests.write(PaintShopRequest {
                peer: remote_id.0,
                message,
            });
        }
    }
}

pub fn send_paint_shop_messages(
    mut notices: MessageReader<PaintShopNotice>,
    mut client_links: Query<
        (&RemoteId, &mut MessageSender<PaintShopServerMessage>),
        With<ClientOf>,
    >,
) {
    for notice in notices.read() {
        let link = client_links
            .iter_mut()
            .find(|(remote_id, _)| remote_id.0 == notice.peer);
        let Some((_, mut sender)) = link else {
            debug!("Dropping paint shop message for {:?}: no link", notice.peer);
            continue;
        };
        sender.send::<ReliableChannel>(notice.message.clone());
    }
}

/// Start replicating shops and vehicles to every client
pub fn replicate_world_entities(
    mut commands: Commands,
    new_entities: Query<Entity, Or<(Added<PaintShop>, Added<Vehicle>)>>,
) {
    for entity in new_entities.iter() {
        commands
            .entity(entity)
            .insert(Replicate::new(ReplicationMode::SingleServer(NetworkTarget::All)));
    }
}

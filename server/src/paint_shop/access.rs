//! Authorization checks for paint shop actions.
//!
//! Pure functions over a snapshot of the requesting player. Callers decide what a
//! denial means: zone entry turns usability failures into a notification, every
//! other path stays silent.

use paint_shop_shared::locale;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    Denied(DenyReason),
}

impl Access {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Access::Allowed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NoVehicle,
    TemporaryVehicle,
    NotDriver,
    /// Vehicle has no persisted record
    NoRecord,
    NotOwner,
    NotInShop,
}

impl DenyReason {
    /// Player-facing text for usability failures. Authorization failures have none.
    pub fn notification(self) -> Option<&'static str> {
        match self {
            DenyReason::NoVehicle => Some(locale::MUST_BE_IN_A_VEHICLE),
            DenyReason::TemporaryVehicle => Some(locale::CANNOT_BE_MODIFIED),
            DenyReason::NotDriver
            | DenyReason::NoRecord
            | DenyReason::NotOwner
            | DenyReason::NotInShop => None,
        }
    }
}

/// The vehicle the player is seated in
#[derive(Debug, Clone, Copy)]
pub struct SeatedVehicle<'a> {
    pub driver_id: Option<u64>,
    pub temporary: bool,
    /// Owner from the persisted record; `None` when there is no record
    pub owner: Option<&'a str>,
}

#[derive(Debug, Clone, Copy)]
pub struct ShopActor<'a> {
    pub driver_id: u64,
    pub character_id: &'a str,
    pub in_shop: bool,
    pub vehicle: Option<SeatedVehicle<'a>>,
}

impl ShopActor<'_> {
    fn is_driver(&self, vehicle: &SeatedVehicle) -> bool {
        vehicle.driver_id == Some(self.driver_id)
    }

    fn owns(&self, vehicle: &SeatedVehicle) -> Result<(), DenyReason> {
        match vehicle.owner {
            None => Err(DenyReason::NoRecord),
            Some(owner) if owner == self.character_id => Ok(()),
            Some(_) => Err(DenyReason::NotOwner),
        }
    }
}

impl From<Result<(), DenyReason>> for Access {
    fn from(result: Result<(), DenyReason>) -> Self {
        match result {
            Ok(()) => Access::Allowed,
            Err(reason) => Access::Denied(reason),
        }
    }
}

/// Entering a shop zone: vehicle, permanent, driving.
pub fn check_zone_entry(actor: &ShopActor) -> Access {
    zone_entry(actor).into()
}

/// Opening the shop UI: driving a persisted, permanent vehicle they own, inside a shop.
pub fn check_open(actor: &ShopActor) -> Access {
    open(actor).into()
}

/// Previewing: inside a shop and seated in a vehicle.
pub fn check_preview(actor: &ShopActor) -> Access {
    if !actor.in_shop {
        return Access::Denied(DenyReason::NotInShop);
    }
    if actor.vehicle.is_none() {
        return Access::Denied(DenyReason::NoVehicle);
    }
    Access::Allowed
}

/// Purchasing: driving, inside a shop, and owner (checked again here, independent of Open).
pub fn check_purchase(actor: &ShopActor) -> Access {
    purchase(actor).into()
}

fn zone_entry(actor: &ShopActor) -> Result<(), DenyReason> {
    let vehicle = actor.vehicle.ok_or(DenyReason::NoVehicle)?;
    if vehicle.temporary {
        return Err(DenyReason::TemporaryVehicle);
    }
    if !actor.is_driver(&vehicle) {
        return Err(DenyReason::NotDriver);
    }
    Ok(())
}

fn open(actor: &ShopActor) -> Result<(), DenyReason> {
    let vehicle = actor.vehicle.ok_or(DenyReason::NoVehicle)?;
    if !actor.is_driver(&vehicle) {
        return Err(DenyReason::NotDriver);
    }
    if vehicle.owner.is_none() {
        return Err(DenyReason::NoRecord);
    }
    if vehicle.temporary {
        return Err(DenyReason::TemporaryVehicle);
    }
    actor.owns(&vehicle)?;
    if !actor.in_shop {
        return Err(DenyReason::NotInShop);
    }
    Ok(())
}

fn purchase(actor: &ShopActor) -> Result<(), DenyReason> {
    let vehicle = actor.vehicle.ok_or(DenyReason::NoVehicle)?;
    if !actor.is_driver(&vehicle) {
        return Err(DenyReason::NotDriver);
    }
    if !actor.in_shop {
        return Err(DenyReason::NotInShop);
    }
    actor.owns(&vehicle)
}

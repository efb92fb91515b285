//! Room creation.

use rand::Rng;
use skirmish_core::{MAX_GENERATED_ROOM, RoomId};

/// Picks a fresh numeric room id in `1..=100000`.
pub fn generate_room_id() -> RoomId {
    let number = rand::rng().random_range(1..=MAX_GENERATED_ROOM);
    RoomId::from_number(number)
}

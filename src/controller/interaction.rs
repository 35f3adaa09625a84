//! Which single state change an interact press causes.
//!
//! Planning is pure: it looks at what the player carries and where they
//! stand and names one [`Interaction`]. The session then applies it, which
//! can still fail quietly if the target bowl pool is exhausted.

use glam::Vec3;

use crate::config::StationLayout;
use crate::model::{BowlContents, CookerState, RiceCooker, COOKER_COUNT, POOL_CAPACITY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// Empty-handed at the bowl stack.
    TakeBowl,
    /// Empty bowl at the rice box.
    ScoopRice,
    /// Uncooked rice into an idle cooker; hands back an empty bowl.
    LoadCooker(usize),
    /// Empty bowl at a cooker with finished rice.
    CollectCooked(usize),
    /// Empty bowl at a cooker that burned its rice.
    CollectBurnt(usize),
    /// Cooked rice over the counter.
    Deliver,
    /// Any filled bowl into the trash; keeps the bowl.
    Discard,
}

/// Location facts for the current frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Surroundings {
    pub at_bowl_stack: bool,
    pub at_rice_box: bool,
    pub at_delivery: bool,
    pub at_trash: bool,
    /// First cooker in reach, with its state.
    pub cooker: Option<(usize, CookerState)>,
    pub bowls_out: usize,
}

impl Surroundings {
    pub fn survey(
        stations: &StationLayout,
        position: Vec3,
        cookers: &[RiceCooker; COOKER_COUNT],
        bowls_out: usize,
    ) -> Self {
        let cooker = stations
            .rice_cookers
            .iter()
            .position(|s| s.contains(position))
            .map(|i| (i, cookers[i].state()));
        Self {
            at_bowl_stack: stations.bowl_stack.contains(position),
            at_rice_box: stations.rice_box.contains(position),
            at_delivery: stations.delivery.contains(position),
            at_trash: stations.trash.contains(position),
            cooker,
            bowls_out,
        }
    }
}

/// First matching rule wins; a match never falls through to a later rule
/// even if applying it turns out to be impossible.
pub fn plan(held: Option<BowlContents>, here: &Surroundings) -> Option<Interaction> {
    use BowlContents::*;

    match (held, here.cooker) {
        (None, _) if here.at_bowl_stack && here.bowls_out < POOL_CAPACITY => Some(Interaction::TakeBowl),
        (Some(Empty), _) if here.at_rice_box => Some(Interaction::ScoopRice),
        (Some(UncookedRice), Some((i, CookerState::Idle))) => Some(Interaction::LoadCooker(i)),
        (Some(Empty), Some((i, CookerState::Ready))) => Some(Interaction::CollectCooked(i)),
        (Some(Empty), Some((i, CookerState::Burnt))) => Some(Interaction::CollectBurnt(i)),
        (Some(CookedRice), _) if here.at_delivery => Some(Interaction::Deliver),
        (Some(UncookedRice | CookedRice | BurntRice), _) if here.at_trash => Some(Interaction::Discard),
        _ => None,
    }
}

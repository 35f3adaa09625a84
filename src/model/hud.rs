use glam::Vec3;

use crate::config::StationLayout;
use crate::model::tickets::{OrderKind, Ticket};

/// Orders with fewer whole seconds left than this are shown as urgent.
pub const URGENT_SECONDS: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    Deliver,
    PickUpBowl,
    PickUpRice,
    UseCooker,
    ThrowOut,
}

impl Prompt {
    pub fn text(self) -> &'static str {
        match self {
            Prompt::Deliver => "Press spacebar to deliver food",
            Prompt::PickUpBowl => "Press spacebar to pick up bowl",
            Prompt::PickUpRice => "Press spacebar to pick up rice",
            Prompt::UseCooker => "Press spacebar to use rice cooker",
            Prompt::ThrowOut => "Press spacebar to throw out food",
        }
    }

    /// Hint for whichever station the player stands at. Only location
    /// matters, not what is being carried.
    pub fn at(stations: &StationLayout, position: Vec3) -> Option<Prompt> {
        if stations.delivery.contains(position) {
            Some(Prompt::Deliver)
        } else if stations.bowl_stack.contains(position) {
            Some(Prompt::PickUpBowl)
        } else if stations.rice_box.contains(position) {
            Some(Prompt::PickUpRice)
        } else if stations.rice_cookers.iter().any(|c| c.contains(position)) {
            Some(Prompt::UseCooker)
        } else if stations.trash.contains(position) {
            Some(Prompt::ThrowOut)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub slot: usize,
    pub kind: OrderKind,
    /// Remaining time truncated toward zero.
    pub seconds_left: i32,
}

impl OrderLine {
    pub fn urgent(&self) -> bool {
        self.seconds_left < URGENT_SECONDS
    }

    pub fn text(&self) -> String {
        format!("Order: {}. Time: {}", self.kind.label(), self.seconds_left)
    }
}

/// Everything the overlay shows for one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hud {
    pub prompt: Option<Prompt>,
    pub orders: Vec<OrderLine>,
    pub score: i32,
}

impl Hud {
    pub fn build(stations: &StationLayout, player: Vec3, tickets: &[Ticket], score: f32) -> Self {
        let orders = tickets
            .iter()
            .enumerate()
            .filter_map(|(slot, t)| {
                t.kind.map(|kind| OrderLine {
                    slot,
                    kind,
                    seconds_left: t.remaining() as i32,
                })
            })
            .collect();
        Self {
            prompt: Prompt::at(stations, player),
            orders,
            score: score as i32,
        }
    }

    pub fn score_text(&self) -> String {
        format!("Score: {}", self.score)
    }
}

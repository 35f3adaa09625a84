use rand::Rng;

use crate::config::TicketTuning;

/// Orders that can be on the rail at once.
pub const TICKET_SLOTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderKind {
    Rice,
}

impl OrderKind {
    pub fn label(self) -> &'static str {
        match self {
            OrderKind::Rice => "Plain rice",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Ticket {
    /// `None` while the slot is free.
    pub kind: Option<OrderKind>,
    pub timer: f32,
    pub duration: f32,
}

impl Ticket {
    pub fn remaining(&self) -> f32 {
        self.duration - self.timer
    }
}

/// `min + U[0,1) * range`.
fn roll<R: Rng>(rng: &mut R, min: f32, range: f32) -> f32 {
    min + rng.gen::<f32>() * range
}

/// The order rail plus the running score.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketBoard {
    slots: [Ticket; TICKET_SLOTS],
    /// Next slot to fill. `TICKET_SLOTS` means stalled until a slot frees up.
    cursor: usize,
    spawn_timer: f32,
    spawn_interval: f32,
    score: f32,
}

impl TicketBoard {
    pub fn new<R: Rng>(tuning: &TicketTuning, rng: &mut R) -> Self {
        Self {
            slots: [Ticket::default(); TICKET_SLOTS],
            cursor: 0,
            spawn_timer: 0.0,
            spawn_interval: roll(rng, tuning.spawn_min, tuning.spawn_range),
            score: 0.0,
        }
    }

    pub fn slots(&self) -> &[Ticket; TICKET_SLOTS] {
        &self.slots
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn spawn_interval(&self) -> f32 {
        self.spawn_interval
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|t| t.kind.is_some()).count()
    }

    fn first_free(&self) -> Option<usize> {
        self.slots.iter().position(|t| t.kind.is_none())
    }

    /// Accumulate spawn time; when the interval elapses try to post a new
    /// order. Returns the slot that was filled.
    pub fn tick_spawn<R: Rng>(&mut self, elapsed: f32, tuning: &TicketTuning, rng: &mut R) -> Option<usize> {
        self.spawn_timer += elapsed;
        if self.spawn_timer <= self.spawn_interval {
            return None;
        }
        self.spawn_timer = 0.0;
        self.spawn(tuning, rng)
    }

    /// Post an order at the cursor and advance it. Past the last slot the
    /// cursor wraps to the first free slot and a new interval is rolled; with
    /// no free slot it parks until one opens. Resuming from the parked
    /// position is a wrap too.
    pub fn spawn<R: Rng>(&mut self, tuning: &TicketTuning, rng: &mut R) -> Option<usize> {
        if self.cursor >= TICKET_SLOTS {
            self.cursor = self.first_free()?;
            self.spawn_interval = roll(rng, tuning.spawn_min, tuning.spawn_range);
        }
        let slot = self.cursor;
        self.slots[slot] = Ticket {
            kind: Some(OrderKind::Rice),
            timer: 0.0,
            duration: roll(rng, tuning.duration_min, tuning.duration_range),
        };

        self.cursor = (slot + 1..TICKET_SLOTS)
            .find(|&i| self.slots[i].kind.is_none())
            .unwrap_or(TICKET_SLOTS);
        if self.cursor == TICKET_SLOTS {
            if let Some(free) = self.first_free() {
                self.cursor = free;
                self.spawn_interval = roll(rng, tuning.spawn_min, tuning.spawn_range);
            }
        }
        Some(slot)
    }

    /// Run every active order's clock. Overdue orders cost a quarter of their
    /// duration (by default) and are immediately re-posted with a fresh
    /// duration. Returns the penalised slots.
    pub fn tick_expiry<R: Rng>(&mut self, elapsed: f32, tuning: &TicketTuning, rng: &mut R) -> Vec<usize> {
        let mut expired = Vec::new();
        for (i, ticket) in self.slots.iter_mut().enumerate() {
            if ticket.kind.is_none() {
                continue;
            }
            ticket.timer += elapsed;
            if ticket.timer > ticket.duration {
                self.score = (self.score - ticket.duration / tuning.expiry_penalty_divisor).max(0.0);
                ticket.timer = 0.0;
                ticket.duration = roll(rng, tuning.duration_min, tuning.duration_range);
                expired.push(i);
            }
        }
        expired
    }

    /// Fill the matching order closest to expiring. Returns the points
    /// awarded, or `None` when nobody ordered `kind`.
    pub fn complete(&mut self, kind: OrderKind, tuning: &TicketTuning) -> Option<f32> {
        let (slot, remaining) = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, t)| t.kind == Some(kind))
            .map(|(i, t)| (i, t.remaining()))
            .min_by(|a, b| a.1.total_cmp(&b.1))?;

        self.slots[slot].kind = None;
        let reward = remaining + tuning.completion_bonus;
        self.score += reward;
        Some(reward)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn setup() -> (TicketBoard, TicketTuning, StdRng) {
        let tuning = TicketTuning::default();
        let mut rng = StdRng::seed_from_u64(7);
        let board = TicketBoard::new(&tuning, &mut rng);
        (board, tuning, rng)
    }

    fn in_duration_range(t: &TicketTuning, d: f32) -> bool {
        d >= t.duration_min && d <= t.duration_min + t.duration_range
    }

    #[test]
    fn test_spawn_interval_rolled_in_range() {
        let (board, t, _) = setup();
        let i = board.spawn_interval();
        assert!(i >= t.spawn_min && i <= t.spawn_min + t.spawn_range, "interval {i}");
    }

    #[test]
    fn test_tick_spawn_waits_for_interval() {
        let (mut board, t, mut rng) = setup();
        let interval = board.spawn_interval();
        assert_eq!(board.tick_spawn(interval * 0.5, &t, &mut rng), None);
        assert_eq!(board.tick_spawn(interval * 0.6, &t, &mut rng), Some(0));
        assert_eq!(board.active_count(), 1);
        assert!(in_duration_range(&t, board.slots()[0].duration));
    }

    #[test]
    fn test_cursor_fills_in_order_then_parks() {
        let (mut board, t, mut rng) = setup();
        for expected in 0..TICKET_SLOTS {
            assert_eq!(board.spawn(&t, &mut rng), Some(expected));
        }
        assert_eq!(board.cursor(), TICKET_SLOTS, "full rail parks the cursor");
        assert_eq!(board.spawn(&t, &mut rng), None);

        let parked_interval = board.spawn_interval();
        assert_eq!(board.spawn(&t, &mut rng), None);
        assert_eq!(board.spawn_interval(), parked_interval, "a failed spawn rolls nothing");

        board.slots[2].kind = None;
        assert_eq!(board.spawn(&t, &mut rng), Some(2), "parked cursor resumes at the freed slot");
        assert_ne!(board.spawn_interval(), parked_interval, "resuming wraps and rerolls the interval");
        let i = board.spawn_interval();
        assert!(i >= t.spawn_min && i <= t.spawn_min + t.spawn_range, "interval {i}");
        assert_eq!(board.cursor(), TICKET_SLOTS, "rail is full again");
    }

    #[test]
    fn test_cursor_wraps_to_first_free_and_rerolls_interval() {
        let (mut board, t, mut rng) = setup();
        board.spawn(&t, &mut rng);
        board.spawn(&t, &mut rng);
        board.complete(OrderKind::Rice, &t);
        board.spawn(&t, &mut rng);
        let before = board.spawn_interval();
        // Filling the last slot wraps back to whichever slot was completed.
        assert_eq!(board.spawn(&t, &mut rng), Some(3));
        let free = board.slots().iter().position(|s| s.kind.is_none()).unwrap();
        assert_eq!(board.cursor(), free);
        assert_ne!(board.spawn_interval(), before, "interval is rerolled on wrap");
    }

    #[test]
    fn test_complete_picks_least_remaining() {
        let (mut board, t, _) = setup();
        board.slots[0] = Ticket { kind: Some(OrderKind::Rice), timer: 13.0, duration: 20.0 };
        board.slots[1] = Ticket { kind: Some(OrderKind::Rice), timer: 14.0, duration: 17.0 };

        assert_eq!(board.complete(OrderKind::Rice, &t), Some(4.0));
        assert_eq!(board.score(), 4.0);
        assert_eq!(board.slots()[1].kind, None, "the 3s ticket is cleared");
        assert_eq!(board.slots()[0].kind, Some(OrderKind::Rice), "the 7s ticket stays");
    }

    #[test]
    fn test_complete_without_order_is_noop() {
        let (mut board, t, _) = setup();
        let before = board.clone();
        assert_eq!(board.complete(OrderKind::Rice, &t), None);
        assert_eq!(board, before);
    }

    #[test]
    fn test_expiry_penalises_and_rearms() {
        let (mut board, t, mut rng) = setup();
        board.score = 3.0;
        board.slots[1] = Ticket { kind: Some(OrderKind::Rice), timer: 15.5, duration: 16.0 };

        let expired = board.tick_expiry(1.0, &t, &mut rng);
        assert_eq!(expired, vec![1]);
        assert_eq!(board.score(), 0.0, "16/4 = 4 points taken, floored at zero");

        let ticket = board.slots()[1];
        assert_eq!(ticket.kind, Some(OrderKind::Rice), "expired ticket stays on the rail");
        assert_eq!(ticket.timer, 0.0);
        assert!(in_duration_range(&t, ticket.duration));
    }

    #[test]
    fn test_score_never_negative() {
        let (mut board, t, mut rng) = setup();
        for _ in 0..TICKET_SLOTS {
            board.spawn(&t, &mut rng);
        }
        for step in 0..2_000 {
            board.tick_expiry(0.5, &t, &mut rng);
            if step % 97 == 0 {
                board.complete(OrderKind::Rice, &t);
                board.spawn(&t, &mut rng);
            }
            assert!(board.score() >= 0.0);
            for ticket in board.slots().iter().filter(|s| s.kind.is_some()) {
                assert!(in_duration_range(&t, ticket.duration));
            }
        }
    }
}

use crate::audio::PlayingSound;
use crate::config::CookerTuning;
use crate::model::bowls::BowlContents;

/// Number of rice cookers in the kitchen.
pub const COOKER_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CookerState {
    #[default]
    Idle,
    /// Loaded, rice not done yet.
    Cooking,
    Ready,
    Burnt,
}

impl CookerState {
    pub fn is_cooking(self) -> bool {
        matches!(self, CookerState::Cooking | CookerState::Ready)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RiceCooker {
    state: CookerState,
    timer: f32,
    boiling: Option<PlayingSound>,
}

impl RiceCooker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CookerState {
        self.state
    }

    pub fn timer(&self) -> f32 {
        self.timer
    }

    pub fn boiling(&self) -> Option<PlayingSound> {
        self.boiling
    }

    /// Start a batch. Only an idle cooker accepts rice.
    pub fn load(&mut self, boiling: PlayingSound) -> bool {
        if self.state != CookerState::Idle {
            return false;
        }
        self.state = CookerState::Cooking;
        self.timer = 0.0;
        self.boiling = Some(boiling);
        true
    }

    /// What an empty bowl would come back with, if anything.
    pub fn yield_contents(&self) -> Option<BowlContents> {
        match self.state {
            CookerState::Ready => Some(BowlContents::CookedRice),
            CookerState::Burnt => Some(BowlContents::BurntRice),
            CookerState::Idle | CookerState::Cooking => None,
        }
    }

    /// Scoop the pot out and return to idle. Hands back the boiling sound so
    /// the caller can stop it.
    pub fn empty(&mut self) -> Option<PlayingSound> {
        self.state = CookerState::Idle;
        self.boiling.take()
    }

    /// Advance the cooking timer. Returns the new state when a phase change
    /// happened this call.
    ///
    /// Burning is checked against the total time since loading whether or
    /// not the pot was ever seen as ready.
    pub fn advance(&mut self, elapsed: f32, timing: &CookerTuning) -> Option<CookerState> {
        if !self.state.is_cooking() {
            return None;
        }
        self.timer += elapsed;
        if self.state == CookerState::Cooking && self.timer > timing.min_duration {
            self.state = CookerState::Ready;
            Some(CookerState::Ready)
        } else if self.timer > timing.max_duration {
            self.state = CookerState::Burnt;
            self.timer = 0.0;
            Some(CookerState::Burnt)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing() -> CookerTuning {
        CookerTuning::default()
    }

    #[test]
    fn test_full_cooking_cycle() {
        let t = timing();
        let mut cooker = RiceCooker::new();
        assert!(cooker.load(PlayingSound::new(1)));
        assert_eq!(cooker.state(), CookerState::Cooking);
        assert_eq!(cooker.timer(), 0.0);

        assert_eq!(cooker.advance(t.min_duration + 0.01, &t), Some(CookerState::Ready));
        assert_eq!(cooker.yield_contents(), Some(BowlContents::CookedRice));

        // Cumulative time since loading passes max_duration.
        assert_eq!(cooker.advance(t.max_duration - t.min_duration, &t), Some(CookerState::Burnt));
        assert_eq!(cooker.timer(), 0.0, "timer resets on burning");
        assert_eq!(cooker.yield_contents(), Some(BowlContents::BurntRice));

        assert_eq!(cooker.empty(), Some(PlayingSound::new(1)));
        assert_eq!(cooker.state(), CookerState::Idle);
    }

    #[test]
    fn test_overdue_pot_burns_on_next_step() {
        let t = timing();
        let mut cooker = RiceCooker::new();
        cooker.load(PlayingSound::new(1));
        // One huge step lands on Ready first; the following step burns it.
        assert_eq!(cooker.advance(t.max_duration + 5.0, &t), Some(CookerState::Ready));
        assert_eq!(cooker.advance(0.0, &t), Some(CookerState::Burnt));
    }

    #[test]
    fn test_idle_and_burnt_timers_do_not_advance() {
        let t = timing();
        let mut idle = RiceCooker::new();
        assert_eq!(idle.advance(100.0, &t), None);
        assert_eq!(idle.timer(), 0.0);

        let mut burnt = RiceCooker::new();
        burnt.load(PlayingSound::new(2));
        burnt.advance(11.0, &t);
        burnt.advance(10.0, &t);
        assert_eq!(burnt.state(), CookerState::Burnt);
        assert_eq!(burnt.advance(50.0, &t), None);
        assert_eq!(burnt.timer(), 0.0);
    }

    #[test]
    fn test_load_rejected_unless_idle() {
        let mut cooker = RiceCooker::new();
        assert!(cooker.load(PlayingSound::new(1)));
        assert!(!cooker.load(PlayingSound::new(2)));
        assert_eq!(cooker.boiling(), Some(PlayingSound::new(1)));
    }

    #[test]
    fn test_timer_monotonic_while_cooking() {
        let t = timing();
        let mut cooker = RiceCooker::new();
        cooker.load(PlayingSound::new(1));
        let mut last = cooker.timer();
        for _ in 0..200 {
            let before_state = cooker.state();
            cooker.advance(0.15, &t);
            if cooker.state() == CookerState::Burnt && before_state != CookerState::Burnt {
                assert_eq!(cooker.timer(), 0.0);
                break;
            }
            assert!(cooker.timer() >= last);
            last = cooker.timer();
        }
        assert_eq!(cooker.state(), CookerState::Burnt);
    }
}

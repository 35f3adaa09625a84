/// Bowls that can be in play at once. Every pool has exactly this many props.
pub const POOL_CAPACITY: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BowlContents {
    Empty,
    UncookedRice,
    CookedRice,
    BurntRice,
}

impl BowlContents {
    pub const ALL: [BowlContents; 4] = [
        BowlContents::Empty,
        BowlContents::UncookedRice,
        BowlContents::CookedRice,
        BowlContents::BurntRice,
    ];

    pub const fn index(self) -> usize {
        match self {
            BowlContents::Empty => 0,
            BowlContents::UncookedRice => 1,
            BowlContents::CookedRice => 2,
            BowlContents::BurntRice => 3,
        }
    }

    /// Scene node name of this pool's `slot`-th prop: `EmptyBowl`,
    /// `EmptyBowl1`, `EmptyBowl2`, and so on.
    pub fn node_name(self, slot: usize) -> String {
        let base = match self {
            BowlContents::Empty => "EmptyBowl",
            BowlContents::UncookedRice => "BowlUncookedRice",
            BowlContents::CookedRice => "BowlCookedRice",
            BowlContents::BurntRice => "BowlBurntRice",
        };
        if slot == 0 {
            base.to_string()
        } else {
            format!("{base}{slot}")
        }
    }
}

/// The bowl the player is carrying: what is in it and which prop shows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeldBowl {
    pub contents: BowlContents,
    pub slot: usize,
}

/// Four views over the same physical bowls. Changing a bowl's contents
/// frees its slot in one pool and claims a slot in another.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BowlPools {
    in_use: [[bool; POOL_CAPACITY]; 4],
    /// Bowls taken from the stack and not yet served.
    out: usize,
}

impl BowlPools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bowls_out(&self) -> usize {
        self.out
    }

    pub fn is_in_use(&self, contents: BowlContents, slot: usize) -> bool {
        self.in_use[contents.index()][slot]
    }

    pub fn in_use_count(&self) -> usize {
        self.in_use.iter().flatten().filter(|used| **used).count()
    }

    pub fn first_free(&self, contents: BowlContents) -> Option<usize> {
        self.in_use[contents.index()].iter().position(|used| !used)
    }

    fn claim(&mut self, contents: BowlContents) -> Option<HeldBowl> {
        let slot = self.first_free(contents)?;
        self.in_use[contents.index()][slot] = true;
        Some(HeldBowl { contents, slot })
    }

    fn release(&mut self, bowl: HeldBowl) {
        self.in_use[bowl.contents.index()][bowl.slot] = false;
    }

    /// Pick a fresh empty bowl off the stack.
    pub fn take_from_stack(&mut self) -> Option<HeldBowl> {
        if self.out >= POOL_CAPACITY {
            return None;
        }
        let bowl = self.claim(BowlContents::Empty)?;
        self.out += 1;
        Some(bowl)
    }

    /// Swap `bowl` for a prop showing `contents`. On failure (target pool
    /// exhausted) nothing changes.
    pub fn refill(&mut self, bowl: HeldBowl, contents: BowlContents) -> Option<HeldBowl> {
        let next = self.claim(contents)?;
        self.release(bowl);
        Some(next)
    }

    /// Hand the bowl over the counter; it leaves circulation.
    pub fn serve(&mut self, bowl: HeldBowl) {
        self.release(bowl);
        self.out = self.out.saturating_sub(1);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

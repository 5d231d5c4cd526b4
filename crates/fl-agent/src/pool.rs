/// A consumable, regenerating scalar resource (mana, energy, …) or health.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ResourcePool {
    pub current: u32,
    pub max:     u32,
}

impl ResourcePool {
    #[inline]
    pub fn new(current: u32, max: u32) -> Self {
        Self { current: current.min(max), max }
    }

    /// Fill ratio in [0, 1].  An empty-capacity pool counts as full so it is
    /// never chosen as a donation recipient.
    pub fn ratio(self) -> f32 {
        if self.max == 0 {
            1.0
        } else {
            self.current as f32 / self.max as f32
        }
    }

    /// How much can be added before the pool is full.
    #[inline]
    pub fn deficit(self) -> u32 {
        self.max.saturating_sub(self.current)
    }

    #[inline]
    pub fn is_full(self) -> bool {
        self.current >= self.max
    }

    pub fn spend(&mut self, amount: u32) -> bool {
        if amount > self.current {
            return false;
        }
        self.current -= amount;
        true
    }

    /// Add `amount`, clamped to `max`.  Returns what was actually added.
    pub fn refill(&mut self, amount: u32) -> u32 {
        let added = amount.min(self.deficit());
        self.current += added;
        added
    }
}

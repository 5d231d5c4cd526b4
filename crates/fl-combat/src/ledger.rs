//! `Ledger` — reserve-then-commit accounting over one resource pool.
//!
//! Reservations are all-or-nothing: a request either fits entirely in what
//! is still available or reserves nothing.  Reserved resource becomes spent
//! only on [`commit`](Ledger::commit), after the action that uses it
//! succeeded; [`rollback`](Ledger::rollback) releases it otherwise.
//!
//! ```text
//! available = pool - spent - reserved     (never negative)
//! ```

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Ledger {
    pool:     u32,
    reserved: u32,
    spent:    u32,
}

impl Ledger {
    pub fn new(pool: u32) -> Self {
        Self { pool, reserved: 0, spent: 0 }
    }

    #[inline]
    pub fn available(&self) -> u32 {
        self.pool - self.spent - self.reserved
    }

    #[inline]
    pub fn reserved(&self) -> u32 {
        self.reserved
    }

    #[inline]
    pub fn spent(&self) -> u32 {
        self.spent
    }

    /// Reserve `amount` if it fits entirely.  Returns `false` (and reserves
    /// nothing) otherwise.
    pub fn reserve(&mut self, amount: u32) -> bool {
        if amount > self.available() {
            return false;
        }
        self.reserved += amount;
        true
    }

    /// Turn every reservation into spending.  Returns the amount committed.
    pub fn commit(&mut self) -> u32 {
        let amount = std::mem::take(&mut self.reserved);
        self.spent += amount;
        amount
    }

    /// Release every reservation.  Returns the amount released.
    pub fn rollback(&mut self) -> u32 {
        std::mem::take(&mut self.reserved)
    }
}

//! `fl-combat` — target ranking and resource budgeting for combat loops.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                     |
//! |----------------|--------------------------------------------------------------|
//! | [`context`]    | `CombatContext` — read-only snapshot for one decision        |
//! | [`prioritize`] | `TargetPrioritizer` — six-key total order over candidates    |
//! | [`allocate`]   | `BudgetAllocator`, `AllocatorConfig`, `Allocation`, `Pass`   |
//! | [`ledger`]     | `Ledger` — reserve / commit / rollback accounting            |
//! | [`strategy`]   | `CombatStrategy` — attack and donate loops                   |
//! | [`error`]      | `CombatError`, `CombatResult<T>`                             |
//!
//! # Design notes
//!
//! Every decision is split in two phases:
//!
//! 1. **Decide** (pure): capture a `CombatContext`, rank, allocate.  Nothing
//!    here awaits or touches another agent.
//! 2. **Act**: claim kills across friends, issue the action, then commit or
//!    roll back the ledger.
//!
//! The prioritizer and allocator are plain values, testable without a
//! runtime.

pub mod allocate;
pub mod context;
pub mod error;
pub mod ledger;
pub mod prioritize;
pub mod strategy;

#[cfg(test)]
mod tests;

pub use allocate::{Allocation, AllocatorConfig, BudgetAllocator, Pass, Pick};
pub use context::CombatContext;
pub use error::{CombatError, CombatResult};
pub use ledger::Ledger;
pub use prioritize::TargetPrioritizer;
pub use strategy::{CombatStrategy, CombatStrategyBuilder};

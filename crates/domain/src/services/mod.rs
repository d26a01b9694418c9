//! Pure domain services. No I/O here: every function takes the state it
//! needs and returns derived facts or a validated mutation plan.

pub mod ledger;
pub mod membership;
pub mod messaging;

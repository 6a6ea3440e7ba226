pub use cards::*;
pub use protocol::*;
pub use state::*;
pub use strategy::*;

#[cfg(test)]
mod arbitrary;
mod cards;
mod protocol;
mod state;
mod strategy;

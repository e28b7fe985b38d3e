//! Domain layer: purchase value objects and the ports the flow talks through.

pub mod merchant;
pub mod ports;
pub mod product;
pub mod purchase;
pub mod screen;
pub mod session;

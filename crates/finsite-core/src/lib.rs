pub mod card;
pub mod chart;
pub mod config;
pub mod model;
pub mod stats;

pub use crate::card::{CardState, PriceCard, PriceSource};
pub use crate::chart::{Chart, Viewport};
pub use crate::config::{resolve_base_url, Config};

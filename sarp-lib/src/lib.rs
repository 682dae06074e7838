#![doc = include_str!("../README.md")]

mod error;

pub mod beacon;
pub mod bits;
pub mod countries;
pub mod dialect;
pub mod frame;
pub mod manchester;
pub mod message;
pub mod pipeline;
pub mod symbols;
pub mod tables;

pub(crate) mod prelude {
    pub use crate::error::{Error, Result};
}

pub use beacon::BeaconMessage;
pub use dialect::Dialect;
pub use error::{Error, Result};
pub use frame::SarpFrame;
pub use message::SarpMessage;
pub use pipeline::{DecodeOpts, Pipeline, Stats};

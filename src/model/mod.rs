//! Typed model of the fields a DANFE prints.

mod fields;
mod item;

pub use fields::{
    AdditionalInfo, Address, DanfeFields, Identification, Party, Protocol, Totals, Transport,
};
pub use item::{IcmsDetail, IcmsRegime, LineItem};

//! Plain records, lookup tables and the capability ports the gateway client
//! is built on.

pub mod card;
pub mod catalog;
pub mod certificate;
pub mod customer;
pub mod fields;
pub mod payment;
pub mod ports;
pub mod signature;

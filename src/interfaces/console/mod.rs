//! Parsers for the console output of the cryptographic toolkit.

pub mod certificate_reader;
pub mod container_reader;
pub mod error_reader;

pub use certificate_reader::read_certificates;
pub use container_reader::read_containers;
pub use error_reader::read_error;

// flashforge-rs: status client for FlashForge printers plus a thin HTTP bridge

pub mod communication;
pub mod config;
pub mod error;
pub mod models;
pub mod parser;
pub mod printer;
pub mod protocol;
pub mod web;

pub use error::PrinterError;
pub use models::{PrinterInfo, PrinterProgress};
pub use printer::{Printer, PrinterClient};

//! Typed records produced by the status queries.
//!
//! Field names serialize in camelCase, which is the shape HTTP clients of the
//! bridge consume.

use serde::{Deserialize, Serialize};

/// Print head position in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Machine identity and head position, from `~M115`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterInfo {
    pub name: String,
    pub model: String,
    pub firmware_version: String,
    pub serial_number: String,
    pub mac_address: String,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByteProgress {
    pub completed_bytes: u64,
    pub total_bytes: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerProgress {
    pub current_layer: u64,
    pub total_layers: u64,
    pub percentage: f64,
}

/// Job progress, from `~M27 C`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrinterProgress {
    pub bytes: ByteProgress,
    pub layer: LayerProgress,
}

impl ByteProgress {
    pub fn new(completed_bytes: u64, total_bytes: u64) -> Self {
        Self {
            completed_bytes,
            total_bytes,
            percentage: percentage(completed_bytes, total_bytes),
        }
    }
}

impl LayerProgress {
    pub fn new(current_layer: u64, total_layers: u64) -> Self {
        Self {
            current_layer,
            total_layers,
            percentage: percentage(current_layer, total_layers),
        }
    }
}

/// `done / total` as a percentage rounded to two decimals; 0 when `total` is 0.
pub fn percentage(done: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    ((done as f64 / total as f64) * 10_000.0).round() / 100.0
}

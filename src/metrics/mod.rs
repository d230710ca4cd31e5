//! # Sistema de Métricas
//! src/metrics/mod.rs
//!
//! Este módulo implementa el registro de tiempos por producto y el resumen
//! final de la corrida:
//! - `store`: tabla compartida producto -> visitas por estación
//! - `report`: turnaround, tiempo de espera, promedios y orden de finalización

pub mod report;
pub mod store;

pub use report::{summarize, ItemSummary, SummaryReport};
pub use store::{ItemMetric, MetricsStore, StationVisit};

use serde::Serializer;
use std::time::Duration;

/// Serializa una duración como milisegundos enteros
pub fn as_millis<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}

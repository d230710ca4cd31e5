//! # Errores de la Línea
//! src/error.rs
//!
//! Define los errores que puede devolver la simulación. Todos representan
//! defectos de cableado o invariantes rotas: la simulación en sí no tiene
//! fallos recuperables (los tiempos de trabajo son esperas incondicionales).

use std::time::Duration;

/// Errores que pueden ocurrir durante una corrida
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Se registró una visita para un producto que nunca fue dado de alta
    UnregisteredItem { item_id: u32, station_id: u32 },

    /// El reporte calculó un tiempo de procesamiento mayor al turnaround
    NegativeWaiting {
        item_id: u32,
        turnaround: Duration,
        processing: Duration,
    },

    /// Visita con salida anterior a la entrada (reloj inconsistente)
    InvertedVisit {
        item_id: u32,
        station_id: u32,
        entry: Duration,
        exit: Duration,
    },

    /// El producto terminó antes de su llegada registrada
    CompletedBeforeArrival {
        item_id: u32,
        arrival: Duration,
        completion: Duration,
    },

    /// Producto sin ninguna visita: no tiene instante de finalización
    IncompleteItem { item_id: u32 },

    /// La estación siguiente cerró su entrada antes de recibir el producto
    Disconnected { station_id: u32, item_id: u32 },

    /// Un hilo (estación o generador) terminó con panic
    WorkerPanicked { worker: String },
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::UnregisteredItem { item_id, station_id } => write!(
                f,
                "Visit for unregistered item #{} at station {}",
                item_id, station_id
            ),
            PipelineError::NegativeWaiting {
                item_id,
                turnaround,
                processing,
            } => write!(
                f,
                "Negative waiting time for item #{} (turnaround {:?} < processing {:?})",
                item_id, turnaround, processing
            ),
            PipelineError::InvertedVisit {
                item_id,
                station_id,
                entry,
                exit,
            } => write!(
                f,
                "Visit for item #{} at station {} exits before entering ({:?} < {:?})",
                item_id, station_id, exit, entry
            ),
            PipelineError::CompletedBeforeArrival {
                item_id,
                arrival,
                completion,
            } => write!(
                f,
                "Item #{} completed before arriving (completion {:?} < arrival {:?})",
                item_id, completion, arrival
            ),
            PipelineError::IncompleteItem { item_id } => {
                write!(f, "Item #{} has no recorded visits", item_id)
            }
            PipelineError::Disconnected { station_id, item_id } => write!(
                f,
                "Station {} could not forward item #{}: downstream closed",
                station_id, item_id
            ),
            PipelineError::WorkerPanicked { worker } => write!(f, "Worker '{}' panicked", worker),
        }
    }
}

impl std::error::Error for PipelineError {}

//! # Eventos de Progreso
//! src/events.rs
//!
//! La simulación no imprime nada por sí misma: publica eventos estructurados
//! y quien la use decide cómo mostrarlos.

use crate::metrics::report::format_duration;
use serde::Serialize;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// El generador emitió el producto
    Generated,
    /// Comienza un turno de trabajo en una estación
    StationEntry,
    /// Termina un turno; `remaining` cero indica que la estación terminó el producto
    StationExit {
        #[serde(rename = "remaining_ms", serialize_with = "crate::metrics::as_millis")]
        remaining: Duration,
    },
    /// El producto salió de la última estación
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub item_id: u32,
    pub station_id: Option<u32>,
    /// Instante relativo al inicio de la corrida
    #[serde(rename = "at_ms", serialize_with = "crate::metrics::as_millis")]
    pub at: Duration,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl ProgressEvent {
    pub fn new(item_id: u32, station_id: Option<u32>, at: Duration, kind: EventKind) -> Self {
        Self {
            item_id,
            station_id,
            at,
            kind,
        }
    }

    /// Línea legible para logs
    pub fn describe(&self) -> String {
        let at = format_duration(self.at);
        let station = self.station_id.unwrap_or(0);
        match self.kind {
            EventKind::Generated => {
                format!("[{}] Producto #{} generado y en cola", at, self.item_id)
            }
            EventKind::StationEntry => format!(
                "[{}] Estación #{}: procesando producto #{}",
                at, station, self.item_id
            ),
            EventKind::StationExit { remaining } if remaining.is_zero() => format!(
                "[{}] Estación #{}: producto #{} terminado en la estación",
                at, station, self.item_id
            ),
            EventKind::StationExit { remaining } => format!(
                "[{}] Estación #{}: producto #{} interrumpido (restante {})",
                at,
                station,
                self.item_id,
                format_duration(remaining)
            ),
            EventKind::Completed => format!(
                "[{}] Producto #{} completó la línea de ensamblaje",
                at, self.item_id
            ),
        }
    }
}

/// Destino de los eventos de progreso. Se comparte entre todos los hilos.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

/// Publica cada evento con `log::info!`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: ProgressEvent) {
        log::info!("{}", event.describe());
    }
}

/// Guarda todos los eventos en memoria, en el orden en que llegaron
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ProgressEvent>> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.lock().clone()
    }

    /// Eventos de un producto en particular
    pub fn events_for(&self, item_id: u32) -> Vec<ProgressEvent> {
        self.lock()
            .iter()
            .filter(|e| e.item_id == item_id)
            .copied()
            .collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: ProgressEvent) {
        self.lock().push(event);
    }
}

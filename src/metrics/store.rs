//! # Almacén de Métricas
//! src/metrics/store.rs
//!
//! Tabla thread-safe producto -> visitas por estación. Es el único recurso
//! compartido entre el generador y todas las estaciones.

use crate::error::PipelineError;
use crate::product::Product;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Un turno de trabajo de una estación sobre un producto.
/// En Round Robin un producto acumula una visita por quantum consumido.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StationVisit {
    pub station_id: u32,
    #[serde(rename = "entry_ms", serialize_with = "crate::metrics::as_millis")]
    pub entry: Duration,
    #[serde(rename = "exit_ms", serialize_with = "crate::metrics::as_millis")]
    pub exit: Duration,
}

impl StationVisit {
    pub fn duration(&self) -> Duration {
        self.exit.saturating_sub(self.entry)
    }
}

/// Métricas de un producto: llegada y visitas en orden cronológico
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemMetric {
    pub item_id: u32,
    #[serde(rename = "arrival_ms", serialize_with = "crate::metrics::as_millis")]
    pub arrival_time: Duration,
    pub visits: Vec<StationVisit>,
}

impl ItemMetric {
    pub fn new(item_id: u32, arrival_time: Duration) -> Self {
        Self {
            item_id,
            arrival_time,
            visits: Vec::new(),
        }
    }

    /// Último instante de salida en cualquier estación
    pub fn last_exit(&self) -> Option<Duration> {
        self.visits.iter().map(|v| v.exit).max()
    }

    /// Suma de los tiempos efectivamente procesados
    pub fn processing_time(&self) -> Duration {
        self.visits.iter().map(StationVisit::duration).sum()
    }

    /// Visitas de una estación en particular
    pub fn visits_at(&self, station_id: u32) -> impl Iterator<Item = &StationVisit> {
        self.visits.iter().filter(move |v| v.station_id == station_id)
    }
}

/// Almacén de métricas compartido (clonar comparte la misma tabla)
#[derive(Clone, Default)]
pub struct MetricsStore {
    inner: Arc<Mutex<StoreData>>,
}

#[derive(Default)]
struct StoreData {
    items: HashMap<u32, ItemMetric>,

    /// Visitas descartadas por producto no registrado
    lost_writes: u64,
}

impl MetricsStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Ninguna sección crítica deja la tabla a medias
    fn lock(&self) -> MutexGuard<'_, StoreData> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Da de alta un producto con visitas vacías.
    ///
    /// Registrar dos veces el mismo id actualiza la llegada y conserva las
    /// visitas ya registradas.
    pub fn register(&self, product: &Product) {
        let mut data = self.lock();
        match data.items.get_mut(&product.id) {
            Some(existing) => {
                log::warn!(
                    "Producto #{} registrado dos veces; se actualiza su llegada",
                    product.id
                );
                existing.arrival_time = product.arrival_time;
            }
            None => {
                data.items
                    .insert(product.id, ItemMetric::new(product.id, product.arrival_time));
            }
        }
    }

    /// Agrega una visita al producto indicado.
    ///
    /// Si el producto no fue registrado la escritura se pierde (se cuenta en
    /// `lost_writes`) y se retorna `PipelineError::UnregisteredItem`. Una
    /// salida anterior a la entrada se rechaza con `InvertedVisit`.
    pub fn record_visit(
        &self,
        item_id: u32,
        station_id: u32,
        entry: Duration,
        exit: Duration,
    ) -> Result<(), PipelineError> {
        if exit < entry {
            log::error!(
                "Visita invertida: producto #{} en estación {} sale en {:?} antes de entrar en {:?}",
                item_id,
                station_id,
                exit,
                entry
            );
            return Err(PipelineError::InvertedVisit {
                item_id,
                station_id,
                entry,
                exit,
            });
        }

        let mut data = self.lock();

        match data.items.get_mut(&item_id) {
            Some(metric) => {
                metric.visits.push(StationVisit {
                    station_id,
                    entry,
                    exit,
                });
                Ok(())
            }
            None => {
                data.lost_writes += 1;
                log::error!(
                    "Visita perdida: producto #{} no registrado (estación {})",
                    item_id,
                    station_id
                );
                Err(PipelineError::UnregisteredItem { item_id, station_id })
            }
        }
    }

    /// Copia consistente de toda la tabla, ordenada por id
    pub fn snapshot(&self) -> Vec<ItemMetric> {
        let data = self.lock();
        let mut items: Vec<ItemMetric> = data.items.values().cloned().collect();
        items.sort_by_key(|m| m.item_id);
        items
    }

    /// Vacía la tabla (inicio de una nueva corrida)
    pub fn reset(&self) {
        let mut data = self.lock();
        data.items.clear();
        data.lost_writes = 0;
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn lost_writes(&self) -> u64 {
        self.lock().lost_writes
    }
}

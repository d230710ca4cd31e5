//! # Generador de Productos
//! src/generator.rs
//!
//! Emite exactamente N productos con ids 1..=N separados por esperas
//! aleatorias. Cada producto se registra en el almacén de métricas antes de
//! que la primera estación pueda verlo.

use crate::error::PipelineError;
use crate::events::{EventKind, EventSink, ProgressEvent};
use crate::metrics::MetricsStore;
use crate::product::{since, Product};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Secuencia finita y no reiniciable de productos
pub struct ItemGenerator {
    count: u32,
    next_id: u32,
    /// Rango de espera entre llegadas, en milisegundos
    delay_ms: RangeInclusive<u64>,
    rng: StdRng,
    start: Instant,
    store: MetricsStore,
    sink: Arc<dyn EventSink>,
}

impl ItemGenerator {
    pub fn new(
        count: u32,
        delay_ms: RangeInclusive<u64>,
        seed: Option<u64>,
        start: Instant,
        store: MetricsStore,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let delay_ms = if delay_ms.start() <= delay_ms.end() {
            delay_ms
        } else {
            *delay_ms.end()..=*delay_ms.start()
        };

        Self {
            count,
            next_id: 1,
            delay_ms,
            rng,
            start,
            store,
            sink,
        }
    }

    /// Productos que aún faltan por emitir
    pub fn remaining(&self) -> u32 {
        self.count.saturating_sub(self.next_id - 1)
    }

    /// Emite todos los productos hacia la primera estación y cierra el canal
    /// al terminar (el `Sender` se consume).
    pub fn run(self, tx: mpsc::SyncSender<Product>) -> Result<u32, PipelineError> {
        let mut emitted = 0;

        for product in self {
            tx.send(product).map_err(|_| PipelineError::Disconnected {
                station_id: 0,
                item_id: product.id,
            })?;
            emitted += 1;
        }

        log::debug!("Generador: {} productos emitidos, cerrando entrada", emitted);
        Ok(emitted)
    }
}

impl Iterator for ItemGenerator {
    type Item = Product;

    fn next(&mut self) -> Option<Product> {
        if self.next_id > self.count {
            return None;
        }

        let delay = self.rng.gen_range(self.delay_ms.clone());
        thread::sleep(Duration::from_millis(delay));

        let product = Product::new(self.next_id, since(self.start));
        self.next_id += 1;

        // Registrar antes de hacerlo visible a la primera estación
        self.store.register(&product);
        self.sink.emit(ProgressEvent::new(
            product.id,
            None,
            product.arrival_time,
            EventKind::Generated,
        ));

        Some(product)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining() as usize;
        (remaining, Some(remaining))
    }
}

//! # Estaciones de Trabajo
//! src/station.rs
//!
//! Una estación recibe productos por un canal, los procesa con FCFS o
//! Round Robin y los entrega a la siguiente estación. La última estación no
//! tiene salida: ahí el producto completa la línea.
//!
//! El fin de la entrada se detecta cuando la estación anterior (o el
//! generador) suelta su `Sender`. Al terminar, la estación suelta el suyo y
//! así el cierre se propaga hacia abajo.

use crate::error::PipelineError;
use crate::events::{EventKind, EventSink, ProgressEvent};
use crate::metrics::MetricsStore;
use crate::product::{since, Product};
use crate::scheduler::{ReadyQueue, SchedulingAlgorithm};
use std::sync::mpsc::{self, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Resultado de una estación al cerrar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StationOutcome {
    pub station_id: u32,
    /// Productos que terminaron su trabajo en esta estación
    pub finished: u32,
    /// Turnos de trabajo ejecutados (una visita registrada por turno)
    pub slices: u32,
}

pub struct Station {
    id: u32,
    processing_time: Duration,
    algorithm: SchedulingAlgorithm,
    /// Productos que se espera terminar; 0 = sin verificación
    expected: u32,
    start: Instant,
    store: MetricsStore,
    sink: Arc<dyn EventSink>,
    /// Un solo producto (o un solo quantum) a la vez
    work_lock: Mutex<()>,
}

impl Station {
    pub fn new(
        id: u32,
        processing_time: Duration,
        algorithm: SchedulingAlgorithm,
        start: Instant,
        store: MetricsStore,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            id,
            processing_time,
            algorithm,
            expected: 0,
            start,
            store,
            sink,
            work_lock: Mutex::new(()),
        }
    }

    /// Cantidad de productos que la estación debería terminar
    pub fn with_expected(mut self, expected: u32) -> Self {
        self.expected = expected;
        self
    }

    /// Bucle principal de la estación. Termina cuando la entrada está cerrada
    /// y no queda trabajo pendiente; al retornar se suelta `output`.
    pub fn run(
        &self,
        input: mpsc::Receiver<Product>,
        output: Option<mpsc::SyncSender<Product>>,
    ) -> Result<StationOutcome, PipelineError> {
        log::debug!("Estación #{} iniciada ({})", self.id, self.algorithm);

        let outcome = match self.algorithm.quantum() {
            None => self.run_fcfs(&input, output.as_ref())?,
            Some(quantum) => self.run_round_robin(quantum, &input, output.as_ref())?,
        };

        if self.expected > 0 && outcome.finished != self.expected {
            log::warn!(
                "Estación #{} terminó {} productos, se esperaban {}",
                self.id,
                outcome.finished,
                self.expected
            );
        }
        log::debug!("Estación #{} finalizando", self.id);

        Ok(outcome)
    }

    /// FCFS: toma los productos en orden de llegada y procesa cada uno
    /// completo antes de tomar el siguiente.
    fn run_fcfs(
        &self,
        input: &mpsc::Receiver<Product>,
        output: Option<&mpsc::SyncSender<Product>>,
    ) -> Result<StationOutcome, PipelineError> {
        let mut outcome = self.outcome();

        // Bloquea mientras la entrada esté abierta y vacía
        for product in input.iter() {
            let exit = self.work(product.id, self.processing_time)?;
            outcome.slices += 1;
            self.emit_exit(product.id, exit, Duration::ZERO);

            self.forward(product, output, exit)?;
            outcome.finished += 1;
        }

        Ok(outcome)
    }

    /// Round Robin: cola de listos refrescada entre cada quantum
    fn run_round_robin(
        &self,
        quantum: Duration,
        input: &mpsc::Receiver<Product>,
        output: Option<&mpsc::SyncSender<Product>>,
    ) -> Result<StationOutcome, PipelineError> {
        let mut outcome = self.outcome();
        let mut ready = ReadyQueue::new(quantum);
        let mut open = true;

        loop {
            open = self.drain(input, &mut ready, open);

            if ready.is_empty() {
                if !open {
                    break;
                }
                // Nada que hacer: esperar la próxima llegada o el cierre
                match input.recv() {
                    Ok(product) => ready.add_product(product, self.processing_time),
                    Err(_) => open = false,
                }
                continue;
            }

            let Some((mut unit, slice)) = ready.next_slice() else {
                continue;
            };

            let exit = self.work(unit.product.id, slice)?;
            outcome.slices += 1;
            let done = unit.consume(slice);
            self.emit_exit(unit.product.id, exit, unit.remaining);

            if done {
                outcome.finished += 1;
                self.forward(unit.product, output, exit)?;
            } else {
                // Lo que llegó durante el turno queda delante del reencolado
                open = self.drain(input, &mut ready, open);
                log::debug!(
                    "Estación #{}: producto #{} reencolado detrás de {:?}",
                    self.id,
                    unit.product.id,
                    ready.order()
                );
                ready.requeue(unit);
            }
        }

        Ok(outcome)
    }

    /// Pasa a la cola de listos todo lo disponible sin bloquear.
    /// Retorna si la entrada sigue abierta.
    fn drain(&self, input: &mpsc::Receiver<Product>, ready: &mut ReadyQueue, open: bool) -> bool {
        if !open {
            return false;
        }

        loop {
            match input.try_recv() {
                Ok(product) => ready.add_product(product, self.processing_time),
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => {
                    log::debug!("Estación #{}: entrada cerrada", self.id);
                    return false;
                }
            }
        }
    }

    /// Un turno de trabajo: sección crítica de la estación durante `slice`.
    /// Registra la visita y retorna el instante de salida.
    fn work(&self, item_id: u32, slice: Duration) -> Result<Duration, PipelineError> {
        let (entry, exit) = {
            let _guard = self
                .work_lock
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());

            let entry = since(self.start);
            self.sink.emit(ProgressEvent::new(
                item_id,
                Some(self.id),
                entry,
                EventKind::StationEntry,
            ));
            thread::sleep(slice);
            (entry, since(self.start))
        };

        self.store.record_visit(item_id, self.id, entry, exit)?;
        Ok(exit)
    }

    fn emit_exit(&self, item_id: u32, at: Duration, remaining: Duration) {
        self.sink.emit(ProgressEvent::new(
            item_id,
            Some(self.id),
            at,
            EventKind::StationExit { remaining },
        ));
    }

    /// Entrega a la siguiente estación, o marca el producto como completado
    /// si esta es la última.
    fn forward(
        &self,
        product: Product,
        output: Option<&mpsc::SyncSender<Product>>,
        exit: Duration,
    ) -> Result<(), PipelineError> {
        match output {
            Some(tx) => tx.send(product).map_err(|_| PipelineError::Disconnected {
                station_id: self.id,
                item_id: product.id,
            }),
            None => {
                self.sink
                    .emit(ProgressEvent::new(product.id, None, exit, EventKind::Completed));
                Ok(())
            }
        }
    }

    fn outcome(&self) -> StationOutcome {
        StationOutcome {
            station_id: self.id,
            finished: 0,
            slices: 0,
        }
    }
}

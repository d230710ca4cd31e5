//! # Algoritmos de Planificación
//! src/scheduler.rs
//!
//! Define la disciplina que aplica cada estación y la cola de listos que usa
//! Round Robin para repartir el tiempo en quantums.

use crate::product::Product;
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SchedulingAlgorithm {
    /// First-Come First-Served: cada producto se procesa completo, en orden de llegada
    Fcfs,
    /// Round Robin preemptivo: como máximo `quantum` por turno
    RoundRobin {
        #[serde(rename = "quantum_ms", serialize_with = "crate::metrics::as_millis")]
        quantum: Duration,
    },
}

impl SchedulingAlgorithm {
    pub fn quantum(&self) -> Option<Duration> {
        match self {
            SchedulingAlgorithm::Fcfs => None,
            SchedulingAlgorithm::RoundRobin { quantum } => Some(*quantum),
        }
    }
}

impl fmt::Display for SchedulingAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulingAlgorithm::Fcfs => write!(f, "FCFS"),
            SchedulingAlgorithm::RoundRobin { quantum } => {
                write!(f, "Round Robin (quantum {} ms)", quantum.as_millis())
            }
        }
    }
}

/// Producto dentro de una estación Round Robin junto con su trabajo pendiente.
/// Solo la estación que lo tiene en cola puede modificar `remaining`.
#[derive(Debug, Clone)]
pub struct WorkUnit {
    pub product: Product,
    pub remaining: Duration,
}

impl WorkUnit {
    pub fn new(product: Product, processing_time: Duration) -> Self {
        WorkUnit {
            product,
            remaining: processing_time,
        }
    }

    /// Descuenta un turno ya procesado. Devuelve `true` si terminó en la estación.
    pub fn consume(&mut self, slice: Duration) -> bool {
        self.remaining = self.remaining.saturating_sub(slice);
        self.remaining.is_zero()
    }
}

/// Cola FIFO de listos de una estación Round Robin
pub struct ReadyQueue {
    quantum: Duration,
    queue: VecDeque<WorkUnit>,
}

impl ReadyQueue {
    /// Un quantum nulo nunca avanzaría el trabajo: se usa 1 ms como mínimo
    pub fn new(quantum: Duration) -> Self {
        ReadyQueue {
            quantum: quantum.max(Duration::from_millis(1)),
            queue: VecDeque::new(),
        }
    }

    /// Primera llegada del producto a esta estación: el trabajo restante
    /// arranca en el tiempo fijo de la estación
    pub fn add_product(&mut self, product: Product, processing_time: Duration) {
        self.queue.push_back(WorkUnit::new(product, processing_time));
    }

    /// Saca la cabeza de la cola. Retorna (unidad, tiempo_a_procesar)
    pub fn next_slice(&mut self) -> Option<(WorkUnit, Duration)> {
        let unit = self.queue.pop_front()?;
        let slice = unit.remaining.min(self.quantum);
        Some((unit, slice))
    }

    /// Devuelve al final de la cola un producto interrumpido
    pub fn requeue(&mut self, unit: WorkUnit) {
        if !unit.remaining.is_zero() {
            self.queue.push_back(unit);
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Ids en el orden actual de la cola (cabeza primero)
    pub fn order(&self) -> Vec<u32> {
        self.queue.iter().map(|unit| unit.product.id).collect()
    }
}

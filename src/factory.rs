//! # Orquestador de la Línea
//! src/factory.rs
//!
//! Arma la cadena de estaciones (la salida de la estación i es la entrada de
//! la i+1), lanza un hilo por estación y otro para el generador, espera a que
//! todos terminen y construye el resumen a partir del almacén de métricas.

use crate::config::Config;
use crate::error::PipelineError;
use crate::events::{EventSink, LogSink};
use crate::generator::ItemGenerator;
use crate::metrics::{summarize, ItemMetric, MetricsStore, SummaryReport};
use crate::product::Product;
use crate::station::{Station, StationOutcome};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

pub struct Factory {
    config: Config,
    store: MetricsStore,
    sink: Arc<dyn EventSink>,
    runs: u32,
}

/// Resultado completo de una corrida
#[derive(Debug, Clone)]
pub struct RunResult {
    pub summary: SummaryReport,
    pub stations: Vec<StationOutcome>,
    /// Copia del almacén al terminar (visitas crudas)
    pub metrics: Vec<ItemMetric>,
}

impl Factory {
    /// Crea la fábrica con eventos publicados en el log
    pub fn new(config: Config) -> Self {
        Self::with_sink(config, Arc::new(LogSink))
    }

    pub fn with_sink(config: Config, sink: Arc<dyn EventSink>) -> Self {
        Self {
            config: config.sanitized(),
            store: MetricsStore::new(),
            sink,
            runs: 0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Almacén compartido por todas las corridas de esta fábrica
    pub fn store(&self) -> &MetricsStore {
        &self.store
    }

    pub fn runs(&self) -> u32 {
        self.runs
    }

    /// Ejecuta una simulación completa. Limpia el almacén antes de empezar.
    pub fn run(&mut self) -> Result<RunResult, PipelineError> {
        self.store.reset();
        self.runs += 1;
        self.config.log_summary();

        let algorithm = self.config.algorithm();
        let capacity = self.config.channel_capacity();
        let start = Instant::now();

        let (tx_input, rx_input) = mpsc::sync_channel::<Product>(capacity);
        let mut input = rx_input;
        let durations = self.config.station_durations();
        let last = durations.len();
        let mut handles: Vec<(String, JoinHandle<Result<StationOutcome, PipelineError>>)> =
            Vec::with_capacity(last);

        for (index, processing_time) in durations.into_iter().enumerate() {
            let id = index as u32 + 1;

            // La última estación no tiene salida
            let (output, next_input) = if index + 1 < last {
                let (tx, rx) = mpsc::sync_channel::<Product>(capacity);
                (Some(tx), Some(rx))
            } else {
                (None, None)
            };

            let station = Station::new(
                id,
                processing_time,
                algorithm,
                start,
                self.store.clone(),
                Arc::clone(&self.sink),
            )
            .with_expected(self.config.items);

            let handle = thread::spawn(move || station.run(input, output));
            handles.push((format!("station-{}", id), handle));

            match next_input {
                Some(rx) => input = rx,
                None => break,
            }
        }

        let generator = ItemGenerator::new(
            self.config.items,
            self.config.inter_arrival(),
            self.config.seed,
            start,
            self.store.clone(),
            Arc::clone(&self.sink),
        );
        let generator_handle = thread::spawn(move || generator.run(tx_input));

        // Esperar a todos antes de leer el almacén
        let mut first_error = None;
        match generator_handle.join() {
            Ok(Ok(emitted)) => log::debug!("Generador terminó: {} productos", emitted),
            Ok(Err(e)) => first_error = Some(e),
            Err(_) => {
                first_error = Some(PipelineError::WorkerPanicked {
                    worker: "generator".to_string(),
                })
            }
        }

        let mut stations = Vec::with_capacity(handles.len());
        for (name, handle) in handles {
            match handle.join() {
                Ok(Ok(outcome)) => stations.push(outcome),
                Ok(Err(e)) => {
                    log::error!("{} falló: {}", name, e);
                    // El error de origen tiene prioridad sobre las desconexiones que provoca
                    let replace = match &first_error {
                        None => true,
                        Some(PipelineError::Disconnected { .. }) => {
                            !matches!(e, PipelineError::Disconnected { .. })
                        }
                        Some(_) => false,
                    };
                    if replace {
                        first_error = Some(e);
                    }
                }
                Err(_) => {
                    log::error!("{} terminó con panic", name);
                    first_error.get_or_insert(PipelineError::WorkerPanicked { worker: name });
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        log::info!(
            "Todos los productos han sido procesados correctamente [{}]",
            algorithm
        );

        let metrics = self.store.snapshot();
        let summary = summarize(algorithm, &metrics)?;

        Ok(RunResult {
            summary,
            stations,
            metrics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mode;
    use crate::events::{EventKind, RecordingSink};

    fn fast_config(items: u32, station_times: Vec<u64>) -> Config {
        Config {
            items,
            station_times,
            time_unit_ms: 5,
            min_delay: 0,
            max_delay: 1,
            seed: Some(42),
            ..Config::default()
        }
    }

    #[test]
    fn test_single_station_run() {
        let mut factory = Factory::with_sink(fast_config(3, vec![2]), Arc::new(RecordingSink::new()));
        let result = factory.run().unwrap();

        assert_eq!(result.summary.items.len(), 3);
        assert_eq!(result.stations.len(), 1);
        assert_eq!(result.stations[0].finished, 3);
        assert_eq!(factory.runs(), 1);
    }

    #[test]
    fn test_every_item_completes_once() {
        let sink = Arc::new(RecordingSink::new());
        let mut factory = Factory::with_sink(fast_config(5, vec![1, 2, 1]), sink.clone());
        factory.run().unwrap();

        for id in 1..=5 {
            let events = sink.events_for(id);
            assert_eq!(events.first().map(|e| e.kind), Some(EventKind::Generated));
            assert_eq!(events.last().map(|e| e.kind), Some(EventKind::Completed));
            assert_eq!(
                events.iter().filter(|e| e.kind == EventKind::Completed).count(),
                1
            );
        }
    }

    #[test]
    fn test_zero_items_run() {
        let mut factory = Factory::with_sink(fast_config(0, vec![1, 1]), Arc::new(RecordingSink::new()));
        let result = factory.run().unwrap();

        assert!(result.summary.items.is_empty());
        assert_eq!(result.summary.mean_waiting, std::time::Duration::ZERO);
        assert!(result.stations.iter().all(|s| s.finished == 0));
    }

    #[test]
    fn test_invalid_config_is_sanitized() {
        let mut config = fast_config(2, vec![]);
        config.mode = Mode::RoundRobin;
        config.quantum = 0;
        let factory = Factory::with_sink(config, Arc::new(RecordingSink::new()));

        assert_eq!(factory.config().station_times, vec![3, 4, 5]);
        assert_eq!(factory.config().quantum, 2);
    }
}

//! # Configuración de la Simulación
//! src/config.rs
//!
//! Parámetros de una corrida, con soporte para argumentos CLI y variables
//! de entorno. Los tiempos se expresan en "unidades" de `time_unit_ms`
//! milisegundos (por defecto 1 unidad = 1 segundo).
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./assembly_line --mode round-robin --quantum 2 \
//!   --items 10 --station-times 3,4,5
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! LINE_MODE=fcfs LINE_TIME_UNIT_MS=100 ./assembly_line
//! ```

use crate::scheduler::SchedulingAlgorithm;
use clap::{Parser, ValueEnum};
use std::ops::RangeInclusive;
use std::time::Duration;

pub const DEFAULT_QUANTUM: i64 = 2;
pub const DEFAULT_ITEMS: u32 = 10;
pub const DEFAULT_STATION_TIMES: [u64; 3] = [3, 4, 5];
pub const DEFAULT_TIME_UNIT_MS: u64 = 1000;
pub const DEFAULT_MIN_DELAY: u64 = 1;
pub const DEFAULT_MAX_DELAY: u64 = 3;

/// Disciplina aplicada por todas las estaciones de la corrida
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Fcfs,
    RoundRobin,
}

/// Configuración de una corrida
#[derive(Debug, Clone, Parser)]
#[command(name = "assembly_line")]
#[command(about = "Simulador de línea de producción con estaciones FCFS y Round Robin")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Algoritmo de planificación de las estaciones
    #[arg(long, value_enum, default_value = "fcfs", env = "LINE_MODE")]
    pub mode: Mode,

    /// Quantum de Round Robin en unidades de tiempo (inválido => 2)
    #[arg(short, long, default_value = "2", allow_negative_numbers = true, env = "LINE_QUANTUM")]
    pub quantum: i64,

    /// Cantidad de productos a generar
    #[arg(short = 'n', long, default_value = "10", env = "LINE_ITEMS")]
    pub items: u32,

    /// Tiempo fijo de cada estación, en orden (una entrada por estación)
    #[arg(long = "station-times", value_delimiter = ',', default_value = "3,4,5", env = "LINE_STATION_TIMES")]
    pub station_times: Vec<u64>,

    /// Milisegundos por unidad de tiempo
    #[arg(long = "time-unit-ms", default_value = "1000", env = "LINE_TIME_UNIT_MS")]
    pub time_unit_ms: u64,

    /// Espera mínima entre llegadas (unidades)
    #[arg(long = "min-delay", default_value = "1")]
    pub min_delay: u64,

    /// Espera máxima entre llegadas (unidades)
    #[arg(long = "max-delay", default_value = "3")]
    pub max_delay: u64,

    /// Semilla para los tiempos de llegada (aleatoria si se omite)
    #[arg(long, env = "LINE_SEED")]
    pub seed: Option<u64>,

    /// Cantidad de corridas consecutivas con la misma configuración
    #[arg(long, default_value = "1")]
    pub runs: u32,

    /// Imprime el resumen en JSON en lugar de texto
    #[arg(long)]
    pub json: bool,
}

impl Config {
    /// Parsea argumentos CLI y variables de entorno
    pub fn from_args() -> Self {
        Config::parse()
    }

    /// Valida la configuración sin modificarla
    pub fn validate(&self) -> Result<(), String> {
        if self.mode == Mode::RoundRobin && self.quantum <= 0 {
            return Err(format!("Quantum must be > 0 (got {})", self.quantum));
        }
        if self.station_times.is_empty() {
            return Err("At least one station is required".to_string());
        }
        if self.station_times.contains(&0) {
            return Err("Station times must be > 0".to_string());
        }
        if self.time_unit_ms == 0 {
            return Err("Time unit must be > 0".to_string());
        }
        if self.min_delay > self.max_delay {
            return Err(format!(
                "Min delay ({}) must be <= max delay ({})",
                self.min_delay, self.max_delay
            ));
        }
        if !self.fits_time_unit(self.time_unit_ms) {
            return Err(format!(
                "Time values overflow with a time unit of {} ms",
                self.time_unit_ms
            ));
        }
        if self.mode == Mode::RoundRobin && self.quantum_millis().is_none() {
            return Err(format!("Quantum overflows (got {})", self.quantum));
        }
        Ok(())
    }

    /// Reemplaza los valores inválidos por los valores por defecto
    /// documentados. Nunca falla; cada reemplazo queda en el log.
    pub fn sanitized(mut self) -> Self {
        if self.validate().is_ok() {
            return self;
        }
        if self.quantum <= 0 {
            if self.mode == Mode::RoundRobin {
                log::warn!(
                    "Quantum inválido ({}). Se usará el valor por defecto ({})",
                    self.quantum,
                    DEFAULT_QUANTUM
                );
            }
            self.quantum = DEFAULT_QUANTUM;
        }
        if self.station_times.is_empty() {
            log::warn!("Sin estaciones configuradas. Se usan {:?}", DEFAULT_STATION_TIMES);
            self.station_times = DEFAULT_STATION_TIMES.to_vec();
        }
        if self.station_times.contains(&0) {
            log::warn!("Estación con tiempo 0. Se usará 1 unidad");
            for time in self.station_times.iter_mut().filter(|t| **t == 0) {
                *time = 1;
            }
        }
        if self.time_unit_ms == 0 {
            log::warn!("Unidad de tiempo inválida. Se usan {} ms", DEFAULT_TIME_UNIT_MS);
            self.time_unit_ms = DEFAULT_TIME_UNIT_MS;
        }
        if self.min_delay > self.max_delay {
            log::warn!(
                "Rango de llegadas inválido ({}..={}). Se usa {}..={}",
                self.min_delay,
                self.max_delay,
                DEFAULT_MIN_DELAY,
                DEFAULT_MAX_DELAY
            );
            self.min_delay = DEFAULT_MIN_DELAY;
            self.max_delay = DEFAULT_MAX_DELAY;
        }
        if self.time_unit_ms != DEFAULT_TIME_UNIT_MS && !self.fits_time_unit(self.time_unit_ms) {
            log::warn!(
                "Los tiempos no caben en milisegundos con una unidad de {} ms. Se usan {} ms",
                self.time_unit_ms,
                DEFAULT_TIME_UNIT_MS
            );
            self.time_unit_ms = DEFAULT_TIME_UNIT_MS;
        }
        self.sanitize_overflows()
    }

    /// Con la unidad ya corregida, los valores que aún desbordan vuelven a
    /// su valor por defecto
    fn sanitize_overflows(mut self) -> Self {
        let unit = self.time_unit_ms;
        if self.quantum_millis().is_none() {
            log::warn!(
                "Quantum fuera de rango ({}). Se usará el valor por defecto ({})",
                self.quantum,
                DEFAULT_QUANTUM
            );
            self.quantum = DEFAULT_QUANTUM;
        }
        for (i, time) in self.station_times.iter_mut().enumerate() {
            if time.checked_mul(unit).is_none() {
                log::warn!(
                    "Estación #{}: tiempo fuera de rango ({}). Se usa {}",
                    i + 1,
                    time,
                    DEFAULT_STATION_TIMES[i % DEFAULT_STATION_TIMES.len()]
                );
                *time = DEFAULT_STATION_TIMES[i % DEFAULT_STATION_TIMES.len()];
            }
        }
        if self.max_delay.checked_mul(unit).is_none() {
            log::warn!(
                "Rango de llegadas fuera de rango. Se usa {}..={}",
                DEFAULT_MIN_DELAY,
                DEFAULT_MAX_DELAY
            );
            self.min_delay = DEFAULT_MIN_DELAY;
            self.max_delay = DEFAULT_MAX_DELAY;
        }
        self
    }

    /// Los tiempos de estación y de llegada caben en milisegundos `u64`
    /// con esta unidad
    fn fits_time_unit(&self, unit: u64) -> bool {
        self.station_times
            .iter()
            .chain([&self.max_delay])
            .all(|units| units.checked_mul(unit).is_some())
    }

    /// Quantum en milisegundos, o `None` si no es positivo o desborda
    fn quantum_millis(&self) -> Option<u64> {
        u64::try_from(self.quantum)
            .ok()
            .filter(|quantum| *quantum > 0)
            .and_then(|quantum| quantum.checked_mul(self.time_unit_ms))
    }

    fn millis(&self, units: u64) -> Duration {
        Duration::from_millis(units.saturating_mul(self.time_unit_ms))
    }

    /// Quantum como `Duration`. Un quantum no positivo o que desborda usa el
    /// valor por defecto (`sanitized()` lo deja en el log).
    pub fn quantum_duration(&self) -> Duration {
        match self.quantum_millis() {
            Some(millis) => Duration::from_millis(millis),
            None => self.millis(DEFAULT_QUANTUM as u64),
        }
    }

    pub fn algorithm(&self) -> SchedulingAlgorithm {
        match self.mode {
            Mode::Fcfs => SchedulingAlgorithm::Fcfs,
            Mode::RoundRobin => SchedulingAlgorithm::RoundRobin {
                quantum: self.quantum_duration(),
            },
        }
    }

    pub fn station_count(&self) -> usize {
        self.station_times.len()
    }

    /// Tiempo fijo de cada estación
    pub fn station_durations(&self) -> Vec<Duration> {
        self.station_times
            .iter()
            .map(|units| self.millis(*units))
            .collect()
    }

    /// Rango de espera entre llegadas en milisegundos
    pub fn inter_arrival(&self) -> RangeInclusive<u64> {
        self.min_delay.saturating_mul(self.time_unit_ms)
            ..=self.max_delay.saturating_mul(self.time_unit_ms)
    }

    /// Capacidad de cada canal entre estaciones: nunca se bloquea por capacidad
    pub fn channel_capacity(&self) -> usize {
        self.items.max(1) as usize
    }

    /// Resumen de la configuración para el log
    pub fn log_summary(&self) {
        log::info!("=== Simulación de línea de ensamblaje ({}) ===", self.algorithm());
        log::info!(
            "Productos: {} | Estaciones: {} | Unidad: {} ms",
            self.items,
            self.station_count(),
            self.time_unit_ms
        );
        for (i, units) in self.station_times.iter().enumerate() {
            log::info!("  Estación #{}: {} unidades", i + 1, units);
        }
    }
}

impl Default for Config {
    /// Configuración de referencia: 10 productos, estaciones 3/4/5, quantum 2
    fn default() -> Self {
        Self {
            mode: Mode::Fcfs,
            quantum: DEFAULT_QUANTUM,
            items: DEFAULT_ITEMS,
            station_times: DEFAULT_STATION_TIMES.to_vec(),
            time_unit_ms: DEFAULT_TIME_UNIT_MS,
            min_delay: DEFAULT_MIN_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            seed: None,
            runs: 1,
            json: false,
        }
    }
}

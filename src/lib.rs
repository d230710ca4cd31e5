//! # Assembly Line
//! src/lib.rs
//!
//! Simulador de una línea de producción: los productos pasan por una
//! secuencia fija de estaciones, cada una con planificación FCFS o Round
//! Robin, y se registran los tiempos de cada visita para calcular
//! turnaround y tiempo de espera.
//!
//! ## Arquitectura
//!
//! - `config`: parámetros de la corrida (CLI + variables de entorno)
//! - `product`: el producto que fluye por la línea
//! - `scheduler`: FCFS / Round Robin y la cola de listos
//! - `station`: una etapa de la línea, un hilo por estación
//! - `generator`: emisión de productos con llegadas aleatorias
//! - `factory`: arma la cadena, lanza los hilos y espera el final
//! - `metrics`: almacén de visitas y resumen final
//! - `events`: eventos de progreso para quien muestre la corrida
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use assembly_line::config::{Config, Mode};
//! use assembly_line::factory::Factory;
//!
//! let config = Config {
//!     mode: Mode::RoundRobin,
//!     quantum: 2,
//!     ..Config::default()
//! };
//! let mut factory = Factory::new(config);
//! let result = factory.run().expect("la corrida falló");
//! println!("{}", result.summary.render());
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod factory;
pub mod generator;
pub mod metrics;
pub mod product;
pub mod scheduler;
pub mod station;

pub use config::{Config, Mode};
pub use error::PipelineError;
pub use factory::{Factory, RunResult};
pub use metrics::{MetricsStore, SummaryReport};
pub use scheduler::SchedulingAlgorithm;

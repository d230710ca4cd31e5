//! # Productos
//! src/product.rs
//!
//! Un producto es un registro inmutable (id + llegada). El trabajo restante
//! en Round Robin no vive aquí: lo lleva la estación que tiene el producto
//! en su cola (ver `scheduler::WorkUnit`).

use serde::Serialize;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Product {
    /// Identificador único dentro de la corrida (1..=N, en orden de emisión)
    pub id: u32,
    /// Instante de llegada, relativo al inicio de la corrida
    #[serde(rename = "arrival_ms", serialize_with = "crate::metrics::as_millis")]
    pub arrival_time: Duration,
}

impl Product {
    pub fn new(id: u32, now: Duration) -> Self {
        Product {
            id,
            arrival_time: now,
        }
    }
}

/// Tiempo transcurrido desde `start`. Todas las marcas de la corrida se
/// expresan así para que sean comparables entre hilos.
pub fn since(start: Instant) -> Duration {
    start.elapsed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_product() {
        let p = Product::new(3, Duration::from_millis(1500));
        assert_eq!(p.id, 3);
        assert_eq!(p.arrival_time, Duration::from_millis(1500));
    }

    #[test]
    fn test_since_is_monotonic() {
        let start = Instant::now();
        let a = since(start);
        std::thread::sleep(Duration::from_millis(2));
        let b = since(start);
        assert!(b > a);
    }

    #[test]
    fn test_serialize_arrival_ms() {
        let p = Product::new(1, Duration::from_millis(250));
        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains("\"arrival_ms\":250"));
    }
}

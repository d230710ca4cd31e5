//! Tests de integración de la línea completa
//! tests/integration_test.rs
//!
//! Corren la simulación real con unidades de pocos milisegundos y semilla
//! fija. Las cotas de tiempo son inferiores: el planificador del sistema
//! puede atrasar un hilo, nunca adelantarlo.
//!
//! Para ejecutar:
//!   cargo test --test integration_test

use assembly_line::config::{Config, Mode};
use assembly_line::events::{EventKind, RecordingSink};
use assembly_line::factory::{Factory, RunResult};
use assembly_line::metrics::ItemMetric;
use std::sync::Arc;
use std::time::Duration;

const UNIT_MS: u64 = 5;

fn units(n: u64) -> Duration {
    Duration::from_millis(n * UNIT_MS)
}

/// Helper: configuración rápida con llegadas inmediatas
fn config(mode: Mode, items: u32, station_times: Vec<u64>) -> Config {
    Config {
        mode,
        quantum: 2,
        items,
        station_times,
        time_unit_ms: UNIT_MS,
        min_delay: 0,
        max_delay: 1,
        seed: Some(2024),
        ..Config::default()
    }
}

/// Helper: ejecuta una corrida registrando los eventos
fn run(config: Config) -> (RunResult, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::new());
    let mut factory = Factory::with_sink(config, sink.clone());
    let result = factory.run().expect("la corrida no debería fallar");
    (result, sink)
}

/// Verifica las relaciones que toda corrida debe cumplir
fn assert_consistent(result: &RunResult) {
    for item in &result.summary.items {
        assert!(
            item.turnaround >= item.processing,
            "Producto #{}: turnaround {:?} < procesamiento {:?}",
            item.id,
            item.turnaround,
            item.processing
        );
        assert_eq!(item.waiting, item.turnaround - item.processing);
        assert!(item.completion >= item.arrival);
    }
}

/// Estaciones visitadas en orden, sin repetir turnos consecutivos
fn station_path(metric: &ItemMetric) -> Vec<u32> {
    let mut path: Vec<u32> = metric.visits.iter().map(|v| v.station_id).collect();
    path.dedup();
    path
}

// ==================== FCFS ====================

#[test]
fn test_fcfs_reference_line() {
    let (result, _) = run(config(Mode::Fcfs, 10, vec![3, 4, 5]));

    assert_eq!(result.summary.items.len(), 10);
    assert_eq!(result.stations.len(), 3);
    assert!(result.stations.iter().all(|s| s.finished == 10));

    // Llegadas a lo sumo cada unidad y estaciones de 3-5: hay cola
    assert!(result.summary.mean_waiting > Duration::ZERO);
    assert!(result.summary.mean_turnaround >= units(12));
    assert_consistent(&result);

    for metric in &result.metrics {
        assert_eq!(metric.visits.len(), 3, "Producto #{}", metric.item_id);
        assert_eq!(station_path(metric), vec![1, 2, 3]);

        // Una estación empieza después de que la anterior terminó
        for pair in metric.visits.windows(2) {
            assert!(pair[1].entry >= pair[0].exit);
        }
        assert!(metric.visits[0].entry >= metric.arrival_time);
    }
}

#[test]
fn test_fcfs_keeps_arrival_order() {
    let (result, _) = run(config(Mode::Fcfs, 6, vec![1, 2]));
    assert_eq!(result.summary.completion_order, vec![1, 2, 3, 4, 5, 6]);
    assert_consistent(&result);
}

// ==================== Round Robin ====================

#[test]
fn test_round_robin_single_station_interleaves() {
    let mut cfg = config(Mode::RoundRobin, 3, vec![6]);
    cfg.max_delay = 0;
    let (result, sink) = run(cfg);

    assert_eq!(result.stations[0].slices, 9);
    assert_eq!(result.summary.completion_order, vec![1, 2, 3]);
    assert_consistent(&result);

    for metric in &result.metrics {
        assert_eq!(metric.visits.len(), 3);
        assert!(metric.visits.iter().all(|v| v.duration() >= units(2)));
        assert!(metric.processing_time() >= units(6));
    }

    // El producto 1 no termina antes de que el 3 tenga su primer turno
    let item1 = result.summary.get(1).unwrap();
    let item3 = &result.metrics[2];
    assert!(item1.completion >= item3.visits[0].exit);

    let entries: Vec<u32> = sink
        .events()
        .iter()
        .filter(|e| e.kind == EventKind::StationEntry)
        .map(|e| e.item_id)
        .collect();
    assert_eq!(entries, vec![1, 2, 3, 1, 2, 3, 1, 2, 3]);
}

#[test]
fn test_round_robin_reference_line() {
    let (result, sink) = run(config(Mode::RoundRobin, 5, vec![3, 4, 5]));

    assert_eq!(result.summary.items.len(), 5);
    assert_consistent(&result);

    for metric in &result.metrics {
        assert_eq!(station_path(metric), vec![1, 2, 3]);
        // 3 = 2+1, 4 = 2+2, 5 = 2+2+1
        assert_eq!(metric.visits_at(1).count(), 2);
        assert_eq!(metric.visits_at(2).count(), 2);
        assert_eq!(metric.visits_at(3).count(), 3);
        assert!(metric.processing_time() >= units(12));
    }

    for id in 1..=5 {
        let completed = sink
            .events_for(id)
            .iter()
            .filter(|e| e.kind == EventKind::Completed)
            .count();
        assert_eq!(completed, 1);
    }
}

#[test]
fn test_invalid_quantum_uses_default() {
    let mut cfg = config(Mode::RoundRobin, 1, vec![4]);
    cfg.quantum = -3;
    let (result, _) = run(cfg);

    assert_eq!(result.summary.algorithm.quantum(), Some(units(2)));
    assert_eq!(result.metrics[0].visits.len(), 2);
}

// ==================== Corridas ====================

#[test]
fn test_store_reset_between_runs() {
    let sink = Arc::new(RecordingSink::new());
    let mut factory = Factory::with_sink(config(Mode::Fcfs, 4, vec![1]), sink);

    let first = factory.run().unwrap();
    assert_eq!(first.metrics.len(), 4);

    let second = factory.run().unwrap();
    assert_eq!(second.metrics.len(), 4);
    assert_eq!(factory.runs(), 2);
    assert_eq!(factory.store().len(), 4);
    assert!(second.metrics.iter().all(|m| m.visits.len() == 1));
}

#[test]
fn test_zero_items_finishes() {
    let (result, _) = run(config(Mode::RoundRobin, 0, vec![2, 2]));
    assert!(result.summary.items.is_empty());
    assert_eq!(result.summary.mean_turnaround, Duration::ZERO);
}

#[test]
fn test_json_summary_parses() {
    let (result, _) = run(config(Mode::RoundRobin, 2, vec![2]));
    let json = result.summary.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["algorithm"]["mode"], "round_robin");
    assert_eq!(value["algorithm"]["quantum_ms"], 2 * UNIT_MS);
    assert_eq!(value["items"].as_array().map(|a| a.len()), Some(2));
    assert_eq!(value["completion_order"].as_array().map(|a| a.len()), Some(2));
}

#[test]
fn test_render_lists_every_item() {
    let (result, _) = run(config(Mode::Fcfs, 3, vec![1]));
    let text = result.summary.render();
    for id in 1..=3 {
        assert!(text.contains(&format!("Producto #{}, finalizó en t=", id)));
    }
}

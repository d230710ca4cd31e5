//! # Resumen de la Corrida
//! src/metrics/report.rs
//!
//! Pasada final sobre el snapshot del almacén: turnaround, tiempo de espera,
//! promedios y orden real de finalización.

use crate::error::PipelineError;
use crate::metrics::store::ItemMetric;
use crate::scheduler::SchedulingAlgorithm;
use serde::Serialize;
use std::time::Duration;

/// Resultado por producto
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemSummary {
    pub id: u32,
    #[serde(rename = "arrival_ms", serialize_with = "crate::metrics::as_millis")]
    pub arrival: Duration,
    #[serde(rename = "completion_ms", serialize_with = "crate::metrics::as_millis")]
    pub completion: Duration,
    #[serde(rename = "processing_ms", serialize_with = "crate::metrics::as_millis")]
    pub processing: Duration,
    #[serde(rename = "turnaround_ms", serialize_with = "crate::metrics::as_millis")]
    pub turnaround: Duration,
    #[serde(rename = "waiting_ms", serialize_with = "crate::metrics::as_millis")]
    pub waiting: Duration,
}

impl ItemSummary {
    /// Calcula el resumen de un producto ya terminado
    pub fn from_metric(metric: &ItemMetric) -> Result<Self, PipelineError> {
        let completion = metric.last_exit().ok_or(PipelineError::IncompleteItem {
            item_id: metric.item_id,
        })?;
        let processing = metric.processing_time();
        let turnaround = completion.checked_sub(metric.arrival_time).ok_or(
            PipelineError::CompletedBeforeArrival {
                item_id: metric.item_id,
                arrival: metric.arrival_time,
                completion,
            },
        )?;

        let waiting = turnaround
            .checked_sub(processing)
            .ok_or(PipelineError::NegativeWaiting {
                item_id: metric.item_id,
                turnaround,
                processing,
            })?;

        Ok(Self {
            id: metric.item_id,
            arrival: metric.arrival_time,
            completion,
            processing,
            turnaround,
            waiting,
        })
    }
}

/// Resumen completo, expuesto como datos para que cualquier capa lo muestre
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub algorithm: SchedulingAlgorithm,
    /// Ordenados por id
    pub items: Vec<ItemSummary>,
    #[serde(rename = "mean_turnaround_ms", serialize_with = "crate::metrics::as_millis")]
    pub mean_turnaround: Duration,
    #[serde(rename = "mean_waiting_ms", serialize_with = "crate::metrics::as_millis")]
    pub mean_waiting: Duration,
    /// Ids por instante de finalización ascendente (empates por id)
    pub completion_order: Vec<u32>,
}

/// Construye el resumen a partir del snapshot del almacén.
///
/// Falla si algún producto no tiene visitas o si su espera sería negativa.
pub fn summarize(
    algorithm: SchedulingAlgorithm,
    snapshot: &[ItemMetric],
) -> Result<SummaryReport, PipelineError> {
    let mut items = snapshot
        .iter()
        .map(ItemSummary::from_metric)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            log::error!("Resumen inválido: {}", e);
            e
        })?;
    items.sort_by_key(|item| item.id);

    let (mean_turnaround, mean_waiting) = if items.is_empty() {
        (Duration::ZERO, Duration::ZERO)
    } else {
        let count = items.len() as u32;
        let total_turnaround: Duration = items.iter().map(|i| i.turnaround).sum();
        let total_waiting: Duration = items.iter().map(|i| i.waiting).sum();
        (total_turnaround / count, total_waiting / count)
    };

    let mut ranking: Vec<&ItemSummary> = items.iter().collect();
    ranking.sort_by(|a, b| a.completion.cmp(&b.completion).then(a.id.cmp(&b.id)));
    let completion_order = ranking.iter().map(|item| item.id).collect();

    Ok(SummaryReport {
        algorithm,
        items,
        mean_turnaround,
        mean_waiting,
        completion_order,
    })
}

impl SummaryReport {
    pub fn get(&self, id: u32) -> Option<&ItemSummary> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Resumen en JSON (duraciones en milisegundos)
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Resumen en texto plano
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!("\n{:=^64}\n", format!(" Resumen de Métricas ({}) ", self.algorithm)));
        out.push_str(&format!(
            "{:<8} {:>12} {:>14} {:>14} {:>12}\n",
            "Producto", "Llegada", "Turnaround", "Espera", "Fin"
        ));
        out.push_str(&format!("{:-<64}\n", ""));

        for item in &self.items {
            out.push_str(&format!(
                "#{:<7} {:>12} {:>14} {:>14} {:>12}\n",
                item.id,
                format_duration(item.arrival),
                format_duration(item.turnaround),
                format_duration(item.waiting),
                format_duration(item.completion),
            ));
        }

        out.push_str(&format!("{:-<64}\n", ""));
        out.push_str(&format!(
            "Promedio de Turnaround:       {}\n",
            format_duration(self.mean_turnaround)
        ));
        out.push_str(&format!(
            "Promedio de Tiempo de Espera: {}\n",
            format_duration(self.mean_waiting)
        ));

        out.push_str("Orden final de procesamiento:\n");
        for id in &self.completion_order {
            if let Some(item) = self.get(*id) {
                out.push_str(&format!(
                    "  Producto #{}, finalizó en t={}\n",
                    id,
                    format_duration(item.completion)
                ));
            }
        }
        out.push_str(&format!("{:=<64}\n", ""));

        out
    }
}

/// Formato "s.mmm"
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    format!("{}.{:03}s", millis / 1000, millis % 1000)
}

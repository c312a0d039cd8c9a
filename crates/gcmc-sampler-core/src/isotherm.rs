//! Per-condition results collected into an isotherm table.

use core::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::adaptive::ConditionId;
use crate::result::ConditionResult;

/// Header of the CSV rendering.
pub const CSV_HEADER: &str = "temperature,pressure,mean,std,g,equilibrated,finished,timed_out";

/// One row of the isotherm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsothermPoint {
    pub condition: ConditionId,
    pub result: ConditionResult,
}

impl IsothermPoint {
    pub fn new(condition: ConditionId, result: ConditionResult) -> Self {
        Self { condition, result }
    }
}

/// Results sorted by temperature, then pressure.
///
/// Inserting a point for a condition already present replaces it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Isotherm {
    points: Vec<IsothermPoint>,
}

impl Isotherm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, point: IsothermPoint) {
        match self
            .points
            .binary_search_by(|p| p.condition.total_cmp(&point.condition))
        {
            Ok(i) => self.points[i] = point,
            Err(i) => self.points.insert(i, point),
        }
    }

    pub fn points(&self) -> &[IsothermPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Distinct temperatures in ascending order.
    pub fn temperatures(&self) -> Vec<f64> {
        let mut temperatures: Vec<f64> = Vec::new();
        for point in &self.points {
            let t = point.condition.temperature;
            if temperatures.last() != Some(&t) {
                temperatures.push(t);
            }
        }
        temperatures
    }

    /// `(pressures, means)` at `temperature`, skipping conditions without a mean.
    pub fn curve(&self, temperature: f64) -> (Vec<f64>, Vec<f64>) {
        self.points
            .iter()
            .filter(|p| p.condition.temperature == temperature)
            .filter_map(|p| p.result.mean.map(|m| (p.condition.pressure, m)))
            .unzip()
    }

    /// Number of conditions that converged.
    pub fn converged(&self) -> usize {
        self.points.iter().filter(|p| p.result.finished).count()
    }

    /// CSV rendering with [`CSV_HEADER`]; missing means and stds are empty fields.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        out.push_str(CSV_HEADER);
        out.push('\n');
        for point in &self.points {
            let r = &point.result;
            let _ = writeln!(
                out,
                "{},{},{},{},{},{},{},{}",
                point.condition.temperature,
                point.condition.pressure,
                optional(r.mean),
                optional(r.std),
                r.g,
                r.equilibrated,
                r.finished,
                r.timed_out,
            );
        }
        out
    }
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl FromIterator<IsothermPoint> for Isotherm {
    fn from_iter<I: IntoIterator<Item = IsothermPoint>>(iter: I) -> Self {
        let mut isotherm = Isotherm::new();
        for point in iter {
            isotherm.insert(point);
        }
        isotherm
    }
}

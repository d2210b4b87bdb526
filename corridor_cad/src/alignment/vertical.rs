//! Vertical profiles: grades joined by symmetric parabolic curves.

use serde::{Deserialize, Serialize};

use crate::error::{AlignmentError, Result};

/// Point of vertical intersection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pvi {
    pub station: f64,
    pub elevation: f64,
    /// Length of the vertical curve centred on this PVI, 0 for a grade
    /// break.
    #[serde(default)]
    pub curve_length: f64,
}

impl Pvi {
    pub fn new(station: f64, elevation: f64, curve_length: f64) -> Self {
        Self {
            station,
            elevation,
            curve_length,
        }
    }
}

/// Types of vertical alignment elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VerticalElement {
    /// Straight grade between two stations.
    Grade {
        start_station: f64,
        end_station: f64,
        start_elev: f64,
        end_elev: f64,
    },
    /// Simple parabolic vertical curve.
    Parabola {
        start_station: f64,
        end_station: f64,
        start_elev: f64,
        start_grade: f64,
        end_grade: f64,
    },
}

impl VerticalElement {
    fn start_station(&self) -> f64 {
        match self {
            VerticalElement::Grade { start_station, .. }
            | VerticalElement::Parabola { start_station, .. } => *start_station,
        }
    }

    fn end_station(&self) -> f64 {
        match self {
            VerticalElement::Grade { end_station, .. }
            | VerticalElement::Parabola { end_station, .. } => *end_station,
        }
    }

    fn elevation_at(&self, station: f64) -> f64 {
        match *self {
            VerticalElement::Grade {
                start_station,
                end_station,
                start_elev,
                end_elev,
            } => {
                let span = end_station - start_station;
                if span.abs() < f64::EPSILON {
                    return start_elev;
                }
                let t = (station - start_station) / span;
                start_elev + t * (end_elev - start_elev)
            }
            VerticalElement::Parabola {
                start_station,
                end_station,
                start_elev,
                start_grade,
                end_grade,
            } => {
                let l = end_station - start_station;
                let x = station - start_station;
                start_elev + start_grade * x + 0.5 * (end_grade - start_grade) / l * x * x
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerticalAlignment {
    pub elements: Vec<VerticalElement>,
}

impl VerticalAlignment {
    /// Builds grades and curves from PVIs ordered by station. Curve
    /// lengths on the first and last PVI are ignored.
    pub fn from_pvis(pvis: &[Pvi]) -> Result<Self> {
        let invalid = |reason: String| AlignmentError::InvalidProfile { reason };
        if pvis.len() < 2 {
            return Err(invalid(format!("need at least 2 PVIs, got {}", pvis.len())));
        }
        for pair in pvis.windows(2) {
            if pair[1].station <= pair[0].station {
                return Err(invalid(format!(
                    "PVI stations must increase ({} then {})",
                    pair[0].station, pair[1].station
                )));
            }
        }
        let grade = |a: &Pvi, b: &Pvi| (b.elevation - a.elevation) / (b.station - a.station);

        let mut elements = Vec::new();
        // current end of the profile built so far
        let mut at = (pvis[0].station, pvis[0].elevation);
        for i in 1..pvis.len() - 1 {
            let (prev, pvi, next) = (&pvis[i - 1], &pvis[i], &pvis[i + 1]);
            if pvi.curve_length < 0.0 {
                return Err(invalid(format!("negative curve length at station {}", pvi.station)));
            }
            if pvi.curve_length == 0.0 {
                if pvi.station > at.0 {
                    elements.push(VerticalElement::Grade {
                        start_station: at.0,
                        end_station: pvi.station,
                        start_elev: at.1,
                        end_elev: pvi.elevation,
                    });
                }
                at = (pvi.station, pvi.elevation);
                continue;
            }
            let half = pvi.curve_length / 2.0;
            let (bvc, evc) = (pvi.station - half, pvi.station + half);
            let next_half = if i + 1 < pvis.len() - 1 {
                next.curve_length.max(0.0) / 2.0
            } else {
                0.0
            };
            if bvc < at.0 - 1e-9 || evc > next.station - next_half + 1e-9 {
                return Err(invalid(format!(
                    "vertical curve at station {} overlaps its neighbours",
                    pvi.station
                )));
            }
            let (g1, g2) = (grade(prev, pvi), grade(pvi, next));
            let bvc_elev = pvi.elevation - g1 * half;
            if bvc > at.0 {
                elements.push(VerticalElement::Grade {
                    start_station: at.0,
                    end_station: bvc,
                    start_elev: at.1,
                    end_elev: bvc_elev,
                });
            }
            elements.push(VerticalElement::Parabola {
                start_station: bvc,
                end_station: evc,
                start_elev: bvc_elev,
                start_grade: g1,
                end_grade: g2,
            });
            at = (evc, pvi.elevation + g2 * half);
        }
        let last = pvis[pvis.len() - 1];
        if last.station > at.0 {
            elements.push(VerticalElement::Grade {
                start_station: at.0,
                end_station: last.station,
                start_elev: at.1,
                end_elev: last.elevation,
            });
        }
        Ok(Self { elements })
    }

    /// Elevation at the given station evaluating grades and parabolic
    /// curves; stations beyond either end take the end elevation.
    pub fn elevation_at(&self, station: f64) -> Option<f64> {
        let first = self.elements.first()?;
        if station <= first.start_station() {
            return Some(first.elevation_at(first.start_station()));
        }
        for elem in &self.elements {
            if station >= elem.start_station() && station <= elem.end_station() {
                return Some(elem.elevation_at(station));
            }
        }
        self.elements.last().map(|e| e.elevation_at(e.end_station()))
    }
}

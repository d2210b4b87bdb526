//! An alignment with its inputs and a cached regeneration.

use log::{info, warn};

use super::station::{ContinuousCurve, ResolvedStation, Stationing};
use super::vertical::{Pvi, VerticalAlignment};
use super::{decode, discretize, GeometryElement, HorizontalAlignment, IntersectionEquation, PiRecord};
use crate::config::DiscretizeConfig;
use crate::error::{AlignmentError, Result};
use crate::geometry::{Point, Point3, Polyline3};

/// Edits that invalidate an alignment's generated geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    GeometryChanged(Vec<PiRecord>),
    PolicyChanged(DiscretizeConfig),
    EquationsChanged(Stationing),
    DatumChanged(Point),
    PlacementChanged(Point),
    ProfileChanged(Option<Vec<Pvi>>),
    IntersectionChanged(Option<IntersectionEquation>),
}

/// Result of a full regeneration pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Regenerated {
    /// Position of the first PI after placement.
    pub origin: Point,
    pub elements: Vec<GeometryElement>,
    /// Exact tangents, arcs and spirals; stations are measured on this.
    pub path: HorizontalAlignment,
    /// Absolute plan vertices at z = 0.
    pub plan: Polyline3,
    /// Distance of each `plan` vertex along `path`.
    pub distances: Vec<f64>,
    /// Plan geometry with profile elevations, or a copy of `plan` when the
    /// alignment has no profile.
    pub shape: Polyline3,
    pub errors: Vec<AlignmentError>,
}

impl ContinuousCurve for Regenerated {
    fn length(&self) -> f64 {
        self.path.length()
    }

    fn point_at_distance(&self, distance: f64) -> Option<Point3> {
        self.path.point_at_distance(distance)
    }
}

#[derive(Debug, Clone)]
pub struct Alignment {
    pub name: String,
    datum: Point,
    /// Shift applied to the decoded geometry, set when attaching to a
    /// parent alignment.
    placement: Point,
    pis: Vec<PiRecord>,
    stationing: Stationing,
    intersection: Option<IntersectionEquation>,
    profile: Option<Vec<Pvi>>,
    config: DiscretizeConfig,
    cache: Option<Regenerated>,
}

impl Alignment {
    pub fn new(name: impl Into<String>, datum: Point, pis: Vec<PiRecord>) -> Self {
        Self {
            name: name.into(),
            datum,
            placement: Point::default(),
            pis,
            stationing: Stationing::default(),
            intersection: None,
            profile: None,
            config: DiscretizeConfig::default(),
            cache: None,
        }
    }

    pub fn with_config(mut self, config: DiscretizeConfig) -> Self {
        self.apply(ChangeEvent::PolicyChanged(config));
        self
    }

    pub fn with_stationing(mut self, stationing: Stationing) -> Self {
        self.apply(ChangeEvent::EquationsChanged(stationing));
        self
    }

    pub fn with_profile(mut self, pvis: Vec<Pvi>) -> Self {
        self.apply(ChangeEvent::ProfileChanged(Some(pvis)));
        self
    }

    pub fn with_intersection(mut self, eq: IntersectionEquation) -> Self {
        self.apply(ChangeEvent::IntersectionChanged(Some(eq)));
        self
    }

    pub fn datum(&self) -> Point {
        self.datum
    }

    pub fn placement(&self) -> Point {
        self.placement
    }

    pub fn pis(&self) -> &[PiRecord] {
        &self.pis
    }

    pub fn stationing(&self) -> &Stationing {
        &self.stationing
    }

    pub fn intersection(&self) -> Option<IntersectionEquation> {
        self.intersection
    }

    pub fn profile(&self) -> Option<&[Pvi]> {
        self.profile.as_deref()
    }

    pub fn config(&self) -> &DiscretizeConfig {
        &self.config
    }

    /// Applies an edit. Any change drops the cached geometry; the next
    /// query regenerates from scratch.
    pub fn apply(&mut self, event: ChangeEvent) {
        match event {
            ChangeEvent::GeometryChanged(pis) => self.pis = pis,
            ChangeEvent::PolicyChanged(config) => self.config = config,
            ChangeEvent::EquationsChanged(stationing) => self.stationing = stationing,
            ChangeEvent::DatumChanged(datum) => self.datum = datum,
            ChangeEvent::PlacementChanged(placement) => self.placement = placement,
            ChangeEvent::ProfileChanged(profile) => self.profile = profile,
            ChangeEvent::IntersectionChanged(eq) => self.intersection = eq,
        }
        self.cache = None;
    }

    fn build(&self) -> Regenerated {
        let decoded = decode(&self.pis, self.datum, &self.config);
        let discretized = discretize(&decoded.elements, &self.config);
        let mut errors = decoded.errors;
        errors.extend(discretized.errors);

        let origin = decoded.origin + self.placement;
        let mut plan = Polyline3::new(discretized.points);
        plan.translate(Point3::from(origin));
        let mut path = discretized.path;
        path.translate(origin);
        let distances = discretized.distances;

        let mut shape = plan.clone();
        if let Some(pvis) = &self.profile {
            match VerticalAlignment::from_pvis(pvis) {
                Ok(profile) => {
                    for (v, &d) in shape.vertices.iter_mut().zip(&distances) {
                        let station = self.stationing.station_at(d);
                        v.z = profile.elevation_at(station).unwrap_or(0.0);
                    }
                }
                Err(e) => {
                    warn!("{}: profile ignored: {e}", self.name);
                    errors.push(e);
                }
            }
        }

        info!(
            "{}: regenerated {} points from {} elements ({} errors)",
            self.name,
            plan.vertices.len(),
            decoded.elements.len(),
            errors.len()
        );
        Regenerated {
            origin,
            elements: decoded.elements,
            path,
            plan,
            distances,
            shape,
            errors,
        }
    }

    /// Current geometry, regenerating it if an edit invalidated the cache.
    pub fn regenerate(&mut self) -> &Regenerated {
        let regenerated = match self.cache.take() {
            Some(r) => r,
            None => self.build(),
        };
        self.cache.insert(regenerated)
    }

    /// Locates a station on the plan geometry. With a profile, `z` is the
    /// profile elevation at that station.
    pub fn resolve_station(&mut self, station: f64) -> Result<ResolvedStation> {
        let stationing = self.stationing.clone();
        let profile = match &self.profile {
            Some(pvis) => VerticalAlignment::from_pvis(pvis).ok(),
            None => None,
        };
        let mut resolved = stationing.resolve(station, self.regenerate())?;
        if let Some(z) = profile.and_then(|p| p.elevation_at(station)) {
            resolved.point.z = z;
        }
        Ok(resolved)
    }

    /// Offset that moves this alignment's intersection station onto the
    /// parent. `None` when no intersection equation is set.
    pub fn intersection_delta(&mut self, parent: &mut Alignment) -> Result<Option<Point3>> {
        let Some(eq) = self.intersection else {
            return Ok(None);
        };
        let parent_stationing = parent.stationing.clone();
        let child_stationing = self.stationing.clone();
        let parent_geom = parent.regenerate();
        let child_geom = self.regenerate();
        super::station::intersection_delta(
            parent_geom,
            &parent_stationing,
            child_geom,
            &child_stationing,
            eq,
        )
        .map(Some)
    }

    /// Moves this alignment so its intersection station sits on `parent`.
    /// Returns the applied delta; the alignment is left untouched on error.
    pub fn attach_to(&mut self, parent: &mut Alignment) -> Result<Option<Point3>> {
        let delta = self.intersection_delta(parent)?;
        if let Some(d) = delta {
            let placement = self.placement + d.xy();
            self.apply(ChangeEvent::PlacementChanged(placement));
        }
        Ok(delta)
    }
}

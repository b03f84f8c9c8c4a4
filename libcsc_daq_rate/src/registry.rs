use fxhash::FxHashMap;

use super::error::RegistryError;
use super::histogram::Hist1D;
use super::location::{Location, SUMMARY_LOCATION};

/// Event selection classes. Every event is aggregated under `All`, plus
/// exactly one of `Quality` / `NoQuality` depending on the track selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventClass {
    All,
    Quality,
    NoQuality,
}

/// What is being counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Events,
    Lcts,
    Chambers,
    LctsBx0,
    ChambersBx0,
    Tracks,
    TrackPt,
    TrackLcts,
}

/// Independent variable on the histogram x axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variable {
    HitCount,
    LumiSection,
    Pileup,
    DeliveredLumi,
}

pub const EVENT_CLASSES: [EventClass; 3] =
    [EventClass::All, EventClass::Quality, EventClass::NoQuality];

/// Object kinds with a full per-location breakdown.
pub const CHAMBER_KINDS: [ObjectKind; 4] = [
    ObjectKind::Lcts,
    ObjectKind::Chambers,
    ObjectKind::LctsBx0,
    ObjectKind::ChambersBx0,
];

/// Variables resolved from the beam-condition join.
pub const BEAM_VARIABLES: [Variable; 3] = [
    Variable::LumiSection,
    Variable::Pileup,
    Variable::DeliveredLumi,
];

pub const ALL_VARIABLES: [Variable; 4] = [
    Variable::HitCount,
    Variable::LumiSection,
    Variable::Pileup,
    Variable::DeliveredLumi,
];

impl EventClass {
    pub fn id(&self) -> &'static str {
        match self {
            EventClass::All => "all",
            EventClass::Quality => "quality",
            EventClass::NoQuality => "noquality",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EventClass::All => "All Events",
            EventClass::Quality => "Quality",
            EventClass::NoQuality => "No Quality",
        }
    }
}

impl ObjectKind {
    pub fn id(&self) -> &'static str {
        match self {
            ObjectKind::Events => "events",
            ObjectKind::Lcts => "lcts",
            ObjectKind::Chambers => "chambers",
            ObjectKind::LctsBx0 => "lcts_bx0",
            ObjectKind::ChambersBx0 => "chambers_bx0",
            ObjectKind::Tracks => "tracks",
            ObjectKind::TrackPt => "track_pt",
            ObjectKind::TrackLcts => "track_nlcts",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ObjectKind::Events => "Events",
            ObjectKind::Lcts => "LCTs",
            ObjectKind::Chambers => "Chambers",
            ObjectKind::LctsBx0 => "BX0 LCTs",
            ObjectKind::ChambersBx0 => "BX0 Chambers",
            ObjectKind::Tracks => "Tracks",
            ObjectKind::TrackPt => "Track pT",
            ObjectKind::TrackLcts => "Track # LCTs",
        }
    }

    /// Binning for the distribution kinds that carry their own x axis.
    fn distribution_binning(&self) -> Option<(usize, f64, f64)> {
        match self {
            ObjectKind::TrackPt => Some((100, 0.0, 100.0)),
            ObjectKind::TrackLcts => Some((5, 0.0, 5.0)),
            _ => None,
        }
    }
}

impl Variable {
    pub fn id(&self) -> &'static str {
        match self {
            Variable::HitCount => "hits",
            Variable::LumiSection => "ls",
            Variable::Pileup => "pu",
            Variable::DeliveredLumi => "dellumi",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Variable::HitCount => "Hit Count",
            Variable::LumiSection => "Lumi Section #",
            Variable::Pileup => "Lumi Section Avg Pileup",
            Variable::DeliveredLumi => "Delivered Lumi (1e34/cm2s)",
        }
    }

    /// Fixed axis policy per variable. These are conventions, not derived.
    fn binning(&self) -> (usize, f64, f64) {
        match self {
            Variable::HitCount => (100, 0.0, 100.0),
            Variable::LumiSection => (1000, 0.0, 1000.0),
            Variable::Pileup => (100, 0.0, 100.0),
            Variable::DeliveredLumi => (250, 0.0, 2.5),
        }
    }
}

/// Typed address of one histogram in the registry.
///
/// Replaces the string-concatenation keys of the original analysis; a typo
/// here is a compile error, and a fill against a key the registry never
/// allocated is reported as a contract violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HistKey {
    pub class: EventClass,
    pub kind: ObjectKind,
    pub variable: Option<Variable>,
    pub location: Option<Location>,
}

impl HistKey {
    /// Event-level quantity with no location breakdown.
    pub fn event_level(class: EventClass, variable: Variable) -> Self {
        Self {
            class,
            kind: ObjectKind::Events,
            variable: Some(variable),
            location: None,
        }
    }

    /// Count keyed by a taxonomy slot.
    pub fn located(
        class: EventClass,
        kind: ObjectKind,
        variable: Variable,
        location: Location,
    ) -> Self {
        Self {
            class,
            kind,
            variable: Some(variable),
            location: Some(location),
        }
    }

    /// Raw distribution carrying its own x axis (track pT, track LCTs).
    pub fn distribution(class: EventClass, kind: ObjectKind) -> Self {
        Self {
            class,
            kind,
            variable: None,
            location: None,
        }
    }

    /// Machine name, e.g. `quality_lcts_by_pu_in_p_s1_r1a`.
    pub fn name(&self) -> String {
        let mut name = format!("{}_{}", self.class.id(), self.kind.id());
        if let Some(variable) = &self.variable {
            name.push_str("_by_");
            name.push_str(variable.id());
        }
        if let Some(location) = &self.location {
            name.push_str("_in_");
            name.push_str(&location.canonical_id());
        }
        name
    }

    /// Human-facing title, e.g. `Quality: LCTs by Lumi Section Avg Pileup,
    /// Endcap +, Station 1, Ring 1a`.
    pub fn title(&self) -> String {
        let mut title = format!("{}: {}", self.class.label(), self.kind.label());
        if let Some(variable) = &self.variable {
            title.push_str(" by ");
            title.push_str(variable.label());
        }
        if let Some(location) = &self.location {
            title.push_str(", ");
            title.push_str(&location.display_name());
        }
        title
    }

    fn binning(&self) -> (usize, f64, f64) {
        match self.variable {
            Some(variable) => variable.binning(),
            None => self
                .kind
                .distribution_binning()
                .expect("distribution kinds carry their own binning"),
        }
    }
}

/// Owner of the full histogram family.
///
/// Allocated once up front as the Cartesian product of the class, kind,
/// variable, and location axes restricted by applicability; mutated only by
/// fills during the event loop and by the post-fill derivation pass.
#[derive(Debug, Default)]
pub struct Registry {
    histograms: FxHashMap<HistKey, Hist1D>,
}

impl Registry {
    /// Allocate every histogram the aggregation can address.
    pub fn initialize() -> Self {
        let mut registry = Registry::default();
        let taxonomy = Location::enumerate_all();
        for class in EVENT_CLASSES {
            for variable in ALL_VARIABLES {
                registry.allocate(HistKey::event_level(class, variable));
            }
            for kind in CHAMBER_KINDS {
                for variable in BEAM_VARIABLES {
                    for location in &taxonomy {
                        registry.allocate(HistKey::located(class, kind, variable, *location));
                    }
                }
            }
            // Tracks are only broken down to the summary slot
            for variable in BEAM_VARIABLES {
                registry.allocate(HistKey::located(
                    class,
                    ObjectKind::Tracks,
                    variable,
                    SUMMARY_LOCATION,
                ));
            }
            registry.allocate(HistKey::distribution(class, ObjectKind::TrackPt));
            registry.allocate(HistKey::distribution(class, ObjectKind::TrackLcts));
        }
        registry
    }

    fn allocate(&mut self, key: HistKey) {
        let (n_bins, x_min, x_max) = key.binning();
        let hist = Hist1D::new(&key.name(), &key.title(), n_bins, x_min, x_max);
        self.histograms.insert(key, hist);
    }

    /// Increment the histogram at `key` by one entry at `value`.
    pub fn fill(&mut self, key: &HistKey, value: f64) -> Result<(), RegistryError> {
        self.histograms
            .get_mut(key)
            .ok_or(RegistryError::UnknownKey(*key))?
            .fill(value);
        Ok(())
    }

    pub fn get(&self, key: &HistKey) -> Option<&Hist1D> {
        self.histograms.get(key)
    }

    pub fn len(&self) -> usize {
        self.histograms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histograms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HistKey, &Hist1D)> {
        self.histograms.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&HistKey, &mut Hist1D)> {
        self.histograms.iter_mut()
    }
}

use super::error::RegistryError;
use super::histogram::Hist1D;
use super::location::{Location, SUMMARY_LOCATION};
use super::registry::{
    EventClass, HistKey, ObjectKind, Registry, Variable, BEAM_VARIABLES, CHAMBER_KINDS,
    EVENT_CLASSES,
};

/// Object kinds that get a per-event rate derivation: the chamber families
/// over the full taxonomy, and tracks at the summary slot.
fn rate_kinds() -> impl Iterator<Item = ObjectKind> {
    CHAMBER_KINDS.into_iter().chain([ObjectKind::Tracks])
}

fn locations_for(kind: ObjectKind) -> Vec<Location> {
    if kind == ObjectKind::Tracks {
        vec![SUMMARY_LOCATION]
    } else {
        Location::enumerate_all()
    }
}

fn derived_name(
    class: EventClass,
    kind: ObjectKind,
    variable: Variable,
    location: Option<&Location>,
) -> String {
    let mut name = format!(
        "{}_{}_per_event_by_{}",
        class.id(),
        kind.id(),
        variable.id()
    );
    if let Some(location) = location {
        name.push_str("_in_");
        name.push_str(&location.canonical_id());
    }
    name
}

fn derived_title(
    class: EventClass,
    kind: ObjectKind,
    variable: Variable,
    location: Option<&Location>,
) -> String {
    let mut title = format!(
        "{}: {}/Event by {}",
        class.label(),
        kind.label(),
        variable.label()
    );
    if let Some(location) = location {
        title.push_str(", ");
        title.push_str(&location.display_name());
    }
    title
}

/// Compute the per-event rate histograms: each count histogram divided by
/// the matching event-count histogram of the same class and variable.
///
/// Must only run after every raw fill has completed; both operands have to
/// be fully populated. The summary-slot ratio is additionally promoted to a
/// top-level name with no location suffix. A count histogram missing from
/// the registry is a contract violation, not a recoverable condition.
pub fn derive_rates(registry: &Registry) -> Result<Vec<(EventClass, Hist1D)>, RegistryError> {
    let mut derived = Vec::new();
    for class in EVENT_CLASSES {
        for variable in BEAM_VARIABLES {
            let events_key = HistKey::event_level(class, variable);
            let events = registry
                .get(&events_key)
                .ok_or(RegistryError::UnknownKey(events_key))?;
            for kind in rate_kinds() {
                for location in locations_for(kind) {
                    let count_key = HistKey::located(class, kind, variable, location);
                    let counts = registry
                        .get(&count_key)
                        .ok_or(RegistryError::UnknownKey(count_key))?;
                    let ratio = counts.divide(
                        events,
                        &derived_name(class, kind, variable, Some(&location)),
                        &derived_title(class, kind, variable, Some(&location)),
                    );
                    if location == SUMMARY_LOCATION {
                        let mut summary = ratio.clone();
                        summary.name = derived_name(class, kind, variable, None);
                        summary.title = derived_title(class, kind, variable, None);
                        derived.push((class, summary));
                    }
                    derived.push((class, ratio));
                }
            }
        }
    }
    Ok(derived)
}

/// Fit every primitive and derived histogram to a line. Failures are
/// expected on sparse histograms and simply leave the fit metadata empty.
pub fn fit_all(registry: &mut Registry, derived: &mut [(EventClass, Hist1D)]) {
    for (_, hist) in registry.iter_mut() {
        hist.fit_linear();
    }
    for (_, hist) in derived.iter_mut() {
        hist.fit_linear();
    }
}

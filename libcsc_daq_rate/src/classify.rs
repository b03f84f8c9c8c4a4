use super::event::{Event, Hit, Track};
use super::registry::EventClass;

/// Minimum track pT (GeV) for the quality selection.
pub const PT_THRESHOLD: f64 = 22.0;

/// Station-coverage bitmasks (bit N-1 set when station N contributes a hit
/// to the track) accepted by the quality selection. This allow-list is
/// trigger policy handed down from the L1T group; it is not derivable from
/// the geometry, so treat it as an opaque constant.
pub const GOOD_STATION_MASKS: [u8; 4] = [15, 14, 13, 11];

/// Whether a hit participates in occupancy counting: it must be a CSC-type
/// hit and not a cross-chamber neighbor duplicate.
pub fn hit_qualifies(hit: &Hit) -> bool {
    hit.is_csc && !hit.is_neighbor
}

/// Bitmask of the stations contributing hits to a track.
pub fn station_mask(event: &Event, track: &Track) -> u8 {
    let mut mask = 0u8;
    for idx in &track.hit_indices {
        if let Some(hit) = event.hits.get(*idx) {
            if (1..=4).contains(&hit.station) {
                mask |= 1 << (hit.station - 1);
            }
        }
    }
    mask
}

/// Whether the event passes the track-quality selection: at least one track
/// above the pT threshold with an accepted station-coverage mask.
pub fn passes_quality(event: &Event) -> bool {
    event
        .tracks
        .iter()
        .any(|track| track.pt >= PT_THRESHOLD && GOOD_STATION_MASKS.contains(&station_mask(event, track)))
}

/// The event selection classes an event is aggregated under. Always `All`,
/// plus exactly one of the quality classes.
pub fn classify(event: &Event) -> [EventClass; 2] {
    if passes_quality(event) {
        [EventClass::All, EventClass::Quality]
    } else {
        [EventClass::All, EventClass::NoQuality]
    }
}

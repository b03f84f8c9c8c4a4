use fxhash::FxHashMap;

use super::classify::{classify, hit_qualifies};
use super::error::AggregatorError;
use super::event::Event;
use super::location::{Endcap, Location, SUMMARY_LOCATION};
use super::lumi::LumiTable;
use super::registry::{EventClass, HistKey, ObjectKind, Registry, Variable};

/// Unit conversion for delivered luminosity: brilcalc exports 1e30 cm^-2
/// s^-1, the histogram axes use 1e34. Every loaded lumi table must use the
/// brilcalc convention; mixing units silently corrupts the luminosity axis.
pub const LUMI_SCALE: f64 = 1.0e4;

/// A chamber contributes at most this many LCT fills per event, modeling
/// the saturating front-end readout rather than raw hit multiplicity.
pub const MAX_LCT_FILLS_PER_CHAMBER: u32 = 2;

/// Physical address of one chamber as recorded in hit data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ChamberAddress {
    endcap: Endcap,
    station: u8,
    ring: u8,
    chamber: u8,
}

/// Per-event LCT counts per chamber. Transient; rebuilt and discarded for
/// every event.
type ChamberOccupancy = FxHashMap<ChamberAddress, u32>;

/// Drives the per-event aggregation: joins beam conditions, classifies the
/// event, and fans fills out across the location taxonomy.
///
/// Owns the lumi table and the histogram registry outright for the duration
/// of the run; there is no shared state between runs.
#[derive(Debug)]
pub struct Aggregator {
    lumi: LumiTable,
    registry: Registry,
}

impl Aggregator {
    pub fn new(lumi: LumiTable) -> Self {
        Self {
            lumi,
            registry: Registry::initialize(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Consume the aggregator, releasing the filled registry for
    /// finalization.
    pub fn into_registry(self) -> Registry {
        self.registry
    }

    /// Aggregate one event. A missing beam-condition record is an error and
    /// aborts the run; rates against unknown beam conditions are
    /// meaningless.
    pub fn process_event(&mut self, event: &Event) -> Result<(), AggregatorError> {
        let record = self.lumi.lookup(event.run, event.lumi_section)?;
        let beam: [(Variable, f64); 3] = [
            (Variable::LumiSection, event.lumi_section as f64),
            (Variable::Pileup, record.avg_pileup),
            (Variable::DeliveredLumi, record.delivered_lumi / LUMI_SCALE),
        ];

        let classes = classify(event);

        for class in classes {
            self.registry.fill(
                &HistKey::event_level(class, Variable::HitCount),
                event.hits.len() as f64,
            )?;
            for (variable, value) in beam {
                self.registry
                    .fill(&HistKey::event_level(class, variable), value)?;
            }
        }

        let (occupancy, occupancy_bx0) = build_occupancy(event);
        self.fill_chamber_family(
            &classes,
            &occupancy,
            ObjectKind::Chambers,
            ObjectKind::Lcts,
            &beam,
        )?;
        self.fill_chamber_family(
            &classes,
            &occupancy_bx0,
            ObjectKind::ChambersBx0,
            ObjectKind::LctsBx0,
            &beam,
        )?;

        for track in &event.tracks {
            for class in classes {
                self.registry
                    .fill(&HistKey::distribution(class, ObjectKind::TrackPt), track.pt)?;
                self.registry.fill(
                    &HistKey::distribution(class, ObjectKind::TrackLcts),
                    track.n_hits as f64,
                )?;
                for (variable, value) in beam {
                    self.registry.fill(
                        &HistKey::located(class, ObjectKind::Tracks, variable, SUMMARY_LOCATION),
                        value,
                    )?;
                }
            }
        }

        Ok(())
    }

    /// Fan one occupancy map out into a (chamber kind, LCT kind) histogram
    /// pair: one chamber fill per occupied chamber, and min(2, count) LCT
    /// fills, across every applicable taxonomy slot and event class.
    fn fill_chamber_family(
        &mut self,
        classes: &[EventClass],
        occupancy: &ChamberOccupancy,
        chamber_kind: ObjectKind,
        lct_kind: ObjectKind,
        beam: &[(Variable, f64); 3],
    ) -> Result<(), AggregatorError> {
        for (address, count) in occupancy {
            let lct_fills = (*count).min(MAX_LCT_FILLS_PER_CHAMBER);
            for location in Location::fanout(address.endcap, address.station, address.ring) {
                for class in classes {
                    for (variable, value) in beam {
                        self.registry.fill(
                            &HistKey::located(*class, chamber_kind, *variable, location),
                            *value,
                        )?;
                        for _ in 0..lct_fills {
                            self.registry.fill(
                                &HistKey::located(*class, lct_kind, *variable, location),
                                *value,
                            )?;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Count qualifying LCTs per chamber, plus the in-time (BX 0) subset.
fn build_occupancy(event: &Event) -> (ChamberOccupancy, ChamberOccupancy) {
    let mut occupancy = ChamberOccupancy::default();
    let mut occupancy_bx0 = ChamberOccupancy::default();
    for hit in &event.hits {
        if !hit_qualifies(hit) {
            continue;
        }
        let address = ChamberAddress {
            endcap: hit.endcap_side(),
            station: hit.station,
            ring: hit.ring,
            chamber: hit.chamber,
        };
        *occupancy.entry(address).or_insert(0) += 1;
        if hit.bx == 0 {
            *occupancy_bx0.entry(address).or_insert(0) += 1;
        }
    }
    (occupancy, occupancy_bx0)
}

//Unit tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Hit, Track};
    use crate::location::{Ring, Station};

    fn reference_lumi() -> LumiTable {
        let csv = "\
#Data tag : v1 , Norm tag: None
#run:fill,ls,delivered(1e30/cm2s),avgpu
306091:6371,50:50,300000.0,30.0
";
        let mut table = LumiTable::default();
        table.load_from_str(csv).unwrap();
        table
    }

    fn chamber_hit(bx: i32) -> Hit {
        Hit {
            endcap: 1,
            station: 1,
            ring: 1,
            chamber: 5,
            bx,
            is_csc: true,
            is_neighbor: false,
        }
    }

    fn neighbor_hit(station: u8) -> Hit {
        Hit {
            endcap: 1,
            station,
            ring: 1,
            chamber: 7,
            bx: 0,
            is_csc: true,
            is_neighbor: true,
        }
    }

    /// The single-event reference scenario: 3 qualifying LCTs in one ME1/1
    /// chamber, one quality track.
    fn reference_event() -> Event {
        let hits = vec![
            chamber_hit(0),
            chamber_hit(0),
            chamber_hit(1),
            // Neighbor hits complete the track's station coverage without
            // entering the occupancy maps
            neighbor_hit(2),
            neighbor_hit(3),
            neighbor_hit(4),
        ];
        let track = Track {
            pt: 25.0,
            n_hits: 4,
            hit_indices: vec![0, 3, 4, 5],
        };
        Event {
            run: 306091,
            lumi_section: 50,
            hits,
            tracks: vec![track],
        }
    }

    #[test]
    fn test_missing_lumi_key_aborts() {
        let mut aggregator = Aggregator::new(reference_lumi());
        let mut event = reference_event();
        event.lumi_section = 99;
        assert!(matches!(
            aggregator.process_event(&event),
            Err(AggregatorError::LumiError(_))
        ));
    }

    #[test]
    fn test_event_level_fills() {
        let mut aggregator = Aggregator::new(reference_lumi());
        aggregator.process_event(&reference_event()).unwrap();
        let registry = aggregator.registry();

        for class in [EventClass::All, EventClass::Quality] {
            let by_ls = registry
                .get(&HistKey::event_level(class, Variable::LumiSection))
                .unwrap();
            assert_eq!(by_ls.contents[50], 1.0);
            let by_pu = registry
                .get(&HistKey::event_level(class, Variable::Pileup))
                .unwrap();
            assert_eq!(by_pu.contents[30], 1.0);
            let by_hits = registry
                .get(&HistKey::event_level(class, Variable::HitCount))
                .unwrap();
            assert_eq!(by_hits.contents[6], 1.0);
            // 300000 / 1e4 = 30 lands beyond the 2.5 axis end
            let by_lumi = registry
                .get(&HistKey::event_level(class, Variable::DeliveredLumi))
                .unwrap();
            assert_eq!(by_lumi.entries, 1);
            assert_eq!(by_lumi.overflow, 1.0);
        }
        // The complementary class is untouched
        let noquality = registry
            .get(&HistKey::event_level(EventClass::NoQuality, Variable::LumiSection))
            .unwrap();
        assert_eq!(noquality.entries, 0);
    }

    #[test]
    fn test_lct_fills_saturate_at_two() {
        let mut aggregator = Aggregator::new(reference_lumi());
        aggregator.process_event(&reference_event()).unwrap();
        let registry = aggregator.registry();

        let slot = Location::new(Endcap::Plus, Station::S1, Ring::R1);
        let lcts = registry
            .get(&HistKey::located(
                EventClass::Quality,
                ObjectKind::Lcts,
                Variable::LumiSection,
                slot,
            ))
            .unwrap();
        // 3 raw LCTs, capped to 2 fills
        assert_eq!(lcts.contents[50], 2.0);
        let chambers = registry
            .get(&HistKey::located(
                EventClass::Quality,
                ObjectKind::Chambers,
                Variable::LumiSection,
                slot,
            ))
            .unwrap();
        assert_eq!(chambers.contents[50], 1.0);
    }

    #[test]
    fn test_fanout_reaches_all_twelve_slots() {
        let mut aggregator = Aggregator::new(reference_lumi());
        aggregator.process_event(&reference_event()).unwrap();
        let registry = aggregator.registry();

        let slots = Location::fanout(Endcap::Plus, 1, 1);
        assert_eq!(slots.len(), 12);
        for slot in slots {
            let chambers = registry
                .get(&HistKey::located(
                    EventClass::All,
                    ObjectKind::Chambers,
                    Variable::Pileup,
                    slot,
                ))
                .unwrap();
            assert_eq!(chambers.contents[30], 1.0, "missing fill in {slot:?}");
        }
        // Nothing leaked into the minus endcap
        let minus = registry
            .get(&HistKey::located(
                EventClass::All,
                ObjectKind::Chambers,
                Variable::Pileup,
                Location::new(Endcap::Minus, Station::S1, Ring::R1),
            ))
            .unwrap();
        assert_eq!(minus.entries, 0);
    }

    #[test]
    fn test_bx0_family_restricted_to_in_time_hits() {
        let mut aggregator = Aggregator::new(reference_lumi());
        aggregator.process_event(&reference_event()).unwrap();
        let registry = aggregator.registry();

        let slot = Location::new(Endcap::Plus, Station::S1, Ring::R1);
        // 2 of the 3 LCTs are at BX 0
        let lcts_bx0 = registry
            .get(&HistKey::located(
                EventClass::All,
                ObjectKind::LctsBx0,
                Variable::LumiSection,
                slot,
            ))
            .unwrap();
        assert_eq!(lcts_bx0.contents[50], 2.0);
        let chambers_bx0 = registry
            .get(&HistKey::located(
                EventClass::All,
                ObjectKind::ChambersBx0,
                Variable::LumiSection,
                slot,
            ))
            .unwrap();
        assert_eq!(chambers_bx0.contents[50], 1.0);
    }

    #[test]
    fn test_track_fills() {
        let mut aggregator = Aggregator::new(reference_lumi());
        aggregator.process_event(&reference_event()).unwrap();
        let registry = aggregator.registry();

        let pt = registry
            .get(&HistKey::distribution(EventClass::Quality, ObjectKind::TrackPt))
            .unwrap();
        assert_eq!(pt.contents[25], 1.0);
        let nlcts = registry
            .get(&HistKey::distribution(EventClass::All, ObjectKind::TrackLcts))
            .unwrap();
        assert_eq!(nlcts.contents[4], 1.0);
        let tracks_by_pu = registry
            .get(&HistKey::located(
                EventClass::All,
                ObjectKind::Tracks,
                Variable::Pileup,
                SUMMARY_LOCATION,
            ))
            .unwrap();
        assert_eq!(tracks_by_pu.contents[30], 1.0);
    }
}

use std::fmt::Write;

/// Endcap side of the detector, or both combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endcap {
    Plus,
    Minus,
    Both,
}

/// CSC station, or the all-station summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Station {
    S1,
    S2,
    S3,
    S4,
    All,
}

/// CSC ring. ME1/1 is split into its 1a and 1b regions, which only exist at
/// station 1. Hit data labels ME1/1a as "ring 4"; that label never appears
/// here, it is folded into `R1B` by the alias table below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ring {
    R1,
    R1A,
    R1B,
    R2,
    R3,
    All,
}

/// One slot in the detector location taxonomy: endcap x station x ring,
/// wildcards included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub endcap: Endcap,
    pub station: Station,
    pub ring: Ring,
}

/// The summary slot: both endcaps, all stations, all rings.
pub const SUMMARY_LOCATION: Location = Location {
    endcap: Endcap::Both,
    station: Station::All,
    ring: Ring::All,
};

impl Endcap {
    fn id(&self) -> &'static str {
        match self {
            Endcap::Plus => "p",
            Endcap::Minus => "m",
            Endcap::Both => "pm",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Endcap::Plus => "Endcap +",
            Endcap::Minus => "Endcap -",
            Endcap::Both => "Both Endcaps",
        }
    }
}

impl Station {
    /// Station label as it appears in hit data.
    pub fn from_raw(raw: u8) -> Option<Station> {
        match raw {
            1 => Some(Station::S1),
            2 => Some(Station::S2),
            3 => Some(Station::S3),
            4 => Some(Station::S4),
            _ => None,
        }
    }

    fn id(&self) -> &'static str {
        match self {
            Station::S1 => "s1",
            Station::S2 => "s2",
            Station::S3 => "s3",
            Station::S4 => "s4",
            Station::All => "sall",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Station::S1 => "Station 1",
            Station::S2 => "Station 2",
            Station::S3 => "Station 3",
            Station::S4 => "Station 4",
            Station::All => "All Stations",
        }
    }
}

impl Ring {
    fn id(&self) -> &'static str {
        match self {
            Ring::R1 => "r1",
            Ring::R1A => "r1a",
            Ring::R1B => "r1b",
            Ring::R2 => "r2",
            Ring::R3 => "r3",
            Ring::All => "rall",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Ring::R1 => "Ring 1",
            Ring::R1A => "Ring 1a",
            Ring::R1B => "Ring 1b",
            Ring::R2 => "Ring 2",
            Ring::R3 => "Ring 3",
            Ring::All => "All Rings",
        }
    }
}

/// Rings that exist for a given station slot. The split rings 1a/1b and
/// ring 3 only exist at station 1, so only S1 and the all-station summary
/// carry them.
fn rings_for(station: Station) -> &'static [Ring] {
    match station {
        Station::S1 | Station::All => &[
            Ring::R1,
            Ring::R1A,
            Ring::R1B,
            Ring::R2,
            Ring::R3,
            Ring::All,
        ],
        _ => &[Ring::R1, Ring::R2, Ring::All],
    }
}

/// Taxonomy rings a raw (station, ring) hit label contributes to.
///
/// ME1/1 hits (station 1 ring 1) cover both the combined ring 1 and the 1b
/// region; the data labels the 1a region as "ring 4", which contributes to
/// ring 1 and 1a. Everything else maps one-to-one. Labels outside the
/// detector geometry contribute nowhere.
fn ring_aliases(station: u8, ring: u8) -> &'static [Ring] {
    match (station, ring) {
        (1, 1) => &[Ring::R1, Ring::R1A],
        (1, 4) => &[Ring::R1, Ring::R1B],
        (_, 1) => &[Ring::R1],
        (_, 2) => &[Ring::R2],
        (1, 3) => &[Ring::R3],
        _ => &[],
    }
}

impl Location {
    pub fn new(endcap: Endcap, station: Station, ring: Ring) -> Self {
        Self {
            endcap,
            station,
            ring,
        }
    }

    /// Every valid taxonomy slot, wildcards included. 21 slots per endcap
    /// value, 63 total.
    pub fn enumerate_all() -> Vec<Location> {
        let mut locations = Vec::new();
        for endcap in [Endcap::Plus, Endcap::Minus, Endcap::Both] {
            for station in [
                Station::S1,
                Station::S2,
                Station::S3,
                Station::S4,
                Station::All,
            ] {
                for ring in rings_for(station) {
                    locations.push(Location::new(endcap, station, *ring));
                }
            }
        }
        locations
    }

    /// Machine identifier, e.g. `p_s1_r1a`. Injective over the taxonomy.
    pub fn canonical_id(&self) -> String {
        format!(
            "{}_{}_{}",
            self.endcap.id(),
            self.station.id(),
            self.ring.id()
        )
    }

    /// Human-facing title fragment, e.g. `Endcap +, Station 1, Ring 1a`.
    pub fn display_name(&self) -> String {
        let mut name = String::new();
        write!(
            name,
            "{}, {}, {}",
            self.endcap.label(),
            self.station.label(),
            self.ring.label()
        )
        .unwrap();
        name
    }

    /// All taxonomy slots a concrete chamber observation fans out to: the
    /// chamber's own endcap plus the both-endcap summary, its station plus
    /// the all-station summary, and its ring aliases plus the all-ring
    /// summary. A station 1 ring 1 observation lands in 2 x 2 x 3 = 12
    /// slots.
    pub fn fanout(endcap: Endcap, raw_station: u8, raw_ring: u8) -> Vec<Location> {
        let aliases = ring_aliases(raw_station, raw_ring);
        let Some(station) = Station::from_raw(raw_station) else {
            return Vec::new();
        };
        let mut locations = Vec::with_capacity(4 * (aliases.len() + 1));
        for e in [endcap, Endcap::Both] {
            for s in [station, Station::All] {
                for r in aliases.iter().chain(std::iter::once(&Ring::All)) {
                    locations.push(Location::new(e, s, *r));
                }
            }
        }
        locations
    }
}

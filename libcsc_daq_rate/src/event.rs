use serde::{Deserialize, Serialize};

use super::location::Endcap;

/// One LCT reported by the trigger electronics, as flattened into the
/// ntuple-style event records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hit {
    /// +1 for the plus endcap, anything else is minus.
    pub endcap: i8,
    pub station: u8,
    /// Raw ring label; station 1 uses label 4 for the ME1/1a region.
    pub ring: u8,
    pub chamber: u8,
    /// Bunch crossing relative to the nominal crossing.
    pub bx: i32,
    pub is_csc: bool,
    pub is_neighbor: bool,
}

impl Hit {
    pub fn endcap_side(&self) -> Endcap {
        if self.endcap == 1 {
            Endcap::Plus
        } else {
            Endcap::Minus
        }
    }
}

/// One reconstructed muon track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// Transverse momentum in GeV.
    pub pt: f64,
    pub n_hits: u32,
    /// Indices into the event's hit list.
    pub hit_indices: Vec<usize>,
}

/// One detector event record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub run: u32,
    pub lumi_section: u32,
    pub hits: Vec<Hit>,
    pub tracks: Vec<Track>,
}

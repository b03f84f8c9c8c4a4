//! # csc_daq_rate
//!
//! csc_daq_rate studies the DAQ data rate of the CMS cathode strip chambers
//! (CSC) through the LCT trigger primitives reported by the front-end
//! electronics. It runs a single batch pass over ntuple-style event records,
//! joins each event to its beam conditions (average pileup and delivered
//! luminosity per lumi section, as exported by brilcalc), and accumulates a
//! large family of occupancy histograms sliced by event selection, detector
//! location, and beam variable. After the event loop it derives per-event
//! rate histograms and fits everything to a line.
//!
//! ## Inputs
//!
//! Two kinds of input files are consumed:
//!
//! - Event files: JSON-lines exports of the flat ntuples, one event record
//!   per line with the run number, lumi section, per-hit fields (endcap,
//!   station, ring, chamber, bunch crossing, CSC and neighbor flags), and
//!   per-track fields (pT, hit count, hit indices). Several files are
//!   processed in order as one continuous sequence.
//! - Lumi info files: brilcalc CSV exports keyed by (run, lumi section).
//!   Every run appearing in the event files must be covered; an event whose
//!   lumi section has no beam-condition row is a hard error, since rates
//!   against unknown beam conditions are meaningless.
//!
//! ## Configuration
//!
//! The analysis is driven by a YAML configuration file:
//!
//! ```yml
//! dataset: zerobias
//! data_files:
//! - data/NTuple_ZeroBias1_Run_306091.jsonl
//! lumi_files:
//! - lumi_info/LumiInfo_306091.csv
//! output_dir: out
//! max_events: 1000000
//! ```
//!
//! The CLI can emit a template with `csc_daq_rate_cli new -p config.yml`.
//!
//! ## Event selection
//!
//! Every event is aggregated under the `all` class, plus `quality` or
//! `noquality` depending on whether any track passes the pT threshold with
//! an accepted station-coverage pattern (see [`classify`]).
//!
//! ## Location taxonomy
//!
//! Chamber observations fan out over the endcap x station x ring taxonomy,
//! wildcards included, so every summary histogram is filled directly during
//! the event loop. The ME1/1 split into its 1a/1b regions is handled by a
//! fixed alias table (see [`location`]).
//!
//! ## Output
//!
//! One HDF5 file, named `plots_<dataset>_<max_events>.h5`:
//!
//! ```text
//! plots_zerobias_1000000.h5 - dataset, max_events, events_processed, version
//! |---- primitive
//! |    |---- all
//! |    |    |---- all_events_by_ls(dset)
//! |    |    |---- all_lcts_by_pu_in_p_s1_r1a(dset)
//! |    |    |---- ...
//! |    |---- quality
//! |    |---- noquality
//! |---- derived
//! |    |---- all
//! |    |    |---- all_chambers_per_event_by_pu(dset)
//! |    |    |---- all_chambers_per_event_by_pu_in_pm_sall_rall(dset)
//! |    |    |---- ...
//! |    |---- quality
//! |    |---- noquality
//! ```
//!
//! Each dataset is 2 x n_bins (bin contents and sum of squared weights)
//! with the axis definition, entry counts, under/overflow, and linear fit
//! parameters stored as attributes.
pub mod aggregate;
pub mod classify;
pub mod config;
pub mod error;
pub mod event;
pub mod event_stack;
pub mod hdf_writer;
pub mod histogram;
pub mod location;
pub mod lumi;
pub mod post;
pub mod process;
pub mod registry;
pub mod worker_status;

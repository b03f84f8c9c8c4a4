use std::fs::File;
use std::io::Read;
use std::path::Path;

use fxhash::FxHashMap;

use super::error::LumiInfoError;

// Required column names in a brilcalc export. The run and ls columns hold
// compound "a:b" values; only the first component is meaningful here.
const RUN_FIELD: &str = "run:fill";
const LS_FIELD: &str = "ls";
const PILEUP_FIELD: &str = "avgpu";
const DELIVERED_FIELD: &str = "delivered(1e30/cm2s)";

/// Beam conditions for one (run, lumi section), as measured by brilcalc.
///
/// `delivered_lumi` is kept in the raw file units (1e30 cm^-2 s^-1); unit
/// conversion for plotting happens in the aggregation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LumiRecord {
    pub avg_pileup: f64,
    pub delivered_lumi: f64,
}

/// Lookup table of beam conditions keyed by (run, lumi section).
///
/// Loaded from one or more brilcalc CSV exports. The join against event data
/// is exact-match only; an event whose (run, LS) is absent from the table is
/// a hard error, because occupancy rates are meaningless without the real
/// beam conditions. Loading the same key twice is last-write-wins.
#[derive(Debug, Clone, Default)]
pub struct LumiTable {
    table: FxHashMap<(u32, u32), LumiRecord>,
}

impl LumiTable {
    /// Load a brilcalc CSV file into the table, cumulatively.
    pub fn load_file(&mut self, path: &Path) -> Result<(), LumiInfoError> {
        if !path.exists() {
            return Err(LumiInfoError::BadFilePath(path.to_path_buf()));
        }
        let mut contents = String::new();
        File::open(path)?.read_to_string(&mut contents)?;
        self.load_from_str(&contents)
    }

    /// Parse brilcalc CSV text into the table.
    ///
    /// The format carries a two-row header: a tag row (discarded) and a
    /// field-name row whose first name is prefixed with '#'. Data rows follow
    /// until end of text or until a row starting with '#' (brilcalc appends a
    /// commented summary block at the bottom).
    pub fn load_from_str(&mut self, contents: &str) -> Result<(), LumiInfoError> {
        let mut lines = contents.lines();
        lines.next().ok_or(LumiInfoError::MissingHeader)?; // Tag row
        let header_line = lines.next().ok_or(LumiInfoError::MissingHeader)?;

        let header: Vec<&str> = header_line
            .trim_start_matches('#')
            .split_terminator(',')
            .collect();
        let run_col = Self::field_index(&header, RUN_FIELD)?;
        let ls_col = Self::field_index(&header, LS_FIELD)?;
        let pu_col = Self::field_index(&header, PILEUP_FIELD)?;
        let lumi_col = Self::field_index(&header, DELIVERED_FIELD)?;

        for line in lines {
            if line.starts_with('#') {
                break;
            }
            let entries: Vec<&str> = line.split_terminator(',').collect();
            if entries.len() != header.len() {
                return Err(LumiInfoError::FieldCountMismatch(
                    entries.len(),
                    header.len(),
                ));
            }

            let run: u32 = first_component(entries[run_col]).parse()?;
            let ls: u32 = first_component(entries[ls_col]).parse()?;
            let record = LumiRecord {
                avg_pileup: entries[pu_col].parse()?,
                delivered_lumi: entries[lumi_col].parse()?,
            };
            self.table.insert((run, ls), record);
        }

        Ok(())
    }

    /// Exact-match lookup of the beam conditions for an event.
    pub fn lookup(&self, run: u32, lumi_section: u32) -> Result<&LumiRecord, LumiInfoError> {
        self.table
            .get(&(run, lumi_section))
            .ok_or(LumiInfoError::KeyNotFound(run, lumi_section))
    }

    /// Number of (run, LS) keys currently loaded.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    fn field_index(header: &[&str], field: &str) -> Result<usize, LumiInfoError> {
        header
            .iter()
            .position(|h| *h == field)
            .ok_or_else(|| LumiInfoError::MissingField(field.to_string()))
    }
}

/// Take the leading component of a compound "a:b" field.
fn first_component(field: &str) -> &str {
    field.split(':').next().unwrap_or(field)
}

//Unit tests
#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
#Data tag : v1 , Norm tag: None
#run:fill,ls,time,beamstatus,E(GeV),delivered(1e30/cm2s),recorded(1e30/cm2s),avgpu,source
306091:6371,50:50,03/02/18 01:02:03,STABLE BEAMS,6500,300000.0,290000.0,30.0,PXL
306091:6371,51:51,03/02/18 01:02:26,STABLE BEAMS,6500,299000.0,289000.0,29.5,PXL
#Summary:
306091:6371,52:52,03/02/18 01:02:49,STABLE BEAMS,6500,298000.0,288000.0,29.0,PXL
";

    #[test]
    fn test_load_and_lookup() {
        let mut table = LumiTable::default();
        table.load_from_str(SAMPLE).unwrap();
        let record = table.lookup(306091, 50).unwrap();
        assert_eq!(record.avg_pileup, 30.0);
        assert_eq!(record.delivered_lumi, 300000.0);
    }

    #[test]
    fn test_comment_row_terminates_source() {
        let mut table = LumiTable::default();
        table.load_from_str(SAMPLE).unwrap();
        assert_eq!(table.len(), 2);
        // LS 52 sits below the summary marker and must not be loaded
        assert!(table.lookup(306091, 52).is_err());
    }

    #[test]
    fn test_missing_key_is_error() {
        let mut table = LumiTable::default();
        table.load_from_str(SAMPLE).unwrap();
        match table.lookup(306092, 50) {
            Err(LumiInfoError::KeyNotFound(306092, 50)) => (),
            other => panic!("expected KeyNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_reload_is_idempotent() {
        let mut once = LumiTable::default();
        once.load_from_str(SAMPLE).unwrap();
        let mut twice = LumiTable::default();
        twice.load_from_str(SAMPLE).unwrap();
        twice.load_from_str(SAMPLE).unwrap();
        assert_eq!(once.len(), twice.len());
        assert_eq!(
            once.lookup(306091, 51).unwrap(),
            twice.lookup(306091, 51).unwrap()
        );
    }

    #[test]
    fn test_duplicate_key_last_write_wins() {
        let other = "\
#Data tag : v2 , Norm tag: None
#run:fill,ls,delivered(1e30/cm2s),avgpu
306091:6371,50:50,111111.0,11.0
";
        let mut table = LumiTable::default();
        table.load_from_str(SAMPLE).unwrap();
        table.load_from_str(other).unwrap();
        let record = table.lookup(306091, 50).unwrap();
        assert_eq!(record.avg_pileup, 11.0);
        assert_eq!(record.delivered_lumi, 111111.0);
    }

    #[test]
    fn test_field_count_mismatch_fails() {
        let bad = "\
#Data tag : v1
#run:fill,ls,delivered(1e30/cm2s),avgpu
306091:6371,50:50,300000.0
";
        let mut table = LumiTable::default();
        assert!(matches!(
            table.load_from_str(bad),
            Err(LumiInfoError::FieldCountMismatch(3, 4))
        ));
    }
}

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::error::ConfigError;

/// Structure representing the analysis configuration. Contains the dataset
/// selection, input pathing, and the event budget.
/// Configs are serializable and deserializable to YAML using serde and serde_yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Short dataset tag used in the output file name (e.g. "zerobias").
    pub dataset: String,
    /// Event ntuple exports, processed in order as one sequence.
    pub data_files: Vec<PathBuf>,
    /// brilcalc lumi CSVs covering every run in the data files.
    pub lumi_files: Vec<PathBuf>,
    pub output_dir: PathBuf,
    /// Stop after this many events.
    pub max_events: u64,
}

impl Default for Config {
    /// Generate a new Config object. Paths will be empty/invalid
    fn default() -> Self {
        Self {
            dataset: String::from("zerobias"),
            data_files: Vec::new(),
            lumi_files: Vec::new(),
            output_dir: PathBuf::from("out"),
            max_events: 1_000_000,
        }
    }
}

impl Config {
    /// Read the configuration in a YAML file
    /// Returns a Config if successful
    pub fn read_config_file(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Err(ConfigError::BadFilePath(config_path.to_path_buf()));
        }

        let yaml_str = std::fs::read_to_string(config_path)?;

        Ok(serde_yaml::from_str::<Self>(&yaml_str)?)
    }

    /// Output file name derived from the dataset tag and the event budget.
    pub fn get_output_file_name(&self) -> PathBuf {
        self.output_dir
            .join(format!("plots_{}_{}.h5", self.dataset, self.max_events))
    }

    pub fn has_data_files(&self) -> bool {
        !self.data_files.is_empty()
    }

    pub fn has_lumi_files(&self) -> bool {
        !self.lumi_files.is_empty()
    }
}

//Unit tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_file_name() {
        let config = Config::default();
        assert_eq!(
            config.get_output_file_name(),
            PathBuf::from("out/plots_zerobias_1000000.h5")
        );
    }

    #[test]
    fn test_yaml_round_trip() {
        let mut config = Config::default();
        config.data_files.push(PathBuf::from("data/events.jsonl"));
        config.lumi_files.push(PathBuf::from("lumi/LumiInfo_306091.csv"));
        let yaml_str = serde_yaml::to_string(&config).unwrap();
        let back: Config = serde_yaml::from_str(&yaml_str).unwrap();
        assert_eq!(back.dataset, config.dataset);
        assert_eq!(back.data_files, config.data_files);
        assert_eq!(back.max_events, config.max_events);
    }
}

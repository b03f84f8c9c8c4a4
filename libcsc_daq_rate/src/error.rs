use std::path::PathBuf;
use thiserror::Error;

use super::registry::HistKey;
use super::worker_status::WorkerStatus;

#[derive(Debug, Error)]
pub enum LumiInfoError {
    #[error("Could not open lumi info file because {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("LumiInfo failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("LumiInfo failed to parse an integer: {0}")]
    IntParsingError(#[from] std::num::ParseIntError),
    #[error("LumiInfo failed to parse a float: {0}")]
    FloatParsingError(#[from] std::num::ParseFloatError),
    #[error("LumiInfo file is missing the header rows")]
    MissingHeader,
    #[error("LumiInfo header does not contain required field {0}")]
    MissingField(String),
    #[error("LumiInfo row has {0} fields but the header has {1}")]
    FieldCountMismatch(usize, usize),
    #[error("No lumi info was loaded for run {0} lumi section {1}")]
    KeyNotFound(u32, u32),
}

#[derive(Debug, Error)]
pub enum EventFileError {
    #[error("Could not open event file because {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("EventFile failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("EventFile failed to decode an event record: {0}")]
    DecodeError(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum EventStackError {
    #[error("EventStack failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("EventStack was given an empty list of event files")]
    NoFiles,
    #[error("EventStack failed due to EventFile error: {0}")]
    FileError(#[from] EventFileError),
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Histogram fill requested for unregistered key {0:?}; the registry and the taxonomy are out of sync")]
    UnknownKey(HistKey),
}

#[derive(Debug, Error)]
pub enum AggregatorError {
    #[error("Aggregator failed due to lumi info error: {0}")]
    LumiError(#[from] LumiInfoError),
    #[error("Aggregator failed due to registry error: {0}")]
    RegistryError(#[from] RegistryError),
}

#[derive(Debug, Error)]
pub enum HistogramWriterError {
    #[error("HistogramWriter failed due to HDF5 error: {0}")]
    HDF5Error(#[from] hdf5::Error),
    #[error("HistogramWriter failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration as file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Config failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Config failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("Processor failed due to Config error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("Processor failed due to LumiInfo error: {0}")]
    LumiError(#[from] LumiInfoError),
    #[error("Processor failed due to EventStack error: {0}")]
    EventError(#[from] EventStackError),
    #[error("Processor failed due to Aggregator error: {0}")]
    AggregatorError(#[from] AggregatorError),
    #[error("Processor failed due to Registry error: {0}")]
    RegistryError(#[from] RegistryError),
    #[error("Processor failed due to HistogramWriter error: {0}")]
    WriterError(#[from] HistogramWriterError),
    #[error("Processor failed due to Send error: {0}")]
    SendError(#[from] std::sync::mpsc::SendError<WorkerStatus>),
    #[error("Processor failed due to IO error: {0}")]
    IoError(#[from] std::io::Error),
}

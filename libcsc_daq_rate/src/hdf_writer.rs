use hdf5::types::VarLenUnicode;
use hdf5::File;
use ndarray::Array2;
use std::path::Path;
use std::str::FromStr;

use super::error::HistogramWriterError;
use super::histogram::Hist1D;
use super::registry::{EventClass, Registry};

const PRIMITIVE_NAME: &str = "primitive";
const DERIVED_NAME: &str = "derived";
/// This is the version of the output format
const FORMAT_VERSION: &str = "1.0";

/// A simple struct which wraps around the hdf5-rust library.
///
/// Opens an HDF5 file and writes the full histogram family into it, one
/// group per event class under `primitive/` and `derived/`. Each histogram
/// is a 2 x n_bins dataset (row 0 contents, row 1 sum of squared weights)
/// with the axis, bookkeeping, and fit results attached as attributes.
#[derive(Debug)]
pub struct HistogramWriter {
    file_handle: File,
    primitive_group: hdf5::Group,
    derived_group: hdf5::Group,
}

impl HistogramWriter {
    /// Create the writer, opening a file at path and creating the top-level
    /// groups and file attributes.
    pub fn new(path: &Path, dataset: &str, max_events: u64) -> Result<Self, HistogramWriterError> {
        let file_handle = File::create(path)?;
        let version = format!("{}:{}", env!("CARGO_PKG_NAME"), FORMAT_VERSION);

        file_handle
            .new_attr::<VarLenUnicode>()
            .create("dataset")?
            .write_scalar(&VarLenUnicode::from_str(dataset).unwrap())?;
        file_handle
            .new_attr::<u64>()
            .create("max_events")?
            .write_scalar(&max_events)?;
        file_handle.new_attr::<u64>().create("events_processed")?;
        file_handle
            .new_attr::<VarLenUnicode>()
            .create("version")?
            .write_scalar(&VarLenUnicode::from_str(&version).unwrap())?;

        let primitive_group = file_handle.create_group(PRIMITIVE_NAME)?;
        let derived_group = file_handle.create_group(DERIVED_NAME)?;

        Ok(Self {
            file_handle,
            primitive_group,
            derived_group,
        })
    }

    /// Write every primitive histogram in the registry.
    pub fn write_registry(&self, registry: &Registry) -> Result<(), HistogramWriterError> {
        for (key, hist) in registry.iter() {
            let group = self.class_group(&self.primitive_group, key.class)?;
            Self::write_histogram(&group, hist)?;
        }
        Ok(())
    }

    /// Write the derived per-event rate histograms.
    pub fn write_derived(
        &self,
        derived: &[(EventClass, Hist1D)],
    ) -> Result<(), HistogramWriterError> {
        for (class, hist) in derived {
            let group = self.class_group(&self.derived_group, *class)?;
            Self::write_histogram(&group, hist)?;
        }
        Ok(())
    }

    /// Write final bookkeeping and consume the writer.
    pub fn close(self, events_processed: u64) -> Result<(), HistogramWriterError> {
        self.file_handle
            .attr("events_processed")?
            .write_scalar(&events_processed)?;
        log::info!("{} events written to the histogram file.", events_processed);
        Ok(())
    }

    fn class_group(
        &self,
        parent: &hdf5::Group,
        class: EventClass,
    ) -> Result<hdf5::Group, HistogramWriterError> {
        let name = class.id();
        match parent.group(name) {
            Ok(group) => Ok(group),
            Err(_) => Ok(parent.create_group(name)?),
        }
    }

    fn write_histogram(group: &hdf5::Group, hist: &Hist1D) -> Result<(), HistogramWriterError> {
        let mut data = Array2::<f64>::zeros([2, hist.n_bins]);
        for idx in 0..hist.n_bins {
            data[[0, idx]] = hist.contents[idx];
            data[[1, idx]] = hist.sumw2[idx];
        }
        let dset = group
            .new_dataset_builder()
            .with_data(&data)
            .create(hist.name.as_str())?;

        dset.new_attr::<VarLenUnicode>()
            .create("title")?
            .write_scalar(&VarLenUnicode::from_str(&hist.title).unwrap())?;
        dset.new_attr::<u64>()
            .create("n_bins")?
            .write_scalar(&(hist.n_bins as u64))?;
        dset.new_attr::<f64>()
            .create("x_min")?
            .write_scalar(&hist.x_min)?;
        dset.new_attr::<f64>()
            .create("x_max")?
            .write_scalar(&hist.x_max)?;
        dset.new_attr::<u64>()
            .create("entries")?
            .write_scalar(&hist.entries)?;
        dset.new_attr::<f64>()
            .create("underflow")?
            .write_scalar(&hist.underflow)?;
        dset.new_attr::<f64>()
            .create("overflow")?
            .write_scalar(&hist.overflow)?;
        if let Some(fit) = &hist.fit {
            dset.new_attr::<f64>()
                .create("fit_intercept")?
                .write_scalar(&fit.intercept)?;
            dset.new_attr::<f64>()
                .create("fit_slope")?
                .write_scalar(&fit.slope)?;
        }
        Ok(())
    }
}

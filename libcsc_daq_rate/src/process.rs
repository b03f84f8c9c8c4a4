use std::sync::mpsc::Sender;

use super::aggregate::Aggregator;
use super::config::Config;
use super::error::ProcessorError;
use super::event_stack::EventStack;
use super::hdf_writer::HistogramWriter;
use super::lumi::LumiTable;
use super::post;
use super::worker_status::WorkerStatus;

/// How often to report progress, in events.
const REPORT_INTERVAL: u64 = 1000;

/// The main loop of the analysis.
///
/// Takes a config (and a progress channel), runs the single batch pass over
/// the event sequence, derives the rate histograms, and writes the output
/// file.
pub fn process(config: Config, tx: Sender<WorkerStatus>) -> Result<(), ProcessorError> {
    let mut lumi = LumiTable::default();
    for path in &config.lumi_files {
        log::info!("Loading lumi info from {}...", path.to_string_lossy());
        lumi.load_file(path)?;
    }
    log::info!("Loaded beam conditions for {} lumi sections.", lumi.len());

    let mut event_stack = EventStack::new(&config.data_files)?;
    let mut aggregator = Aggregator::new(lumi);

    log::info!("Processing events...");
    let mut counter: u64 = 0;
    tx.send(WorkerStatus::new(0.0, counter))?;
    loop {
        if counter >= config.max_events {
            log::info!("Reached the event budget of {} events.", config.max_events);
            break;
        }
        let Some(event) = event_stack.get_next_event()? else {
            log::info!("Event sequence exhausted after {} events.", counter);
            break;
        };
        aggregator.process_event(&event)?;
        counter += 1;
        if counter % REPORT_INTERVAL == 0 {
            log::info!("Processed {} events", counter);
            tx.send(WorkerStatus::new(
                counter as f32 / config.max_events as f32,
                counter,
            ))?;
        }
    }

    // All raw fills are done; safe to derive and fit
    let mut registry = aggregator.into_registry();
    log::info!("Deriving per-event rate histograms...");
    let mut derived = post::derive_rates(&registry)?;
    log::info!("Fitting {} histograms...", registry.len() + derived.len());
    post::fit_all(&mut registry, &mut derived);

    std::fs::create_dir_all(&config.output_dir)?;
    let output_path = config.get_output_file_name();
    log::info!("Writing histograms to {}...", output_path.to_string_lossy());
    let writer = HistogramWriter::new(&output_path, &config.dataset, config.max_events)?;
    writer.write_registry(&registry)?;
    writer.write_derived(&derived)?;
    writer.close(counter)?;

    tx.send(WorkerStatus::new(1.0, counter))?;
    Ok(())
}

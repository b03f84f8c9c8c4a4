use clap::{Arg, Command};
use indicatif::{MultiProgress, ProgressBar};
use indicatif_log_bridge::LogWrapper;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;

use libcsc_daq_rate::config::Config;
use libcsc_daq_rate::process::process;

fn make_template_config(path: &Path) {
    let config = Config::default();
    let yaml_str = serde_yaml::to_string(&config).unwrap();
    let mut file = File::create(path).expect("Could create template config file!");
    file.write_all(yaml_str.as_bytes())
        .expect("Failed to write yaml data to file!");
}

fn main() {
    // Create a cli
    let matches = Command::new("csc_daq_rate_cli")
        .arg_required_else_help(true)
        .subcommand(Command::new("new").about("Make a template configuration yaml file"))
        .arg(
            Arg::new("path")
                .short('p')
                .long("path")
                .help("Path to the configuration file"),
        )
        .arg(
            Arg::new("max-events")
                .long("max-events")
                .value_parser(clap::value_parser!(u64))
                .help("Override the event budget from the configuration"),
        )
        .get_matches();

    // Initialize feedback
    let logger = simplelog::TermLogger::new(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );

    let pb_manager = MultiProgress::new();

    LogWrapper::new(pb_manager.clone(), logger)
        .try_init()
        .expect("Could not create logging/progress!");

    // Parse the cli
    let config_path = PathBuf::from(matches.get_one::<String>("path").expect("We require args"));

    if let Some(("new", _)) = matches.subcommand() {
        log::info!(
            "Making a template config at {}...",
            config_path.to_string_lossy()
        );

        make_template_config(&config_path);
        log::info!("Done.");
        return;
    }

    // Load our config
    log::info!("Loading config from {}...", config_path.to_string_lossy());
    let mut config = match Config::read_config_file(&config_path) {
        Ok(c) => c,
        Err(e) => {
            log::error!("{e}");
            return;
        }
    };
    if let Some(max_events) = matches.get_one::<u64>("max-events") {
        config.max_events = *max_events;
    }
    if !config.has_data_files() || !config.has_lumi_files() {
        log::error!("The config must list at least one data file and one lumi info file.");
        return;
    }
    log::info!("Config successfully loaded.");
    log::info!("Dataset: {}", config.dataset);
    log::info!("Event files:");
    for path in &config.data_files {
        log::info!("\t{}", path.to_string_lossy());
    }
    log::info!("Lumi info files:");
    for path in &config.lumi_files {
        log::info!("\t{}", path.to_string_lossy());
    }
    log::info!("Max events: {}", config.max_events);
    log::info!(
        "Output file: {}",
        config.get_output_file_name().to_string_lossy()
    );

    // Setup the progress bar
    let pb = pb_manager.add(ProgressBar::new(100));
    let (tx, rx) = channel();
    // Spawn the task!
    let handle = std::thread::spawn(|| process(config, tx));

    loop {
        // No UI here, so sleep for ~ 1 sec between updates
        std::thread::sleep(std::time::Duration::from_secs(1));
        if let Some(status) = rx.try_iter().last() {
            pb.set_position((status.progress * 100.0) as u64);
        }

        if handle.is_finished() {
            match handle.join() {
                Ok(result) => match result {
                    Ok(_) => log::info!("Successfully filled the rate histograms!"),
                    Err(e) => log::error!("Processing failed with error: {e}"),
                },
                Err(_) => log::error!("Failed to join processing task!"),
            }
            break;
        }
    }

    pb.finish();

    log::info!("Done.");
}

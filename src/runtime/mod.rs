use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{error, info, warn};

use crate::cli;
use crate::config::Settings;
use crate::error::RecorderError;

mod event_loop;
mod settings;
mod startup;

pub fn run() -> Result<(), RecorderError> {
    let matches = cli::build_cli().get_matches();
    let (mut settings, config_warning) = settings::load_settings();
    let rejected_root = cli::apply_overrides(&mut settings, &matches);

    if matches.get_flag("print-config") {
        if let Some(msg) = &config_warning {
            eprintln!("mrec: {msg}");
        }
        match toml::to_string(&settings) {
            Ok(rendered) => print!("{rendered}"),
            Err(e) => eprintln!("mrec: cannot render config: {e}"),
        }
        return Ok(());
    }

    // Held until return so the background log writer flushes.
    let _log_guard = crate::logging::init(&settings.logging);
    if let Some(msg) = config_warning {
        warn!("{msg}");
    }
    if let Some(path) = rejected_root {
        warn!(
            path = %path.display(),
            fallback = %settings.recorder.music_root.display(),
            "music root does not exist, ignoring it"
        );
    }

    let result = record(&settings);
    match &result {
        Ok(()) => info!("mrec stopped"),
        Err(e) => error!(error = %e, "mrec stopped"),
    }
    result
}

fn record(settings: &Settings) -> Result<(), RecorderError> {
    info!(
        music_root = %settings.recorder.music_root.display(),
        backup_root = ?settings.recorder.backup_root,
        encoder = %settings.encoder.program,
        "mrec starting"
    );

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || shutdown.store(true, Ordering::Relaxed))?;
    }

    let startup::Pipeline {
        mut segmenter,
        events,
        mut threads,
        encode,
    } = startup::start(settings, &shutdown)?;

    let result = event_loop::run(&mut segmenter, &events, &mut threads, &shutdown);

    // Closing the queue lets the worker finish what is already in it.
    segmenter.finish();
    info!("waiting for queued tracks to finish encoding");
    if encode.join().is_err() {
        return result.and(Err(RecorderError::ThreadPanicked("encode")));
    }
    result
}

use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};

use crate::config::Settings;

pub fn build_cli() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .about("Record whatever the media player plays into tagged, per-track files")
        .long_about(
            "Reads raw PCM from stdin (e.g. `parec -d <sink>.monitor | mrec`), splits it \
             into tracks using the player's MPRIS metadata and encodes each finished track \
             into <music root>/<album artist>/<album>/.",
        )
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("music_root")
                .value_name("MUSIC_ROOT")
                .help("Directory recordings are written into (used only if it exists)")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("backup-dir")
                .short('b')
                .long("backup-dir")
                .value_name("DIR")
                .help("Copy every recording into this directory as well")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("no-backup")
                .long("no-backup")
                .help("Disable the backup copy even if one is configured")
                .action(ArgAction::SetTrue)
                .conflicts_with("backup-dir"),
        )
        .arg(
            Arg::new("broker")
                .long("broker")
                .value_name("HOST")
                .help("MQTT broker delivering record/stop commands"),
        )
        .arg(
            Arg::new("player")
                .short('p')
                .long("player")
                .value_name("NAME")
                .help("Prefer this MPRIS player (e.g. spotify)"),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .value_name("PATH")
                .help("Append logs to this file instead of stderr")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("print-config")
                .long("print-config")
                .help("Print the effective configuration as TOML and exit")
                .action(ArgAction::SetTrue),
        )
}

/// Apply command-line overrides on top of loaded settings.
///
/// Returns the positional music root when it was given but does not exist,
/// so the caller can report it once logging is up.
pub fn apply_overrides(settings: &mut Settings, matches: &ArgMatches) -> Option<PathBuf> {
    let mut rejected_root = None;
    if let Some(root) = matches.get_one::<PathBuf>("music_root") {
        if root.is_dir() {
            settings.recorder.music_root = root.clone();
        } else {
            rejected_root = Some(root.clone());
        }
    }
    if let Some(dir) = matches.get_one::<PathBuf>("backup-dir") {
        settings.recorder.backup_root = Some(dir.clone());
    }
    if matches.get_flag("no-backup") {
        settings.recorder.backup_root = None;
    }
    if let Some(broker) = matches.get_one::<String>("broker") {
        settings.control.broker = Some(broker.clone());
    }
    if let Some(player) = matches.get_one::<String>("player") {
        settings.player.name = Some(player.clone());
    }
    if let Some(file) = matches.get_one::<PathBuf>("log-file") {
        settings.logging.file = Some(file.clone());
    }
    rejected_root
}

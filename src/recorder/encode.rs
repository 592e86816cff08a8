use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc::{Receiver, SyncSender, sync_channel};
use std::thread::{self, JoinHandle};

use tracing::{debug, error, info, warn};

use crate::config::EncoderSettings;
use crate::error::{EncodeError, RecorderError};
use crate::track::{MusicLibrary, Retirement, Track, TrackInfo};

/// Bounded hand-off between the segmenter and the encode worker.
///
/// `send` blocks once `capacity` tracks are waiting.
pub fn encode_queue(capacity: usize) -> (SyncSender<Track>, Receiver<Track>) {
    sync_channel(capacity)
}

/// Turns a finished track's raw audio into a file at `dest`.
pub trait Encoder: Send {
    fn encode(&self, data: &[u8], info: &TrackInfo, dest: &Path) -> Result<(), EncodeError>;
}

/// Runs `oggenc` (or a compatible program) with raw PCM on stdin.
#[derive(Clone, Debug)]
pub struct OggEnc {
    settings: EncoderSettings,
}

impl OggEnc {
    pub fn new(settings: EncoderSettings) -> Self {
        Self { settings }
    }

    fn command(&self, info: &TrackInfo, dest: &Path) -> Command {
        let s = &self.settings;
        let mut cmd = Command::new(&s.program);
        cmd.arg("-r")
            .arg(format!("--raw-rate={}", s.raw_rate))
            .arg(format!("--raw-chan={}", s.raw_channels))
            .arg(format!("--raw-bits={}", s.raw_bits))
            .arg("-q")
            .arg(s.quality.to_string())
            .arg("-a")
            .arg(&info.artist)
            .arg("-t")
            .arg(&info.title)
            .arg("-l")
            .arg(&info.album)
            .arg("-N")
            .arg(info.track_number.to_string())
            .arg("-c")
            .arg(format!("ALBUMARTIST={}", info.album_artist))
            .arg("-o")
            .arg(dest)
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd
    }
}

impl Encoder for OggEnc {
    fn encode(&self, data: &[u8], info: &TrackInfo, dest: &Path) -> Result<(), EncodeError> {
        let mut child = self
            .command(info, dest)
            .spawn()
            .map_err(|source| EncodeError::Spawn {
                program: self.settings.program.clone(),
                source,
            })?;

        let stdin = child.stdin.take();
        // Feed stdin from a second thread while this one collects stderr, so
        // neither pipe can fill up and deadlock the encoder.
        let (fed, output) = thread::scope(|scope| {
            let feeder = scope.spawn(move || -> std::io::Result<()> {
                if let Some(mut stdin) = stdin {
                    stdin.write_all(data)?;
                }
                Ok(())
            });
            let output = child.wait_with_output();
            let fed = feeder
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")));
            (fed, output)
        });

        let output = output.map_err(EncodeError::Feed)?;
        if !output.status.success() {
            return Err(EncodeError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        fed.map_err(EncodeError::Feed)
    }
}

/// Create `dir` if it is missing. Another process creating it first is fine.
fn ensure_dir(dir: &Path) -> Result<(), EncodeError> {
    match fs::create_dir(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
        Err(source) => Err(EncodeError::Directory {
            path: dir.to_path_buf(),
            source,
        }),
    }
}

/// Ensure `<root>/<albumArtist>/<album>` exists, one level at a time.
pub fn ensure_album_dirs(root: &Path, info: &TrackInfo) -> Result<PathBuf, EncodeError> {
    let artist_dir = root.join(&info.album_artist);
    ensure_dir(&artist_dir)?;
    let album_dir = artist_dir.join(&info.album);
    ensure_dir(&album_dir)?;
    Ok(album_dir)
}

/// Encodes finished tracks into the music library and mirrors them to an
/// optional backup root.
pub struct EncodeWorker<E> {
    encoder: E,
    library: MusicLibrary,
    backup_root: Option<PathBuf>,
}

impl<E: Encoder> EncodeWorker<E> {
    pub fn new(encoder: E, library: MusicLibrary, backup_root: Option<PathBuf>) -> Self {
        Self {
            encoder,
            library,
            backup_root,
        }
    }

    /// Process tracks until every sender is dropped, then return.
    pub fn run(&self, queue: Receiver<Track>) {
        for track in queue.iter() {
            let how = match self.process(&track) {
                Ok(()) => Retirement::Encoded,
                Err(e) => {
                    let title = track.info().map(|i| i.title.as_str()).unwrap_or_default();
                    error!(error = %e, title, "failed to record track");
                    Retirement::EncodeFailed
                }
            };
            track.retire(how);
        }
        debug!("encode queue closed, worker exiting");
    }

    /// Encode one track, then back it up if configured.
    pub fn process(&self, track: &Track) -> Result<(), EncodeError> {
        let info = track.info().ok_or(EncodeError::NoMetadata)?;
        let dest = self.library.destination_for(&info.relative_path);

        ensure_album_dirs(self.library.root(), info)?;
        info!(title = %info.title, path = %dest.display(), bytes = track.len(), "encoding track");

        if let Err(e) = self.encoder.encode(track.data(), info, &dest) {
            // A partial file would make the next run think this track is done.
            if let Err(rm) = fs::remove_file(&dest) {
                if rm.kind() != ErrorKind::NotFound {
                    warn!(error = %rm, path = %dest.display(), "failed to remove partial output");
                }
            }
            return Err(e);
        }

        if let Some(backup_root) = &self.backup_root {
            ensure_album_dirs(backup_root, info)?;
            let copy = backup_root.join(&info.relative_path);
            fs::copy(&dest, &copy).map_err(|source| EncodeError::Backup {
                from: dest.clone(),
                to: copy.clone(),
                source,
            })?;
            debug!(path = %copy.display(), "backup written");
        }

        Ok(())
    }
}

/// Run an [`EncodeWorker`] on its own thread.
pub fn spawn_encode_worker<E>(
    worker: EncodeWorker<E>,
    queue: Receiver<Track>,
) -> Result<JoinHandle<()>, RecorderError>
where
    E: Encoder + 'static,
{
    thread::Builder::new()
        .name("encode".to_string())
        .spawn(move || worker.run(queue))
        .map_err(|source| RecorderError::Spawn {
            name: "encode",
            source,
        })
}

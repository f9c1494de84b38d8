use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dcp_types::TransparencyLogEntry;
use fs2::FileExt;
use tracing::{debug, warn};

use crate::config::SyncMode;
use crate::error::{LogError, Result};
use crate::traits::LogStore;

/// Header size: 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: u64 = 8;

/// Upper bound on one frame's payload; anything larger is a corrupt header.
const MAX_PAYLOAD: u32 = 1 << 20;

struct StoreState {
    file: File,
    /// Start offset of each entry's frame, by log index.
    offsets: Vec<u64>,
    /// Offset just past the last valid frame.
    end: u64,
}

/// Append-only file store.
///
/// On-disk format, one frame per entry:
/// ```text
/// [4 bytes: payload length (little-endian u32)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload (bincode-serialized TransparencyLogEntry)]
/// ```
///
/// The store holds an exclusive lock on the file for its whole lifetime, so
/// a second store (in this process or another) cannot open the same log.
///
/// Opening the store scans every frame. A torn tail (a frame cut short at
/// end of file, or a bad CRC on the final frame) left by a crash is cut off.
/// Earlier frames that fail their CRC are skipped and surface as a gap in
/// the log indexes. A broken header before the tail is never cut: open
/// fails with `IntegrityViolation` and the file is left as it was.
pub struct FileLogStore {
    path: PathBuf,
    state: Mutex<StoreState>,
    sync_mode: SyncMode,
}

impl FileLogStore {
    /// Open (or create) the store at `path`.
    pub fn open(path: &Path, sync_mode: SyncMode) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(path)?;
        file.try_lock_exclusive().map_err(|e| LogError::Locked {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let (offsets, end) = scan(&mut file)?;
        let file_len = file.metadata()?.len();
        if end < file_len {
            warn!(
                path = %path.display(),
                valid_len = end,
                file_len,
                "discarding torn tail of log file"
            );
            file.set_len(end)?;
            file.sync_all()?;
        }
        debug!(path = %path.display(), entries = offsets.len(), "log file opened");

        Ok(Self {
            path: path.to_path_buf(),
            state: Mutex::new(StoreState { file, offsets, end }),
            sync_mode,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogStore for FileLogStore {
    fn append(&self, entry: &TransparencyLogEntry) -> Result<()> {
        let payload =
            bincode::serialize(entry).map_err(|e| LogError::Serialization(e.to_string()))?;
        let length = u32::try_from(payload.len())
            .ok()
            .filter(|len| *len <= MAX_PAYLOAD)
            .ok_or_else(|| LogError::Store(format!("entry too large: {} bytes", payload.len())))?;

        let mut frame = Vec::with_capacity(HEADER_SIZE as usize + payload.len());
        frame.extend_from_slice(&length.to_le_bytes());
        frame.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
        frame.extend_from_slice(&payload);

        let mut state = self.state.lock().map_err(|_| LogError::poisoned("file store"))?;
        let start = state.end;

        let written = write_frame(&mut state.file, start, &frame, self.sync_mode);
        if let Err(e) = written {
            // Roll back any partial frame so the file ends at the last entry.
            if let Err(rollback) = state.file.set_len(start) {
                warn!(offset = start, error = %rollback, "failed to roll back partial append");
            }
            return Err(e);
        }

        state.offsets.push(start);
        state.end = start + frame.len() as u64;
        debug!(index = entry.index, offset = start, len = frame.len(), "log file append");
        Ok(())
    }

    fn get(&self, index: u64) -> Result<Option<TransparencyLogEntry>> {
        let mut state = self.state.lock().map_err(|_| LogError::poisoned("file store"))?;
        let Some(offset) = usize::try_from(index)
            .ok()
            .and_then(|i| state.offsets.get(i).copied())
        else {
            return Ok(None);
        };
        read_frame(&mut state.file, offset).map(Some)
    }

    fn len(&self) -> Result<u64> {
        let state = self.state.lock().map_err(|_| LogError::poisoned("file store"))?;
        Ok(state.offsets.len() as u64)
    }

    fn read_all(&self) -> Result<Vec<TransparencyLogEntry>> {
        let mut state = self.state.lock().map_err(|_| LogError::poisoned("file store"))?;
        let offsets = state.offsets.clone();
        offsets
            .into_iter()
            .map(|offset| read_frame(&mut state.file, offset))
            .collect()
    }
}

fn write_frame(file: &mut File, offset: u64, frame: &[u8], sync_mode: SyncMode) -> Result<()> {
    file.seek(SeekFrom::Start(offset))?;
    file.write_all(frame)?;
    file.flush()?;
    if sync_mode == SyncMode::EveryWrite {
        file.sync_data()?;
    }
    Ok(())
}

fn read_frame(file: &mut File, offset: u64) -> Result<TransparencyLogEntry> {
    file.seek(SeekFrom::Start(offset))?;
    let mut header = [0u8; HEADER_SIZE as usize];
    file.read_exact(&mut header)?;
    let (length, expected_crc) = parse_header(&header);

    let mut payload = vec![0u8; length as usize];
    file.read_exact(&mut payload)?;
    let actual_crc = crc32fast::hash(&payload);
    if actual_crc != expected_crc {
        return Err(LogError::Store(format!(
            "CRC mismatch at offset {offset}: expected {expected_crc:#010x}, got {actual_crc:#010x}"
        )));
    }
    bincode::deserialize(&payload).map_err(|e| LogError::Serialization(e.to_string()))
}

fn parse_header(header: &[u8; HEADER_SIZE as usize]) -> (u32, u32) {
    let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    let crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
    (length, crc)
}

/// Walk every frame. Returns the offsets of valid frames and the offset just
/// past the last frame worth keeping.
///
/// Only a frame that runs to or past end of file may be treated as torn.
/// A header that cannot be valid anywhere else is corruption.
fn scan(file: &mut File) -> Result<(Vec<u64>, u64)> {
    let mut buf = Vec::new();
    file.seek(SeekFrom::Start(0))?;
    file.read_to_end(&mut buf)?;
    let file_len = buf.len() as u64;

    let mut offsets = Vec::new();
    let mut frames: u64 = 0;
    let mut offset: u64 = 0;
    let mut end: u64 = 0;

    while offset + HEADER_SIZE <= file_len {
        let start = offset as usize;
        let mut header = [0u8; HEADER_SIZE as usize];
        header.copy_from_slice(&buf[start..start + HEADER_SIZE as usize]);
        let (length, expected_crc) = parse_header(&header);

        let frame_end = offset + HEADER_SIZE + u64::from(length);
        if length > MAX_PAYLOAD || (length == 0 && frame_end < file_len) {
            return Err(LogError::IntegrityViolation {
                index: frames,
                reason: format!("invalid frame header at offset {offset} (length {length})"),
            });
        }
        if length == 0 || frame_end > file_len {
            warn!(offset, length, file_len, "frame runs past end of file; stopping scan");
            break;
        }

        let payload = &buf[start + HEADER_SIZE as usize..frame_end as usize];
        let actual_crc = crc32fast::hash(payload);
        let is_last = frame_end == file_len;

        if actual_crc != expected_crc {
            if is_last {
                warn!(offset, "CRC mismatch on final frame; treating as torn write");
                break;
            }
            warn!(
                offset,
                expected = expected_crc,
                actual = actual_crc,
                "CRC mismatch; skipping frame"
            );
        } else if let Err(e) = bincode::deserialize::<TransparencyLogEntry>(payload) {
            warn!(offset, error = %e, "undecodable frame; skipping");
        } else {
            offsets.push(offset);
        }

        frames += 1;
        offset = frame_end;
        end = frame_end;
    }

    Ok((offsets, end))
}

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::block::Block;
use crate::error::JournalError;

/// Flush/sync strategy for the block journal.
#[derive(Clone, Debug, Default)]
pub enum SyncMode {
    /// `fsync` after every append (safest, highest latency).
    ///
    /// The default: a block must be durable before the movement that
    /// produced it is acknowledged.
    #[default]
    EveryWrite,
    /// Rely on OS page-cache buffering (fastest, least durable).
    OsDefault,
}

/// Header size: 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: usize = 8;

/// Internal mutable state for the journal writer.
struct JournalWriter {
    writer: BufWriter<File>,
    /// Current write offset in the journal file.
    offset: u64,
}

/// Append-only on-disk journal of sealed blocks.
///
/// Blocks are serialized with bincode, framed with a length prefix and a
/// CRC32 checksum, and appended to a single file:
///
/// ```text
/// [4 bytes: frame length (little-endian u32)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload (bincode-serialized Block)]
/// ```
///
/// There is no truncation or compaction; the journal is the durable history
/// of the chain. On load the file is read front-to-back: a short frame at
/// the tail is treated as a torn write from a crash and dropped with a
/// warning, while a complete frame that fails its CRC check is reported as
/// corruption and the load fails.
pub struct BlockJournal {
    /// Path to the journal file.
    path: PathBuf,
    /// Writer state behind a mutex for thread safety.
    writer: Mutex<JournalWriter>,
    /// Sync strategy applied on every append.
    sync: SyncMode,
}

impl BlockJournal {
    /// Open (or create) a journal file at the given path.
    pub fn open(path: &Path, sync: SyncMode) -> Result<Self, JournalError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;

        let offset = file.metadata()?.len();
        let writer = BufWriter::new(file);

        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(JournalWriter { writer, offset }),
            sync,
        })
    }

    /// Append a sealed block. Returns the byte offset of its frame.
    pub fn append(&self, block: &Block) -> Result<u64, JournalError> {
        let payload =
            bincode::serialize(block).map_err(|e| JournalError::Codec(e.to_string()))?;

        let length = payload.len() as u32;
        let crc = crc32fast::hash(&payload);

        let mut w = self.writer.lock().expect("journal mutex poisoned");
        let frame_offset = w.offset;

        // Write header: [length: u32 LE] [crc: u32 LE]
        w.writer.write_all(&length.to_le_bytes())?;
        w.writer.write_all(&crc.to_le_bytes())?;
        w.writer.write_all(&payload)?;

        w.writer.flush()?;
        if matches!(self.sync, SyncMode::EveryWrite) {
            w.writer.get_ref().sync_all()?;
        }

        w.offset += HEADER_SIZE as u64 + payload.len() as u64;

        debug!(offset = frame_offset, index = block.index, "journal append");
        Ok(frame_offset)
    }

    /// Load every block from the journal, in append order.
    ///
    /// A torn frame at the tail is logged and dropped. A complete frame
    /// that fails validation fails the whole load, so a tampered file never
    /// yields a silently shortened history.
    pub fn load(&self) -> Result<Vec<Block>, JournalError> {
        let mut file = BufReader::new(File::open(&self.path)?);
        let file_len = file.get_ref().metadata()?.len();
        let mut blocks = Vec::new();
        let mut offset: u64 = 0;

        while offset + HEADER_SIZE as u64 <= file_len {
            file.seek(SeekFrom::Start(offset))?;

            let mut header_buf = [0u8; HEADER_SIZE];
            match file.read_exact(&mut header_buf) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e.into()),
            }

            let length =
                u32::from_le_bytes([header_buf[0], header_buf[1], header_buf[2], header_buf[3]]);
            let expected_crc =
                u32::from_le_bytes([header_buf[4], header_buf[5], header_buf[6], header_buf[7]]);

            // Appends never produce empty payloads; a zero length is a
            // damaged header, not a torn write.
            if length == 0 {
                return Err(JournalError::CorruptFrame { offset });
            }

            // A length that overruns the file is a header whose payload
            // never made it to disk.
            if offset + HEADER_SIZE as u64 + length as u64 > file_len {
                warn!(offset, length, file_len, "torn frame at journal tail; dropping");
                break;
            }

            let mut payload = vec![0u8; length as usize];
            match file.read_exact(&mut payload) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    warn!(offset, "torn frame at journal tail; dropping");
                    break;
                }
                Err(e) => return Err(e.into()),
            }

            let actual_crc = crc32fast::hash(&payload);
            if actual_crc != expected_crc {
                warn!(
                    offset,
                    expected = expected_crc,
                    actual = actual_crc,
                    "journal frame failed CRC check"
                );
                return Err(JournalError::CorruptFrame { offset });
            }

            let block = bincode::deserialize::<Block>(&payload)
                .map_err(|e| JournalError::Codec(e.to_string()))?;
            blocks.push(block);

            offset += HEADER_SIZE as u64 + length as u64;
        }

        debug!(loaded = blocks.len(), "journal load complete");
        Ok(blocks)
    }

    /// Current write offset.
    pub fn offset(&self) -> u64 {
        self.writer.lock().expect("journal mutex poisoned").offset
    }

    /// Path to the journal file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

// File: src/persistence.rs
use crate::core::types::{MedicineRecord, MedicineStore};
use crate::error::{RecommendError, Result};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tempfile::NamedTempFile;
use tracing::info;

/// Reads and checks the medicine store.
///
/// Any failure here is a `MalformedStore`: the file is missing or unreadable,
/// is not JSON, lacks the `medicines` list, a record lacks a required field, or
/// a record has a blank name.
pub fn load_medicines(path: &Path) -> Result<Vec<MedicineRecord>> {
    let file = File::open(path).map_err(|e| RecommendError::malformed(path, e.to_string()))?;
    let reader = BufReader::new(file);
    let store: MedicineStore =
        serde_json::from_reader(reader).map_err(|e| RecommendError::malformed(path, e.to_string()))?;

    let mut medicines = store.medicines;
    for (idx, med) in medicines.iter_mut().enumerate() {
        if med.name.trim().is_empty() {
            return Err(RecommendError::malformed(path, format!("medicine at index {idx} has an empty name")));
        }
        med.dedupe_terms();
    }
    Ok(medicines)
}

/// Reads the store as untyped JSON, for tools that must inspect records the
/// typed loader would reject.
pub fn load_raw(path: &Path) -> Result<serde_json::Value> {
    let file = File::open(path).map_err(|e| RecommendError::malformed(path, e.to_string()))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| RecommendError::malformed(path, e.to_string()))
}

/// Writes the store atomically: a temp file in the same directory is filled,
/// then renamed over `path`.
pub fn save_medicines(path: &Path, medicines: &[MedicineRecord]) -> Result<()> {
    let parent_dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    let store = MedicineStore {
        medicines: medicines.to_vec(),
    };

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(temp_file.as_file());
        serde_json::to_writer_pretty(&mut writer, &store)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }

    temp_file.persist(path).map_err(|e| RecommendError::Io(e.error))?;
    Ok(())
}

/// Copies the store into `backup_dir` as `<stem>_backup_<unix secs>.json`
/// and returns the new file's path. Never overwrites an earlier backup.
pub fn backup_store(path: &Path, backup_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(backup_dir)?;

    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("medicines");
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    let mut target = backup_dir.join(format!("{stem}_backup_{timestamp}.json"));
    let mut attempt = 1;
    while target.exists() {
        target = backup_dir.join(format!("{stem}_backup_{timestamp}_{attempt}.json"));
        attempt += 1;
    }

    fs::copy(path, &target)?;
    info!(from = %path.display(), to = %target.display(), "store backed up");
    Ok(target)
}

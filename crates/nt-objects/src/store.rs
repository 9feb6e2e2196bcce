//! Local filesystem object store: pack files and blobs under `objects/`.

use crate::error::ObjectError;
use crate::pack::PackFile;
use nt_hash::Oid;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const PACK_SUFFIX: &str = ".pack";

/// A reference to one object found while walking `objects/`, used by `gc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub oid: Oid,
    pub is_pack: bool,
}

/// Content-addressed storage rooted at `<state_dir>/objects/`.
///
/// Every write goes through a temp-file-then-rename so a crash never leaves
/// a half-written object at its final path; a half-written *temp* file is
/// harmless garbage that the next `gc` or a stray-file check can remove.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    objects_dir: PathBuf,
}

impl ObjectStore {
    /// Open (and create, if absent) the object store rooted under `state_dir`.
    pub fn open(state_dir: &Path) -> Result<Self, ObjectError> {
        let objects_dir = state_dir.join("objects");
        fs::create_dir_all(&objects_dir)?;
        Ok(ObjectStore { objects_dir })
    }

    fn path_for(&self, oid: &Oid, suffix: &str) -> PathBuf {
        self.objects_dir.join(oid.to_relative_path(suffix))
    }

    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<(), ObjectError> {
        if path.exists() {
            return Ok(());
        }
        let dir = path.parent().expect("object path always has a shard directory");
        fs::create_dir_all(dir)?;
        let tmp_path = dir.join(format!(".tmp-{}", uniq_suffix()));
        {
            let mut tmp = fs::File::create(&tmp_path)?;
            tmp.write_all(bytes)?;
            tmp.sync_all()?;
        }
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// Write `pack`, returning its content OID. A no-op if a pack with the
    /// same OID is already on disk (identical source content re-packs to
    /// the identical file). The OID is `pack`'s own content hash computed
    /// over every field but `oid` (§6); this re-derives it rather than
    /// trusting the caller, since `canonical_bytes` is named by it.
    pub fn write_pack(&self, pack: &PackFile) -> Result<Oid, ObjectError> {
        let oid = pack.compute_oid()?;
        let mut pack = pack.clone();
        pack.oid = oid.clone();
        let bytes = pack.canonical_bytes()?;
        self.write_atomic(&self.path_for(&oid, PACK_SUFFIX), &bytes)?;
        Ok(oid)
    }

    /// Read and parse the pack file named by `oid`.
    pub fn read_pack(&self, oid: &Oid) -> Result<PackFile, ObjectError> {
        let path = self.path_for(oid, PACK_SUFFIX);
        let bytes = fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ObjectError::NotFound(oid.clone())
            } else {
                ObjectError::Io(e)
            }
        })?;
        Ok(serde_yaml::from_slice(&bytes)?)
    }

    /// Write `bytes` as a blob, returning its content OID. A no-op if the
    /// blob already exists.
    pub fn write_blob(&self, bytes: &[u8]) -> Result<Oid, ObjectError> {
        let oid = Oid::from_content(bytes);
        self.write_atomic(&self.path_for(&oid, ""), bytes)?;
        Ok(oid)
    }

    /// Read a pack file's raw (still-compressed, still-YAML) bytes, for
    /// forwarding to a remote without a decode/re-encode round trip.
    pub fn read_pack_bytes(&self, oid: &Oid) -> Result<Vec<u8>, ObjectError> {
        let path = self.path_for(oid, PACK_SUFFIX);
        fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ObjectError::NotFound(oid.clone())
            } else {
                ObjectError::Io(e)
            }
        })
    }

    /// Write pre-serialised pack bytes fetched from elsewhere (a remote),
    /// under the OID the caller has already verified them against.
    pub fn write_pack_bytes(&self, oid: &Oid, bytes: &[u8]) -> Result<(), ObjectError> {
        self.write_atomic(&self.path_for(oid, PACK_SUFFIX), bytes)
    }

    /// Write pre-fetched blob bytes under the OID the caller has already
    /// verified them against.
    pub fn write_blob_bytes(&self, oid: &Oid, bytes: &[u8]) -> Result<(), ObjectError> {
        self.write_atomic(&self.path_for(oid, ""), bytes)
    }

    /// Read a blob's raw bytes.
    pub fn read_blob(&self, oid: &Oid) -> Result<Vec<u8>, ObjectError> {
        let path = self.path_for(oid, "");
        fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ObjectError::NotFound(oid.clone())
            } else {
                ObjectError::Io(e)
            }
        })
    }

    /// True if a pack (`suffix = ".pack"`) or blob (`suffix = ""`) named by
    /// `oid` is present.
    pub fn exists(&self, oid: &Oid, suffix: &str) -> bool {
        self.path_for(oid, suffix).exists()
    }

    /// Remove a pack or blob, used by `gc` for unreachable objects.
    /// Missing objects are not an error — `gc` may race a concurrent delete.
    pub fn delete(&self, oid: &Oid, suffix: &str) -> Result<(), ObjectError> {
        match fs::remove_file(self.path_for(oid, suffix)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ObjectError::Io(e)),
        }
    }

    /// Enumerate every object currently on disk, for `gc`'s reachability
    /// sweep.
    pub fn iter_objects(&self) -> Result<Vec<ObjectRef>, ObjectError> {
        let mut out = Vec::new();
        for entry in walkdir::WalkDir::new(&self.objects_dir)
            .min_depth(2)
            .max_depth(2)
        {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if let Some(hex) = name.strip_suffix(PACK_SUFFIX) {
                if let Ok(oid) = Oid::from_hex(hex) {
                    out.push(ObjectRef { oid, is_pack: true });
                }
            } else if name.starts_with('.') {
                continue; // stray temp file from an interrupted write
            } else if let Ok(oid) = Oid::from_hex(&name) {
                out.push(ObjectRef { oid, is_pack: false });
            }
        }
        Ok(out)
    }
}

fn uniq_suffix() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    format!(
        "{}-{}",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::Relaxed)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use nt_entities::{Entity, File};
    use tempfile::tempdir;

    fn sample_pack() -> PackFile {
        let entity = Entity::File(File {
            oid: Oid::from_content(b"seed"),
            relative_path: "notes.md".to_string(),
            size: 1,
            content_hash: Oid::from_content(b"body"),
            mtime: Utc::now(),
            body: "body".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        PackFile::from_entities("notes.md".to_string(), Utc::now(), 1, Utc::now(), vec![entity]).unwrap()
    }

    #[test]
    fn write_then_read_pack_roundtrips() {
        let dir = tempdir().unwrap();
        let store = ObjectStore::open(dir.path()).unwrap();
        let pack = sample_pack();
        let oid = store.write_pack(&pack).unwrap();
        let read_back = store.read_pack(&oid).unwrap();
        assert_eq!(read_back, pack);
    }

    #[test]
    fn write_blob_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = ObjectStore::open(dir.path()).unwrap();
        let oid1 = store.write_blob(b"hello").unwrap();
        let oid2 = store.write_blob(b"hello").unwrap();
        assert_eq!(oid1, oid2);
        assert_eq!(store.read_blob(&oid1).unwrap(), b"hello");
    }

    #[test]
    fn missing_object_is_not_found() {
        let dir = tempdir().unwrap();
        let store = ObjectStore::open(dir.path()).unwrap();
        let oid = Oid::from_content(b"nothing here");
        assert!(matches!(store.read_blob(&oid), Err(ObjectError::NotFound(_))));
    }

    #[test]
    fn iter_objects_finds_pack_and_blob() {
        let dir = tempdir().unwrap();
        let store = ObjectStore::open(dir.path()).unwrap();
        store.write_pack(&sample_pack()).unwrap();
        store.write_blob(b"asset bytes").unwrap();
        let objects = store.iter_objects().unwrap();
        assert_eq!(objects.len(), 2);
        assert!(objects.iter().any(|o| o.is_pack));
        assert!(objects.iter().any(|o| !o.is_pack));
    }

    #[test]
    fn delete_missing_object_is_not_an_error() {
        let dir = tempdir().unwrap();
        let store = ObjectStore::open(dir.path()).unwrap();
        let oid = Oid::from_content(b"never written");
        assert!(store.delete(&oid, "").is_ok());
    }
}

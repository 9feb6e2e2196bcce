//! The pack-file format: a YAML document bundling every entity extracted
//! from one source file.

use crate::error::ObjectError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use nt_compression::{compress, decompress, CompressionLevel};
use nt_entities::{Entity, EntityKind};
use nt_hash::Oid;
use serde::{Deserialize, Serialize};

/// One entry inside a pack file: an entity's identity plus its compressed,
/// base64-encoded YAML payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackEntry {
    pub oid: Oid,
    pub kind: EntityKind,
    pub ctime: DateTime<Utc>,
    pub data: String,
}

/// A pack file: the File entity plus every Note/Flashcard/Media/Link/
/// Reminder extracted from one source file.
///
/// Named by the SHA-1 of its own canonical YAML bytes, computed over every
/// field except `oid` itself — see [`PackFile::compute_oid`]; a pack file
/// cannot be hashed including its own hash. `file_relative_path`/
/// `file_mtime`/`file_size` record the source file's metadata at pack
/// time, which is what the builder consults on the next `add` to decide
/// whether to re-pack.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackFile {
    pub oid: Oid,
    pub file_relative_path: String,
    pub file_mtime: DateTime<Utc>,
    pub file_size: u64,
    pub ctime: DateTime<Utc>,
    pub objects: Vec<PackEntry>,
}

/// Every field of [`PackFile`] except its own self-referential `oid`, in
/// the order §6 documents, serialised to compute that OID.
#[derive(Serialize)]
struct PackFileBody<'a> {
    file_relative_path: &'a str,
    file_mtime: DateTime<Utc>,
    file_size: u64,
    ctime: DateTime<Utc>,
    objects: &'a [PackEntry],
}

impl PackFile {
    /// Compress and encode `entities` into a new pack file stamped with
    /// `ctime` (the caller's current generation time, so repeated `add`
    /// runs with fixed timestamps stay byte-identical).
    pub fn from_entities(
        file_relative_path: String,
        file_mtime: DateTime<Utc>,
        file_size: u64,
        ctime: DateTime<Utc>,
        entities: Vec<Entity>,
    ) -> Result<Self, ObjectError> {
        let mut objects = Vec::with_capacity(entities.len());
        for entity in &entities {
            objects.push(encode_entry(entity)?);
        }
        let oid = body_oid(&file_relative_path, file_mtime, file_size, ctime, &objects)?;
        Ok(PackFile {
            oid,
            file_relative_path,
            file_mtime,
            file_size,
            ctime,
            objects,
        })
    }

    /// Decode every entry back into a typed [`Entity`].
    pub fn decode_entities(&self) -> Result<Vec<Entity>, ObjectError> {
        self.objects.iter().map(decode_entry).collect()
    }

    /// Serialise to the canonical YAML bytes written to disk (includes the
    /// already-computed `oid`).
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, ObjectError> {
        Ok(serde_yaml::to_string(self)?.into_bytes())
    }

    /// Recompute this pack file's content OID from its body, ignoring
    /// whatever `oid` it currently carries. Used to verify a pack read
    /// back from disk (or fetched from a remote) against its own name.
    pub fn compute_oid(&self) -> Result<Oid, ObjectError> {
        body_oid(
            &self.file_relative_path,
            self.file_mtime,
            self.file_size,
            self.ctime,
            &self.objects,
        )
    }
}

fn body_oid(
    file_relative_path: &str,
    file_mtime: DateTime<Utc>,
    file_size: u64,
    ctime: DateTime<Utc>,
    objects: &[PackEntry],
) -> Result<Oid, ObjectError> {
    let body = PackFileBody {
        file_relative_path,
        file_mtime,
        file_size,
        ctime,
        objects,
    };
    Ok(Oid::from_content(&serde_yaml::to_string(&body)?.into_bytes()))
}

fn encode_entry(entity: &Entity) -> Result<PackEntry, ObjectError> {
    let yaml = serde_yaml::to_string(entity)?;
    let compressed = compress(yaml.as_bytes(), CompressionLevel::Default)?;
    Ok(PackEntry {
        oid: entity.oid().clone(),
        kind: entity.kind(),
        ctime: entity.created_at(),
        data: BASE64.encode(compressed),
    })
}

fn decode_entry(entry: &PackEntry) -> Result<Entity, ObjectError> {
    let compressed = BASE64.decode(&entry.data)?;
    let yaml = decompress(&compressed)?;
    let entity: Entity = serde_yaml::from_slice(&yaml)?;
    Ok(entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nt_entities::File;

    fn sample_file_entity() -> Entity {
        Entity::File(File {
            oid: Oid::from_content(b"file-oid-seed"),
            relative_path: "notes.md".to_string(),
            size: 42,
            content_hash: Oid::from_content(b"body"),
            mtime: Utc::now(),
            body: "body text".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
    }

    #[test]
    fn roundtrips_entities() {
        let pack = PackFile::from_entities(
            "notes.md".to_string(),
            Utc::now(),
            42,
            Utc::now(),
            vec![sample_file_entity()],
        )
        .unwrap();
        let decoded = pack.decode_entities().unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].kind(), EntityKind::File);
    }

    #[test]
    fn identical_content_produces_identical_oid() {
        let now = DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let entity = Entity::File(File {
            oid: Oid::from_content(b"stable"),
            relative_path: "a.md".to_string(),
            size: 1,
            content_hash: Oid::from_content(b"x"),
            mtime: now,
            body: "x".to_string(),
            created_at: now,
            updated_at: now,
        });
        let a = PackFile::from_entities("a.md".to_string(), now, 1, now, vec![entity.clone()]).unwrap();
        let b = PackFile::from_entities("a.md".to_string(), now, 1, now, vec![entity]).unwrap();
        assert_eq!(a.compute_oid().unwrap(), b.compute_oid().unwrap());
        assert_eq!(a.oid, b.oid);
    }

    #[test]
    fn oid_excludes_itself_from_the_hash() {
        let now = DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let pack = PackFile::from_entities(
            "a.md".to_string(),
            now,
            1,
            now,
            vec![sample_file_entity()],
        )
        .unwrap();
        assert_eq!(pack.oid, pack.compute_oid().unwrap());

        let mut tampered = pack.clone();
        tampered.oid = Oid::from_content(b"not the real oid");
        assert_eq!(
            tampered.compute_oid().unwrap(),
            pack.oid,
            "compute_oid must ignore the stored oid field entirely"
        );
    }
}

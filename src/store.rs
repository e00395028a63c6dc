// 💾 Snapshot Store - load and save breed collections as JSON arrays
//
// Saves are atomic: bytes go to a temp file beside the target and are
// renamed into place only after a full write + sync. A failed run leaves
// no partial snapshot behind.

use crate::breed::BreedRecord;
use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Read a whole snapshot into memory
pub fn load_breeds<P: AsRef<Path>>(path: P) -> Result<Vec<BreedRecord>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read breed file: {:?}", path))?;

    let raw: Vec<serde_json::Value> = serde_json::from_str(&content)
        .with_context(|| format!("Breed file is not a JSON array of records: {:?}", path))?;

    raw.into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value::<BreedRecord>(value)
                .with_context(|| format!("Invalid breed record #{} in {:?}", index, path))
        })
        .collect()
}

/// Serialize a snapshot: two-space indent, UTF-8 as-is, trailing newline
pub fn to_json_bytes(records: &[BreedRecord]) -> Result<Vec<u8>> {
    let mut bytes =
        serde_json::to_vec_pretty(records).context("Failed to serialize breed records")?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Atomically write a snapshot. Returns the SHA-256 of the written bytes.
pub fn save_breeds<P: AsRef<Path>>(path: P, records: &[BreedRecord]) -> Result<String> {
    let path = path.as_ref();
    let bytes = to_json_bytes(records)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {:?}", dir))?;
    tmp.write_all(&bytes)
        .with_context(|| format!("Failed to write snapshot for {:?}", path))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("Failed to sync snapshot for {:?}", path))?;
    tmp.persist(path)
        .with_context(|| format!("Failed to move snapshot into place: {:?}", path))?;

    Ok(fingerprint(&bytes))
}

/// Hex SHA-256 of a byte slice
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// `dog_breeds.json` + `_curated` → `dog_breeds_curated.json`
pub fn derive_output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("breeds"));

    let mut name = stem;
    name.push(suffix);
    name.push(".");
    name.push(
        input
            .extension()
            .map(|e| e.to_os_string())
            .unwrap_or_else(|| OsString::from("json")),
    );

    input.with_file_name(name)
}

/// Refuse to write over the input snapshot
pub fn ensure_distinct(input: &Path, output: &Path) -> Result<()> {
    let same = match (fs::canonicalize(input), fs::canonicalize(output)) {
        (Ok(a), Ok(b)) => a == b,
        _ => input == output,
    };

    if same {
        bail!(
            "Output {:?} is the input file; snapshots are never overwritten in place",
            output
        );
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breed::SizeBand;

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("breeds.json");

        let records = vec![
            BreedRecord::new("Beagle", SizeBand::Small).with_description("A merry hound."),
            BreedRecord::new("Akita", SizeBand::Large).with_image("akita.png"),
        ];

        let hash = save_breeds(&path, &records).unwrap();
        let loaded = load_breeds(&path).unwrap();

        assert_eq!(loaded, records);
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, fingerprint(&fs::read(&path).unwrap()));
    }

    #[test]
    fn test_output_format() {
        let bytes = to_json_bytes(&[BreedRecord::new("Shih Tzu", SizeBand::Small)
            .with_description("Petit Basset Griffon Vendéen friend")])
        .unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("[\n  {\n    \"breed\": \"Shih Tzu\""));
        assert!(text.contains("Vendéen"));
        assert!(text.ends_with("]\n"));
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.json");
        let output = dir.path().join("out.json");
        fs::write(
            &input,
            r#"[{"breed": "Boxer", "size": "Medium", "energy_level": "High", "trainability": 4}]"#,
        )
        .unwrap();

        let records = load_breeds(&input).unwrap();
        save_breeds(&output, &records).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(value[0]["energy_level"], "High");
        assert_eq!(value[0]["trainability"], 4);
    }

    #[test]
    fn test_null_fields_survive_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.json");
        let output = dir.path().join("out.json");
        fs::write(
            &input,
            r#"[{"breed": "Akita", "size": "Large", "description": null, "image_filename": null, "shelter_availability_score": null}]"#,
        )
        .unwrap();

        let records = load_breeds(&input).unwrap();
        save_breeds(&output, &records).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        let saved = value[0].as_object().unwrap();
        assert_eq!(saved.len(), 5);
        assert!(saved["description"].is_null());
        assert!(saved["image_filename"].is_null());
        assert!(saved["shelter_availability_score"].is_null());
        assert_eq!(load_breeds(&output).unwrap(), records);
    }

    #[test]
    fn test_load_errors_name_the_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(
            &path,
            r#"[{"breed": "Boxer", "size": "Medium"}, {"breed": "Pug", "size": "Tiny"}]"#,
        )
        .unwrap();

        let err = load_breeds(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("record #1"));
    }

    #[test]
    fn test_load_rejects_non_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("object.json");
        fs::write(&path, r#"{"breed": "Boxer"}"#).unwrap();

        assert!(load_breeds(&path).is_err());
        assert!(load_breeds(dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_failed_save_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("out.json");

        assert!(save_breeds(&path, &[]).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_derive_output_path() {
        assert_eq!(
            derive_output_path(Path::new("seeder/dog_breeds.json"), "_curated"),
            PathBuf::from("seeder/dog_breeds_curated.json")
        );
        assert_eq!(
            derive_output_path(Path::new("breeds"), "_fixed"),
            PathBuf::from("breeds_fixed.json")
        );
    }

    #[test]
    fn test_ensure_distinct() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.json");
        fs::write(&input, "[]").unwrap();

        assert!(ensure_distinct(&input, &input).is_err());
        assert!(ensure_distinct(&input, &dir.path().join(".").join("in.json")).is_err());
        assert!(ensure_distinct(&input, &dir.path().join("out.json")).is_ok());
    }
}

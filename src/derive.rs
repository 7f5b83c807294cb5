//! Quality derivation pipeline.
//!
//! Turns one source photo into a complete [`VariantSet`]: the `original`
//! re-encode plus one variant per [`LADDER`] entry.
//!
//! ## Steps
//!
//! ```text
//! 1. transform(source, no resize, compression 1)      → original (W × H)
//! 2. for each ladder step:
//!      transform(source, width = W × fraction, compression) → variant
//! 3. publish all eight at once
//! ```
//!
//! Steps run strictly one after another. Each transform is followed by a
//! size lookup through [`StorageInfo`].
//!
//! ## Failure policy
//!
//! Any failing step aborts the derivation. No partial set is returned, and
//! files already produced by the aborted run are deleted before the error
//! reaches the caller.
//!
//! ## Ownership of derived files
//!
//! A [`VariantSet`] owns the files its transforms produced and deletes them
//! when dropped. Replacing a set with a newer one, clearing it, or tearing
//! down the gallery therefore releases the previous files.
//! [`VariantSet::keep`] detaches them instead.

use crate::imaging::{
    BackendError, Compression, ImageBackend, OutputFormat, StorageInfo, TransformParams,
    scaled_width,
};
use crate::ladder::{LADDER, ORIGINAL_COMPRESSION, VariantKey};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum DerivationError {
    #[error("transform failed for '{key}': {source}")]
    TransformFailure {
        key: VariantKey,
        #[source]
        source: BackendError,
    },
    #[error("size lookup failed for '{key}': {source}")]
    StorageInfoFailure {
        key: VariantKey,
        #[source]
        source: BackendError,
    },
}

impl DerivationError {
    /// The ladder entry whose step failed.
    pub fn key(&self) -> VariantKey {
        match self {
            DerivationError::TransformFailure { key, .. }
            | DerivationError::StorageInfoFailure { key, .. } => *key,
        }
    }
}

/// One derived image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variant {
    pub path: PathBuf,
    /// Encoded size in bytes.
    pub size: u64,
    pub width: u32,
    pub height: u32,
}

/// Files produced by one derivation run. Deleted on drop unless disarmed.
#[derive(Debug, Default)]
struct DerivedFiles {
    paths: Vec<PathBuf>,
    detached: bool,
}

impl DerivedFiles {
    fn push(&mut self, path: PathBuf) {
        self.paths.push(path);
    }
}

impl Drop for DerivedFiles {
    fn drop(&mut self) {
        if self.detached {
            return;
        }
        for path in &self.paths {
            match std::fs::remove_file(path) {
                Ok(()) => debug!(path = %path.display(), "Released derived file"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to release derived file"),
            }
        }
    }
}

/// The complete collection of variants for one source photo.
///
/// Always holds all eight keys when produced by [`derive`]. Not `Clone`:
/// exactly one owner is responsible for the files behind it.
#[derive(Debug)]
pub struct VariantSet {
    variants: BTreeMap<VariantKey, Variant>,
    files: DerivedFiles,
}

impl VariantSet {
    /// Take ownership of already-materialized variants.
    ///
    /// The files at every variant's `path` will be deleted when the set drops.
    pub fn adopt(variants: BTreeMap<VariantKey, Variant>) -> Self {
        let files = DerivedFiles {
            paths: variants.values().map(|v| v.path.clone()).collect(),
            detached: false,
        };
        Self { variants, files }
    }

    pub fn get(&self, key: VariantKey) -> Option<&Variant> {
        self.variants.get(&key)
    }

    pub fn original(&self) -> Option<&Variant> {
        self.get(VariantKey::Original)
    }

    pub fn contains(&self, key: VariantKey) -> bool {
        self.variants.contains_key(&key)
    }

    /// Variants in presentation order.
    pub fn iter(&self) -> impl Iterator<Item = (VariantKey, &Variant)> {
        self.variants.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Detach the derived files so they outlive the set.
    pub fn keep(mut self) -> BTreeMap<VariantKey, Variant> {
        self.files.detached = true;
        std::mem::take(&mut self.variants)
    }
}

impl Serialize for VariantSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.variants.iter())
    }
}

/// Run the full ladder against `source`.
///
/// `transform` and `storage` are usually the same backend; they are separate
/// collaborators so either can be swapped out.
pub fn derive(
    transform: &impl ImageBackend,
    storage: &impl StorageInfo,
    source: &Path,
    format: OutputFormat,
) -> Result<VariantSet, DerivationError> {
    let mut files = DerivedFiles::default();
    let mut variants = BTreeMap::new();

    let original = run_step(
        transform,
        storage,
        &mut files,
        VariantKey::Original,
        TransformParams {
            source: source.to_path_buf(),
            resize_width: None,
            compression: Compression::new(ORIGINAL_COMPRESSION),
            format,
        },
    )?;
    let original_width = original.width;
    variants.insert(VariantKey::Original, original);

    for step in LADDER {
        let variant = run_step(
            transform,
            storage,
            &mut files,
            step.key,
            TransformParams {
                source: source.to_path_buf(),
                resize_width: Some(scaled_width(original_width, step.width_fraction)),
                compression: Compression::new(step.compression),
                format,
            },
        )?;
        variants.insert(step.key, variant);
    }

    info!(
        source = %source.display(),
        variants = variants.len(),
        "Derived quality variants"
    );
    Ok(VariantSet { variants, files })
}

fn run_step(
    transform: &impl ImageBackend,
    storage: &impl StorageInfo,
    files: &mut DerivedFiles,
    key: VariantKey,
    params: TransformParams,
) -> Result<Variant, DerivationError> {
    let out = transform
        .transform(&params)
        .map_err(|source| DerivationError::TransformFailure { key, source })?;
    files.push(out.path.clone());

    let size = storage
        .size(&out.path)
        .map_err(|source| DerivationError::StorageInfoFailure { key, source })?;
    if size == 0 {
        return Err(DerivationError::StorageInfoFailure {
            key,
            source: BackendError::ProcessingFailed(format!(
                "empty output at {}",
                out.path.display()
            )),
        });
    }

    debug!(%key, width = out.width, height = out.height, size, "Derived variant");
    Ok(Variant {
        path: out.path,
        size,
        width: out.width,
        height: out.height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp, mock_size};

    const SOURCE: &str = "/library/IMG_0001.jpg";

    fn derive_mock(backend: &MockBackend) -> Result<VariantSet, DerivationError> {
        derive(backend, backend, Path::new(SOURCE), OutputFormat::Jpeg)
    }

    #[test]
    fn produces_all_eight_keys() {
        let backend = MockBackend::with_source(SOURCE, 4000, 3000);
        let set = derive_mock(&backend).unwrap();

        let keys: Vec<VariantKey> = set.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, VariantKey::ALL.to_vec());
        for (_, v) in set.iter() {
            assert!(v.size > 0);
            assert!(v.width > 0 && v.height > 0);
        }
    }

    #[test]
    fn original_keeps_native_dimensions() {
        let backend = MockBackend::with_source(SOURCE, 4000, 3000);
        let set = derive_mock(&backend).unwrap();

        let original = set.original().unwrap();
        assert_eq!((original.width, original.height), (4000, 3000));
        assert_eq!(original.size, mock_size(4000, 3000, 1.0));
    }

    #[test]
    fn scenario_4000x3000() {
        let backend = MockBackend::with_source(SOURCE, 4000, 3000);
        let set = derive_mock(&backend).unwrap();

        let dims = |k| {
            let v = set.get(k).unwrap();
            (v.width, v.height)
        };
        assert_eq!(dims(VariantKey::High), (3200, 2400));
        assert_eq!(dims(VariantKey::Medium), (2400, 1800));
        for key in [
            VariantKey::Low,
            VariantKey::Low1,
            VariantKey::Low2,
            VariantKey::Low3,
            VariantKey::Low4,
        ] {
            assert_eq!(dims(key), (1600, 1200), "{key}");
        }

        let sizes: Vec<u64> = [
            VariantKey::Low1,
            VariantKey::Low2,
            VariantKey::Low3,
            VariantKey::Low4,
        ]
        .iter()
        .map(|k| set.get(*k).unwrap().size)
        .collect();
        assert!(sizes.windows(2).all(|w| w[0] > w[1]), "{sizes:?}");
    }

    #[test]
    fn steps_run_in_ladder_order_with_expected_params() {
        let backend = MockBackend::with_source(SOURCE, 1000, 500);
        derive_mock(&backend).unwrap();

        let transforms: Vec<(Option<u32>, f32)> = backend
            .get_operations()
            .into_iter()
            .filter_map(|op| match op {
                RecordedOp::Transform {
                    resize_width,
                    compression,
                    ..
                } => Some((resize_width, compression)),
                _ => None,
            })
            .collect();

        assert_eq!(
            transforms,
            vec![
                (None, 1.0),
                (Some(800), 0.8),
                (Some(600), 0.8),
                (Some(400), 0.9),
                (Some(400), 0.8),
                (Some(400), 0.7),
                (Some(400), 0.6),
                (Some(400), 0.0),
            ]
        );
    }

    #[test]
    fn each_transform_is_followed_by_its_size_lookup() {
        let backend = MockBackend::with_source(SOURCE, 100, 100);
        derive_mock(&backend).unwrap();

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 16);
        for pair in ops.chunks(2) {
            match (&pair[0], &pair[1]) {
                (RecordedOp::Transform { output, .. }, RecordedOp::Size(path)) => {
                    assert_eq!(output, path)
                }
                other => panic!("unexpected op order: {other:?}"),
            }
        }
    }

    #[test]
    fn transform_failure_aborts_whole_derivation() {
        // Third call = `medium`
        let backend = MockBackend::with_source(SOURCE, 4000, 3000).failing_transform_at(3);
        let err = derive_mock(&backend).unwrap_err();

        assert!(matches!(err, DerivationError::TransformFailure { .. }));
        assert_eq!(err.key(), VariantKey::Medium);
        assert_eq!(backend.transform_count(), 3);
    }

    #[test]
    fn failure_on_third_ladder_entry_names_low() {
        // original, high, medium succeed; the fourth transform is `low`
        let backend = MockBackend::with_source(SOURCE, 4000, 3000).failing_transform_at(4);
        let err = derive_mock(&backend).unwrap_err();

        assert!(matches!(
            err,
            DerivationError::TransformFailure {
                key: VariantKey::Low,
                ..
            }
        ));
        assert_eq!(backend.transform_count(), 4);
    }

    #[test]
    fn size_failure_is_storage_info_failure() {
        let backend = MockBackend::with_source(SOURCE, 4000, 3000).failing_size_at(1);
        let err = derive_mock(&backend).unwrap_err();

        assert!(matches!(
            err,
            DerivationError::StorageInfoFailure {
                key: VariantKey::Original,
                ..
            }
        ));
    }

    #[test]
    fn unreadable_source_fails_on_original() {
        let backend = MockBackend::new();
        let err = derive(&backend, &backend, Path::new("/nope.jpg"), OutputFormat::Jpeg)
            .unwrap_err();
        assert_eq!(err.key(), VariantKey::Original);
    }

    #[test]
    fn repeated_derivation_is_deterministic() {
        let backend = MockBackend::with_source(SOURCE, 3024, 4032);
        let first = derive_mock(&backend).unwrap();
        let second = derive_mock(&backend).unwrap();

        for key in VariantKey::ALL {
            let (a, b) = (first.get(key).unwrap(), second.get(key).unwrap());
            assert_eq!((a.size, a.width, a.height), (b.size, b.width, b.height));
            assert_ne!(a.path, b.path, "each run materializes new files");
        }
    }

    #[test]
    fn dropping_set_deletes_files_and_keep_detaches() {
        let tmp = tempfile::TempDir::new().unwrap();
        let make = |name: &str| {
            let path = tmp.path().join(name);
            std::fs::write(&path, b"x").unwrap();
            Variant {
                path,
                size: 1,
                width: 1,
                height: 1,
            }
        };

        let dropped = make("a.jpg");
        let set = VariantSet::adopt(BTreeMap::from([(VariantKey::Original, dropped.clone())]));
        drop(set);
        assert!(!dropped.path.exists());

        let kept = make("b.jpg");
        let set = VariantSet::adopt(BTreeMap::from([(VariantKey::Original, kept.clone())]));
        let variants = set.keep();
        assert_eq!(variants.len(), 1);
        assert!(kept.path.exists());
    }

    #[test]
    fn serializes_as_key_map() {
        let backend = MockBackend::with_source(SOURCE, 10, 10);
        let set = derive_mock(&backend).unwrap();
        let json: serde_json::Value = serde_json::to_value(&set).unwrap();

        assert_eq!(json.as_object().unwrap().len(), 8);
        assert_eq!(json["low4"]["width"], 4);
    }
}

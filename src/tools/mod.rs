use crate::error::Result;
use crate::models::{FEATURE_NAMES, FeatureVector, Verdict};
use crate::pipeline::Analyzer;
use rayon::prelude::*;
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Extensions picked up by directory scans
pub const SCAN_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp"];

/// Extensions picked up by dataset extraction
pub const DATASET_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Analyze one file. Only I/O errors are returned; undecodable bytes
/// become an unreadable verdict.
pub fn scan_file<P: AsRef<Path>>(analyzer: &Analyzer, path: P) -> Result<Verdict> {
    let bytes = fs::read(path.as_ref())?;
    Ok(analyzer.analyze(&bytes))
}

/// Analyze many files in parallel; results follow sorted path order.
pub fn scan_paths(analyzer: &Analyzer, paths: &[PathBuf]) -> Vec<(PathBuf, Result<Verdict>)> {
    let mut paths = paths.to_vec();
    paths.sort();
    paths
        .into_par_iter()
        .map(|path| {
            let verdict = scan_file(analyzer, &path);
            (path, verdict)
        })
        .collect()
}

/// Default dataset root from environment variables.
pub fn dataset_root_from_env() -> PathBuf {
    env::var("QR_DATASET_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("dataset"))
}

/// Sorted image paths under `root`, optionally truncated.
pub fn dataset_iter<P: AsRef<Path>>(
    root: P,
    limit: Option<usize>,
) -> impl Iterator<Item = PathBuf> {
    let mut images = collect_images(root.as_ref(), SCAN_EXTENSIONS);
    images.sort();
    if let Some(limit) = limit {
        images.truncate(limit);
    }
    images.into_iter()
}

/// Recursively collect files whose extension (case-insensitive) is in `extensions`.
pub fn collect_images(root: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    let mut stack = vec![root.to_path_buf()];
    let mut images = Vec::new();

    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if let Some(ext) = path.extension() {
                let ext = ext.to_string_lossy().to_lowercase();
                if extensions.contains(&ext.as_str()) {
                    images.push(path);
                }
            }
        }
    }

    images
}

/// One training row
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSample {
    pub path: PathBuf,
    pub features: FeatureVector,
    /// 0 = safe, 1 = fraud
    pub label: u8,
}

/// Feature rows for every readable image under `root/safe` (label 0) and
/// `root/fraud` (label 1), sorted by path.
///
/// Features come from the same code path as inference. Unreadable images
/// are skipped.
pub fn extract_dataset<P: AsRef<Path>>(root: P, analyzer: &Analyzer) -> Vec<LabeledSample> {
    let root = root.as_ref();
    let mut jobs: Vec<(PathBuf, u8)> = Vec::new();
    for (dir, label) in [("safe", 0u8), ("fraud", 1u8)] {
        jobs.extend(
            collect_images(&root.join(dir), DATASET_EXTENSIONS)
                .into_iter()
                .map(|p| (p, label)),
        );
    }
    jobs.sort();

    jobs.into_par_iter()
        .filter_map(|(path, label)| {
            let bytes = match fs::read(&path) {
                Ok(bytes) => bytes,
                Err(err) => {
                    tracing::debug!(path = %path.display(), error = %err, "skipping unreadable file");
                    return None;
                }
            };
            match analyzer.extract_features(&bytes) {
                Ok(features) => Some(LabeledSample {
                    path,
                    features,
                    label,
                }),
                Err(cause) => {
                    tracing::debug!(path = %path.display(), reason = cause.reason(), "skipping");
                    None
                }
            }
        })
        .collect()
}

/// Write samples as CSV: feature columns in model order, then `label`.
pub fn write_dataset_csv<W: Write>(mut out: W, samples: &[LabeledSample]) -> std::io::Result<()> {
    writeln!(out, "{},label", FEATURE_NAMES.join(","))?;
    for s in samples {
        let f = &s.features;
        writeln!(
            out,
            "{},{},{},{},{},{}",
            f.is_https, f.domain_length, f.has_suspicious_words, f.is_upi, f.has_logo, s.label
        )?;
    }
    out.flush()
}

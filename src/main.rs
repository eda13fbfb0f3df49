//! Projection Mapping Warp
//!
//! Batch entry point: reads fragments from a JSON file and prints the mesh
//! and homography of each as JSON.

use std::path::PathBuf;

use anyhow::{bail, Context};
use projmap_warp::{Fragment, FragmentOutput, HomographyEstimator, Triangulator};
use serde::Serialize;

#[derive(Serialize)]
struct FragmentReport {
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<FragmentOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        bail!("usage: projmap-warp <fragments.json>");
    };

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let fragments: Vec<Fragment> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse fragments from {}", path.display()))?;

    log::info!("Loaded {} fragments from {}", fragments.len(), path.display());

    let triangulator = Triangulator::default();
    let estimator = HomographyEstimator::default();

    let reports: Vec<FragmentReport> = fragments
        .iter()
        .enumerate()
        .map(|(index, fragment)| match fragment.refresh(&triangulator, &estimator) {
            Ok(output) => FragmentReport {
                index,
                output: Some(output),
                error: None,
            },
            Err(e) => {
                log::warn!("Fragment {} skipped: {}", index, e);
                FragmentReport {
                    index,
                    output: None,
                    error: Some(e.to_string()),
                }
            }
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}

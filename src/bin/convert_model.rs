//! One-shot packaging of the exported room-classifier model.
//!
//! Reads the model architecture (`config.json`) and weights
//! (`model.weights.h5`) from a model directory and writes them as a single
//! `room_classifier.model` bundle: an 8-byte magic followed by two
//! length-prefixed sections (u64 little-endian), config first.
//!
//! Usage: `convert_model [model_dir]` (default `model`).

use std::path::PathBuf;

use anyhow::Context;

const MAGIC: &[u8; 8] = b"RSMODEL1";

fn pack(config: &[u8], weights: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(MAGIC.len() + 16 + config.len() + weights.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&(config.len() as u64).to_le_bytes());
    out.extend_from_slice(config);
    out.extend_from_slice(&(weights.len() as u64).to_le_bytes());
    out.extend_from_slice(weights);
    out
}

fn read_section(rest: &mut &[u8]) -> anyhow::Result<Vec<u8>> {
    anyhow::ensure!(rest.len() >= 8, "missing section length");
    let (len_bytes, tail) = rest.split_at(8);
    let len = u64::from_le_bytes(len_bytes.try_into().expect("8-byte slice")) as usize;
    anyhow::ensure!(tail.len() >= len, "section truncated");
    let (body, tail) = tail.split_at(len);
    *rest = tail;
    Ok(body.to_vec())
}

fn unpack(bundle: &[u8]) -> anyhow::Result<(Vec<u8>, Vec<u8>)> {
    anyhow::ensure!(bundle.len() >= MAGIC.len(), "bundle too short");
    anyhow::ensure!(&bundle[..MAGIC.len()] == MAGIC, "bad magic");
    let mut rest = &bundle[MAGIC.len()..];
    let config = read_section(&mut rest).context("config section")?;
    let weights = read_section(&mut rest).context("weights section")?;
    anyhow::ensure!(rest.is_empty(), "trailing bytes after weights section");
    Ok((config, weights))
}

/// Layer count from a Keras-style architecture JSON, if present.
fn layer_count(config: &serde_json::Value) -> Option<usize> {
    config
        .get("config")?
        .get("layers")?
        .as_array()
        .map(|layers| layers.len())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let model_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("model"));

    let config_path = model_dir.join("config.json");
    let weights_path = model_dir.join("model.weights.h5");
    let out_path = model_dir.join("room_classifier.model");

    tracing::info!("packaging model from {}", model_dir.display());

    let config = std::fs::read(&config_path)
        .with_context(|| format!("read {}", config_path.display()))?;
    let parsed: serde_json::Value =
        serde_json::from_slice(&config).context("config.json is not valid JSON")?;
    let weights = std::fs::read(&weights_path)
        .with_context(|| format!("read {}", weights_path.display()))?;

    let bundle = pack(&config, &weights);
    std::fs::write(&out_path, &bundle)
        .with_context(|| format!("write {}", out_path.display()))?;

    // Read the written file back to make sure the bundle round-trips.
    let written = std::fs::read(&out_path)?;
    let (config_back, weights_back) = unpack(&written).context("verify bundle")?;
    anyhow::ensure!(
        config_back == config && weights_back == weights,
        "bundle verification failed"
    );

    tracing::info!(
        size_mb = bundle.len() as f64 / 1024.0 / 1024.0,
        layers = layer_count(&parsed).unwrap_or(0),
        "model packaged into {}",
        out_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_roundtrip() {
        let config = br#"{"config":{"layers":[{},{}]}}"#;
        let weights = [0u8, 1, 2, 3, 255];
        let bundle = pack(config, &weights);

        let (config_back, weights_back) = unpack(&bundle).expect("unpack should succeed");
        assert_eq!(config_back, config);
        assert_eq!(weights_back, weights);
    }

    #[test]
    fn unpack_rejects_bad_magic() {
        let mut bundle = pack(b"{}", b"w");
        bundle[0] = b'X';
        assert!(unpack(&bundle).is_err());
    }

    #[test]
    fn unpack_rejects_truncated_bundle() {
        let bundle = pack(b"{}", b"some weights");
        assert!(unpack(&bundle[..bundle.len() - 1]).is_err());
        assert!(unpack(&bundle[..MAGIC.len() + 4]).is_err());
    }

    #[test]
    fn unpack_rejects_trailing_bytes() {
        let mut bundle = pack(b"{}", b"w");
        bundle.push(0);
        assert!(unpack(&bundle).is_err());
    }

    #[test]
    fn layer_count_reads_keras_config() {
        let parsed: serde_json::Value =
            serde_json::from_str(r#"{"config":{"layers":[{"a":1},{"b":2},{"c":3}]}}"#).unwrap();
        assert_eq!(layer_count(&parsed), Some(3));

        let empty: serde_json::Value = serde_json::from_str("{}").unwrap();
        assert_eq!(layer_count(&empty), None);
    }
}

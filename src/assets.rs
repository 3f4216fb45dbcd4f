//! Asset source: loads the read-once asset list before the run starts.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};

use taraflow_core::Asset;

/// Load asset definitions from a JSON file (an array of asset records).
/// Records failing validation or repeating an id are skipped with a warning
/// rather than aborting the run.
pub fn load_assets(path: &Path) -> Result<Vec<Arc<Asset>>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read asset file: {}", path.display()))?;
    let records: Vec<Asset> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse asset file: {}", path.display()))?;

    let mut assets = Vec::new();
    let mut seen = HashSet::new();
    for asset in records {
        if let Err(err) = asset.validate() {
            log::warn!("skipping invalid asset record: {err}");
            continue;
        }
        if !seen.insert(asset.asset_id.clone()) {
            log::warn!("skipping duplicate asset id: {}", asset.asset_id);
            continue;
        }
        assets.push(Arc::new(asset));
    }

    if assets.is_empty() {
        return Err(anyhow!(
            "no valid asset records found in {}",
            path.display()
        ));
    }
    Ok(assets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_loads_and_filters_records() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"asset_id": "A-001", "asset_name": "ECU-Gateway", "kind": "Hardware",
                  "communication_protocol": "CAN"}},
                {{"asset_id": "", "asset_name": "invalid"}},
                {{"asset_id": "A-001", "asset_name": "duplicate"}},
                {{"asset_id": "A-002", "asset_name": "Telematics data", "kind": "Data"}}
            ]"#
        )
        .unwrap();

        let assets = load_assets(file.path()).unwrap();
        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0].asset_id, "A-001");
        assert_eq!(assets[1].asset_id, "A-002");
    }

    #[test]
    fn test_empty_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[]").unwrap();
        assert!(load_assets(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_assets(Path::new("/definitely/not/there.json")).is_err());
    }
}

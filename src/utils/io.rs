use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use thiserror::Error;

use crate::data::scaler::{MinMaxScaler, RobustScaler};
use crate::model::classifier::ClassifierArtifact;

#[derive(Error, Debug)]
pub enum ReadError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Decode(#[from] bincode::Error),
}

#[derive(Error, Debug)]
pub enum WriteError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Encode(#[from] bincode::Error),
}

/// Artifacts are bincode-encoded serde values; whatever writes them must go
/// through `save_artifact` so the bytes round-trip.
pub fn save_artifact<T: Serialize>(path: &Path, artifact: &T) -> Result<(), WriteError> {
    let data = bincode::serialize(artifact)?;
    std::fs::write(path, data)?;
    Ok(())
}

pub fn load_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, ReadError> {
    let data = std::fs::read(path)?;
    let artifact = bincode::deserialize(&data)?;
    Ok(artifact)
}

pub fn save_classifier(path: &Path, model: &ClassifierArtifact) -> Result<(), WriteError> {
    save_artifact(path, model)
}

pub fn save_robust_scaler(path: &Path, scaler: &RobustScaler) -> Result<(), WriteError> {
    save_artifact(path, scaler)
}

pub fn save_minmax_scaler(path: &Path, scaler: &MinMaxScaler) -> Result<(), WriteError> {
    save_artifact(path, scaler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn scratch(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("rainfall-io-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_saved_scaler_loads_back_identical() {
        let dir = scratch("scaler");
        let path = dir.join("scaler_robust.bin");
        let scaler = RobustScaler::new(array![1.0, 2.0, 3.0, 4.0, 5.0], array![0.5, 0.5, 0.5, 0.5, 0.5]).unwrap();

        save_robust_scaler(&path, &scaler).unwrap();
        let loaded: RobustScaler = load_artifact(&path).unwrap();
        assert_eq!(loaded, scaler);

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = scratch("missing");
        let result: Result<RobustScaler, _> = load_artifact(&dir.join("nope.bin"));
        assert!(matches!(result, Err(ReadError::Io(_))));
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_garbage_bytes_are_decode_error() {
        let dir = scratch("garbage");
        let path = dir.join("scaler_minmax.bin");
        std::fs::write(&path, [0xff_u8; 3]).unwrap();
        let result: Result<MinMaxScaler, _> = load_artifact(&path);
        assert!(matches!(result, Err(ReadError::Decode(_))));
        std::fs::remove_dir_all(dir).ok();
    }
}

use crate::{WaveformStoreError, WaveformStoreResult};
use chrono::Utc;
use pulsecal_common::{Channel, Real};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, info};

pub const EXTENSION: &str = "json";
pub const CREATED_KEY: &str = "created";

/// Returns `path` with the store's extension, adding it if absent.
pub fn with_extension(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|ext| ext == EXTENSION) {
        path.to_owned()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(".");
        name.push(EXTENSION);
        PathBuf::from(name)
    }
}

/// A persisted run: free-form metadata and, per scope channel, a list of captured pulses.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveformFile {
    #[serde(skip)]
    path: PathBuf,
    meta: BTreeMap<String, Value>,
    data: BTreeMap<Channel, Vec<Vec<Real>>>,
}

impl WaveformFile {
    /// Creates an empty file which will be written to `path`, stamped with the current time.
    pub fn new(path: &Path) -> Self {
        let mut file = Self {
            path: with_extension(path),
            ..Default::default()
        };
        file.meta
            .insert(CREATED_KEY.to_owned(), Value::String(Utc::now().to_rfc3339()));
        file
    }

    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> WaveformStoreResult<Self> {
        let path = with_extension(path);
        let reader = BufReader::new(File::open(&path)?);
        let mut file: Self = serde_json::from_reader(reader)?;
        debug!(
            "Loaded {} channels and {} metadata entries",
            file.data.len(),
            file.meta.len()
        );
        file.path = path;
        Ok(file)
    }

    #[tracing::instrument(skip_all, fields(path = %self.path.display()))]
    pub fn save(&self) -> WaveformStoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        info!("Saved {} pulses", self.pulse_count());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn add_meta_data<T: Serialize>(&mut self, key: &str, value: T) -> WaveformStoreResult<()> {
        self.meta
            .insert(key.to_owned(), serde_json::to_value(value)?);
        Ok(())
    }

    /// Returns `None` if the key is absent.
    pub fn get_meta_data<T: DeserializeOwned>(&self, key: &str) -> WaveformStoreResult<Option<T>> {
        self.meta
            .get(key)
            .map(|value| serde_json::from_value(value.clone()))
            .transpose()
            .map_err(WaveformStoreError::from)
    }

    /// Appends one pulse to `channel`.
    pub fn add_data(&mut self, pulse: Vec<Real>, channel: Channel) {
        self.data.entry(channel).or_default().push(pulse);
    }

    pub fn get_data(&self, channel: Channel) -> Option<&[Vec<Real>]> {
        self.data.get(&channel).map(Vec::as_slice)
    }

    pub fn channels(&self) -> impl Iterator<Item = Channel> + '_ {
        self.data.keys().copied()
    }

    pub fn pulse_count(&self) -> usize {
        self.data.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("pulsecal-store-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn extension() {
        assert_eq!(with_extension(Path::new("a/run_1")), Path::new("a/run_1.json"));
        assert_eq!(
            with_extension(Path::new("a/run_1.json")),
            Path::new("a/run_1.json")
        );
        assert_eq!(
            with_extension(Path::new("a/run.v2")),
            Path::new("a/run.v2.json")
        );
    }

    #[test]
    fn meta_data() {
        let mut file = WaveformFile::new(Path::new("unused"));
        file.add_meta_data("tellie_channel", 13).unwrap();
        file.add_meta_data("timeform_1", vec![0.0, 1e-9]).unwrap();
        assert_eq!(file.get_meta_data::<u32>("tellie_channel").unwrap(), Some(13));
        assert_eq!(
            file.get_meta_data::<Vec<Real>>("timeform_1").unwrap(),
            Some(vec![0.0, 1e-9])
        );
        assert_eq!(file.get_meta_data::<u32>("rate").unwrap(), None);
        assert!(file.get_meta_data::<u32>("timeform_1").is_err());
        assert!(file.get_meta_data::<String>(CREATED_KEY).unwrap().is_some());
    }

    #[test]
    fn save_and_load() {
        let path = temp_path("save_and_load");
        let mut file = WaveformFile::new(&path);
        file.add_meta_data("width", 6000).unwrap();
        file.add_data(vec![0.0, 0.5, 0.25], 1);
        file.add_data(vec![0.0, 0.4, 0.2], 1);
        file.add_data(vec![1.0, 2.0, 3.0], 4);
        file.save().unwrap();

        let loaded = WaveformFile::load(&path).unwrap();
        assert_eq!(loaded.path(), with_extension(&path));
        assert_eq!(loaded, file);
        assert_eq!(loaded.pulse_count(), 3);
        assert_eq!(loaded.channels().collect::<Vec<_>>(), vec![1, 4]);
        assert_eq!(loaded.get_data(1).unwrap().len(), 2);
        assert!(loaded.get_data(2).is_none());

        std::fs::remove_file(loaded.path()).unwrap();
    }

    #[test]
    fn load_missing() {
        assert!(matches!(
            WaveformFile::load(&temp_path("missing")),
            Err(WaveformStoreError::IO(_))
        ));
    }
}

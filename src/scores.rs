use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Placeholder best for games where fewer moves or seconds wins.
pub const UNSET_LOWER_BEST: u32 = 9999;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("score file i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("score file is not valid json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which direction counts as an improvement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ranking {
    HigherIsBetter,
    LowerIsBetter,
}

impl Ranking {
    pub fn improves(self, candidate: u32, current: u32) -> bool {
        match self {
            Ranking::HigherIsBetter => candidate > current,
            Ranking::LowerIsBetter => candidate < current,
        }
    }
}

/// One persisted best value per game (and per Minesweeper difficulty).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScoreKey {
    Memory,
    Dino,
    Snake,
    Tetris,
    Flappy,
    Game2048,
    Breakout,
    MinesBeginner,
    MinesIntermediate,
}

impl ScoreKey {
    pub const ALL: [ScoreKey; 9] = [
        ScoreKey::Memory,
        ScoreKey::Dino,
        ScoreKey::Snake,
        ScoreKey::Tetris,
        ScoreKey::Flappy,
        ScoreKey::Game2048,
        ScoreKey::Breakout,
        ScoreKey::MinesBeginner,
        ScoreKey::MinesIntermediate,
    ];

    /// Storage key. These strings are the on-disk format.
    pub fn as_str(self) -> &'static str {
        match self {
            ScoreKey::Memory => "hs-memory",
            ScoreKey::Dino => "hs-dino",
            ScoreKey::Snake => "hs-snake",
            ScoreKey::Tetris => "hs-tetris",
            ScoreKey::Flappy => "hs-flappy",
            ScoreKey::Game2048 => "hs-2048",
            ScoreKey::Breakout => "hs-breakout",
            ScoreKey::MinesBeginner => "ms-best-0",
            ScoreKey::MinesIntermediate => "ms-best-1",
        }
    }

    pub fn ranking(self) -> Ranking {
        match self {
            ScoreKey::Memory | ScoreKey::MinesBeginner | ScoreKey::MinesIntermediate => {
                Ranking::LowerIsBetter
            }
            _ => Ranking::HigherIsBetter,
        }
    }

    pub fn default_best(self) -> u32 {
        match self.ranking() {
            Ranking::HigherIsBetter => 0,
            Ranking::LowerIsBetter => UNSET_LOWER_BEST,
        }
    }

    /// Whether `value` is a real record rather than the default.
    pub fn is_set(self, value: u32) -> bool {
        value != self.default_best()
    }

    fn parse(self, raw: &str) -> Option<u32> {
        let value: u32 = raw.trim().parse().ok()?;
        // A stored zero means "never finished" for move/time keys.
        if self.ranking() == Ranking::LowerIsBetter && value == 0 {
            return None;
        }
        Some(value)
    }
}

/// Raw string key-value persistence.
pub trait KeyValueStore {
    fn load(&self) -> Result<HashMap<String, String>, StoreError>;
    fn save(&self, entries: &HashMap<String, String>) -> Result<(), StoreError>;
}

/// JSON object on disk, `{"hs-snake": "12", ...}`.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn load(&self) -> Result<HashMap<String, String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &HashMap<String, String>) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        // Sorted keys keep the file stable between writes.
        let sorted: BTreeMap<_, _> = entries.iter().collect();
        fs::write(&self.path, serde_json::to_string_pretty(&sorted)?)?;
        Ok(())
    }
}

/// Process-local store for tests and `--no-persist`.
#[derive(Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RefCell::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self) -> Result<HashMap<String, String>, StoreError> {
        Ok(self.entries.borrow().clone())
    }

    fn save(&self, entries: &HashMap<String, String>) -> Result<(), StoreError> {
        *self.entries.borrow_mut() = entries.clone();
        Ok(())
    }
}

/// Best values for every game, cached in memory and written through to a
/// [`KeyValueStore`]. Storage failures are logged and otherwise ignored.
pub struct ScoreStore {
    backend: Box<dyn KeyValueStore>,
    raw: HashMap<String, String>,
    best: HashMap<ScoreKey, u32>,
}

impl ScoreStore {
    pub fn open(backend: Box<dyn KeyValueStore>) -> Self {
        let raw = match backend.load() {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("best scores unavailable, using defaults: {}", e);
                HashMap::new()
            }
        };

        let mut best = HashMap::new();
        for key in ScoreKey::ALL {
            let Some(text) = raw.get(key.as_str()) else { continue };
            match key.parse(text) {
                Some(value) => {
                    best.insert(key, value);
                }
                None => tracing::warn!("ignoring stored value {:?} for {}", text, key.as_str()),
            }
        }

        Self { backend, raw, best }
    }

    pub fn in_memory() -> Self {
        Self::open(Box::new(MemoryStore::new()))
    }

    pub fn best(&self, key: ScoreKey) -> u32 {
        self.best.get(&key).copied().unwrap_or_else(|| key.default_best())
    }

    /// Record `value` if it strictly improves on the stored best.
    /// Returns true when it did.
    pub fn submit(&mut self, key: ScoreKey, value: u32) -> bool {
        if !key.ranking().improves(value, self.best(key)) {
            return false;
        }
        self.best.insert(key, value);
        self.raw.insert(key.as_str().to_string(), value.to_string());
        if let Err(e) = self.backend.save(&self.raw) {
            tracing::warn!("could not persist best for {}: {}", key.as_str(), e);
        }
        true
    }
}

/// Default score file: the user data dir, else next to the executable.
pub fn default_scores_path() -> PathBuf {
    if let Some(dir) = dirs::data_dir() {
        return dir.join("minicade").join("scores.json");
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            return dir.join("minicade.scores.json");
        }
    }
    PathBuf::from("minicade.scores.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn load(&self) -> Result<HashMap<String, String>, StoreError> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into())
        }

        fn save(&self, _: &HashMap<String, String>) -> Result<(), StoreError> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into())
        }
    }

    #[test]
    fn defaults_depend_on_ranking() {
        let store = ScoreStore::in_memory();
        assert_eq!(store.best(ScoreKey::Snake), 0);
        assert_eq!(store.best(ScoreKey::Memory), UNSET_LOWER_BEST);
        assert_eq!(store.best(ScoreKey::MinesIntermediate), UNSET_LOWER_BEST);
    }

    #[test]
    fn submit_only_on_strict_improvement() {
        let mut store = ScoreStore::in_memory();
        assert!(store.submit(ScoreKey::Tetris, 300));
        assert!(!store.submit(ScoreKey::Tetris, 300));
        assert!(!store.submit(ScoreKey::Tetris, 100));
        assert_eq!(store.best(ScoreKey::Tetris), 300);

        assert!(store.submit(ScoreKey::Memory, 14));
        assert!(!store.submit(ScoreKey::Memory, 20));
        assert!(store.submit(ScoreKey::Memory, 9));
        assert_eq!(store.best(ScoreKey::Memory), 9);
    }

    #[test]
    fn loads_decimal_text_and_skips_garbage() {
        let backend = MemoryStore::with_entries([
            ("hs-dino", "412"),
            ("hs-snake", "lots"),
            ("ms-best-0", "0"),
            ("ms-best-1", " 97 "),
        ]);
        let store = ScoreStore::open(Box::new(backend));
        assert_eq!(store.best(ScoreKey::Dino), 412);
        assert_eq!(store.best(ScoreKey::Snake), 0);
        assert_eq!(store.best(ScoreKey::MinesBeginner), UNSET_LOWER_BEST);
        assert_eq!(store.best(ScoreKey::MinesIntermediate), 97);
    }

    #[test]
    fn unavailable_storage_degrades_to_memory() {
        let mut store = ScoreStore::open(Box::new(BrokenStore));
        assert_eq!(store.best(ScoreKey::Flappy), 0);
        assert!(store.submit(ScoreKey::Flappy, 7));
        assert_eq!(store.best(ScoreKey::Flappy), 7);
    }

    #[test]
    fn keys_are_unique() {
        let mut seen: Vec<&str> = ScoreKey::ALL.iter().map(|k| k.as_str()).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), ScoreKey::ALL.len());
    }
}

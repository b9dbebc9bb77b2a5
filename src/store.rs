use crate::error::Result;
use crate::notes::{Note, NoteFilter, NoteType, Notes};
use crate::pregnancy::PregnancyRecord;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::{fs, sync::RwLock};
use tracing::{info, warn};

pub const STORAGE_KEY: &str = "materna-ai-storage";
const STORAGE_VERSION: u32 = 0;

/// Load/save adapter for the namespaced client-state blob.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<String>>;
    async fn save(&self, key: &str, value: &str) -> Result<()>;
}

/// One JSON file per key under a data directory.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub async fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).await?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, key: &str, value: &str) -> Result<()> {
        fs::write(self.path_for(key), value).await?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Sw,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub language: Language,
    #[serde(default = "default_prime")]
    pub is_prime: bool,
    #[serde(default)]
    pub pregnancy_data: Option<PregnancyRecord>,
    #[serde(default)]
    pub saved_notes: Notes,
}

// Prime is on for everyone during the beta.
fn default_prime() -> bool {
    true
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            language: Language::default(),
            is_prime: default_prime(),
            pregnancy_data: None,
            saved_notes: Notes::new(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct PersistedBlob {
    state: AppState,
    #[serde(default)]
    version: u32,
}

pub struct AppStore {
    kv: Arc<dyn KeyValueStore>,
    state: RwLock<AppState>,
}

impl AppStore {
    pub async fn load(kv: Arc<dyn KeyValueStore>) -> Result<Arc<Self>> {
        let state = match kv.load(STORAGE_KEY).await? {
            Some(raw) => match serde_json::from_str::<PersistedBlob>(&raw) {
                Ok(blob) => {
                    info!(
                        "Loaded app state ({} notes, version {})",
                        blob.state.saved_notes.len(),
                        blob.version
                    );
                    blob.state
                }
                Err(e) => {
                    warn!("Stored app state is unreadable, starting fresh: {}", e);
                    AppState::default()
                }
            },
            None => AppState::default(),
        };

        Ok(Arc::new(Self {
            kv,
            state: RwLock::new(state),
        }))
    }

    pub async fn snapshot(&self) -> AppState {
        self.state.read().await.clone()
    }

    pub async fn set_language(&self, language: Language) -> Result<()> {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        next.language = language;
        self.commit(&mut state, next).await
    }

    pub async fn set_prime(&self, is_prime: bool) -> Result<()> {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        next.is_prime = is_prime;
        self.commit(&mut state, next).await
    }

    /// Stores the conception date and its derived fields. An out-of-range
    /// date is kept with week 0 so the caller can show the inline message.
    pub async fn set_conception_date(
        &self,
        conception: NaiveDate,
        today: NaiveDate,
    ) -> Result<PregnancyRecord> {
        let record = PregnancyRecord::from_conception(conception, today);
        let mut state = self.state.write().await;
        let mut next = state.clone();
        next.pregnancy_data = Some(record.clone());
        self.commit(&mut state, next).await?;
        Ok(record)
    }

    pub async fn refresh_pregnancy(&self, today: NaiveDate) -> Result<Option<PregnancyRecord>> {
        let mut state = self.state.write().await;
        let Some(record) = state.pregnancy_data.as_ref() else {
            return Ok(None);
        };
        let refreshed = record.refreshed(today);
        if state.pregnancy_data.as_ref() != Some(&refreshed) {
            let mut next = state.clone();
            next.pregnancy_data = Some(refreshed.clone());
            self.commit(&mut state, next).await?;
        }
        Ok(Some(refreshed))
    }

    pub async fn add_note(&self, content: &str, note_type: NoteType) -> Result<Note> {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        let note = next.saved_notes.add(content, note_type)?.clone();
        self.commit(&mut state, next).await?;
        Ok(note)
    }

    pub async fn remove_note(&self, id: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        let removed = next.saved_notes.remove(id);
        if removed {
            self.commit(&mut state, next).await?;
        }
        Ok(removed)
    }

    pub async fn toggle_pin_note(&self, id: &str) -> Result<Option<bool>> {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        let pinned = next.saved_notes.toggle_pin(id);
        if pinned.is_some() {
            self.commit(&mut state, next).await?;
        }
        Ok(pinned)
    }

    pub async fn notes(&self, filter: NoteFilter, search: &str) -> Vec<Note> {
        let state = self.state.read().await;
        state
            .saved_notes
            .filtered(filter, search)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Saves `next` and only then makes it the in-memory state.
    async fn commit(&self, state: &mut AppState, next: AppState) -> Result<()> {
        self.persist(&next).await?;
        *state = next;
        Ok(())
    }

    async fn persist(&self, state: &AppState) -> Result<()> {
        let blob = PersistedBlob {
            state: state.clone(),
            version: STORAGE_VERSION,
        };
        let content = serde_json::to_string(&blob)?;
        self.kv.save(STORAGE_KEY, &content).await
    }
}

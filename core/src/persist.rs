use crate::catalog::{Catalog, UserContext};
use crate::error::Result;
use crate::history::{InteractionStore, UserRecord};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

fn read_file(path: &Path) -> Result<Vec<u8>> {
    let mut f = File::open(path)?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Load a catalog from a `products.json`-shaped file, or from every `*.json`
/// file under a directory (categories concatenated in path order).
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Catalog> {
    let path = path.as_ref();
    let catalog = if path.is_dir() {
        let mut files: Vec<PathBuf> = WalkDir::new(path)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| p.is_file() && p.extension().and_then(|s| s.to_str()) == Some("json"))
            .collect();
        files.sort();
        let mut parts = Vec::with_capacity(files.len());
        for file in files {
            let part: Catalog = serde_json::from_slice(&read_file(&file)?)?;
            parts.push(part);
        }
        Catalog::merge(parts)
    } else {
        serde_json::from_slice(&read_file(path)?)?
    };
    tracing::info!(path = %path.display(), num_items = catalog.item_count(), "loaded catalog");
    Ok(catalog)
}

/// Known users, in the `users.json` shape `{"users": [{"username": ..}]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserDirectory {
    #[serde(default)]
    pub users: Vec<UserContext>,
}

impl UserDirectory {
    /// Case-insensitive lookup on the trimmed username.
    pub fn find(&self, username: &str) -> Option<&UserContext> {
        let wanted = username.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        self.users.iter().find(|u| u.username.to_lowercase() == wanted)
    }
}

pub fn load_users<P: AsRef<Path>>(path: P) -> Result<UserDirectory> {
    let users: UserDirectory = serde_json::from_slice(&read_file(path.as_ref())?)?;
    Ok(users)
}

/// Interaction store kept in a sled database, one bincode record per user.
#[derive(Clone)]
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self { db: sled::open(path)? })
    }
}

impl InteractionStore for SledStore {
    fn load(&self, user: &UserContext) -> Result<UserRecord> {
        match self.db.get(user.username.as_bytes())? {
            Some(bytes) => Ok(bincode::deserialize(&bytes)?),
            None => Ok(UserRecord::default()),
        }
    }

    fn update(&self, user: &UserContext, f: &mut dyn FnMut(&mut UserRecord)) -> Result<()> {
        let mut failure: Option<bincode::Error> = None;
        // sled reruns this closure when another writer wins the swap.
        self.db.update_and_fetch(user.username.as_bytes(), |old| {
            failure = None;
            let mut record = match old.map(bincode::deserialize::<UserRecord>) {
                Some(Ok(record)) => record,
                Some(Err(e)) => {
                    failure = Some(e);
                    return old.map(|bytes| bytes.to_vec());
                }
                None => UserRecord::default(),
            };
            f(&mut record);
            match bincode::serialize(&record) {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    failure = Some(e);
                    old.map(|bytes| bytes.to_vec())
                }
            }
        })?;
        if let Some(e) = failure {
            return Err(e.into());
        }
        self.db.flush()?;
        Ok(())
    }

    fn clear(&self, user: &UserContext) -> Result<()> {
        self.db.remove(user.username.as_bytes())?;
        self.db.flush()?;
        Ok(())
    }
}

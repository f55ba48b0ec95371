//! JSON file store
//!
//! One document per model in the data directory (`.db_User.json`,
//! `.db_UserSession.json`), each an object keyed by primary key. Loaded once
//! at open and rewritten after every mutation.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::sync::Mutex;

use crate::domain::entity::{user::User, user_session::UserSession};
use crate::domain::repository::{UserRepository, UserSessionRepository};
use crate::domain::value_object::{
    email::Email, user_id::UserId, user_password::UserPassword,
};
use crate::error::{AuthError, AuthResult};

const USERS_FILE: &str = ".db_User.json";
const SESSIONS_FILE: &str = ".db_UserSession.json";

// ============================================================================
// Records
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserRecord {
    id: String,
    email: String,
    #[serde(rename = "_password")]
    password: String,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    reset_token: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<&User> for UserRecord {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.as_str().to_string(),
            password: user.password.as_str().to_string(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            session_id: user.session_id.clone(),
            reset_token: user.reset_token.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl TryFrom<UserRecord> for User {
    type Error = AuthError;

    fn try_from(record: UserRecord) -> AuthResult<Self> {
        Ok(User {
            id: parse_user_id(&record.id)?,
            email: Email::from_db(record.email),
            password: UserPassword::from_db(record.password)?,
            first_name: record.first_name,
            last_name: record.last_name,
            session_id: record.session_id,
            reset_token: record.reset_token,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionRecord {
    session_id: String,
    user_id: String,
    created_at: DateTime<Utc>,
}

impl From<&UserSession> for SessionRecord {
    fn from(session: &UserSession) -> Self {
        Self {
            session_id: session.session_id.clone(),
            user_id: session.user_id.to_string(),
            created_at: session.created_at,
        }
    }
}

impl TryFrom<SessionRecord> for UserSession {
    type Error = AuthError;

    fn try_from(record: SessionRecord) -> AuthResult<Self> {
        Ok(UserSession::new_at(
            record.session_id,
            parse_user_id(&record.user_id)?,
            record.created_at,
        ))
    }
}

fn parse_user_id(raw: &str) -> AuthResult<UserId> {
    raw.parse()
        .map_err(|e| AuthError::Internal(format!("stored user id {raw:?} is not a UUID: {e}")))
}

// ============================================================================
// Table
// ============================================================================

/// One JSON document held in memory
struct Table<T> {
    path: PathBuf,
    rows: RwLock<HashMap<String, T>>,
    // Serializes rewrites of the file; never held while `rows` is locked
    write_gate: Mutex<()>,
}

impl<T> Table<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    async fn load(path: PathBuf) -> AuthResult<Self> {
        let rows = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => HashMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %path.display(), rows = rows.len(), "Loaded store file");
        Ok(Self {
            path,
            rows: RwLock::new(rows),
            write_gate: Mutex::new(()),
        })
    }

    fn read<R>(&self, f: impl FnOnce(&HashMap<String, T>) -> R) -> R {
        let rows = self.rows.read().unwrap_or_else(PoisonError::into_inner);
        f(&rows)
    }

    /// Apply `f` and persist the result
    ///
    /// When `f` fails nothing is written.
    async fn mutate<R>(
        &self,
        f: impl FnOnce(&mut HashMap<String, T>) -> AuthResult<R>,
    ) -> AuthResult<R> {
        let _gate = self.write_gate.lock().await;

        let (result, encoded, previous) = {
            let mut rows = self.rows.write().unwrap_or_else(PoisonError::into_inner);
            let previous = rows.clone();
            let result = f(&mut rows)?;
            (result, serde_json::to_vec(&*rows), previous)
        };

        let written = match encoded {
            Ok(bytes) => self.write_file(&bytes).await,
            Err(e) => Err(e.into()),
        };

        if let Err(e) = written {
            // Keep memory in line with what is on disk
            *self.rows.write().unwrap_or_else(PoisonError::into_inner) = previous;
            return Err(e);
        }
        Ok(result)
    }

    async fn write_file(&self, bytes: &[u8]) -> AuthResult<()> {
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

// ============================================================================
// Repository
// ============================================================================

/// File-backed user and session store
pub struct FileAuthRepository {
    users: Table<UserRecord>,
    sessions: Table<SessionRecord>,
}

impl FileAuthRepository {
    /// Open (or create) the store in `dir`
    pub async fn open(dir: impl AsRef<Path>) -> AuthResult<Self> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await?;

        let repo = Self {
            users: Table::load(dir.join(USERS_FILE)).await?,
            sessions: Table::load(dir.join(SESSIONS_FILE)).await?,
        };

        tracing::info!(dir = %dir.display(), "File auth store opened");
        Ok(repo)
    }
}

impl UserRepository for FileAuthRepository {
    async fn save(&self, user: &User) -> AuthResult<()> {
        let record = UserRecord::from(user);
        self.users
            .mutate(|rows| {
                let taken = rows
                    .values()
                    .any(|other| other.email == record.email && other.id != record.id);
                if taken {
                    return Err(AuthError::EmailTaken);
                }
                rows.insert(record.id.clone(), record);
                Ok(())
            })
            .await
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        self.users
            .read(|rows| rows.get(&user_id.to_string()).cloned())
            .map(User::try_from)
            .transpose()
    }

    async fn search_by_email(&self, email: &Email) -> AuthResult<Vec<User>> {
        self.users
            .read(|rows| {
                rows.values()
                    .filter(|r| r.email == email.as_str())
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    async fn all(&self) -> AuthResult<Vec<User>> {
        let mut users = self
            .users
            .read(|rows| rows.values().cloned().collect::<Vec<_>>())
            .into_iter()
            .map(User::try_from)
            .collect::<AuthResult<Vec<_>>>()?;
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn count(&self) -> AuthResult<u64> {
        Ok(self.users.read(|rows| rows.len() as u64))
    }

    async fn remove(&self, user_id: &UserId) -> AuthResult<bool> {
        let key = user_id.to_string();
        self.users.mutate(|rows| Ok(rows.remove(&key).is_some())).await
    }
}

impl UserSessionRepository for FileAuthRepository {
    async fn save(&self, session: &UserSession) -> AuthResult<()> {
        let record = SessionRecord::from(session);
        self.sessions
            .mutate(|rows| {
                rows.insert(record.session_id.clone(), record);
                Ok(())
            })
            .await
    }

    async fn search_by_session_id(&self, session_id: &str) -> AuthResult<Vec<UserSession>> {
        self.sessions
            .read(|rows| rows.get(session_id).cloned())
            .into_iter()
            .map(UserSession::try_from)
            .collect()
    }

    async fn remove(&self, session_id: &str) -> AuthResult<bool> {
        self.sessions
            .mutate(|rows| Ok(rows.remove(session_id).is_some()))
            .await
    }

    async fn purge_created_before(&self, cutoff: DateTime<Utc>) -> AuthResult<u64> {
        self.sessions
            .mutate(|rows| {
                let before = rows.len();
                rows.retain(|_, r| r.created_at >= cutoff);
                Ok((before - rows.len()) as u64)
            })
            .await
    }
}

//! # テスト用モック実装
//!
//! ハンドラテストで使用するインメモリのリポジトリとセッションマネージャ。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! monban-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use monban_domain::{
    password::PasswordHash,
    user::{Email, User, UserId},
};
use uuid::Uuid;

use crate::{
    error::InfraError,
    repository::UserRepository,
    session::{SessionData, SessionManager},
};

// ===== MockUserRepository =====

/// インメモリのユーザーリポジトリ
///
/// `fail()` で作成すると全メソッドが `Unexpected` エラーを返し、
/// データストア障害のシナリオをテストできる。
#[derive(Clone, Default)]
pub struct MockUserRepository {
    users: Arc<Mutex<Vec<(User, PasswordHash)>>>,
    fail:  bool,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 全メソッドが失敗するリポジトリを作成する
    pub fn fail() -> Self {
        Self {
            users: Arc::new(Mutex::new(Vec::new())),
            fail:  true,
        }
    }

    /// テスト用のシードユーザーを追加する
    pub fn add_user(&self, user: User, password_hash: PasswordHash) {
        self.users.lock().unwrap().push((user, password_hash));
    }

    /// 登録済みユーザー数（検証用）
    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_fail(&self) -> Result<(), InfraError> {
        if self.fail {
            return Err(InfraError::unexpected("mock repository failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, InfraError> {
        self.check_fail()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|(u, _)| u.email() == email)
            .map(|(u, _)| u.clone()))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, InfraError> {
        self.check_fail()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|(u, _)| u.id() == id)
            .map(|(u, _)| u.clone()))
    }

    async fn password_hash_of(&self, id: &UserId) -> Result<Option<PasswordHash>, InfraError> {
        self.check_fail()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|(u, _)| u.id() == id)
            .map(|(_, h)| h.clone()))
    }

    async fn create(&self, user: &User, password_hash: &PasswordHash) -> Result<(), InfraError> {
        self.check_fail()?;
        let mut users = self.users.lock().unwrap();

        // 一意制約違反の再現
        if users.iter().any(|(u, _)| u.email() == user.email()) {
            return Err(InfraError::conflict("User", user.email().as_str()));
        }

        users.push((user.clone(), password_hash.clone()));
        Ok(())
    }

    async fn count(&self) -> Result<i64, InfraError> {
        self.check_fail()?;
        Ok(self.users.lock().unwrap().len() as i64)
    }

    async fn update_last_login(&self, _id: &UserId) -> Result<(), InfraError> {
        self.check_fail()?;
        Ok(())
    }
}

// ===== MockSessionManager =====

/// インメモリのセッションマネージャ
///
/// TTL の減衰は再現せず、`get_ttl` は作成時の値をそのまま返す。
#[derive(Clone)]
pub struct MockSessionManager {
    sessions:    Arc<Mutex<HashMap<String, SessionData>>>,
    ttl_seconds: i64,
}

impl Default for MockSessionManager {
    fn default() -> Self {
        Self::new(180)
    }
}

impl MockSessionManager {
    pub fn new(ttl_seconds: i64) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            ttl_seconds,
        }
    }

    /// 保存されているセッション数（検証用）
    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

#[async_trait]
impl SessionManager for MockSessionManager {
    async fn create(&self, data: &SessionData) -> Result<String, InfraError> {
        let session_id = Uuid::new_v4().to_string();
        self.sessions
            .lock()
            .unwrap()
            .insert(session_id.clone(), data.clone());
        Ok(session_id)
    }

    async fn get(&self, session_id: &str) -> Result<Option<SessionData>, InfraError> {
        Ok(self.sessions.lock().unwrap().get(session_id).cloned())
    }

    async fn save(&self, session_id: &str, data: &SessionData) -> Result<(), InfraError> {
        self.sessions
            .lock()
            .unwrap()
            .insert(session_id.to_string(), data.clone());
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<(), InfraError> {
        self.sessions.lock().unwrap().remove(session_id);
        Ok(())
    }

    async fn get_ttl(&self, session_id: &str) -> Result<Option<i64>, InfraError> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .contains_key(session_id)
            .then_some(self.ttl_seconds))
    }
}

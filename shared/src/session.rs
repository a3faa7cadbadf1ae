//! 会话存储
//!
//! 会话只由 `SessionStore` 写入（login / logout），路由守卫和请求层只读。
//! 写入总是整体替换，不做增量修改。
//!
//! 存储分两层：
//! - `Tier::Durable`：跨标签页、跨刷新（浏览器 localStorage）
//! - `Tier::Ephemeral`：仅当前标签页（浏览器 sessionStorage）
//!
//! 存储不可用时（隐私模式、配额不足）会话退化为仅内存，不抛出错误。

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::serde_helper::string_or_number;

// =========================================================
// 领域模型
// =========================================================

/// 用户角色（保持服务器原始拼写）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "EV_OWNER")]
    EvOwner,
    #[serde(rename = "COMPANY")]
    Company,
    #[serde(rename = "CVA")]
    Cva,
    #[serde(rename = "Admin", alias = "ADMIN")]
    Admin,
    #[serde(rename = "USER")]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::EvOwner => "EV_OWNER",
            Role::Company => "COMPANY",
            Role::Cva => "CVA",
            Role::Admin => "Admin",
            Role::User => "USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub email: String,
    pub role: Role,
}

/// Bearer 令牌
///
/// `Debug` 输出已脱敏，令牌本身不会出现在日志或错误消息中。
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// 令牌原文，仅用于构造 Authorization 头
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn authorization_value(&self) -> String {
        format!("Bearer {}", self.0)
    }

    /// 如果令牌是带 `exp` 声明的 JWT，返回其过期时间
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let mut parts = self.0.split('.');
        let (_header, payload, _sig) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }

        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
        let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
        let exp = claims.get("exp")?;
        let secs = exp.as_i64().or_else(|| exp.as_f64().map(|f| f as i64))?;
        DateTime::from_timestamp(secs, 0)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

impl From<String> for BearerToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for BearerToken {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

/// 会话持久化方式（由登录时的 "记住我" 决定）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persistence {
    /// 标签页生命周期
    Session,
    /// 持久保存
    Durable,
}

impl Persistence {
    pub fn tier(&self) -> Tier {
        match self {
            Persistence::Session => Tier::Ephemeral,
            Persistence::Durable => Tier::Durable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: BearerToken,
    pub user: User,
    pub persistence: Persistence,
}

impl Session {
    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.token.expires_at().is_some_and(|exp| exp <= now)
    }
}

// =========================================================
// 存储抽象
// =========================================================

/// 存储层级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Durable,
    Ephemeral,
}

impl Tier {
    pub fn other(&self) -> Tier {
        match self {
            Tier::Durable => Tier::Ephemeral,
            Tier::Ephemeral => Tier::Durable,
        }
    }
}

/// 键值存储接口（浏览器实现见 frontend 的 `web::storage`）
pub trait KeyValueStore {
    fn get(&self, tier: Tier, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, tier: Tier, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, tier: Tier, key: &str) -> Result<(), StorageError>;
}

// =========================================================
// 会话存储
// =========================================================

#[derive(Debug, Default)]
struct StoreState {
    session: Option<Session>,
    /// 写入存储失败，仅保存在内存中
    memory_only: bool,
}

/// 会话存储
///
/// 显式构造并注入到路由层和请求层，克隆共享同一份状态。
#[derive(Clone)]
pub struct SessionStore<S> {
    storage: S,
    key: Arc<str>,
    state: Arc<RwLock<StoreState>>,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: Arc::from(key.into()),
            state: Arc::new(RwLock::new(StoreState::default())),
        }
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// 登录：凭据已由调用方验证，这里只负责保存
    ///
    /// `remember` 为 true 时写入持久层，否则写入标签页层；另一层会被清空。
    pub fn login(&self, user: User, token: impl Into<BearerToken>, remember: bool) -> Session {
        let persistence = if remember {
            Persistence::Durable
        } else {
            Persistence::Session
        };
        let session = Session {
            token: token.into(),
            user,
            persistence,
        };

        let tier = persistence.tier();
        self.remove_quietly(tier.other());

        let written = serde_json::to_string(&session)
            .map_err(|e| StorageError::WriteRejected(e.to_string()))
            .and_then(|json| self.storage.set(tier, &self.key, &json));

        let memory_only = match written {
            Ok(()) => false,
            Err(e) => {
                warn!("[Session] {}; keeping session in memory only", e);
                true
            }
        };

        info!(
            "[Session] {} signed in as {} ({:?})",
            session.user.email, session.user.role, persistence
        );

        *self.write_state() = StoreState {
            session: Some(session.clone()),
            memory_only,
        };
        session
    }

    /// 注销：清空内存和两层存储（幂等）
    pub fn logout(&self) {
        let previous = self.write_state().session.take();
        self.write_state().memory_only = false;
        self.remove_quietly(Tier::Durable);
        self.remove_quietly(Tier::Ephemeral);
        if let Some(session) = previous {
            info!("[Session] {} signed out", session.user.email);
        }
    }

    /// 丢弃内存快照，下一次读取重新从存储加载
    pub fn reload(&self) {
        let mut state = self.write_state();
        if !state.memory_only {
            state.session = None;
        }
    }

    /// 当前会话；匿名时返回 `None`
    pub fn current_user(&self) -> Option<Session> {
        let session = self.resolve()?;
        if session.is_expired_at(Utc::now()) {
            info!("[Session] token expired, clearing session");
            self.logout();
            return None;
        }
        Some(session)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }

    fn resolve(&self) -> Option<Session> {
        let mut state = self.write_state();

        if let Some(cached) = state.session.clone() {
            if state.memory_only {
                return Some(cached);
            }
            let tier = cached.persistence.tier();
            return match self.read_tier(tier) {
                Ok(Some(stored)) => {
                    state.session = Some(stored.clone());
                    Some(stored)
                }
                Ok(None) => {
                    debug!("[Session] entry removed from {:?} storage", tier);
                    state.session = None;
                    None
                }
                Err(e) => {
                    warn!("[Session] {}; using in-memory session", e);
                    Some(cached)
                }
            };
        }

        for tier in [Tier::Ephemeral, Tier::Durable] {
            match self.read_tier(tier) {
                Ok(Some(stored)) => {
                    state.session = Some(stored.clone());
                    state.memory_only = false;
                    return Some(stored);
                }
                Ok(None) => {}
                Err(e) => warn!("[Session] {}", e),
            }
        }
        None
    }

    fn read_tier(&self, tier: Tier) -> Result<Option<Session>, StorageError> {
        let raw = self.storage.get(tier, &self.key)?;
        Ok(raw.and_then(|json| match serde_json::from_str::<Session>(&json) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!("[Session] discarding unreadable {:?} entry: {}", tier, e);
                None
            }
        }))
    }

    fn remove_quietly(&self, tier: Tier) {
        if let Err(e) = self.storage.remove(tier, &self.key) {
            warn!("[Session] failed to clear {:?} storage: {}", tier, e);
        }
    }
}

#[cfg(test)]
pub mod tests;

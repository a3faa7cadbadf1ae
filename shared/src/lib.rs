//! CarbonMart 客户端核心
//!
//! 与运行环境无关的部分：会话、认证请求、路由表与守卫、分页状态机、表单校验。
//! 浏览器相关的实现（fetch、localStorage、History）通过 trait 注入，见 `frontend` crate。

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod guard;
pub mod pagination;
pub mod protocol;
pub mod route;
pub mod serde_helper;
pub mod session;
pub mod task;
pub mod validation;

pub use client::{
    ApiClient, HttpMethod, HttpRequest, HttpResponse, HttpTransport, MultipartForm, RequestBody,
    RequestOptions,
};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, FieldErrors, StorageError};
pub use guard::{GuardDecision, Navigation, navigate};
pub use pagination::{Page, PageRequest, Paginator};
pub use route::{AppRoute, SubApp};
pub use session::{BearerToken, KeyValueStore, Role, Session, SessionStore, Tier, User};
pub use task::RequestScope;

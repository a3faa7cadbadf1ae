//! 运行时配置
//!
//! 默认值可在构建时通过环境变量覆盖（`option_env!`），
//! 未定义时使用下方常量。

use crate::envelope::SuccessCodes;

// =========================================================
// 默认值
// =========================================================

const DEFAULT_API_URL: &str = "http://localhost:8080/api";
const DEFAULT_SESSION_KEY: &str = "carbonmart.session";
const DEFAULT_LOG_LEVEL: &str = "info";

pub const HEADER_TRACE: &str = "X-Request-Trace";
pub const HEADER_DATETIME: &str = "X-Request-DateTime";
pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";

/// 客户端配置
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// API 根地址（不含尾部 `/`）
    pub base_url: String,
    /// 视为成功的 responseCode 集合
    pub success_codes: SuccessCodes,
    /// 会话在浏览器存储中的键名
    pub session_key: String,
    /// 日志级别（trace/debug/info/warn/error）
    pub log_level: String,
    /// 收到 401 时是否清除本地会话
    pub logout_on_unauthorized: bool,
    pub trace_header: String,
    pub datetime_header: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            success_codes: SuccessCodes::default(),
            session_key: DEFAULT_SESSION_KEY.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            logout_on_unauthorized: true,
            trace_header: HEADER_TRACE.to_string(),
            datetime_header: HEADER_DATETIME.to_string(),
        }
    }
}

impl ClientConfig {
    /// 读取构建时注入的变量，读不到则使用默认值
    pub fn from_build_env() -> Self {
        Self::from_overrides(
            option_env!("CARBONMART_API_URL"),
            option_env!("CARBONMART_SUCCESS_CODES"),
            option_env!("CARBONMART_SESSION_KEY"),
            option_env!("CARBONMART_LOG_LEVEL"),
        )
    }

    fn from_overrides(
        api_url: Option<&str>,
        success_codes: Option<&str>,
        session_key: Option<&str>,
        log_level: Option<&str>,
    ) -> Self {
        let mut config = Self::default();
        if let Some(url) = api_url.filter(|v| !v.trim().is_empty()) {
            config = config.with_base_url(url);
        }
        if let Some(codes) = success_codes {
            let parsed = SuccessCodes::parse_list(codes);
            if !parsed.is_empty() {
                config.success_codes = parsed;
            }
        }
        if let Some(key) = session_key.filter(|v| !v.trim().is_empty()) {
            config.session_key = key.trim().to_string();
        }
        if let Some(level) = log_level.filter(|v| !v.trim().is_empty()) {
            config.log_level = level.trim().to_ascii_lowercase();
        }
        config
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim().trim_end_matches('/').to_string();
        self
    }

    /// 拼接完整 URL
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// URL 是否落在 `base_url` 之下
    ///
    /// `base_url` 为空时请求走页面同源，只接受相对路径。
    pub fn is_api_url(&self, url: &str) -> bool {
        if self.base_url.is_empty() {
            return !url.contains("://") && !url.starts_with("//");
        }
        match url.strip_prefix(self.base_url.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with(['/', '?', '#']),
            None => false,
        }
    }

    /// 解析日志级别，无法识别时回退到 Info
    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level
            .parse::<log::LevelFilter>()
            .unwrap_or(log::LevelFilter::Info)
    }
}

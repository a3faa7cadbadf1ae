//! 表单校验
//!
//! 通用的多字段校验：`FormSchema` 声明字段及规则，`validate` 一次性给出全部字段错误，
//! `validate_field` 用于输入时的单字段提示。校验失败阻止提交，错误不会发送到服务器。

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::FieldErrors;
use crate::protocol::{
    ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, Portal, RegisterRequest,
    VerifyOtpRequest,
};
use crate::session::Role;

pub type FormValues = BTreeMap<String, String>;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .unwrap_or_else(|e| panic!("invalid email pattern: {e}"))
});

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?[0-9][0-9 \-]{6,18}[0-9]$")
        .unwrap_or_else(|e| panic!("invalid phone pattern: {e}"))
});

pub const MIN_PASSWORD_LEN: usize = 8;
pub const OTP_LEN: usize = 6;

// =========================================================
// 规则
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Required,
    Email,
    MinLength(usize),
    MaxLength(usize),
    /// 恰好 n 位数字
    Digits(usize),
    /// 与另一字段的值相同
    Matches(&'static str),
    Phone,
}

impl Rule {
    fn check(&self, label: &str, value: &str, values: &FormValues) -> Option<String> {
        let trimmed = value.trim();
        match self {
            Rule::Required if trimmed.is_empty() => Some(format!("{} is required", label)),
            Rule::Required => None,
            // 其余规则只在有值时检查
            _ if trimmed.is_empty() => None,
            Rule::Email if !EMAIL_RE.is_match(trimmed) => {
                Some("Enter a valid email address".to_string())
            }
            Rule::MinLength(n) if value.chars().count() < *n => {
                Some(format!("{} must be at least {} characters", label, n))
            }
            Rule::MaxLength(n) if value.chars().count() > *n => {
                Some(format!("{} must be at most {} characters", label, n))
            }
            Rule::Digits(n)
                if trimmed.len() != *n || !trimmed.chars().all(|c| c.is_ascii_digit()) =>
            {
                Some(format!("{} must be {} digits", label, n))
            }
            Rule::Matches(other) if values.get(*other).map(String::as_str) != Some(value) => {
                Some(format!("{} does not match", label))
            }
            Rule::Phone if !PHONE_RE.is_match(trimmed) => {
                Some("Enter a valid phone number".to_string())
            }
            _ => None,
        }
    }
}

// =========================================================
// 表单模式
// =========================================================

#[derive(Debug, Clone)]
struct FieldSpec {
    name: &'static str,
    label: &'static str,
    rules: Vec<Rule>,
}

#[derive(Debug, Clone, Default)]
pub struct FormSchema {
    fields: Vec<FieldSpec>,
}

impl FormSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(
        mut self,
        name: &'static str,
        label: &'static str,
        rules: impl IntoIterator<Item = Rule>,
    ) -> Self {
        self.fields.push(FieldSpec {
            name,
            label,
            rules: rules.into_iter().collect(),
        });
        self
    }

    /// 单字段校验，返回第一条错误
    pub fn validate_field(&self, name: &str, values: &FormValues) -> Option<String> {
        let spec = self.fields.iter().find(|f| f.name == name)?;
        let value = values.get(name).map(String::as_str).unwrap_or_default();
        spec.rules
            .iter()
            .find_map(|rule| rule.check(spec.label, value, values))
    }

    /// 全表单校验
    pub fn validate(&self, values: &FormValues) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        for spec in &self.fields {
            if let Some(message) = self.validate_field(spec.name, values) {
                errors.insert(spec.name, message);
            }
        }
        errors.into_result()
    }
}

fn values<const N: usize>(pairs: [(&str, &str); N]) -> FormValues {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// =========================================================
// 类型化表单
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub remember: bool,
}

/// 已通过校验的登录表单
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedLogin {
    pub email: String,
    pub password: String,
    pub remember: bool,
}

impl ValidatedLogin {
    pub fn into_request(self, portal: Portal) -> LoginRequest {
        LoginRequest {
            email: self.email,
            password: self.password,
            portal,
        }
    }
}

impl LoginForm {
    pub fn schema() -> FormSchema {
        FormSchema::new()
            .field("email", "Email", [Rule::Required, Rule::Email])
            .field("password", "Password", [Rule::Required])
    }

    pub fn values(&self) -> FormValues {
        values([("email", self.email.as_str()), ("password", self.password.as_str())])
    }

    /// 校验通过后邮箱去掉首尾空白，其余字段原样保留
    ///
    /// 规则本身按去空白后的值检查，因此送往服务器和会话的邮箱与校验的是同一个值。
    pub fn validate(&self) -> Result<ValidatedLogin, FieldErrors> {
        Self::schema().validate(&self.values())?;
        Ok(ValidatedLogin {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            remember: self.remember,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
    /// 自助注册只开放 EV 车主和企业
    pub role: Role,
    pub accept_terms: bool,
}

impl Default for RegisterForm {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            email: String::new(),
            phone: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            role: Role::EvOwner,
            accept_terms: false,
        }
    }
}

impl RegisterForm {
    pub fn schema() -> FormSchema {
        FormSchema::new()
            .field("fullName", "Full name", [Rule::Required, Rule::MaxLength(100)])
            .field("email", "Email", [Rule::Required, Rule::Email])
            .field("phone", "Phone", [Rule::Required, Rule::Phone])
            .field(
                "password",
                "Password",
                [Rule::Required, Rule::MinLength(MIN_PASSWORD_LEN)],
            )
            .field(
                "confirmPassword",
                "Password confirmation",
                [Rule::Required, Rule::Matches("password")],
            )
    }

    pub fn values(&self) -> FormValues {
        values([
            ("fullName", self.full_name.as_str()),
            ("email", self.email.as_str()),
            ("phone", self.phone.as_str()),
            ("password", self.password.as_str()),
            ("confirmPassword", self.confirm_password.as_str()),
        ])
    }

    pub fn validate(&self) -> Result<RegisterRequest, FieldErrors> {
        let mut errors = Self::schema()
            .validate(&self.values())
            .err()
            .unwrap_or_default();
        if !matches!(self.role, Role::EvOwner | Role::Company) {
            errors.insert("role", "Choose an EV owner or company account");
        }
        if !self.accept_terms {
            errors.insert("acceptTerms", "You must accept the terms to continue");
        }
        errors.into_result()?;

        Ok(RegisterRequest {
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            password: self.password.clone(),
            role: self.role,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtpForm {
    pub email: String,
    pub code: String,
}

impl OtpForm {
    pub fn schema() -> FormSchema {
        FormSchema::new()
            .field("email", "Email", [Rule::Required, Rule::Email])
            .field("otp", "Verification code", [Rule::Required, Rule::Digits(OTP_LEN)])
    }

    pub fn values(&self) -> FormValues {
        values([("email", self.email.as_str()), ("otp", self.code.as_str())])
    }

    pub fn validate(&self) -> Result<VerifyOtpRequest, FieldErrors> {
        Self::schema().validate(&self.values())?;
        Ok(VerifyOtpRequest {
            email: self.email.trim().to_string(),
            otp: self.code.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForgotPasswordForm {
    pub email: String,
}

impl ForgotPasswordForm {
    pub fn schema() -> FormSchema {
        FormSchema::new().field("email", "Email", [Rule::Required, Rule::Email])
    }

    pub fn validate(&self, portal: Portal) -> Result<ForgotPasswordRequest, FieldErrors> {
        Self::schema().validate(&values([("email", self.email.as_str())]))?;
        Ok(ForgotPasswordRequest {
            email: self.email.trim().to_string(),
            portal,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangePasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl ChangePasswordForm {
    pub fn schema() -> FormSchema {
        FormSchema::new()
            .field("currentPassword", "Current password", [Rule::Required])
            .field(
                "newPassword",
                "New password",
                [Rule::Required, Rule::MinLength(MIN_PASSWORD_LEN)],
            )
            .field(
                "confirmPassword",
                "Password confirmation",
                [Rule::Required, Rule::Matches("newPassword")],
            )
    }

    pub fn values(&self) -> FormValues {
        values([
            ("currentPassword", self.current_password.as_str()),
            ("newPassword", self.new_password.as_str()),
            ("confirmPassword", self.confirm_password.as_str()),
        ])
    }

    pub fn validate(&self, portal: Portal) -> Result<ChangePasswordRequest, FieldErrors> {
        let mut errors = Self::schema()
            .validate(&self.values())
            .err()
            .unwrap_or_default();
        if !self.new_password.is_empty() && self.new_password == self.current_password {
            errors.insert("newPassword", "New password must differ from the current one");
        }
        errors.into_result()?;

        Ok(ChangePasswordRequest {
            current_password: self.current_password.clone(),
            new_password: self.new_password.clone(),
            portal,
        })
    }
}

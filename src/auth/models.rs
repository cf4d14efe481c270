//! Authentication Models
//! Mission: Define account, claim and login data structures

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Back-office account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    pub is_active: bool,
    pub last_login: Option<String>,
    pub created_at: String,
}

/// Account roles for RBAC
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin, // Full access, including deletes and user management
    #[serde(rename = "staff")]
    Staff, // Catalog and inquiry management
    #[serde(rename = "customer")]
    Customer, // Storefront account, no back-office access
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::Customer => "customer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "staff" => Some(Role::Staff),
            "customer" => Some(Role::Customer),
            _ => None,
        }
    }

    /// Admin or staff: may work the back-office queues.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Staff)
    }
}

/// Wire names owned by the typed claim fields; never carried in `extra`.
pub const RESERVED_CLAIMS: [&str; 5] = ["id", "username", "role", "iat", "exp"];

/// Token claims payload.
///
/// Field names on the wire (`id`, `username`, `role`, `iat`, `exp`) match the
/// tokens already handed out to existing clients. Anything else found in a
/// payload is kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "id", deserialize_with = "de_subject_id")]
    pub subject_id: i64,
    #[serde(rename = "username", default, skip_serializing_if = "Option::is_none")]
    pub login_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(rename = "iat", default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<i64>,
    #[serde(rename = "exp", default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    pub fn new(subject_id: i64) -> Self {
        Self {
            subject_id,
            login_name: None,
            role: None,
            issued_at: None,
            expires_at: None,
            extra: Map::new(),
        }
    }

    /// Claims for a freshly authenticated account.
    pub fn for_account(account: &Account) -> Self {
        let mut claims = Self::new(account.id)
            .with_login_name(account.username.clone())
            .with_role(account.role);
        if let Some(email) = &account.email {
            claims = claims.with_extra("email", Value::String(email.clone()));
        }
        claims
    }

    pub fn with_login_name(mut self, login_name: impl Into<String>) -> Self {
        self.login_name = Some(login_name.into());
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Attach an extra claim. Reserved names are ignored.
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        let key = key.into();
        if !RESERVED_CLAIMS.contains(&key.as_str()) {
            self.extra.insert(key, value);
        }
        self
    }

    /// Email claim set at login, if any
    pub fn email(&self) -> Option<&str> {
        self.extra
            .get("email")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }

    /// Role used for authorization checks. Tokens from the single-admin
    /// login carry no role and are treated as admin.
    pub fn effective_role(&self) -> Role {
        self.role.unwrap_or(Role::Admin)
    }
}

/// Accepts `7` as well as `"7"`; older issuers emit ids as strings.
fn de_subject_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SubjectId {
        Number(i64),
        Text(String),
    }

    match SubjectId::deserialize(deserializer)? {
        SubjectId::Number(n) => Ok(n),
        SubjectId::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom("subject id is not an integer")),
    }
}

/// Login request body. `email` is accepted as an alias for the login name.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default, alias = "email")]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub expires_in: i64, // seconds until expiration
    pub user: AccountResponse,
}

/// Account response (sanitized)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    pub is_active: bool,
    pub last_login: Option<String>,
    pub created_at: String,
}

impl AccountResponse {
    pub fn from_account(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            role: account.role,
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            company: account.company.clone(),
            is_active: account.is_active,
            last_login: account.last_login.clone(),
            created_at: account.created_at.clone(),
        }
    }
}

/// Identity view of a validated token, returned by `/api/auth/me`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityResponse {
    pub id: i64,
    pub login_name: Option<String>,
    pub role: Role,
    pub issued_at: Option<i64>,
    pub expires_at: Option<i64>,
}

impl IdentityResponse {
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            id: claims.subject_id,
            login_name: claims.login_name.clone(),
            role: claims.effective_role(),
            issued_at: claims.issued_at,
            expires_at: claims.expires_at,
        }
    }
}

/// New back-office account
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
}

/// Storefront self-registration. The role is always customer.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// Defaults to the local part of the email
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
}

impl RegisterRequest {
    pub fn into_account(self) -> NewAccount {
        let email = self.email.trim().to_string();
        let username = self
            .username
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

        NewAccount {
            username,
            email: Some(email),
            password: self.password,
            role: Role::Customer,
            first_name: self.first_name,
            last_name: self.last_name,
            company: self.company,
        }
    }
}

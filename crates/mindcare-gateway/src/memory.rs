//! In-memory gateway
//!
//! A complete implementation of the gateway contract held in process memory.
//! Every row operation runs through [`crate::policy`], so it behaves like a
//! correctly configured hosted backend. Tests and local demos use it.

use crate::auth::{AuthUser, Credentials, Session, SignUp, UserMetadata};
use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::policy::{self, Caller};
use crate::query::{Filter, Query};
use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use dashmap::DashMap;
use mindcare_model::{Collection, ProfileId, Role};
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Account {
    id: ProfileId,
    password: String,
    metadata: UserMetadata,
}

#[derive(Debug, Clone, Copy)]
struct Grant {
    user: ProfileId,
    expires_at: DateTime<Utc>,
}

/// Gateway backed by concurrent maps
#[derive(Debug)]
pub struct InMemoryGateway {
    /// Accounts by lower-cased email
    accounts: DashMap<String, Account>,
    /// Live access tokens
    grants: DashMap<String, Grant>,
    /// Rows keyed by collection and primary key
    rows: DashMap<(Collection, Uuid), Value>,
    /// Session a later `current_session` call will find
    persisted: Mutex<Option<Session>>,
    /// Last timestamp handed out, kept strictly increasing
    clock: Mutex<DateTime<Utc>>,
    session_ttl: Duration,
    confirm_email: bool,
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryGateway {
    /// Create empty gateway; sign-ups get a session immediately
    #[must_use]
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            grants: DashMap::new(),
            rows: DashMap::new(),
            persisted: Mutex::new(None),
            clock: Mutex::new(DateTime::<Utc>::MIN_UTC),
            session_ttl: Duration::hours(1),
            confirm_email: false,
        }
    }

    /// With session lifetime
    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Hold sessions back from sign-up until the email is confirmed
    #[must_use]
    pub fn with_email_confirmation(mut self) -> Self {
        self.confirm_email = true;
        self
    }

    /// Create an account and its profile as a trusted process
    ///
    /// This is the only way to obtain an admin profile.
    pub fn seed_account(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
        role: Role,
    ) -> Result<ProfileId, GatewayError> {
        let metadata = UserMetadata {
            full_name: Some(full_name.to_string()),
        };
        let id = self.register(email, password, metadata)?.id;
        let now = self.tick();
        let row = json!({
            "id": id,
            "email": email,
            "full_name": full_name,
            "phone": null,
            "date_of_birth": null,
            "emergency_contact": null,
            "medical_history": null,
            "role": role,
            "created_at": now,
            "updated_at": now,
        });
        self.rows.insert((Collection::Profiles, id.0), row);
        Ok(id)
    }

    /// Revoke every live token, as if all sessions expired server-side
    pub fn expire_sessions(&self) {
        self.grants.clear();
    }

    /// Stored row, bypassing policy
    #[must_use]
    pub fn row(&self, collection: Collection, id: Uuid) -> Option<Value> {
        self.rows.get(&(collection, id)).map(|r| r.value().clone())
    }

    /// Number of stored rows in `collection`, bypassing policy
    #[must_use]
    pub fn len(&self, collection: Collection) -> usize {
        self.rows.iter().filter(|r| r.key().0 == collection).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn tick(&self) -> String {
        let mut last = self.clock.lock();
        let now = Utc::now();
        let next = if now > *last {
            now
        } else {
            *last + Duration::microseconds(1)
        };
        *last = next;
        next.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn register(
        &self,
        email: &str,
        password: &str,
        metadata: UserMetadata,
    ) -> Result<Account, GatewayError> {
        let key = email.trim().to_lowercase();
        if self.accounts.contains_key(&key) {
            return Err(GatewayError::AlreadyRegistered(key));
        }
        let account = Account {
            id: ProfileId::new(),
            password: password.to_string(),
            metadata,
        };
        self.accounts.insert(key, account.clone());
        Ok(account)
    }

    fn user(account: &Account, email: &str) -> AuthUser {
        AuthUser {
            id: account.id,
            email: Some(email.to_string()),
            metadata: account.metadata.clone(),
        }
    }

    fn issue(&self, account: &Account, email: &str) -> Session {
        let id = account.id;
        let session = Session::new(Uuid::new_v4().to_string(), Self::user(account, email), self.session_ttl);
        self.grants.insert(
            session.access_token.clone(),
            Grant {
                user: id,
                expires_at: session.expires_at,
            },
        );
        *self.persisted.lock() = Some(session.clone());
        session
    }

    fn authorize(&self, session: &Session) -> Result<Caller, GatewayError> {
        let grant = self
            .grants
            .get(&session.access_token)
            .map(|g| *g.value())
            .ok_or(GatewayError::SessionExpired)?;
        if grant.expires_at <= Utc::now() {
            self.grants.remove(&session.access_token);
            return Err(GatewayError::SessionExpired);
        }

        let role = self
            .rows
            .get(&(Collection::Profiles, grant.user.0))
            .and_then(|row| row.get("role").cloned())
            .and_then(|role| serde_json::from_value(role).ok())
            .unwrap_or_default();

        Ok(Caller {
            id: grant.user,
            role,
        })
    }

    fn fill_defaults(&self, collection: Collection, fields: &mut Map<String, Value>) {
        let now = self.tick();
        let mut default = |key: &str, value: Value| {
            fields.entry(key.to_string()).or_insert(value);
        };
        default("id", json!(Uuid::new_v4()));
        default("created_at", json!(now));
        default("updated_at", json!(now));
        match collection {
            Collection::Profiles => {
                default("role", json!(Role::Client));
                for key in ["phone", "date_of_birth", "emergency_contact", "medical_history"] {
                    default(key, Value::Null);
                }
            }
            Collection::Appointments => {
                default("status", json!("pending"));
                default("notes", Value::Null);
            }
            Collection::ConsultationRequests => {
                default("status", json!("pending"));
                default("priority", json!("medium"));
                default("admin_response", Value::Null);
            }
        }
    }

    fn embed_client(&self, caller: &Caller, row: &mut Value) {
        let contact = row
            .get("client_id")
            .and_then(Value::as_str)
            .and_then(|id| Uuid::parse_str(id).ok())
            .and_then(|id| self.row(Collection::Profiles, id))
            .filter(|profile| policy::can_view(caller, Collection::Profiles, profile))
            .map_or(Value::Null, |profile| {
                json!({
                    "full_name": profile.get("full_name").cloned().unwrap_or(Value::Null),
                    "email": profile.get("email").cloned().unwrap_or(Value::Null),
                })
            });
        if let Some(fields) = row.as_object_mut() {
            fields.insert("profiles".to_string(), contact);
        }
    }

    fn visible_rows(&self, caller: &Caller, collection: Collection) -> Vec<Value> {
        self.rows
            .iter()
            .filter(|r| r.key().0 == collection)
            .filter(|r| policy::can_view(caller, collection, r.value()))
            .map(|r| r.value().clone())
            .collect()
    }
}

#[async_trait]
impl Gateway for InMemoryGateway {
    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUp, GatewayError> {
        let metadata = credentials.data.clone().unwrap_or_default();
        let account = self.register(&credentials.email, &credentials.password, metadata)?;
        tracing::debug!(user = %account.id, "registered account");

        let user = Self::user(&account, &credentials.email);
        let session = (!self.confirm_email).then(|| self.issue(&account, &credentials.email));
        Ok(SignUp { user, session })
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, GatewayError> {
        let key = credentials.email.trim().to_lowercase();
        let account = self
            .accounts
            .get(&key)
            .map(|a| a.value().clone())
            .ok_or(GatewayError::InvalidCredentials)?;
        if account.password != credentials.password {
            return Err(GatewayError::InvalidCredentials);
        }
        Ok(self.issue(&account, &credentials.email))
    }

    async fn sign_out(&self, session: &Session) -> Result<(), GatewayError> {
        self.grants.remove(&session.access_token);
        let mut persisted = self.persisted.lock();
        if persisted
            .as_ref()
            .is_some_and(|p| p.access_token == session.access_token)
        {
            *persisted = None;
        }
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>, GatewayError> {
        let persisted = self.persisted.lock().clone();
        Ok(persisted.filter(|s| !s.is_expired()))
    }

    async fn insert(
        &self,
        session: &Session,
        collection: Collection,
        row: Value,
    ) -> Result<Value, GatewayError> {
        let caller = self.authorize(session)?;
        policy::check_insert(&caller, collection, &row)?;

        let Value::Object(mut fields) = row else {
            return Err(GatewayError::PolicyViolation("row must be an object".into()));
        };
        self.fill_defaults(collection, &mut fields);
        let id = fields
            .get("id")
            .and_then(Value::as_str)
            .and_then(|id| Uuid::parse_str(id).ok())
            .ok_or_else(|| GatewayError::Rejected {
                status: 400,
                message: "id must be a uuid".to_string(),
            })?;
        if self.rows.contains_key(&(collection, id)) {
            return Err(GatewayError::Rejected {
                status: 409,
                message: format!("duplicate key {id} in {collection}"),
            });
        }

        let stored = Value::Object(fields);
        self.rows.insert((collection, id), stored.clone());
        tracing::debug!(%collection, %id, caller = %caller.id, "inserted row");
        Ok(stored)
    }

    async fn update(
        &self,
        session: &Session,
        collection: Collection,
        id: Uuid,
        patch: Value,
    ) -> Result<Value, GatewayError> {
        let caller = self.authorize(session)?;
        let not_found = || GatewayError::NotFound { collection, id };

        let mut entry = self.rows.get_mut(&(collection, id)).ok_or_else(not_found)?;
        if !policy::can_view(&caller, collection, entry.value()) {
            return Err(not_found());
        }
        policy::check_update(&caller, collection, entry.value(), &patch)?;

        let now = self.tick();
        if let (Some(current), Value::Object(changes)) = (entry.value_mut().as_object_mut(), patch) {
            for (key, value) in changes {
                current.insert(key, value);
            }
            current.insert("updated_at".to_string(), json!(now));
        }
        tracing::debug!(%collection, %id, caller = %caller.id, "updated row");
        Ok(entry.value().clone())
    }

    async fn select(
        &self,
        session: &Session,
        collection: Collection,
        query: &Query,
    ) -> Result<Vec<Value>, GatewayError> {
        let caller = self.authorize(session)?;
        let mut rows = self.visible_rows(&caller, collection);
        query.apply(&mut rows);
        if query.embed_client && collection != Collection::Profiles {
            for row in &mut rows {
                self.embed_client(&caller, row);
            }
        }
        Ok(rows)
    }

    async fn count(
        &self,
        session: &Session,
        collection: Collection,
        filters: &[Filter],
    ) -> Result<u64, GatewayError> {
        let caller = self.authorize(session)?;
        let count = self
            .visible_rows(&caller, collection)
            .iter()
            .filter(|row| filters.iter().all(|f| f.matches(row)))
            .count();
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GatewayExt;
    use mindcare_model::Profile;

    #[tokio::test]
    async fn sign_in_and_read_own_profile() {
        let gateway = InMemoryGateway::new();
        let id = gateway
            .seed_account("ada@example.com", "secret1", "Ada Client", Role::Client)
            .unwrap();

        let session = gateway
            .sign_in(&Credentials::new("ada@example.com", "secret1"))
            .await
            .unwrap();
        let profile: Profile = gateway.fetch_one(&session, id.0).await.unwrap();
        assert_eq!(profile.role, Role::Client);
        assert_eq!(gateway.current_session().await.unwrap(), Some(session));
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let gateway = InMemoryGateway::new();
        gateway
            .seed_account("ada@example.com", "secret1", "Ada", Role::Client)
            .unwrap();
        let err = gateway
            .sign_in(&Credentials::new("ada@example.com", "nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidCredentials));
    }

    #[tokio::test]
    async fn duplicate_sign_up_is_rejected() {
        let gateway = InMemoryGateway::new();
        let creds = Credentials::new("ada@example.com", "secret1");
        gateway.sign_up(&creds).await.unwrap();
        assert!(matches!(
            gateway.sign_up(&creds).await,
            Err(GatewayError::AlreadyRegistered(_))
        ));
    }

    #[tokio::test]
    async fn expired_sessions_fail_row_calls() {
        let gateway = InMemoryGateway::new();
        gateway
            .seed_account("ada@example.com", "secret1", "Ada", Role::Client)
            .unwrap();
        let session = gateway
            .sign_in(&Credentials::new("ada@example.com", "secret1"))
            .await
            .unwrap();

        gateway.expire_sessions();
        let err = gateway
            .count(&session, Collection::Appointments, &[])
            .await
            .unwrap_err();
        assert!(err.is_auth_failure());
    }

    #[tokio::test]
    async fn timestamps_strictly_increase() {
        let gateway = InMemoryGateway::new();
        let a = gateway.tick();
        let b = gateway.tick();
        assert!(b > a);
    }
}

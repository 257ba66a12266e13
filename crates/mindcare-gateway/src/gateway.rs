//! Gateway seam
//!
//! [`Gateway`] is the whole contract the portal consumes: four auth calls and
//! four row operations over JSON. [`GatewayExt`] layers typed records on top,
//! decoding every row at the boundary.

use crate::auth::{Credentials, Session, SignUp};
use crate::error::GatewayError;
use crate::query::{Filter, Query};
use async_trait::async_trait;
use mindcare_model::{decode_row, decode_rows, Collection, DecodeError, Record};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// External auth and data gateway
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Register a new identity
    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUp, GatewayError>;

    /// Exchange credentials for a session
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, GatewayError>;

    /// Revoke a session
    async fn sign_out(&self, session: &Session) -> Result<(), GatewayError>;

    /// Session persisted by a previous sign-in, if still valid
    async fn current_session(&self) -> Result<Option<Session>, GatewayError>;

    /// Insert one row, returning it as stored
    async fn insert(
        &self,
        session: &Session,
        collection: Collection,
        row: Value,
    ) -> Result<Value, GatewayError>;

    /// Patch one row by key, returning it as stored
    async fn update(
        &self,
        session: &Session,
        collection: Collection,
        id: Uuid,
        patch: Value,
    ) -> Result<Value, GatewayError>;

    /// Rows visible to the session that match `query`
    async fn select(
        &self,
        session: &Session,
        collection: Collection,
        query: &Query,
    ) -> Result<Vec<Value>, GatewayError>;

    /// Number of visible rows matching every filter
    async fn count(
        &self,
        session: &Session,
        collection: Collection,
        filters: &[Filter],
    ) -> Result<u64, GatewayError>;
}

/// Typed record access over any [`Gateway`]
#[async_trait]
pub trait GatewayExt: Gateway {
    /// Select and decode rows of `T`
    async fn fetch<T: Record + Send>(
        &self,
        session: &Session,
        query: &Query,
    ) -> Result<Vec<T>, GatewayError> {
        let rows = self.select(session, T::COLLECTION, query).await?;
        Ok(decode_rows(rows)?)
    }

    /// Fetch exactly one record by key
    async fn fetch_one<T: Record + Send>(
        &self,
        session: &Session,
        id: Uuid,
    ) -> Result<T, GatewayError> {
        let query = Query::all().eq("id", id).limit(1);
        let row = self
            .select(session, T::COLLECTION, &query)
            .await?
            .into_iter()
            .next()
            .ok_or(GatewayError::NotFound {
                collection: T::COLLECTION,
                id,
            })?;
        Ok(decode_row(row)?)
    }

    /// Insert `payload` and decode the stored record
    async fn create<T, P>(&self, session: &Session, payload: &P) -> Result<T, GatewayError>
    where
        T: Record + Send,
        P: Serialize + Sync,
    {
        let row = serde_json::to_value(payload)?;
        let stored = self.insert(session, T::COLLECTION, row).await?;
        decode_stored(stored, T::COLLECTION)
    }

    /// Patch record `id` with `payload` and decode the stored record
    async fn modify<T, P>(&self, session: &Session, id: Uuid, payload: &P) -> Result<T, GatewayError>
    where
        T: Record + Send,
        P: Serialize + Sync,
    {
        let patch = serde_json::to_value(payload)?;
        let stored = self.update(session, T::COLLECTION, id, patch).await?;
        decode_stored(stored, T::COLLECTION)
    }
}

impl<G: Gateway + ?Sized> GatewayExt for G {}

fn decode_stored<T: Record>(row: Value, collection: Collection) -> Result<T, GatewayError> {
    if row.is_null() {
        return Err(DecodeError::Missing(collection).into());
    }
    Ok(decode_row(row)?)
}

//! PostgREST-backed [`RemoteStore`].

use super::{read_error, status_error, transport_error, Connection};
use crate::domain::model::{Fields, Record};
use crate::infra::config::SupabaseSettings;
use crate::storage::{RemoteError, RemoteStore, WriteAck};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::{debug, instrument, trace, warn};

const RETURN_REPRESENTATION: &str = "return=representation";

#[derive(Debug, Clone)]
pub struct SupabaseStore {
    conn: Connection,
}

impl SupabaseStore {
    pub fn new(settings: &SupabaseSettings, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            conn: Connection::new(settings, timeout)?,
        })
    }

    fn table(collection: &str) -> String {
        format!("/rest/v1/{}", collection)
    }

    fn eq(id: &str) -> String {
        format!("eq.{}", id)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Option<Vec<Record>>, RemoteError> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        trace!(status = %status, "PostgREST response");

        if !status.is_success() {
            let (status, details) = read_error(response).await;
            return Err(status_error(status, details));
        }

        let body = response.text().await.map_err(transport_error)?;
        parse_rows(&body)
    }
}

/// `None` for an empty body; a bare object counts as a single row.
fn parse_rows(body: &str) -> Result<Option<Vec<Record>>, RemoteError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let value: JsonValue = serde_json::from_str(body)
        .map_err(|e| RemoteError::Unavailable(format!("unexpected response body: {}", e)))?;

    match value {
        JsonValue::Array(rows) => rows
            .into_iter()
            .map(|row| match row {
                JsonValue::Object(fields) => Ok(Record::new(fields)),
                other => Err(RemoteError::Unavailable(format!(
                    "unexpected row in response: {}",
                    other
                ))),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        JsonValue::Object(fields) => Ok(Some(vec![Record::new(fields)])),
        JsonValue::Null => Ok(None),
        other => Err(RemoteError::Unavailable(format!(
            "unexpected response body: {}",
            other
        ))),
    }
}

#[async_trait]
impl RemoteStore for SupabaseStore {
    #[instrument(skip(self))]
    async fn list_all(&self, collection: &str) -> Result<Vec<Record>, RemoteError> {
        debug!("listing records");
        let request = self
            .conn
            .request(Method::GET, &Self::table(collection))
            .query(&[("select", "*")]);
        Ok(self.send(request).await?.unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Record>, RemoteError> {
        debug!("fetching record");
        let filter = Self::eq(id);
        let request = self
            .conn
            .request(Method::GET, &Self::table(collection))
            .query(&[("select", "*"), ("id", filter.as_str()), ("limit", "1")]);
        let rows = self.send(request).await?.unwrap_or_default();
        Ok(rows.into_iter().next())
    }

    #[instrument(skip(self, fields))]
    async fn create(&self, collection: &str, fields: &Fields) -> Result<WriteAck, RemoteError> {
        debug!(?fields, "creating record");
        let request = self
            .conn
            .request(Method::POST, &Self::table(collection))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(fields);

        match self.send(request).await?.and_then(|rows| rows.into_iter().next()) {
            Some(record) => Ok(WriteAck::Confirmed(record)),
            None => {
                warn!("store returned no representation for insert");
                Ok(WriteAck::Unconfirmed)
            }
        }
    }

    #[instrument(skip(self, fields))]
    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: &Fields,
    ) -> Result<WriteAck, RemoteError> {
        debug!(?fields, "updating record");
        let request = self
            .conn
            .request(Method::PATCH, &Self::table(collection))
            .query(&[("id", Self::eq(id))])
            .header("Prefer", RETURN_REPRESENTATION)
            .json(fields);

        match self.send(request).await? {
            // An empty representation means the filter matched no row.
            Some(rows) => match rows.into_iter().next() {
                Some(record) => Ok(WriteAck::Confirmed(record)),
                None => Err(RemoteError::NotFound),
            },
            None => {
                warn!("store returned no representation for update");
                Ok(WriteAck::Unconfirmed)
            }
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, RemoteError> {
        debug!("deleting record");
        let request = self
            .conn
            .request(Method::DELETE, &Self::table(collection))
            .query(&[("id", Self::eq(id))])
            .header("Prefer", RETURN_REPRESENTATION);

        // No body: the store accepted the delete without echoing rows.
        Ok(self
            .send(request)
            .await?
            .map_or(true, |rows| !rows.is_empty()))
    }

    async fn ping(&self) -> Result<(), RemoteError> {
        self.send(self.conn.request(Method::GET, "/rest/v1/"))
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rows_shapes() {
        assert_eq!(parse_rows("").unwrap(), None);
        assert_eq!(parse_rows("  \n").unwrap(), None);
        assert_eq!(parse_rows("[]").unwrap(), Some(vec![]));

        let rows = parse_rows(r#"[{"id":1,"name":"a"},{"id":2,"name":"b"}]"#)
            .unwrap()
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].id().as_deref(), Some("2"));

        let single = parse_rows(r#"{"id":"x"}"#).unwrap().unwrap();
        assert_eq!(single[0].id().as_deref(), Some("x"));

        assert!(parse_rows("not json").is_err());
        assert!(parse_rows("[1,2]").is_err());
    }
}

//! Selects the remote store/auth implementation named by the settings.

use crate::infra::config::{Settings, StoreBackend};
use crate::infra::supabase::{SupabaseAuth, SupabaseStore};
use crate::storage::{MemoryAuth, MemoryStore, RemoteAuth, RemoteStore};
use anyhow::Context;
use std::sync::Arc;

pub fn connect(settings: &Settings) -> anyhow::Result<(Arc<dyn RemoteStore>, Arc<dyn RemoteAuth>)> {
    match settings.backend {
        StoreBackend::Memory => {
            tracing::warn!("using the in-memory store; data is lost on restart");
            Ok((Arc::new(MemoryStore::new()), Arc::new(MemoryAuth::new())))
        }
        StoreBackend::Supabase => {
            let remote = settings
                .supabase
                .as_ref()
                .context("SUPABASE_URL and SUPABASE_KEY must be set")?;
            let store = SupabaseStore::new(remote, settings.request_timeout)
                .context("building the PostgREST client")?;
            let auth = SupabaseAuth::new(remote, settings.request_timeout)
                .context("building the auth client")?;
            Ok((Arc::new(store), Arc::new(auth)))
        }
    }
}

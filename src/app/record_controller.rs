//! Generic CRUD controller.
//!
//! Sits between the transport layer and the remote store. Each handler runs
//! validate -> remote call -> outcome once; remote faults never escape as
//! errors, they become outcomes with a readable message.

use crate::domain::model::{Call, Completion, Fields, Operation, Resource};
use crate::domain::outcome::Outcome;
use crate::domain::validation::normalize;
use crate::storage::{RemoteError, RemoteStore, WriteAck};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Span};

pub struct RecordController<R: Resource> {
    store: Arc<dyn RemoteStore>,
    resource: R,
    span: Span,
}

impl<R: Resource> RecordController<R> {
    pub fn new(store: Arc<dyn RemoteStore>, resource: R) -> Self {
        let span = info_span!("records", collection = resource.collection());
        Self {
            store,
            resource,
            span,
        }
    }

    /// Replaces the span every event of this controller is recorded under.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn resource(&self) -> &R {
        &self.resource
    }

    fn collection(&self) -> &str {
        self.resource.collection()
    }

    fn finish(&self, call: Call, completion: Completion) -> Outcome {
        // Events emitted while mapping belong to this controller.
        let _entered = self.span.enter();
        self.resource.map_outcome(&call, completion)
    }

    /// Input worth redisplaying: the resource's own fields only.
    fn echo(&self, input: &Fields) -> Fields {
        self.resource
            .writable_fields()
            .iter()
            .filter_map(|f| input.get(*f).map(|v| (f.to_string(), v.clone())))
            .collect()
    }

    fn faulted(&self, call: &Call, fault: RemoteError, input: Option<Fields>) -> Completion {
        error!(parent: &self.span, op = ?call.op, id = call.id.as_deref(), error = %fault, "remote call failed");
        Completion::Faulted { fault, input }
    }

    pub async fn list(&self) -> Outcome {
        let call = Call::new(Operation::List);
        let completion = match self.store.list_all(self.collection()).await {
            Ok(records) => {
                info!(parent: &self.span, count = records.len(), "records retrieved");
                Completion::Listed(records)
            }
            Err(fault) => self.faulted(&call, fault, None),
        };
        self.finish(call, completion)
    }

    pub async fn show(&self, id: &str) -> Outcome {
        let call = Call::with_id(Operation::Show, id);
        let completion = match self.store.get_by_id(self.collection(), id).await {
            Ok(Some(record)) => Completion::Found(record),
            Ok(None) => Completion::Missing,
            Err(fault) => self.faulted(&call, fault, None),
        };
        self.finish(call, completion)
    }

    /// Blank form for `None`, the stored values of `id` otherwise.
    pub async fn show_form(&self, id: Option<&str>) -> Outcome {
        let Some(id) = id else {
            let values = self.resource.form_values(None);
            return self.finish(Call::new(Operation::CreateForm), Completion::FormReady(values));
        };

        let call = Call::with_id(Operation::EditForm, id);
        let completion = match self.store.get_by_id(self.collection(), id).await {
            Ok(Some(record)) => Completion::FormReady(self.resource.form_values(Some(&record))),
            Ok(None) => Completion::Missing,
            Err(fault) => self.faulted(&call, fault, None),
        };
        self.finish(call, completion)
    }

    pub async fn submit_create(&self, input: &Fields) -> Outcome {
        let call = Call::new(Operation::Create);
        let completion = self.write(&call, input).await;
        self.finish(call, completion)
    }

    pub async fn submit_update(&self, id: &str, input: &Fields) -> Outcome {
        let call = Call::with_id(Operation::Update, id);
        let completion = self.write(&call, input).await;
        self.finish(call, completion)
    }

    async fn write(&self, call: &Call, input: &Fields) -> Completion {
        let input = normalize(input);
        let errors = self.resource.validate(&input, call.op);
        if !errors.is_empty() {
            info!(parent: &self.span, op = ?call.op, ?errors, "validation failed");
            return Completion::Invalid {
                errors,
                input: self.echo(&input),
            };
        }

        let data = self.resource.prepare(&input, call.op, Utc::now());
        info!(parent: &self.span, op = ?call.op, id = call.id.as_deref(), ?data, "writing record");

        let result = match &call.id {
            Some(id) => self.store.update(self.collection(), id, &data).await,
            None => self.store.create(self.collection(), &data).await,
        };

        match result {
            Ok(WriteAck::Confirmed(record)) => {
                info!(parent: &self.span, op = ?call.op, id = record.id().as_deref(), "record written");
                Completion::Written(record)
            }
            Ok(WriteAck::Unconfirmed) => {
                warn!(parent: &self.span, op = ?call.op, "empty result from store write");
                Completion::Unconfirmed
            }
            Err(RemoteError::NotFound) => Completion::Missing,
            Err(fault) => self.faulted(call, fault, Some(self.echo(&input))),
        }
    }

    pub async fn destroy(&self, id: &str) -> Outcome {
        let call = Call::with_id(Operation::Delete, id);
        let completion = match self.store.delete(self.collection(), id).await {
            Ok(deleted) => {
                info!(parent: &self.span, id, deleted, "delete finished");
                Completion::Deleted(deleted)
            }
            Err(RemoteError::NotFound) => Completion::Deleted(false),
            Err(fault) => self.faulted(&call, fault, None),
        };
        self.finish(call, completion)
    }
}

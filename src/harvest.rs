use crate::decode::decode_product;
use crate::domain::{DocumentId, IdRange, LegacyKey, ProductId, ProductRecord};
use crate::error::HarvestError;
use crate::store::{ProductStore, find_existing};
use crate::webhallen::ProductClient;

/// What happened to one product id.
#[derive(Debug)]
pub enum ItemOutcome {
    /// Found under `key`; nothing was fetched.
    AlreadyPresent(LegacyKey),
    /// The request never produced a response.
    TransportFailed(HarvestError),
    /// The body was malformed, not an object, or not storable as a document.
    DecodeFailed(HarvestError),
    /// The body decoded to nothing worth keeping.
    Empty,
    Inserted(DocumentId),
}

#[derive(Debug)]
pub enum HarvestEvent<'a> {
    Started { range: IdRange },
    Decoded { record: &'a ProductRecord },
    Item { id: ProductId, outcome: &'a ItemOutcome },
    Finished,
}

pub trait ProgressSink {
    fn event(&self, event: HarvestEvent<'_>);
}

pub struct Harvester<C: ProductClient, S: ProductStore> {
    client: C,
    store: S,
}

impl<C: ProductClient, S: ProductStore> Harvester<C, S> {
    pub fn new(client: C, store: S) -> Self {
        Self { client, store }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Walks `range` in ascending order, one id at a time.
    ///
    /// Per-item failures are reported to `sink` and never stop the loop.
    /// Only a failing store aborts the run.
    pub fn run(&self, range: IdRange, sink: &dyn ProgressSink) -> Result<(), HarvestError> {
        sink.event(HarvestEvent::Started { range });
        for id in range.iter() {
            let outcome = self.process_one(id, sink)?;
            log_outcome(id, &outcome);
            sink.event(HarvestEvent::Item {
                id,
                outcome: &outcome,
            });
        }
        sink.event(HarvestEvent::Finished);
        Ok(())
    }

    pub fn process_one(
        &self,
        id: ProductId,
        sink: &dyn ProgressSink,
    ) -> Result<ItemOutcome, HarvestError> {
        if let Some(key) = find_existing(&self.store, id)? {
            return Ok(ItemOutcome::AlreadyPresent(key));
        }

        let fetched = match self.client.fetch_product(id) {
            Ok(fetched) => fetched,
            Err(err @ HarvestError::Transport { .. }) => {
                return Ok(ItemOutcome::TransportFailed(err));
            }
            Err(err) => return Err(err),
        };

        let record = match decode_product(id, &fetched.body) {
            Ok(record) => record,
            Err(HarvestError::EmptyPayload { .. }) => return Ok(ItemOutcome::Empty),
            Err(err) => return Ok(ItemOutcome::DecodeFailed(err)),
        };
        sink.event(HarvestEvent::Decoded { record: &record });

        match self.store.insert_product(&record) {
            Ok(document_id) => Ok(ItemOutcome::Inserted(document_id)),
            Err(err @ HarvestError::DocumentEncode { .. }) => Ok(ItemOutcome::DecodeFailed(err)),
            Err(err) => Err(err),
        }
    }
}

fn log_outcome(id: ProductId, outcome: &ItemOutcome) {
    match outcome {
        ItemOutcome::AlreadyPresent(key) => {
            tracing::info!(%id, %key, "already in the database, skipping")
        }
        ItemOutcome::Empty => tracing::info!(%id, "empty payload, skipping"),
        ItemOutcome::TransportFailed(err) | ItemOutcome::DecodeFailed(err) => {
            tracing::warn!(%id, "{err}")
        }
        ItemOutcome::Inserted(document_id) => {
            tracing::debug!(%id, document_id = %document_id, "inserted")
        }
    }
}

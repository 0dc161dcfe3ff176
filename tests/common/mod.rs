#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use webhallen_harvester::domain::{DocumentId, LegacyKey, ProductId, ProductRecord};
use webhallen_harvester::error::HarvestError;
use webhallen_harvester::harvest::{HarvestEvent, ItemOutcome, ProgressSink};
use webhallen_harvester::store::{ProductStore, record_document};
use webhallen_harvester::webhallen::{FetchedBody, ProductClient};

/// In-process store with MongoDB's lookup rules: dotted paths, numeric
/// comparison. Records go through the same BSON conversion as a real insert.
#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<Vec<(DocumentId, Value)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(documents: impl IntoIterator<Item = Value>) -> Self {
        let documents = documents
            .into_iter()
            .enumerate()
            .map(|(index, value)| (DocumentId::new(format!("seed-{index}")), value))
            .collect();
        Self {
            documents: Mutex::new(documents),
        }
    }

    pub fn documents(&self) -> Vec<Value> {
        self.documents
            .lock()
            .unwrap()
            .iter()
            .map(|(_, value)| value.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.documents.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProductStore for MemoryStore {
    fn find_one(&self, key: LegacyKey, id: ProductId) -> Result<Option<DocumentId>, HarvestError> {
        let found = self
            .documents
            .lock()
            .unwrap()
            .iter()
            .find(|(_, value)| path_matches(value, key.path(), id))
            .map(|(document_id, _)| document_id.clone());
        Ok(found)
    }

    fn insert_product(&self, record: &ProductRecord) -> Result<DocumentId, HarvestError> {
        record_document(record)?;
        let mut documents = self.documents.lock().unwrap();
        let document_id = DocumentId::new(format!("mem-{}", documents.len()));
        documents.push((document_id.clone(), Value::Object(record.fields().clone())));
        Ok(document_id)
    }
}

fn path_matches(value: &Value, path: &str, id: ProductId) -> bool {
    let target = path
        .split('.')
        .try_fold(value, |current, segment| current.get(segment));
    match target {
        Some(Value::Number(number)) => number.as_f64() == Some(f64::from(id.get())),
        _ => false,
    }
}

pub enum Reply {
    Body(&'static str),
    ConnectionRefused,
}

#[derive(Default)]
pub struct MockWebhallen {
    replies: HashMap<u32, Reply>,
    calls: Mutex<Vec<u32>>,
}

impl MockWebhallen {
    pub fn with(mut self, id: u32, reply: Reply) -> Self {
        self.replies.insert(id, reply);
        self
    }

    pub fn calls(&self) -> Vec<u32> {
        self.calls.lock().unwrap().clone()
    }
}

impl ProductClient for MockWebhallen {
    fn fetch_product(&self, id: ProductId) -> Result<FetchedBody, HarvestError> {
        self.calls.lock().unwrap().push(id.get());
        let url = format!("https://www.webhallen.com/api/product/{id}");
        match self.replies.get(&id.get()) {
            Some(Reply::Body(body)) => Ok(FetchedBody {
                url,
                status: 200,
                body: body.as_bytes().to_vec(),
            }),
            Some(Reply::ConnectionRefused) => Err(HarvestError::Transport {
                url,
                message: "connection refused".to_string(),
            }),
            None => Ok(FetchedBody {
                url,
                status: 404,
                body: b"null".to_vec(),
            }),
        }
    }
}

#[derive(Default)]
pub struct RecordingSink {
    items: Mutex<Vec<(u32, String)>>,
    decoded: Mutex<Vec<Value>>,
    finished: Mutex<bool>,
}

impl RecordingSink {
    pub fn items(&self) -> Vec<(u32, String)> {
        self.items.lock().unwrap().clone()
    }

    pub fn decoded(&self) -> Vec<Value> {
        self.decoded.lock().unwrap().clone()
    }

    pub fn finished(&self) -> bool {
        *self.finished.lock().unwrap()
    }
}

impl ProgressSink for RecordingSink {
    fn event(&self, event: HarvestEvent<'_>) {
        match event {
            HarvestEvent::Item { id, outcome } => {
                let label = match outcome {
                    ItemOutcome::AlreadyPresent(LegacyKey::Nested) => "present:product.id",
                    ItemOutcome::AlreadyPresent(LegacyKey::TopLevel) => "present:id",
                    ItemOutcome::Empty => "empty",
                    ItemOutcome::TransportFailed(_) => "transport",
                    ItemOutcome::DecodeFailed(HarvestError::DocumentEncode { .. }) => "encode",
                    ItemOutcome::DecodeFailed(_) => "decode",
                    ItemOutcome::Inserted(_) => "inserted",
                };
                self.items
                    .lock()
                    .unwrap()
                    .push((id.get(), label.to_string()));
            }
            HarvestEvent::Decoded { record } => {
                self.decoded.lock().unwrap().push(record.clone().into_value());
            }
            HarvestEvent::Started { .. } => {}
            HarvestEvent::Finished => *self.finished.lock().unwrap() = true,
        }
    }
}

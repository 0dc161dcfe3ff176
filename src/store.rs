use mongodb::bson::{self, Bson, Document, doc};
use mongodb::sync::{Client, Collection};

use crate::domain::{DocumentId, LegacyKey, ProductId, ProductRecord};
use crate::error::HarvestError;

pub const DEFAULT_DATABASE: &str = "openpricecomparison";
pub const DEFAULT_COLLECTION: &str = "webhallen";

/// Document store holding one document per product.
pub trait ProductStore {
    /// Looks up a document whose `key` path equals `id`.
    fn find_one(&self, key: LegacyKey, id: ProductId) -> Result<Option<DocumentId>, HarvestError>;

    /// Inserts the record as a new document. Never upserts.
    fn insert_product(&self, record: &ProductRecord) -> Result<DocumentId, HarvestError>;
}

/// Checks every legacy key shape in order and returns the first that matches.
pub fn find_existing<S: ProductStore + ?Sized>(
    store: &S,
    id: ProductId,
) -> Result<Option<LegacyKey>, HarvestError> {
    for key in LegacyKey::ALL {
        if store.find_one(key, id)?.is_some() {
            return Ok(Some(key));
        }
    }
    Ok(None)
}

pub struct MongoStore {
    collection: Collection<Document>,
}

impl MongoStore {
    /// Opens the collection and pings the server so a bad URI fails before
    /// the first product is touched.
    pub fn connect(uri: &str, database: &str, collection: &str) -> Result<Self, HarvestError> {
        let client = Client::with_uri_str(uri)?;
        let database = client.database(database);
        database.run_command(doc! { "ping": 1 }).run()?;
        Ok(Self {
            collection: database.collection::<Document>(collection),
        })
    }
}

impl ProductStore for MongoStore {
    fn find_one(&self, key: LegacyKey, id: ProductId) -> Result<Option<DocumentId>, HarvestError> {
        let mut filter = Document::new();
        filter.insert(key.path(), i64::from(id.get()));
        let found = self.collection.find_one(filter).run()?;
        Ok(found.map(|document| document_id(document.get("_id"))))
    }

    fn insert_product(&self, record: &ProductRecord) -> Result<DocumentId, HarvestError> {
        let document = record_document(record)?;
        let result = self.collection.insert_one(document).run()?;
        Ok(document_id(Some(&result.inserted_id)))
    }
}

/// Converts a record to BSON. Integers beyond `i64` are rejected here, before
/// anything is sent to the server.
pub fn record_document(record: &ProductRecord) -> Result<Document, HarvestError> {
    bson::to_document(record.fields()).map_err(|err| HarvestError::DocumentEncode {
        id: record.id(),
        message: err.to_string(),
    })
}

fn document_id(value: Option<&Bson>) -> DocumentId {
    match value {
        Some(Bson::ObjectId(oid)) => DocumentId::new(oid.to_hex()),
        Some(other) => DocumentId::new(other.to_string()),
        None => DocumentId::new(String::new()),
    }
}

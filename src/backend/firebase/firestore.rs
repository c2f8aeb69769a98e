// SPDX-License-Identifier: MPL-2.0

use super::codec::{decode_document, encode_fields, encode_value};
use super::{FirebaseClient, api_error, invalid};
use crate::backend::{
    BackendError, CollectionPath, Direction, Document, DocumentPath, DocumentStore,
    DocumentUpdate, FieldUpdate, FilterOp, Operation, PermissionContext, Query, Snapshot,
    Subscription,
};
use crate::config::FIRESTORE_URL;
use crate::runtime;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::future::Future;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

/// Last thing forwarded to a polling subscriber.
enum Sent {
    Nothing,
    Docs(Vec<Document>),
    Error(String),
}

impl FirebaseClient {
    fn database(&self) -> String {
        format!("projects/{}/databases/(default)", self.config().project_id)
    }

    fn documents_url(&self) -> String {
        format!("{}/{}/documents", FIRESTORE_URL, self.database())
    }

    fn document_url(&self, path: &str) -> String {
        format!("{}/{}", self.documents_url(), path)
    }

    fn document_name(&self, path: &DocumentPath) -> String {
        format!("{}/documents/{}", self.database(), path)
    }

    /// Map a failed Firestore response onto the error taxonomy.
    async fn firestore_error(
        &self,
        response: reqwest::Response,
        path: &str,
        operation: Operation,
        payload: Option<Value>,
    ) -> BackendError {
        let (status, message, api_status) = api_error(response).await;
        match (status, api_status.as_deref()) {
            (403, _) | (_, Some("PERMISSION_DENIED")) => {
                let mut ctx = PermissionContext::new(path, operation);
                if let Some(payload) = payload {
                    ctx = ctx.with_payload(payload);
                }
                BackendError::PermissionDenied(ctx)
            }
            (401, _) | (_, Some("UNAUTHENTICATED")) => BackendError::NotAuthenticated,
            (404, _) | (_, Some("NOT_FOUND")) => BackendError::NotFound(path.to_string()),
            _ => BackendError::InvalidResponse(format!("{}: {}", status, message)),
        }
    }

    async fn fetch_document(&self, path: &DocumentPath) -> Result<Option<Document>, BackendError> {
        let response = self
            .authorize(self.http().get(self.document_url(path.as_str())))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(self
                .firestore_error(response, path.as_str(), Operation::Get, None)
                .await);
        }

        let resource: Value = response.json().await.map_err(invalid)?;
        decode_document(&resource).map(Some)
    }

    fn structured_query(query: &Query) -> Value {
        let mut filters: Vec<Value> = query
            .filters
            .iter()
            .map(|f| {
                let field = json!({ "fieldPath": f.field });
                match f.op {
                    FilterOp::NotEqual if f.value.is_null() => {
                        json!({ "unaryFilter": { "op": "IS_NOT_NULL", "field": field } })
                    }
                    op => {
                        let op = match op {
                            FilterOp::Equal => "EQUAL",
                            FilterOp::NotEqual => "NOT_EQUAL",
                            FilterOp::ArrayContains => "ARRAY_CONTAINS",
                        };
                        json!({ "fieldFilter": {
                            "field": field,
                            "op": op,
                            "value": encode_value(&f.value),
                        }})
                    }
                }
            })
            .collect();

        let mut structured = json!({
            "from": [{ "collectionId": query.collection.id() }],
        });

        match filters.len() {
            0 => {}
            1 => structured["where"] = filters.remove(0),
            _ => {
                structured["where"] =
                    json!({ "compositeFilter": { "op": "AND", "filters": filters } })
            }
        }

        if !query.order_by.is_empty() {
            let order: Vec<Value> = query
                .order_by
                .iter()
                .map(|o| {
                    let direction = match o.direction {
                        Direction::Ascending => "ASCENDING",
                        Direction::Descending => "DESCENDING",
                    };
                    json!({ "field": { "fieldPath": o.field }, "direction": direction })
                })
                .collect();
            structured["orderBy"] = Value::Array(order);
        }

        if let Some(limit) = query.limit {
            structured["limit"] = json!(limit);
        }

        json!({ "structuredQuery": structured })
    }

    async fn run_query(&self, query: &Query) -> Result<Vec<Document>, BackendError> {
        // Sub-collections are queried relative to their parent document
        let parent_url = match query.collection.parent() {
            Some(parent) => self.document_url(parent.as_str()),
            None => self.documents_url(),
        };

        let response = self
            .authorize(self.http().post(format!("{}:runQuery", parent_url)))
            .json(&Self::structured_query(query))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self
                .firestore_error(response, query.collection.as_str(), Operation::List, None)
                .await);
        }

        let rows: Vec<Value> = response.json().await.map_err(invalid)?;
        rows.iter()
            .filter_map(|row| row.get("document"))
            .map(decode_document)
            .collect()
    }

    fn commit_body(&self, path: &DocumentPath, update: &DocumentUpdate) -> Value {
        let mut fields = serde_json::Map::new();
        let mut mask = Vec::new();
        let mut transforms = Vec::new();

        for (field, op) in update.fields() {
            match op {
                FieldUpdate::Set(value) => {
                    fields.insert(field.clone(), encode_value(value));
                    mask.push(field.clone());
                }
                FieldUpdate::Delete => mask.push(field.clone()),
                FieldUpdate::ArrayUnion(values) => transforms.push(json!({
                    "fieldPath": field,
                    "appendMissingElements": {
                        "values": values.iter().map(encode_value).collect::<Vec<_>>()
                    },
                })),
                FieldUpdate::ArrayRemove(values) => transforms.push(json!({
                    "fieldPath": field,
                    "removeAllFromArray": {
                        "values": values.iter().map(encode_value).collect::<Vec<_>>()
                    },
                })),
            }
        }

        json!({
            "writes": [{
                "update": { "name": self.document_name(path), "fields": fields },
                "updateMask": { "fieldPaths": mask },
                "updateTransforms": transforms,
                "currentDocument": { "exists": true },
            }]
        })
    }

    /// Poll `fetch` until the subscriber goes away. Permission errors end the
    /// stream, the same way a Firestore listener is cancelled by the rules.
    fn poll<F, Fut>(&self, fetch: F) -> Subscription
    where
        F: Fn(FirebaseClient) -> Fut + Send + 'static,
        Fut: Future<Output = Snapshot> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = self.clone();

        let producer = runtime::spawn(async move {
            let mut sent = Sent::Nothing;
            loop {
                let snapshot = fetch(client.clone()).await;
                let stop = matches!(&snapshot, Err(e) if e.is_permission_denied());

                let forward = match (&snapshot, &sent) {
                    (Ok(docs), Sent::Docs(prev)) => docs != prev,
                    (Err(e), Sent::Error(prev)) => e.to_string() != *prev,
                    _ => true,
                };
                if forward {
                    sent = match &snapshot {
                        Ok(docs) => Sent::Docs(docs.clone()),
                        Err(e) => Sent::Error(e.to_string()),
                    };
                    if tx.send(snapshot).is_err() {
                        return;
                    }
                }
                if stop {
                    return;
                }

                tokio::time::sleep(client.poll_interval()).await;
            }
        });

        Subscription::new(rx, producer)
    }
}

#[async_trait]
impl DocumentStore for FirebaseClient {
    async fn get_document(&self, path: &DocumentPath) -> Result<Option<Document>, BackendError> {
        self.fetch_document(path).await
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, BackendError> {
        self.run_query(query).await
    }

    async fn add_document(
        &self,
        collection: &CollectionPath,
        data: Value,
    ) -> Result<String, BackendError> {
        let id = Uuid::new_v4().simple().to_string();
        let body = json!({ "fields": encode_fields(&data)? });

        let response = self
            .authorize(self.http().post(self.document_url(collection.as_str())))
            .query(&[("documentId", id.as_str())])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let path = collection.doc(&id);
            return Err(self
                .firestore_error(response, path.as_str(), Operation::Create, Some(data))
                .await);
        }

        debug!(collection = %collection, id = %id, "document added");
        Ok(id)
    }

    async fn set_document(&self, path: &DocumentPath, data: Value) -> Result<(), BackendError> {
        let body = json!({ "fields": encode_fields(&data)? });

        // PATCH without an update mask replaces the whole document
        let response = self
            .authorize(self.http().patch(self.document_url(path.as_str())))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self
                .firestore_error(response, path.as_str(), Operation::Create, Some(data))
                .await);
        }
        Ok(())
    }

    async fn update_document(
        &self,
        path: &DocumentPath,
        update: DocumentUpdate,
    ) -> Result<(), BackendError> {
        let url = format!("{}:commit", self.documents_url());

        let response = self
            .authorize(self.http().post(url))
            .json(&self.commit_body(path, &update))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self
                .firestore_error(
                    response,
                    path.as_str(),
                    Operation::Update,
                    Some(update.describe()),
                )
                .await);
        }
        Ok(())
    }

    async fn delete_document(&self, path: &DocumentPath) -> Result<(), BackendError> {
        let response = self
            .authorize(self.http().delete(self.document_url(path.as_str())))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self
                .firestore_error(response, path.as_str(), Operation::Delete, None)
                .await);
        }
        Ok(())
    }

    fn subscribe(&self, query: Query) -> Subscription {
        self.poll(move |client| {
            let query = query.clone();
            async move { client.run_query(&query).await }
        })
    }

    fn subscribe_document(&self, path: DocumentPath) -> Subscription {
        self.poll(move |client| {
            let path = path.clone();
            async move {
                client
                    .fetch_document(&path)
                    .await
                    .map(|doc| doc.into_iter().collect())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::firebase::FirebaseConfig;
    use crate::backend::path;

    fn client() -> FirebaseClient {
        FirebaseClient::new(FirebaseConfig::new("key", "unsch-connect", "bucket"))
    }

    #[test]
    fn structured_query_for_author_posts() {
        let q = Query::new(path::posts())
            .where_eq("authorId", "u1")
            .order_by("createdAt", Direction::Descending)
            .limit(20);
        let body = FirebaseClient::structured_query(&q);
        let sq = &body["structuredQuery"];

        assert_eq!(sq["from"][0]["collectionId"], "posts");
        assert_eq!(sq["where"]["fieldFilter"]["op"], "EQUAL");
        assert_eq!(
            sq["where"]["fieldFilter"]["value"],
            json!({"stringValue": "u1"})
        );
        assert_eq!(sq["orderBy"][0]["direction"], "DESCENDING");
        assert_eq!(sq["limit"], 20);
    }

    #[test]
    fn multiple_filters_become_a_composite_and() {
        let q = Query::new(path::posts())
            .where_eq("authorId", "u1")
            .where_eq("originalPostId", "p1");
        let body = FirebaseClient::structured_query(&q);

        assert_eq!(body["structuredQuery"]["where"]["compositeFilter"]["op"], "AND");
        assert_eq!(
            body["structuredQuery"]["where"]["compositeFilter"]["filters"]
                .as_array()
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn commit_uses_transforms_for_array_ops() {
        let update = DocumentUpdate::new()
            .array_union("likedBy", "u1")
            .set("updatedAt", "2024-01-01T00:00:00.000Z");
        let body = client().commit_body(&path::post("p1"), &update);
        let write = &body["writes"][0];

        assert_eq!(
            write["update"]["name"],
            "projects/unsch-connect/databases/(default)/documents/posts/p1"
        );
        assert_eq!(write["updateMask"]["fieldPaths"], json!(["updatedAt"]));
        assert_eq!(write["updateTransforms"][0]["fieldPath"], "likedBy");
        assert_eq!(
            write["updateTransforms"][0]["appendMissingElements"]["values"],
            json!([{"stringValue": "u1"}])
        );
        assert_eq!(write["currentDocument"]["exists"], true);
    }
}

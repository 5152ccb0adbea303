//! Search adapter bound to a fixed index and document type

use super::{Deferred, RawSearch};
use serde_json::Value;
use std::sync::Arc;

/// A search function with index and document type already applied.
///
/// Cloning shares the underlying client.
pub struct QueryAdapter<C> {
    client: Arc<C>,
    index: Arc<str>,
    doc_type: Arc<str>,
}

impl<C> QueryAdapter<C>
where
    C: RawSearch + 'static,
{
    pub fn new(client: Arc<C>, index: impl Into<String>, doc_type: impl Into<String>) -> Self {
        Self {
            client,
            index: Arc::from(index.into()),
            doc_type: Arc::from(doc_type.into()),
        }
    }

    /// Build a search for `body`. No request is sent until the returned
    /// value is run; each run sends exactly one.
    pub fn search(&self, body: Value) -> Deferred<Value, C::Error> {
        let client = Arc::clone(&self.client);
        let index = Arc::clone(&self.index);
        let doc_type = Arc::clone(&self.doc_type);

        Deferred::new(move || async move { client.raw_search(&index, &doc_type, &body).await })
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn doc_type(&self) -> &str {
        &self.doc_type
    }
}

impl<C> Clone for QueryAdapter<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            index: Arc::clone(&self.index),
            doc_type: Arc::clone(&self.doc_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::io;
    use std::sync::Mutex;

    type Call = (String, String, Value);

    /// Answers from a fixed script and records every call
    struct StubCluster {
        calls: Mutex<Vec<Call>>,
        respond: Box<dyn Fn(&Value) -> Result<Value, io::Error> + Send + Sync>,
    }

    impl StubCluster {
        fn new<F>(respond: F) -> Arc<Self>
        where
            F: Fn(&Value) -> Result<Value, io::Error> + Send + Sync + 'static,
        {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                respond: Box::new(respond),
            })
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RawSearch for StubCluster {
        type Error = io::Error;

        async fn raw_search(
            &self,
            index: &str,
            doc_type: &str,
            body: &Value,
        ) -> Result<Value, io::Error> {
            self.calls
                .lock()
                .unwrap()
                .push((index.to_string(), doc_type.to_string(), body.clone()));
            (self.respond)(body)
        }
    }

    fn three_hits() -> Value {
        json!({
            "hits": {
                "total": 3,
                "hits": [
                    { "_id": "1", "_source": { "name": "ada" } },
                    { "_id": "2", "_source": { "name": "grace" } },
                    { "_id": "3", "_source": { "name": "edsger" } }
                ]
            }
        })
    }

    #[tokio::test]
    async fn test_resolves_with_response_unmodified() {
        let stub = StubCluster::new(|_| Ok(three_hits()));
        let adapter = QueryAdapter::new(stub.clone(), "users", "user");

        let response = adapter
            .search(json!({ "query": { "match_all": {} } }))
            .run()
            .await
            .unwrap();

        assert_eq!(response, three_hits());
        assert_eq!(
            stub.calls(),
            vec![(
                "users".to_string(),
                "user".to_string(),
                json!({ "query": { "match_all": {} } })
            )]
        );
    }

    #[tokio::test]
    async fn test_fails_with_error_unmodified() {
        let stub = StubCluster::new(|_| {
            Err(io::Error::new(io::ErrorKind::ConnectionRefused, "connect ECONNREFUSED"))
        });
        let adapter = QueryAdapter::new(stub, "users", "user");

        let err = adapter
            .search(json!({ "query": { "match_all": {} } }))
            .run()
            .await
            .unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::ConnectionRefused);
        assert_eq!(err.to_string(), "connect ECONNREFUSED");
    }

    #[tokio::test]
    async fn test_no_call_until_run_and_one_call_per_run() {
        let stub = StubCluster::new(|_| Ok(json!({})));
        let adapter = QueryAdapter::new(stub.clone(), "users", "user");

        let first = adapter.search(json!({ "size": 1 }));
        let second = adapter.search(json!({ "size": 2 }));
        assert!(stub.calls().is_empty());

        first.run().await.unwrap();
        assert_eq!(stub.calls().len(), 1);

        drop(second);
        assert_eq!(stub.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_searches_are_independent() {
        let stub = StubCluster::new(|body| match body.get("fail") {
            Some(_) => Err(io::Error::new(io::ErrorKind::Other, "rejected")),
            None => Ok(json!({ "echo": body.clone() })),
        });
        let adapter = QueryAdapter::new(stub.clone(), "users", "user");

        let ok = adapter.search(json!({ "query": { "term": { "name": "ada" } } }));
        let failing = adapter.clone().search(json!({ "fail": true }));

        let (ok, failing) = tokio::join!(ok.run(), failing.run());

        assert_eq!(
            ok.unwrap(),
            json!({ "echo": { "query": { "term": { "name": "ada" } } } })
        );
        assert_eq!(failing.unwrap_err().to_string(), "rejected");
        assert_eq!(stub.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_bound_identifiers() {
        let stub = StubCluster::new(|_| Ok(json!({})));
        let adapter = QueryAdapter::new(stub.clone(), "people", "");
        assert_eq!(adapter.index(), "people");
        assert_eq!(adapter.doc_type(), "");

        adapter.search(json!({})).await.unwrap();
        assert_eq!(stub.calls()[0].0, "people");
        assert_eq!(stub.calls()[0].1, "");
    }
}

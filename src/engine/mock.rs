use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{Engine, Message};
use crate::tuple::RegionRealmTimestampTuple;

/// A scripted engine for tests. Answers from a per-tuple table, falling back to a
/// default message, and records every tuple it was called with.
pub struct MockEngine {
    responses: HashMap<RegionRealmTimestampTuple, Message>,
    fallback: Message,
    calls: Mutex<Vec<RegionRealmTimestampTuple>>,
}

impl MockEngine {
    /// Every call returns `message`.
    pub fn new(message: Message) -> Self {
        Self {
            responses: HashMap::new(),
            fallback: message,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Return `message` whenever `tuple` is requested.
    pub fn with_response(mut self, tuple: RegionRealmTimestampTuple, message: Message) -> Self {
        self.responses.insert(tuple, message);
        self
    }

    /// Tuples received so far, in call order.
    pub fn calls(&self) -> Vec<RegionRealmTimestampTuple> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }
}

#[async_trait]
impl Engine for MockEngine {
    async fn run(&self, tuple: RegionRealmTimestampTuple) -> Message {
        let message = self
            .responses
            .get(&tuple)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone());
        match self.calls.lock() {
            Ok(mut calls) => calls.push(tuple),
            Err(poisoned) => poisoned.into_inner().push(tuple),
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Code;

    #[tokio::test]
    async fn returns_fallback_and_records_calls() {
        let engine = MockEngine::new(Message::ok("done"));
        let tuple = RegionRealmTimestampTuple::new("us", "mal-ganis", 1);

        let msg = engine.run(tuple.clone()).await;

        assert_eq!(msg, Message::ok("done"));
        assert_eq!(engine.calls(), vec![tuple]);
    }

    #[tokio::test]
    async fn per_tuple_response_wins_over_fallback() {
        let special = RegionRealmTimestampTuple::new("eu", "draenor", 2);
        let engine = MockEngine::new(Message::ok("default"))
            .with_response(special.clone(), Message::error(Code::NotFound, "nope"));

        assert_eq!(engine.run(special).await.code, Code::NotFound);
        assert_eq!(
            engine
                .run(RegionRealmTimestampTuple::new("eu", "other", 2))
                .await
                .data,
            "default"
        );
        assert_eq!(engine.call_count(), 2);
    }
}

//! Join point for a fixed set of asynchronous completions.

/// Outcome once every expected key reported, in registration order.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinOutcome<K, T, E> {
    pub successes: Vec<(K, T)>,
    pub failures: Vec<(K, E)>,
}

/// Waits for one completion per key.
///
/// Duplicate completions and keys that were never registered are ignored.
#[derive(Debug, Clone)]
pub struct CompletionBarrier<K, T, E> {
    slots: Vec<(K, Option<Result<T, E>>)>,
}

impl<K: PartialEq + Clone, T, E> CompletionBarrier<K, T, E> {
    pub fn new(keys: impl IntoIterator<Item = K>) -> Self {
        let mut slots: Vec<(K, Option<Result<T, E>>)> = Vec::new();
        for key in keys {
            if !slots.iter().any(|(k, _)| *k == key) {
                slots.push((key, None));
            }
        }
        Self { slots }
    }

    /// Record a completion. Returns whether it was accepted.
    pub fn complete(&mut self, key: &K, result: Result<T, E>) -> bool {
        match self.slots.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot @ None)) => {
                *slot = Some(result);
                true
            }
            _ => false,
        }
    }

    pub fn expects(&self, key: &K) -> bool {
        self.slots.iter().any(|(k, _)| k == key)
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(|(_, slot)| slot.is_some())
    }

    /// Keys still waiting.
    pub fn pending(&self) -> Vec<K> {
        self.slots
            .iter()
            .filter(|(_, slot)| slot.is_none())
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Consume the barrier if every key reported; otherwise hand it back.
    pub fn try_finish(self) -> Result<JoinOutcome<K, T, E>, Self> {
        if !self.is_complete() {
            return Err(self);
        }
        let mut outcome = JoinOutcome {
            successes: Vec::new(),
            failures: Vec::new(),
        };
        for (key, slot) in self.slots {
            match slot {
                Some(Ok(value)) => outcome.successes.push((key, value)),
                Some(Err(err)) => outcome.failures.push((key, err)),
                None => {}
            }
        }
        Ok(outcome)
    }
}

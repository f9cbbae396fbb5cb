//! Named atomic counters shared by every virtual user in the process
//!
//! A [`CounterRegistry`] maps names to counters. The first reference to a
//! name installs a counter initialized to zero through a single
//! insert-if-absent on the concurrent map; every later reference, from any
//! thread, gets the same counter back. Values only change through
//! `fetch_add`, so concurrent adders never lose updates.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use tracing::debug;

static GLOBAL: LazyLock<CounterRegistry> = LazyLock::new(CounterRegistry::new);

/// A single named 64-bit counter
#[derive(Debug)]
pub struct Counter {
    name: String,
    value: AtomicI64,
}

impl Counter {
    fn new(name: String) -> Self {
        Self {
            name,
            value: AtomicI64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Atomically add `delta` and return the new value (wraps on overflow)
    pub fn add(&self, delta: impl Into<Delta>) -> i64 {
        let delta = delta.into().resolve();
        self.value
            .fetch_add(delta, Ordering::SeqCst)
            .wrapping_add(delta)
    }

    pub fn get(&self) -> i64 {
        self.value.load(Ordering::SeqCst)
    }
}

/// Shared reference to a registered counter
///
/// Cloning is cheap; all clones observe the same value.
#[derive(Debug, Clone)]
pub struct CounterHandle {
    counter: Arc<Counter>,
}

impl CounterHandle {
    pub fn name(&self) -> &str {
        self.counter.name()
    }

    /// Atomically add `delta`, returning the post-increment value
    pub fn add(&self, delta: impl Into<Delta>) -> i64 {
        self.counter.add(delta)
    }

    pub fn get(&self) -> i64 {
        self.counter.get()
    }

    /// Whether two handles refer to the same counter instance
    pub fn same_counter(&self, other: &CounterHandle) -> bool {
        Arc::ptr_eq(&self.counter, &other.counter)
    }
}

/// Concurrent name -> counter map with get-or-create semantics
#[derive(Debug, Default)]
pub struct CounterRegistry {
    counters: DashMap<String, Arc<Counter>>,
}

impl CounterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry
    pub fn global() -> &'static CounterRegistry {
        &GLOBAL
    }

    /// Return the counter registered under `name`, installing it on first use
    pub fn get_or_create(&self, name: &str) -> CounterHandle {
        if let Some(existing) = self.counters.get(name) {
            return CounterHandle {
                counter: Arc::clone(existing.value()),
            };
        }

        // The entry holds the shard's write lock, so only one caller can
        // observe the vacant state for a given name.
        let counter = self
            .counters
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!(counter = name, "installing counter");
                Arc::new(Counter::new(name.to_string()))
            })
            .value()
            .clone();

        CounterHandle { counter }
    }

    /// Current value of `name`, if it has been registered
    pub fn get(&self, name: &str) -> Option<i64> {
        self.counters.get(name).map(|c| c.get())
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    /// All counters and their values, sorted by name
    pub fn snapshot(&self) -> Vec<(String, i64)> {
        let mut values: Vec<(String, i64)> = self
            .counters
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().get()))
            .collect();
        values.sort_by(|a, b| a.0.cmp(&b.0));
        values
    }
}

/// Increment accepted by [`Counter::add`]
///
/// Scripts pass numbers, booleans or strings. Each resolves to an integer
/// through its numeric interpretation, except that a value whose numeric
/// interpretation is zero but which is truthy counts as `+1`.
#[derive(Debug, Clone, PartialEq)]
pub enum Delta {
    Integer(i64),
    Numeric(f64),
    Flag(bool),
    Text(String),
}

impl Delta {
    /// Integer interpretation: truncate toward zero, saturate, NaN -> 0
    fn as_integer(&self) -> i64 {
        match self {
            Delta::Integer(n) => *n,
            Delta::Numeric(n) => *n as i64,
            Delta::Flag(b) => i64::from(*b),
            Delta::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .or_else(|_| s.parse::<f64>().map(|f| f as i64))
                    .unwrap_or(0)
            }
        }
    }

    fn is_truthy(&self) -> bool {
        match self {
            Delta::Integer(n) => *n != 0,
            Delta::Numeric(n) => *n != 0.0 && !n.is_nan(),
            Delta::Flag(b) => *b,
            Delta::Text(s) => !s.is_empty(),
        }
    }

    /// Concrete amount to add
    pub fn resolve(&self) -> i64 {
        let n = self.as_integer();
        if n == 0 && self.is_truthy() {
            1
        } else {
            n
        }
    }
}

impl From<i64> for Delta {
    fn from(n: i64) -> Self {
        Delta::Integer(n)
    }
}

impl From<i32> for Delta {
    fn from(n: i32) -> Self {
        Delta::Integer(i64::from(n))
    }
}

impl From<u32> for Delta {
    fn from(n: u32) -> Self {
        Delta::Integer(i64::from(n))
    }
}

impl From<f64> for Delta {
    fn from(n: f64) -> Self {
        Delta::Numeric(n)
    }
}

impl From<bool> for Delta {
    fn from(b: bool) -> Self {
        Delta::Flag(b)
    }
}

impl From<&str> for Delta {
    fn from(s: &str) -> Self {
        Delta::Text(s.to_string())
    }
}

impl From<String> for Delta {
    fn from(s: String) -> Self {
        Delta::Text(s)
    }
}

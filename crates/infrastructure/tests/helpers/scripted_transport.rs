#![allow(dead_code)]
use async_trait::async_trait;
use dnschat_domain::{DnsError, ServerEntry, TransportKind, TxtRecordFragment};
use dnschat_infrastructure::dns::transport::{TransportFactory, TxtLookup};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What a scripted transport does when asked for TXT records.
#[derive(Debug, Clone)]
pub enum Step {
    Reply(Vec<&'static str>),
    Fail(DnsError),
    /// Never completes; only the attempt timer ends it.
    Hang,
    /// Replies after a delay, to keep a query in flight.
    Delayed(Duration, Vec<&'static str>),
}

/// Factory handing out transports that follow a fixed script per kind.
///
/// Every lookup is appended to a shared log so tests can check ordering.
pub struct ScriptedFactory {
    steps: HashMap<TransportKind, Vec<Step>>,
    log: Arc<Mutex<Vec<TransportKind>>>,
    names: Arc<Mutex<Vec<String>>>,
    lookups: Arc<AtomicUsize>,
    skipped: Vec<TransportKind>,
}

impl ScriptedFactory {
    pub fn new() -> Self {
        Self {
            steps: HashMap::new(),
            log: Arc::new(Mutex::new(Vec::new())),
            names: Arc::new(Mutex::new(Vec::new())),
            lookups: Arc::new(AtomicUsize::new(0)),
            skipped: Vec::new(),
        }
    }

    pub fn with(mut self, kind: TransportKind, step: Step) -> Self {
        self.steps.insert(kind, vec![step]);
        self
    }

    /// Successive lookups on one transport take successive steps; the last one repeats.
    pub fn with_sequence(mut self, kind: TransportKind, steps: Vec<Step>) -> Self {
        self.steps.insert(kind, steps);
        self
    }

    /// `create` returns `None` for `kind`, as for a server with DoH disabled.
    pub fn skipping(mut self, kind: TransportKind) -> Self {
        self.skipped.push(kind);
        self
    }

    pub fn log(&self) -> Arc<Mutex<Vec<TransportKind>>> {
        Arc::clone(&self.log)
    }

    pub fn names(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.names)
    }

    pub fn lookups(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.lookups)
    }
}

impl TransportFactory for ScriptedFactory {
    fn create(&self, kind: TransportKind, _server: &ServerEntry) -> Option<Arc<dyn TxtLookup>> {
        if self.skipped.contains(&kind) {
            return None;
        }
        let steps = self
            .steps
            .get(&kind)
            .filter(|steps| !steps.is_empty())
            .cloned()
            .unwrap_or_else(|| vec![Step::Fail(DnsError::query_failed("not scripted"))]);
        Some(Arc::new(ScriptedTransport {
            kind,
            steps,
            calls: AtomicUsize::new(0),
            log: Arc::clone(&self.log),
            names: Arc::clone(&self.names),
            lookups: Arc::clone(&self.lookups),
        }))
    }
}

pub struct ScriptedTransport {
    kind: TransportKind,
    steps: Vec<Step>,
    calls: AtomicUsize,
    log: Arc<Mutex<Vec<TransportKind>>>,
    names: Arc<Mutex<Vec<String>>>,
    lookups: Arc<AtomicUsize>,
}

#[async_trait]
impl TxtLookup for ScriptedTransport {
    fn kind(&self) -> TransportKind {
        self.kind
    }

    async fn lookup_txt(
        &self,
        name: &str,
        _timeout: Duration,
    ) -> Result<Vec<TxtRecordFragment>, DnsError> {
        self.log.lock().unwrap().push(self.kind);
        self.names.lock().unwrap().push(name.to_string());
        self.lookups.fetch_add(1, Ordering::SeqCst);

        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let step = &self.steps[call.min(self.steps.len() - 1)];
        match step {
            Step::Reply(records) => Ok(fragments(records)),
            Step::Fail(error) => Err(error.clone()),
            Step::Hang => std::future::pending().await,
            Step::Delayed(delay, records) => {
                tokio::time::sleep(*delay).await;
                Ok(fragments(records))
            }
        }
    }
}

fn fragments(records: &[&'static str]) -> Vec<TxtRecordFragment> {
    records.iter().map(|s| TxtRecordFragment::from(*s)).collect()
}

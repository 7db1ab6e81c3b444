use async_trait::async_trait;
use dashmap::DashMap;
use dnschat_application::ports::ChatTransportPort;
use dnschat_domain::{
    ChatReply, Config, ConfigError, DnsError, LabelMode, ServerEntry, ServerRegistry,
};
use rustc_hash::FxBuildHasher;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::forwarding::message_builder::MessageBuilder;
use super::label_codec;
use super::orchestrator::{QueryOutcome, TransportOrchestrator};
use super::rate_limiter::RateLimiter;
use super::transport::{DefaultTransportFactory, TransportFactory};

type SharedResult = Arc<Result<String, DnsError>>;
type InflightSender = Arc<watch::Sender<Option<SharedResult>>>;
type InflightMap = DashMap<Arc<str>, InflightSender, FxBuildHasher>;

struct InflightLeaderGuard {
    inflight: Arc<InflightMap>,
    key: Arc<str>,
}

impl Drop for InflightLeaderGuard {
    fn drop(&mut self) {
        if let Some((_, tx)) = self.inflight.remove(&self.key) {
            let _ = tx.send(None);
        }
    }
}

/// Sends chat messages as TXT queries to an allow-listed server.
pub struct DnsChatClient {
    registry: Arc<ServerRegistry>,
    orchestrator: TransportOrchestrator,
    rate_limiter: Arc<RateLimiter>,
    label_mode: LabelMode,
    port: u16,
    inflight: Arc<InflightMap>,
}

impl DnsChatClient {
    pub fn new(
        registry: Arc<ServerRegistry>,
        orchestrator: TransportOrchestrator,
        rate_limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            registry,
            orchestrator,
            rate_limiter,
            label_mode: LabelMode::default(),
            port: 53,
            inflight: Arc::new(DashMap::with_hasher(FxBuildHasher)),
        }
    }

    /// Client wired with the real transports described by `config`.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let factory: Arc<dyn TransportFactory> =
            Arc::new(DefaultTransportFactory::from_config(&config.transport));
        Self::with_factory(config, factory)
    }

    pub fn with_factory(
        config: &Config,
        factory: Arc<dyn TransportFactory>,
    ) -> Result<Self, ConfigError> {
        let registry = Arc::new(config.registry()?);
        let orchestrator = TransportOrchestrator::from_config(factory, &config.transport);
        let rate_limiter = Arc::new(RateLimiter::from_config(&config.rate_limit));

        info!(
            servers = registry.entries().len(),
            default_server = %registry.default_entry().host,
            transports = ?orchestrator.transports(),
            "DNS chat client ready"
        );

        Ok(Self::new(registry, orchestrator, rate_limiter)
            .with_label_mode(config.transport.label_mode)
            .with_port(config.transport.port))
    }

    pub fn with_label_mode(mut self, label_mode: LabelMode) -> Self {
        self.label_mode = label_mode;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn registry(&self) -> &ServerRegistry {
        &self.registry
    }

    /// Sends `message` and returns the reassembled reply.
    pub async fn query(
        &self,
        message: &str,
        conversation_id: &str,
        server: Option<&str>,
    ) -> Result<String, DnsError> {
        let outcome = self
            .query_with_attempts(message, conversation_id, server)
            .await;
        for (n, attempt) in outcome.attempts.iter().enumerate() {
            debug!(
                attempt = n + 1,
                transport = %attempt.transport,
                elapsed_ms = attempt.elapsed_ms,
                success = attempt.is_success(),
                "Transport attempt recorded"
            );
        }
        outcome.result
    }

    /// Like [`query`](Self::query), also returning the transport attempt log.
    ///
    /// A caller that joined an identical in-flight query gets the shared
    /// result with an empty log; the attempts belong to the leading caller.
    pub async fn query_with_attempts(
        &self,
        message: &str,
        conversation_id: &str,
        server: Option<&str>,
    ) -> QueryOutcome {
        let entry = match self.registry.resolve(server) {
            Ok(entry) => entry.clone(),
            Err(e) => return QueryOutcome::failed(e),
        };

        let name = label_codec::encode_question(self.label_mode, message, conversation_id);
        if let Err(e) = MessageBuilder::encoded_name_len(&name) {
            return QueryOutcome::failed(e);
        }

        let key: Arc<str> = format!("{}:{}-{}", entry.host, self.port, name).into();
        let (is_leader, rx) = self.register_or_join_inflight(&key);

        if !is_leader {
            return self.query_as_follower(&entry, &name, rx).await;
        }

        self.query_as_leader(&entry, &name, key).await
    }

    fn register_or_join_inflight(
        &self,
        key: &Arc<str>,
    ) -> (bool, watch::Receiver<Option<SharedResult>>) {
        match self.inflight.entry(Arc::clone(key)) {
            dashmap::Entry::Occupied(e) => {
                let rx = e.get().subscribe();
                drop(e);
                (false, rx)
            }
            dashmap::Entry::Vacant(e) => {
                let (tx, rx) = watch::channel(None::<SharedResult>);
                e.insert(Arc::new(tx));
                (true, rx)
            }
        }
    }

    async fn query_as_follower(
        &self,
        entry: &ServerEntry,
        name: &str,
        mut rx: watch::Receiver<Option<SharedResult>>,
    ) -> QueryOutcome {
        debug!(server = %entry.host, "Joining in-flight query");

        let _ = rx.changed().await;
        let shared = rx.borrow().clone();
        if let Some(result) = shared {
            return QueryOutcome {
                result: (*result).clone(),
                attempts: Vec::new(),
            };
        }

        // Leader went away without publishing; run on our own.
        self.execute(entry, name).await
    }

    async fn query_as_leader(&self, entry: &ServerEntry, name: &str, key: Arc<str>) -> QueryOutcome {
        let guard = InflightLeaderGuard {
            inflight: Arc::clone(&self.inflight),
            key: Arc::clone(&key),
        };

        let outcome = self.execute(entry, name).await;

        if let Some((_, tx)) = self.inflight.remove(&key) {
            let _ = tx.send(Some(Arc::new(outcome.result.clone())));
        }

        drop(guard);
        outcome
    }

    async fn execute(&self, entry: &ServerEntry, name: &str) -> QueryOutcome {
        if !self.rate_limiter.admit() {
            warn!(server = %entry.host, "Query rejected by rate limiter");
            return QueryOutcome::failed(DnsError::rate_limited(
                self.rate_limiter.max_queries(),
                self.rate_limiter.window().as_secs(),
            ));
        }

        debug!(
            server = %entry.host,
            name_len = name.len(),
            "Dispatching TXT query"
        );

        let outcome = self.orchestrator.run(entry, name).await;
        if let Err(e) = &outcome.result {
            warn!(
                server = %entry.host,
                attempts = outcome.attempts.len(),
                error = %e,
                "All transports failed"
            );
        }
        outcome
    }
}

#[async_trait]
impl ChatTransportPort for DnsChatClient {
    async fn send(
        &self,
        message: &str,
        conversation_id: &str,
        server: Option<&str>,
    ) -> Result<ChatReply, DnsError> {
        let host: Arc<str> = self.registry.resolve(server)?.host.as_str().into();
        let text = self.query(message, conversation_id, Some(&*host)).await?;
        Ok(ChatReply { text, server: host })
    }
}

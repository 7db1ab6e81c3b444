use chrono::Utc;
use dnschat_domain::{
    AttemptOutcome, DnsError, ServerEntry, TransportAttempt, TransportConfig, TransportKind,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::forwarding::Reassembler;
use super::resume_gate::AttemptSettler;
use super::transport::{TransportFactory, TxtLookup};

/// Result of one query plus every transport attempt made for it, in order.
#[derive(Debug)]
pub struct QueryOutcome {
    pub result: Result<String, DnsError>,
    pub attempts: Vec<TransportAttempt>,
}

impl QueryOutcome {
    pub fn failed(error: DnsError) -> Self {
        Self {
            result: Err(error),
            attempts: Vec::new(),
        }
    }
}

/// Tries transports strictly one after another until one yields a reply.
///
/// A transport whose server answers without TXT data is asked again, up to
/// `empty_answer_attempts` times, before the chain moves on.
pub struct TransportOrchestrator {
    factory: Arc<dyn TransportFactory>,
    transports: Vec<TransportKind>,
    attempt_timeout: Duration,
    empty_answer_attempts: u32,
    retry_delay: Duration,
}

impl TransportOrchestrator {
    pub fn new(
        factory: Arc<dyn TransportFactory>,
        transports: Vec<TransportKind>,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            factory,
            transports,
            attempt_timeout,
            empty_answer_attempts: 1,
            retry_delay: Duration::ZERO,
        }
    }

    pub fn from_config(factory: Arc<dyn TransportFactory>, config: &TransportConfig) -> Self {
        Self::new(
            factory,
            config.ordered_transports(),
            Duration::from_millis(config.timeout_ms),
        )
        .with_empty_answer_retries(
            config.empty_answer_attempts,
            Duration::from_millis(config.retry_delay_ms),
        )
    }

    /// Re-asks a transport that answered empty, waiting `delay * 2^n` before the n-th re-ask.
    pub fn with_empty_answer_retries(mut self, attempts: u32, delay: Duration) -> Self {
        self.empty_answer_attempts = attempts.max(1);
        self.retry_delay = delay;
        self
    }

    pub fn transports(&self) -> &[TransportKind] {
        &self.transports
    }

    fn backoff(&self, retry: u32) -> Duration {
        self.retry_delay.saturating_mul(2u32.saturating_pow(retry))
    }

    /// Runs the fallback chain for `name` against `server`.
    ///
    /// On total failure the last attempt's error is returned; earlier errors
    /// are only kept in the attempt log.
    pub async fn run(&self, server: &ServerEntry, name: &str) -> QueryOutcome {
        let name: Arc<str> = name.into();
        let mut attempts = Vec::with_capacity(self.transports.len());
        let mut last_error: Option<DnsError> = None;
        let timeout_ms = self.attempt_timeout.as_millis() as u64;

        for &kind in &self.transports {
            let Some(transport) = self.factory.create(kind, server) else {
                debug!(transport = %kind, server = %server.host, "Transport not applicable, skipping");
                continue;
            };

            for try_index in 0..self.empty_answer_attempts {
                if try_index > 0 {
                    let delay = self.backoff(try_index - 1);
                    debug!(
                        transport = %kind,
                        server = %server.host,
                        attempt = try_index + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Empty answer, asking again"
                    );
                    tokio::time::sleep(delay).await;
                }

                let started_at = Utc::now();
                let start = Instant::now();
                let result =
                    run_attempt(Arc::clone(&transport), Arc::clone(&name), self.attempt_timeout)
                        .await;
                let elapsed_ms = start.elapsed().as_millis() as u64;

                match result {
                    Ok(reply) => {
                        debug!(
                            transport = %kind,
                            server = %server.host,
                            elapsed_ms = elapsed_ms,
                            reply_len = reply.len(),
                            "Transport attempt succeeded"
                        );
                        attempts.push(TransportAttempt {
                            transport: kind,
                            started_at,
                            timeout_ms,
                            elapsed_ms,
                            outcome: AttemptOutcome::Success {
                                reply: reply.clone(),
                            },
                        });
                        return QueryOutcome {
                            result: Ok(reply),
                            attempts,
                        };
                    }
                    Err(error) => {
                        let retry =
                            error.is_no_records() && try_index + 1 < self.empty_answer_attempts;
                        if !retry {
                            warn!(
                                transport = %kind,
                                server = %server.host,
                                elapsed_ms = elapsed_ms,
                                error = %error,
                                "Transport attempt failed, falling back"
                            );
                        }
                        attempts.push(TransportAttempt {
                            transport: kind,
                            started_at,
                            timeout_ms,
                            elapsed_ms,
                            outcome: AttemptOutcome::Failure {
                                error: error.clone(),
                            },
                        });
                        last_error = Some(error);
                        if !retry {
                            break;
                        }
                    }
                }
            }
        }

        let error = last_error.unwrap_or_else(|| {
            DnsError::query_failed(format!("No transport available for {}", server.host))
        });
        QueryOutcome {
            result: Err(error),
            attempts,
        }
    }
}

/// One attempt: the lookup and its timer race to settle the same gate.
///
/// Both tasks are aborted once a winner is known, so the attempt's socket is
/// dropped on every exit path.
async fn run_attempt(
    transport: Arc<dyn TxtLookup>,
    name: Arc<str>,
    timeout: Duration,
) -> Result<String, DnsError> {
    let kind = transport.kind();
    let (settler, outcome_rx) = AttemptSettler::new();
    let settler = Arc::new(settler);

    let lookup_task = {
        let settler = Arc::clone(&settler);
        tokio::spawn(async move {
            let outcome = transport
                .lookup_txt(&name, timeout)
                .await
                .map(|fragments| Reassembler::reassemble(&fragments));
            if !settler.settle(outcome) {
                debug!(transport = %kind, "Late transport result discarded");
            }
        })
    };

    let timer_task = {
        let settler = Arc::clone(&settler);
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            settler.settle(Err(DnsError::timeout(format!(
                "{} attempt timed out after {}ms",
                kind,
                timeout.as_millis()
            ))));
        })
    };

    let outcome = outcome_rx.await.unwrap_or_else(|_| {
        Err(DnsError::query_failed(format!(
            "{} attempt ended without a result",
            kind
        )))
    });

    lookup_task.abort();
    timer_task.abort();

    outcome
}

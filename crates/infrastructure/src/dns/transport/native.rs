//! Resolver-library transport.
//!
//! Hands the query name to `hickory-resolver` pointed at the chosen server and
//! lets it build, send and validate its own packet. Requires the
//! `native-resolver` feature; without it every attempt reports
//! `PlatformUnsupported`.

use super::TxtLookup;
use async_trait::async_trait;
use dnschat_domain::{DnsError, ServerAddr, TransportKind, TxtRecordFragment};
use std::time::Duration;

pub struct NativeTransport {
    server: ServerAddr,
}

impl NativeTransport {
    pub fn new(server: ServerAddr) -> Self {
        Self { server }
    }
}

#[cfg(feature = "native-resolver")]
mod imp {
    use super::super::{map_io_error, resolver};
    use super::*;
    use hickory_resolver::config::{NameServerConfig, ResolveHosts, ResolverConfig, ResolverOpts};
    use hickory_resolver::name_server::TokioConnectionProvider;
    use hickory_resolver::proto::xfer::Protocol;
    use hickory_resolver::proto::ProtoErrorKind;
    use hickory_resolver::{ResolveError, Resolver, TokioResolver};
    use tracing::debug;

    impl NativeTransport {
        /// One-shot resolver aimed only at `self.server`: no cache, no hosts file, one try.
        pub(super) async fn build_resolver(
            &self,
            timeout: Duration,
        ) -> Result<TokioResolver, DnsError> {
            let addrs = resolver::socket_addrs(&self.server, timeout).await?;

            let mut config = ResolverConfig::new();
            for addr in addrs {
                config.add_name_server(NameServerConfig::new(addr, Protocol::Udp));
            }

            let mut opts = ResolverOpts::default();
            opts.cache_size = 0;
            opts.use_hosts_file = ResolveHosts::Never;
            opts.attempts = 1;
            opts.timeout = timeout;

            Ok(
                Resolver::builder_with_config(config, TokioConnectionProvider::default())
                    .with_options(opts)
                    .build(),
            )
        }

        pub(super) async fn lookup(
            &self,
            name: &str,
            timeout: Duration,
        ) -> Result<Vec<TxtRecordFragment>, DnsError> {
            let resolver = self.build_resolver(timeout).await?;

            // Fully qualified so no search domain is appended.
            let fqdn = format!("{}.", name.trim_end_matches('.'));
            let lookup = resolver
                .txt_lookup(fqdn.as_str())
                .await
                .map_err(|e| map_resolve_error(&e, &self.server))?;

            let fragments: Vec<TxtRecordFragment> = lookup
                .iter()
                .flat_map(|txt| txt.txt_data().iter())
                .filter(|data| !data.is_empty())
                .map(|data| TxtRecordFragment::new(String::from_utf8_lossy(data)))
                .collect();

            debug!(
                server = %self.server,
                fragments = fragments.len(),
                "Native TXT lookup answered"
            );

            if fragments.is_empty() {
                return Err(DnsError::no_records(format!("at {}", self.server)));
            }
            Ok(fragments)
        }
    }

    fn map_resolve_error(err: &ResolveError, server: &ServerAddr) -> DnsError {
        if err.is_no_records_found() {
            return DnsError::no_records(format!("at {}", server));
        }
        match err.proto().map(|proto| proto.kind()) {
            Some(ProtoErrorKind::Timeout) => {
                DnsError::timeout(format!("Native lookup via {} timed out", server))
            }
            Some(ProtoErrorKind::Io(io_err)) => {
                map_io_error(io_err, format!("Native lookup via {}", server))
            }
            Some(ProtoErrorKind::NoConnections) => DnsError::server_unreachable(format!(
                "Native lookup via {} found no usable connection",
                server
            )),
            _ => DnsError::query_failed(format!("Native lookup via {} failed: {}", server, err)),
        }
    }

}

#[async_trait]
impl TxtLookup for NativeTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Native
    }

    #[cfg(feature = "native-resolver")]
    async fn lookup_txt(
        &self,
        name: &str,
        timeout: Duration,
    ) -> Result<Vec<TxtRecordFragment>, DnsError> {
        self.lookup(name, timeout).await
    }

    #[cfg(not(feature = "native-resolver"))]
    async fn lookup_txt(
        &self,
        _name: &str,
        _timeout: Duration,
    ) -> Result<Vec<TxtRecordFragment>, DnsError> {
        Err(DnsError::platform_unsupported(format!(
            "Native resolver not available in this build; cannot query {}",
            self.server
        )))
    }
}

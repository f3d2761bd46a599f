//! The iterative resolution engine.
//!
//! A [`Resolver`] answers lookups by walking the delegation tree on its
//! own, starting at a configured root nameserver: query, follow referrals,
//! resolve nameserver addresses as needed, chase CNAME chains, and cache
//! every record seen along the way. No upstream recursion is ever
//! requested.
//!
//! Lookups cannot fail. Timeouts, unreachable or broken nameservers,
//! malformed answers, and exhausted budgets each affect only the branch of
//! the walk they happened on, and the lookup completes with the records
//! the cache ended up holding, possibly none. The empty result set is a
//! valid answer.
//!
//! State that belongs to one top-level lookup (the query budget and the
//! two stop flags) travels in an explicit per-lookup value through the
//! recursion; the resolver itself only owns configuration, transport,
//! cache, and the optional trace sink.

use crate::base::{Node, Query, RecordType, Response, ResourceRecord};
use crate::cache::RecordCache;
use crate::net::{Transport, TransportError, UdpTransport};
use core::future::Future;
use core::pin::Pin;
use core::time::Duration;
use std::collections::BTreeSet;
use std::io;
use std::net::SocketAddr;
use tracing::{debug, warn};

/// The well-known DNS port, used for every nameserver learned on the walk.
pub const DNS_PORT: u16 = 53;

//------------ Configuration constants ---------------------------------------

/// Default for the per-attempt response timeout.
const DEF_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Smallest and largest allowed read timeout.
const MIN_READ_TIMEOUT: Duration = Duration::from_millis(1);
const MAX_READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Default for the number of send attempts per logical query.
const DEF_ATTEMPTS: usize = 2;

/// Default for the CNAME indirection budget per lookup.
const DEF_MAX_INDIRECTION: usize = 10;

/// Default for the number of queries allowed per lookup.
const DEF_QUERY_BUDGET: usize = 65536;

//------------ Config --------------------------------------------------------

/// Resolver configuration.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// The nameserver every lookup starts at.
    server: SocketAddr,

    /// How long to wait for a response to a single attempt.
    read_timeout: Duration,

    /// How often to send a logical query before giving up on it.
    attempts: usize,

    /// How many CNAME hops a single lookup may follow.
    max_indirection: usize,

    /// How many queries a single lookup may send.
    query_budget: usize,
}

impl Config {
    /// Creates a configuration for the given starting nameserver.
    ///
    /// All other values start out at their defaults.
    #[must_use]
    pub fn new(server: SocketAddr) -> Self {
        Config {
            server,
            read_timeout: DEF_READ_TIMEOUT,
            attempts: DEF_ATTEMPTS,
            max_indirection: DEF_MAX_INDIRECTION,
            query_budget: DEF_QUERY_BUDGET,
        }
    }

    /// Returns the starting nameserver.
    pub fn server(&self) -> SocketAddr {
        self.server
    }

    /// Sets the starting nameserver.
    pub fn set_server(&mut self, server: SocketAddr) {
        self.server = server
    }

    /// Returns the per-attempt response timeout.
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Sets the per-attempt response timeout.
    ///
    /// Values outside one millisecond to one minute are clamped.
    pub fn set_read_timeout(&mut self, timeout: Duration) {
        self.read_timeout = timeout.clamp(MIN_READ_TIMEOUT, MAX_READ_TIMEOUT)
    }

    /// Returns the number of send attempts per logical query.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Sets the number of send attempts per logical query.
    ///
    /// At least one attempt is always made.
    pub fn set_attempts(&mut self, attempts: usize) {
        self.attempts = attempts.max(1)
    }

    /// Returns the CNAME indirection budget per lookup.
    pub fn max_indirection(&self) -> usize {
        self.max_indirection
    }

    /// Sets the CNAME indirection budget per lookup.
    pub fn set_max_indirection(&mut self, levels: usize) {
        self.max_indirection = levels
    }

    /// Returns the number of queries allowed per lookup.
    pub fn query_budget(&self) -> usize {
        self.query_budget
    }

    /// Sets the number of queries allowed per lookup.
    pub fn set_query_budget(&mut self, budget: usize) {
        self.query_budget = budget
    }
}

//------------ QueryLog ------------------------------------------------------

/// One completed query/response round trip.
///
/// Produced for the trace sink only; resolution decisions never look at
/// these.
#[derive(Clone, Debug)]
pub struct QueryLog {
    query: Query,
    server: SocketAddr,
    response: Response,
}

impl QueryLog {
    /// Returns the query that was sent.
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Returns the server the query went to.
    pub fn server(&self) -> SocketAddr {
        self.server
    }

    /// Returns the response that came back.
    pub fn response(&self) -> &Response {
        &self.response
    }
}

//------------ TraceSink -----------------------------------------------------

/// A consumer of verbose resolution traces.
///
/// The resolver notifies the installed sink once per query attempt: with
/// the full [`QueryLog`] when a matching, non-error response arrived, or
/// with just the query when the attempt timed out. Error responses and
/// transport failures are reported through the `tracing` machinery
/// instead.
pub trait TraceSink {
    /// Called when an attempt went unanswered.
    fn on_query_timeout(&mut self, query: &Query, server: SocketAddr);

    /// Called when a round trip completed.
    fn on_round_trip(&mut self, log: &QueryLog);
}

//------------ LookupState ---------------------------------------------------

/// State scoped to one top-level lookup.
#[derive(Clone, Copy, Debug, Default)]
struct LookupState {
    /// Queries sent so far, counted against the budget.
    queries_sent: usize,

    /// An authoritative answer for the current question was received.
    auth_seen: bool,

    /// The most recent query went unanswered through all its attempts.
    abandoned: bool,
}

//------------ Resolver ------------------------------------------------------

/// An iterative DNS resolver.
pub struct Resolver<T = UdpTransport> {
    config: Config,
    transport: T,
    cache: RecordCache,
    trace: Option<Box<dyn TraceSink + Send>>,
}

impl Resolver<UdpTransport> {
    /// Creates a resolver with the process-lifetime UDP socket bound.
    ///
    /// The socket is bound for the address family of the configured
    /// starting nameserver and is the only one the resolver will ever use.
    pub async fn bind(config: Config) -> io::Result<Self> {
        let transport =
            UdpTransport::bind(config.server(), config.read_timeout())
                .await?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport + Send> Resolver<T> {
    /// Creates a resolver on top of the given transport.
    pub fn with_transport(config: Config, transport: T) -> Self {
        Resolver {
            config,
            transport,
            cache: RecordCache::new(),
            trace: None,
        }
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the transport the resolver queries through.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Points future lookups at a different starting nameserver.
    pub fn set_server(&mut self, server: SocketAddr) {
        self.config.set_server(server)
    }

    /// Installs or removes the verbose trace sink.
    pub fn set_trace(&mut self, sink: Option<Box<dyn TraceSink + Send>>) {
        self.trace = sink
    }

    /// Returns the record cache.
    pub fn cache(&self) -> &RecordCache {
        &self.cache
    }

    /// Returns the record cache for modification.
    pub fn cache_mut(&mut self) -> &mut RecordCache {
        &mut self.cache
    }

    /// Looks up all records of the given type for the given host name.
    ///
    /// Returns the matching records in their deterministic cache order.
    /// The result is empty when nothing could be resolved; failures along
    /// the way are logged, never surfaced.
    pub async fn lookup(
        &mut self,
        host: &str,
        rtype: RecordType,
    ) -> Vec<ResourceRecord> {
        let mut state = LookupState::default();
        let node = Node::new(host, rtype);
        let results = self.get_results(&mut state, node, 0).await;
        results.into_iter().collect()
    }

    /// Resolves a node against the cache, going to the network as needed.
    ///
    /// `depth` counts the CNAME hops followed so far for the top-level
    /// lookup this call belongs to.
    fn get_results<'a>(
        &'a mut self,
        state: &'a mut LookupState,
        node: Node,
        depth: usize,
    ) -> Pin<Box<dyn Future<Output = BTreeSet<ResourceRecord>> + Send + 'a>>
    {
        Box::pin(async move {
            if depth > self.config.max_indirection() {
                warn!("maximum CNAME indirection reached, '{node}' unresolved");
                return BTreeSet::new();
            }

            // A cached CNAME redirects the network query to its target.
            // Everything after the retrieval still works on the node that
            // was asked about.
            let cname_node = Node::new(node.host(), RecordType::Cname);
            let target = self
                .cache
                .get(&cname_node)
                .iter()
                .find_map(|record| record.data().as_name())
                .map(|target| Node::new(target, node.rtype()))
                .unwrap_or_else(|| node.clone());
            let server = self.config.server();
            self.retrieve(state, target, server).await;

            if self.cache.contains(&node) {
                return self.cache.get(&node).clone();
            }

            // No direct records. Follow the cached CNAME chain; each hop
            // consumes indirection budget, which also bounds chains that
            // loop back on themselves.
            let mut target_host = node.host().to_string();
            let mut hops = 0;
            loop {
                let link = Node::new(target_host.clone(), RecordType::Cname);
                let next = self
                    .cache
                    .get(&link)
                    .iter()
                    .find_map(|record| {
                        record.data().as_name().map(String::from)
                    });
                match next {
                    Some(next) => {
                        hops += 1;
                        if depth + hops > self.config.max_indirection() {
                            warn!(
                                "maximum CNAME indirection reached, \
                                 '{node}' unresolved"
                            );
                            return BTreeSet::new();
                        }
                        target_host = next;
                    }
                    None => break,
                }
            }
            if hops == 0 {
                // Nothing cached and nowhere to go.
                return BTreeSet::new();
            }

            let final_node = Node::new(target_host, node.rtype());
            if self.cache.contains(&final_node) {
                return self.cache.get(&final_node).clone();
            }
            self.get_results(state, final_node, depth + hops).await
        })
    }

    /// Performs one delegation step: ask `server` about `node`.
    ///
    /// Everything learned lands in the cache; referrals are followed by
    /// recursing towards the delegated-to nameservers.
    fn retrieve<'a>(
        &'a mut self,
        state: &'a mut LookupState,
        node: Node,
        server: SocketAddr,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            if self.cache.contains(&node) {
                return;
            }
            if state.queries_sent >= self.config.query_budget() {
                warn!("query budget exhausted, not asking about '{node}'");
                return;
            }
            state.queries_sent += 1;

            let query = Query::new(node.clone(), rand::random());
            let wire = match query.to_wire() {
                Ok(wire) => wire,
                Err(err) => {
                    debug!("cannot encode query for '{node}': {err}");
                    return;
                }
            };

            // One logical query, up to `attempts` sends with the same id.
            let mut response = None;
            for _ in 0..self.config.attempts() {
                match self
                    .transport
                    .exchange(&wire, query.id(), server)
                    .await
                {
                    Ok(matched) => {
                        response = Some(matched);
                        break;
                    }
                    Err(TransportError::Timeout) => {
                        debug!(
                            "query {} for '{node}' to {} timed out",
                            query.id(),
                            server.ip()
                        );
                        if let Some(sink) = self.trace.as_mut() {
                            sink.on_query_timeout(&query, server);
                        }
                    }
                    Err(err) => {
                        debug!("query {} for '{node}': {err}", query.id());
                        return;
                    }
                }
            }
            let response = match response {
                Some(response) => response,
                None => {
                    // Unanswered through all attempts. The flag makes the
                    // callers up the chain stop working their nameserver
                    // lists.
                    state.abandoned = true;
                    return;
                }
            };
            state.abandoned = false;

            if response.is_error() {
                debug!(
                    "response {} for '{node}' signals an error, \
                     dropping it",
                    response.id()
                );
                return;
            }

            for record in response.records() {
                self.cache.insert(record.clone());
            }
            if let Some(sink) = self.trace.as_mut() {
                sink.on_round_trip(&QueryLog {
                    query: query.clone(),
                    server,
                    response: response.clone(),
                });
            }

            if response.is_authoritative() {
                // Final, whether it carried answers or not.
                state.auth_seen = true;
                return;
            }
            if !response.answers().is_empty() {
                // Not authoritative but it did answer; the records are
                // cached and the caller takes it from there.
                return;
            }

            // A referral. Work out which of the named nameservers we have
            // an address for, resolving some if the response brought none.
            let referrals: Vec<String> =
                response.referral_nameservers().into_iter().collect();
            if referrals.is_empty() {
                debug!("response for '{node}' is a dead end");
                return;
            }
            let mut usable: Vec<&str> = referrals
                .iter()
                .map(String::as_str)
                .filter(|ns| {
                    self.cache.contains(&Node::new(*ns, RecordType::A))
                })
                .collect();
            if usable.is_empty() {
                for ns in &referrals {
                    let ns_node = Node::new(ns.as_str(), RecordType::A);
                    self.get_results(state, ns_node.clone(), 0).await;
                    if self.cache.contains(&ns_node) {
                        usable.push(ns.as_str());
                        break;
                    }
                }
            }
            if usable.is_empty() {
                debug!(
                    "no resolvable nameserver in delegation for '{node}'"
                );
                return;
            }

            for ns in usable {
                let addr = self
                    .cache
                    .get(&Node::new(ns, RecordType::A))
                    .iter()
                    .find_map(|record| record.data().as_v4());
                let addr = match addr {
                    Some(addr) => addr,
                    None => continue,
                };
                let next = SocketAddr::from((addr, DNS_PORT));
                self.retrieve(state, node.clone(), next).await;
                if self.branch_settled(state, &node) {
                    return;
                }
            }
        })
    }

    /// Returns whether working further nameservers for `node` is pointless.
    ///
    /// That is the case once the node itself, or a CNAME, MX, SOA, or
    /// unknown-type record for its host, got cached, or once a query was
    /// abandoned or answered authoritatively.
    fn branch_settled(&self, state: &LookupState, node: &Node) -> bool {
        if state.abandoned || state.auth_seen {
            return true;
        }
        if self.cache.contains(node) {
            return true;
        }
        let host = node.host();
        for rtype in [RecordType::Cname, RecordType::Mx, RecordType::Soa] {
            if self.cache.contains(&Node::new(host, rtype)) {
                return true;
            }
        }
        self.cache.iter().any(|(cached, records)| {
            cached.host() == host
                && matches!(cached.rtype(), RecordType::Other(_))
                && !records.is_empty()
        })
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::RecordData;
    use std::net::Ipv4Addr;

    /// A transport for tests that never touch the network.
    struct NeverTransport;

    impl Transport for NeverTransport {
        fn exchange<'a>(
            &'a mut self,
            _wire: &'a [u8],
            _id: u16,
            _server: SocketAddr,
        ) -> Pin<
            Box<
                dyn Future<Output = Result<Response, TransportError>>
                    + Send
                    + 'a,
            >,
        > {
            unreachable!("test must not reach the network")
        }
    }

    fn resolver() -> Resolver<NeverTransport> {
        let config = Config::new(SocketAddr::from((
            Ipv4Addr::new(192, 0, 2, 1),
            DNS_PORT,
        )));
        Resolver::with_transport(config, NeverTransport)
    }

    #[test]
    fn config_defaults() {
        let config = resolver().config;
        assert_eq!(config.read_timeout(), Duration::from_secs(5));
        assert_eq!(config.attempts(), 2);
        assert_eq!(config.max_indirection(), 10);
        assert_eq!(config.query_budget(), 65536);
    }

    #[test]
    fn config_clamps() {
        let mut config = resolver().config;
        config.set_read_timeout(Duration::from_secs(3600));
        assert_eq!(config.read_timeout(), Duration::from_secs(60));
        config.set_read_timeout(Duration::ZERO);
        assert_eq!(config.read_timeout(), Duration::from_millis(1));
        config.set_attempts(0);
        assert_eq!(config.attempts(), 1);
    }

    #[test]
    fn branch_settled_by_flags() {
        let resolver = resolver();
        let node = Node::new("example.com", RecordType::A);
        let mut state = LookupState::default();
        assert!(!resolver.branch_settled(&state, &node));
        state.abandoned = true;
        assert!(resolver.branch_settled(&state, &node));
        state.abandoned = false;
        state.auth_seen = true;
        assert!(resolver.branch_settled(&state, &node));
    }

    #[test]
    fn branch_settled_by_cached_records() {
        let mut resolver = resolver();
        let node = Node::new("example.com", RecordType::A);
        let state = LookupState::default();

        resolver.cache.insert(ResourceRecord::new(
            "example.com",
            RecordType::Mx,
            60,
            RecordData::Name(String::new()),
        ));
        assert!(resolver.branch_settled(&state, &node));

        let mut resolver = self::resolver();
        resolver.cache.insert(ResourceRecord::new(
            "example.com",
            RecordType::Other(99),
            60,
            RecordData::Name("odd".into()),
        ));
        assert!(resolver.branch_settled(&state, &node));

        // A record for some other host settles nothing.
        let mut resolver = self::resolver();
        resolver.cache.insert(ResourceRecord::new(
            "other.com",
            RecordType::Other(99),
            60,
            RecordData::Name("odd".into()),
        ));
        assert!(!resolver.branch_settled(&state, &node));
    }
}

//! Resource records and the node key.
//!
//! A [`Node`] names what a lookup asks for: a host name and a record type.
//! Host names are kept as dotted strings with their spelling preserved and
//! are compared exactly; the crate never folds case or normalizes aliases,
//! so `www.EXAMPLE.com` and `www.example.com` are different nodes.
//!
//! A [`ResourceRecord`] is one decoded record: the node it belongs to plus
//! the time to live and the decoded record data. Record data is reduced to
//! the shapes this resolver acts upon, see [`RecordData`].

use super::rtype::RecordType;
use core::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

//------------ Node ----------------------------------------------------------

/// A host name and record type pair, the key of cache and lookups.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Node {
    host: String,
    rtype: RecordType,
}

impl Node {
    /// Creates a new node from a host name and a record type.
    pub fn new(host: impl Into<String>, rtype: RecordType) -> Self {
        Node {
            host: host.into(),
            rtype,
        }
    }

    /// Returns the host name of the node.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the record type of the node.
    pub fn rtype(&self) -> RecordType {
        self.rtype
    }
}

//--- Display

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.host, self.rtype)
    }
}

//------------ RecordData ----------------------------------------------------

/// The decoded data of a resource record.
///
/// A records carry an IPv4 address and AAAA records an IPv6 address. The
/// data of every other type is read as a single, possibly compressed domain
/// name from the start of the record data. That is exact for NS and CNAME,
/// loses the preference of MX and everything but the primary nameserver of
/// SOA, and produces best-effort text for unknown types; none of which this
/// resolver needs for its decisions.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum RecordData {
    /// A domain name, kept in its dotted textual form.
    Name(String),

    /// An IPv4 address from an A record.
    V4(Ipv4Addr),

    /// An IPv6 address from an AAAA record.
    V6(Ipv6Addr),
}

impl RecordData {
    /// Returns the domain name if the data is one.
    pub fn as_name(&self) -> Option<&str> {
        match *self {
            RecordData::Name(ref name) => Some(name),
            _ => None,
        }
    }

    /// Returns the IPv4 address if the data is one.
    pub fn as_v4(&self) -> Option<Ipv4Addr> {
        match *self {
            RecordData::V4(addr) => Some(addr),
            _ => None,
        }
    }
}

//--- Display

impl fmt::Display for RecordData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            RecordData::Name(ref name) => f.write_str(name),
            RecordData::V4(ref addr) => addr.fmt(f),
            RecordData::V6(ref addr) => addr.fmt(f),
        }
    }
}

//------------ ResourceRecord ------------------------------------------------

/// A single decoded resource record.
///
/// Equality and ordering cover all fields, so two records that differ only
/// in their time to live are distinct values. Ordering exists to give sets
/// of records a stable, deterministic iteration order.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ResourceRecord {
    host: String,
    rtype: RecordType,
    ttl: u32,
    data: RecordData,
}

impl ResourceRecord {
    /// Creates a new resource record.
    pub fn new(
        host: impl Into<String>,
        rtype: RecordType,
        ttl: u32,
        data: RecordData,
    ) -> Self {
        ResourceRecord {
            host: host.into(),
            rtype,
            ttl,
            data,
        }
    }

    /// Returns the host name the record belongs to.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the record type.
    pub fn rtype(&self) -> RecordType {
        self.rtype
    }

    /// Returns the time to live, in seconds.
    ///
    /// The value is informational: the cache never expires records.
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Returns the record data.
    pub fn data(&self) -> &RecordData {
        &self.data
    }

    /// Returns the node this record belongs to.
    pub fn node(&self) -> Node {
        Node::new(self.host.clone(), self.rtype)
    }
}

//============ Testing =======================================================

//! Resource record types and classes.

use super::wire::ParseError;
use core::fmt;
use core::str::FromStr;
use octseq::parse::Parser;

/// The record class IN (Internet), the only class this crate touches.
///
/// Queries are always sent with this class; the class field of received
/// records is read and discarded.
pub const CLASS_IN: u16 = 1;

//------------ RecordType ----------------------------------------------------

/// The type of a resource record.
///
/// Only the handful of types this resolver acts upon get their own variant;
/// every other type value is carried verbatim in [`RecordType::Other`], so
/// no information from a message is lost and unknown types with different
/// codes remain distinct cache keys.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum RecordType {
    /// A host address. [RFC 1035]
    ///
    /// [RFC 1035]: https://tools.ietf.org/html/rfc1035
    A,

    /// An authoritative nameserver.
    Ns,

    /// The canonical name for an alias.
    Cname,

    /// The start of a zone of authority.
    Soa,

    /// Mail exchange.
    Mx,

    /// An IPv6 host address. [RFC 3596]
    ///
    /// [RFC 3596]: https://tools.ietf.org/html/rfc3596
    Aaaa,

    /// Any other record type, with its type code.
    Other(u16),
}

impl RecordType {
    /// Returns the record type for the given type code.
    ///
    /// Codes with a dedicated variant map to that variant, so values
    /// produced by this function are canonical.
    #[must_use]
    pub fn from_int(value: u16) -> Self {
        match value {
            1 => RecordType::A,
            2 => RecordType::Ns,
            5 => RecordType::Cname,
            6 => RecordType::Soa,
            15 => RecordType::Mx,
            28 => RecordType::Aaaa,
            _ => RecordType::Other(value),
        }
    }

    /// Returns the type code of this record type.
    #[must_use]
    pub fn to_int(self) -> u16 {
        match self {
            RecordType::A => 1,
            RecordType::Ns => 2,
            RecordType::Cname => 5,
            RecordType::Soa => 6,
            RecordType::Mx => 15,
            RecordType::Aaaa => 28,
            RecordType::Other(value) => value,
        }
    }

    /// Takes a record type from the current position of a parser.
    pub fn parse(parser: &mut Parser<'_, [u8]>) -> Result<Self, ParseError> {
        Ok(Self::from_int(parser.parse_u16_be()?))
    }

    /// Appends the wire format of the record type to a message buffer.
    pub fn compose(self, target: &mut Vec<u8>) {
        target.extend_from_slice(&self.to_int().to_be_bytes())
    }

    /// Returns the mnemonic of this record type if it has one.
    fn to_mnemonic_str(self) -> Option<&'static str> {
        match self {
            RecordType::A => Some("A"),
            RecordType::Ns => Some("NS"),
            RecordType::Cname => Some("CNAME"),
            RecordType::Soa => Some("SOA"),
            RecordType::Mx => Some("MX"),
            RecordType::Aaaa => Some("AAAA"),
            RecordType::Other(_) => None,
        }
    }

    /// Returns the record type for the given mnemonic.
    fn from_mnemonic(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("A") {
            Some(RecordType::A)
        } else if s.eq_ignore_ascii_case("NS") {
            Some(RecordType::Ns)
        } else if s.eq_ignore_ascii_case("CNAME") {
            Some(RecordType::Cname)
        } else if s.eq_ignore_ascii_case("SOA") {
            Some(RecordType::Soa)
        } else if s.eq_ignore_ascii_case("MX") {
            Some(RecordType::Mx)
        } else if s.eq_ignore_ascii_case("AAAA") {
            Some(RecordType::Aaaa)
        } else {
            None
        }
    }
}

//--- FromStr

impl FromStr for RecordType {
    type Err = FromStrError;

    /// Accepts a mnemonic or the generic `TYPE<code>` form, in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(res) = Self::from_mnemonic(s) {
            return Ok(res);
        }
        if let (Some(prefix), Some(rest)) = (s.get(..4), s.get(4..)) {
            if prefix.eq_ignore_ascii_case("TYPE") && !rest.is_empty() {
                if let Ok(value) = rest.parse() {
                    return Ok(Self::from_int(value));
                }
            }
        }
        Err(FromStrError(()))
    }
}

//--- Display

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.to_mnemonic_str() {
            Some(m) => f.write_str(m),
            None => write!(f, "TYPE{}", self.to_int()),
        }
    }
}

//------------ FromStrError --------------------------------------------------

/// A string did not contain a record type.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FromStrError(());

impl fmt::Display for FromStrError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("unknown record type")
    }
}

impl std::error::Error for FromStrError {}

//============ Testing =======================================================

//! Wire-format queries and responses.
//!
//! A [`Query`] is composed into a complete datagram with [`Query::to_wire`].
//! A received datagram is decoded eagerly into an owned [`Response`] with
//! [`Response::from_wire`]: header, question, and the three record sections
//! split positionally by the header counts.
//!
//! Decoding is deliberately tolerant. A record whose data cannot be decoded
//! is skipped and decoding resynchronizes at the RDLENGTH boundary; a
//! message truncated mid-record yields the records decoded so far. Only a
//! message too short for its fixed header or question is rejected outright.

use super::header::{Header, HeaderCounts};
use super::name::{compose_name, parse_name, NameError};
use super::record::{Node, RecordData, ResourceRecord};
use super::rtype::{RecordType, CLASS_IN};
use super::wire::ParseError;
use octseq::parse::Parser;
use std::collections::BTreeSet;

//------------ Query ---------------------------------------------------------

/// A single question to send to a nameserver.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Query {
    node: Node,
    id: u16,
}

impl Query {
    /// Creates a new query for the given node with the given message id.
    pub fn new(node: Node, id: u16) -> Self {
        Query { node, id }
    }

    /// Returns the node being asked about.
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Returns the transaction id of the query.
    pub fn id(&self) -> u16 {
        self.id
    }

    /// Composes the complete wire-format datagram for this query.
    ///
    /// The message consists of the header with all flag bits zero and a
    /// question count of one, followed by the single question. This fails
    /// only if the host name does not fit the wire format.
    pub fn to_wire(&self) -> Result<Vec<u8>, NameError> {
        let mut target = Vec::with_capacity(
            12 + self.node.host().len() + 6,
        );
        let mut header = Header::new();
        header.set_id(self.id);
        target.extend_from_slice(header.as_slice());
        let mut counts = HeaderCounts::new();
        counts.set_qdcount(1);
        target.extend_from_slice(counts.as_slice());
        compose_name(&mut target, self.node.host())?;
        self.node.rtype().compose(&mut target);
        target.extend_from_slice(&CLASS_IN.to_be_bytes());
        Ok(target)
    }
}

//------------ Response ------------------------------------------------------

/// A decoded DNS message.
///
/// The three record sections are kept in wire order. The question section
/// is consumed during decoding but only the name of the first question is
/// retained.
#[derive(Clone, Debug)]
pub struct Response {
    header: Header,
    qname: String,
    answers: Vec<ResourceRecord>,
    authority: Vec<ResourceRecord>,
    additional: Vec<ResourceRecord>,
}

impl Response {
    /// Decodes a complete message.
    pub fn from_wire(message: &[u8]) -> Result<Self, ParseError> {
        let mut parser = Parser::from_ref(message);
        let header = Header::parse(&mut parser)?;
        let counts = HeaderCounts::parse(&mut parser)?;

        let mut qname = String::new();
        for i in 0..counts.qdcount() {
            let name = parse_name(&mut parser)?;
            RecordType::parse(&mut parser)?;
            parser.advance(2)?; // QCLASS
            if i == 0 {
                qname = name;
            }
        }

        let mut answers = Vec::new();
        let mut authority = Vec::new();
        let mut additional = Vec::new();
        'sections: for (count, section) in [
            (counts.ancount(), &mut answers),
            (counts.nscount(), &mut authority),
            (counts.arcount(), &mut additional),
        ] {
            for _ in 0..count {
                match parse_record(&mut parser) {
                    Ok(Some(record)) => section.push(record),
                    Ok(None) => {}
                    // Truncated or unrecoverably malformed: keep what we
                    // have decoded so far.
                    Err(_) => break 'sections,
                }
            }
        }

        Ok(Response {
            header,
            qname,
            answers,
            authority,
            additional,
        })
    }

    /// Returns the transaction id of the message.
    pub fn id(&self) -> u16 {
        self.header.id()
    }

    /// Returns whether the response is authoritative.
    pub fn is_authoritative(&self) -> bool {
        self.header.aa()
    }

    /// Returns whether the response signals an error condition.
    ///
    /// That is the case when any of the reserved header bits or any RCODE
    /// bit is set.
    pub fn is_error(&self) -> bool {
        self.header.is_error()
    }

    /// Returns the name from the first question of the message.
    ///
    /// Empty if the message carried no question.
    pub fn question_name(&self) -> &str {
        &self.qname
    }

    /// Returns the records of the answer section.
    pub fn answers(&self) -> &[ResourceRecord] {
        &self.answers
    }

    /// Returns the records of the authority section.
    pub fn authority(&self) -> &[ResourceRecord] {
        &self.authority
    }

    /// Returns the records of the additional section.
    pub fn additional(&self) -> &[ResourceRecord] {
        &self.additional
    }

    /// Returns the records of all three sections in wire order.
    pub fn records(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.answers
            .iter()
            .chain(&self.authority)
            .chain(&self.additional)
    }

    /// Returns the nameservers this response delegates to.
    ///
    /// These are the target host names of the NS records in the authority
    /// section, deduplicated and in a deterministic order.
    pub fn referral_nameservers(&self) -> BTreeSet<String> {
        self.authority
            .iter()
            .filter(|record| record.rtype() == RecordType::Ns)
            .filter_map(|record| record.data().as_name())
            .map(String::from)
            .collect()
    }
}

//------------ Record parsing ------------------------------------------------

/// Takes one resource record from the current position of a parser.
///
/// Returns `Ok(None)` for a record whose data had to be skipped. In either
/// `Ok` case the parser rests at the RDLENGTH boundary of the record, so
/// decoding can continue with the next one.
fn parse_record(
    parser: &mut Parser<'_, [u8]>,
) -> Result<Option<ResourceRecord>, ParseError> {
    let host = parse_name(parser)?;
    let rtype = RecordType::parse(parser)?;
    parser.advance(2)?; // CLASS
    let ttl = parser.parse_u32_be()?;
    let rdlen = usize::from(parser.parse_u16_be()?);
    let rdata_end = parser.pos() + rdlen;

    let data = parse_rdata(parser, rtype, rdlen);
    // Resynchronize no matter where decoding the data left the cursor.
    parser.seek(rdata_end)?;

    match data {
        Ok(data) => Ok(Some(ResourceRecord::new(host, rtype, ttl, data))),
        Err(_) => Ok(None),
    }
}

/// Decodes the data of a record.
fn parse_rdata(
    parser: &mut Parser<'_, [u8]>,
    rtype: RecordType,
    rdlen: usize,
) -> Result<RecordData, ParseError> {
    match rtype {
        RecordType::A => {
            if rdlen != 4 {
                return Err(ParseError::form_error("invalid A record data"));
            }
            let mut buf = [0; 4];
            parser.parse_buf(&mut buf)?;
            Ok(RecordData::V4(buf.into()))
        }
        RecordType::Aaaa => {
            if rdlen != 16 {
                return Err(ParseError::form_error(
                    "invalid AAAA record data",
                ));
            }
            let mut buf = [0; 16];
            parser.parse_buf(&mut buf)?;
            Ok(RecordData::V6(buf.into()))
        }
        _ => Ok(RecordData::Name(parse_name(parser)?)),
    }
}

//============ Testing =======================================================

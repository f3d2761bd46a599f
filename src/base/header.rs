//! The header of a DNS message.
//!
//! Each DNS message starts with a twelve octet long header section. Its
//! content and format are defined in section 4.1.1 of [RFC 1035]. The
//! header is split into two parts here: [`Header`] contains the message id
//! and the flag bits, [`HeaderCounts`] the number of entries in each of the
//! four sections that follow.
//!
//! Queries sent by this crate carry an all-zero flags field: recursion is
//! never requested since resolution is performed iteratively.
//!
//! [RFC 1035]: https://tools.ietf.org/html/rfc1035

use super::wire::ParseError;
use octseq::parse::Parser;

//------------ Header --------------------------------------------------------

/// The first part of the header of a DNS message.
///
/// This type covers the first four octets: the message id and the flag
/// bits. Only the flags this crate acts upon get accessors; everything else
/// is carried around untouched.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Header {
    /// The actual header in its wire-format representation.
    inner: [u8; 4],
}

impl Header {
    /// Creates a new header with all fields set to zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a header from the beginning of a parser.
    pub fn parse(parser: &mut Parser<[u8]>) -> Result<Self, ParseError> {
        let mut inner = [0; 4];
        parser.parse_buf(&mut inner)?;
        Ok(Header { inner })
    }

    /// Returns a reference to the underlying octets slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.inner
    }

    /// Returns the value of the ID field.
    ///
    /// The ID field is an identifier chosen by whoever creates a query and
    /// is copied into the response by the server, allowing responses to be
    /// matched to their queries.
    pub fn id(self) -> u16 {
        u16::from_be_bytes([self.inner[0], self.inner[1]])
    }

    /// Sets the value of the ID field.
    pub fn set_id(&mut self, value: u16) {
        self.inner[..2].copy_from_slice(&value.to_be_bytes())
    }

    /// Returns whether the AA (authoritative answer) bit is set.
    pub fn aa(self) -> bool {
        self.get_bit(2, 2)
    }

    /// Returns the three reserved bits following the RA bit.
    ///
    /// DNSSEC-aware servers repurpose two of these as AD and CD, but this
    /// resolver never negotiates DNSSEC and requires all three to be zero
    /// in a usable response.
    pub fn reserved_bits(self) -> u8 {
        (self.inner[3] >> 4) & 0x07
    }

    /// Returns the value of the RCODE field.
    pub fn rcode(self) -> u8 {
        self.inner[3] & 0x0F
    }

    /// Returns whether the header signals an error condition.
    ///
    /// That is the case when any reserved bit or any RCODE bit is set.
    pub fn is_error(self) -> bool {
        self.reserved_bits() != 0 || self.rcode() != 0
    }

    //--- Internal helpers

    /// Returns the value of the bit at the given position.
    ///
    /// The argument `offset` gives the byte offset into the header and
    /// `bit` gives the number of the bit with the most significant bit
    /// being 7.
    fn get_bit(self, offset: usize, bit: usize) -> bool {
        self.inner[offset] & (1 << bit) != 0
    }
}

//------------ HeaderCounts --------------------------------------------------

/// The section counts of the header of a DNS message.
///
/// This part consists of four 16 bit counters for the number of entries in
/// the four sections of the message: questions, answers, authority records,
/// and additional records.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct HeaderCounts {
    /// The actual counts in their wire-format representation.
    inner: [u8; 8],
}

impl HeaderCounts {
    /// Creates a new value with all counts set to zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the counts from the current position of a parser.
    pub fn parse(parser: &mut Parser<[u8]>) -> Result<Self, ParseError> {
        let mut inner = [0; 8];
        parser.parse_buf(&mut inner)?;
        Ok(HeaderCounts { inner })
    }

    /// Returns a reference to the underlying octets slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.inner
    }

    /// Returns the number of questions in the question section.
    pub fn qdcount(self) -> u16 {
        self.get_u16(0)
    }

    /// Sets the number of questions in the question section.
    pub fn set_qdcount(&mut self, value: u16) {
        self.set_u16(0, value)
    }

    /// Returns the number of records in the answer section.
    pub fn ancount(self) -> u16 {
        self.get_u16(2)
    }

    /// Returns the number of records in the authority section.
    pub fn nscount(self) -> u16 {
        self.get_u16(4)
    }

    /// Returns the number of records in the additional section.
    pub fn arcount(self) -> u16 {
        self.get_u16(6)
    }

    //--- Internal helpers

    fn get_u16(self, offset: usize) -> u16 {
        u16::from_be_bytes([self.inner[offset], self.inner[offset + 1]])
    }

    fn set_u16(&mut self, offset: usize, value: u16) {
        self.inner[offset..offset + 2].copy_from_slice(&value.to_be_bytes())
    }
}

//============ Testing =======================================================

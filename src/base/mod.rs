//! Basics.
//!
//! This module provides the types for working with DNS data on the wire:
//! the message header, domain names with compression, record types, decoded
//! resource records, and whole messages. Everything here is independent of
//! networking and resolution strategy; it is shared by the transport, the
//! cache, and the resolver engine.
//!
//! Wire data is extracted with a cursor-style parser positioned on a
//! complete message, since compression pointers reference absolute offsets
//! from the start of the message. We use the term *parsing* for extracting
//! data from the wire format and *composing* for producing it.

pub use self::header::{Header, HeaderCounts};
pub use self::message::{Query, Response};
pub use self::name::{compose_name, parse_name, NameError};
pub use self::record::{Node, RecordData, ResourceRecord};
pub use self::rtype::{RecordType, CLASS_IN};
pub use self::wire::{FormError, ParseError};

pub mod header;
pub mod message;
pub mod name;
pub mod record;
pub mod rtype;
pub mod wire;

//! Domain names on the wire.
//!
//! The data model of this crate keeps host names as dotted strings exactly
//! as the user typed them or as they appeared in a message, so this module
//! deals in `String`s rather than a dedicated name type: [`compose_name`]
//! turns a dotted string into the label sequence of the wire format and
//! [`parse_name`] reads a possibly compressed name from a message and
//! returns its dotted form with the original spelling preserved.

use super::wire::{FormError, ParseError};
use core::fmt;
use octseq::parse::Parser;

/// The maximum length of a name in its wire format.
const MAX_NAME_LEN: usize = 255;

/// The maximum length of a single label.
const MAX_LABEL_LEN: usize = 63;

//------------ compose_name --------------------------------------------------

/// Appends the wire format of a dotted name to a message buffer.
///
/// Labels are the dot-separated components of `name`; empty labels (from
/// leading, trailing, or doubled dots, or from an empty name) are skipped,
/// so both `""` and `"."` compose to just the root label.
pub fn compose_name(
    target: &mut Vec<u8>,
    name: &str,
) -> Result<(), NameError> {
    let mut name_len = 1;
    for label in name.split('.').filter(|label| !label.is_empty()) {
        if label.len() > MAX_LABEL_LEN {
            return Err(NameError::LongLabel);
        }
        name_len += label.len() + 1;
        if name_len > MAX_NAME_LEN {
            return Err(NameError::LongName);
        }
        target.push(label.len() as u8);
        target.extend_from_slice(label.as_bytes());
    }
    target.push(0);
    Ok(())
}

//------------ parse_name ----------------------------------------------------

/// Takes a possibly compressed name from the current position of a parser.
///
/// The parser must be positioned on a complete message starting at the
/// header, since compression pointers hold offsets from the beginning of
/// the message. After a successful return the parser rests directly behind
/// the name as it appears in place, no matter how far any pointers led.
///
/// Label octets are mapped to characters one to one, preserving the case
/// and spelling found in the message. The root name parses to the empty
/// string.
pub fn parse_name(
    parser: &mut Parser<'_, [u8]>,
) -> Result<String, ParseError> {
    let mut name = String::new();
    let mut name_len = 0;

    // Phase one: no compression pointers have been found yet. Parse labels
    // off the caller's parser so it ends up behind the name.
    let mut ptr = loop {
        match LabelType::parse(parser)? {
            LabelType::Normal(0) => return Ok(name),
            LabelType::Normal(label_len) => {
                name_len += usize::from(label_len) + 1;
                if name_len >= MAX_NAME_LEN {
                    return Err(FormError::new("long domain name").into());
                }
                append_label(&mut name, parser, label_len)?;
            }
            LabelType::Compressed(ptr) => break ptr,
        }
    };

    // Phase two: compression has occurred. Work on a shadow copy of the
    // parser so we can jump around while the caller's parser keeps resting
    // behind the pointer. (Parsers are copy, dereferencing clones them.)
    let mut parser = *parser;
    loop {
        // A compression pointer must point strictly backwards. It is two
        // octets long and the parser is already behind it, so the target
        // must be less than the current position minus two. This also rules
        // out pointer loops.
        if ptr >= parser.pos() - 2 {
            return Err(FormError::new("excessive name compression").into());
        }
        parser.seek(ptr)?;

        loop {
            match LabelType::parse(&mut parser)? {
                LabelType::Normal(0) => return Ok(name),
                LabelType::Normal(label_len) => {
                    name_len += usize::from(label_len) + 1;
                    if name_len >= MAX_NAME_LEN {
                        return Err(
                            FormError::new("long domain name").into()
                        );
                    }
                    append_label(&mut name, &mut parser, label_len)?;
                }
                LabelType::Compressed(new_ptr) => {
                    ptr = new_ptr;
                    break;
                }
            }
        }
    }
}

/// Appends one label of the given length, dot-separated, to `name`.
fn append_label(
    name: &mut String,
    parser: &mut Parser<'_, [u8]>,
    label_len: u8,
) -> Result<(), ParseError> {
    let label = parser.parse_octets(usize::from(label_len))?;
    if !name.is_empty() {
        name.push('.');
    }
    for &octet in label {
        name.push(char::from(octet));
    }
    Ok(())
}

//------------ LabelType -----------------------------------------------------

/// The type of a label of a domain name in its wire format.
enum LabelType {
    /// A normal label with its size in octets.
    Normal(u8),

    /// A compressed label with the position of where to continue.
    Compressed(usize),
}

impl LabelType {
    /// Attempts to take a label type from the beginning of `parser`.
    fn parse(parser: &mut Parser<'_, [u8]>) -> Result<Self, ParseError> {
        let ltype = parser.parse_u8()?;
        match ltype {
            0..=0x3F => Ok(LabelType::Normal(ltype)),
            0xC0..=0xFF => {
                let res = usize::from(parser.parse_u8()?);
                let res = res | ((usize::from(ltype) & 0x3F) << 8);
                Ok(LabelType::Compressed(res))
            }
            _ => Err(FormError::new("invalid label type").into()),
        }
    }
}

//------------ NameError -----------------------------------------------------

/// A dotted name could not be turned into its wire format.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NameError {
    /// A label was longer than 63 octets.
    LongLabel,

    /// The name as a whole was longer than 255 octets.
    LongName,
}

//--- Display and Error

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            NameError::LongLabel => f.write_str("label too long"),
            NameError::LongName => f.write_str("domain name too long"),
        }
    }
}

impl std::error::Error for NameError {}

//============ Testing =======================================================

//! Test support: wire builders and a scripted transport.

#![allow(dead_code)]

use dnsdelve::base::{compose_name, RecordType, Response, CLASS_IN};
use dnsdelve::net::{Transport, TransportError};
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;

//------------ Wire building -------------------------------------------------

/// Returns the record data for a name-valued record, uncompressed.
pub fn name_data(name: &str) -> Vec<u8> {
    let mut wire = Vec::new();
    compose_name(&mut wire, name).unwrap();
    wire
}

/// Returns the record data for an A record.
pub fn a_data(addr: [u8; 4]) -> Vec<u8> {
    addr.to_vec()
}

/// Starts a response to the given question.
///
/// The response starts out non-authoritative with no error and no records.
pub fn response(qname: &str, rtype: RecordType) -> ResponseBuilder {
    ResponseBuilder {
        flags: [0x80, 0x00],
        question: (qname.into(), rtype),
        sections: Default::default(),
    }
}

/// A DNS response message under construction.
pub struct ResponseBuilder {
    flags: [u8; 2],
    question: (String, RecordType),
    sections: [Vec<Vec<u8>>; 3],
}

impl ResponseBuilder {
    /// Marks the response authoritative.
    pub fn authoritative(mut self) -> Self {
        self.flags[0] |= 0x04;
        self
    }

    /// Sets the response code.
    pub fn rcode(mut self, rcode: u8) -> Self {
        self.flags[1] = (self.flags[1] & 0xF0) | (rcode & 0x0F);
        self
    }

    /// Appends a record to the answer section.
    pub fn answer(
        mut self,
        name: &str,
        rtype: RecordType,
        ttl: u32,
        data: &[u8],
    ) -> Self {
        self.sections[0].push(record(name, rtype, ttl, data));
        self
    }

    /// Appends a record to the authority section.
    pub fn authority(
        mut self,
        name: &str,
        rtype: RecordType,
        ttl: u32,
        data: &[u8],
    ) -> Self {
        self.sections[1].push(record(name, rtype, ttl, data));
        self
    }

    /// Appends a record to the additional section.
    pub fn additional(
        mut self,
        name: &str,
        rtype: RecordType,
        ttl: u32,
        data: &[u8],
    ) -> Self {
        self.sections[2].push(record(name, rtype, ttl, data));
        self
    }

    /// Returns the assembled message, with a zero transaction id.
    pub fn build(self) -> Vec<u8> {
        let mut wire = vec![0, 0];
        wire.extend_from_slice(&self.flags);
        wire.extend_from_slice(&1u16.to_be_bytes());
        for section in &self.sections {
            let count = section.len() as u16;
            wire.extend_from_slice(&count.to_be_bytes());
        }
        compose_name(&mut wire, &self.question.0).unwrap();
        wire.extend_from_slice(&self.question.1.to_int().to_be_bytes());
        wire.extend_from_slice(&CLASS_IN.to_be_bytes());
        for section in self.sections {
            for record in section {
                wire.extend_from_slice(&record);
            }
        }
        wire
    }
}

fn record(name: &str, rtype: RecordType, ttl: u32, data: &[u8]) -> Vec<u8> {
    let mut wire = Vec::new();
    compose_name(&mut wire, name).unwrap();
    wire.extend_from_slice(&rtype.to_int().to_be_bytes());
    wire.extend_from_slice(&CLASS_IN.to_be_bytes());
    wire.extend_from_slice(&ttl.to_be_bytes());
    wire.extend_from_slice(&(data.len() as u16).to_be_bytes());
    wire.extend_from_slice(data);
    wire
}

//------------ MockTransport -------------------------------------------------

/// One scripted reaction to a query.
pub enum Action {
    /// Answer with this message, its id patched to match the query.
    Respond(Vec<u8>),
    /// Let the attempt time out.
    Timeout,
}

/// A transport answering from a script instead of the network.
///
/// Reactions are keyed by question name and server address and consumed
/// in order, so repeat attempts see successive entries. A query nothing
/// was scripted for fails the test.
#[derive(Default)]
pub struct MockTransport {
    script: HashMap<(String, SocketAddr), VecDeque<Action>>,
    log: Vec<(String, u16, SocketAddr)>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the next reaction to a question at a server.
    pub fn expect(
        &mut self,
        qname: &str,
        server: SocketAddr,
        action: Action,
    ) {
        self.script
            .entry((qname.into(), server))
            .or_default()
            .push_back(action);
    }

    /// Returns the question name, id, and server of every query sent.
    pub fn log(&self) -> &[(String, u16, SocketAddr)] {
        &self.log
    }
}

impl Transport for MockTransport {
    fn exchange<'a>(
        &'a mut self,
        wire: &'a [u8],
        id: u16,
        server: SocketAddr,
    ) -> Pin<
        Box<
            dyn Future<Output = Result<Response, TransportError>>
                + Send
                + 'a,
        >,
    > {
        Box::pin(async move {
            let query = Response::from_wire(wire).unwrap();
            assert_eq!(query.id(), id, "query id differs from wire id");
            let qname = query.question_name().to_owned();
            self.log.push((qname.clone(), id, server));
            let action = self
                .script
                .get_mut(&(qname.clone(), server))
                .and_then(|queue| queue.pop_front());
            match action {
                Some(Action::Respond(mut answer)) => {
                    answer[..2].copy_from_slice(&id.to_be_bytes());
                    Ok(Response::from_wire(&answer).unwrap())
                }
                Some(Action::Timeout) => Err(TransportError::Timeout),
                None => {
                    panic!("unscripted query for '{qname}' at {server}")
                }
            }
        })
    }
}

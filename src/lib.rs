//! An iterative DNS resolver library.
//!
//! This crate provides the building blocks of a small diagnostic resolver
//! that walks the DNS delegation tree by itself instead of handing the
//! question to an upstream recursive server: it starts at a root
//! nameserver, follows referrals downwards, chases CNAME chains, and
//! remembers every record it has seen along the way. All queries travel
//! over plain UDP from a single socket.
//!
//! # Modules
//!
//! * [base] contains the DNS data model used throughout: wire-format
//!   parsing and composing, header flags, domain names including
//!   compression, and the record types the resolver works with,
//! * [cache] provides the in-memory record cache,
//! * [net] provides the UDP transport and the [`Transport`][net::Transport]
//!   trait it implements, and
//! * [resolver] contains the resolution engine driving it all.
//!
//! The accompanying binary wraps [`resolver::Resolver`] in an interactive
//! command interpreter.

pub mod base;
pub mod cache;
pub mod net;
pub mod resolver;

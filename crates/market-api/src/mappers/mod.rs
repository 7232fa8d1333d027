//! Wire model to entity mappers
//!
//! `From<Model> for Entity` conversions. Decoding is lenient where the
//! server may be ahead of the client (unknown emoji are dropped), and the
//! reaction invariants are restored if the server breaks them.

mod notification;
mod post;

//! Daraja STK push: token exchange, request signing and dispatch.

pub mod canonical;
mod stk;
mod token;

pub use stk::initiate_push;

//! Session domain
//!
//! A session is one collaboration run. These types describe its lifecycle
//! ([`entities`]), the agent tasks dispatched inside its phases ([`task`]),
//! the progress events it emits ([`event`]) and the result handed back to
//! the caller ([`result`]).

pub mod entities;
pub mod event;
pub mod result;
pub mod task;

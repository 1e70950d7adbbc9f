//! GenX Overseas trade desk: the conversational trade assistant, the quote
//! intake wizard and the `/api/trade` advice proxy.

pub mod advice;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod quote;
pub mod server;
pub mod testing;

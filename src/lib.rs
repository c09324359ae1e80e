//! Client-side engine of a SQL database browser: a metadata cache with
//! fetch-if-needed loading, the connection lifecycle, query tabs and the
//! command router that menus and shortcuts dispatch through.
//!
//! Drivers plug in through [`connection::DataSource`]; every piece of mutable
//! state lives in one [`state::AppState`] shared through [`state::StateHandle`].

pub mod app;
pub mod connection;
pub mod error;
pub mod helpers;
pub mod models;
pub mod state;

#[cfg(test)]
mod testing;

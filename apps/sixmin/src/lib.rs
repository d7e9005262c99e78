//! # sixmin
//!
//! Score-based spaced-repetition advancement for a review database.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    apps/sixmin (THE BINARY)                 │
//! │                                                             │
//! │  ┌──────────┐   ┌──────────┐   ┌─────────────────────────┐  │
//! │  │   CLI    │──►│  Driver  │──►│  RecordStore            │  │
//! │  │  (clap)  │   │          │   │  Notion (reqwest) / file│  │
//! │  └──────────┘   └────┬─────┘   └─────────────────────────┘  │
//! │                      ▼                                      │
//! │              ┌───────────────┐                              │
//! │              │  sixmin-core  │                              │
//! │              │  (THE LOGIC)  │                              │
//! │              └───────────────┘                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod config;
pub mod driver;
pub mod error;
pub mod store;

pub use error::SixminError;

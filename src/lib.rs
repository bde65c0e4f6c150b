//! # Campus Desk
//!
//! An office administration desk whose only data store is a set of JSON
//! documents kept in a Git repository and accessed through the GitHub
//! contents API, with an on-disk cache as fallback.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌────────────┐   ┌─────────────────┐
//! │   Pages    │──▶│ DataStore  │──▶│  RemoteStore    │
//! │ dashboard  │   │ retry +    │   │  GitHub / mem   │
//! │ chat, ...  │   │ validation │   └─────────────────┘
//! └─────┬──────┘   └─────┬──────┘   ┌─────────────────┐
//!       │                └─────────▶│  LocalCache     │
//!       ▼                           │  data/*.json    │
//! ┌────────────┐                    └─────────────────┘
//! │   search   │
//! └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! export GITHUB_TOKEN=... REPO_NAME=office/desk-data
//! desk dashboard
//! desk reports search 교학팀
//! desk schedule free --staff 김철수 --staff 이영희
//! desk admin upload ./staff_profiles.json
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and environment overrides |
//! | [`models`] | Document names and table schemas |
//! | [`cache`] | Local JSON cache |
//! | [`remote`] | Remote store trait, GitHub and in-memory backends |
//! | [`retry`] | Bounded retry policy |
//! | [`store`] | Data access layer: remote-then-local reads, validated writes |
//! | [`search`] | Weighted keyword search |
//! | [`pages`] | Page views used by the `desk` CLI |

pub mod cache;
pub mod config;
pub mod models;
pub mod pages;
pub mod remote;
pub mod retry;
pub mod search;
pub mod store;

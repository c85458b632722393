// SPDX-License-Identifier: MIT

pub mod config;
pub mod error;
pub mod metric;
pub mod policy;
pub mod server;

// SPDX-License-Identifier: MIT

pub mod condition;
pub mod dot;
pub mod graph;
pub mod inferrer;
pub mod state;

pub use inferrer::{Inferrer, PolicyExecutor, PolicyParser};

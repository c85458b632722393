// SPDX-License-Identifier: MIT

pub mod decider;

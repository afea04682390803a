// SPDX-License-Identifier: MPL-2.0

//! Display module organization

pub mod fade;
pub mod glow;
pub mod panel;
pub mod window;

pub use window::run;

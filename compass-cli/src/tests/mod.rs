//! Shared test harness modules for the Compass CLI.

use super::*;

mod helpers;
mod unit;

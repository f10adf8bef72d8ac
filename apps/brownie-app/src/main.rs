//! # Brownie Book Entry Point
//!
//! ```text
//! brownie [--config PATH] [--db PATH] [--owner UUID] [--json] <COMMAND>
//!
//!   purchase add|edit|delete|list
//!   sale add|edit|delete|list
//!   customers [--search TEXT]
//!   customer <NAME>
//!   dashboard
//!   report [--month YYYY-MM]
//!   legacy status|migrate|detach
//! ```
//!
//! The setup lives in lib.rs so it can be tested.

use std::process::ExitCode;

fn main() -> ExitCode {
    brownie_app_lib::run()
}

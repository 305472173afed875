//! Input and output adapters used by the command line harness.

pub mod csv;

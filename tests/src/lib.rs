//! Workspace-level tests of the scan workflow, wired with in-memory sweepers
//! and agents instead of raw sockets.

#[cfg(test)]
mod support;

mod scan;

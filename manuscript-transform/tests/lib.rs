// This file is required to make `cargo test` discover tests in subdirectories.

#[cfg(test)]
mod common;

#[cfg(test)]
mod jats;

#[cfg(test)]
mod migration;

#[cfg(test)]
mod schema;

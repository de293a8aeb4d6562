// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Debug categories from the environment.

use trellis_core::debug::DebugFlags;

/// The environment variable holding the enabled debug categories.
pub const DEBUG_ENV_VAR: &str = "TRELLIS_DEBUG";

/// Reads [`DEBUG_ENV_VAR`] and parses it with [`DebugFlags::parse`].
///
/// Returns [`DebugFlags::NONE`] when the variable is unset or not valid
/// Unicode.
#[must_use]
pub fn debug_flags_from_env() -> DebugFlags {
    std::env::var(DEBUG_ENV_VAR)
        .map(|value| DebugFlags::parse(&value))
        .unwrap_or(DebugFlags::NONE)
}

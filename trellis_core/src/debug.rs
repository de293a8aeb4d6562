// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Diagnostic categories.
//!
//! [`DebugFlags`] selects which categories of trace notes a
//! [`NodeStore`](crate::node::NodeStore) forwards to its sink. Flags are
//! parsed from a separated list of keys, typically taken from an environment
//! variable by the embedding application:
//!
//! ```
//! use trellis_core::debug::DebugFlags;
//!
//! let flags = DebugFlags::parse("geometry, layout");
//! assert!(flags.geometry && flags.layout && !flags.render);
//! assert_eq!(DebugFlags::parse("all"), DebugFlags::ALL);
//! ```

/// Which diagnostic categories are enabled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DebugFlags {
    /// Modelview updates and geometry overlays.
    pub geometry: bool,
    /// Redraw requests and the renderer walk.
    pub render: bool,
    /// Relayout requests and layout passes.
    pub layout: bool,
}

impl DebugFlags {
    /// No categories.
    pub const NONE: Self = Self {
        geometry: false,
        render: false,
        layout: false,
    };

    /// Every category.
    pub const ALL: Self = Self {
        geometry: true,
        render: true,
        layout: true,
    };

    /// Recognized keys, in display order.
    pub const KEYS: [&'static str; 3] = ["geometry", "render", "layout"];

    /// Parses a list of keys separated by commas, colons, semicolons or
    /// whitespace. Matching is case-insensitive; `all` enables everything and
    /// unknown keys are ignored.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let mut flags = Self::NONE;
        for key in s
            .split(|c: char| c == ',' || c == ':' || c == ';' || c.is_whitespace())
            .filter(|k| !k.is_empty())
        {
            if key.eq_ignore_ascii_case("all") {
                return Self::ALL;
            } else if key.eq_ignore_ascii_case("geometry") {
                flags.geometry = true;
            } else if key.eq_ignore_ascii_case("render") {
                flags.render = true;
            } else if key.eq_ignore_ascii_case("layout") {
                flags.layout = true;
            }
        }
        flags
    }

    /// Returns whether no category is enabled.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        !self.geometry && !self.render && !self.layout
    }
}

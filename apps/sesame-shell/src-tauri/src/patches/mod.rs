//! Page patches for the primary surface
//!
//! The hosted page is not ours, so its look is adjusted from the outside: an
//! initialization script hides scrollbars and navigation chrome and swallows
//! browser shortcuts that would expose dev tools or leave the demo.

use serde::Serialize;
use serde_json::json;

use crate::config::PatchConfig;
use crate::error::Result;

const PATCH_RUNTIME: &str = include_str!("patches.js");

/// A keyboard shortcut swallowed by the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Shortcut {
    /// `KeyboardEvent.key`, lower-cased for single characters
    pub key: &'static str,
    /// Ctrl on Windows/Linux, Cmd on macOS
    pub ctrl: bool,
    pub shift: bool,
}

const fn ctrl(key: &'static str) -> Shortcut {
    Shortcut {
        key,
        ctrl: true,
        shift: false,
    }
}

const fn ctrl_shift(key: &'static str) -> Shortcut {
    Shortcut {
        key,
        ctrl: true,
        shift: true,
    }
}

/// Dev tools, element picker, view source, save and print
pub const BLOCKED_SHORTCUTS: &[Shortcut] = &[
    ctrl_shift("i"),
    ctrl_shift("j"),
    ctrl_shift("c"),
    ctrl_shift("u"),
    ctrl("u"),
    ctrl("s"),
    ctrl("p"),
    Shortcut {
        key: "F12",
        ctrl: false,
        shift: false,
    },
];

/// Render the initialization script for the given patch settings
pub fn init_script(patches: &PatchConfig) -> Result<String> {
    let shortcuts: &[Shortcut] = if patches.block_shortcuts {
        BLOCKED_SHORTCUTS
    } else {
        &[]
    };

    let options = json!({
        "hideScrollbars": patches.hide_scrollbars,
        "blockShortcuts": patches.block_shortcuts,
        "disableContextMenu": patches.disable_context_menu,
        "disableTextSelection": patches.disable_text_selection,
        "hiddenSelectors": patches.hidden_selectors,
        "inertLinks": patches.inert_links,
        "shortcuts": shortcuts,
    });

    Ok(format!(
        "(function (options) {{\n'use strict';\n{}\n}})({});\n",
        PATCH_RUNTIME,
        serde_json::to_string(&options)?
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options_of(script: &str) -> serde_json::Value {
        let start = script.rfind("})(").unwrap() + 3;
        let end = script.rfind(");").unwrap();
        serde_json::from_str(&script[start..end]).unwrap()
    }

    #[test]
    fn test_script_wraps_runtime_in_iife() {
        let script = init_script(&PatchConfig::default()).unwrap();
        assert!(script.starts_with("(function (options) {"));
        assert!(script.contains(PATCH_RUNTIME));
    }

    #[test]
    fn test_default_options_block_devtools_shortcuts() {
        let script = init_script(&PatchConfig::default()).unwrap();
        let options = options_of(&script);

        assert_eq!(options["hideScrollbars"], true);
        let shortcuts = options["shortcuts"].as_array().unwrap();
        assert_eq!(shortcuts.len(), BLOCKED_SHORTCUTS.len());
        assert!(shortcuts
            .iter()
            .any(|s| s["key"] == "i" && s["ctrl"] == true && s["shift"] == true));
        assert!(shortcuts.iter().any(|s| s["key"] == "F12"));
    }

    #[test]
    fn test_disabled_shortcut_blocking_sends_no_shortcuts() {
        let patches = PatchConfig {
            block_shortcuts: false,
            ..PatchConfig::default()
        };
        let options = options_of(&init_script(&patches).unwrap());
        assert_eq!(options["blockShortcuts"], false);
        assert!(options["shortcuts"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_selectors_are_json_escaped() {
        let patches = PatchConfig {
            hidden_selectors: vec![r#"a[title="it's \"quoted\""]"#.to_string()],
            ..PatchConfig::default()
        };
        let options = options_of(&init_script(&patches).unwrap());
        assert_eq!(
            options["hiddenSelectors"][0],
            r#"a[title="it's \"quoted\""]"#
        );
    }
}

//! Handler catalog.
//!
//! A read-only listing of every registered handler, built during
//! registration. The runtime logs it at startup; bots can also serialize it
//! to document their commands.

use serde::Serialize;
use yesbot_core::EventKind;

use crate::options::HandlerOptions;

/// One registered handler as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerSummary {
    pub name: String,
    pub event: EventKind,
    /// Key paths in display form, e.g. `["bot-commands", "!voice", "up"]`.
    pub key_paths: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_roles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl HandlerSummary {
    pub fn from_options(options: &HandlerOptions) -> Self {
        Self {
            name: options.name.clone(),
            event: options.event,
            key_paths: options.key_paths().iter().map(ToString::to_string).collect(),
            allowed_roles: options.allowed_roles.clone(),
            description: options.description.clone(),
        }
    }
}

/// Renders a catalog as pretty-printed JSON.
pub fn to_json(catalog: &[HandlerSummary]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_from_options() {
        let opts = HandlerOptions::command("!voice")
            .sub_trigger("limit")
            .channel("bot-commands")
            .allowed_role("Yes Theory")
            .name("voice-limit")
            .description("Set the user limit of your voice channel");

        let summary = HandlerSummary::from_options(&opts);
        assert_eq!(summary.key_paths, vec![r#"["bot-commands", "!voice", "limit"]"#]);

        let json = to_json(&[summary]).unwrap();
        assert!(json.contains(r#""event": "message""#));
        assert!(json.contains("voice-limit"));
    }

    #[test]
    fn test_empty_fields_are_skipped() {
        let summary = HandlerSummary::from_options(&HandlerOptions::reaction_add("👍"));
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("allowed_roles").is_none());
        assert!(json.get("description").is_none());
        assert_eq!(json["key_paths"][0], r#"[*, "👍"]"#);
    }
}

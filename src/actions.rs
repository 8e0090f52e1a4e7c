use serde::{Deserialize, Serialize};

/// A single result row produced by a plugin query.
///
/// `action` is a small string protocol resolved by [`parse_action_kind`]:
/// `clipboard:<text>`, `view:<view>`, `tool:<id>`, `query:<text>` or a bare URL.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Action {
    pub label: String,
    pub desc: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,
}

impl Action {
    pub fn new(
        label: impl Into<String>,
        desc: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            desc: desc.into(),
            action: action.into(),
            args: None,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ActionKind<'a> {
    Clipboard(&'a str),
    View(&'a str),
    Tool(&'a str),
    Query(&'a str),
    Url(&'a str),
}

pub fn parse_action_kind(action: &Action) -> ActionKind<'_> {
    let s = action.action.as_str();
    if let Some(text) = s.strip_prefix("clipboard:") {
        return ActionKind::Clipboard(text);
    }
    if let Some(view) = s.strip_prefix("view:") {
        return ActionKind::View(view);
    }
    if let Some(id) = s.strip_prefix("tool:") {
        return ActionKind::Tool(id);
    }
    if let Some(q) = s.strip_prefix("query:") {
        return ActionKind::Query(q);
    }
    ActionKind::Url(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_prefixes() {
        let a = Action::new("x", "", "clipboard:FF");
        assert_eq!(parse_action_kind(&a), ActionKind::Clipboard("FF"));
        let a = Action::new("x", "", "tool:17");
        assert_eq!(parse_action_kind(&a), ActionKind::Tool("17"));
        let a = Action::new("x", "", "query:= ");
        assert_eq!(parse_action_kind(&a), ActionKind::Query("= "));
    }

    #[test]
    fn falls_back_to_url() {
        let a = Action::new("x", "", "https://github.com");
        assert_eq!(parse_action_kind(&a), ActionKind::Url("https://github.com"));
    }
}

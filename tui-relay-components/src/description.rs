//! Plain data descriptions of components, as produced by a UI description
//! source
//!
//! Every optional field may be omitted. Descriptions carry action keys, not
//! handles; bind them with [`Dispatcher::bind`](tui_relay_core::Dispatcher::bind)
//! when building the screen.

use serde::{Deserialize, Serialize};
use tui_relay_core::ActionKey;

use crate::color::{ColorName, Icon};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ButtonDescription {
    pub label: String,
    pub color: ColorName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionKey<()>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CrumbDescription {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionKey<()>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeaderDescription {
    pub title: String,
    pub color: ColorName,
    pub crumbs: Vec<CrumbDescription>,
    pub items: Vec<ButtonDescription>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LabelDescription {
    pub text: String,
    pub placeholder: String,
    pub color: ColorName,
    /// Receives the edited text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionKey<String>>,
}

/// A whole page: header over a centered body of labels and buttons.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageDescription {
    pub header: HeaderDescription,
    pub labels: Vec<LabelDescription>,
    pub buttons: Vec<ButtonDescription>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_default() {
        let button: ButtonDescription = serde_json::from_value(json!({ "label": "Go" })).unwrap();
        assert_eq!(button.color, ColorName::Gray);
        assert!(button.icon.is_none());
        assert!(button.action.is_none());

        let header: HeaderDescription = serde_json::from_value(json!({})).unwrap();
        assert_eq!(header, HeaderDescription::default());
    }

    #[test]
    fn keys_with_the_same_id_compare_equal() {
        let page: PageDescription = serde_json::from_value(json!({
            "header": {
                "title": "Reports",
                "items": [{ "label": "Refresh", "icon": "refresh", "action": { "id": "page/refresh" } }]
            },
            "buttons": [{ "label": "Also refresh", "color": "teal", "action": { "id": "page/refresh", "debugSymbol": "Refresh" } }],
            "labels": [{ "text": "Q3", "action": { "id": "page/rename" } }]
        }))
        .unwrap();

        assert_eq!(page.header.items[0].icon, Some(Icon::Refresh));
        assert_eq!(page.header.items[0].action, page.buttons[0].action);
        assert_eq!(
            page.labels[0].action.as_ref().map(|k| k.id().as_str()),
            Some("page/rename")
        );
    }
}

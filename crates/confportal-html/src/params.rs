//! Configuration parameter model.
//!
//! Parameters are grouped into named blocks (system parameters owned by the
//! portal itself, custom parameters owned by the embedding application).
//! Each parameter renders as one form row and can be updated from the
//! submitted form.

use serde::{Deserialize, Serialize};

/// Input type of a parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ParameterKind {
    /// Free-form text input.
    Text,
    /// Password input. Stored values are never echoed back into the form,
    /// and an empty submission keeps the previous value.
    Password,
    /// Numeric input with optional bounds.
    Number {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
    /// Boolean checkbox; the value is "true" or "false".
    Checkbox,
    /// Fixed list of choices.
    Select { options: Vec<String> },
}

/// One configurable value with its form metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    /// Form field name; must be unique across all groups.
    pub id: String,
    /// Human-readable label.
    pub label: String,
    pub kind: ParameterKind,
    /// Current value, always kept as a string.
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl Parameter {
    pub fn new(id: &str, label: &str, kind: ParameterKind) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            kind,
            value: String::new(),
            placeholder: None,
        }
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    /// Render this parameter as one form row.
    pub fn render_row(&self) -> String {
        let id = escape_html(&self.id);
        let label = escape_html(&self.label);
        let placeholder = match &self.placeholder {
            Some(p) => format!(" placeholder=\"{}\"", escape_html(p)),
            None => String::new(),
        };
        let input = match &self.kind {
            ParameterKind::Text => format!(
                "<input type=\"text\" id=\"{id}\" name=\"{id}\" value=\"{}\"{placeholder}/>",
                escape_html(&self.value)
            ),
            ParameterKind::Password => format!(
                "<input type=\"password\" id=\"{id}\" name=\"{id}\" value=\"\"{placeholder}/>\
<a onclick=\"pwToggle('{id}')\">show</a>"
            ),
            ParameterKind::Number { min, max } => {
                let mut attrs = String::new();
                if let Some(min) = min {
                    attrs.push_str(&format!(" min=\"{min}\""));
                }
                if let Some(max) = max {
                    attrs.push_str(&format!(" max=\"{max}\""));
                }
                format!(
                    "<input type=\"number\" id=\"{id}\" name=\"{id}\" value=\"{}\"{attrs}{placeholder}/>",
                    escape_html(&self.value)
                )
            }
            ParameterKind::Checkbox => {
                let checked = if self.value == "true" { " checked" } else { "" };
                format!("<input type=\"checkbox\" id=\"{id}\" name=\"{id}\"{checked}/>")
            }
            ParameterKind::Select { options } => {
                let mut html = format!("<select id=\"{id}\" name=\"{id}\">");
                for option in options {
                    let selected = if *option == self.value { " selected" } else { "" };
                    html.push_str(&format!(
                        "<option value=\"{0}\"{selected}>{0}</option>",
                        escape_html(option)
                    ));
                }
                html.push_str("</select>");
                html
            }
        };
        format!("<div class=\"field\"><label for=\"{id}\">{label}</label>{input}</div>")
    }

    /// Update this parameter from a submitted form value.
    fn apply(&mut self, submitted: &str) {
        match self.kind {
            // An empty password submission means "keep the stored secret".
            ParameterKind::Password if submitted.is_empty() => {}
            _ => self.value = submitted.to_string(),
        }
    }
}

/// A named block of parameters rendered as one fieldset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterGroup {
    pub id: String,
    pub label: String,
    pub params: Vec<Parameter>,
}

impl ParameterGroup {
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, param: Parameter) -> Self {
        self.params.push(param);
        self
    }

    /// Opening fragment of the group's fieldset.
    pub fn open_html(&self) -> String {
        format!(
            "<fieldset id=\"{}\"><legend>{}</legend>",
            escape_html(&self.id),
            escape_html(&self.label)
        )
    }

    /// Closing fragment of the group's fieldset.
    pub fn close_html(&self) -> String {
        "</fieldset>".to_string()
    }
}

/// Apply submitted `(name, value)` pairs to the given groups.
///
/// Checkboxes are special-cased: browsers omit unchecked boxes from the
/// submission entirely, so every checkbox is first cleared and then set from
/// the pairs that did arrive.
pub fn apply_form(groups: &mut [ParameterGroup], pairs: &[(String, String)]) {
    for group in groups.iter_mut() {
        for param in group.params.iter_mut() {
            if param.kind == ParameterKind::Checkbox {
                let present = pairs.iter().any(|(name, _)| *name == param.id);
                param.value = if present { "true" } else { "false" }.to_string();
            } else if let Some((_, value)) = pairs.iter().find(|(name, _)| *name == param.id) {
                param.apply(value);
            }
        }
    }
}

/// Minimal HTML escaping for text nodes and attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_text_row_escapes_value() {
        let param = Parameter::new("ssid", "Network name", ParameterKind::Text)
            .with_value("\"<mine>&'");
        let row = param.render_row();
        assert!(row.contains("value=\"&quot;&lt;mine&gt;&amp;&#39;\""));
        assert!(!row.contains("<mine>"));
    }

    #[test]
    fn test_password_value_is_never_echoed() {
        let param =
            Parameter::new("mqtt_pass", "MQTT password", ParameterKind::Password).with_value("hunter2");
        let row = param.render_row();
        assert!(row.contains("type=\"password\""));
        assert!(row.contains("value=\"\""));
        assert!(!row.contains("hunter2"));
    }

    #[test]
    fn test_number_row_renders_bounds() {
        let param = Parameter::new(
            "port",
            "Port",
            ParameterKind::Number {
                min: Some(1),
                max: Some(65535),
            },
        )
        .with_value("1883");
        let row = param.render_row();
        assert!(row.contains("type=\"number\""));
        assert!(row.contains("min=\"1\""));
        assert!(row.contains("max=\"65535\""));
        assert!(row.contains("value=\"1883\""));
    }

    #[test]
    fn test_checkbox_row_checked_state() {
        let on = Parameter::new("tls", "Use TLS", ParameterKind::Checkbox).with_value("true");
        assert!(on.render_row().contains(" checked"));
        let off = Parameter::new("tls", "Use TLS", ParameterKind::Checkbox).with_value("false");
        assert!(!off.render_row().contains(" checked"));
    }

    #[test]
    fn test_select_row_marks_current_choice() {
        let param = Parameter::new(
            "mode",
            "Mode",
            ParameterKind::Select {
                options: vec!["client".to_string(), "gateway".to_string()],
            },
        )
        .with_value("gateway");
        let row = param.render_row();
        assert!(row.contains("<option value=\"client\">client</option>"));
        assert!(row.contains("<option value=\"gateway\" selected>gateway</option>"));
    }

    #[test]
    fn test_apply_form_updates_values() {
        let mut groups = vec![ParameterGroup::new("net", "Network")
            .with_param(Parameter::new("host", "Host", ParameterKind::Text).with_value("old"))
            .with_param(
                Parameter::new("secret", "Secret", ParameterKind::Password).with_value("keepme"),
            )
            .with_param(Parameter::new("tls", "TLS", ParameterKind::Checkbox).with_value("true"))];

        let pairs = vec![
            ("host".to_string(), "broker.local".to_string()),
            ("secret".to_string(), "".to_string()),
            // no "tls" pair: the box was unchecked
        ];
        apply_form(&mut groups, &pairs);

        assert_eq!(groups[0].params[0].value, "broker.local");
        // Empty password submission keeps the stored secret.
        assert_eq!(groups[0].params[1].value, "keepme");
        // Absent checkbox means false.
        assert_eq!(groups[0].params[2].value, "false");
    }

    #[test]
    fn test_group_round_trips_through_json() {
        let group = ParameterGroup::new("mqtt", "MQTT")
            .with_param(Parameter::new("host", "Host", ParameterKind::Text).with_value("broker"))
            .with_param(Parameter::new(
                "port",
                "Port",
                ParameterKind::Number {
                    min: Some(1),
                    max: None,
                },
            ));

        let json = serde_json::to_string(&group).unwrap();
        let back: ParameterGroup = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, "mqtt");
        assert_eq!(back.params[0].value, "broker");
        assert_eq!(
            back.params[1].kind,
            ParameterKind::Number {
                min: Some(1),
                max: None
            }
        );
    }

    #[test]
    fn test_apply_form_ignores_unknown_fields() {
        let mut groups = vec![ParameterGroup::new("net", "Network")
            .with_param(Parameter::new("host", "Host", ParameterKind::Text).with_value("dev"))];
        let pairs = vec![("portalSave".to_string(), "1".to_string())];
        apply_form(&mut groups, &pairs);
        assert_eq!(groups[0].params[0].value, "dev");
    }
}

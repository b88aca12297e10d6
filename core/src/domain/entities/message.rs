//! Outbound message arguments.

use serde::{Deserialize, Serialize};

/// One named template argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateArg {
    pub value: String,
    pub name: String,
}

impl TemplateArg {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            name: name.into(),
        }
    }
}

/// Substitute `{name}` placeholders in `body`
///
/// Placeholders without a matching argument are left untouched.
pub fn render_template(body: &str, args: &[TemplateArg]) -> String {
    args.iter().fold(body.to_string(), |acc, arg| {
        acc.replace(&format!("{{{}}}", arg.name), &arg.value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_template() {
        let args = vec![TemplateArg::new("code", "123456"), TemplateArg::new("minutes", "10")];
        assert_eq!(
            render_template("Code {code}, valid {minutes} min", &args),
            "Code 123456, valid 10 min"
        );
    }

    #[test]
    fn test_render_leaves_unknown_placeholders() {
        let args = vec![TemplateArg::new("code", "1")];
        assert_eq!(render_template("{code} {other}", &args), "1 {other}");
    }
}

//! Template rendering.

use source_config::{Segment, Template};
use std::collections::HashMap;

/// Error type for rendering a line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// The template references a field with no generated value
    #[error("Format references unknown field '{0}'")]
    MissingField(String),
}

/// Substitute generated values into the template.
pub fn render(template: &Template, values: &HashMap<String, String>) -> Result<String, RenderError> {
    let mut line = String::with_capacity(template.as_str().len());
    for segment in template.segments() {
        match segment {
            Segment::Literal(text) => line.push_str(text),
            Segment::Field(name) => {
                let value = values
                    .get(name)
                    .ok_or_else(|| RenderError::MissingField(name.clone()))?;
                line.push_str(value);
            }
        }
    }
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_substitutes_fields() {
        let template = Template::parse("{ip} - {user} [{ts}] {{raw}}").unwrap();
        let line = render(
            &template,
            &values(&[("ip", "10.0.0.1"), ("user", "alice"), ("ts", "today")]),
        )
        .unwrap();

        assert_eq!(line, "10.0.0.1 - alice [today] {raw}");
    }

    #[test]
    fn test_render_repeated_placeholder() {
        let template = Template::parse("{a}/{a}").unwrap();
        assert_eq!(render(&template, &values(&[("a", "x")])).unwrap(), "x/x");
    }

    #[test]
    fn test_render_missing_field() {
        let template = Template::parse("{present} {absent}").unwrap();
        let result = render(&template, &values(&[("present", "yes")]));

        assert_eq!(result, Err(RenderError::MissingField("absent".to_string())));
    }

    #[test]
    fn test_render_ignores_unused_values() {
        let template = Template::parse("static").unwrap();
        assert_eq!(
            render(&template, &values(&[("unused", "x")])).unwrap(),
            "static"
        );
    }
}

use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use regex::{Captures, Regex};

/// Implementations may block (reading partials from disk for example).
/// Sharing one renderer between threads is only sound if the renderer
/// itself is `Sync`.
pub trait Renderer {
    fn render_to_string(&self, content: &[u8]) -> Result<String>;
    fn render_to_buffer(&self, content: &[u8]) -> Result<Vec<u8>>;
}

impl<R: Renderer + ?Sized> Renderer for &R {
    fn render_to_string(&self, content: &[u8]) -> Result<String> {
        (**self).render_to_string(content)
    }

    fn render_to_buffer(&self, content: &[u8]) -> Result<Vec<u8>> {
        (**self).render_to_buffer(content)
    }
}

/// Understands `{{ .Env.NAME }}`, `{{ env "NAME" }}` and
/// `{{ requiredEnv "NAME" }}`. Anything else between braces is rejected.
pub struct EnvRenderer {
    vars: HashMap<String, String>,
    expr_re: Regex,
}

impl EnvRenderer {
    pub fn new(vars: HashMap<String, String>) -> Result<Self> {
        let expr_re = Regex::new(
            r#"\{\{-?\s*(?:\.Env\.([A-Za-z_][A-Za-z0-9_]*)|(env|requiredEnv)\s+"([^"]*)")\s*-?\}\}"#,
        )?;

        Ok(Self { vars, expr_re })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(std::env::vars().collect())
    }

    fn render(&self, content: &[u8]) -> Result<String> {
        let content = std::str::from_utf8(content).context("template is not valid UTF-8")?;

        let unknown = self.expr_re.replace_all(content, "");
        if let Some(start) = unknown.find("{{") {
            let end = unknown[start..]
                .find("}}")
                .map(|i| start + i + 2)
                .unwrap_or(unknown.len());
            bail!("unsupported template expression `{}`", &unknown[start..end]);
        }

        let mut missing = None;
        let rendered = self.expr_re.replace_all(content, |caps: &Captures| {
            if let Some(name) = caps.get(1) {
                return self.vars.get(name.as_str()).cloned().unwrap_or_default();
            }

            let name = &caps[3];
            match (&caps[2], self.vars.get(name)) {
                ("requiredEnv", None) => {
                    missing.get_or_insert_with(|| name.to_string());
                    String::new()
                }
                ("requiredEnv", Some(v)) if v.is_empty() => {
                    missing.get_or_insert_with(|| name.to_string());
                    String::new()
                }
                (_, value) => value.cloned().unwrap_or_default(),
            }
        });

        if let Some(name) = missing {
            bail!("required env var `{}` is not set", name);
        }

        Ok(rendered.into_owned())
    }
}

impl Renderer for EnvRenderer {
    fn render_to_string(&self, content: &[u8]) -> Result<String> {
        self.render(content)
    }

    fn render_to_buffer(&self, content: &[u8]) -> Result<Vec<u8>> {
        self.render(content).map(String::into_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> EnvRenderer {
        EnvRenderer::new(HashMap::from([
            ("ENV".to_string(), "prod".to_string()),
            ("EMPTY".to_string(), String::new()),
            ("BRACES".to_string(), "a{{b}}c".to_string()),
        ]))
        .unwrap()
    }

    #[test]
    fn substitutes_env_references() {
        let r = renderer();

        assert_eq!(r.render_to_string(b"app-{{ .Env.ENV }}").unwrap(), "app-prod");
        assert_eq!(r.render_to_string(b"{{- env \"ENV\" -}}").unwrap(), "prod");
        assert_eq!(r.render_to_string(b"x{{ env \"UNSET\" }}y").unwrap(), "xy");
        assert_eq!(
            r.render_to_buffer(b"{{ requiredEnv \"ENV\" }}").unwrap(),
            b"prod".to_vec()
        );
    }

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(renderer().render_to_string(b"replicas: 3").unwrap(), "replicas: 3");
    }

    #[test]
    fn required_env_must_be_set() {
        let r = renderer();

        let err = r.render_to_string(b"{{ requiredEnv \"UNSET\" }}").unwrap_err();
        assert_eq!(err.to_string(), "required env var `UNSET` is not set");
        assert!(r.render_to_string(b"{{ requiredEnv \"EMPTY\" }}").is_err());
    }

    #[test]
    fn rejects_unknown_expressions() {
        let err = renderer().render_to_string(b"a {{ .Values.x }} b").unwrap_err();
        assert_eq!(err.to_string(), "unsupported template expression `{{ .Values.x }}`");
    }

    #[test]
    fn braces_in_values_are_not_expressions() {
        let r = renderer();

        assert_eq!(r.render_to_string(b"{{ .Env.BRACES }}").unwrap(), "a{{b}}c");
        assert_eq!(r.render_to_string(b"x-{{ env \"BRACES\" }}").unwrap(), "x-a{{b}}c");
    }

    #[test]
    fn rejects_invalid_utf8() {
        assert!(renderer().render_to_buffer(&[0xff, 0xfe]).is_err());
    }
}

//! Executes the template expressions embedded in a [`ReleaseSpec`].
//!
//! Fields are resolved in a fixed order: scalars, hook templates, labels,
//! value overlays, secrets, set-value overlays and finally `needs`. The
//! first failure aborts the pass and nothing partially resolved is
//! returned.

use serde_yaml::Mapping;

use crate::error::{FieldPath, TemplateError};
use crate::overrides::{OverlayValue, SetValue};
use crate::release::ReleaseSpec;
use crate::render::Renderer;

type ScalarSlot = fn(&mut ReleaseSpec) -> &mut String;
type HookSlot = fn(&mut ReleaseSpec) -> &mut Option<String>;

impl ReleaseSpec {
    /// Returns a copy of this release with every templated field rendered.
    ///
    /// `self` is never modified. Template-sourced overlays end up in front
    /// of the existing `values` and `set` entries.
    pub fn execute_template_expressions<R: Renderer>(
        &self,
        renderer: &R,
    ) -> Result<ReleaseSpec, TemplateError> {
        log::debug!("Executing template expressions in release {}", self.name);

        let resolver = FieldResolver {
            release: &self.name,
            renderer,
        };
        let result = resolver.resolve(self.snapshot()?)?;

        log::debug!("Executed template expressions in release {}", self.name);
        Ok(result)
    }
}

struct FieldResolver<'a, R> {
    release: &'a str,
    renderer: &'a R,
}

impl<R: Renderer> FieldResolver<'_, R> {
    fn resolve(&self, mut spec: ReleaseSpec) -> Result<ReleaseSpec, TemplateError> {
        let scalars: [(&str, ScalarSlot); 4] = [
            ("name", |r| &mut r.name),
            ("chart", |r| &mut r.chart),
            ("namespace", |r| &mut r.namespace),
            ("version", |r| &mut r.version),
        ];
        for (field, slot) in scalars {
            let slot = slot(&mut spec);
            *slot = self.render_string(FieldPath::field(field), slot)?;
        }

        let hooks: [(&str, HookSlot); 4] = [
            ("waitTemplate", |r| &mut r.wait_template),
            ("installedTemplate", |r| &mut r.installed_template),
            ("tillerlessTemplate", |r| &mut r.tillerless_template),
            ("verifyTemplate", |r| &mut r.verify_template),
        ];
        for (field, slot) in hooks {
            if let Some(hook) = slot(&mut spec) {
                *hook = self.render_string(FieldPath::field(field), hook)?;
            }
        }

        for (key, value) in spec.labels.iter_mut() {
            *value = self.render_buffer(FieldPath::field("labels").key(key), value)?;
        }

        if !spec.values_template.is_empty() {
            for (i, entry) in spec.values_template.iter_mut().enumerate() {
                if let OverlayValue::Mapping(mapping) = entry {
                    *mapping = self.render_mapping(FieldPath::field("values").index(i), mapping)?;
                }
            }
            spec.values = prepend(&spec.values_template, spec.values);
        }

        self.render_texts("values", &mut spec.values)?;
        self.render_texts("secrets", &mut spec.secrets)?;

        if !spec.set_values_template.is_empty() {
            for (i, set) in spec.set_values_template.iter_mut().enumerate() {
                self.render_set_value(FieldPath::field("set").index(i), set)?;
            }
            spec.set_values = prepend(&spec.set_values_template, spec.set_values);
        }

        for (i, need) in spec.needs.iter_mut().enumerate() {
            *need = self.render_buffer(FieldPath::field("needs").index(i), need)?;
        }

        Ok(spec)
    }

    fn render_texts(&self, field: &str, entries: &mut [OverlayValue]) -> Result<(), TemplateError> {
        for (i, entry) in entries.iter_mut().enumerate() {
            if let OverlayValue::Text(text) = entry {
                *text = self.render_buffer(FieldPath::field(field).index(i), text)?;
            }
        }
        Ok(())
    }

    fn render_set_value(&self, path: FieldPath, set: &mut SetValue) -> Result<(), TemplateError> {
        set.name = self.render_buffer(path.clone().child("name"), &set.name)?;
        set.value = self.render_buffer(path.clone().child("value"), &set.value)?;
        set.file = self.render_buffer(path.clone().child("file"), &set.file)?;
        for (j, value) in set.values.iter_mut().enumerate() {
            *value = self.render_buffer(path.clone().child("values").index(j), value)?;
        }
        Ok(())
    }

    /// Renders a mapping overlay as YAML text and reads the result back.
    fn render_mapping(&self, path: FieldPath, mapping: &Mapping) -> Result<Mapping, TemplateError> {
        let serialized = serde_yaml::to_string(mapping).map_err(|source| {
            TemplateError::Normalization {
                release: self.release.to_string(),
                path: path.clone(),
                raw: format!("{:?}", mapping),
                source,
            }
        })?;

        let rendered = self.render_buffer(path.clone(), &serialized)?;

        // An overlay that renders to nothing or to null is an empty mapping.
        if rendered.trim().is_empty() {
            return Ok(Mapping::new());
        }

        let mapping: Option<Mapping> =
            serde_yaml::from_str(&rendered).map_err(|source| TemplateError::Normalization {
                release: self.release.to_string(),
                path,
                raw: serialized,
                source,
            })?;
        Ok(mapping.unwrap_or_default())
    }

    fn render_string(&self, path: FieldPath, raw: &str) -> Result<String, TemplateError> {
        self.renderer
            .render_to_string(raw.as_bytes())
            .map_err(|e| self.render_error(path, raw, e))
    }

    fn render_buffer(&self, path: FieldPath, raw: &str) -> Result<String, TemplateError> {
        let buffer = self
            .renderer
            .render_to_buffer(raw.as_bytes())
            .map_err(|e| self.render_error(path.clone(), raw, e))?;

        String::from_utf8(buffer).map_err(|e| self.render_error(path, raw, e.into()))
    }

    fn render_error(&self, path: FieldPath, raw: &str, source: anyhow::Error) -> TemplateError {
        TemplateError::Render {
            release: self.release.to_string(),
            path,
            raw: raw.to_string(),
            source: source.into(),
        }
    }
}

/// `front` followed by `back`, each keeping its own order.
fn prepend<T: Clone>(front: &[T], back: Vec<T>) -> Vec<T> {
    let mut merged = Vec::with_capacity(front.len() + back.len());
    merged.extend_from_slice(front);
    merged.extend(back);
    merged
}

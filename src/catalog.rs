use anyhow::{bail, Context, Result};
use pest::Parser;
use pest_derive::Parser;
use std::fmt;
use std::path::Path;

use crate::grouping::CategoryGrouping;
use crate::pos::Pos;

#[derive(Parser)]
#[grammar = "catalog.pest"]
struct CatalogParser;

/// An ordered sequence of category slots that a sentence must follow.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Template {
    slots: Vec<Pos>,
}

impl Template {
    pub fn new(slots: Vec<Pos>) -> Self {
        Self { slots }
    }

    pub fn slots(&self) -> &[Pos] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// A template can be filled when every slot's category has an occurrence.
    pub fn is_fillable(&self, grouping: &CategoryGrouping) -> bool {
        self.slots.iter().all(|pos| grouping.has(pos))
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.slots.iter().map(Pos::as_str).collect();
        f.write_str(&names.join(" "))
    }
}

/// Templates in priority order. The first template a record can fill is its
/// best fit, so more constrained templates come first.
#[derive(Clone, Debug)]
pub struct TemplateCatalog {
    templates: Vec<Template>,
}

impl TemplateCatalog {
    pub fn new(templates: Vec<Template>) -> Result<Self> {
        if templates.is_empty() {
            bail!("template catalog is empty");
        }
        if let Some(ix) = templates.iter().position(Template::is_empty) {
            bail!("template {} has no slots", ix + 1);
        }
        Ok(Self { templates })
    }

    /// Parse a catalog: one template per line, `#` starts a comment.
    pub fn from_str(catalog: &str) -> Result<Self> {
        let pairs = CatalogParser::parse(Rule::catalog, catalog)?;

        let mut templates = Vec::new();
        for pair in pairs.flatten() {
            if pair.as_rule() != Rule::template {
                continue;
            }
            let slots = pair
                .into_inner()
                .filter(|p| p.as_rule() == Rule::category)
                .map(|p| Pos::parse(p.as_str()))
                .collect();
            templates.push(Template::new(slots));
        }

        Self::new(templates)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read templates from {}", path.display()))?;
        Self::from_str(&text).with_context(|| format!("Failed to parse templates in {}", path.display()))
    }

    /// The built-in English catalog.
    pub fn english() -> Result<Self> {
        Self::from_str(include_str!("../templates/english.tpl"))
            .context("Failed to parse built-in templates")
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// First template in catalog order that `grouping` can fill.
    pub fn largest_fillable(&self, grouping: &CategoryGrouping) -> Option<&Template> {
        self.templates.iter().find(|t| t.is_fillable(grouping))
    }

    /// Concise listing, one template per line.
    pub fn format_concise(&self) -> String {
        let mut out = String::new();
        for (i, template) in self.templates.iter().enumerate() {
            out.push_str(&format!("{:>2}. {}\n", i + 1, template));
        }
        out
    }
}

//! Inline style declarations (`style` attribute)

/// Parsed `style` attribute, declaration order preserved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle {
    decls: Vec<(String, String)>,
}

impl InlineStyle {
    /// Parse `a: b; c: d`. Malformed declarations are dropped.
    pub fn parse(s: &str) -> Self {
        let decls = s
            .split(';')
            .filter_map(|decl| {
                let (name, value) = decl.split_once(':')?;
                let name = name.trim().to_ascii_lowercase();
                let value = value.trim();
                (!name.is_empty() && !value.is_empty()).then(|| (name, value.to_string()))
            })
            .collect();
        Self { decls }
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.decls
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(property))
            .map(|(_, v)| v.as_str())
    }

    /// Set a property. An empty value removes it.
    pub fn set(&mut self, property: &str, value: &str) {
        let property = property.to_ascii_lowercase();
        let value = value.trim();
        if value.is_empty() {
            self.decls.retain(|(n, _)| *n != property);
            return;
        }
        match self.decls.iter_mut().find(|(n, _)| *n == property) {
            Some(slot) => slot.1 = value.to_string(),
            None => self.decls.push((property, value.to_string())),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Serialize back to attribute form
    pub fn to_css(&self) -> String {
        self.decls
            .iter()
            .map(|(n, v)| format!("{n}: {v};"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

//! Hero id to display name translation.

use std::collections::HashMap;

/// Language of a translated hero name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lang {
    En,
    Ja,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct HeroNames {
    en: Option<String>,
    ja: Option<String>,
}

/// Lookup table built from the hero master.
///
/// Ids are matched case-insensitively. Ids missing from the master, or with
/// no name in the requested language, translate to themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeroTranslator {
    names: HashMap<String, HeroNames>,
}

impl HeroTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace one hero. Blank names are treated as missing.
    pub fn insert(&mut self, id: &str, en: &str, ja: &str) {
        let key = id.trim().to_lowercase();
        if key.is_empty() {
            return;
        }
        self.names.insert(
            key,
            HeroNames {
                en: non_blank(en),
                ja: non_blank(ja),
            },
        );
    }

    pub fn with_hero(mut self, id: &str, en: &str, ja: &str) -> Self {
        self.insert(id, en, ja);
        self
    }

    pub fn translate<'a>(&'a self, id: &'a str, lang: Lang) -> &'a str {
        let Some(names) = self.names.get(&id.trim().to_lowercase()) else {
            return id;
        };
        let name = match lang {
            Lang::En => names.en.as_deref(),
            Lang::Ja => names.ja.as_deref(),
        };
        name.unwrap_or(id)
    }

    pub fn en<'a>(&'a self, id: &'a str) -> &'a str {
        self.translate(id, Lang::En)
    }

    pub fn ja<'a>(&'a self, id: &'a str) -> &'a str {
        self.translate(id, Lang::Ja)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

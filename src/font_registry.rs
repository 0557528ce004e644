use std::{collections::HashMap, path::PathBuf, sync::Arc};

use crate::font::{FontHandle, FontdueFace};

/// Alias substituted by non-strict [`FontRegistry::lookup`] when the
/// requested alias is unknown.
pub const FALLBACK_ALIAS: &str = "fallback";

/// Maps caller-chosen aliases to font handles.
///
/// The registry pairs a `fontdb` database of available faces with a cache of
/// loaded `fontdue` instances, and on top of that keeps the alias table the
/// markup language resolves font names against. A text box never owns fonts:
/// it captures handles obtained here, so the registry must outlive every box
/// referencing it.
pub struct FontRegistry {
    /// This is the font set that has been loaded by fontdb.
    font_db: fontdb::Database,
    /// This is the font that has been loaded by fontdue.
    /// Not all fonts in fontdb are necessarily loaded here.
    loaded_font: HashMap<fontdb::ID, Arc<fontdue::Font>, fxhash::FxBuildHasher>,
    aliases: HashMap<String, FontHandle, fxhash::FxBuildHasher>,
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            font_db: fontdb::Database::new(),
            loaded_font: HashMap::with_hasher(fxhash::FxBuildHasher::default()),
            aliases: HashMap::with_hasher(fxhash::FxBuildHasher::default()),
        }
    }
}

/// Loading fonts into fontdb and setting up fontdb.
impl FontRegistry {
    /// Loads a font from binary data.
    pub fn load_font_binary(&mut self, data: impl Into<Vec<u8>>) {
        self.font_db.load_font_data(data.into());
    }

    /// Loads a font from a file path.
    pub fn load_font_file(&mut self, path: PathBuf) -> Result<(), std::io::Error> {
        self.font_db.load_font_file(path)
    }

    /// Loads all fonts from a directory.
    pub fn load_fonts_dir(&mut self, dir: PathBuf) {
        self.font_db.load_fonts_dir(dir)
    }

    /// Loads the system fonts.
    pub fn load_system_fonts(&mut self) {
        self.font_db.load_system_fonts();
    }

    /// Checks if the font database is empty.
    pub fn is_empty(&self) -> bool {
        self.font_db.is_empty()
    }

    /// Returns the number of available faces.
    pub fn len(&self) -> usize {
        self.font_db.len()
    }

    /// Sets the family name for the "serif" generic family.
    pub fn set_serif_family(&mut self, family: impl Into<String>) {
        self.font_db.set_serif_family(family);
    }

    /// Sets the family name for the "sans-serif" generic family.
    pub fn set_sans_serif_family(&mut self, family: impl Into<String>) {
        self.font_db.set_sans_serif_family(family);
    }

    /// Sets the family name for the "cursive" generic family.
    pub fn set_cursive_family(&mut self, family: impl Into<String>) {
        self.font_db.set_cursive_family(family);
    }

    /// Sets the family name for the "fantasy" generic family.
    pub fn set_fantasy_family(&mut self, family: impl Into<String>) {
        self.font_db.set_fantasy_family(family);
    }

    /// Sets the family name for the "monospace" generic family.
    pub fn set_monospace_family(&mut self, family: impl Into<String>) {
        self.font_db.set_monospace_family(family);
    }
}

/// Alias registration and lookup.
impl FontRegistry {
    /// Registers a handle under the given alias, replacing any previous one.
    pub fn register(&mut self, alias: impl Into<String>, handle: FontHandle) {
        self.aliases.insert(alias.into(), handle);
    }

    /// Registers `alias` as another name for the already-registered `other`.
    ///
    /// Panics when `other` is unknown, since silently aliasing a missing font
    /// would only defer the failure to the first lookup.
    pub fn register_alias(&mut self, alias: impl Into<String>, other: &str) {
        let handle = self.lookup_strict(other);
        self.aliases.insert(alias.into(), handle);
    }

    /// Queries the font database, loads the best match and registers it under
    /// `alias` at the given pixel size.
    ///
    /// Returns `None` when no face matches the query or the face data cannot
    /// be loaded; failures are logged.
    pub fn register_query(
        &mut self,
        alias: impl Into<String>,
        query: &fontdb::Query<'_>,
        size: f32,
    ) -> Option<FontHandle> {
        let alias = alias.into();
        let Some(id) = self.font_db.query(query) else {
            log::warn!("No face matches query for alias '{alias}'");
            return None;
        };
        let font = self.font(id)?;
        let handle = FontdueFace::handle(font, size);
        self.aliases.insert(alias, handle.clone());
        Some(handle)
    }

    /// Returns the handle registered under `alias`, if any.
    pub fn get(&self, alias: &str) -> Option<FontHandle> {
        self.aliases.get(alias).cloned()
    }

    /// Resolves an alias, substituting the `"fallback"` alias when unknown.
    ///
    /// The substitution is logged. Panics only when neither the alias nor a
    /// fallback is registered, which is a setup mistake rather than bad
    /// input.
    pub fn lookup(&self, alias: &str) -> FontHandle {
        if let Some(handle) = self.aliases.get(alias) {
            return handle.clone();
        }
        if alias != FALLBACK_ALIAS
            && let Some(handle) = self.aliases.get(FALLBACK_ALIAS)
        {
            log::warn!("Using fallback font instead of '{alias}'");
            return handle.clone();
        }
        panic!("unknown font alias '{alias}'");
    }

    /// Resolves an alias without fallback substitution; panics when unknown.
    pub fn lookup_strict(&self, alias: &str) -> FontHandle {
        match self.aliases.get(alias) {
            Some(handle) => handle.clone(),
            None => panic!("unknown font alias '{alias}'"),
        }
    }
}

/// Get `fontdue::Font`.
impl FontRegistry {
    /// Retrieves a loaded font by ID, loading it if necessary.
    pub fn font(&mut self, id: fontdb::ID) -> Option<Arc<fontdue::Font>> {
        use std::collections::hash_map::Entry;

        match self.loaded_font.entry(id) {
            Entry::Occupied(entry) => Some(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let font_result = self.font_db.with_face_data(id, |data, index| {
                    fontdue::Font::from_bytes(
                        data,
                        fontdue::FontSettings {
                            collection_index: index,
                            scale: 40.0,
                            load_substitutions: true,
                        },
                    )
                })?;

                match font_result {
                    Ok(font) => {
                        let r: &mut Arc<fontdue::Font> = entry.insert(Arc::new(font));
                        Some(Arc::clone(r))
                    }
                    Err(e) => {
                        log::error!("Failed to load font (id: {:?}): {}", id, e);
                        None
                    }
                }
            }
        }
    }

    /// Returns an iterator over all available faces.
    pub fn faces(&self) -> impl Iterator<Item = &fontdb::FaceInfo> {
        self.font_db.faces()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::FixedFace;

    #[test]
    fn register_and_get() {
        let mut registry = FontRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get("title").is_none());

        let handle = FixedFace::handle(10.0, 2.0, 0.0, 5.0);
        registry.register("title", handle.clone());
        assert_eq!(registry.get("title"), Some(handle.clone()));
        assert_eq!(registry.lookup("title"), handle);
        assert_eq!(registry.lookup_strict("title"), handle);
    }

    #[test]
    fn lookup_substitutes_fallback() {
        let mut registry = FontRegistry::new();
        let fallback = FixedFace::handle(8.0, 2.0, 0.0, 4.0);
        registry.register(FALLBACK_ALIAS, fallback.clone());

        assert_eq!(registry.lookup("no-such-alias"), fallback);
    }

    #[test]
    #[should_panic(expected = "unknown font alias")]
    fn lookup_without_fallback_panics() {
        let registry = FontRegistry::new();
        registry.lookup("no-such-alias");
    }

    #[test]
    #[should_panic(expected = "unknown font alias")]
    fn lookup_strict_ignores_fallback() {
        let mut registry = FontRegistry::new();
        registry.register(FALLBACK_ALIAS, FixedFace::handle(8.0, 2.0, 0.0, 4.0));
        registry.lookup_strict("no-such-alias");
    }

    #[test]
    fn register_alias_shares_the_handle() {
        let mut registry = FontRegistry::new();
        let handle = FixedFace::handle(10.0, 2.0, 0.0, 5.0);
        registry.register("M", handle.clone());
        registry.register_alias("default", "M");

        assert_eq!(registry.lookup("default"), handle);
    }

    #[test]
    #[should_panic(expected = "unknown font alias")]
    fn register_alias_of_unknown_panics() {
        let mut registry = FontRegistry::new();
        registry.register_alias("default", "no-such-alias");
    }
}

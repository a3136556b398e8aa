pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Only the exact `light` sentinel selects the light theme.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("light") => Theme::Light,
            _ => Theme::Dark,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Key/value persistence for the theme preference.
pub trait ThemeStore {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&mut self, key: &str, value: &str);
}

#[derive(Debug, Default, Clone)]
pub struct MemoryThemeStore {
    value: Option<String>,
}

impl MemoryThemeStore {
    pub fn with_value(value: &str) -> Self {
        Self {
            value: Some(value.to_string()),
        }
    }
}

impl ThemeStore for MemoryThemeStore {
    fn load(&self, _key: &str) -> Option<String> {
        self.value.clone()
    }

    fn save(&mut self, _key: &str, value: &str) {
        self.value = Some(value.to_string());
    }
}

#[derive(Debug)]
pub struct ThemeToggle<S> {
    store: S,
    current: Theme,
}

impl<S: ThemeStore> ThemeToggle<S> {
    /// Reads the stored preference and writes the resolved value back.
    pub fn load(mut store: S) -> Self {
        let current = Theme::from_stored(store.load(THEME_KEY).as_deref());
        store.save(THEME_KEY, current.as_str());
        Self { store, current }
    }

    pub fn toggle(&mut self) -> Theme {
        self.current = self.current.toggled();
        self.store.save(THEME_KEY, self.current.as_str());
        self.current
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

/// `localStorage`-backed store. Storage failures are logged and ignored.
pub struct BrowserThemeStore {
    storage: web_sys::Storage,
}

impl BrowserThemeStore {
    pub fn new() -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok()??;
        Some(Self { storage })
    }
}

impl ThemeStore for BrowserThemeStore {
    fn load(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn save(&mut self, key: &str, value: &str) {
        if let Err(err) = self.storage.set_item(key, value) {
            log::warn!("failed to persist {key}: {err:?}");
        }
    }
}

/// Falls back to memory when `localStorage` is unavailable (private mode,
/// sandboxed iframes).
pub enum AppThemeStore {
    Browser(BrowserThemeStore),
    Memory(MemoryThemeStore),
}

impl AppThemeStore {
    pub fn open() -> Self {
        match BrowserThemeStore::new() {
            Some(store) => AppThemeStore::Browser(store),
            None => {
                log::warn!("localStorage unavailable, theme preference will not persist");
                AppThemeStore::Memory(MemoryThemeStore::default())
            }
        }
    }
}

impl ThemeStore for AppThemeStore {
    fn load(&self, key: &str) -> Option<String> {
        match self {
            AppThemeStore::Browser(store) => store.load(key),
            AppThemeStore::Memory(store) => store.load(key),
        }
    }

    fn save(&mut self, key: &str, value: &str) {
        match self {
            AppThemeStore::Browser(store) => store.save(key, value),
            AppThemeStore::Memory(store) => store.save(key, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_dark_without_light_sentinel() {
        assert_eq!(ThemeToggle::load(MemoryThemeStore::default()).current(), Theme::Dark);
        assert_eq!(
            ThemeToggle::load(MemoryThemeStore::with_value("LIGHT")).current(),
            Theme::Dark
        );
        assert_eq!(
            ThemeToggle::load(MemoryThemeStore::with_value("light")).current(),
            Theme::Light
        );
    }

    #[test]
    fn toggle_persists_immediately() {
        let mut toggle = ThemeToggle::load(MemoryThemeStore::default());
        assert_eq!(toggle.toggle(), Theme::Light);
        assert_eq!(toggle.into_store().load(THEME_KEY).as_deref(), Some("light"));
    }

    #[test]
    fn load_writes_resolved_theme_back() {
        let toggle = ThemeToggle::load(MemoryThemeStore::with_value("sepia"));
        assert_eq!(toggle.into_store().load(THEME_KEY).as_deref(), Some("dark"));
    }
}

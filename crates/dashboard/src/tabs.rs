use std::fmt::Debug;

/// The tab set of one dashboard.
pub trait TabKind: Copy + Eq + Debug + Send + Sync + 'static {
    /// Every tab, in display order.
    const ALL: &'static [Self];

    /// Identifier used for the tab button, its panel and the `?tab=` query.
    fn id(&self) -> &'static str;

    fn default_tab() -> Self;

    fn parse(id: &str) -> Option<Self> {
        let id = id.trim();
        Self::ALL.iter().copied().find(|t| t.id() == id)
    }
}

/// Current tab plus a generation that moves on every activation, so a load
/// started for an older activation can tell it has been superseded.
#[derive(Debug, Clone)]
pub struct TabState<T> {
    current: T,
    generation: u64,
}

impl<T: TabKind> TabState<T> {
    pub fn new(initial: T) -> Self {
        Self {
            current: initial,
            generation: 0,
        }
    }

    /// Initial tab from a page query such as `?tab=grades&x=1`, falling back
    /// to the default for a missing or unknown tab.
    pub fn from_query(query: Option<&str>) -> Self {
        let initial = query
            .and_then(tab_param)
            .and_then(T::parse)
            .unwrap_or_else(T::default_tab);
        Self::new(initial)
    }

    pub fn current(&self) -> T {
        self.current
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Make `tab` current and return the new generation.
    pub fn activate(&mut self, tab: T) -> u64 {
        self.current = tab;
        self.bump()
    }

    /// Start a new generation for the current tab.
    pub fn bump(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }
}

fn tab_param(query: &str) -> Option<&str> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "tab")
        .map(|(_, value)| value)
}

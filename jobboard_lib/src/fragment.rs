//! Deep-linking: mirrors the session search into the address fragment.
//!
//! The fragment has the shape `#<section>?search=<value>`. Only the search
//! term is mirrored; filter, sort and pagination stay session-local.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use url::form_urlencoded;

/// Callback fired after the fragment changes.
pub type FragmentListener = Arc<dyn Fn() + Send + Sync>;

/// Handle for one registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A browser-like document location.
///
/// Change notifications fire for every fragment mutation, including the
/// ones made by this engine.
pub trait NavigationSurface: Send + Sync {
    /// The current fragment, including the leading `#`, or empty.
    fn fragment(&self) -> String;

    fn set_fragment(&self, fragment: &str);

    fn subscribe(&self, listener: FragmentListener) -> ListenerId;

    fn unsubscribe(&self, id: ListenerId);
}

/// In-process [`NavigationSurface`] holding the fragment in memory.
///
/// Setting the fragment to its current value is not a change and does not
/// notify, mirroring `hashchange`.
#[derive(Default)]
pub struct MemoryLocation {
    fragment: Mutex<String>,
    listeners: Mutex<Vec<(ListenerId, FragmentListener)>>,
    next_id: AtomicU64,
}

impl MemoryLocation {
    pub fn new(fragment: &str) -> Self {
        let location = Self::default();
        *location.fragment.lock().unwrap_or_else(|e| e.into_inner()) = normalize(fragment);
        location
    }

    /// Number of live subscriptions.
    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

impl NavigationSurface for MemoryLocation {
    fn fragment(&self) -> String {
        self.fragment
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn set_fragment(&self, fragment: &str) {
        let fragment = normalize(fragment);
        {
            let mut current = self.fragment.lock().unwrap_or_else(|e| e.into_inner());
            if *current == fragment {
                return;
            }
            *current = fragment;
        }
        // Listeners run outside both locks so they may read the fragment.
        let listeners: Vec<FragmentListener> = self
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener();
        }
    }

    fn subscribe(&self, listener: FragmentListener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, listener));
        id
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|(lid, _)| *lid != id);
    }
}

fn normalize(fragment: &str) -> String {
    if fragment.is_empty() || fragment.starts_with('#') {
        fragment.to_string()
    } else {
        format!("#{}", fragment)
    }
}

/// What the current fragment asks of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentChange {
    /// Apply this search term.
    Search(String),
    /// The bare section key while a search is active: drop the search.
    Cleared,
    NoOp,
}

/// Registration on a [`NavigationSurface`], released on drop.
pub struct FragmentSubscription<N: NavigationSurface + ?Sized> {
    surface: Arc<N>,
    id: ListenerId,
}

impl<N: NavigationSurface + ?Sized> Drop for FragmentSubscription<N> {
    fn drop(&mut self) {
        self.surface.unsubscribe(self.id);
        tracing::debug!("Released fragment listener {:?}", self.id);
    }
}

/// Reads and writes one section's search term in the fragment.
pub struct FragmentBridge<N: NavigationSurface + ?Sized> {
    surface: Arc<N>,
    section_key: String,
}

impl<N: NavigationSurface + ?Sized> FragmentBridge<N> {
    pub fn new(surface: Arc<N>, section_key: &str) -> Self {
        Self {
            surface,
            section_key: section_key.to_string(),
        }
    }

    pub fn section_key(&self) -> &str {
        &self.section_key
    }

    /// Interprets the current fragment against the active search.
    ///
    /// A term equal to the trimmed `current_search` is a no-op, so
    /// redundant fragment events never cause a refetch.
    pub fn read(&self, current_search: &str) -> FragmentChange {
        let fragment = self.surface.fragment();
        let body = fragment.strip_prefix('#').unwrap_or(&fragment);
        let (key, params) = match body.split_once('?') {
            Some((key, params)) => (key, Some(params)),
            None => (body, None),
        };
        if key != self.section_key {
            return FragmentChange::NoOp;
        }
        let current_search = current_search.trim();
        match params {
            None if !current_search.is_empty() => FragmentChange::Cleared,
            None => FragmentChange::NoOp,
            Some(params) => match search_param(params).as_deref().map(str::trim) {
                Some(term) if !term.is_empty() && term != current_search => {
                    FragmentChange::Search(term.to_string())
                }
                _ => FragmentChange::NoOp,
            },
        }
    }

    /// Publishes `search` as `#<section>?search=<term>`, or the bare
    /// section key when the term is blank. Nothing is written when the
    /// fragment already carries the same term.
    pub fn write(&self, search: &str) {
        let term = search.trim();
        let target = if term.is_empty() {
            format!("#{}", self.section_key)
        } else {
            let encoded: String = form_urlencoded::byte_serialize(term.as_bytes()).collect();
            format!("#{}?search={}", self.section_key, encoded)
        };

        let current = self.surface.fragment();
        if current == target {
            return;
        }
        if !term.is_empty() {
            if let Some((key, params)) = current.trim_start_matches('#').split_once('?') {
                if key == self.section_key && search_param(params).as_deref() == Some(term) {
                    return;
                }
            }
        }
        tracing::debug!("Writing fragment {}", target);
        self.surface.set_fragment(&target);
    }

    /// Registers `listener` for fragment changes until the returned guard
    /// is dropped.
    pub fn subscribe(&self, listener: FragmentListener) -> FragmentSubscription<N> {
        let id = self.surface.subscribe(listener);
        tracing::debug!(
            "Subscribed fragment listener {:?} for section {}",
            id,
            self.section_key
        );
        FragmentSubscription {
            surface: Arc::clone(&self.surface),
            id,
        }
    }
}

fn search_param(params: &str) -> Option<String> {
    form_urlencoded::parse(params.as_bytes())
        .find(|(k, _)| k == "search")
        .map(|(_, v)| v.into_owned())
}

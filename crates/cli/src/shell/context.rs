use docscope_api::{NavState, NodePath, QueryResponse, SearchService};
use docscope_core::Site;
use std::sync::{Arc, RwLock};

#[derive(Clone)]
pub struct ShellContext {
    pub site: Arc<Site>,
    pub rt_handle: tokio::runtime::Handle,
    pub nav_state: Arc<RwLock<NavState>>,
    pub current_page: Arc<RwLock<Option<String>>>,
}

impl ShellContext {
    pub fn new(site: Arc<Site>, rt_handle: tokio::runtime::Handle) -> Self {
        Self {
            site,
            rt_handle,
            nav_state: Arc::new(RwLock::new(NavState::default())),
            current_page: Arc::new(RwLock::new(None)),
        }
    }

    pub fn current_page(&self) -> Option<String> {
        self.current_page
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn set_current_page(&self, page: Option<String>) {
        *self.current_page.write().unwrap_or_else(|e| e.into_inner()) = page;
    }

    pub fn nav_state(&self) -> NavState {
        self.nav_state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Run `f` against the pane state, keeping whatever it changes.
    pub fn with_nav_state<T>(&self, f: impl FnOnce(&mut NavState) -> T) -> T {
        let mut state = self.nav_state.write().unwrap_or_else(|e| e.into_inner());
        f(&mut state)
    }

    /// Helper to run a search synchronously
    pub fn search(&self, query: &str) -> Option<QueryResponse> {
        self.rt_handle
            .block_on(self.site.search_index().query(query))
            .into_response()
    }

    /// Helper to complete a label prefix synchronously
    pub fn complete(&self, prefix: &str, limit: usize) -> Vec<String> {
        self.rt_handle
            .block_on(SearchService::complete(self.site.as_ref(), prefix, limit))
            .unwrap_or_default()
    }

    /// Move to `page` and reveal it in the pane. The page changes even when
    /// the pane has no node for it.
    pub fn open(&self, page: &str) -> Option<NodePath> {
        self.set_current_page(Some(page.to_string()));
        self.with_nav_state(|state| self.site.nav().sync_to(state, page))
    }
}

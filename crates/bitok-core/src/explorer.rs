//! Page controller shared by every front end.
//!
//! A [`Route`] names a page in hash-route form (`#/blocks/12`). The
//! [`Explorer`] resolves the route into a [`Page`] and hands it to a
//! [`PageRenderer`]; rendering never fails, errors become the renderer's
//! failure output. [`Explorer::navigate`] additionally drops results that
//! were overtaken by a newer navigation.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bitcoin::Txid;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{CoreError, NotFound};
use crate::resolver::{Resolver, SearchHit};
use crate::rpc::NodeInfo;
use crate::types::{AddressDetails, Block, BlockPage, Dashboard, WalletTransaction};

/// Default number of blocks per page of the block list.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

// ==============================================================================
// Routes
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Dashboard,
    Blocks { page: u32 },
    /// Height or hash.
    Block(String),
    Transaction(String),
    Address(String),
    Search(String),
    Mempool,
    Unknown(String),
}

impl Route {
    /// Parse a hash route. The leading `#` and `/` are optional; an empty
    /// route is the home page.
    pub fn parse(fragment: &str) -> Self {
        let trimmed = fragment.trim();
        let path = trimmed.strip_prefix('#').unwrap_or(trimmed);
        let path = path.strip_prefix('/').unwrap_or(path);
        let (path, query) = match path.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path, None),
        };
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] | ["home"] => Self::Home,
            ["dashboard"] => Self::Dashboard,
            ["mempool"] => Self::Mempool,
            ["blocks"] => match page_param(query) {
                Some(page) => Self::Blocks { page },
                None => Self::Unknown(trimmed.to_owned()),
            },
            ["blocks" | "block", id] => Self::Block((*id).to_owned()),
            ["transactions" | "tx", txid] => Self::Transaction((*txid).to_owned()),
            ["addresses" | "address", address] => Self::Address((*address).to_owned()),
            ["search", q] => Self::Search((*q).to_owned()),
            _ => Self::Unknown(trimmed.to_owned()),
        }
    }

    /// Canonical hash-route form.
    pub fn fragment(&self) -> String {
        match self {
            Self::Home => "#/home".to_owned(),
            Self::Dashboard => "#/dashboard".to_owned(),
            Self::Blocks { page: 1 } => "#/blocks".to_owned(),
            Self::Blocks { page } => format!("#/blocks?page={page}"),
            Self::Block(id) => format!("#/blocks/{id}"),
            Self::Transaction(txid) => format!("#/transactions/{txid}"),
            Self::Address(address) => format!("#/addresses/{address}"),
            Self::Search(q) => format!("#/search/{q}"),
            Self::Mempool => "#/mempool".to_owned(),
            Self::Unknown(raw) => raw.clone(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fragment())
    }
}

/// `page=N` from a query string; page 1 when absent, `None` when malformed.
fn page_param(query: Option<&str>) -> Option<u32> {
    let Some(query) = query else {
        return Some(1);
    };
    match query
        .split('&')
        .find_map(|pair| pair.strip_prefix("page="))
    {
        Some(value) => value.parse().ok(),
        None => Some(1),
    }
}

// ==============================================================================
// Pages
// ==============================================================================

/// The data behind one rendered page.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "page", content = "data", rename_all = "snake_case")]
pub enum Page {
    /// Home carries whatever network snapshot is already cached; it never
    /// triggers a node call.
    Home(Option<NodeInfo>),
    Dashboard(Dashboard),
    Blocks(BlockPage),
    Block(Block),
    Transaction(WalletTransaction),
    Address(AddressDetails),
    Mempool(Vec<Txid>),
}

impl From<SearchHit> for Page {
    fn from(hit: SearchHit) -> Self {
        match hit {
            SearchHit::Block(block) => Self::Block(block),
            SearchHit::Transaction(tx) => Self::Transaction(tx),
            SearchHit::Address(details) => Self::Address(details),
        }
    }
}

/// Turns resolved pages into some output: JSON, text, markup.
pub trait PageRenderer {
    type Output;

    fn home(&self, info: Option<&NodeInfo>) -> Self::Output;
    fn dashboard(&self, dashboard: &Dashboard) -> Self::Output;
    fn blocks(&self, page: &BlockPage) -> Self::Output;
    fn block(&self, block: &Block) -> Self::Output;
    fn transaction(&self, tx: &WalletTransaction) -> Self::Output;
    fn address(&self, details: &AddressDetails) -> Self::Output;
    fn mempool(&self, txids: &[Txid]) -> Self::Output;
    fn failure(&self, route: &Route, error: &CoreError) -> Self::Output;
}

impl Page {
    pub fn render<R: PageRenderer + ?Sized>(&self, renderer: &R) -> R::Output {
        match self {
            Self::Home(info) => renderer.home(info.as_ref()),
            Self::Dashboard(dashboard) => renderer.dashboard(dashboard),
            Self::Blocks(page) => renderer.blocks(page),
            Self::Block(block) => renderer.block(block),
            Self::Transaction(tx) => renderer.transaction(tx),
            Self::Address(details) => renderer.address(details),
            Self::Mempool(txids) => renderer.mempool(txids),
        }
    }
}

// ==============================================================================
// Navigation
// ==============================================================================

/// Generation counter for navigations. Only the most recent ticket is
/// current.
#[derive(Debug, Default)]
pub struct Navigator {
    generation: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a navigation, superseding every earlier ticket.
    pub fn begin(&self) -> Ticket {
        Ticket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }
}

// ==============================================================================
// Explorer
// ==============================================================================

pub struct Explorer {
    resolver: Arc<Resolver>,
    page_size: u32,
    navigator: Navigator,
}

impl Explorer {
    pub fn new(resolver: Arc<Resolver>, page_size: u32) -> Self {
        Self {
            resolver,
            page_size,
            navigator: Navigator::new(),
        }
    }

    pub fn resolver(&self) -> &Arc<Resolver> {
        &self.resolver
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Resolve the data for `route`.
    pub async fn load(&self, route: &Route) -> Result<Page, CoreError> {
        let resolver = &self.resolver;
        match route {
            Route::Home => Ok(Page::Home(resolver.status().snapshot().await)),
            Route::Dashboard => resolver.dashboard().await.map(Page::Dashboard),
            Route::Blocks { page } => resolver
                .paginate(*page, self.page_size)
                .await
                .map(Page::Blocks),
            Route::Block(id) => resolver.resolve_block(id).await.map(Page::Block),
            Route::Transaction(txid) => resolver
                .resolve_transaction(txid)
                .await
                .map(Page::Transaction),
            Route::Address(address) => resolver
                .resolve_address(address)
                .await
                .map(Page::Address),
            Route::Search(q) => resolver.search(q).await.map(Page::from),
            Route::Mempool => resolver.mempool().await.map(Page::Mempool),
            Route::Unknown(raw) => Err(NotFound::Page(raw.clone()).into()),
        }
    }

    /// Render `route`; failures become `renderer.failure(..)`.
    pub async fn render<R: PageRenderer + ?Sized>(&self, route: &Route, renderer: &R) -> R::Output {
        match self.load(route).await {
            Ok(page) => page.render(renderer),
            Err(err) => {
                warn!(route = %route, error = %err, "page failed to load");
                renderer.failure(route, &err)
            }
        }
    }

    /// Start a navigation now. Every ticket issued earlier becomes stale,
    /// whenever its page finishes loading.
    pub fn begin(&self) -> Ticket {
        self.navigator.begin()
    }

    /// Like [`render`](Self::render), but returns `None` if another
    /// navigation started before this one finished.
    pub async fn navigate<R: PageRenderer + ?Sized>(
        &self,
        route: &Route,
        renderer: &R,
    ) -> Option<R::Output> {
        let ticket = self.begin();
        self.navigate_with(ticket, route, renderer).await
    }

    /// [`navigate`](Self::navigate) for a ticket taken earlier with
    /// [`begin`](Self::begin), so callers that hand work to other tasks
    /// keep the order in which requests arrived.
    pub async fn navigate_with<R: PageRenderer + ?Sized>(
        &self,
        ticket: Ticket,
        route: &Route,
        renderer: &R,
    ) -> Option<R::Output> {
        let output = self.render(route, renderer).await;
        if self.navigator.is_current(ticket) {
            Some(output)
        } else {
            debug!(route = %route, "discarding stale navigation");
            None
        }
    }
}

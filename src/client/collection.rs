use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use actix_web::rt::{self, task::JoinHandle};
use futures_util::StreamExt;
use serde_json::Value;
use tokio::sync::watch;

use crate::api::ListPage;
use crate::client::{ApiRequest, Backend, ClientError};
use crate::models::Resource;
use crate::query::{
    ListQuery, ListView, MAX_LIMIT, Pagination, ViewPage, filter, paginate, sort_records,
};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Where list predicates run. Fixed for the lifetime of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// The query is forwarded and the server paginates.
    Server,
    /// Fetch up to `max_records` unfiltered, then filter, sort and page
    /// locally.
    Client { max_records: u32 },
}

impl FetchMode {
    pub fn client() -> Self {
        FetchMode::Client {
            max_records: MAX_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Error,
}

#[derive(Debug, Clone)]
pub struct CollectionOptions {
    pub mode: FetchMode,
    pub query: ListQuery,
    pub auto_refresh: Option<Duration>,
    pub realtime: bool,
}

impl Default for CollectionOptions {
    fn default() -> Self {
        CollectionOptions {
            mode: FetchMode::Server,
            query: ListQuery::default(),
            auto_refresh: None,
            realtime: false,
        }
    }
}

impl CollectionOptions {
    pub fn client_side() -> Self {
        CollectionOptions {
            mode: FetchMode::client(),
            ..Default::default()
        }
    }

    pub fn with_query(mut self, query: ListQuery) -> Self {
        self.query = query;
        self
    }

    /// Refetch every [`DEFAULT_REFRESH_INTERVAL`].
    pub fn with_auto_refresh(mut self) -> Self {
        self.auto_refresh = Some(DEFAULT_REFRESH_INTERVAL);
        self
    }

    pub fn with_realtime(mut self) -> Self {
        self.realtime = true;
        self
    }
}

/// What observers see. Replaced as a whole on every fetch.
#[derive(Debug, Clone)]
pub struct Snapshot<R> {
    pub state: LoadState,
    pub items: Vec<R>,
    pub pagination: Option<Pagination>,
    pub error: Option<String>,
}

impl<R> Default for Snapshot<R> {
    fn default() -> Self {
        Snapshot {
            state: LoadState::Idle,
            items: Vec::new(),
            pagination: None,
            error: None,
        }
    }
}

/// A background refresh task. Stopping it never cuts a fetch short: an idle
/// task is aborted, a busy one finishes its fetch and then exits.
struct Worker {
    handle: JoinHandle<()>,
    stopped: Rc<Cell<bool>>,
    busy: Rc<Cell<bool>>,
}

impl Worker {
    fn spawn<F, Fut>(body: F) -> Self
    where
        F: FnOnce(Rc<Cell<bool>>, Rc<Cell<bool>>) -> Fut,
        Fut: std::future::Future<Output = ()> + 'static,
    {
        let stopped = Rc::new(Cell::new(false));
        let busy = Rc::new(Cell::new(false));
        let handle = rt::spawn(body(stopped.clone(), busy.clone()));
        Worker {
            handle,
            stopped,
            busy,
        }
    }

    fn stop(self) {
        self.stopped.set(true);
        if !self.busy.get() {
            self.handle.abort();
        }
    }
}

/// Runs one fetch on behalf of a worker, flagging it busy meanwhile.
async fn worker_fetch<R: Resource, B: Backend>(inner: &Inner<R, B>, busy: &Cell<bool>) {
    busy.set(true);
    inner.fetch().await;
    busy.set(false);
}

struct Inner<R, B> {
    backend: Rc<B>,
    mode: FetchMode,
    query: RefCell<ListQuery>,
    snapshot: RefCell<Snapshot<R>>,
    /// Unfiltered records of the last client-mode fetch.
    fetched: RefCell<Vec<R>>,
    /// Sequence number of the most recently dispatched fetch.
    seq: Cell<u64>,
    version: watch::Sender<u64>,
    refresh_task: RefCell<Option<Worker>>,
    realtime_task: RefCell<Option<Worker>>,
}

impl<R: Resource, B: Backend> Inner<R, B> {
    fn bump(&self) {
        self.version.send_modify(|v| *v += 1);
    }

    fn set_error(&self, message: String) {
        log::warn!("{}: {message}", R::COLLECTION);
        self.snapshot.borrow_mut().error = Some(message);
        self.bump();
    }

    fn fetch_request(&self) -> ApiRequest {
        let request = ApiRequest::get(format!("/{}", R::COLLECTION));
        match self.mode {
            FetchMode::Server => request.with_query(self.query.borrow().to_query_string()),
            FetchMode::Client { max_records } => {
                let all = ListQuery {
                    page: Some(1),
                    limit: Some(max_records.clamp(1, MAX_LIMIT)),
                    ..Default::default()
                };
                request.with_query(all.to_query_string())
            }
        }
    }

    async fn fetch(&self) {
        let seq = self.seq.get() + 1;
        self.seq.set(seq);
        self.snapshot.borrow_mut().state = LoadState::Loading;
        self.bump();

        let result = self
            .backend
            .send(self.fetch_request())
            .await
            .and_then(|data| Ok(serde_json::from_value::<ListPage<R>>(data)?));

        if self.seq.get() != seq {
            log::debug!("Dropping stale {} response #{seq}", R::COLLECTION);
            return;
        }

        match result {
            Ok(page) => match self.mode {
                FetchMode::Server => {
                    *self.snapshot.borrow_mut() = Snapshot {
                        state: LoadState::Ready,
                        items: page.data,
                        pagination: Some(page.pagination),
                        error: None,
                    };
                    self.bump();
                }
                FetchMode::Client { .. } => {
                    *self.fetched.borrow_mut() = page.data;
                    self.derive_local();
                }
            },
            Err(e) => {
                let message = e.user_message(&format!("Failed to fetch {}", R::COLLECTION));
                let mut snapshot = self.snapshot.borrow_mut();
                snapshot.state = LoadState::Error;
                snapshot.error = Some(message.clone());
                drop(snapshot);
                log::warn!("{}: {message}", R::COLLECTION);
                self.bump();
            }
        }
    }

    /// Client mode: recompute the visible page from the fetched records.
    fn derive_local(&self) {
        let query = self.query.borrow().clone();
        let records = self.fetched.borrow().clone();
        let result = filter::apply(records, &query).map(|matching| {
            let sorted = sort_records(matching, &query.sort_spec(R::DEFAULT_SORT));
            paginate(sorted, query.page_request())
        });
        let mut snapshot = self.snapshot.borrow_mut();
        match result {
            Ok((items, pagination)) => {
                *snapshot = Snapshot {
                    state: LoadState::Ready,
                    items,
                    pagination: Some(pagination),
                    error: None,
                };
            }
            Err(message) => {
                snapshot.state = LoadState::Error;
                snapshot.error = Some(message);
            }
        }
        drop(snapshot);
        self.bump();
    }

    fn replace_local(&self, record: &R) {
        let swap = |items: &mut Vec<R>| {
            if let Some(slot) = items.iter_mut().find(|r| r.id() == record.id()) {
                *slot = record.clone();
            }
        };
        swap(&mut self.snapshot.borrow_mut().items);
        swap(&mut self.fetched.borrow_mut());
        self.bump();
    }

    fn remove_local(&self, id: &str) {
        let mut snapshot = self.snapshot.borrow_mut();
        let before = snapshot.items.len();
        snapshot.items.retain(|r| r.id() != id);
        if snapshot.items.len() < before {
            if let Some(p) = snapshot.pagination.as_mut() {
                p.total = p.total.saturating_sub(1);
            }
        }
        drop(snapshot);
        self.fetched.borrow_mut().retain(|r| r.id() != id);
        self.bump();
    }
}

/// One entity list mirrored from a [`Backend`].
///
/// Runs on the current thread (actix `rt`). Background tasks hold only a weak
/// reference and stop when the collection is dropped.
pub struct RemoteCollection<R, B> {
    inner: Rc<Inner<R, B>>,
}

impl<R: Resource, B: Backend> RemoteCollection<R, B> {
    /// Create without fetching. State stays [`LoadState::Idle`] until the
    /// first [`refetch`](Self::refetch).
    pub fn new(backend: Rc<B>, options: CollectionOptions) -> Self {
        let (version, _) = watch::channel(0);
        let collection = RemoteCollection {
            inner: Rc::new(Inner {
                backend,
                mode: options.mode,
                query: RefCell::new(options.query),
                snapshot: RefCell::new(Snapshot::default()),
                fetched: RefCell::new(Vec::new()),
                seq: Cell::new(0),
                version,
                refresh_task: RefCell::new(None),
                realtime_task: RefCell::new(None),
            }),
        };
        collection.set_auto_refresh(options.auto_refresh);
        collection.set_realtime(options.realtime);
        collection
    }

    /// Create and run the initial fetch.
    pub async fn mount(backend: Rc<B>, options: CollectionOptions) -> Self {
        let collection = Self::new(backend, options);
        collection.refetch().await;
        collection
    }

    pub async fn refetch(&self) {
        self.inner.fetch().await;
    }

    pub fn mode(&self) -> FetchMode {
        self.inner.mode
    }

    pub fn query(&self) -> ListQuery {
        self.inner.query.borrow().clone()
    }

    /// Change the filters. Server mode refetches; client mode recomputes from
    /// the records already fetched.
    pub async fn set_query(&self, query: ListQuery) {
        *self.inner.query.borrow_mut() = query;
        match self.inner.mode {
            FetchMode::Server => self.inner.fetch().await,
            FetchMode::Client { .. } => self.inner.derive_local(),
        }
    }

    pub fn snapshot(&self) -> Snapshot<R> {
        self.inner.snapshot.borrow().clone()
    }

    pub fn state(&self) -> LoadState {
        self.inner.snapshot.borrow().state
    }

    pub fn items(&self) -> Vec<R> {
        self.inner.snapshot.borrow().items.clone()
    }

    pub fn get(&self, id: &str) -> Option<R> {
        self.inner
            .snapshot
            .borrow()
            .items
            .iter()
            .find(|r| r.id() == id)
            .cloned()
    }

    pub fn pagination(&self) -> Option<Pagination> {
        self.inner.snapshot.borrow().pagination
    }

    pub fn error(&self) -> Option<String> {
        self.inner.snapshot.borrow().error.clone()
    }

    /// The loaded items seen through a page's search box, checkboxes and
    /// column sort.
    pub fn view(&self, view: &ListView) -> ViewPage<R> {
        view.apply(&self.inner.snapshot.borrow().items)
    }

    /// Receiver bumped on every state change.
    pub fn watch(&self) -> watch::Receiver<u64> {
        self.inner.version.subscribe()
    }

    /// POST, then refetch the whole list.
    pub async fn create(&self, draft: &R::Draft) -> Option<R> {
        let fallback = format!("Failed to create {}", R::LABEL.to_lowercase());
        let body = match serde_json::to_value(draft) {
            Ok(body) => body,
            Err(e) => {
                self.inner.set_error(ClientError::from(e).user_message(&fallback));
                return None;
            }
        };
        let created: R = self
            .call(ApiRequest::post(format!("/{}", R::COLLECTION), body), &fallback)
            .await?;
        self.inner.fetch().await;
        Some(created)
    }

    /// PUT, then swap the returned record in place.
    pub async fn update(&self, id: &str, patch: &R::Patch) -> Option<R> {
        let fallback = format!("Failed to update {}", R::LABEL.to_lowercase());
        let body = match serde_json::to_value(patch) {
            Ok(body) => body,
            Err(e) => {
                self.inner.set_error(ClientError::from(e).user_message(&fallback));
                return None;
            }
        };
        let updated: R = self
            .call(ApiRequest::put(format!("/{}/{id}", R::COLLECTION), body), &fallback)
            .await?;
        self.inner.replace_local(&updated);
        Some(updated)
    }

    /// DELETE, then drop the record locally. Returns the deleted id.
    pub async fn delete(&self, id: &str) -> Option<String> {
        let fallback = format!("Failed to delete {}", R::LABEL.to_lowercase());
        self.call::<Value>(ApiRequest::delete(format!("/{}/{id}", R::COLLECTION)), &fallback)
            .await?;
        self.inner.remove_local(id);
        Some(id.to_string())
    }

    /// Send `request` and decode its data. Failures are recorded in
    /// [`error`](Self::error) and come back as `None`.
    pub(crate) async fn call<T: serde::de::DeserializeOwned>(
        &self,
        request: ApiRequest,
        fallback: &str,
    ) -> Option<T> {
        let result = self
            .inner
            .backend
            .send(request)
            .await
            .and_then(|data| Ok(serde_json::from_value::<T>(data)?));
        match result {
            Ok(value) => {
                if self.inner.snapshot.borrow().error.is_some() {
                    self.inner.snapshot.borrow_mut().error = None;
                    self.inner.bump();
                }
                Some(value)
            }
            Err(e) => {
                self.inner.set_error(e.user_message(fallback));
                None
            }
        }
    }

    pub(crate) fn replace_local(&self, record: &R) {
        self.inner.replace_local(record);
    }

    /// Start, restart or stop (`None`) the periodic refetch.
    pub fn set_auto_refresh(&self, every: Option<Duration>) {
        if let Some(worker) = self.inner.refresh_task.borrow_mut().take() {
            worker.stop();
        }
        let Some(every) = every else {
            return;
        };
        let weak: Weak<Inner<R, B>> = Rc::downgrade(&self.inner);
        let worker = Worker::spawn(move |stopped, busy| async move {
            let mut ticker = rt::time::interval(every);
            // The first tick fires immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if stopped.get() {
                    break;
                }
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                log::debug!("Auto-refreshing {}", R::COLLECTION);
                worker_fetch(&*inner, &busy).await;
                if stopped.get() {
                    break;
                }
            }
        });
        *self.inner.refresh_task.borrow_mut() = Some(worker);
    }

    /// Subscribe to (or leave) the table's change channel. Every event
    /// triggers a full refetch.
    pub fn set_realtime(&self, enabled: bool) {
        if let Some(worker) = self.inner.realtime_task.borrow_mut().take() {
            worker.stop();
        }
        if !enabled {
            return;
        }
        let backend = self.inner.backend.clone();
        let weak: Weak<Inner<R, B>> = Rc::downgrade(&self.inner);
        let worker = Worker::spawn(move |stopped, busy| async move {
            let mut events = match backend.subscribe(R::COLLECTION).await {
                Ok(events) => events,
                Err(e) => {
                    log::warn!("Realtime subscription to {} failed: {e}", R::COLLECTION);
                    return;
                }
            };
            drop(backend);
            while let Some(event) = events.next().await {
                if stopped.get() {
                    break;
                }
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                if event.table != R::COLLECTION {
                    continue;
                }
                log::debug!("{:?} on {} {}, refetching", event.kind, event.table, event.record_id);
                worker_fetch(&*inner, &busy).await;
                if stopped.get() {
                    break;
                }
            }
        });
        *self.inner.realtime_task.borrow_mut() = Some(worker);
    }
}

impl<R, B> Drop for RemoteCollection<R, B> {
    fn drop(&mut self) {
        if let Some(worker) = self.inner.refresh_task.borrow_mut().take() {
            worker.stop();
        }
        if let Some(worker) = self.inner.realtime_task.borrow_mut().take() {
            worker.stop();
        }
    }
}

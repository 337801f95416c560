use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::{Result, StorylineError};
use crate::config::Config;
use crate::domain::Session;
use crate::gateway::{HttpGateway, ListQuery, StoryGateway};
use crate::session::SessionStore;
use crate::store::{LocalStore, SqliteStore, Store};
use crate::sync::{BookmarkService, StoryQuery};

pub struct AppContext {
    pub config: Config,
    pub store: LocalStore,
    pub gateway: Arc<dyn StoryGateway + Send + Sync>,
    pub query: StoryQuery,
    pub bookmarks: BookmarkService,
    pub sessions: SessionStore,
    pub session: Option<Session>,
}

impl AppContext {
    /// Open the on-disk store, restore the saved session and build an
    /// HTTP gateway that carries it.
    pub fn new(config: Config) -> Result<Self> {
        let db_path = match config.storage.database_path.clone() {
            Some(p) => p,
            None => Self::default_db_path()?,
        };
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let sessions = SessionStore::new(SessionStore::default_path()?);
        let session = sessions.load();
        let gateway: Arc<dyn StoryGateway + Send + Sync> =
            Arc::new(HttpGateway::from_config(&config.api, session.clone())?);
        let store: Arc<dyn Store + Send + Sync> = Arc::new(SqliteStore::new(&db_path)?);

        Ok(Self::with_parts(config, store, gateway, sessions, session))
    }

    pub fn with_parts(
        config: Config,
        store: Arc<dyn Store + Send + Sync>,
        gateway: Arc<dyn StoryGateway + Send + Sync>,
        sessions: SessionStore,
        session: Option<Session>,
    ) -> Self {
        let local = LocalStore::new(store.clone());
        let query =
            StoryQuery::with_timeout(gateway.clone(), local.clone(), config.api.network_timeout());
        let bookmarks = BookmarkService::new(store);

        if config.storage.sweep_on_start {
            local.clear_non_bookmarked();
        }

        Self {
            config,
            store: local,
            gateway,
            query,
            bookmarks,
            sessions,
            session,
        }
    }

    pub fn require_session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or(StorylineError::NotAuthenticated)
    }

    /// First page of the main list, sized from config.
    pub fn default_list_query(&self) -> ListQuery {
        ListQuery::with_size(self.config.api.page_size)
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| StorylineError::Config("Could not find data directory".into()))?;
        Ok(data_dir.join("storyline").join("storyline.db"))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::gateway::testing::FakeGateway;

    /// Context over an in-memory store and a fake API, with the session
    /// file under `dir`.
    pub fn context(
        dir: &std::path::Path,
        gateway: Arc<FakeGateway>,
        session: Option<Session>,
    ) -> AppContext {
        let store: Arc<dyn Store + Send + Sync> = Arc::new(SqliteStore::in_memory().unwrap());
        AppContext::with_parts(
            Config::default(),
            store,
            gateway,
            SessionStore::new(dir.join("session.json")),
            session,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Story, StoryRecord};
    use crate::gateway::testing::FakeGateway;

    #[test]
    fn test_require_session() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = testing::context(dir.path(), Arc::new(FakeGateway::offline()), None);
        assert!(matches!(
            ctx.require_session(),
            Err(StorylineError::NotAuthenticated)
        ));

        let session = Session::new("u".into(), "Ann".into(), "t".into());
        let ctx = testing::context(dir.path(), Arc::new(FakeGateway::offline()), Some(session));
        assert_eq!(ctx.require_session().unwrap().name, "Ann");
    }

    #[test]
    fn test_sweep_on_start() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        store.put(&StoryRecord::new(Story::new("a"), true)).unwrap();
        store.put(&StoryRecord::new(Story::new("b"), false)).unwrap();

        let mut config = Config::default();
        config.storage.sweep_on_start = true;
        let dir = tempfile::tempdir().unwrap();
        let ctx = AppContext::with_parts(
            config,
            store,
            Arc::new(FakeGateway::offline()),
            SessionStore::new(dir.path().join("session.json")),
            None,
        );

        assert_eq!(ctx.store.count(), 1);
    }

    #[test]
    fn test_default_list_query_uses_page_size() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = testing::context(dir.path(), Arc::new(FakeGateway::offline()), None);
        ctx.config.api.page_size = 7;
        assert_eq!(ctx.default_list_query().size, 7);
    }
}

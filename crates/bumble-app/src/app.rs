//! Application controller.

use bumble_core::{Account, ImageItem, LikeKind, RepoConfig};
use bumble_storage::{PersistenceGateway, StorageResult, UploadFile, UploadTally};
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::feed::{Feed, FeedState};
use crate::likes::LikeBook;
use crate::session;

/// Raw values from the settings form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsForm {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub token: String,
}

impl From<&RepoConfig> for SettingsForm {
    fn from(config: &RepoConfig) -> Self {
        SettingsForm {
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            branch: config.branch().to_string(),
            token: config.token.clone(),
        }
    }
}

/// A feed load in flight.
///
/// Only the most recently started load may replace the feed; older ones are
/// discarded when they complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedLoad {
    ticket: u64,
    account: Account,
}

impl FeedLoad {
    /// Account whose images are being listed.
    pub fn account(&self) -> Account {
        self.account
    }

    /// Fetch the listing without borrowing the controller.
    pub async fn fetch(&self, gateway: &PersistenceGateway) -> StorageResult<Vec<ImageItem>> {
        gateway.list(self.account).await
    }
}

/// Owner of all in-memory application state.
pub struct App {
    gateway: Arc<PersistenceGateway>,
    likes: LikeBook,
    me: Option<Account>,
    feed: Feed,
    latest_load: u64,
}

impl App {
    pub fn new(gateway: Arc<PersistenceGateway>) -> Self {
        let likes = LikeBook::new(gateway.kv().clone());
        App {
            gateway,
            likes,
            me: None,
            feed: Feed::empty(),
            latest_load: 0,
        }
    }

    pub fn gateway(&self) -> &Arc<PersistenceGateway> {
        &self.gateway
    }

    pub fn me(&self) -> Option<Account> {
        self.me
    }

    /// The account whose images this user swipes through.
    pub fn other(&self) -> Option<Account> {
        self.me.map(Account::other)
    }

    pub fn feed(&self) -> &Feed {
        &self.feed
    }

    pub fn current(&self) -> Option<&ImageItem> {
        self.feed.current()
    }

    /// Restore a persisted session without touching the feed.
    pub async fn restore_session(&mut self) -> AppResult<Option<Account>> {
        let restored = session::load(self.gateway.kv().as_ref()).await?;
        if let Some(session) = restored {
            tracing::info!(account = %session.me, "Session restored");
            self.me = Some(session.me);
        }
        Ok(self.me)
    }

    /// Restore a persisted session and load its feed. Returns the restored account.
    pub async fn boot(&mut self) -> AppResult<Option<Account>> {
        let restored = self.restore_session().await?;
        if restored.is_some() {
            self.load_feed().await;
        }
        Ok(restored)
    }

    pub async fn login(&mut self, username: &str, password: &str) -> AppResult<Account> {
        let account = Account::authenticate(username, password).ok_or_else(|| {
            tracing::warn!(username = %username.trim(), "Login rejected");
            AppError::InvalidCredentials
        })?;
        session::start(self.gateway.kv().as_ref(), account).await?;
        self.me = Some(account);
        tracing::info!(account = %account, "Logged in");
        self.load_feed().await;
        Ok(account)
    }

    pub async fn logout(&mut self) -> AppResult<()> {
        session::clear(self.gateway.kv().as_ref()).await?;
        if let Some(account) = self.me.take() {
            tracing::info!(account = %account, "Logged out");
        }
        self.feed = Feed::empty();
        // Anything still loading belongs to the old session.
        self.latest_load += 1;
        Ok(())
    }

    /// Start a feed load for the other account. `None` when logged out.
    pub fn begin_feed_load(&mut self) -> Option<FeedLoad> {
        let account = self.other()?;
        self.latest_load += 1;
        Some(FeedLoad {
            ticket: self.latest_load,
            account,
        })
    }

    /// Apply a finished load if it is still the latest one.
    ///
    /// Listing errors degrade to an empty feed. Returns whether the feed was
    /// replaced.
    pub fn finish_feed_load(
        &mut self,
        load: FeedLoad,
        result: StorageResult<Vec<ImageItem>>,
    ) -> bool {
        if load.ticket != self.latest_load {
            tracing::debug!(
                ticket = load.ticket,
                latest = self.latest_load,
                "Discarding stale feed load"
            );
            return false;
        }
        let items = match result {
            Ok(items) => items,
            Err(e) => {
                tracing::error!(error = %e, account = %load.account, "Failed to load feed");
                Vec::new()
            }
        };
        tracing::info!(account = %load.account, count = items.len(), "Feed loaded");
        self.feed = Feed::new(load.account, items);
        true
    }

    /// List the other account's images and replace the feed.
    pub async fn load_feed(&mut self) -> FeedState {
        let Some(load) = self.begin_feed_load() else {
            return self.feed.state();
        };
        let result = load.fetch(&self.gateway).await;
        self.finish_feed_load(load, result);
        self.feed.state()
    }

    /// Skip the current item.
    pub fn next(&mut self) -> FeedState {
        self.feed.advance()
    }

    pub async fn like_current(&mut self) -> AppResult<Option<ImageItem>> {
        self.react(LikeKind::Like).await
    }

    pub async fn super_like_current(&mut self) -> AppResult<Option<ImageItem>> {
        self.react(LikeKind::SuperLike).await
    }

    /// Record the current item into `kind`'s set and advance. Outside
    /// `Browsing` nothing happens and `None` is returned. The cursor advances
    /// even when recording fails.
    async fn react(&mut self, kind: LikeKind) -> AppResult<Option<ImageItem>> {
        let me = self.me.ok_or(AppError::NotLoggedIn)?;
        let FeedState::Browsing { cursor } = self.feed.state() else {
            return Ok(None);
        };
        let Some(item) = self.feed.current().cloned() else {
            return Ok(None);
        };

        let recorded = self.likes.record(me, kind, item.reference()).await;
        self.feed.advance();
        let added = recorded?;
        tracing::info!(
            account = %me,
            kind = %kind,
            cursor = cursor,
            newly_added = added,
            "Reaction recorded"
        );
        Ok(Some(item))
    }

    pub async fn likes(&self, kind: LikeKind) -> AppResult<Vec<String>> {
        let me = self.me.ok_or(AppError::NotLoggedIn)?;
        Ok(self.likes.list(me, kind).await?)
    }

    pub async fn settings(&self) -> AppResult<RepoConfig> {
        Ok(self.gateway.repo_config().await?)
    }

    /// Persist the settings form and reload the feed against the new backend.
    pub async fn save_settings(&mut self, form: &SettingsForm) -> AppResult<RepoConfig> {
        let config = RepoConfig::from_form(&form.owner, &form.repo, &form.branch, &form.token);
        self.gateway.set_repo_config(&config).await?;
        self.load_feed().await;
        Ok(config)
    }

    /// Upload `files` into this account's namespace, one at a time.
    pub async fn upload(&mut self, files: &[UploadFile]) -> AppResult<UploadTally> {
        let me = self.me.ok_or(AppError::NotLoggedIn)?;
        if files.is_empty() {
            return Err(AppError::NoFiles);
        }
        Ok(self.gateway.save_batch(me, files).await?)
    }

    /// Upload files from disk, reading each one only when its turn comes.
    pub async fn upload_paths(&mut self, paths: &[PathBuf]) -> AppResult<UploadTally> {
        let me = self.me.ok_or(AppError::NotLoggedIn)?;
        if paths.is_empty() {
            return Err(AppError::NoFiles);
        }
        Ok(self.gateway.save_paths(me, paths).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumble_core::constants::SESSION_KEY;
    use bumble_core::CompressionConfig;
    use bumble_storage::{KeyValueStore, MemoryStore, StorageError};

    const DEAD_API: &str = "http://127.0.0.1:9";

    fn app_with(kv: Arc<MemoryStore>, api_url: &str) -> App {
        let gateway = PersistenceGateway::with_client(
            kv,
            reqwest::Client::new(),
            api_url,
            &CompressionConfig::default(),
            None,
        );
        App::new(Arc::new(gateway))
    }

    fn app() -> App {
        app_with(Arc::new(MemoryStore::new()), DEAD_API)
    }

    fn remote(i: usize) -> ImageItem {
        ImageItem::Remote {
            url: format!("https://raw.example/{i}.png"),
        }
    }

    /// `hardik` logged in, with `n` of ananya's images saved locally.
    async fn browsing_app(n: usize) -> App {
        let mut app = app();
        app.login("ananya", "ilovehardik").await.unwrap();
        let files: Vec<UploadFile> = (0..n)
            .map(|i| UploadFile::new(format!("{i}.png"), vec![i as u8]))
            .collect();
        if n > 0 {
            app.upload(&files).await.unwrap();
        }
        app.logout().await.unwrap();
        app.login("hardik", "iloveananya").await.unwrap();
        app
    }

    #[tokio::test]
    async fn login_persists_session_and_loads_other_feed() {
        let kv = Arc::new(MemoryStore::new());
        let mut app = app_with(kv.clone(), DEAD_API);

        let account = app.login(" Hardik ", "iloveananya").await.unwrap();
        assert_eq!(account, Account::Hardik);
        assert_eq!(app.other(), Some(Account::Ananya));
        assert_eq!(app.feed().owner(), Some(Account::Ananya));
        assert_eq!(app.feed().state(), FeedState::Empty);
        assert!(kv.get(SESSION_KEY).await.unwrap().is_some());

        // A fresh controller over the same store picks the session up.
        let mut restarted = app_with(kv, DEAD_API);
        assert_eq!(restarted.boot().await.unwrap(), Some(Account::Hardik));
    }

    #[tokio::test]
    async fn bad_credentials_are_rejected() {
        let mut app = app();
        assert!(matches!(
            app.login("hardik", "nope").await,
            Err(AppError::InvalidCredentials)
        ));
        assert_eq!(app.me(), None);
        assert_eq!(app.boot().await.unwrap(), None);
    }

    #[tokio::test]
    async fn logout_clears_session_and_feed() {
        let kv = Arc::new(MemoryStore::new());
        let mut app = app_with(kv.clone(), DEAD_API);
        app.login("ananya", "ilovehardik").await.unwrap();
        app.logout().await.unwrap();

        assert_eq!(app.me(), None);
        assert_eq!(app.feed(), &Feed::empty());
        assert_eq!(kv.get(SESSION_KEY).await.unwrap(), None);
        assert!(matches!(app.like_current().await, Err(AppError::NotLoggedIn)));
    }

    #[tokio::test]
    async fn like_records_and_advances_until_exhausted() {
        let mut app = browsing_app(2).await;
        assert_eq!(app.feed().state(), FeedState::Browsing { cursor: 0 });

        let first = app.like_current().await.unwrap().unwrap();
        assert_eq!(app.feed().state(), FeedState::Browsing { cursor: 1 });
        let second = app.super_like_current().await.unwrap().unwrap();
        assert_eq!(app.feed().state(), FeedState::Exhausted);

        assert_eq!(app.likes(LikeKind::Like).await.unwrap(), [first.reference()]);
        assert_eq!(
            app.likes(LikeKind::SuperLike).await.unwrap(),
            [second.reference()]
        );

        // Exhausted: reactions and next are no-ops.
        assert_eq!(app.like_current().await.unwrap(), None);
        assert_eq!(app.next(), FeedState::Exhausted);
        assert_eq!(app.feed().cursor(), 2);
        assert_eq!(app.likes(LikeKind::Like).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn liking_same_item_again_does_not_duplicate() {
        let mut app = browsing_app(1).await;
        let item = app.like_current().await.unwrap().unwrap();

        // Reload puts the same item back under the cursor.
        app.load_feed().await;
        assert_eq!(app.current(), Some(&item));
        app.like_current().await.unwrap();

        assert_eq!(app.likes(LikeKind::Like).await.unwrap(), [item.reference()]);
    }

    #[tokio::test]
    async fn next_skips_without_recording() {
        let mut app = browsing_app(2).await;
        assert_eq!(app.next(), FeedState::Browsing { cursor: 1 });
        assert!(app.likes(LikeKind::Like).await.unwrap().is_empty());
        assert_eq!(app.feed().len(), 2);
    }

    #[tokio::test]
    async fn stale_feed_load_is_discarded() {
        let mut app = app();
        app.login("hardik", "iloveananya").await.unwrap();

        let older = app.begin_feed_load().unwrap();
        let newer = app.begin_feed_load().unwrap();

        assert!(app.finish_feed_load(newer, Ok(vec![remote(1)])));
        assert!(!app.finish_feed_load(older, Ok(vec![remote(2), remote(3)])));
        assert_eq!(app.feed().items(), [remote(1)]);
    }

    #[tokio::test]
    async fn load_after_logout_is_discarded() {
        let mut app = app();
        app.login("hardik", "iloveananya").await.unwrap();
        let load = app.begin_feed_load().unwrap();
        app.logout().await.unwrap();

        assert!(!app.finish_feed_load(load, Ok(vec![remote(1)])));
        assert!(app.feed().is_empty());
        assert_eq!(app.begin_feed_load(), None);
    }

    #[tokio::test]
    async fn listing_error_degrades_to_empty_feed() {
        let mut app = browsing_app(1).await;
        let load = app.begin_feed_load().unwrap();
        let applied = app.finish_feed_load(load, Err(StorageError::RemoteList { status: 500 }));
        assert!(applied);
        assert_eq!(app.feed().state(), FeedState::Empty);
    }

    #[tokio::test]
    async fn broken_remote_config_yields_empty_feed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", mockito::Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let mut app = app_with(Arc::new(MemoryStore::new()), &server.url());
        app.login("hardik", "iloveananya").await.unwrap();
        let config = app
            .save_settings(&SettingsForm {
                owner: "octo".to_string(),
                repo: "photos".to_string(),
                branch: " ".to_string(),
                token: String::new(),
            })
            .await
            .unwrap();

        assert_eq!(config.branch, "main");
        assert_eq!(app.feed().state(), FeedState::Empty);
        assert_eq!(app.settings().await.unwrap(), config);
    }

    #[tokio::test]
    async fn settings_change_reloads_feed_from_remote() {
        let mut server = mockito::Server::new_async().await;
        let body = serde_json::json!([
            {"name": "1-a.png", "download_url": "https://raw.example/a.png"},
        ]);
        let mock = server
            .mock(
                "GET",
                mockito::Matcher::Regex(r"^/repos/octo/photos/contents/images%2Fananya".to_string()),
            )
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let mut app = app_with(Arc::new(MemoryStore::new()), &server.url());
        app.login("hardik", "iloveananya").await.unwrap();
        assert!(app.feed().is_empty());

        app.save_settings(&SettingsForm {
            owner: "octo".to_string(),
            repo: "photos".to_string(),
            ..SettingsForm::default()
        })
        .await
        .unwrap();

        mock.assert_async().await;
        assert_eq!(
            app.current().map(ImageItem::reference),
            Some("https://raw.example/a.png")
        );
    }

    #[tokio::test]
    async fn upload_requires_login_and_files() {
        let mut app = app();
        let file = UploadFile::new("a.png", vec![1]);
        assert!(matches!(
            app.upload(std::slice::from_ref(&file)).await,
            Err(AppError::NotLoggedIn)
        ));

        app.login("ananya", "ilovehardik").await.unwrap();
        assert!(matches!(app.upload(&[]).await, Err(AppError::NoFiles)));

        let tally = app.upload(&[file]).await.unwrap();
        assert_eq!((tally.ok, tally.fail), (1, 0));
    }

    #[tokio::test]
    async fn upload_paths_keeps_going_past_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.gif");
        std::fs::write(&good, b"GIF89a-good").unwrap();
        let missing = dir.path().join("missing.png");

        let kv = Arc::new(MemoryStore::new());
        let mut app = app_with(kv.clone(), DEAD_API);
        app.login("ananya", "ilovehardik").await.unwrap();
        let tally = app
            .upload_paths(&[good.clone(), missing, good])
            .await
            .unwrap();

        assert_eq!((tally.ok, tally.fail), (2, 1));
        let raw = kv.get("localImages_ananya").await.unwrap().unwrap();
        let stored: Vec<String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored.len(), 2);
        assert!(matches!(app.upload_paths(&[]).await, Err(AppError::NoFiles)));
    }

    #[tokio::test]
    async fn failed_like_still_advances() {
        let kv = Arc::new(MemoryStore::new());
        let mut app = app_with(kv.clone(), DEAD_API);
        app.login("ananya", "ilovehardik").await.unwrap();
        app.upload(&[UploadFile::new("a.png", vec![1]), UploadFile::new("b.png", vec![2])])
            .await
            .unwrap();
        app.logout().await.unwrap();
        app.login("hardik", "iloveananya").await.unwrap();
        kv.set("likes_hardik", "[broken".to_string()).await.unwrap();

        assert!(matches!(app.like_current().await, Err(AppError::Storage(_))));
        assert_eq!(app.feed().state(), FeedState::Browsing { cursor: 1 });
    }

    #[tokio::test]
    async fn restore_session_leaves_feed_alone() {
        let kv = Arc::new(MemoryStore::new());
        let mut app = app_with(kv.clone(), DEAD_API);
        app.login("hardik", "iloveananya").await.unwrap();

        let mut restarted = app_with(kv, DEAD_API);
        assert_eq!(restarted.restore_session().await.unwrap(), Some(Account::Hardik));
        assert_eq!(restarted.feed(), &Feed::empty());
        assert_eq!(restarted.feed().owner(), None);
    }

    #[test]
    fn settings_form_prefills_default_branch() {
        let form = SettingsForm::from(&RepoConfig {
            branch: String::new(),
            ..RepoConfig::default()
        });
        assert_eq!(form.branch, "main");
    }
}

//! 测试装配：内存传输、内存令牌、记录型导航器

use crate::api::ApiClient;
use crate::auth::TokenStore;
use crate::config::AppConfig;
use crate::events::EventBus;
use crate::notify::{Notice, NoticeLevel, Notifier};
use crate::web::http::mock::{MOCK_BASE, MockTransport};
use crate::web::navigate::RecordingNavigator;
use std::sync::Arc;
use std::time::Duration;

pub(crate) struct Harness {
    pub config: AppConfig,
    pub transport: Arc<MockTransport>,
    pub tokens: TokenStore,
    pub notifier: Notifier,
    pub navigator: Arc<RecordingNavigator>,
    pub events: EventBus,
    pub api: ApiClient,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_transport(MockTransport::new())
    }

    /// 传输层在回复前让出执行权，用于并发场景
    pub fn yielding() -> Self {
        Self::with_transport(MockTransport::yielding())
    }

    fn with_transport(transport: MockTransport) -> Self {
        let config = AppConfig::with_base_url(MOCK_BASE);
        let transport = Arc::new(transport);
        let tokens = TokenStore::memory(config.token_key.clone());
        let notifier = Notifier::new();
        let navigator = Arc::new(RecordingNavigator::at("/video/42"));
        let api = ApiClient::new(config.clone(), transport.clone(), tokens.clone(), notifier);
        api.set_navigator(navigator.clone());

        Self {
            config,
            transport,
            tokens,
            notifier,
            navigator,
            events: EventBus::new(),
            api,
        }
    }

    pub fn with_token(self, token: &str) -> Self {
        self.tokens.set(token, Duration::from_secs(3600), true);
        self
    }

    pub fn notice(&self) -> Option<Notice> {
        self.notifier.current_untracked()
    }

    pub fn notice_is(&self, level: NoticeLevel, message: &str) -> bool {
        self.notice()
            .is_some_and(|n| n.level == level && n.message == message)
    }
}

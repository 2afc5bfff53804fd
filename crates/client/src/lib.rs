pub mod api;
pub mod bus;
pub mod cache;
pub mod clock;
pub mod config;
pub mod http;
pub mod navigate;
pub mod notify;
pub mod realtime;
pub mod service;
pub mod session;
pub mod sse;
pub mod storage;
pub mod telemetry;

pub use bus::EventBus;
pub use clock::{Clock, ManualClock, SystemClock};
pub use http::{ApiRequest, ApiResponse, HttpClient};
pub use navigate::{Navigator, RecordingNavigator, Route};
pub use notify::{Notice, NoticeLevel, Notifier, RecordingNotifier};
pub use realtime::{ListenerStatus, RealtimeListener, ReconnectPolicy};
pub use service::{SchoolClient, SchoolClientBuilder};
pub use session::Session;
pub use storage::{KeyValueStore, MemoryStore};

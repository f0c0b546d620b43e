//! Routes realtime events to dashboard refresh callbacks

use std::sync::{Arc, RwLock};

use serde_json::Value;
use tokio::sync::broadcast;
use tracing::trace;

use super::event::RealtimeEvent;

/// Page regions an event can refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    HelpRequests,
    ActivityFeed,
    OnlineUsers,
    OnlineCount,
}

impl EventCategory {
    /// Category refreshed by `event`, if any
    pub fn for_event(event: &RealtimeEvent) -> Option<Self> {
        match event {
            RealtimeEvent::HelpRequest(_) | RealtimeEvent::HelpRequestUpdate(_) => {
                Some(Self::HelpRequests)
            }
            RealtimeEvent::Activity(_) => Some(Self::ActivityFeed),
            RealtimeEvent::OnlineUsers(_) => Some(Self::OnlineUsers),
            RealtimeEvent::Login(_) | RealtimeEvent::Logout(_) => Some(Self::OnlineCount),
            RealtimeEvent::Connected(_) | RealtimeEvent::Heartbeat | RealtimeEvent::Other { .. } => {
                None
            }
        }
    }
}

type Refresh = Arc<dyn Fn() + Send + Sync>;
type RefreshWith = Arc<dyn Fn(&Value) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    help_requests: Vec<Refresh>,
    activity: Vec<RefreshWith>,
    online_users: Vec<RefreshWith>,
    online_count: Vec<Refresh>,
}

/// Fans events out to whichever refresh callbacks the page registered
///
/// A category with no callbacks is skipped. Every event, handled or not, is
/// also broadcast to [`EventDispatcher::subscribe`] receivers.
pub struct EventDispatcher {
    listeners: RwLock<Listeners>,
    tx: broadcast::Sender<RealtimeEvent>,
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new(64)
    }
}

impl EventDispatcher {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            listeners: RwLock::new(Listeners::default()),
            tx,
        }
    }

    /// Help-request list refresh, for `help_request` and `help_request_update`
    pub fn on_help_requests(&self, refresh: impl Fn() + Send + Sync + 'static) {
        self.write().help_requests.push(Arc::new(refresh));
    }

    /// Activity feed refresh, given the event payload
    pub fn on_activity(&self, refresh: impl Fn(&Value) + Send + Sync + 'static) {
        self.write().activity.push(Arc::new(refresh));
    }

    /// Online-user list refresh, given the event payload
    pub fn on_online_users(&self, refresh: impl Fn(&Value) + Send + Sync + 'static) {
        self.write().online_users.push(Arc::new(refresh));
    }

    /// Online-count refresh, for `login` and `logout`
    pub fn on_online_count(&self, refresh: impl Fn() + Send + Sync + 'static) {
        self.write().online_count.push(Arc::new(refresh));
    }

    pub fn listener_count(&self, category: EventCategory) -> usize {
        let listeners = self.read();
        match category {
            EventCategory::HelpRequests => listeners.help_requests.len(),
            EventCategory::ActivityFeed => listeners.activity.len(),
            EventCategory::OnlineUsers => listeners.online_users.len(),
            EventCategory::OnlineCount => listeners.online_count.len(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.tx.subscribe()
    }

    /// Run the callbacks for `event`; returns how many ran
    pub fn dispatch(&self, event: &RealtimeEvent) -> usize {
        // No receivers is fine
        let _ = self.tx.send(event.clone());

        let Some(category) = EventCategory::for_event(event) else {
            trace!(event_type = event.type_name(), "No refresh for event");
            return 0;
        };

        // Snapshot so callbacks may register more listeners
        let listeners = self.read();
        let invoked = match event {
            RealtimeEvent::Activity(data) | RealtimeEvent::OnlineUsers(data) => {
                let callbacks = if category == EventCategory::ActivityFeed {
                    listeners.activity.clone()
                } else {
                    listeners.online_users.clone()
                };
                drop(listeners);
                callbacks.iter().for_each(|refresh| refresh(data));
                callbacks.len()
            }
            _ => {
                let callbacks = if category == EventCategory::HelpRequests {
                    listeners.help_requests.clone()
                } else {
                    listeners.online_count.clone()
                };
                drop(listeners);
                callbacks.iter().for_each(|refresh| refresh());
                callbacks.len()
            }
        };

        if invoked == 0 {
            trace!(?category, "Category not present on this page");
        }
        invoked
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Listeners> {
        self.listeners
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Listeners> {
        self.listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::Presence;
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        (count, move || {
            c.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn help_request_and_update_refresh_help_list() {
        let dispatcher = EventDispatcher::default();
        let (count, refresh) = counter();
        dispatcher.on_help_requests(refresh);

        dispatcher.dispatch(&RealtimeEvent::HelpRequest(json!({"id": 1})));
        dispatcher.dispatch(&RealtimeEvent::HelpRequestUpdate(json!({"id": 1})));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn activity_passes_payload() {
        let dispatcher = EventDispatcher::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        dispatcher.on_activity(move |data| s.lock().unwrap().push(data.clone()));

        let invoked = dispatcher.dispatch(&RealtimeEvent::Activity(json!({"user_id": "u1"})));
        assert_eq!(invoked, 1);
        assert_eq!(*seen.lock().unwrap(), vec![json!({"user_id": "u1"})]);
    }

    #[test]
    fn login_and_logout_refresh_count_only() {
        let dispatcher = EventDispatcher::default();
        let (count, refresh) = counter();
        let (users, refresh_users) = counter();
        dispatcher.on_online_count(refresh);
        dispatcher.on_online_users(move |_| refresh_users());

        dispatcher.dispatch(&RealtimeEvent::Login(Presence::default()));
        dispatcher.dispatch(&RealtimeEvent::Logout(Presence::default()));
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(users.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn missing_category_is_skipped() {
        let dispatcher = EventDispatcher::default();
        let invoked = dispatcher.dispatch(&RealtimeEvent::OnlineUsers(json!([])));
        assert_eq!(invoked, 0);
    }

    #[test]
    fn unknown_and_control_events_refresh_nothing() {
        let dispatcher = EventDispatcher::default();
        let (count, refresh) = counter();
        dispatcher.on_help_requests(refresh);

        dispatcher.dispatch(&RealtimeEvent::Heartbeat);
        dispatcher.dispatch(&RealtimeEvent::Connected(json!({"user_id": "u1"})));
        dispatcher.dispatch(&RealtimeEvent::Other {
            kind: "book_added".to_string(),
            data: Value::Null,
        });
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn callback_may_register_listener() {
        let dispatcher = Arc::new(EventDispatcher::default());
        let d = dispatcher.clone();
        dispatcher.on_help_requests(move || d.on_online_count(|| {}));

        dispatcher.dispatch(&RealtimeEvent::HelpRequest(Value::Null));
        assert_eq!(dispatcher.listener_count(EventCategory::OnlineCount), 1);
    }

    #[tokio::test]
    async fn subscribers_see_every_event() {
        let dispatcher = EventDispatcher::default();
        let mut rx = dispatcher.subscribe();

        dispatcher.dispatch(&RealtimeEvent::Heartbeat);
        assert_eq!(rx.recv().await.unwrap(), RealtimeEvent::Heartbeat);
    }
}

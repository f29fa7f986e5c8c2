use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

pub const BACK_LABEL: &str = "Back";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Popular,
    MovieDetail { id: i32 },
}

impl Route {
    pub fn movie_id(&self) -> Option<i32> {
        match self {
            Route::MovieDetail { id } => Some(*id),
            Route::Popular => None,
        }
    }

    /// Header shown until a screen supplies its own title.
    pub fn default_title(&self) -> &'static str {
        match self {
            Route::Popular => "Popular Movies",
            Route::MovieDetail { .. } => "Movie Details",
        }
    }
}

#[async_trait]
pub trait Navigator: Send + Sync {
    async fn navigate(&self, route: Route);
    /// Sets the header title of the screen showing `route`.
    async fn set_title(&self, route: Route, title: &str);
}

#[derive(Debug)]
struct Entry {
    route: Route,
    title: Option<String>,
}

/// Back-stack navigator. The root entry is never popped.
#[derive(Debug)]
pub struct StackNavigator {
    stack: Mutex<Vec<Entry>>,
}

impl StackNavigator {
    pub fn new(root: Route) -> Self {
        Self {
            stack: Mutex::new(vec![Entry { route: root, title: None }]),
        }
    }

    pub async fn current(&self) -> Route {
        let stack = self.stack.lock().await;
        stack.last().map(|e| e.route).unwrap_or(Route::Popular)
    }

    pub async fn title(&self) -> String {
        let stack = self.stack.lock().await;
        match stack.last() {
            Some(Entry { title: Some(t), .. }) if !t.is_empty() => t.clone(),
            Some(entry) => entry.route.default_title().to_string(),
            None => Route::Popular.default_title().to_string(),
        }
    }

    pub async fn depth(&self) -> usize {
        self.stack.lock().await.len()
    }

    pub async fn can_go_back(&self) -> bool {
        self.depth().await > 1
    }

    /// Pops the top entry. Returns the route now showing, or `None` at the root.
    pub async fn back(&self) -> Option<Route> {
        let mut stack = self.stack.lock().await;
        if stack.len() <= 1 {
            return None;
        }
        stack.pop();
        stack.last().map(|e| e.route)
    }
}

#[async_trait]
impl Navigator for StackNavigator {
    async fn navigate(&self, route: Route) {
        debug!(?route, "navigate");
        self.stack.lock().await.push(Entry { route, title: None });
    }

    async fn set_title(&self, route: Route, title: &str) {
        let mut stack = self.stack.lock().await;
        if let Some(entry) = stack.iter_mut().rev().find(|e| e.route == route) {
            entry.title = Some(title.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn push_title_and_back() {
        let nav = StackNavigator::new(Route::Popular);
        assert_eq!(nav.title().await, "Popular Movies");
        assert!(!nav.can_go_back().await);

        let detail = Route::MovieDetail { id: 42 };
        nav.navigate(detail).await;
        assert_eq!(nav.current().await, detail);
        assert_eq!(nav.title().await, "Movie Details");

        nav.set_title(detail, "Fight Club").await;
        assert_eq!(nav.title().await, "Fight Club");

        assert_eq!(nav.back().await, Some(Route::Popular));
        assert_eq!(nav.back().await, None);
        assert_eq!(nav.depth().await, 1);
    }

    #[tokio::test]
    async fn title_for_popped_route_is_ignored() {
        let nav = StackNavigator::new(Route::Popular);
        nav.navigate(Route::MovieDetail { id: 1 }).await;
        nav.back().await;
        nav.set_title(Route::MovieDetail { id: 1 }, "Gone").await;
        assert_eq!(nav.title().await, "Popular Movies");
    }
}

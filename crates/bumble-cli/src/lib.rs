use bumble_app::FeedState;
use bumble_core::ImageItem;

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// One-line rendering of an item. Data URLs are cut short.
pub fn describe_item(item: &ImageItem) -> String {
    match item {
        ImageItem::Remote { url } => url.clone(),
        ImageItem::Local { data_url } => truncate_string(data_url, 64),
    }
}

pub fn describe_state(state: FeedState, len: usize) -> String {
    match state {
        FeedState::Empty => "No images yet.".to_string(),
        FeedState::Browsing { cursor } => format!("Image {} of {}", cursor + 1, len),
        FeedState::Exhausted => "You're all caught up.".to_string(),
    }
}

/// Initialize tracing for the CLI. Logs go to stderr so stdout stays clean.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_string_short() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("", 5), "");
    }

    #[test]
    fn truncate_string_long() {
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("abc", 2), "...");
    }

    #[test]
    fn truncate_string_counts_chars() {
        assert_eq!(truncate_string("héllo wörld", 8), "héllo...");
    }

    #[test]
    fn local_items_are_shortened() {
        let local = ImageItem::Local {
            data_url: format!("data:image/png;base64,{}", "A".repeat(500)),
        };
        let line = describe_item(&local);
        assert_eq!(line.chars().count(), 64);
        assert!(line.starts_with("data:image/png;base64,"));

        let remote = ImageItem::Remote {
            url: "https://raw.example/a.png".to_string(),
        };
        assert_eq!(describe_item(&remote), "https://raw.example/a.png");
    }

    #[test]
    fn states_read_naturally() {
        assert_eq!(describe_state(FeedState::Empty, 0), "No images yet.");
        assert_eq!(describe_state(FeedState::Browsing { cursor: 0 }, 3), "Image 1 of 3");
        assert_eq!(describe_state(FeedState::Exhausted, 3), "You're all caught up.");
    }
}

//! Per-site markup knowledge as plain data.
//!
//! Discovery, extraction and the sign-in probe are generic; a [`SiteProfile`]
//! tells them which selectors and URL rules apply to one target site.

/// Selectors and URL rules for one target site.
#[derive(Debug, Clone)]
pub struct SiteProfile {
    pub identity: &'static str,
    pub display_name: &'static str,
    pub entry_url: &'static str,
    /// Application root; never a conversation (with or without trailing slash).
    pub app_root: &'static str,
    /// Present only when the session is signed out.
    pub sign_in_selector: &'static str,

    /// Buttons that open the conversation sidebar, tried in order.
    pub sidebar_toggle_selectors: &'static [&'static str],
    /// Links that point at conversations.
    pub chat_link_selector: &'static str,
    /// Known scrollable list containers, tried in order.
    pub scroll_container_selectors: &'static [&'static str],
    /// Root scanned for any scrollable descendant when no known container matches.
    pub scroll_scan_root: &'static str,
    /// Minimum overflow (px) for a scanned element to count as scrollable.
    pub scroll_margin_px: u32,
    /// Href fragments of links that are not conversations.
    pub excluded_fragments: &'static [&'static str],

    /// Candidate scrollable message containers, tried in order.
    pub message_container_selectors: &'static [&'static str],
    /// One-element-per-turn containers.
    pub turn_selector: &'static str,
    /// Tag or class fragments that mark a turn element as human-authored.
    pub human_turn_markers: &'static [&'static str],
    /// Descendant that marks a turn element as human-authored.
    pub human_marker_selector: &'static str,
    /// Human query regions.
    pub query_selector: &'static str,
    /// Assistant response regions.
    pub response_selector: &'static str,
    /// Explicit author-role data attribute.
    pub role_attribute: &'static str,
    /// Best-guess conversation containers for the structural fallback.
    pub structural_container_selectors: &'static [&'static str],
}

impl SiteProfile {
    pub fn gemini() -> Self {
        Self {
            identity: "gemini",
            display_name: "Google Gemini",
            entry_url: "https://gemini.google.com/app",
            app_root: "https://gemini.google.com/app",
            sign_in_selector: r#"a[href*="accounts.google.com/ServiceLogin"], a[href*="accounts.google.com/signin"]"#,

            sidebar_toggle_selectors: &[
                r#"button[data-test-id="side-nav-menu-button"]"#,
                r#"button[aria-label="Main menu"]"#,
                "bard-sidenav-toggle button",
            ],
            chat_link_selector: r#"a[href*="/app/"]"#,
            scroll_container_selectors: &[
                "infinite-scroller.conversations-container",
                ".conversations-container",
                "bard-sidenav .mat-drawer-inner-container",
                r#"side-navigation-content [class*="scroll"]"#,
            ],
            scroll_scan_root: "bard-sidenav, side-navigation-v2, nav",
            scroll_margin_px: 20,
            excluded_fragments: &["/download", "/settings", "/extensions", "myaccount.google.com"],

            message_container_selectors: &[
                "infinite-scroller.chat-history",
                ".chat-history-scroll-container",
                "chat-window .chat-history",
            ],
            turn_selector: "user-query, model-response",
            human_turn_markers: &["user-query", "query-container", "user-message"],
            human_marker_selector: "user-query, .user-query-container, .query-text",
            query_selector: ".query-text, .user-query-bubble-with-background",
            response_selector: ".model-response-text, message-content",
            role_attribute: "data-message-author-role",
            // `.conversation-container` wraps a single exchange; take its parent.
            structural_container_selectors: &[
                "infinite-scroller.chat-history",
                ".chat-history-scroll-container",
                "chat-window .chat-history",
                "chat-window",
                "main",
            ],
        }
    }

    pub fn chatgpt() -> Self {
        Self {
            identity: "chatgpt",
            display_name: "ChatGPT",
            entry_url: "https://chatgpt.com/",
            app_root: "https://chatgpt.com",
            sign_in_selector: r#"button[data-testid="login-button"]"#,

            sidebar_toggle_selectors: &[
                r#"button[data-testid="open-sidebar-button"]"#,
                r#"button[aria-label="Open sidebar"]"#,
            ],
            chat_link_selector: r#"a[href*="/c/"]"#,
            scroll_container_selectors: &[
                r#"nav [class*="overflow-y-auto"]"#,
                "#history",
                "nav",
            ],
            scroll_scan_root: "nav",
            scroll_margin_px: 20,
            excluded_fragments: &["/download", "/settings", "/extensions", "auth.openai.com"],

            message_container_selectors: &[
                r#"main [class*="overflow-y-auto"]"#,
                r#"main [role="presentation"]"#,
            ],
            turn_selector: r#"article[data-testid^="conversation-turn"]"#,
            human_turn_markers: &["user-turn", "user-message"],
            human_marker_selector: r#"[data-message-author-role="user"]"#,
            query_selector: r#"[data-message-author-role="user"] .whitespace-pre-wrap"#,
            response_selector: r#"[data-message-author-role="assistant"] .markdown"#,
            role_attribute: "data-message-author-role",
            structural_container_selectors: &[r#"main [role="presentation"]"#, "main"],
        }
    }

    /// Whether `href` is the bare application root.
    pub fn is_app_root(&self, href: &str) -> bool {
        href.trim().trim_end_matches('/') == self.app_root.trim_end_matches('/')
    }

    /// Whether `href` points at a known non-conversation page.
    pub fn is_excluded(&self, href: &str) -> bool {
        self.excluded_fragments
            .iter()
            .any(|fragment| href.contains(fragment))
    }
}

//! Platform definitions
//!
//! Each supported chat site is described by a static [`PlatformSpec`] of raw
//! selector strings. [`PlatformSpec::compile`] turns it into a [`Platform`]
//! with parsed selector lists.

use serde::{Deserialize, Serialize};
use turnwin_css::SelectorList;

/// Supported chat platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformId {
    ChatGpt,
    Claude,
    Grok,
    AiStudio,
}

impl PlatformId {
    pub const ALL: [PlatformId; 4] = [Self::ChatGpt, Self::Claude, Self::Grok, Self::AiStudio];

    /// Key used in `enabledSites`
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ChatGpt => "chatgpt",
            Self::Claude => "claude",
            Self::Grok => "grok",
            Self::AiStudio => "aistudio",
        }
    }
}

impl std::fmt::Display for PlatformId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How candidate message elements are validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationPolicy {
    /// Text-length and loading-placeholder checks
    Default,
    /// Role-tagged prompt containers with chunked content (AI Studio)
    RoleContainer,
}

/// Raw platform description
#[derive(Debug, Clone, Copy)]
pub struct PlatformSpec {
    pub id: PlatformId,
    pub display_name: &'static str,
    pub assistant_label: &'static str,
    pub domains: &'static [&'static str],
    pub messages: &'static [&'static str],
    pub turns: &'static [&'static str],
    pub containers: &'static [&'static str],
    pub protected: &'static [&'static str],
    pub lazy: &'static [&'static str],
    pub user_markers: &'static [&'static str],
    pub assistant_markers: &'static [&'static str],
    pub validation: ValidationPolicy,
    /// Locate individual messages instead of whole turns
    pub message_level: bool,
}

/// Compiled selectors for one platform
#[derive(Debug, Clone)]
pub struct PlatformSelectors {
    pub message: SelectorList,
    pub turn: Option<SelectorList>,
    /// Tried in order; each entry is one clause
    pub chat_container: Vec<SelectorList>,
    pub protected: SelectorList,
    pub lazy: Option<SelectorList>,
    pub user_markers: Option<SelectorList>,
    pub assistant_markers: Option<SelectorList>,
}

/// Compiled platform
#[derive(Debug, Clone)]
pub struct Platform {
    pub id: PlatformId,
    pub display_name: &'static str,
    pub assistant_label: &'static str,
    pub domains: &'static [&'static str],
    pub selectors: PlatformSelectors,
    pub validation: ValidationPolicy,
    pub message_level: bool,
}

impl Platform {
    /// Selector used to locate messages
    pub fn locate_selector(&self) -> &SelectorList {
        match (&self.selectors.turn, self.message_level) {
            (Some(turn), false) => turn,
            _ => &self.selectors.message,
        }
    }

    /// Does the hostname belong to this platform?
    pub fn matches_host(&self, hostname: &str) -> bool {
        self.domains.iter().any(|d| hostname.contains(d))
    }
}

impl PlatformSpec {
    pub fn compile(&self) -> Platform {
        Platform {
            id: self.id,
            display_name: self.display_name,
            assistant_label: self.assistant_label,
            domains: self.domains,
            selectors: PlatformSelectors {
                message: compile_union(self.id, self.messages),
                turn: compile_optional(self.id, self.turns),
                chat_container: self
                    .containers
                    .iter()
                    .filter_map(|s| compile_clause(self.id, s))
                    .collect(),
                protected: compile_union(self.id, self.protected),
                lazy: compile_optional(self.id, self.lazy),
                user_markers: compile_optional(self.id, self.user_markers),
                assistant_markers: compile_optional(self.id, self.assistant_markers),
            },
            validation: self.validation,
            message_level: self.message_level,
        }
    }
}

/// Parse one clause. A clause the engine cannot parse is logged and skipped
/// so the rest of the platform keeps working.
fn compile_clause(id: PlatformId, clause: &str) -> Option<SelectorList> {
    match SelectorList::parse(clause) {
        Ok(list) => Some(list),
        Err(e) => {
            tracing::warn!(platform = %id, selector = clause, "skipping selector: {}", e);
            None
        }
    }
}

fn compile_union(id: PlatformId, clauses: &[&str]) -> SelectorList {
    let lists: Vec<_> = clauses.iter().filter_map(|c| compile_clause(id, c)).collect();
    SelectorList::union(&lists)
}

fn compile_optional(id: PlatformId, clauses: &[&str]) -> Option<SelectorList> {
    Some(compile_union(id, clauses)).filter(|list| !list.is_empty())
}

const TEXT_INPUTS: &str = r#"form, input, textarea, [contenteditable="true"], [role="textbox"]"#;

pub const CHATGPT: PlatformSpec = PlatformSpec {
    id: PlatformId::ChatGpt,
    display_name: "ChatGPT",
    assistant_label: "ChatGPT",
    domains: &["chat.openai.com", "chatgpt.com"],
    messages: &[
        r#"article[data-testid*="conversation-turn"]:not([data-testid*="input"]):not([data-testid*="form"])"#,
        r#"[data-testid*="conversation-turn"]:not([data-testid*="input"]):not([data-testid*="form"])"#,
        "article[data-turn-id]",
    ],
    turns: &[],
    containers: &[
        r#"[data-testid="conversation-turn"]"#,
        r#"main [role="main"]"#,
        ".conversation",
    ],
    protected: &[TEXT_INPUTS],
    lazy: &[],
    user_markers: &[r#"[data-message-author-role="user"]"#, r#"[data-testid*="user"]"#],
    assistant_markers: &[r#"[data-message-author-role="assistant"]"#],
    validation: ValidationPolicy::Default,
    message_level: false,
};

pub const CLAUDE: PlatformSpec = PlatformSpec {
    id: PlatformId::Claude,
    display_name: "Claude",
    assistant_label: "Claude",
    domains: &["claude.ai"],
    messages: &[
        r#"div.group.relative:has([data-testid="user-message"])"#,
        "div.group.relative:has(.font-claude-response)",
        "div.group.relative:has(.prose)",
        "main div.group.relative",
    ],
    turns: &["[data-test-render-count] > div", "main div.group.relative"],
    containers: &[r#"[data-testid="conversation"]"#, "main", ".flex.flex-col.gap-3"],
    protected: &[TEXT_INPUTS, ".composer"],
    lazy: &[],
    user_markers: &[r#"[data-testid="user-message"]"#, ".human-message"],
    assistant_markers: &[".font-claude-response"],
    validation: ValidationPolicy::Default,
    message_level: false,
};

pub const GROK: PlatformSpec = PlatformSpec {
    id: PlatformId::Grok,
    display_name: "Grok (X AI)",
    assistant_label: "Grok",
    domains: &["grok.com"],
    messages: &[
        r#"[data-testid*="conversation-turn"]"#,
        ".conversation-turn",
        ".message-pair",
        ".chat-message",
        r#"[class*="message"]"#,
        r#"[class*="turn"]"#,
    ],
    turns: &[],
    containers: &[
        r#"[data-testid="conversation"]"#,
        ".conversation-container",
        ".chat-container",
        "main .container",
        "main",
        ".main-content",
    ],
    protected: &[
        r#"form, input, textarea, [contenteditable="true"], .compose-area, .composer, [role="textbox"], .input-area"#,
    ],
    lazy: &[],
    user_markers: &[],
    assistant_markers: &[],
    validation: ValidationPolicy::Default,
    message_level: false,
};

pub const AISTUDIO: PlatformSpec = PlatformSpec {
    id: PlatformId::AiStudio,
    display_name: "Google AI Studio",
    assistant_label: "Model",
    domains: &["aistudio.google.com"],
    messages: &[
        r#".user-prompt-container[data-turn-role="User"]"#,
        r#".model-prompt-container[data-turn-role="Model"]"#,
    ],
    turns: &[r#"ms-chat-turn[id^="turn-"]"#],
    containers: &["ms-chat-conversation", ".chat-container", r#"[role="main"]"#, "body"],
    protected: &[
        TEXT_INPUTS,
        ".input-container, .compose-area, button, .actions-container",
    ],
    lazy: &["ms-chat-turn", ".chat-turn-container", ".ng-star-inserted"],
    user_markers: &[r#".user-prompt-container[data-turn-role="User"]"#],
    assistant_markers: &[r#".model-prompt-container[data-turn-role="Model"]"#],
    validation: ValidationPolicy::RoleContainer,
    message_level: true,
};

/// Built-in platforms, in detection order
pub const BUILTIN: [PlatformSpec; 4] = [CHATGPT, CLAUDE, GROK, AISTUDIO];

use crate::catalog::{find_best_match, CatalogSnapshot, MatchResult};
use crate::text::{contains_any, extract_hint};

/// Phrase lists that decide whether a command is a music request.
#[derive(Debug, Clone, Copy)]
pub struct CommandRules<'a> {
    /// Priority-ordered keywords that introduce a song name.
    pub hint_keywords: &'a [String],
    /// Phrases that request music without naming a song.
    pub generic_triggers: &'a [String],
}

/// What the router should do with a cleaned command.
#[derive(Debug, Clone, PartialEq)]
pub enum RoutePlan {
    /// Not a music command; another handler may take it.
    NotHandled,
    /// Play a local catalog entry.
    PlayLocal(MatchResult),
    /// A song was named but not found locally.
    ResolveHint(String),
    /// Generic request; resolve a title from the fallback playlist.
    ResolveFallback,
}

/// Pure routing decision for cleaned command text.
///
/// `catalog` is `None` when the music root is unavailable; the hint branch is
/// then skipped entirely and only generic trigger phrases are honoured.
pub fn plan_command(
    cleaned: &str,
    rules: CommandRules<'_>,
    catalog: Option<&CatalogSnapshot>,
) -> RoutePlan {
    if let Some(snapshot) = catalog {
        if let Some(hint) = extract_hint(cleaned, rules.hint_keywords) {
            return match find_best_match(&hint, snapshot) {
                Some(found) => RoutePlan::PlayLocal(found),
                None => RoutePlan::ResolveHint(hint),
            };
        }
    }

    if contains_any(cleaned, rules.generic_triggers) {
        RoutePlan::ResolveFallback
    } else {
        RoutePlan::NotHandled
    }
}

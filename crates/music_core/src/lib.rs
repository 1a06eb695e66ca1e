//! Music core: pure command parsing, fuzzy matching and routing decisions.
mod catalog;
mod plan;
mod similarity;
mod text;

pub use catalog::{base_name, find_best_match, CatalogSnapshot, MatchResult, MATCH_THRESHOLD};
pub use plan::{plan_command, CommandRules, RoutePlan};
pub use similarity::similarity_ratio;
pub use text::{clean_command_text, contains_any, extract_hint};

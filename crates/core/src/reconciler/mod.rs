//! Watch-list reconciliation.
//!
//! Joins the user's watch rules with the registry's series, then works out
//! which episodes of the matched series still have to be fetched. Output is
//! rebuilt from scratch on every call.

mod episodes;
mod matching;
mod offset;
mod rewrite;
mod rules;
mod types;

pub use episodes::{is_needed, select_needed_episodes, Reconciler};
pub use matching::match_watch_rules;
pub use offset::AirDateOffset;
pub use rewrite::TitleRewrite;
pub use rules::{RegexRule, SubtitlePolicy, TitleRegexes, WatchRule};
pub use types::{MatchedSeries, NeededEpisode};

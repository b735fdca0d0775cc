//! Autocomplete handlers for Discord slash command parameters.
//!
//! Suggestions are drawn from fixed vocabularies (payment statuses, editable
//! columns) or from the staff list in config.toml, so none of them touch the ledger.

use crate::{bot::Context, core::fields::editable_fields, entities::PaymentStatus};

/// Discord shows at most this many suggestions.
const MAX_SUGGESTIONS: usize = 25;

fn matching<'a, I>(options: I, partial: &str) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let partial_lower = partial.to_lowercase();
    options
        .into_iter()
        .filter(|option| option.to_lowercase().contains(&partial_lower))
        .map(ToString::to_string)
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// Provides autocomplete suggestions for payment statuses.
pub async fn autocomplete_payment_status(_ctx: Context<'_>, partial: &str) -> Vec<String> {
    matching(PaymentStatus::ALL.iter().map(|status| status.as_str()), partial)
}

/// Provides autocomplete suggestions for the column names `/edit` accepts.
pub async fn autocomplete_field_name(_ctx: Context<'_>, partial: &str) -> Vec<String> {
    matching(editable_fields(), partial)
}

/// Provides autocomplete suggestions for staff names from config.toml.
///
/// Whatever the user has typed is offered first, so names outside the list can
/// still be entered.
pub async fn autocomplete_staff(ctx: Context<'_>, partial: &str) -> Vec<String> {
    let names = &ctx.data().settings.staff.names;
    let mut suggestions = matching(names.iter().map(String::as_str), partial);
    suggestions.sort();

    let typed = partial.trim();
    if !typed.is_empty() && !suggestions.iter().any(|name| name.eq_ignore_ascii_case(typed)) {
        suggestions.insert(0, typed.to_string());
        suggestions.truncate(MAX_SUGGESTIONS);
    }
    suggestions
}

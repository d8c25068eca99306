//! Success chance and the playability gates that depend on the ledger.

use crate::card::{CardKind, CardTemplate};
use crate::config::ChanceConfig;
use crate::ledger::TokenLedger;
use crate::rules::EmotionalState;
use crate::types::PowerLevel;

/// Success chance of `template` in percent, 0–100.
///
/// An override wins outright. Exchanges always succeed. Everything else uses
/// `base_rate - weight_penalty * weight + token_bonus * tokens`, clamped.
#[must_use]
pub fn success_chance(template: &CardTemplate, tokens: u32, config: &ChanceConfig) -> u8 {
    if let Some(fixed) = template.override_success() {
        return fixed.min(100);
    }
    if matches!(template.kind, CardKind::Exchange(_)) {
        return 100;
    }
    let tokens = i32::try_from(tokens).unwrap_or(i32::MAX);
    let raw = config
        .base_rate
        .saturating_sub(config.weight_penalty.saturating_mul(i32::from(template.weight())))
        .saturating_add(config.token_bonus.saturating_mul(tokens));
    let clamped = raw.max(config.min_chance).min(config.max_chance).clamp(0, 100);
    u8::try_from(clamped).unwrap_or(100)
}

/// Success chance of `template` given the player's tokens in its connection.
#[must_use]
pub fn chance_with_ledger(
    template: &CardTemplate,
    ledger: &dyn TokenLedger,
    config: &ChanceConfig,
) -> u8 {
    success_chance(template, ledger.token_count(template.connection), config)
}

/// Whether the player holds enough tokens to play a card of this power level.
#[must_use]
pub fn is_unlocked(power: PowerLevel, tokens: u32) -> bool {
    tokens >= power.required_tokens()
}

/// Whether a letter's eligibility requirements are met. Non-letters always pass.
#[must_use]
pub fn letter_eligible(template: &CardTemplate, tokens: u32, state: EmotionalState) -> bool {
    match &template.kind {
        CardKind::Letter(letter) => {
            let rules = &letter.eligibility;
            tokens >= rules.required_tokens
                && (rules.required_states.is_empty() || rules.required_states.contains(&state))
        }
        _ => true,
    }
}

//! `podtuned check` — validate an intent file.

use anyhow::Context;

use podtune_core::{ControllerConfig, RuleSet};

pub fn check_intent(config: &ControllerConfig, sessions: Option<u64>) -> anyhow::Result<()> {
    let rules = RuleSet::load(&config.intent)
        .with_context(|| format!("loading intent {}", config.intent.display()))?;

    println!("{}", format_tiers(&rules, &config.target.resource));
    if let Some(sessions) = sessions {
        println!("{sessions} sessions → {}", rules.resolve(sessions));
    }
    Ok(())
}

fn format_tiers(rules: &RuleSet, resource: &str) -> String {
    let mut out = format!("✓ {} tiers ({resource} limit)\n", rules.len());
    let last = rules.len().saturating_sub(1);
    for (i, rule) in rules.rules().iter().enumerate() {
        let range = if i == last {
            format!("≤ {} + overflow", rule.threshold)
        } else {
            format!("≤ {}", rule.threshold)
        };
        out.push_str(&format!("  {range:<28} {}\n", rule.limit));
    }
    out.trim_end().to_string()
}

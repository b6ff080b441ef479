use nestegg_core::domain::projection::Scenario;
use nestegg_core::engine::PlanReport;
use std::fmt::Write;

fn money(v: f64) -> String {
    let sign = if v < 0.0 { "-" } else { "" };
    let whole = v.abs().round() as u64;
    let digits = whole.to_string();
    let mut out = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    format!("{sign}${out}")
}

fn opt(v: Option<f64>, suffix: &str) -> String {
    v.map_or_else(|| "n/a".to_string(), |x| format!("{x:.1}{suffix}"))
}

fn scenario_label(s: Scenario) -> &'static str {
    match s {
        Scenario::Expected => "expected",
        Scenario::BestCase => "best case",
        Scenario::WorstCase => "worst case",
    }
}

/// Plain-text rendering of a plan.
pub fn render(report: &PlanReport) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, report);
    out
}

fn write_report(out: &mut String, r: &PlanReport) -> std::fmt::Result {
    let h = &r.health;
    writeln!(out, "Financial health")?;
    writeln!(out, "  savings rate:      {}", opt(h.savings_rate_percent, "%"))?;
    writeln!(out, "  debt to income:    {}", opt(h.debt_to_income, ""))?;
    writeln!(out, "  emergency fund:    {}", opt(h.emergency_fund_months, " months"))?;
    writeln!(out, "  years to debt-free: {}", opt(h.years_to_debt_free, ""))?;
    writeln!(out, "  risk level:        {:?}", h.risk_level)?;
    writeln!(out, "  strategy:          {}", h.strategy)?;
    for flag in &h.flags {
        writeln!(out, "  ! {flag}")?;
    }

    let a = &r.allocation;
    writeln!(out, "\nAllocation ({})", r.advisor)?;
    writeln!(out, "  stocks {:.2}% / bonds {:.2}%", a.stock_percent, a.bond_percent)?;
    writeln!(
        out,
        "  large {:.2}%  mid {:.2}%  small {:.2}%  intl {:.2}%  bonds {:.2}%",
        a.breakdown.large_cap,
        a.breakdown.mid_cap,
        a.breakdown.small_cap,
        a.breakdown.international,
        a.breakdown.bonds
    )?;
    for line in &r.allocation_rationale {
        writeln!(out, "  - {line}")?;
    }

    writeln!(out, "\nRecommendations")?;
    if r.recommendations.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for (i, s) in r.recommendations.iter().enumerate() {
        writeln!(
            out,
            "  {:>2}. {:<6} {:>5.1}  {} ({})",
            i + 1,
            s.quote.symbol,
            s.score,
            s.quote.name,
            s.quote.sector
        )?;
        for adj in &s.rationale {
            writeln!(out, "        {:+.1} {}", adj.delta, adj.reason)?;
        }
    }
    for skip in &r.skipped {
        writeln!(out, "  skipped {} ({:?}): {}", skip.ticker, skip.kind, skip.reason)?;
    }

    writeln!(out, "\nProjection")?;
    writeln!(
        out,
        "  portfolio dividend yield: {:.2}%",
        r.projection.portfolio_dividend_yield * 100.0
    )?;
    for sp in &r.projection.scenarios {
        let rd = &sp.readiness;
        writeln!(
            out,
            "  {:<10} return {:.2}%  nest egg {}  withdrawal {}/yr  goal {}  {}",
            scenario_label(sp.scenario),
            sp.blended_return * 100.0,
            money(rd.projected_nest_egg),
            money(rd.sustainable_withdrawal),
            money(rd.retirement_goal),
            if rd.on_track { "on track" } else { "short" }
        )?;
    }
    if let Some(s) = &r.summary {
        writeln!(
            out,
            "  in {} years (age {}): net worth {} ({}), income {}, dividends {}",
            s.years_ahead,
            s.future_age,
            money(s.future_net_worth),
            opt(s.net_worth_growth_percent, "%"),
            money(s.future_income),
            money(s.future_dividend_income)
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_money_with_separators() {
        assert_eq!(money(1_234_567.4), "$1,234,567");
        assert_eq!(money(-950.0), "-$950");
        assert_eq!(money(0.0), "$0");
    }
}
